//! Diagnostic image artifacts: the mean face, per-eigenface images, and
//! reconstruction pairs. These are side channels; callers treat failures
//! here as loggable, never as fit or match failures.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;

use crate::bundle::FaceBundle;
use crate::error::Result;
use crate::image_io::ImageAdapter;
use crate::reconstruct::ReconstructedFaces;

/// File name of the mean-face image, directly under the output root.
pub const MEAN_FACE_FILE: &str = "average.png";
/// Directory under the output root holding one image per eigenface.
pub const EIGENFACES_DIR: &str = "eigenfaces";
/// Directory under the output root holding reconstruction pairs.
pub const RECONSTRUCTIONS_DIR: &str = "reconfaces";

/// Where diagnostic images are written.
#[derive(Debug, Clone)]
pub struct DiagnosticsConfig {
    /// Root directory for all diagnostic output. Created on demand.
    pub output_root: PathBuf,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        DiagnosticsConfig {
            output_root: PathBuf::from("."),
        }
    }
}

impl DiagnosticsConfig {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        DiagnosticsConfig {
            output_root: output_root.into(),
        }
    }
}

/// Removes `dir` if it exists and recreates it empty, so artifacts from a
/// previous (possibly larger) training set never linger.
pub fn replace_output_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Writes the post-fit artifacts: the mean face and one image per eigenface.
///
/// The mean face is scaled back to 8-bit intensity range and written without
/// display normalization; eigenface values are not naturally displayable, so
/// those are written with it.
pub fn write_fit_artifacts<A: ImageAdapter>(
    config: &DiagnosticsConfig,
    bundle: &FaceBundle,
    adapter: &A,
) -> Result<()> {
    let dimensions = (bundle.width(), bundle.height());
    fs::create_dir_all(&config.output_root)?;

    let mean_display = bundle.mean_pixels() * 255.0;
    adapter.encode(
        mean_display.view(),
        &config.output_root.join(MEAN_FACE_FILE),
        dimensions,
        false,
    )?;

    let eigenfaces_dir = config.output_root.join(EIGENFACES_DIR);
    replace_output_dir(&eigenfaces_dir)?;
    for (i, row) in bundle.eigenface_basis().rows().into_iter().enumerate() {
        let path = eigenfaces_dir.join(format!("eigenface{i}.png"));
        adapter.encode(row, &path, dimensions, true)?;
    }

    info!(
        "Wrote mean face and {} eigenface images under {:?}",
        bundle.num_images(),
        config.output_root
    );
    Ok(())
}

/// Writes both reconstruction families: `reconphi{i}.png` for the mean-free
/// faces and `reconx{i}.png` for the mean-added ones.
pub fn write_reconstructions<A: ImageAdapter>(
    config: &DiagnosticsConfig,
    faces: &ReconstructedFaces,
    dimensions: (u32, u32),
    adapter: &A,
) -> Result<()> {
    let dir = config.output_root.join(RECONSTRUCTIONS_DIR);
    replace_output_dir(&dir)?;

    for (i, row) in faces.zero_mean.rows().into_iter().enumerate() {
        adapter.encode(row, &dir.join(format!("reconphi{i}.png")), dimensions, true)?;
    }
    for (i, row) in faces.with_mean.rows().into_iter().enumerate() {
        adapter.encode(row, &dir.join(format!("reconx{i}.png")), dimensions, true)?;
    }

    info!(
        "Wrote {} reconstruction pairs under {:?}",
        faces.zero_mean.nrows(),
        dir
    );
    Ok(())
}
