//! Loading and validating the training set before any matrix is built.

use std::path::PathBuf;

use log::debug;

use crate::error::{EigenfacesError, Result};
use crate::image_io::ImageAdapter;

/// A decoded training image together with its source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Row-major grayscale intensities, `width * height` values.
    pub pixels: Vec<u8>,
}

/// Decodes every path in order and checks the set is usable: non-empty, and
/// every image shares the first image's dimensions. The dimension check runs
/// here so a mixed set fails before any matrix construction.
pub fn load_training_set<A: ImageAdapter>(
    paths: &[PathBuf],
    adapter: &A,
) -> Result<Vec<TrainingImage>> {
    if paths.is_empty() {
        return Err(EigenfacesError::EmptyTrainingSet);
    }
    let mut images = Vec::with_capacity(paths.len());
    let mut expected: Option<(u32, u32)> = None;
    for path in paths {
        let raw = adapter.decode(path)?;
        let dims = (raw.width, raw.height);
        match expected {
            None => expected = Some(dims),
            Some(first) if first != dims => {
                return Err(EigenfacesError::DimensionMismatch {
                    path: path.clone(),
                    expected: first,
                    got: dims,
                });
            }
            Some(_) => {}
        }
        images.push(TrainingImage {
            path: path.clone(),
            width: raw.width,
            height: raw.height,
            pixels: raw.pixels,
        });
    }
    debug!(
        "Loaded {} training images at {:?} (width, height)",
        images.len(),
        expected.unwrap_or((0, 0))
    );
    Ok(images)
}
