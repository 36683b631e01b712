//! Pixel I/O behind a trait so the pipeline can run against in-memory
//! images in tests, plus the directory scan used to assemble training lists.

use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;
use ndarray::ArrayView1;

use crate::error::{EigenfacesError, Result};

/// A decoded 8-bit grayscale image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    /// Row-major, `width * height` values.
    pub pixels: Vec<u8>,
}

/// How the pipeline reads and writes images.
///
/// `decode` must yield row-major 8-bit grayscale pixels. `encode` writes a
/// floating-point buffer back out as an image; with `normalize_for_display`
/// the buffer is rescaled so its minimum maps to 0 and its maximum to 255
/// (eigenfaces and reconstructions are not naturally in display range),
/// otherwise each value is clamped to `[0, 255]` and rounded.
pub trait ImageAdapter {
    /// Reads the image at `path` as 8-bit grayscale.
    fn decode(&self, path: &Path) -> Result<RawImage>;

    /// Writes a row-major `f64` buffer as an 8-bit grayscale image.
    fn encode(
        &self,
        pixels: ArrayView1<'_, f64>,
        path: &Path,
        dimensions: (u32, u32),
        normalize_for_display: bool,
    ) -> Result<()>;
}

/// [`ImageAdapter`] backed by the `image` crate. Decodes every format the
/// crate's default features support and converts to grayscale.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageAdapter;

impl FileImageAdapter {
    pub fn new() -> Self {
        FileImageAdapter
    }
}

impl ImageAdapter for FileImageAdapter {
    fn decode(&self, path: &Path) -> Result<RawImage> {
        let decoded = image::open(path).map_err(|source| EigenfacesError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
        let gray = decoded.to_luma8();
        let (width, height) = gray.dimensions();
        Ok(RawImage {
            width,
            height,
            pixels: gray.into_raw(),
        })
    }

    fn encode(
        &self,
        pixels: ArrayView1<'_, f64>,
        path: &Path,
        dimensions: (u32, u32),
        normalize_for_display: bool,
    ) -> Result<()> {
        let (width, height) = dimensions;
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(EigenfacesError::PixelBufferMismatch {
                path: path.to_path_buf(),
                width,
                height,
                got: pixels.len(),
            });
        }
        let bytes = if normalize_for_display {
            rescale_to_display(pixels)
        } else {
            pixels
                .iter()
                .map(|&v| v.clamp(0.0, 255.0).round() as u8)
                .collect()
        };
        let img = GrayImage::from_raw(width, height, bytes).ok_or_else(|| {
            EigenfacesError::PixelBufferMismatch {
                path: path.to_path_buf(),
                width,
                height,
                got: pixels.len(),
            }
        })?;
        img.save(path).map_err(|source| EigenfacesError::ImageEncode {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Maps the buffer linearly so its minimum becomes 0 and its maximum 255.
/// A flat buffer maps to all zeros.
fn rescale_to_display(pixels: ArrayView1<'_, f64>) -> Vec<u8> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in pixels.iter() {
        min = min.min(v);
        max = max.max(v);
    }
    let span = max - min;
    if span > 0.0 {
        pixels
            .iter()
            .map(|&v| ((v - min) / span * 255.0).round() as u8)
            .collect()
    } else {
        vec![0; pixels.len()]
    }
}

/// Lists the regular files under `dir` whose extension matches `extension`
/// case-insensitively, sorted lexicographically so training order is
/// deterministic across platforms.
pub fn scan_image_dir(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
