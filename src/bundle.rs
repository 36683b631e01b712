//! The fitted model produced by one training run.

use std::path::PathBuf;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Everything a fit produces over one training set.
///
/// A bundle is immutable once built: a changed training list replaces the
/// bundle wholesale rather than patching it. The row order of every matrix
/// parallels `image_list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceBundle {
    image_list: Vec<PathBuf>,
    width: u32,
    height: u32,
    adjusted_faces: Array2<f64>,
    eigenface_basis: Array2<f64>,
    mean_pixels: Array1<f64>,
    eigenvalues: Array1<f64>,
}

impl FaceBundle {
    pub(crate) fn new(
        image_list: Vec<PathBuf>,
        width: u32,
        height: u32,
        adjusted_faces: Array2<f64>,
        eigenface_basis: Array2<f64>,
        mean_pixels: Array1<f64>,
        eigenvalues: Array1<f64>,
    ) -> Self {
        FaceBundle {
            image_list,
            width,
            height,
            adjusted_faces,
            eigenface_basis,
            mean_pixels,
            eigenvalues,
        }
    }

    /// Ordered source paths, one per training image.
    pub fn image_list(&self) -> &[PathBuf] {
        &self.image_list
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Per-image normalized pixels minus the mean face, one row per image.
    pub fn adjusted_faces(&self) -> &Array2<f64> {
        &self.adjusted_faces
    }

    /// Eigenfaces as rows, ordered by descending eigenvalue.
    pub fn eigenface_basis(&self) -> &Array2<f64> {
        &self.eigenface_basis
    }

    /// Per-pixel mean of the normalized training images.
    pub fn mean_pixels(&self) -> &Array1<f64> {
        &self.mean_pixels
    }

    /// Eigenvalues in descending order, one per training image.
    pub fn eigenvalues(&self) -> &Array1<f64> {
        &self.eigenvalues
    }

    pub fn num_images(&self) -> usize {
        self.image_list.len()
    }

    pub fn pixels_per_image(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Checks the cross-field invariants. Used after deserialization, where
    /// a structurally valid encoding can still describe an inconsistent
    /// bundle.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        let n = self.image_list.len();
        let p = self.pixels_per_image();
        if n == 0 {
            return Err("bundle holds no images".to_string());
        }
        if self.adjusted_faces.nrows() != n {
            return Err(format!(
                "adjusted faces row count {} does not match {} images",
                self.adjusted_faces.nrows(),
                n
            ));
        }
        if self.eigenface_basis.nrows() != n {
            return Err(format!(
                "eigenface basis row count {} does not match {} images",
                self.eigenface_basis.nrows(),
                n
            ));
        }
        if self.eigenvalues.len() != n {
            return Err(format!(
                "eigenvalue count {} does not match {} images",
                self.eigenvalues.len(),
                n
            ));
        }
        if self.adjusted_faces.ncols() != p
            || self.eigenface_basis.ncols() != p
            || self.mean_pixels.len() != p
        {
            return Err(format!(
                "pixel columns do not match {}x{} images",
                self.width, self.height
            ));
        }
        Ok(())
    }
}
