//! Eigenspace construction via the covariance matrix trick: for N training
//! images only an N x N Gram matrix is eigendecomposed, never the P x P
//! pixel covariance.

use std::cmp::Ordering;
use std::time::Instant;

use log::{debug, info};
use ndarray::{Array1, Array2, Axis};
use ndarray_linalg::{Eigh, UPLO};

use crate::bundle::FaceBundle;
use crate::error::{EigenfacesError, Result};
use crate::training::TrainingImage;

/// Fits a [`FaceBundle`] over the training set.
///
/// Per image: divide every pixel by the image's own maximum intensity, then
/// subtract the column-wise mean across images. The Gram matrix of the
/// adjusted rows is eigendecomposed, eigenpairs are sorted by descending
/// eigenvalue, and the pixel-space eigenfaces are recovered by multiplying
/// the eigenvectors back through the adjusted matrix. Each eigenface row is
/// divided by the sum of squares of its entries (the trace of `row' * row`
/// over the height x width reshape), which downstream weight magnitudes
/// depend on; a row of zeros is left untouched so an all-constant training
/// set stays finite.
pub fn build_bundle(images: &[TrainingImage]) -> Result<FaceBundle> {
    if images.is_empty() {
        return Err(EigenfacesError::EmptyTrainingSet);
    }
    let num_images = images.len();
    let width = images[0].width;
    let height = images[0].height;
    let pixels_per_image = width as usize * height as usize;
    let start = Instant::now();

    let mut faces = Array2::<f64>::zeros((num_images, pixels_per_image));
    for (i, image) in images.iter().enumerate() {
        if (image.width, image.height) != (width, height) {
            return Err(EigenfacesError::DimensionMismatch {
                path: image.path.clone(),
                expected: (width, height),
                got: (image.width, image.height),
            });
        }
        let max = image.pixels.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return Err(EigenfacesError::DegenerateImage {
                path: image.path.clone(),
            });
        }
        let max = f64::from(max);
        for (dst, &src) in faces.row_mut(i).iter_mut().zip(image.pixels.iter()) {
            *dst = f64::from(src) / max;
        }
    }

    let mean_pixels = faces
        .mean_axis(Axis(0))
        .ok_or(EigenfacesError::EmptyTrainingSet)?;
    let adjusted_faces = faces - &mean_pixels;

    let gram = adjusted_faces.dot(&adjusted_faces.t());
    let (eigenvalues, eigenvectors) = gram.eigh(UPLO::Upper)?;

    // eigh yields ascending eigenvalues; reorder descending and permute the
    // eigenvector columns to match.
    let mut order: Vec<usize> = (0..eigenvalues.len()).collect();
    order.sort_by(|&a, &b| {
        eigenvalues[b]
            .partial_cmp(&eigenvalues[a])
            .unwrap_or(Ordering::Equal)
    });
    let sorted_eigenvalues: Array1<f64> = order.iter().map(|&i| eigenvalues[i]).collect();
    let sorted_eigenvectors = eigenvectors.select(Axis(1), &order);

    let mut eigenface_basis = sorted_eigenvectors.t().dot(&adjusted_faces);
    for mut row in eigenface_basis.rows_mut() {
        let norm: f64 = row.iter().map(|v| v * v).sum();
        if norm > 0.0 {
            row.mapv_inplace(|v| v / norm);
        }
    }

    info!(
        "Fitted eigenface bundle over {} images of {}x{} in {:.2?}",
        num_images,
        width,
        height,
        start.elapsed()
    );
    debug!(
        "Eigenvalue range: {:.6e} down to {:.6e}",
        sorted_eigenvalues[0],
        sorted_eigenvalues[sorted_eigenvalues.len() - 1]
    );

    let image_list = images.iter().map(|image| image.path.clone()).collect();
    Ok(FaceBundle::new(
        image_list,
        width,
        height,
        adjusted_faces,
        eigenface_basis,
        mean_pixels,
        sorted_eigenvalues,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn image(name: &str, width: u32, height: u32, pixels: Vec<u8>) -> TrainingImage {
        TrainingImage {
            path: PathBuf::from(name),
            width,
            height,
            pixels,
        }
    }

    fn random_set(count: usize, width: u32, height: u32, seed: u64) -> Vec<TrainingImage> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..count)
            .map(|i| {
                let pixels = (0..width * height)
                    .map(|_| rng.gen_range(1..=255u8))
                    .collect();
                image(&format!("img{i}.png"), width, height, pixels)
            })
            .collect()
    }

    #[test]
    fn eigenvalues_are_descending_and_one_per_image() {
        let images = random_set(5, 6, 6, 42);
        let bundle = build_bundle(&images).unwrap();

        assert_eq!(bundle.eigenvalues().len(), 5);
        for pair in bundle.eigenvalues().to_vec().windows(2) {
            assert!(
                pair[0] >= pair[1] - 1e-9,
                "eigenvalues not descending: {} then {}",
                pair[0],
                pair[1]
            );
        }
        // Mean subtraction removes one direction of variation.
        assert!(bundle.eigenvalues()[4].abs() < 1e-9);
    }

    #[test]
    fn mean_plus_adjusted_recovers_the_normalized_faces() {
        let images = random_set(4, 5, 4, 7);
        let bundle = build_bundle(&images).unwrap();

        for (i, img) in images.iter().enumerate() {
            let max = f64::from(*img.pixels.iter().max().unwrap());
            for (j, &p) in img.pixels.iter().enumerate() {
                let rebuilt = bundle.adjusted_faces()[[i, j]] + bundle.mean_pixels()[j];
                assert!(
                    (rebuilt - f64::from(p) / max).abs() < 1e-12,
                    "image {i} pixel {j} off"
                );
            }
        }
    }

    #[test]
    fn basis_rows_carry_the_sum_of_squares_rescale() {
        // Before rescaling, row k has sum of squares equal to eigenvalue k;
        // after dividing by it, the sum of squares must be its reciprocal.
        // A unit-norm normalization would leave 1.0 instead.
        let images = random_set(5, 6, 6, 99);
        let bundle = build_bundle(&images).unwrap();

        for (k, row) in bundle.eigenface_basis().rows().into_iter().enumerate() {
            let eigenvalue = bundle.eigenvalues()[k];
            if eigenvalue < 1e-9 {
                continue;
            }
            let sum_sq: f64 = row.iter().map(|v| v * v).sum();
            assert!(
                (sum_sq * eigenvalue - 1.0).abs() < 1e-6,
                "row {k}: sum of squares {sum_sq} does not invert eigenvalue {eigenvalue}"
            );
        }
    }

    #[test]
    fn constant_images_fit_without_nans() {
        let images = vec![
            image("fifty.png", 4, 4, vec![50; 16]),
            image("hundred.png", 4, 4, vec![100; 16]),
            image("onefifty.png", 4, 4, vec![150; 16]),
        ];
        let bundle = build_bundle(&images).unwrap();

        // Every image self-normalizes to all ones, so the mean is all ones
        // and nothing varies.
        for &m in bundle.mean_pixels().iter() {
            assert!((m - 1.0).abs() < 1e-12);
        }
        for &v in bundle.eigenvalues().iter() {
            assert!(v.abs() < 1e-9);
        }
        for &v in bundle.eigenface_basis().iter() {
            assert!(v.is_finite());
        }
        for &v in bundle.adjusted_faces().iter() {
            assert!(v.abs() < 1e-12);
        }
    }

    #[test]
    fn zero_intensity_image_is_degenerate() {
        let images = vec![
            image("ok.png", 4, 4, vec![10; 16]),
            image("black.png", 4, 4, vec![0; 16]),
        ];
        let err = build_bundle(&images).unwrap_err();
        match err {
            EigenfacesError::DegenerateImage { path } => {
                assert_eq!(path, PathBuf::from("black.png"));
            }
            other => panic!("expected DegenerateImage, got {other:?}"),
        }
    }

    #[test]
    fn mixed_dimensions_are_rejected() {
        let images = vec![
            image("a.png", 4, 4, vec![10; 16]),
            image("b.png", 4, 5, vec![10; 20]),
        ];
        let err = build_bundle(&images).unwrap_err();
        assert!(matches!(err, EigenfacesError::DimensionMismatch { .. }));
    }

    #[test]
    fn empty_set_is_rejected() {
        let err = build_bundle(&[]).unwrap_err();
        assert!(matches!(err, EigenfacesError::EmptyTrainingSet));
    }

    #[test]
    fn fitting_is_deterministic() {
        let images = random_set(4, 6, 6, 4096);
        let first = build_bundle(&images).unwrap();
        let second = build_bundle(&images).unwrap();
        assert_eq!(first, second);
    }
}
