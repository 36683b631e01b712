//! Projection of adjusted faces onto a truncated eigenface basis.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{EigenfacesError, Result};

/// True when `selected` leading eigenfaces form a usable subspace over a
/// basis built from `num_images` images: `0 < selected < num_images`.
/// Zero is meaningless and `selected >= num_images` degenerates to the full
/// unreduced space while breaking the truncated-eigenvalue reconstruction.
pub fn is_valid_subspace_size(selected: usize, num_images: usize) -> bool {
    selected > 0 && selected < num_images
}

/// Projects every adjusted face row onto the first `selected` basis rows,
/// yielding the weight matrix with one row per face.
pub fn project_faces(
    basis: ArrayView2<'_, f64>,
    selected: usize,
    adjusted_faces: ArrayView2<'_, f64>,
) -> Result<Array2<f64>> {
    if !is_valid_subspace_size(selected, basis.nrows()) {
        return Err(EigenfacesError::InvalidSubspaceSize {
            selected,
            num_images: basis.nrows(),
        });
    }
    let usub = basis.slice(s![..selected, ..]);
    Ok(adjusted_faces.dot(&usub.t()))
}

/// Projects a single adjusted face, yielding its weight vector. Used for
/// queries; training batches go through [`project_faces`].
pub fn project_face(
    basis: ArrayView2<'_, f64>,
    selected: usize,
    adjusted_face: ArrayView1<'_, f64>,
) -> Result<Array1<f64>> {
    if !is_valid_subspace_size(selected, basis.nrows()) {
        return Err(EigenfacesError::InvalidSubspaceSize {
            selected,
            num_images: basis.nrows(),
        });
    }
    let usub = basis.slice(s![..selected, ..]);
    Ok(usub.dot(&adjusted_face))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray_rand::RandomExt;
    use rand::distributions::Uniform;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn subspace_size_boundaries() {
        assert!(!is_valid_subspace_size(0, 2));
        assert!(is_valid_subspace_size(1, 2));
        assert!(!is_valid_subspace_size(2, 2));
        assert!(!is_valid_subspace_size(3, 2));

        assert!(is_valid_subspace_size(1, 5));
        assert!(is_valid_subspace_size(4, 5));
        assert!(!is_valid_subspace_size(5, 5));
        assert!(!is_valid_subspace_size(6, 5));
        assert!(!is_valid_subspace_size(0, 0));
        assert!(!is_valid_subspace_size(1, 1));
    }

    #[test]
    fn batch_weights_have_one_row_per_face_and_k_columns() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let basis = Array2::<f64>::random_using((6, 20), Uniform::new(-1.0, 1.0), &mut rng);
        let adjusted = Array2::<f64>::random_using((6, 20), Uniform::new(-1.0, 1.0), &mut rng);

        let weights = project_faces(basis.view(), 3, adjusted.view()).unwrap();
        assert_eq!(weights.dim(), (6, 3));
    }

    #[test]
    fn single_projection_matches_the_batch_row() {
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let basis = Array2::<f64>::random_using((5, 12), Uniform::new(-1.0, 1.0), &mut rng);
        let adjusted = Array2::<f64>::random_using((5, 12), Uniform::new(-1.0, 1.0), &mut rng);

        let weights = project_faces(basis.view(), 4, adjusted.view()).unwrap();
        for (i, row) in adjusted.rows().into_iter().enumerate() {
            let single = project_face(basis.view(), 4, row).unwrap();
            for k in 0..4 {
                assert!(
                    (weights[[i, k]] - single[k]).abs() < 1e-12,
                    "row {i} component {k} disagrees"
                );
            }
        }
    }

    #[test]
    fn invalid_subspace_sizes_are_rejected() {
        let basis = Array2::<f64>::zeros((4, 8));
        let adjusted = Array2::<f64>::zeros((4, 8));

        for selected in [0, 4, 5] {
            let err = project_faces(basis.view(), selected, adjusted.view()).unwrap_err();
            match err {
                EigenfacesError::InvalidSubspaceSize {
                    selected: got,
                    num_images,
                } => {
                    assert_eq!(got, selected);
                    assert_eq!(num_images, 4);
                }
                other => panic!("expected InvalidSubspaceSize, got {other:?}"),
            }
        }

        let query = Array1::<f64>::zeros(8);
        assert!(project_face(basis.view(), 0, query.view()).is_err());
    }
}
