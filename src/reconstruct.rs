//! Reconstruction of approximate faces from truncated weight vectors.

use ndarray::{s, Array2, ArrayView1, ArrayView2};

use crate::error::{EigenfacesError, Result};
use crate::projection::is_valid_subspace_size;

/// The two reconstruction families produced per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedFaces {
    /// Mean-free reconstructions, one row per weight row.
    pub zero_mean: Array2<f64>,
    /// The same reconstructions with the mean face added back, approximating
    /// the original normalized images.
    pub with_mean: Array2<f64>,
}

/// Rebuilds approximate faces from their weight rows. The subspace size is
/// the weight matrix's column count K: each weight column is scaled by the
/// matching top-K eigenvalue (undoing the sum-of-squares rescale the basis
/// rows carry) and multiplied back through the first K basis rows, then the
/// mean face is added for the second family.
pub fn reconstruct_faces(
    weights: ArrayView2<'_, f64>,
    eigenvalues: ArrayView1<'_, f64>,
    basis: ArrayView2<'_, f64>,
    mean_pixels: ArrayView1<'_, f64>,
) -> Result<ReconstructedFaces> {
    let selected = weights.ncols();
    if !is_valid_subspace_size(selected, basis.nrows()) {
        return Err(EigenfacesError::InvalidSubspaceSize {
            selected,
            num_images: basis.nrows(),
        });
    }
    let usub = basis.slice(s![..selected, ..]);
    let leading = eigenvalues.slice(s![..selected]);

    let mut scaled = weights.to_owned();
    scaled *= &leading;
    let zero_mean = scaled.dot(&usub);
    let with_mean = &zero_mean + &mean_pixels;

    Ok(ReconstructedFaces {
        zero_mean,
        with_mean,
    })
}
