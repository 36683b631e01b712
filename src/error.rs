//! Error types for the eigenface pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while fitting, matching, or caching.
#[derive(Error, Debug)]
pub enum EigenfacesError {
    /// No training images were supplied.
    #[error("training set is empty")]
    EmptyTrainingSet,

    /// An image's dimensions disagree with the rest of the training set,
    /// or a query's dimensions disagree with the fitted bundle.
    #[error("image {path:?} is {got:?}, expected {expected:?} (width, height)")]
    DimensionMismatch {
        path: PathBuf,
        expected: (u32, u32),
        got: (u32, u32),
    },

    /// An image whose maximum intensity is zero cannot be normalized.
    #[error("image {path:?} has zero maximum intensity")]
    DegenerateImage { path: PathBuf },

    /// The selected eigenface count K must satisfy `0 < K < N` for N
    /// training images.
    #[error("selected eigenface count {selected} is invalid for {num_images} training images")]
    InvalidSubspaceSize { selected: usize, num_images: usize },

    /// The persisted bundle exists but cannot be trusted.
    #[error("corrupt cache: {reason}")]
    CorruptCache { reason: String },

    /// Reading or decoding an image file failed.
    #[error("failed to decode image {path:?}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Encoding or writing an image file failed.
    #[error("failed to encode image {path:?}: {source}")]
    ImageEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A pixel buffer handed to the encoder does not hold width*height values.
    #[error("pixel buffer for {path:?} holds {got} values, expected {width}x{height}")]
    PixelBufferMismatch {
        path: PathBuf,
        width: u32,
        height: u32,
        got: usize,
    },

    /// The symmetric eigendecomposition failed.
    #[error("eigendecomposition failed: {0}")]
    Eigen(#[from] ndarray_linalg::error::LinalgError),

    /// Filesystem failure outside of image codecs.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for eigenface operations.
pub type Result<T> = std::result::Result<T, EigenfacesError>;
