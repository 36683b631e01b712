// Eigenface (PCA) face recognition

#![doc = include_str!("../README.md")]

pub mod bundle;
pub mod cache;
pub mod diagnostics;
pub mod eigenspace;
pub mod error;
pub mod image_io;
pub mod matching;
pub mod projection;
pub mod reconstruct;
pub mod session;
pub mod training;

pub use bundle::FaceBundle;
pub use diagnostics::DiagnosticsConfig;
pub use error::{EigenfacesError, Result};
pub use image_io::{scan_image_dir, FileImageAdapter, ImageAdapter, RawImage};
pub use matching::MatchOutcome;
pub use reconstruct::ReconstructedFaces;
pub use session::{FaceSession, SessionOptions};
pub use training::TrainingImage;
