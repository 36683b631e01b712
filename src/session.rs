//! The session ties the pipeline together: one fitted bundle and one weight
//! matrix per training directory, rebuilt from disk only when the cache is
//! absent or stale.

use std::path::{Path, PathBuf};

use log::{info, warn};
use ndarray::{Array1, Array2};

use crate::bundle::FaceBundle;
use crate::cache;
use crate::diagnostics::{self, DiagnosticsConfig};
use crate::error::{EigenfacesError, Result};
use crate::eigenspace::build_bundle;
use crate::image_io::ImageAdapter;
use crate::matching::{find_match, MatchOutcome};
use crate::projection::{is_valid_subspace_size, project_face, project_faces};
use crate::reconstruct::reconstruct_faces;
use crate::training::load_training_set;

/// Knobs for opening a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Number of leading eigenfaces to project onto. Must satisfy
    /// `0 < selected_eigenfaces < number of training images`.
    pub selected_eigenfaces: usize,
    /// When set, diagnostic images (mean face, eigenfaces, reconstruction
    /// pairs) are written under the configured root. Failures there are
    /// logged and never abort a fit or a match.
    pub diagnostics: Option<DiagnosticsConfig>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            selected_eigenfaces: 1,
            diagnostics: None,
        }
    }
}

/// A fitted eigenface model over one training directory, ready to answer
/// queries. Sessions are plain values: open as many as needed, one per
/// training directory, within one process.
#[derive(Debug, Clone)]
pub struct FaceSession {
    bundle: FaceBundle,
    weights: Array2<f64>,
    options: SessionOptions,
}

impl FaceSession {
    /// Opens a session over `image_paths`, which must all live under
    /// `training_dir` conventions-wise (the cache file is written there).
    ///
    /// Loads the cached bundle when one exists and was built over exactly
    /// this ordered image list; otherwise decodes the images, fits a fresh
    /// bundle, and persists it before returning. Training weights are
    /// recomputed either way, since the selected subspace size is a
    /// per-session choice.
    pub fn open<A: ImageAdapter>(
        training_dir: impl AsRef<Path>,
        image_paths: Vec<PathBuf>,
        options: SessionOptions,
        adapter: &A,
    ) -> Result<Self> {
        let training_dir = training_dir.as_ref();
        if image_paths.is_empty() {
            return Err(EigenfacesError::EmptyTrainingSet);
        }
        if !is_valid_subspace_size(options.selected_eigenfaces, image_paths.len()) {
            return Err(EigenfacesError::InvalidSubspaceSize {
                selected: options.selected_eigenfaces,
                num_images: image_paths.len(),
            });
        }

        let cached = cache::load(training_dir)?;
        let bundle = match cached {
            Some(bundle) if !cache::is_stale(&bundle, &image_paths) => {
                info!("Reusing cached bundle for {:?}", training_dir);
                bundle
            }
            cached => {
                if cached.is_some() {
                    info!("Cache for {:?} is stale, refitting", training_dir);
                }
                let images = load_training_set(&image_paths, adapter)?;
                let bundle = build_bundle(&images)?;
                cache::save(training_dir, &bundle)?;
                if let Some(config) = &options.diagnostics {
                    if let Err(e) = diagnostics::write_fit_artifacts(config, &bundle, adapter) {
                        warn!("Skipping fit diagnostics: {e}");
                    }
                }
                bundle
            }
        };

        let weights = project_faces(
            bundle.eigenface_basis().view(),
            options.selected_eigenfaces,
            bundle.adjusted_faces().view(),
        )?;

        Ok(FaceSession {
            bundle,
            weights,
            options,
        })
    }

    /// Matches the image at `query_path` against the training set.
    ///
    /// The query is normalized and mean-subtracted exactly like a training
    /// image, projected onto the session's subspace, and compared to every
    /// training weight row; the nearest is accepted when its Euclidean
    /// distance is within `threshold`. The distance is reported either way.
    pub fn identify<A: ImageAdapter>(
        &self,
        query_path: impl AsRef<Path>,
        threshold: f64,
        adapter: &A,
    ) -> Result<MatchOutcome> {
        let query_path = query_path.as_ref();
        let raw = adapter.decode(query_path)?;
        if (raw.width, raw.height) != (self.bundle.width(), self.bundle.height()) {
            return Err(EigenfacesError::DimensionMismatch {
                path: query_path.to_path_buf(),
                expected: (self.bundle.width(), self.bundle.height()),
                got: (raw.width, raw.height),
            });
        }
        let max = raw.pixels.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return Err(EigenfacesError::DegenerateImage {
                path: query_path.to_path_buf(),
            });
        }
        let max = f64::from(max);
        let adjusted: Array1<f64> = raw
            .pixels
            .iter()
            .zip(self.bundle.mean_pixels().iter())
            .map(|(&p, &m)| f64::from(p) / max - m)
            .collect();

        let query_weight = project_face(
            self.bundle.eigenface_basis().view(),
            self.options.selected_eigenfaces,
            adjusted.view(),
        )?;
        let outcome = find_match(
            query_weight.view(),
            self.weights.view(),
            self.bundle.image_list(),
            threshold,
        );

        if let Some(config) = &self.options.diagnostics {
            if let Err(e) = self.write_reconstruction_diagnostics(config, adapter) {
                warn!("Skipping reconstruction diagnostics: {e}");
            }
        }
        Ok(outcome)
    }

    fn write_reconstruction_diagnostics<A: ImageAdapter>(
        &self,
        config: &DiagnosticsConfig,
        adapter: &A,
    ) -> Result<()> {
        let faces = reconstruct_faces(
            self.weights.view(),
            self.bundle.eigenvalues().view(),
            self.bundle.eigenface_basis().view(),
            self.bundle.mean_pixels().view(),
        )?;
        diagnostics::write_reconstructions(
            config,
            &faces,
            (self.bundle.width(), self.bundle.height()),
            adapter,
        )
    }

    /// The fitted bundle backing this session.
    pub fn bundle(&self) -> &FaceBundle {
        &self.bundle
    }

    /// Training weights, one row per training image, `selected_eigenfaces`
    /// columns.
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Number of leading eigenfaces this session projects onto.
    pub fn selected_eigenfaces(&self) -> usize {
        self.options.selected_eigenfaces
    }
}
