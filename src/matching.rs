//! Nearest-neighbor matching in weight space.

use std::path::PathBuf;

use log::debug;
use ndarray::{ArrayView1, ArrayView2};

/// Result of matching one query against the training weights. The distance
/// is always reported, whether or not it passed the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Euclidean distance to the nearest training face in weight space.
    pub distance: f64,
    /// Path of the nearest training image when `distance <= threshold`,
    /// `None` otherwise.
    pub matched: Option<PathBuf>,
}

/// Scans every weight row for the smallest squared Euclidean distance to
/// `query`, ties keeping the earliest row, and gates the winner on
/// `threshold`. An empty weight matrix yields an infinite distance and no
/// match.
pub fn find_match(
    query: ArrayView1<'_, f64>,
    weights: ArrayView2<'_, f64>,
    image_list: &[PathBuf],
    threshold: f64,
) -> MatchOutcome {
    debug_assert_eq!(weights.nrows(), image_list.len());

    let mut best_index = None;
    let mut best_squared = f64::INFINITY;
    for (index, row) in weights.rows().into_iter().enumerate() {
        let squared: f64 = row
            .iter()
            .zip(query.iter())
            .map(|(&w, &q)| (w - q) * (w - q))
            .sum();
        if squared < best_squared {
            best_squared = squared;
            best_index = Some(index);
        }
    }

    let Some(index) = best_index else {
        return MatchOutcome {
            distance: f64::INFINITY,
            matched: None,
        };
    };
    let distance = best_squared.sqrt();
    debug!("Nearest weight row {index} at distance {distance:.6}");
    let matched = if distance <= threshold {
        image_list.get(index).cloned()
    } else {
        None
    };
    MatchOutcome { distance, matched }
}
