//! Reading order options.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options for reading order reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingOrderOptions {
    /// Consult the learned ranker when one is configured
    pub use_ranker: bool,

    /// Minimum page-level ranker confidence to accept its order
    pub confidence_threshold: f32,

    /// Horizontal overlap ratio above which two regions share a column
    pub clustering_threshold: f32,
}

impl ReadingOrderOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the learned ranker.
    pub fn with_ranker(mut self, use_ranker: bool) -> Self {
        self.use_ranker = use_ranker;
        self
    }

    /// Always use the spatial heuristic.
    pub fn spatial_only(mut self) -> Self {
        self.use_ranker = false;
        self
    }

    /// Set the ranker confidence threshold.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the column clustering threshold.
    pub fn with_clustering_threshold(mut self, threshold: f32) -> Self {
        self.clustering_threshold = threshold;
        self
    }

    /// Check that thresholds are finite ratios.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("clustering_threshold", self.clustering_threshold),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(Error::Configuration(format!(
                    "reading order {} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for ReadingOrderOptions {
    fn default() -> Self {
        Self {
            use_ranker: true,
            confidence_threshold: 0.5,
            clustering_threshold: 0.1,
        }
    }
}
