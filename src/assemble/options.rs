//! Assembly options.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::RegionType;
use crate::render::FormatOptions;

/// Font size thresholds for heading levels 1 to 5, strictly descending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleLevelThresholds(pub [f32; 5]);

impl TitleLevelThresholds {
    /// Create thresholds from level 1 down to level 5.
    pub fn new(levels: [f32; 5]) -> Self {
        Self(levels)
    }

    /// Heading level for a font size: the first threshold met or exceeded,
    /// scanning from level 1. Below all thresholds, or unknown, is level 5.
    pub fn level_for(&self, font_size: Option<f32>) -> u8 {
        let Some(size) = font_size.filter(|s| s.is_finite()) else {
            return 5;
        };
        self.0
            .iter()
            .position(|&threshold| size >= threshold)
            .map(|i| i as u8 + 1)
            .unwrap_or(5)
    }

    /// Reject non-finite or not strictly descending thresholds.
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self.0.iter().find(|t| !t.is_finite()) {
            return Err(Error::Configuration(format!(
                "title level threshold {} is not finite",
                bad
            )));
        }
        if let Some(pair) = self.0.windows(2).find(|w| w[0] <= w[1]) {
            return Err(Error::Configuration(format!(
                "title level thresholds must be strictly descending ({} <= {})",
                pair[0], pair[1]
            )));
        }
        Ok(())
    }
}

impl Default for TitleLevelThresholds {
    fn default() -> Self {
        Self([28.0, 22.0, 18.0, 16.0, 14.0])
    }
}

/// Options for assembling the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyOptions {
    /// Font size thresholds for heading levels
    pub title_level_thresholds: TitleLevelThresholds,

    /// Caption and illustrative types emitted only on successful extraction
    pub placeholder_types: Vec<RegionType>,

    /// Format flags, recorded in the tree
    pub format: FormatOptions,
}

impl AssemblyOptions {
    /// Create new assembly options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set heading thresholds.
    pub fn with_thresholds(mut self, thresholds: TitleLevelThresholds) -> Self {
        self.title_level_thresholds = thresholds;
        self
    }

    /// Set the placeholder type set.
    pub fn with_placeholder_types(mut self, types: Vec<RegionType>) -> Self {
        self.placeholder_types = types;
        self
    }

    /// Set format flags.
    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    /// Check if a region type is filtered unless extraction succeeded.
    pub fn is_placeholder(&self, region_type: RegionType) -> bool {
        self.placeholder_types.contains(&region_type)
    }

    /// Validate thresholds.
    pub fn validate(&self) -> Result<()> {
        self.title_level_thresholds.validate()
    }
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            title_level_thresholds: TitleLevelThresholds::default(),
            placeholder_types: RegionType::default_placeholder_types(),
            format: FormatOptions::default(),
        }
    }
}
