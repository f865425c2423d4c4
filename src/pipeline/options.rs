//! Pipeline options and configuration.

use serde::{Deserialize, Serialize};

use crate::assemble::AssemblyOptions;
use crate::error::{Error, Result};
use crate::extract::{ExtractionOptions, StageOptions};
use crate::model::ContentKind;
use crate::order::ReadingOrderOptions;
use crate::render::FormatOptions;

/// Options for a whole pipeline run.
///
/// Deserializes from JSON with every field optional; missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Per-kind extraction policy
    pub extraction: ExtractionOptions,

    /// Reading order reconstruction
    pub reading_order: ReadingOrderOptions,

    /// Document assembly and format flags
    pub assembly: AssemblyOptions,

    /// Extraction worker count
    pub batch_size: usize,

    /// Page-level error handling
    pub error_mode: ErrorMode,
}

impl PipelineOptions {
    /// Create new pipeline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Configuration(e.to_string()))
    }

    /// Set extraction options.
    pub fn with_extraction(mut self, extraction: ExtractionOptions) -> Self {
        self.extraction = extraction;
        self
    }

    /// Replace the stage options of one content kind.
    pub fn with_stage(mut self, kind: ContentKind, stage: StageOptions) -> Self {
        *self.extraction.stage_mut(kind) = stage;
        self
    }

    /// Set reading order options.
    pub fn with_reading_order(mut self, reading_order: ReadingOrderOptions) -> Self {
        self.reading_order = reading_order;
        self
    }

    /// Set assembly options.
    pub fn with_assembly(mut self, assembly: AssemblyOptions) -> Self {
        self.assembly = assembly;
        self
    }

    /// Set output format flags.
    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.assembly.format = format;
        self
    }

    /// Set the extraction worker count.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip failed pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Configuration(
                "batch_size must be at least 1".to_string(),
            ));
        }
        self.extraction.validate()?;
        self.reading_order.validate()?;
        self.assembly.validate()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            extraction: ExtractionOptions::default(),
            reading_order: ReadingOrderOptions::default(),
            assembly: AssemblyOptions::default(),
            batch_size: 4,
            error_mode: ErrorMode::Strict,
        }
    }
}

/// Error handling mode for page-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Fail the document on the first failed page
    #[default]
    Strict,
    /// Skip failed pages and continue
    Lenient,
}
