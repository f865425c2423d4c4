//! Extraction results and provenance records.

use serde::{Deserialize, Serialize};

use super::Content;

/// Which capability path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    /// A local recognition engine
    Local,
    /// A remote (LLM) extraction service
    Remote,
    /// No path produced content
    None,
}

impl ExtractionSource {
    /// The other capability path.
    pub fn alternate(self) -> Self {
        match self {
            ExtractionSource::Local => ExtractionSource::Remote,
            ExtractionSource::Remote => ExtractionSource::Local,
            ExtractionSource::None => ExtractionSource::None,
        }
    }
}

/// Final status of a region's extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// Content met the confidence threshold
    Success,
    /// Content was produced below the confidence threshold
    LowConfidence,
    /// No acceptable content could be produced (terminal)
    Failed,
}

/// The resolved extraction outcome for a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted payload, if any path produced one
    pub content: Option<Content>,

    /// Confidence of the returned content (0.0 when there is none)
    pub confidence: f32,

    /// Path that produced the returned content
    pub source: ExtractionSource,

    /// Final status
    pub status: ExtractionStatus,

    /// Total provider invocations across both paths
    pub attempts: u32,
}

impl ExtractionResult {
    /// Create a successful result.
    pub fn success(content: Content, confidence: f32, source: ExtractionSource) -> Self {
        Self {
            content: Some(content),
            confidence,
            source,
            status: ExtractionStatus::Success,
            attempts: 1,
        }
    }

    /// Create a failed result without content.
    pub fn failed(attempts: u32) -> Self {
        Self {
            content: None,
            confidence: 0.0,
            source: ExtractionSource::None,
            status: ExtractionStatus::Failed,
            attempts,
        }
    }

    /// Set the attempt count.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Check if the result succeeded.
    pub fn is_success(&self) -> bool {
        self.status == ExtractionStatus::Success
    }

    /// Check if the result is terminally failed.
    pub fn is_failed(&self) -> bool {
        self.status == ExtractionStatus::Failed
    }
}

/// Audit record of how a region's content was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Page the region belongs to (0-based)
    pub page_index: usize,

    /// Region identifier
    pub region_id: u32,

    /// Path used for the final content
    pub source: ExtractionSource,

    /// Confidence of the final content
    pub confidence: f32,

    /// Provider invocations
    pub attempts: u32,

    /// Final status
    pub status: ExtractionStatus,
}

impl Provenance {
    /// Build a provenance record from a region's result.
    pub fn from_result(page_index: usize, region_id: u32, result: &ExtractionResult) -> Self {
        Self {
            page_index,
            region_id,
            source: result.source,
            confidence: result.confidence,
            attempts: result.attempts,
            status: result.status,
        }
    }
}
