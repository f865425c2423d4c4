//! Per-stage extraction options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ContentKind;

/// Retry, arbitration and fallback settings for one content kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageOptions {
    /// Minimum confidence for a result to be accepted
    pub confidence_threshold: f32,

    /// Local engines in priority order; the first registered one is used
    pub engines: Vec<String>,

    /// Enable the remote (LLM) path
    pub use_llm: bool,

    /// Try the remote path before the local one
    pub llm_priority: bool,

    /// Allow the alternate path after a low-confidence or exhausted primary
    pub llm_fallback: bool,

    /// Remote retries after the first attempt
    pub llm_max_retries: u32,

    /// Upper bound for a single remote attempt
    #[serde(with = "duration_ms")]
    pub llm_timeout: Duration,

    /// Delay before the first remote retry, doubled for each further retry
    #[serde(with = "duration_ms")]
    pub llm_backoff: Duration,

    /// Local retries after the first attempt
    pub max_retries: u32,
}

impl StageOptions {
    /// Create stage options with defaults and the given engine list.
    pub fn new(engines: &[&str], confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
            engines: engines.iter().map(|e| e.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Set the confidence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the local engine priority list.
    pub fn with_engines<I, S>(mut self, engines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engines = engines.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable the remote path.
    pub fn with_llm(mut self, use_llm: bool) -> Self {
        self.use_llm = use_llm;
        self
    }

    /// Prefer the remote path over the local one.
    pub fn with_llm_priority(mut self, priority: bool) -> Self {
        self.llm_priority = priority;
        self
    }

    /// Enable or disable the fallback to the alternate path.
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.llm_fallback = fallback;
        self
    }

    /// Set remote retry count, timeout and initial backoff.
    pub fn with_llm_retry(mut self, max_retries: u32, timeout: Duration, backoff: Duration) -> Self {
        self.llm_max_retries = max_retries;
        self.llm_timeout = timeout;
        self.llm_backoff = backoff;
        self
    }

    /// Set local retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Backoff before remote retry `n` (1-based): `llm_backoff * 2^(n-1)`.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        self.llm_backoff.saturating_mul(1u32 << exp)
    }

    /// Check thresholds and timeouts.
    pub fn validate(&self, kind: ContentKind) -> Result<()> {
        if !self.confidence_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err(Error::Configuration(format!(
                "{} confidence_threshold must be within [0, 1], got {}",
                kind, self.confidence_threshold
            )));
        }
        if self.use_llm && self.llm_timeout.is_zero() {
            return Err(Error::Configuration(format!(
                "{} llm_timeout must be positive",
                kind
            )));
        }
        Ok(())
    }
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            engines: Vec::new(),
            use_llm: false,
            llm_priority: false,
            llm_fallback: true,
            llm_max_retries: 3,
            llm_timeout: Duration::from_secs(30),
            llm_backoff: Duration::from_millis(500),
            max_retries: 2,
        }
    }
}

/// Stage options for every content kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    /// Text recognition (OCR)
    pub text: StageOptions,

    /// Table structure recognition
    pub table: StageOptions,

    /// Formula recognition
    pub formula: StageOptions,
}

impl ExtractionOptions {
    /// Options for a content kind.
    pub fn stage(&self, kind: ContentKind) -> &StageOptions {
        match kind {
            ContentKind::Text => &self.text,
            ContentKind::Table => &self.table,
            ContentKind::Formula => &self.formula,
        }
    }

    /// Mutable options for a content kind.
    pub fn stage_mut(&mut self, kind: ContentKind) -> &mut StageOptions {
        match kind {
            ContentKind::Text => &mut self.text,
            ContentKind::Table => &mut self.table,
            ContentKind::Formula => &mut self.formula,
        }
    }

    /// Validate all stages.
    pub fn validate(&self) -> Result<()> {
        self.text.validate(ContentKind::Text)?;
        self.table.validate(ContentKind::Table)?;
        self.formula.validate(ContentKind::Formula)
    }
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            text: StageOptions::new(&["paddleocr", "easyocr", "tesseract"], 0.8),
            table: StageOptions::new(&["table_structure"], 0.8),
            formula: StageOptions::new(&["pp_formulanet"], 0.7),
        }
    }
}

/// Serialize durations as integer milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
