//! Confidence-gated arbitration between the local and remote paths.
//!
//! The policy is a small state machine:
//!
//! ```text
//! AttemptPrimary -> {Accepted, LowConfidence, Exhausted}
//!                -> [AttemptSecondary] -> Resolved
//! ```
//!
//! It never calls a provider itself. The dispatcher runs the path the policy
//! asks for and feeds the [`PathReport`] back through [`Arbitration::record`].

use super::{Extracted, StageOptions};
use crate::model::{ExtractionResult, ExtractionSource, ExtractionStatus};

/// How a single path ended after its own retries.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
    /// Content at or above the confidence threshold
    Accepted(Extracted),
    /// Content below the confidence threshold
    LowConfidence(Extracted),
    /// Retries exhausted, permanent error, or path unavailable
    Exhausted,
}

/// Result of running one path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathReport {
    /// Path that ran
    pub source: ExtractionSource,

    /// How it ended
    pub outcome: PathOutcome,

    /// Provider invocations on this path
    pub attempts: u32,
}

impl PathReport {
    /// Judge a path's final content against a threshold.
    pub fn judged(source: ExtractionSource, extracted: Extracted, threshold: f32, attempts: u32) -> Self {
        let outcome = if extracted.confidence >= threshold {
            PathOutcome::Accepted(extracted)
        } else {
            PathOutcome::LowConfidence(extracted)
        };
        Self {
            source,
            outcome,
            attempts,
        }
    }

    /// A path that produced no content.
    pub fn exhausted(source: ExtractionSource, attempts: u32) -> Self {
        Self {
            source,
            outcome: PathOutcome::Exhausted,
            attempts,
        }
    }

    fn content(&self) -> Option<&Extracted> {
        match &self.outcome {
            PathOutcome::Accepted(e) | PathOutcome::LowConfidence(e) => Some(e),
            PathOutcome::Exhausted => None,
        }
    }
}

/// Next action requested by the policy.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Run this path and record its report
    Attempt(ExtractionSource),
    /// Final result for the region
    Resolved(ExtractionResult),
}

/// Arbitration state for one region.
#[derive(Debug, Clone)]
pub struct Arbitration {
    primary: ExtractionSource,
    alternate_enabled: bool,
    primary_report: Option<PathReport>,
}

impl Arbitration {
    /// Create the policy for a stage.
    pub fn new(stage: &StageOptions) -> Self {
        let primary = if stage.llm_priority && stage.use_llm {
            ExtractionSource::Remote
        } else {
            ExtractionSource::Local
        };
        let alternate_enabled = stage.llm_fallback
            && match primary.alternate() {
                ExtractionSource::Remote => stage.use_llm,
                _ => true,
            };
        Self {
            primary,
            alternate_enabled,
            primary_report: None,
        }
    }

    /// The primary path.
    pub fn primary(&self) -> ExtractionSource {
        self.primary
    }

    /// First step: attempt the primary path.
    pub fn start(&self) -> Step {
        Step::Attempt(self.primary)
    }

    /// Record a path report and decide the next step.
    pub fn record(&mut self, report: PathReport) -> Step {
        match self.primary_report.take() {
            None => self.after_primary(report),
            Some(primary) => Step::Resolved(Self::after_secondary(primary, report)),
        }
    }

    fn after_primary(&mut self, report: PathReport) -> Step {
        let accepted = matches!(report.outcome, PathOutcome::Accepted(_));
        if !accepted && self.alternate_enabled {
            let alternate = report.source.alternate();
            log::debug!(
                "{:?} path ended {}, falling back to {:?}",
                report.source,
                outcome_name(&report.outcome),
                alternate
            );
            self.primary_report = Some(report);
            return Step::Attempt(alternate);
        }

        match report.outcome {
            PathOutcome::Accepted(ref e) => Step::Resolved(resolved(
                e,
                report.source,
                ExtractionStatus::Success,
                report.attempts,
            )),
            PathOutcome::LowConfidence(ref e) => Step::Resolved(resolved(
                e,
                report.source,
                ExtractionStatus::LowConfidence,
                report.attempts,
            )),
            PathOutcome::Exhausted => Step::Resolved(ExtractionResult::failed(report.attempts)),
        }
    }

    fn after_secondary(primary: PathReport, secondary: PathReport) -> ExtractionResult {
        let attempts = primary.attempts + secondary.attempts;
        match secondary.outcome {
            PathOutcome::Accepted(ref e) => {
                resolved(e, secondary.source, ExtractionStatus::Success, attempts)
            }
            PathOutcome::LowConfidence(ref e) => {
                resolved(e, secondary.source, ExtractionStatus::LowConfidence, attempts)
            }
            PathOutcome::Exhausted => match primary.content() {
                Some(e) => resolved(e, primary.source, ExtractionStatus::Failed, attempts),
                None => ExtractionResult::failed(attempts),
            },
        }
    }
}

fn resolved(
    extracted: &Extracted,
    source: ExtractionSource,
    status: ExtractionStatus,
    attempts: u32,
) -> ExtractionResult {
    ExtractionResult {
        content: Some(extracted.content.clone()),
        confidence: extracted.confidence,
        source,
        status,
        attempts,
    }
}

fn outcome_name(outcome: &PathOutcome) -> &'static str {
    match outcome {
        PathOutcome::Accepted(_) => "accepted",
        PathOutcome::LowConfidence(_) => "low-confidence",
        PathOutcome::Exhausted => "exhausted",
    }
}
