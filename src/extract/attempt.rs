//! Running one capability path with its retry policy.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{after, bounded, select};

use super::{
    CancellationToken, ContentExtractor, Extracted, ExtractionRequest, ExtractorRegistry,
    PathReport, StageOptions,
};
use crate::error::{Error, ExtractionError, Result};
use crate::model::{Content, ContentKind, ExtractionSource};

/// Runs the local or remote path for a single region.
pub(crate) struct PathRunner<'a> {
    stage: &'a StageOptions,
    registry: &'a ExtractorRegistry,
    cancel: &'a CancellationToken,
}

impl<'a> PathRunner<'a> {
    pub(crate) fn new(
        stage: &'a StageOptions,
        registry: &'a ExtractorRegistry,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            stage,
            registry,
            cancel,
        }
    }

    /// Run a path to completion. Only cancellation is an error.
    pub(crate) fn run(
        &self,
        source: ExtractionSource,
        request: &Arc<ExtractionRequest>,
    ) -> Result<PathReport> {
        match source {
            ExtractionSource::Local => self.run_local(request),
            ExtractionSource::Remote => self.run_remote(request),
            ExtractionSource::None => Ok(PathReport::exhausted(ExtractionSource::None, 0)),
        }
    }

    fn run_local(&self, request: &Arc<ExtractionRequest>) -> Result<PathReport> {
        let Some(engine) = self.registry.resolve_local(request.kind, &self.stage.engines) else {
            log::debug!(
                "Region {}: no local {} engine among {:?}",
                request.region_id,
                request.kind,
                self.stage.engines
            );
            return Ok(PathReport::exhausted(ExtractionSource::Local, 0));
        };

        let mut attempts = 0;
        for retry in 0..=self.stage.max_retries {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            attempts += 1;
            let outcome = engine
                .extract(request)
                .and_then(|e| checked(e, request.kind));
            match outcome {
                Ok(extracted) => {
                    return Ok(PathReport::judged(
                        ExtractionSource::Local,
                        extracted,
                        self.stage.confidence_threshold,
                        attempts,
                    ));
                }
                Err(e) if e.is_transient() => {
                    log::debug!(
                        "Region {}: {} attempt {} failed: {}",
                        request.region_id,
                        engine.name(),
                        retry + 1,
                        e
                    );
                }
                Err(e) => {
                    log::debug!("Region {}: {} gave up: {}", request.region_id, engine.name(), e);
                    break;
                }
            }
        }
        Ok(PathReport::exhausted(ExtractionSource::Local, attempts))
    }

    fn run_remote(&self, request: &Arc<ExtractionRequest>) -> Result<PathReport> {
        let remote = match self.registry.remote(request.kind) {
            Some(remote) if self.stage.use_llm => remote,
            _ => {
                log::debug!(
                    "Region {}: remote {} path unavailable",
                    request.region_id,
                    request.kind
                );
                return Ok(PathReport::exhausted(ExtractionSource::Remote, 0));
            }
        };

        let mut attempts = 0;
        for retry in 0..=self.stage.llm_max_retries {
            if retry > 0 {
                let delay = self.stage.backoff_for(retry);
                log::debug!(
                    "Region {}: retrying remote in {:?} ({}/{})",
                    request.region_id,
                    delay,
                    retry,
                    self.stage.llm_max_retries
                );
                if !self.cancel.sleep(delay) {
                    return Err(Error::Cancelled);
                }
            }
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            attempts += 1;
            let outcome = self
                .call_with_timeout(Arc::clone(&remote), Arc::clone(request))?
                .and_then(|e| checked(e, request.kind));
            match outcome {
                Ok(extracted) => {
                    return Ok(PathReport::judged(
                        ExtractionSource::Remote,
                        extracted,
                        self.stage.confidence_threshold,
                        attempts,
                    ));
                }
                Err(e) if e.is_transient() => {
                    log::debug!("Region {}: remote attempt failed: {}", request.region_id, e);
                }
                Err(e) => {
                    log::debug!("Region {}: remote gave up: {}", request.region_id, e);
                    break;
                }
            }
        }
        Ok(PathReport::exhausted(ExtractionSource::Remote, attempts))
    }

    /// Invoke a remote extractor on its own thread, bounded by the stage
    /// timeout and the cancellation signal. A timeout is a transient error.
    fn call_with_timeout(
        &self,
        extractor: Arc<dyn ContentExtractor>,
        request: Arc<ExtractionRequest>,
    ) -> Result<std::result::Result<Extracted, ExtractionError>> {
        let (tx, rx) = bounded(1);
        let spawned = thread::Builder::new()
            .name("unlayout-remote".to_string())
            .spawn(move || {
                let _ = tx.send(extractor.extract(&request));
            });
        if let Err(e) = spawned {
            return Ok(Err(ExtractionError::transient(format!(
                "failed to start remote call: {}",
                e
            ))));
        }

        let timeout: Duration = self.stage.llm_timeout;
        select! {
            recv(rx) -> msg => Ok(msg.unwrap_or_else(|_| {
                Err(ExtractionError::transient("remote call ended without a result"))
            })),
            recv(after(timeout)) -> _ => Ok(Err(ExtractionError::transient(format!(
                "remote call timed out after {:?}",
                timeout
            )))),
            recv(self.cancel.signal()) -> _ => Err(Error::Cancelled),
        }
    }
}

/// Reject payloads of the wrong kind and sanitize the confidence.
fn checked(mut extracted: Extracted, kind: ContentKind) -> std::result::Result<Extracted, ExtractionError> {
    let actual = match extracted.content {
        Content::Text(_) => ContentKind::Text,
        Content::Table(_) => ContentKind::Table,
        Content::Formula(_) => ContentKind::Formula,
    };
    if actual != kind {
        return Err(ExtractionError::permanent(format!(
            "expected {} content, got {}",
            kind, actual
        )));
    }
    extracted.confidence = if extracted.confidence.is_nan() {
        0.0
    } else {
        extracted.confidence.clamp(0.0, 1.0)
    };
    Ok(extracted)
}
