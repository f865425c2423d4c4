//! Content extractor trait and registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ExtractionError;
use crate::model::{Content, ContentKind, RegionCrop, RegionType};

/// Input handed to a content extractor.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Page the region belongs to
    pub page_index: usize,

    /// Region identifier
    pub region_id: u32,

    /// Layout class of the region
    pub region_type: RegionType,

    /// Kind of content expected back
    pub kind: ContentKind,

    /// Region pixels
    pub crop: Arc<RegionCrop>,

    /// Bound the dispatcher puts on each remote call
    pub remote_timeout: Duration,
}

/// Content returned by a successful extractor call.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    /// Extracted payload
    pub content: Content,

    /// Extractor confidence in [0, 1]
    pub confidence: f32,
}

impl Extracted {
    /// Create an extraction outcome.
    pub fn new(content: Content, confidence: f32) -> Self {
        Self {
            content,
            confidence,
        }
    }
}

/// Trait for content extraction providers.
///
/// Local engines and remote services implement the same contract; which one
/// is used for a region is decided by the dispatcher's policy.
///
/// Remote calls run on their own thread. When a call outlives
/// [`ExtractionRequest::remote_timeout`] or the run is cancelled, the
/// dispatcher stops waiting but cannot interrupt the thread, which keeps
/// running until `extract` returns. Remote implementations should apply
/// `remote_timeout` to their own I/O so abandoned calls finish promptly.
pub trait ContentExtractor: Send + Sync {
    /// Name of this extractor (engine name for local providers).
    fn name(&self) -> &str;

    /// Extract content from a region crop.
    fn extract(&self, request: &ExtractionRequest) -> Result<Extracted, ExtractionError>;
}

/// Registry of local engines and remote extractors per content kind.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    local: HashMap<(ContentKind, String), Arc<dyn ContentExtractor>>,
    remote: HashMap<ContentKind, Arc<dyn ContentExtractor>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a local engine for a content kind, keyed by its name.
    pub fn register_local(&mut self, kind: ContentKind, extractor: Arc<dyn ContentExtractor>) {
        let name = extractor.name().to_lowercase();
        self.local.insert((kind, name), extractor);
    }

    /// Register the remote extractor for a content kind.
    pub fn register_remote(&mut self, kind: ContentKind, extractor: Arc<dyn ContentExtractor>) {
        self.remote.insert(kind, extractor);
    }

    /// Register a local engine (builder form).
    pub fn with_local(mut self, kind: ContentKind, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.register_local(kind, extractor);
        self
    }

    /// Register a remote extractor (builder form).
    pub fn with_remote(mut self, kind: ContentKind, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.register_remote(kind, extractor);
        self
    }

    /// Get a local engine by name.
    pub fn get_local(&self, kind: ContentKind, name: &str) -> Option<Arc<dyn ContentExtractor>> {
        self.local.get(&(kind, name.to_lowercase())).cloned()
    }

    /// First engine of `engines` that is registered for `kind`.
    pub fn resolve_local(
        &self,
        kind: ContentKind,
        engines: &[String],
    ) -> Option<Arc<dyn ContentExtractor>> {
        engines.iter().find_map(|name| self.get_local(kind, name))
    }

    /// Remote extractor for `kind`, if registered.
    pub fn remote(&self, kind: ContentKind) -> Option<Arc<dyn ContentExtractor>> {
        self.remote.get(&kind).cloned()
    }

    /// Check if any local engine is registered for `kind`.
    pub fn has_local(&self, kind: ContentKind) -> bool {
        self.local.keys().any(|(k, _)| *k == kind)
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut local: Vec<String> = self
            .local
            .keys()
            .map(|(kind, name)| format!("{}:{}", kind, name))
            .collect();
        local.sort();
        let mut remote: Vec<String> = self.remote.keys().map(|k| k.to_string()).collect();
        remote.sort();
        f.debug_struct("ExtractorRegistry")
            .field("local", &local)
            .field("remote", &remote)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl ContentExtractor for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn extract(&self, _request: &ExtractionRequest) -> Result<Extracted, ExtractionError> {
            Ok(Extracted::new(Content::text(self.0), 1.0))
        }
    }

    #[test]
    fn test_resolve_local_follows_priority() {
        let registry = ExtractorRegistry::new()
            .with_local(ContentKind::Text, Arc::new(Named("easyocr")))
            .with_local(ContentKind::Text, Arc::new(Named("Tesseract")));

        let engines = vec![
            "paddleocr".to_string(),
            "tesseract".to_string(),
            "easyocr".to_string(),
        ];
        let resolved = registry.resolve_local(ContentKind::Text, &engines).unwrap();
        assert_eq!(resolved.name(), "Tesseract");
    }

    #[test]
    fn test_resolve_local_none_registered() {
        let registry =
            ExtractorRegistry::new().with_local(ContentKind::Table, Arc::new(Named("grid")));
        assert!(registry
            .resolve_local(ContentKind::Text, &["grid".to_string()])
            .is_none());
        assert!(registry.has_local(ContentKind::Table));
        assert!(!registry.has_local(ContentKind::Formula));
    }

    #[test]
    fn test_remote_per_kind() {
        let registry =
            ExtractorRegistry::new().with_remote(ContentKind::Table, Arc::new(Named("llm")));
        assert!(registry.remote(ContentKind::Table).is_some());
        assert!(registry.remote(ContentKind::Text).is_none());
        assert!(format!("{:?}", registry).contains("table"));
    }
}
