//! # unlayout
//!
//! Turns the detected layout regions of document pages into an ordered,
//! typed document tree.
//!
//! Layout detection and the recognition models themselves live outside this
//! crate. It coordinates them: each region is routed to a text, table or
//! formula extractor with confidence-gated local/remote fallback and bounded
//! retries, a deterministic reading order is reconstructed per page, and the
//! results are assembled into a [`DocumentTree`] that renders to Markdown,
//! plain text or JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use unlayout::extract::{ContentExtractor, Extracted, ExtractionRequest};
//! use unlayout::model::{BoundingBox, Content, ContentKind, Page, PageRaster, Region, RegionType};
//! use unlayout::{ExtractionError, PageInput, Unlayout};
//!
//! struct Ocr;
//!
//! impl ContentExtractor for Ocr {
//!     fn name(&self) -> &str {
//!         "tesseract"
//!     }
//!
//!     fn extract(&self, _request: &ExtractionRequest) -> Result<Extracted, ExtractionError> {
//!         Ok(Extracted::new(Content::text("Hello"), 0.9))
//!     }
//! }
//!
//! fn main() -> unlayout::Result<()> {
//!     let page = Page::with_regions(
//!         0,
//!         612.0,
//!         792.0,
//!         vec![Region::new(0, 0, BoundingBox::new(72.0, 72.0, 540.0, 96.0), RegionType::Text)],
//!     );
//!     let raster = PageRaster::blank(1224, 1584, 3);
//!
//!     let markdown = Unlayout::new()
//!         .with_local(ContentKind::Text, Arc::new(Ocr))
//!         .with_title("Report")
//!         .lenient()
//!         .process(vec![PageInput::new(page, raster)])?
//!         .to_markdown()?;
//!     println!("{}", markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Extraction policy**: local/remote priority, confidence-gated fallback,
//!   bounded retries with timeouts and exponential backoff
//! - **Reading order**: learned ranker with a spatial column heuristic as
//!   fallback
//! - **Placeholder filtering**: failed figures and captions produce no output
//! - **Parallel processing**: Rayon worker pool per page, cooperative
//!   cancellation
//! - **Output formats**: Markdown, plain text, JSON

pub mod assemble;
pub mod error;
pub mod extract;
pub mod model;
pub mod order;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use assemble::{AssemblyOptions, DocumentAssembler, DocumentInfo, TitleLevelThresholds};
pub use error::{Error, ExtractionError, OrderingError, Result};
pub use extract::{
    CancellationToken, ContentExtractor, ExtractionDispatcher, ExtractionOptions,
    ExtractorRegistry, StageOptions,
};
pub use model::{
    BoundingBox, Content, ContentKind, DocumentTree, ExtractionResult, ExtractionSource,
    ExtractionStatus, Metadata, Node, Page, PageRaster, Provenance, Region, RegionType,
};
pub use order::{ReadingOrderOptions, ReadingOrderRanker, ReadingOrderReconstructor};
pub use pipeline::{ErrorMode, PageFailure, PageInput, Pipeline, PipelineOptions, PipelineOutput};
pub use render::{
    FormatOptions, FormulaFormat, JsonFormat, LineBreakStyle, RenderResult, TableFormat,
};

use std::sync::Arc;

/// Builder for processing a document end to end.
///
/// # Example
///
/// ```no_run
/// use unlayout::{FormatOptions, TableFormat, Unlayout};
///
/// let result = Unlayout::new()
///     .with_format(FormatOptions::default().with_table_format(TableFormat::Html))
///     .with_batch_size(8)
///     .lenient()
///     .process(Vec::new())?;
/// println!("{}", result.to_json(unlayout::JsonFormat::Pretty)?);
/// # Ok::<(), unlayout::Error>(())
/// ```
pub struct Unlayout {
    registry: ExtractorRegistry,
    ranker: Option<Arc<dyn ReadingOrderRanker>>,
    options: PipelineOptions,
    info: DocumentInfo,
}

impl Unlayout {
    /// Create a new builder with default options and no extractors.
    pub fn new() -> Self {
        Self {
            registry: ExtractorRegistry::new(),
            ranker: None,
            options: PipelineOptions::default(),
            info: DocumentInfo::default(),
        }
    }

    /// Replace all pipeline options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable lenient mode (skip failed pages).
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Set the extraction policy of one content kind.
    pub fn with_stage(mut self, kind: ContentKind, stage: StageOptions) -> Self {
        self.options = self.options.with_stage(kind, stage);
        self
    }

    /// Set reading order options.
    pub fn with_reading_order(mut self, options: ReadingOrderOptions) -> Self {
        self.options = self.options.with_reading_order(options);
        self
    }

    /// Set output format flags.
    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.options = self.options.with_format(format);
        self
    }

    /// Set heading font size thresholds.
    pub fn with_title_levels(mut self, thresholds: TitleLevelThresholds) -> Self {
        self.options.assembly = self.options.assembly.with_thresholds(thresholds);
        self
    }

    /// Set the extraction worker count.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.options = self.options.with_batch_size(batch_size);
        self
    }

    /// Register a local engine.
    pub fn with_local(mut self, kind: ContentKind, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.registry.register_local(kind, extractor);
        self
    }

    /// Register a remote extractor.
    pub fn with_remote(mut self, kind: ContentKind, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.registry.register_remote(kind, extractor);
        self
    }

    /// Use a learned reading order ranker.
    pub fn with_ranker(mut self, ranker: Arc<dyn ReadingOrderRanker>) -> Self {
        self.ranker = Some(ranker);
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.info = self.info.with_title(title);
        self
    }

    /// Set the document source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.info = self.info.with_source(source);
        self
    }

    /// Build the pipeline without running it.
    pub fn build(self) -> Result<Pipeline> {
        let (pipeline, _) = self.into_parts()?;
        Ok(pipeline)
    }

    /// Process pages and return a result wrapper.
    pub fn process(self, inputs: Vec<PageInput>) -> Result<UnlayoutResult> {
        self.process_with_cancel(inputs, &CancellationToken::new())
    }

    /// Process pages, observing a cancellation token.
    pub fn process_with_cancel(
        self,
        inputs: Vec<PageInput>,
        cancel: &CancellationToken,
    ) -> Result<UnlayoutResult> {
        let format = self.options.assembly.format.clone();
        let (pipeline, info) = self.into_parts()?;
        let output = pipeline.process(inputs, &info, cancel)?;
        Ok(UnlayoutResult { output, format })
    }

    fn into_parts(self) -> Result<(Pipeline, DocumentInfo)> {
        let mut pipeline = Pipeline::new(Arc::new(self.registry), self.options)?;
        if let Some(ranker) = self.ranker {
            pipeline = pipeline.with_ranker(ranker);
        }
        Ok((pipeline, self.info))
    }
}

impl Default for Unlayout {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of processing a document.
pub struct UnlayoutResult {
    /// Pipeline output
    pub output: PipelineOutput,
    /// Format flags the tree was assembled with
    format: FormatOptions,
}

impl UnlayoutResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.output.tree, &self.format)
    }

    /// Convert to Markdown with statistics.
    pub fn to_markdown_with_stats(&self) -> Result<RenderResult> {
        render::to_markdown_with_stats(&self.output.tree, &self.format)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.output.tree, &self.format)
    }

    /// Convert the document tree to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.output.tree, format)
    }

    /// Serialize the provenance records to JSON.
    pub fn provenance_json(&self, format: JsonFormat) -> Result<String> {
        render::serialize_json(&self.output.provenance, format)
    }

    /// Get the document tree.
    pub fn tree(&self) -> &DocumentTree {
        &self.output.tree
    }

    /// Get the provenance records.
    pub fn provenance(&self) -> &[Provenance] {
        &self.output.provenance
    }

    /// Get the pages skipped in lenient mode.
    pub fn failures(&self) -> &[PageFailure] {
        &self.output.failures
    }

    /// Check if cancellation cut the run short.
    pub fn is_cancelled(&self) -> bool {
        self.output.cancelled
    }
}
