//! Content extraction dispatch.
//!
//! Every region is routed to the extractor for its content kind (text,
//! table or formula). Each kind has a local path (a prioritized list of
//! engines) and an optional remote path. [`Arbitration`] decides which path
//! runs first and whether the other one is tried; the dispatcher runs the
//! paths with their retry, timeout and cancellation rules.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use unlayout::extract::{
//!     CancellationToken, ContentExtractor, Extracted, ExtractionDispatcher, ExtractionOptions,
//!     ExtractionRequest, ExtractorRegistry,
//! };
//! use unlayout::model::{Content, ContentKind, Page, PageRaster};
//! use unlayout::ExtractionError;
//!
//! struct Ocr;
//!
//! impl ContentExtractor for Ocr {
//!     fn name(&self) -> &str {
//!         "paddleocr"
//!     }
//!
//!     fn extract(&self, _request: &ExtractionRequest) -> Result<Extracted, ExtractionError> {
//!         Ok(Extracted::new(Content::text("recognized"), 0.93))
//!     }
//! }
//!
//! fn main() -> unlayout::Result<()> {
//!     let registry = ExtractorRegistry::new().with_local(ContentKind::Text, Arc::new(Ocr));
//!     let dispatcher =
//!         ExtractionDispatcher::new(Arc::new(registry), ExtractionOptions::default(), 4)?;
//!
//!     let mut page = Page::new(0, 612.0, 792.0);
//!     let raster = PageRaster::blank(1224, 1584, 3);
//!     let extraction = dispatcher.dispatch_page(&page, &raster, &CancellationToken::new());
//!     extraction.write_back(&mut page)?;
//!     Ok(())
//! }
//! ```

mod attempt;
mod cancel;
mod dispatcher;
mod options;
mod policy;
mod provider;

pub use cancel::CancellationToken;
pub use dispatcher::{ExtractionDispatcher, PageExtraction};
pub use options::{ExtractionOptions, StageOptions};
pub use policy::{Arbitration, PathOutcome, PathReport, Step};
pub use provider::{ContentExtractor, Extracted, ExtractionRequest, ExtractorRegistry};
