//! Document-level driver: per-page extraction and ordering, then assembly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ErrorMode, PipelineOptions};
use crate::assemble::{DocumentAssembler, DocumentInfo};
use crate::error::{Error, Result};
use crate::extract::{CancellationToken, ExtractionDispatcher, ExtractorRegistry};
use crate::model::{DocumentTree, Page, PageRaster, Provenance};
use crate::order::{ReadingOrderRanker, ReadingOrderReconstructor};

/// A page's detected regions together with its raster.
#[derive(Debug, Clone)]
pub struct PageInput {
    /// Region catalog of the page
    pub page: Page,

    /// Decoded page image
    pub raster: PageRaster,
}

impl PageInput {
    /// Pair a page with its raster.
    pub fn new(page: Page, raster: PageRaster) -> Self {
        Self { page, raster }
    }
}

/// A page skipped in lenient mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    /// Page index (0-based)
    pub page_index: usize,

    /// Error description
    pub message: String,
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Assembled document
    pub tree: DocumentTree,

    /// One record per extracted region, in page then region id order
    pub provenance: Vec<Provenance>,

    /// Pages skipped in lenient mode
    pub failures: Vec<PageFailure>,

    /// Processed pages with extraction results and order written.
    ///
    /// After cancellation the interrupted page comes last, holding only the
    /// regions that finished; it is not part of the tree.
    pub pages: Vec<Page>,

    /// Whether cancellation stopped the run before every page was processed
    pub cancelled: bool,
}

impl PipelineOutput {
    /// Check if any page was skipped.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Check if the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Drives extraction, reading order and assembly over a document.
///
/// A pipeline is immutable once built and can be shared between threads to
/// process several documents concurrently.
pub struct Pipeline {
    dispatcher: ExtractionDispatcher,
    reconstructor: ReadingOrderReconstructor,
    assembler: DocumentAssembler,
    error_mode: ErrorMode,
}

impl Pipeline {
    /// Build a pipeline, validating the options.
    pub fn new(registry: Arc<ExtractorRegistry>, options: PipelineOptions) -> Result<Self> {
        options.validate()?;
        let PipelineOptions {
            extraction,
            reading_order,
            assembly,
            batch_size,
            error_mode,
        } = options;

        Ok(Self {
            dispatcher: ExtractionDispatcher::new(registry, extraction, batch_size)?,
            reconstructor: ReadingOrderReconstructor::new(reading_order),
            assembler: DocumentAssembler::new(assembly)?,
            error_mode,
        })
    }

    /// Consult a learned ranker for reading order.
    pub fn with_ranker(mut self, ranker: Arc<dyn ReadingOrderRanker>) -> Self {
        self.reconstructor = self.reconstructor.with_ranker(ranker);
        self
    }

    /// Error mode in use.
    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    /// Extract and order one page in place.
    ///
    /// Extraction and ordering run concurrently; both are written back only
    /// after both finish. On cancellation the finished regions are written
    /// and `Error::Cancelled` is returned. Any other failure is tagged with
    /// the page index.
    pub fn process_page(
        &self,
        page: &mut Page,
        raster: &PageRaster,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let index = page.index;
        raster.validate().map_err(|e| e.on_page(index))?;
        page.validate().map_err(|e| e.on_page(index))?;

        let (extraction, order) = {
            let page = &*page;
            rayon::join(
                || self.dispatcher.dispatch_page(page, raster, cancel),
                || self.reconstructor.reconstruct(page),
            )
        };

        order.apply(page).map_err(|e| e.on_page(index))?;
        extraction.write_back(page).map_err(|e| match e {
            Error::Cancelled => e,
            other => other.on_page(index),
        })
    }

    /// Process every page, then assemble the document.
    ///
    /// Pages are processed in input order. In strict mode the first page
    /// failure aborts the run; in lenient mode the page is recorded in
    /// [`PipelineOutput::failures`] and left out of the document.
    ///
    /// Cancellation stops at the current page. The pages finished so far
    /// are still assembled and returned with [`PipelineOutput::cancelled`]
    /// set.
    pub fn process(
        &self,
        inputs: Vec<PageInput>,
        info: &DocumentInfo,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutput> {
        log::info!("Processing {} pages", inputs.len());

        let mut pages = Vec::with_capacity(inputs.len());
        let mut failures = Vec::new();
        let mut interrupted = None;
        let mut cancelled = false;

        for PageInput { mut page, raster } in inputs {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            match self.process_page(&mut page, &raster, cancel) {
                Ok(()) => pages.push(page),
                Err(Error::Cancelled) => {
                    interrupted = Some(page);
                    cancelled = true;
                    break;
                }
                Err(e) => match self.error_mode {
                    ErrorMode::Strict => return Err(e),
                    ErrorMode::Lenient => {
                        log::warn!("Skipping page {}: {}", page.index, e);
                        failures.push(PageFailure {
                            page_index: page.index,
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        let tree = self.assembler.assemble(&pages, info)?;
        if cancelled {
            log::warn!("Cancelled after {} completed pages", pages.len());
        }
        pages.extend(interrupted);
        let provenance = collect_provenance(&pages);

        log::info!(
            "Assembled {} nodes from {} pages ({} skipped)",
            tree.node_counts().total(),
            pages.len(),
            failures.len()
        );

        Ok(PipelineOutput {
            tree,
            provenance,
            failures,
            pages,
            cancelled,
        })
    }
}

fn collect_provenance(pages: &[Page]) -> Vec<Provenance> {
    pages
        .iter()
        .flat_map(|page| {
            page.regions().iter().filter_map(move |region| {
                region
                    .extraction()
                    .map(|result| Provenance::from_result(page.index, region.id, result))
            })
        })
        .collect()
}

/// Run [`Pipeline::process`] on tokio's blocking pool.
#[cfg(feature = "async")]
pub async fn process_async(
    pipeline: Arc<Pipeline>,
    inputs: Vec<PageInput>,
    info: DocumentInfo,
    cancel: CancellationToken,
) -> Result<PipelineOutput> {
    tokio::task::spawn_blocking(move || pipeline.process(inputs, &info, &cancel))
        .await
        .map_err(|e| Error::Other(format!("Pipeline task failed: {}", e)))?
}
