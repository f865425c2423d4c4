//! Region-level extraction over a bounded worker pool.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};

use super::attempt::PathRunner;
use super::{
    Arbitration, CancellationToken, ExtractionOptions, ExtractionRequest, ExtractorRegistry, Step,
};
use crate::error::{Error, Result};
use crate::model::{ExtractionResult, Page, PageRaster, Region};

/// Extraction results for one page, keyed by region id.
#[derive(Debug, Default)]
pub struct PageExtraction {
    /// Results of regions that finished
    pub results: BTreeMap<u32, ExtractionResult>,

    /// Whether cancellation stopped some regions
    pub cancelled: bool,
}

impl PageExtraction {
    /// Write results into their regions' write-once slots.
    ///
    /// Unfinished regions are left untouched. Returns `Error::Cancelled`
    /// after writing if the extraction was cancelled.
    pub fn write_back(mut self, page: &mut Page) -> Result<()> {
        for region in page.regions_mut() {
            if let Some(result) = self.results.remove(&region.id) {
                region.set_extraction(result)?;
            }
        }
        if self.cancelled {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// Routes each region to its content extractor and applies the
/// priority, fallback and retry policy of its content kind.
pub struct ExtractionDispatcher {
    registry: Arc<ExtractorRegistry>,
    options: ExtractionOptions,
    pool: ThreadPool,
}

impl ExtractionDispatcher {
    /// Create a dispatcher with a pool of `batch_size` workers.
    pub fn new(
        registry: Arc<ExtractorRegistry>,
        options: ExtractionOptions,
        batch_size: usize,
    ) -> Result<Self> {
        options.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(batch_size.max(1))
            .thread_name(|i| format!("unlayout-extract-{}", i))
            .build()?;
        Ok(Self {
            registry,
            options,
            pool,
        })
    }

    /// Extraction options in use.
    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    /// Resolve one region to exactly one result.
    ///
    /// Only cancellation is reported as an error; every provider failure
    /// ends in a `Failed` result.
    pub fn extract_region(
        &self,
        page: &Page,
        region: &Region,
        raster: &PageRaster,
        cancel: &CancellationToken,
    ) -> Result<ExtractionResult> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let kind = region.region_type.content_kind();
        let crop = match raster.crop(&region.bbox, page.width, page.height) {
            Ok(crop) => crop,
            Err(e) => {
                log::debug!("Region {} on page {}: {}", region.id, page.index, e);
                return Ok(ExtractionResult::failed(0));
            }
        };
        let stage = self.options.stage(kind);
        let request = Arc::new(ExtractionRequest {
            page_index: page.index,
            region_id: region.id,
            region_type: region.region_type,
            kind,
            crop: Arc::new(crop),
            remote_timeout: stage.llm_timeout,
        });

        let runner = PathRunner::new(stage, &self.registry, cancel);
        let mut policy = Arbitration::new(stage);
        let mut step = policy.start();
        loop {
            match step {
                Step::Attempt(source) => {
                    let report = runner.run(source, &request)?;
                    step = policy.record(report);
                }
                Step::Resolved(result) => {
                    log::debug!(
                        "Region {} on page {}: {:?} via {:?} ({:.2}, {} attempts)",
                        region.id,
                        page.index,
                        result.status,
                        result.source,
                        result.confidence,
                        result.attempts
                    );
                    return Ok(result);
                }
            }
        }
    }

    /// Extract every region of a page on the worker pool.
    ///
    /// The page is only read; results are returned for write-back once the
    /// caller's barrier is reached.
    pub fn dispatch_page(
        &self,
        page: &Page,
        raster: &PageRaster,
        cancel: &CancellationToken,
    ) -> PageExtraction {
        let (tx, rx) = crossbeam_channel::unbounded();

        self.pool.scope(|scope| {
            for region in page.regions() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome = self.extract_region(page, region, raster, cancel);
                    let _ = tx.send((region.id, outcome));
                });
            }
        });
        drop(tx);

        let mut extraction = PageExtraction::default();
        for (region_id, outcome) in rx.iter() {
            match outcome {
                Ok(result) => {
                    extraction.results.insert(region_id, result);
                }
                Err(e) => {
                    log::debug!("Region {} on page {} stopped: {}", region_id, page.index, e);
                    extraction.cancelled = true;
                }
            }
        }
        extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::extract::{ContentExtractor, Extracted};
    use crate::model::{BoundingBox, Content, ContentKind, ExtractionSource, RegionType};

    struct Echo;

    impl ContentExtractor for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn extract(&self, request: &ExtractionRequest) -> std::result::Result<Extracted, ExtractionError> {
            Ok(Extracted::new(Content::text(format!("r{}", request.region_id)), 0.95))
        }
    }

    fn page() -> Page {
        let regions = (1..=4)
            .map(|id| {
                let y = id as f32 * 10.0;
                Region::new(id, 0, BoundingBox::new(0.0, y, 50.0, y + 5.0), RegionType::Text)
            })
            .collect();
        Page::with_regions(0, 100.0, 100.0, regions)
    }

    fn dispatcher() -> ExtractionDispatcher {
        let registry = ExtractorRegistry::new().with_local(ContentKind::Text, Arc::new(Echo));
        let mut options = ExtractionOptions::default();
        options.text = options.text.with_engines(["echo"]);
        ExtractionDispatcher::new(Arc::new(registry), options, 2).unwrap()
    }

    #[test]
    fn test_dispatch_page_resolves_every_region() {
        let mut page = page();
        let raster = PageRaster::blank(100, 100, 1);
        let extraction = dispatcher().dispatch_page(&page, &raster, &CancellationToken::new());
        assert_eq!(extraction.results.len(), 4);

        extraction.write_back(&mut page).unwrap();
        for region in page.regions() {
            let result = region.extraction().unwrap();
            assert_eq!(result.source, ExtractionSource::Local);
            assert_eq!(
                result.content.as_ref().and_then(|c| c.as_text()).map(|t| t.text.clone()),
                Some(format!("r{}", region.id))
            );
        }
    }

    #[test]
    fn test_malformed_crop_fails_region() {
        let page = Page::with_regions(
            0,
            100.0,
            100.0,
            vec![Region::new(1, 0, BoundingBox::new(5.0, 5.0, 5.0, 20.0), RegionType::Text)],
        );
        let raster = PageRaster::blank(100, 100, 1);
        let result = dispatcher()
            .extract_region(&page, &page.regions()[0], &raster, &CancellationToken::new())
            .unwrap();
        assert!(result.is_failed());
        assert_eq!(result.attempts, 0);
    }

    #[test]
    fn test_cancelled_dispatch() {
        let mut page = page();
        let raster = PageRaster::blank(100, 100, 1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let extraction = dispatcher().dispatch_page(&page, &raster, &cancel);
        assert!(extraction.cancelled);
        assert!(matches!(extraction.write_back(&mut page), Err(Error::Cancelled)));
        assert!(page.regions().iter().all(|r| r.extraction().is_none()));
    }

    #[test]
    fn test_zero_batch_size_uses_one_worker() {
        let registry = Arc::new(ExtractorRegistry::new());
        assert!(ExtractionDispatcher::new(registry, ExtractionOptions::default(), 0).is_ok());
    }
}
