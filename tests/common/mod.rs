//! Shared mock providers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use unlayout::extract::{ContentExtractor, Extracted, ExtractionRequest};
use unlayout::model::{BoundingBox, Content, Page, PageRaster, Region, RegionType};
use unlayout::order::{LayoutBox, RankedOrder, ReadingOrderRanker};
use unlayout::{ExtractionError, OrderingError};

type Respond = dyn Fn(&ExtractionRequest, usize) -> Result<Extracted, ExtractionError> + Send + Sync;

/// Extractor with a scripted response and an invocation counter.
///
/// The response function receives the request and the 0-based call number.
pub struct MockExtractor {
    name: String,
    calls: AtomicUsize,
    respond: Box<Respond>,
}

impl MockExtractor {
    pub fn new<F>(name: &str, respond: F) -> Arc<Self>
    where
        F: Fn(&ExtractionRequest, usize) -> Result<Extracted, ExtractionError>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
            respond: Box::new(respond),
        })
    }

    /// Always returns the same content and confidence.
    pub fn fixed(name: &str, content: Content, confidence: f32) -> Arc<Self> {
        Self::new(name, move |_, _| Ok(Extracted::new(content.clone(), confidence)))
    }

    /// Echoes the region id as text.
    pub fn echo(name: &str, confidence: f32) -> Arc<Self> {
        Self::new(name, move |request, _| {
            Ok(Extracted::new(
                Content::text(format!("region {}", request.region_id)),
                confidence,
            ))
        })
    }

    /// Always fails with a transient error.
    pub fn transient(name: &str) -> Arc<Self> {
        Self::new(name, |_, n| {
            Err(ExtractionError::transient(format!("busy ({})", n)))
        })
    }

    /// Always fails with a permanent error.
    pub fn permanent(name: &str) -> Arc<Self> {
        Self::new(name, |_, _| Err(ExtractionError::permanent("unsupported")))
    }

    /// Sleeps before answering.
    pub fn slow(name: &str, delay: Duration, content: Content, confidence: f32) -> Arc<Self> {
        Self::new(name, move |_, _| {
            std::thread::sleep(delay);
            Ok(Extracted::new(content.clone(), confidence))
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContentExtractor for MockExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, request: &ExtractionRequest) -> Result<Extracted, ExtractionError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(request, n)
    }
}

/// Ranker returning a fixed permutation and confidence.
pub struct FixedRanker {
    pub permutation: Vec<usize>,
    pub confidence: f32,
    calls: AtomicUsize,
}

impl FixedRanker {
    pub fn new(permutation: Vec<usize>, confidence: f32) -> Arc<Self> {
        Arc::new(Self {
            permutation,
            confidence,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReadingOrderRanker for FixedRanker {
    fn name(&self) -> &str {
        "fixed"
    }

    fn rank(&self, _width: f32, _height: f32, _boxes: &[LayoutBox]) -> Result<RankedOrder, OrderingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RankedOrder::new(self.permutation.clone(), self.confidence))
    }
}

/// Ranker that always fails.
pub struct BrokenRanker;

impl ReadingOrderRanker for BrokenRanker {
    fn name(&self) -> &str {
        "broken"
    }

    fn rank(&self, _width: f32, _height: f32, _boxes: &[LayoutBox]) -> Result<RankedOrder, OrderingError> {
        Err(OrderingError::new("model not loaded"))
    }
}

pub const PAGE_WIDTH: f32 = 100.0;
pub const PAGE_HEIGHT: f32 = 100.0;

pub fn region(id: u32, page: usize, bbox: (f32, f32, f32, f32), region_type: RegionType) -> Region {
    Region::new(id, page, BoundingBox::new(bbox.0, bbox.1, bbox.2, bbox.3), region_type)
}

pub fn page(index: usize, regions: Vec<Region>) -> Page {
    Page::with_regions(index, PAGE_WIDTH, PAGE_HEIGHT, regions)
}

pub fn raster() -> PageRaster {
    PageRaster::blank(200, 200, 3)
}

/// Two columns of two text regions each, ids in a scrambled order.
///
/// Reading order is 2, 0 (left column), then 3, 1 (right column).
pub fn two_column_page(index: usize) -> Page {
    page(
        index,
        vec![
            region(0, index, (5.0, 50.0, 45.0, 80.0), RegionType::Text),
            region(1, index, (55.0, 50.0, 95.0, 80.0), RegionType::Text),
            region(2, index, (5.0, 10.0, 45.0, 40.0), RegionType::Text),
            region(3, index, (55.0, 10.0, 95.0, 40.0), RegionType::Text),
        ],
    )
}
