//! Hybrid learned/spatial reading order.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{spatial_order, LayoutBox, ReadingOrderOptions, ReadingOrderRanker};
use crate::error::{OrderingError, Result};
use crate::model::Page;

/// Strategy that produced a page's order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStrategy {
    /// Learned ranker
    Learned,
    /// Column-aware spatial heuristic
    Spatial,
}

/// Reading order computed for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOrder {
    /// Detection indices in reading order
    pub order: Vec<usize>,

    /// Strategy that produced the order
    pub strategy: OrderStrategy,
}

impl PageOrder {
    /// Assign `order_index` 0..n-1 to the page's regions.
    pub fn apply(&self, page: &mut Page) -> Result<()> {
        let regions = page.regions_mut();
        for (position, &index) in self.order.iter().enumerate() {
            if let Some(region) = regions.get_mut(index) {
                region.assign_order(position)?;
            }
        }
        Ok(())
    }
}

/// Computes a deterministic reading order over a page's regions.
#[derive(Clone)]
pub struct ReadingOrderReconstructor {
    ranker: Option<Arc<dyn ReadingOrderRanker>>,
    options: ReadingOrderOptions,
}

impl ReadingOrderReconstructor {
    /// Create a reconstructor that only uses the spatial heuristic.
    pub fn new(options: ReadingOrderOptions) -> Self {
        Self {
            ranker: None,
            options,
        }
    }

    /// Consult a learned ranker first.
    pub fn with_ranker(mut self, ranker: Arc<dyn ReadingOrderRanker>) -> Self {
        self.ranker = Some(ranker);
        self
    }

    /// Options in use.
    pub fn options(&self) -> &ReadingOrderOptions {
        &self.options
    }

    /// Compute the order of a page. Never fails: any ranker problem falls
    /// back to the spatial heuristic.
    pub fn reconstruct(&self, page: &Page) -> PageOrder {
        let boxes: Vec<LayoutBox> = page.regions().iter().map(LayoutBox::from).collect();

        if let Some(ranker) = self.ranker.as_ref().filter(|_| self.options.use_ranker) {
            match self.learned(ranker.as_ref(), page, &boxes) {
                Ok(order) => {
                    log::debug!("Page {}: learned order from {}", page.index, ranker.name());
                    return PageOrder {
                        order,
                        strategy: OrderStrategy::Learned,
                    };
                }
                Err(e) => {
                    log::warn!(
                        "Page {}: {} rejected ({}), using spatial order",
                        page.index,
                        ranker.name(),
                        e
                    );
                }
            }
        }

        log::debug!("Page {}: spatial order over {} regions", page.index, boxes.len());
        PageOrder {
            order: spatial_order(&boxes, self.options.clustering_threshold),
            strategy: OrderStrategy::Spatial,
        }
    }

    fn learned(
        &self,
        ranker: &dyn ReadingOrderRanker,
        page: &Page,
        boxes: &[LayoutBox],
    ) -> std::result::Result<Vec<usize>, OrderingError> {
        let ranked = ranker.rank(page.width, page.height, boxes)?;
        if !ranked.is_permutation_of(boxes.len()) {
            return Err(OrderingError::new(format!(
                "not a permutation of {} regions",
                boxes.len()
            )));
        }
        if ranked.confidence.is_nan() || ranked.confidence < self.options.confidence_threshold {
            return Err(OrderingError::new(format!(
                "confidence {:.2} below {:.2}",
                ranked.confidence, self.options.confidence_threshold
            )));
        }
        Ok(ranked.permutation)
    }
}

impl Default for ReadingOrderReconstructor {
    fn default() -> Self {
        Self::new(ReadingOrderOptions::default())
    }
}

impl fmt::Debug for ReadingOrderReconstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadingOrderReconstructor")
            .field("ranker", &self.ranker.as_ref().map(|r| r.name().to_string()))
            .field("options", &self.options)
            .finish()
    }
}
