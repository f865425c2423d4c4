//! Learned reading order provider interface.

use crate::error::OrderingError;
use crate::model::{BoundingBox, Region, RegionType};

/// Geometry and type of a region, all a ranker may look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    /// Location on the page
    pub bbox: BoundingBox,

    /// Layout class
    pub region_type: RegionType,
}

impl From<&Region> for LayoutBox {
    fn from(region: &Region) -> Self {
        Self {
            bbox: region.bbox,
            region_type: region.region_type,
        }
    }
}

/// Order proposed by a ranker.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedOrder {
    /// Detection indices in reading order
    pub permutation: Vec<usize>,

    /// Page-level confidence in [0, 1]
    pub confidence: f32,
}

impl RankedOrder {
    /// Create a ranked order.
    pub fn new(permutation: Vec<usize>, confidence: f32) -> Self {
        Self {
            permutation,
            confidence,
        }
    }

    /// Check that the permutation covers `0..len` exactly once.
    pub fn is_permutation_of(&self, len: usize) -> bool {
        if self.permutation.len() != len {
            return false;
        }
        let mut seen = vec![false; len];
        for &index in &self.permutation {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }
}

/// Trait for learned reading order models.
pub trait ReadingOrderRanker: Send + Sync {
    /// Name of this ranker.
    fn name(&self) -> &str;

    /// Rank the boxes of a page sized `width` x `height`.
    fn rank(&self, width: f32, height: f32, boxes: &[LayoutBox]) -> Result<RankedOrder, OrderingError>;
}
