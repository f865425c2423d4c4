//! Bounding box geometry.

use serde::{Deserialize, Serialize};

/// An axis-aligned box in page coordinates (origin top-left, y grows down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Box width (0 for inverted boxes).
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    /// Box height (0 for inverted boxes).
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Box area.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Check that all coordinates are finite and the box is not inverted.
    pub fn is_well_formed(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
            && self.x0 <= self.x1
            && self.y0 <= self.y1
    }

    /// Check if the box lies within a page of the given size.
    pub fn within(&self, width: f32, height: f32) -> bool {
        self.x0 >= 0.0 && self.y0 >= 0.0 && self.x1 <= width && self.y1 <= height
    }

    /// Length of the overlap between the horizontal spans of two boxes.
    pub fn horizontal_overlap(&self, other: &BoundingBox) -> f32 {
        (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0)
    }

    /// Horizontal overlap relative to the narrower of the two spans.
    ///
    /// A zero-width span counts as fully overlapping when it lies inside the
    /// other span.
    pub fn horizontal_overlap_ratio(&self, other: &BoundingBox) -> f32 {
        let narrower = self.width().min(other.width());
        if narrower <= 0.0 {
            let (point, span) = if self.width() <= 0.0 {
                (self.x0, other)
            } else {
                (other.x0, self)
            };
            return if point >= span.x0 && point <= span.x1 {
                1.0
            } else {
                0.0
            };
        }
        self.horizontal_overlap(other) / narrower
    }
}
