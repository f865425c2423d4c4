//! Page rasters and per-region pixel crops.

use std::sync::Arc;

use super::BoundingBox;
use crate::error::{Error, ExtractionError, Result};

/// A decoded page image, as produced by the external image converter.
///
/// Pixels are row-major, `channels` bytes per pixel. The buffer is shared so
/// a page raster can be handed to worker threads without copying.
#[derive(Debug, Clone)]
pub struct PageRaster {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Bytes per pixel (1 = gray, 3 = RGB, 4 = RGBA)
    pub channels: u8,

    pixels: Arc<Vec<u8>>,
}

impl PageRaster {
    /// Create a raster from a pixel buffer.
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            pixels: Arc::new(pixels),
        }
    }

    /// Create a white raster of the given size.
    pub fn blank(width: u32, height: u32, channels: u8) -> Self {
        let len = width as usize * height as usize * channels as usize;
        Self::new(width, height, channels, vec![255; len])
    }

    /// Raw pixel buffer.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Check that the buffer matches the declared dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::UnreadableImage(format!(
                "empty raster {}x{}",
                self.width, self.height
            )));
        }
        if !matches!(self.channels, 1 | 3 | 4) {
            return Err(Error::UnreadableImage(format!(
                "unsupported channel count {}",
                self.channels
            )));
        }
        let expected = self.stride() * self.height as usize;
        if self.pixels.len() != expected {
            return Err(Error::UnreadableImage(format!(
                "buffer holds {} bytes, expected {}",
                self.pixels.len(),
                expected
            )));
        }
        Ok(())
    }

    /// Copy out the pixels under `bbox`, given in page coordinates of a page
    /// sized `page_width` x `page_height`.
    pub fn crop(
        &self,
        bbox: &BoundingBox,
        page_width: f32,
        page_height: f32,
    ) -> std::result::Result<RegionCrop, ExtractionError> {
        if page_width <= 0.0 || page_height <= 0.0 {
            return Err(ExtractionError::permanent("page has no area"));
        }
        let sx = self.width as f32 / page_width;
        let sy = self.height as f32 / page_height;

        let clamp_x = |v: f32| (v.max(0.0) as u32).min(self.width);
        let clamp_y = |v: f32| (v.max(0.0) as u32).min(self.height);

        let x0 = clamp_x((bbox.x0 * sx).floor());
        let y0 = clamp_y((bbox.y0 * sy).floor());
        let x1 = clamp_x((bbox.x1 * sx).ceil());
        let y1 = clamp_y((bbox.y1 * sy).ceil());

        if x1 <= x0 || y1 <= y0 {
            return Err(ExtractionError::permanent(format!(
                "malformed crop {}x{} for bbox {:?}",
                x1.saturating_sub(x0),
                y1.saturating_sub(y0),
                bbox
            )));
        }

        let channels = self.channels as usize;
        let row_len = (x1 - x0) as usize * channels;
        let stride = self.stride();
        let mut pixels = Vec::with_capacity(row_len * (y1 - y0) as usize);
        for y in y0..y1 {
            let start = y as usize * stride + x0 as usize * channels;
            let row = self
                .pixels
                .get(start..start + row_len)
                .ok_or_else(|| ExtractionError::permanent("crop exceeds raster buffer"))?;
            pixels.extend_from_slice(row);
        }

        Ok(RegionCrop {
            width: x1 - x0,
            height: y1 - y0,
            channels: self.channels,
            pixels,
        })
    }
}

/// Pixels of a single region, handed to content extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCrop {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Bytes per pixel
    pub channels: u8,

    /// Row-major pixel data
    pub pixels: Vec<u8>,
}
