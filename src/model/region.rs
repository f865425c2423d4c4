//! Region catalog: detected regions and the pages that own them.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{BoundingBox, ExtractionResult};
use crate::error::{Error, Result};

/// Layout class assigned to a region by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionType {
    /// Body text
    Text,
    /// A title or section heading
    Title,
    /// A picture, chart or diagram
    Figure,
    /// Caption attached to a figure
    FigureCaption,
    /// A table
    Table,
    /// Caption attached to a table
    TableCaption,
    /// A display formula
    Formula,
    /// Label attached to a formula
    FormulaCaption,
    /// A bulleted or numbered list
    List,
}

impl RegionType {
    /// All region types, in declaration order.
    pub const ALL: [RegionType; 9] = [
        RegionType::Text,
        RegionType::Title,
        RegionType::Figure,
        RegionType::FigureCaption,
        RegionType::Table,
        RegionType::TableCaption,
        RegionType::Formula,
        RegionType::FormulaCaption,
        RegionType::List,
    ];

    /// The content kind an extractor must produce for this region type.
    pub fn content_kind(self) -> ContentKind {
        match self {
            RegionType::Table => ContentKind::Table,
            RegionType::Formula => ContentKind::Formula,
            _ => ContentKind::Text,
        }
    }

    /// Caption and illustrative types, filtered unless extraction succeeded.
    pub fn default_placeholder_types() -> Vec<RegionType> {
        vec![
            RegionType::Figure,
            RegionType::FigureCaption,
            RegionType::TableCaption,
            RegionType::FormulaCaption,
        ]
    }

    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            RegionType::Text => "Text",
            RegionType::Title => "Title",
            RegionType::Figure => "Figure",
            RegionType::FigureCaption => "FigureCaption",
            RegionType::Table => "Table",
            RegionType::TableCaption => "TableCaption",
            RegionType::Formula => "Formula",
            RegionType::FormulaCaption => "FormulaCaption",
            RegionType::List => "List",
        }
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();
        let region_type = match normalized.as_str() {
            "text" | "plaintext" => RegionType::Text,
            "title" => RegionType::Title,
            "figure" => RegionType::Figure,
            "figurecaption" => RegionType::FigureCaption,
            "table" => RegionType::Table,
            "tablecaption" => RegionType::TableCaption,
            "formula" | "isolateformula" => RegionType::Formula,
            "formulacaption" => RegionType::FormulaCaption,
            "list" => RegionType::List,
            _ => return Err(Error::Other(format!("Unknown region type: {}", s))),
        };
        Ok(region_type)
    }
}

/// Kind of typed payload a region's extractor produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Recognized text (OCR)
    Text,
    /// Table structure
    Table,
    /// Formula markup
    Formula,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentKind::Text => "text",
            ContentKind::Table => "table",
            ContentKind::Formula => "formula",
        };
        f.write_str(name)
    }
}

/// A detected, typed area of a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Identifier, unique within the page
    pub id: u32,

    /// Page the region belongs to (0-based)
    pub page_index: usize,

    /// Location on the page
    pub bbox: BoundingBox,

    /// Layout class
    pub region_type: RegionType,

    /// Detector confidence
    pub detection_confidence: f32,

    /// Dominant font size in points, if known
    pub font_size: Option<f32>,

    order_index: Option<usize>,

    extraction: Option<ExtractionResult>,
}

impl Region {
    /// Create a freshly detected region.
    pub fn new(id: u32, page_index: usize, bbox: BoundingBox, region_type: RegionType) -> Self {
        Self {
            id,
            page_index,
            bbox,
            region_type,
            detection_confidence: 1.0,
            font_size: None,
            order_index: None,
            extraction: None,
        }
    }

    /// Set the detector confidence.
    pub fn with_detection_confidence(mut self, confidence: f32) -> Self {
        self.detection_confidence = confidence;
        self
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Position in the page's reading order, once reconstructed.
    pub fn order_index(&self) -> Option<usize> {
        self.order_index
    }

    /// Extraction result, once dispatched.
    pub fn extraction(&self) -> Option<&ExtractionResult> {
        self.extraction.as_ref()
    }

    /// Record the extraction result. The slot can be written only once.
    pub fn set_extraction(&mut self, result: ExtractionResult) -> Result<()> {
        if self.extraction.is_some() {
            return Err(Error::AlreadyWritten {
                region_id: self.id,
                field: "extraction",
            });
        }
        self.extraction = Some(result);
        Ok(())
    }

    /// Record the reading-order position. The slot can be written only once.
    pub fn assign_order(&mut self, index: usize) -> Result<()> {
        if self.order_index.is_some() {
            return Err(Error::AlreadyWritten {
                region_id: self.id,
                field: "order_index",
            });
        }
        self.order_index = Some(index);
        Ok(())
    }
}

/// A single page and the regions detected on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based)
    pub index: usize,

    /// Page width in layout coordinates
    pub width: f32,

    /// Page height in layout coordinates
    pub height: f32,

    regions: Vec<Region>,
}

impl Page {
    /// Create an empty page.
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            regions: Vec::new(),
        }
    }

    /// Create a page from detected regions.
    pub fn with_regions(index: usize, width: f32, height: f32, regions: Vec<Region>) -> Self {
        let mut page = Self::new(index, width, height);
        for region in regions {
            page.add_region(region);
        }
        page
    }

    /// Add a region, keeping the catalog ordered by id.
    pub fn add_region(&mut self, region: Region) {
        let pos = self.regions.partition_point(|r| r.id <= region.id);
        self.regions.insert(pos, region);
    }

    /// Regions ordered by id. The position is the detection index.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Mutable access to regions by detection index.
    pub(crate) fn regions_mut(&mut self) -> &mut [Region] {
        &mut self.regions
    }

    /// Look up a region by id.
    pub fn region(&self, id: u32) -> Option<&Region> {
        self.regions
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|i| &self.regions[i])
    }

    /// Number of regions.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Check if the page has no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions in reading order (regions without an order index are omitted).
    pub fn ordered_regions(&self) -> Vec<&Region> {
        let mut ordered: Vec<&Region> = self
            .regions
            .iter()
            .filter(|r| r.order_index.is_some())
            .collect();
        ordered.sort_by_key(|r| r.order_index);
        ordered
    }

    /// Check catalog invariants: finite positive page size, unique ids,
    /// matching page index, well-formed boxes inside the page.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(Error::InvalidPage {
                page_index: self.index,
                width: self.width,
                height: self.height,
            });
        }

        let mut seen = HashSet::with_capacity(self.regions.len());
        for region in &self.regions {
            let invalid = |reason: String| Error::InvalidRegion {
                page_index: self.index,
                region_id: region.id,
                reason,
            };

            if !seen.insert(region.id) {
                return Err(invalid("duplicate region id".to_string()));
            }
            if region.page_index != self.index {
                return Err(invalid(format!(
                    "region belongs to page {}",
                    region.page_index
                )));
            }
            if !region.bbox.is_well_formed() {
                return Err(invalid(format!("malformed bbox {:?}", region.bbox)));
            }
            if !region.bbox.within(self.width, self.height) {
                return Err(invalid(format!(
                    "bbox {:?} outside page {}x{}",
                    region.bbox, self.width, self.height
                )));
            }
        }
        Ok(())
    }
}
