//! Data model for detected regions, their extraction state, and the
//! assembled document tree.
//!
//! A [`Page`] owns its [`Region`]s. Each region is written exactly twice
//! during a pipeline run: once with its [`ExtractionResult`] and once with
//! its reading-order position. The [`DocumentTree`] built from the pages
//! copies everything it needs and is owned by the caller.

mod content;
mod extraction;
mod geometry;
mod raster;
mod region;
mod tree;

pub use content::{Content, FormulaContent, FormulaDisplay, TableGrid, TextContent};
pub(crate) use content::escape_html;
pub use extraction::{ExtractionResult, ExtractionSource, ExtractionStatus, Provenance};
pub use geometry::BoundingBox;
pub use raster::{PageRaster, RegionCrop};
pub use region::{ContentKind, Page, Region, RegionType};
pub use tree::{DocumentTree, Metadata, Node, NodeCounts, TableBody};
