//! Reading order reconstruction.
//!
//! Ordering looks only at region geometry and type, so it can run while the
//! page's regions are still being extracted. A learned
//! [`ReadingOrderRanker`] is tried first when configured; a low-confidence,
//! failing or malformed ranking falls back to the spatial heuristic in
//! [`spatial_order`]. Ordering is strictly per page.

mod options;
mod ranker;
mod reconstructor;
mod spatial;

pub use options::ReadingOrderOptions;
pub use ranker::{LayoutBox, RankedOrder, ReadingOrderRanker};
pub use reconstructor::{OrderStrategy, PageOrder, ReadingOrderReconstructor};
pub use spatial::{cluster_columns, spatial_order};
