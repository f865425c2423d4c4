//! Whole-document processing.
//!
//! For each page the pipeline validates the raster and region catalog,
//! runs extraction and reading order concurrently, joins them and writes
//! both back. Assembly runs once every page is done.

mod options;
mod processor;

pub use options::{ErrorMode, PipelineOptions};
#[cfg(feature = "async")]
pub use processor::process_async;
pub use processor::{PageFailure, PageInput, Pipeline, PipelineOutput};
