//! Rendering module for converting document trees to output formats.
//!
//! Renderers are pure functions over a [`DocumentTree`]. They take the same
//! [`FormatOptions`] the tree was assembled with and refuse any other, so
//! the tree and its rendering cannot disagree.

mod json;
mod markdown;
mod options;
mod result;
mod text;

pub use json::{to_json, JsonFormat};
pub(crate) use json::serialize as serialize_json;
pub use markdown::{to_markdown, to_markdown_with_stats, MarkdownRenderer};
pub use options::{FormatOptions, FormulaFormat, LineBreakStyle, TableFormat};
pub use result::{RenderResult, RenderStats};
pub use text::to_text;

use crate::error::{Error, Result};
use crate::model::DocumentTree;

/// Reject format options that differ from the tree's.
fn ensure_format(tree: &DocumentTree, format: &FormatOptions) -> Result<()> {
    if tree.format != *format {
        return Err(Error::Configuration(format!(
            "format options {:?} differ from those the document was assembled with ({:?})",
            format, tree.format
        )));
    }
    Ok(())
}
