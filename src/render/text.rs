//! Plain text rendering for document trees.

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{DocumentTree, Node, TableBody, TableGrid};

use super::{ensure_format, FormatOptions};

/// Convert a document tree to plain text.
///
/// Metadata and page breaks are omitted; tables become tab-separated rows
/// and markup is reduced to its text.
pub fn to_text(tree: &DocumentTree, format: &FormatOptions) -> Result<String> {
    ensure_format(tree, format)?;
    let tags = Regex::new(r"<[^>]+>").map_err(|e| Error::Render(e.to_string()))?;

    let blocks: Vec<String> = tree
        .nodes
        .iter()
        .filter_map(|node| match node {
            Node::Metadata(_) | Node::PageBreak => None,
            Node::Heading { text, .. } | Node::Paragraph { text } => Some(text.clone()),
            Node::Table { body } => match body {
                TableBody::Grid(grid) => Some(grid_text(grid)),
                TableBody::Markup(html) => Some(markup_text(&tags, html)),
            },
            Node::Formula { markup, .. } => Some(markup_text(&tags, markup)),
            Node::List { items } => Some(items.join("\n")),
        })
        .filter(|block| !block.trim().is_empty())
        .collect();

    Ok(blocks.join(format.line_break_style.separator()))
}

fn grid_text(grid: &TableGrid) -> String {
    std::iter::once(&grid.headers)
        .chain(grid.rows.iter())
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .map(|row| {
            row.iter()
                .map(|c| c.trim())
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn markup_text(tags: &Regex, markup: &str) -> String {
    let rows = markup.replace("</tr>", "\n").replace("</th>", "\t").replace("</td>", "\t");
    let text = tags.replace_all(&rows, "");
    text.lines()
        .map(|line| line.trim_end_matches('\t').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
