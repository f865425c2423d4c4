//! Rendering result with metadata and statistics.

use crate::model::{Metadata, Node};
use serde::{Deserialize, Serialize};

/// Result of rendering a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered content (Markdown, text, etc.)
    pub content: String,

    /// Document metadata, when the tree carries a metadata node
    pub metadata: Option<Metadata>,

    /// Rendering statistics
    pub stats: RenderStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, metadata: Option<Metadata>, stats: RenderStats) -> Self {
        Self {
            content,
            metadata,
            stats,
        }
    }
}

/// Statistics collected while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Number of page breaks rendered
    pub page_break_count: u32,

    /// Number of headings rendered
    pub heading_count: u32,

    /// Number of paragraphs rendered
    pub paragraph_count: u32,

    /// Number of tables rendered
    pub table_count: u32,

    /// Number of formulas rendered
    pub formula_count: u32,

    /// Number of list items rendered
    pub list_item_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a rendered node.
    pub fn add_node(&mut self, node: &Node) {
        match node {
            Node::Heading { .. } => self.heading_count += 1,
            Node::Paragraph { .. } => self.paragraph_count += 1,
            Node::Table { .. } => self.table_count += 1,
            Node::Formula { .. } => self.formula_count += 1,
            Node::List { items } => self.list_item_count += items.len() as u32,
            Node::PageBreak => self.page_break_count += 1,
            Node::Metadata(_) => {}
        }
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        // Word count: whitespace-separated tokens
        self.word_count += text.split_whitespace().count() as u32;

        // Character count: non-whitespace characters
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }
}
