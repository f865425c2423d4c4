//! Renderer-agnostic document tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FormulaDisplay, TableGrid};
use crate::render::FormatOptions;

/// An ordered, typed document assembled from extracted regions.
///
/// The tree owns all of its text; it holds no references into page or region
/// state, so it can outlive the pipeline run that built it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTree {
    /// Format flags the tree was assembled with
    pub format: FormatOptions,

    /// Nodes in document order
    pub nodes: Vec<Node>,
}

impl DocumentTree {
    /// Create an empty tree.
    pub fn new(format: FormatOptions) -> Self {
        Self {
            format,
            nodes: Vec::new(),
        }
    }

    /// Append a node.
    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Metadata node, if the tree carries one.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.nodes.iter().find_map(|n| match n {
            Node::Metadata(m) => Some(m),
            _ => None,
        })
    }

    /// Nodes that carry region content (no metadata or page breaks).
    pub fn content_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_content())
    }

    /// Check if the tree carries no region content.
    pub fn is_empty(&self) -> bool {
        self.content_nodes().next().is_none()
    }

    /// Count content nodes by kind.
    pub fn node_counts(&self) -> NodeCounts {
        let mut counts = NodeCounts::default();
        for node in &self.nodes {
            counts.add(node);
        }
        counts
    }
}

/// A single element of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Document header
    Metadata(Metadata),

    /// Section heading, level 1 (largest) to 5
    Heading {
        /// Heading level
        level: u8,
        /// Heading text
        text: String,
    },

    /// Body text
    Paragraph {
        /// Paragraph text
        text: String,
    },

    /// Table
    Table {
        /// Cell grid or pre-rendered markup
        body: TableBody,
    },

    /// Formula
    Formula {
        /// LaTeX or MathML, per the tree's formula format
        markup: String,
        /// Inline or block
        display: FormulaDisplay,
    },

    /// List of items, markers stripped
    List {
        /// Item texts
        items: Vec<String>,
    },

    /// Boundary between pages
    PageBreak,
}

impl Node {
    /// Create a heading node.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Node::Heading {
            level,
            text: text.into(),
        }
    }

    /// Create a paragraph node.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::Paragraph { text: text.into() }
    }

    /// Check if the node was produced from a region.
    pub fn is_content(&self) -> bool {
        !matches!(self, Node::Metadata(_) | Node::PageBreak)
    }

    /// Short name of the node kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Metadata(_) => "metadata",
            Node::Heading { .. } => "heading",
            Node::Paragraph { .. } => "paragraph",
            Node::Table { .. } => "table",
            Node::Formula { .. } => "formula",
            Node::List { .. } => "list",
            Node::PageBreak => "page_break",
        }
    }
}

/// Table body representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableBody {
    /// Structured grid, rendered as a pipe table
    Grid(TableGrid),
    /// HTML markup, embedded verbatim
    Markup(String),
}

/// Number of content nodes per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCounts {
    /// Heading nodes
    pub headings: usize,
    /// Paragraph nodes
    pub paragraphs: usize,
    /// Table nodes
    pub tables: usize,
    /// Formula nodes
    pub formulas: usize,
    /// List nodes
    pub lists: usize,
}

impl NodeCounts {
    /// Count one node.
    pub fn add(&mut self, node: &Node) {
        match node {
            Node::Heading { .. } => self.headings += 1,
            Node::Paragraph { .. } => self.paragraphs += 1,
            Node::Table { .. } => self.tables += 1,
            Node::Formula { .. } => self.formulas += 1,
            Node::List { .. } => self.lists += 1,
            Node::Metadata(_) | Node::PageBreak => {}
        }
    }

    /// Total content nodes.
    pub fn total(&self) -> usize {
        self.headings + self.paragraphs + self.tables + self.formulas + self.lists
    }
}

/// Document header with source information and region statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Source file or URI
    pub source: Option<String>,

    /// Time the document was assembled
    pub created: Option<DateTime<Utc>>,

    /// Number of pages processed
    pub page_count: usize,

    /// Number of detected regions across all pages
    pub region_count: usize,

    /// Content nodes emitted, by kind
    pub node_counts: NodeCounts,
}

impl Metadata {
    /// Convert metadata to YAML frontmatter format.
    pub fn to_yaml_frontmatter(&self) -> String {
        let mut lines = vec!["---".to_string()];

        if let Some(ref title) = self.title {
            lines.push(format!("title: \"{}\"", escape_yaml(title)));
        }
        if let Some(ref source) = self.source {
            lines.push(format!("source: \"{}\"", escape_yaml(source)));
        }
        if let Some(ref created) = self.created {
            lines.push(format!("created: {}", created.to_rfc3339()));
        }

        lines.push(format!("pages: {}", self.page_count));
        lines.push(format!("regions: {}", self.region_count));
        lines.push("nodes:".to_string());
        lines.push(format!("  headings: {}", self.node_counts.headings));
        lines.push(format!("  paragraphs: {}", self.node_counts.paragraphs));
        lines.push(format!("  tables: {}", self.node_counts.tables));
        lines.push(format!("  formulas: {}", self.node_counts.formulas));
        lines.push(format!("  lists: {}", self.node_counts.lists));

        lines.push("---".to_string());

        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
