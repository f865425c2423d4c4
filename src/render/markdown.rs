//! Markdown rendering for document trees.

use crate::error::Result;
use crate::model::{DocumentTree, FormulaDisplay, Node, TableBody, TableGrid};

use super::{ensure_format, FormatOptions, FormulaFormat, RenderResult, RenderStats};

/// Convert a document tree to Markdown.
pub fn to_markdown(tree: &DocumentTree, format: &FormatOptions) -> Result<String> {
    ensure_format(tree, format)?;
    let mut renderer = MarkdownRenderer::new(format.clone());
    Ok(renderer.render(tree))
}

/// Convert a document tree to Markdown with statistics.
pub fn to_markdown_with_stats(tree: &DocumentTree, format: &FormatOptions) -> Result<RenderResult> {
    ensure_format(tree, format)?;
    let renderer = MarkdownRenderer::new(format.clone());
    Ok(renderer.render_with_stats(tree))
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    format: FormatOptions,
    stats: RenderStats,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(format: FormatOptions) -> Self {
        Self {
            format,
            stats: RenderStats::new(),
        }
    }

    /// Render a document tree to Markdown.
    pub fn render(&mut self, tree: &DocumentTree) -> String {
        let blocks: Vec<String> = tree
            .nodes
            .iter()
            .filter_map(|node| self.render_node(node))
            .collect();
        blocks.join(self.format.line_break_style.separator())
    }

    /// Render a document tree to Markdown with statistics.
    pub fn render_with_stats(mut self, tree: &DocumentTree) -> RenderResult {
        let content = self.render(tree);

        // Count words and characters in final content
        self.stats.count_text(&content);

        RenderResult::new(content, tree.metadata().cloned(), self.stats)
    }

    fn render_node(&mut self, node: &Node) -> Option<String> {
        self.stats.add_node(node);
        match node {
            Node::Metadata(metadata) => Some(metadata.to_yaml_frontmatter()),
            Node::Heading { level, text } => {
                let prefix = "#".repeat((*level).clamp(1, 5) as usize);
                Some(format!("{} {}", prefix, escape_markdown(text)))
            }
            Node::Paragraph { text } => Some(escape_markdown(text)),
            Node::Table { body } => match body {
                TableBody::Grid(grid) => render_pipe_table(grid),
                TableBody::Markup(html) => Some(html.clone()),
            },
            Node::Formula { markup, display } => Some(self.render_formula(markup, *display)),
            Node::List { items } => Some(
                items
                    .iter()
                    .map(|item| format!("- {}", escape_markdown(item)))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Node::PageBreak => Some("---".to_string()),
        }
    }

    fn render_formula(&self, markup: &str, display: FormulaDisplay) -> String {
        match (self.format.formula_format, display) {
            (FormulaFormat::Mathml, _) => markup.to_string(),
            (FormulaFormat::Latex, FormulaDisplay::Block) => format!("$$\n{}\n$$", markup),
            (FormulaFormat::Latex, FormulaDisplay::Inline) => format!("${}$", markup),
        }
    }
}

/// Render a grid as a pipe table. Rows with no text are skipped; all rows
/// are padded to the widest row.
fn render_pipe_table(grid: &TableGrid) -> Option<String> {
    let mut body = grid.rows.iter().filter(|r| !is_blank_row(r.as_slice()));

    let header: Vec<String> = if grid.headers.is_empty() {
        body.next()?.clone()
    } else {
        grid.headers.clone()
    };
    let width = grid.column_count().max(1);

    let mut lines = vec![pipe_row(&header, width)];
    lines.push(format!("| {} |", vec!["---"; width].join(" | ")));
    for row in body {
        lines.push(pipe_row(row, width));
    }
    Some(lines.join("\n"))
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn pipe_row(cells: &[String], width: usize) -> String {
    let cleaned: Vec<String> = (0..width)
        .map(|i| cells.get(i).map(|c| clean_cell(c)).unwrap_or_default())
        .collect();
    format!("| {} |", cleaned.join(" | "))
}

/// Collapse whitespace and escape pipes inside a table cell.
fn clean_cell(cell: &str) -> String {
    cell.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            // Core formatting that must be escaped
            '\\' | '`' | '*' | '_' |
            // Brackets for links/images, pipe for tables
            '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
