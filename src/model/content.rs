//! Typed extraction payloads.

use serde::{Deserialize, Serialize};

/// Content produced by an extractor for a single region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// A recognized text run
    Text(TextContent),

    /// A recognized table grid
    Table(TableGrid),

    /// Recognized formula markup
    Formula(FormulaContent),
}

impl Content {
    /// Create text content.
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(TextContent::new(text))
    }

    /// Get the text payload, if any.
    pub fn as_text(&self) -> Option<&TextContent> {
        match self {
            Content::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Check if the payload carries no usable content.
    pub fn is_empty(&self) -> bool {
        match self {
            Content::Text(t) => t.text.trim().is_empty(),
            Content::Table(t) => t.is_empty(),
            Content::Formula(f) => f.latex.trim().is_empty() && f.mathml.is_none(),
        }
    }
}

/// A run of recognized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// The text content
    pub text: String,

    /// Font size in points, when the recognizer reports one
    pub font_size: Option<f32>,
}

impl TextContent {
    /// Create a text run without font information.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: None,
        }
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }
}

/// A table as a header row plus body rows of plain-text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGrid {
    /// Header cells (may be empty)
    pub headers: Vec<String>,

    /// Body rows
    pub rows: Vec<Vec<String>>,
}

impl TableGrid {
    /// Create a table grid.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Create a table grid from string slices.
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    /// Number of columns (widest of header and rows).
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Check if no body cell carries text. A header without rows is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|c| c.trim().is_empty())
    }

    /// Render the grid as an HTML table.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table>\n");
        if !self.headers.is_empty() {
            html.push_str("<thead>\n<tr>");
            for cell in &self.headers {
                html.push_str(&format!("<th>{}</th>", escape_html(cell.trim())));
            }
            html.push_str("</tr>\n</thead>\n");
        }
        html.push_str("<tbody>\n");
        for row in &self.rows {
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", escape_html(cell.trim())));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>");
        html
    }
}

/// Whether a formula sits inside a line of text or on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaDisplay {
    /// Inline with surrounding text
    Inline,
    /// Displayed as its own block
    #[default]
    Block,
}

/// Recognized formula markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaContent {
    /// LaTeX source
    pub latex: String,

    /// MathML markup, when the recognizer produces it
    pub mathml: Option<String>,

    /// Inline/block hint from the recognizer
    pub display: FormulaDisplay,
}

impl FormulaContent {
    /// Create a block formula from LaTeX.
    pub fn block(latex: impl Into<String>) -> Self {
        Self {
            latex: latex.into(),
            mathml: None,
            display: FormulaDisplay::Block,
        }
    }

    /// Create an inline formula from LaTeX.
    pub fn inline(latex: impl Into<String>) -> Self {
        Self {
            latex: latex.into(),
            mathml: None,
            display: FormulaDisplay::Inline,
        }
    }

    /// Attach MathML markup.
    pub fn with_mathml(mut self, mathml: impl Into<String>) -> Self {
        self.mathml = Some(mathml.into());
        self
    }
}

/// Escape text for inclusion in HTML/MathML element content.
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
