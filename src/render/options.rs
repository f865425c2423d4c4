//! Output format flags shared by the assembler and the renderers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Format flags that shape both the document tree and its rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// How tables are represented
    pub table_format: TableFormat,

    /// How formulas are represented
    pub formula_format: FormulaFormat,

    /// Separator between rendered nodes
    pub line_break_style: LineBreakStyle,

    /// Prepend a metadata node to the document
    pub include_metadata: bool,

    /// Insert a page break between consecutive pages
    pub include_page_breaks: bool,
}

impl FormatOptions {
    /// Create new format options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table format.
    pub fn with_table_format(mut self, format: TableFormat) -> Self {
        self.table_format = format;
        self
    }

    /// Set the formula format.
    pub fn with_formula_format(mut self, format: FormulaFormat) -> Self {
        self.formula_format = format;
        self
    }

    /// Set the line break style.
    pub fn with_line_break_style(mut self, style: LineBreakStyle) -> Self {
        self.line_break_style = style;
        self
    }

    /// Enable or disable the metadata node.
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    /// Enable or disable page breaks.
    pub fn with_page_breaks(mut self, include: bool) -> Self {
        self.include_page_breaks = include;
        self
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            table_format: TableFormat::Markdown,
            formula_format: FormulaFormat::Latex,
            line_break_style: LineBreakStyle::Double,
            include_metadata: true,
            include_page_breaks: true,
        }
    }
}

/// Table representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// Pipe table built from the cell grid
    #[default]
    Markdown,
    /// Embedded HTML table markup
    Html,
}

/// Formula representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaFormat {
    /// LaTeX source
    #[default]
    Latex,
    /// MathML markup
    Mathml,
}

/// Separator placed between rendered nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineBreakStyle {
    /// Blank line between nodes
    #[default]
    Double,
    /// Single newline between nodes
    Single,
}

impl LineBreakStyle {
    /// The separator string.
    pub fn separator(self) -> &'static str {
        match self {
            LineBreakStyle::Double => "\n\n",
            LineBreakStyle::Single => "\n",
        }
    }
}

fn unknown_flag(flag: &str, value: &str) -> Error {
    Error::Configuration(format!("unknown {}: '{}'", flag, value))
}

impl FromStr for TableFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(TableFormat::Markdown),
            "html" => Ok(TableFormat::Html),
            _ => Err(unknown_flag("table_format", s)),
        }
    }
}

impl FromStr for FormulaFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "latex" => Ok(FormulaFormat::Latex),
            "mathml" => Ok(FormulaFormat::Mathml),
            _ => Err(unknown_flag("formula_format", s)),
        }
    }
}

impl FromStr for LineBreakStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "double" => Ok(LineBreakStyle::Double),
            "single" => Ok(LineBreakStyle::Single),
            _ => Err(unknown_flag("line_break_style", s)),
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableFormat::Markdown => "markdown",
            TableFormat::Html => "html",
        })
    }
}

impl fmt::Display for FormulaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormulaFormat::Latex => "latex",
            FormulaFormat::Mathml => "mathml",
        })
    }
}
