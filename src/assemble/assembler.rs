//! Document tree assembly.

use chrono::{DateTime, Utc};

use super::{AssemblyOptions, TextNormalizer};
use crate::error::{Error, Result};
use crate::model::{
    escape_html, Content, DocumentTree, FormulaContent, FormulaDisplay, Metadata, Node, Page,
    Region, RegionType, TableBody, TableGrid, TextContent,
};
use crate::render::{FormulaFormat, TableFormat};

/// Descriptive information recorded in the metadata node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    /// Document title
    pub title: Option<String>,

    /// Source file or URI
    pub source: Option<String>,

    /// Creation timestamp
    pub created: Option<DateTime<Utc>>,
}

impl DocumentInfo {
    /// Create empty document info.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the creation timestamp.
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }
}

/// Joins ordered, extracted pages into a [`DocumentTree`].
///
/// The assembler only reads regions. Every surviving region yields exactly
/// one node, in ascending `order_index`, grouped by ascending page index.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    options: AssemblyOptions,
    normalizer: TextNormalizer,
}

impl DocumentAssembler {
    /// Create an assembler, validating its options.
    pub fn new(options: AssemblyOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            normalizer: TextNormalizer::new()?,
        })
    }

    /// Options in use.
    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Assemble pages into a document tree.
    pub fn assemble(&self, pages: &[Page], info: &DocumentInfo) -> Result<DocumentTree> {
        let format = &self.options.format;
        let mut tree = DocumentTree::new(format.clone());

        let mut sorted: Vec<&Page> = pages.iter().collect();
        sorted.sort_by_key(|p| p.index);

        for (i, page) in sorted.iter().enumerate() {
            if i > 0 && format.include_page_breaks {
                tree.push(Node::PageBreak);
            }
            for region in self.ordered(page)? {
                if let Some(node) = self.node_for(region) {
                    tree.push(node);
                }
            }
        }

        if format.include_metadata {
            let metadata = Metadata {
                title: info.title.clone(),
                source: info.source.clone(),
                created: info.created,
                page_count: pages.len(),
                region_count: pages.iter().map(|p| p.region_count()).sum(),
                node_counts: tree.node_counts(),
            };
            tree.nodes.insert(0, Node::Metadata(metadata));
        }

        log::debug!(
            "Assembled {} nodes from {} pages",
            tree.node_counts().total(),
            pages.len()
        );
        Ok(tree)
    }

    /// Regions of a page in reading order; every region must be ordered.
    fn ordered<'p>(&self, page: &'p Page) -> Result<Vec<&'p Region>> {
        if let Some(region) = page.regions().iter().find(|r| r.order_index().is_none()) {
            return Err(Error::InvalidRegion {
                page_index: page.index,
                region_id: region.id,
                reason: "no reading order assigned".to_string(),
            });
        }
        Ok(page.ordered_regions())
    }

    /// Node for one region, or `None` if the region is filtered out.
    fn node_for(&self, region: &Region) -> Option<Node> {
        let result = region.extraction()?;
        if result.is_failed() {
            log::debug!("Region {}: dropped, extraction failed", region.id);
            return None;
        }
        if self.options.is_placeholder(region.region_type) && !result.is_success() {
            log::debug!(
                "Region {}: dropped {} with {:?} extraction",
                region.id,
                region.region_type,
                result.status
            );
            return None;
        }
        let content = result.content.as_ref().filter(|c| !c.is_empty())?;

        match content {
            Content::Table(grid) => Some(self.table_node(grid)),
            Content::Formula(formula) => self.formula_node(formula),
            Content::Text(text) => self.text_node(region, text),
        }
    }

    fn table_node(&self, grid: &TableGrid) -> Node {
        let body = match self.options.format.table_format {
            TableFormat::Markdown => TableBody::Grid(grid.clone()),
            TableFormat::Html => TableBody::Markup(grid.to_html()),
        };
        Node::Table { body }
    }

    fn formula_node(&self, formula: &FormulaContent) -> Option<Node> {
        let latex = self.normalizer.clean_markup(&formula.latex);
        let markup = match self.options.format.formula_format {
            FormulaFormat::Latex if latex.is_empty() => return None,
            FormulaFormat::Latex => latex,
            FormulaFormat::Mathml => match formula.mathml.as_deref().map(str::trim) {
                Some(mathml) if !mathml.is_empty() => mathml.to_string(),
                _ if latex.is_empty() => return None,
                _ => wrap_latex_in_mathml(&latex, formula.display),
            },
        };
        Some(Node::Formula {
            markup,
            display: formula.display,
        })
    }

    fn text_node(&self, region: &Region, text: &TextContent) -> Option<Node> {
        if self.normalizer.is_placeholder(&text.text) {
            log::debug!("Region {}: dropped placeholder text", region.id);
            return None;
        }

        if region.region_type == RegionType::List {
            let items = self.normalizer.list_items(&text.text);
            return (!items.is_empty()).then_some(Node::List { items });
        }

        let cleaned = self.normalizer.clean(&text.text);
        if cleaned.is_empty() {
            return None;
        }
        if region.region_type == RegionType::Title {
            let font_size = region.font_size.or(text.font_size);
            let level = self.options.title_level_thresholds.level_for(font_size);
            return Some(Node::heading(level, cleaned));
        }
        Some(Node::paragraph(cleaned))
    }
}

/// MathML carrying the LaTeX source as an annotation.
fn wrap_latex_in_mathml(latex: &str, display: FormulaDisplay) -> String {
    let display = match display {
        FormulaDisplay::Block => "block",
        FormulaDisplay::Inline => "inline",
    };
    format!(
        "<math xmlns=\"http://www.w3.org/1998/Math/MathML\" display=\"{}\"><semantics><annotation encoding=\"application/x-tex\">{}</annotation></semantics></math>",
        display,
        escape_html(latex)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, ExtractionResult, ExtractionSource, ExtractionStatus};
    use crate::assemble::TitleLevelThresholds;
    use crate::render::FormatOptions;

    fn region(id: u32, region_type: RegionType, order: usize, result: Option<ExtractionResult>) -> Region {
        let y = id as f32 * 10.0;
        let mut region = Region::new(id, 0, BoundingBox::new(0.0, y, 100.0, y + 5.0), region_type);
        region.assign_order(order).unwrap();
        if let Some(result) = result {
            region.set_extraction(result).unwrap();
        }
        region
    }

    fn ok(content: Content) -> ExtractionResult {
        ExtractionResult::success(content, 0.9, ExtractionSource::Local)
    }

    fn bare() -> DocumentAssembler {
        let format = FormatOptions::new().with_metadata(false).with_page_breaks(false);
        DocumentAssembler::new(AssemblyOptions::new().with_format(format)).unwrap()
    }

    #[test]
    fn test_nodes_follow_order_index() {
        let page = Page::with_regions(
            0,
            200.0,
            200.0,
            vec![
                region(1, RegionType::Text, 1, Some(ok(Content::text("second")))),
                region(2, RegionType::Text, 0, Some(ok(Content::text("first")))),
            ],
        );
        let tree = bare().assemble(&[page], &DocumentInfo::new()).unwrap();
        assert_eq!(
            tree.nodes,
            vec![Node::paragraph("first"), Node::paragraph("second")]
        );
    }

    #[test]
    fn test_unordered_region_is_invalid() {
        let unordered = Region::new(1, 0, BoundingBox::new(0.0, 0.0, 10.0, 10.0), RegionType::Text);
        let page = Page::with_regions(0, 100.0, 100.0, vec![unordered]);
        let err = bare().assemble(&[page], &DocumentInfo::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidRegion { region_id: 1, .. }));
    }

    #[test]
    fn test_placeholder_requires_success() {
        let low = ExtractionResult {
            status: ExtractionStatus::LowConfidence,
            ..ok(Content::text("Figure 1: overview"))
        };
        let page = Page::with_regions(
            0,
            200.0,
            200.0,
            vec![
                region(1, RegionType::FigureCaption, 0, Some(low.clone())),
                region(2, RegionType::Text, 1, Some(low)),
                region(3, RegionType::Figure, 2, Some(ExtractionResult::failed(2))),
                region(4, RegionType::TableCaption, 3, Some(ok(Content::text("Table 2")))),
            ],
        );
        let tree = bare().assemble(&[page], &DocumentInfo::new()).unwrap();
        assert_eq!(
            tree.nodes,
            vec![Node::paragraph("Figure 1: overview"), Node::paragraph("Table 2")]
        );
    }

    #[test]
    fn test_bracketed_placeholder_text_dropped() {
        let page = Page::with_regions(
            0,
            200.0,
            200.0,
            vec![region(1, RegionType::Text, 0, Some(ok(Content::text("[Figure]"))))],
        );
        let tree = bare().assemble(&[page], &DocumentInfo::new()).unwrap();
        assert!(tree.nodes.is_empty());
    }

    #[test]
    fn test_heading_level_from_payload_font_size() {
        let title = TextContent::new("Results").with_font_size(23.0);
        let page = Page::with_regions(
            0,
            200.0,
            200.0,
            vec![region(1, RegionType::Title, 0, Some(ok(Content::Text(title))))],
        );
        let tree = bare().assemble(&[page], &DocumentInfo::new()).unwrap();
        assert_eq!(tree.nodes, vec![Node::heading(2, "Results")]);
    }

    #[test]
    fn test_list_items() {
        let page = Page::with_regions(
            0,
            200.0,
            200.0,
            vec![region(1, RegionType::List, 0, Some(ok(Content::text("- a\n- b"))))],
        );
        let tree = bare().assemble(&[page], &DocumentInfo::new()).unwrap();
        assert_eq!(
            tree.nodes,
            vec![Node::List {
                items: vec!["a".into(), "b".into()]
            }]
        );
    }

    #[test]
    fn test_formula_mathml_wraps_latex() {
        let format = FormatOptions::new()
            .with_metadata(false)
            .with_formula_format(FormulaFormat::Mathml);
        let assembler = DocumentAssembler::new(AssemblyOptions::new().with_format(format)).unwrap();
        let page = Page::with_regions(
            0,
            200.0,
            200.0,
            vec![region(
                1,
                RegionType::Formula,
                0,
                Some(ok(Content::Formula(FormulaContent::block("a < b")))),
            )],
        );
        let tree = assembler.assemble(&[page], &DocumentInfo::new()).unwrap();
        match &tree.nodes[0] {
            Node::Formula { markup, display } => {
                assert!(markup.contains("<annotation encoding=\"application/x-tex\">a &lt; b</annotation>"));
                assert_eq!(*display, FormulaDisplay::Block);
            }
            other => panic!("expected formula, got {:?}", other),
        }
    }

    #[test]
    fn test_formula_latex_keeps_line_breaks() {
        let latex = "\\begin{aligned}\nx &= 1 \\\\\ny &= 2\n\\end{aligned}";
        let page = Page::with_regions(
            0,
            200.0,
            200.0,
            vec![region(
                1,
                RegionType::Formula,
                0,
                Some(ok(Content::Formula(FormulaContent::block(format!("  {}\n", latex))))),
            )],
        );
        let tree = bare().assemble(&[page], &DocumentInfo::new()).unwrap();
        assert_eq!(
            tree.nodes,
            vec![Node::Formula {
                markup: latex.to_string(),
                display: FormulaDisplay::Block,
            }]
        );
    }

    #[test]
    fn test_html_table() {
        let format = FormatOptions::new()
            .with_metadata(false)
            .with_table_format(TableFormat::Html);
        let assembler = DocumentAssembler::new(AssemblyOptions::new().with_format(format)).unwrap();
        let grid = TableGrid::from_strs(&["A"], &[&["1"]]);
        let page = Page::with_regions(
            0,
            200.0,
            200.0,
            vec![region(1, RegionType::Table, 0, Some(ok(Content::Table(grid))))],
        );
        let tree = assembler.assemble(&[page], &DocumentInfo::new()).unwrap();
        assert!(matches!(
            &tree.nodes[0],
            Node::Table { body: TableBody::Markup(html) } if html.starts_with("<table>")
        ));
    }

    #[test]
    fn test_page_breaks_and_metadata() {
        let assembler = DocumentAssembler::new(AssemblyOptions::default()).unwrap();
        let first = Page::with_regions(
            0,
            200.0,
            200.0,
            vec![region(1, RegionType::Text, 0, Some(ok(Content::text("one"))))],
        );
        let empty = Page::new(1, 200.0, 200.0);
        let mut last_region = region(1, RegionType::Text, 0, Some(ok(Content::text("three"))));
        last_region.page_index = 2;
        let last = Page::with_regions(2, 200.0, 200.0, vec![last_region]);

        let info = DocumentInfo::new().with_title("Report");
        let tree = assembler.assemble(&[last, first, empty], &info).unwrap();
        let kinds: Vec<&str> = tree.nodes.iter().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec!["metadata", "paragraph", "page_break", "page_break", "paragraph"]
        );

        let metadata = tree.metadata().unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Report"));
        assert_eq!(metadata.page_count, 3);
        assert_eq!(metadata.region_count, 2);
        assert_eq!(metadata.node_counts.paragraphs, 2);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let options = AssemblyOptions::new()
            .with_thresholds(TitleLevelThresholds::new([10.0, 12.0, 8.0, 6.0, 4.0]));
        assert!(matches!(
            DocumentAssembler::new(options),
            Err(Error::Configuration(_))
        ));
    }
}
