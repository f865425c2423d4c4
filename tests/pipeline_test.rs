//! End-to-end tests for the document pipeline.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use unlayout::extract::{CancellationToken, Extracted};
use unlayout::model::{
    Content, ContentKind, ExtractionSource, FormulaContent, Node, PageRaster, RegionType,
    TableGrid, TextContent,
};
use unlayout::{
    AssemblyOptions, DocumentInfo, Error, ErrorMode, ExtractionError, ExtractorRegistry,
    FormatOptions, PageInput, Pipeline, PipelineOptions, TitleLevelThresholds, Unlayout,
};

/// Text extractor: titles and body text succeed, figures and their
/// captions fail.
fn text_engine() -> Arc<MockExtractor> {
    MockExtractor::new("paddleocr", |request, _| match request.region_type {
        RegionType::Title => Ok(Extracted::new(Content::text("Introduction"), 0.95)),
        RegionType::Figure | RegionType::FigureCaption => {
            Err(ExtractionError::permanent("no text in image"))
        }
        _ => Ok(Extracted::new(
            Content::text(format!("Body of region {}.", request.region_id)),
            0.9,
        )),
    })
}

fn quiet_format() -> FormatOptions {
    FormatOptions::default().with_metadata(false)
}

fn content_nodes(nodes: &[Node]) -> Vec<&Node> {
    nodes.iter().filter(|n| n.is_content()).collect()
}

#[test]
fn test_title_text_failed_figure() {
    let page = page(
        0,
        vec![
            region(0, 0, (10.0, 5.0, 90.0, 12.0), RegionType::Title).with_font_size(18.0),
            region(1, 0, (10.0, 15.0, 90.0, 40.0), RegionType::Text),
            region(2, 0, (10.0, 45.0, 90.0, 90.0), RegionType::Figure),
        ],
    );

    let result = Unlayout::new()
        .with_local(ContentKind::Text, text_engine())
        .with_title_levels(TitleLevelThresholds::new([16.0, 14.0, 12.0, 11.0, 10.0]))
        .with_format(quiet_format())
        .process(vec![PageInput::new(page, raster())])
        .unwrap();

    assert_eq!(
        result.tree().nodes,
        vec![
            Node::heading(1, "Introduction"),
            Node::paragraph("Body of region 1."),
        ]
    );
    assert_eq!(
        result.to_markdown().unwrap(),
        "# Introduction\n\nBody of region 1."
    );
    assert_eq!(result.provenance().len(), 3);
    assert!(result.provenance()[2].status == unlayout::ExtractionStatus::Failed);
}

#[test]
fn test_heading_levels_follow_font_size() {
    let page = page(
        0,
        vec![
            region(0, 0, (0.0, 0.0, 100.0, 10.0), RegionType::Title).with_font_size(30.0),
            region(1, 0, (0.0, 20.0, 100.0, 30.0), RegionType::Title).with_font_size(20.0),
            region(2, 0, (0.0, 40.0, 100.0, 50.0), RegionType::Title).with_font_size(9.0),
            region(3, 0, (0.0, 60.0, 100.0, 70.0), RegionType::Title),
        ],
    );

    let result = Unlayout::new()
        .with_local(ContentKind::Text, text_engine())
        .with_format(quiet_format())
        .process(vec![PageInput::new(page, raster())])
        .unwrap();

    let levels: Vec<u8> = result
        .tree()
        .nodes
        .iter()
        .filter_map(|n| match n {
            Node::Heading { level, .. } => Some(*level),
            _ => None,
        })
        .collect();
    assert_eq!(levels, vec![1, 3, 5, 5]);
}

#[test]
fn test_placeholder_text_is_dropped() {
    let engine = MockExtractor::new("paddleocr", |request, _| {
        let text = match request.region_id {
            0 => "[Figure 1]",
            1 => "Visible text",
            _ => "   ",
        };
        Ok(Extracted::new(Content::Text(TextContent::new(text)), 0.9))
    });
    let page = page(
        0,
        vec![
            region(0, 0, (0.0, 0.0, 100.0, 10.0), RegionType::Text),
            region(1, 0, (0.0, 20.0, 100.0, 30.0), RegionType::Text),
            region(2, 0, (0.0, 40.0, 100.0, 50.0), RegionType::Text),
        ],
    );

    let result = Unlayout::new()
        .with_local(ContentKind::Text, engine)
        .with_format(quiet_format())
        .process(vec![PageInput::new(page, raster())])
        .unwrap();

    assert_eq!(result.tree().nodes, vec![Node::paragraph("Visible text")]);
}

#[test]
fn test_low_confidence_caption_is_filtered_but_text_kept() {
    let engine = MockExtractor::fixed("paddleocr", Content::text("faint"), 0.5);
    let page = page(
        0,
        vec![
            region(0, 0, (0.0, 0.0, 100.0, 10.0), RegionType::Text),
            region(1, 0, (0.0, 20.0, 100.0, 30.0), RegionType::TableCaption),
        ],
    );

    let result = Unlayout::new()
        .with_local(ContentKind::Text, engine)
        .with_format(quiet_format())
        .process(vec![PageInput::new(page, raster())])
        .unwrap();

    assert_eq!(result.tree().nodes, vec![Node::paragraph("faint")]);
}

#[test]
fn test_mixed_content_two_pages() {
    let tables = MockExtractor::fixed(
        "table_structure",
        Content::Table(TableGrid::from_strs(&["k", "v"], &[&["a", "1"]])),
        0.9,
    );
    let formulas = MockExtractor::fixed(
        "pp_formulanet",
        Content::Formula(FormulaContent::block("a^2+b^2=c^2")),
        0.9,
    );
    let pages = vec![
        PageInput::new(
            page(
                0,
                vec![
                    region(0, 0, (0.0, 0.0, 100.0, 10.0), RegionType::Text),
                    region(1, 0, (0.0, 20.0, 100.0, 60.0), RegionType::Table),
                ],
            ),
            raster(),
        ),
        PageInput::new(
            page(
                1,
                vec![region(0, 1, (0.0, 0.0, 100.0, 20.0), RegionType::Formula)],
            ),
            raster(),
        ),
    ];

    let result = Unlayout::new()
        .with_local(ContentKind::Text, text_engine())
        .with_local(ContentKind::Table, tables)
        .with_local(ContentKind::Formula, formulas)
        .with_title("Sample")
        .process(pages)
        .unwrap();

    let markdown = result.to_markdown().unwrap();
    assert!(markdown.starts_with("---\ntitle: \"Sample\"\n"));
    assert!(markdown.contains("pages: 2"));
    assert!(markdown.ends_with(
        "Body of region 0.\n\n| k | v |\n| --- | --- |\n| a | 1 |\n\n---\n\n$$\na^2+b^2=c^2\n$$"
    ));

    let text = result.to_text().unwrap();
    assert_eq!(text, "Body of region 0.\n\nk\tv\na\t1\n\na^2+b^2=c^2");

    let counts = result.tree().node_counts();
    assert_eq!((counts.paragraphs, counts.tables, counts.formulas), (1, 1, 1));
}

#[test]
fn test_html_tables_and_page_breaks_off() {
    let tables = MockExtractor::fixed(
        "table_structure",
        Content::Table(TableGrid::from_strs(&["k"], &[&["v"]])),
        0.9,
    );
    let pages = vec![
        PageInput::new(
            page(0, vec![region(0, 0, (0.0, 0.0, 100.0, 50.0), RegionType::Table)]),
            raster(),
        ),
        PageInput::new(
            page(1, vec![region(0, 1, (0.0, 0.0, 100.0, 50.0), RegionType::Table)]),
            raster(),
        ),
    ];
    let format = quiet_format()
        .with_table_format(unlayout::TableFormat::Html)
        .with_page_breaks(false);

    let result = Unlayout::new()
        .with_local(ContentKind::Table, tables)
        .with_format(format)
        .process(pages)
        .unwrap();

    assert_eq!(result.tree().nodes.len(), 2);
    assert!(result
        .tree()
        .nodes
        .iter()
        .all(|n| matches!(n, Node::Table { body: unlayout::model::TableBody::Markup(_) })));
    assert!(!result.to_markdown().unwrap().contains("---"));
}

#[test]
fn test_pipeline_is_deterministic() {
    let registry = Arc::new(
        ExtractorRegistry::new().with_local(ContentKind::Text, MockExtractor::echo("paddleocr", 0.9)),
    );
    let pipeline = Pipeline::new(registry, PipelineOptions::default().with_batch_size(4)).unwrap();
    let inputs = || {
        (0..3)
            .map(|i| PageInput::new(two_column_page(i), raster()))
            .collect::<Vec<_>>()
    };

    let first = pipeline
        .process(inputs(), &DocumentInfo::new(), &CancellationToken::new())
        .unwrap();
    for _ in 0..10 {
        let next = pipeline
            .process(inputs(), &DocumentInfo::new(), &CancellationToken::new())
            .unwrap();
        assert_eq!(next.tree, first.tree);
        assert_eq!(next.provenance, first.provenance);
        let orders = |pages: &[unlayout::Page]| -> Vec<Vec<Option<usize>>> {
            pages
                .iter()
                .map(|p| p.regions().iter().map(|r| r.order_index()).collect())
                .collect()
        };
        assert_eq!(orders(&next.pages), orders(&first.pages));
    }

    let texts: Vec<&Node> = content_nodes(&first.tree.nodes);
    assert_eq!(texts[0], &Node::paragraph("region 2"));
    assert_eq!(texts[1], &Node::paragraph("region 0"));
}

// ==================== Error Modes ====================

fn broken_inputs() -> Vec<PageInput> {
    vec![
        PageInput::new(two_column_page(0), raster()),
        PageInput::new(two_column_page(1), PageRaster::new(10, 10, 3, vec![0; 7])),
        PageInput::new(two_column_page(2), raster()),
    ]
}

#[test]
fn test_strict_mode_aborts_on_bad_page() {
    let pipeline = Pipeline::new(
        Arc::new(ExtractorRegistry::new().with_local(ContentKind::Text, text_engine())),
        PipelineOptions::default(),
    )
    .unwrap();

    let err = pipeline
        .process(broken_inputs(), &DocumentInfo::new(), &CancellationToken::new())
        .unwrap_err();
    assert_eq!(err.page_index(), Some(1));
    assert!(matches!(err, Error::Page { .. }));
}

#[test]
fn test_lenient_mode_skips_bad_page() {
    let pipeline = Pipeline::new(
        Arc::new(ExtractorRegistry::new().with_local(ContentKind::Text, text_engine())),
        PipelineOptions::default()
            .with_error_mode(ErrorMode::Lenient)
            .with_assembly(AssemblyOptions::default().with_format(quiet_format())),
    )
    .unwrap();

    let output = pipeline
        .process(broken_inputs(), &DocumentInfo::new(), &CancellationToken::new())
        .unwrap();

    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].page_index, 1);
    assert_eq!(output.pages.len(), 2);
    assert_eq!(content_nodes(&output.tree.nodes).len(), 8);
    assert_eq!(
        output.tree.nodes.iter().filter(|n| **n == Node::PageBreak).count(),
        1
    );
}

#[test]
fn test_invalid_region_is_page_failure() {
    let bad = page(
        0,
        vec![region(0, 0, (10.0, 10.0, 150.0, 20.0), RegionType::Text)],
    );
    let result = Unlayout::new()
        .with_local(ContentKind::Text, text_engine())
        .process(vec![PageInput::new(bad, raster())]);

    match result {
        Err(Error::Page { index, source }) => {
            assert_eq!(index, 0);
            assert!(matches!(*source, Error::InvalidRegion { region_id: 0, .. }));
        }
        _ => panic!("expected a page failure"),
    }
}

// ==================== Remote Paths ====================

#[test]
fn test_remote_priority_provenance() {
    let local = MockExtractor::fixed(
        "table_structure",
        Content::Table(TableGrid::from_strs(&["x"], &[&["1"]])),
        0.9,
    );
    let remote = MockExtractor::fixed(
        "vlm",
        Content::Table(TableGrid::from_strs(&["x"], &[&["2"]])),
        0.5,
    );
    let stage = unlayout::StageOptions::new(&["table_structure"], 0.7)
        .with_llm(true)
        .with_llm_priority(true)
        .with_fallback(true)
        .with_llm_retry(0, Duration::from_secs(1), Duration::from_millis(1));

    let result = Unlayout::new()
        .with_local(ContentKind::Table, local.clone())
        .with_remote(ContentKind::Table, remote.clone())
        .with_stage(ContentKind::Table, stage)
        .with_format(quiet_format())
        .process(vec![PageInput::new(
            page(0, vec![region(0, 0, (0.0, 0.0, 100.0, 50.0), RegionType::Table)]),
            raster(),
        )])
        .unwrap();

    assert_eq!(local.calls(), 1);
    assert_eq!(remote.calls(), 1);
    let provenance = &result.provenance()[0];
    assert_eq!(provenance.source, ExtractionSource::Local);
    assert_eq!(provenance.attempts, 2);

    let json = result.provenance_json(unlayout::JsonFormat::Compact).unwrap();
    assert!(json.contains("\"source\":\"local\""));
}

// ==================== Cancellation ====================

#[test]
fn test_cancelled_page_keeps_written_results() {
    let engine = MockExtractor::new("paddleocr", |request, _| {
        if request.region_id == 1 {
            std::thread::sleep(Duration::from_millis(50));
            Err(ExtractionError::permanent("needs remote"))
        } else {
            Ok(Extracted::new(Content::text("ok"), 0.9))
        }
    });
    let remote = MockExtractor::slow("vlm", Duration::from_secs(5), Content::text("late"), 0.9);
    let registry = ExtractorRegistry::new()
        .with_local(ContentKind::Text, engine)
        .with_remote(ContentKind::Text, remote);
    let mut options = PipelineOptions::default();
    options.extraction.text = options
        .extraction
        .text
        .clone()
        .with_llm(true)
        .with_llm_retry(0, Duration::from_secs(10), Duration::from_millis(1));
    let pipeline = Pipeline::new(Arc::new(registry), options).unwrap();

    let mut page = two_column_page(0);
    let cancel = CancellationToken::new();
    let canceller = {
        let cancel = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            cancel.cancel();
        })
    };

    let result = pipeline.process_page(&mut page, &raster(), &cancel);
    canceller.join().unwrap();

    assert!(matches!(result, Err(Error::Cancelled)));
    for region in page.regions() {
        assert!(region.order_index().is_some());
        if region.id == 1 {
            assert!(region.extraction().is_none());
        } else {
            assert!(region.extraction().is_some_and(|r| r.is_success()));
        }
    }
}

#[test]
fn test_cancelled_document_keeps_finished_pages() {
    let cancel = CancellationToken::new();
    // two_column_page has four regions; the fourth call finishes page 0.
    let engine = {
        let cancel = cancel.clone();
        MockExtractor::new("paddleocr", move |request, n| {
            if n == 3 {
                cancel.cancel();
            }
            Ok(Extracted::new(
                Content::text(format!("page {} region {}", request.page_index, request.region_id)),
                0.9,
            ))
        })
    };
    let registry = ExtractorRegistry::new().with_local(ContentKind::Text, engine.clone());
    let pipeline = Pipeline::new(Arc::new(registry), PipelineOptions::default()).unwrap();

    let inputs = (0..3)
        .map(|i| PageInput::new(two_column_page(i), raster()))
        .collect();
    let output = pipeline
        .process(inputs, &DocumentInfo::new(), &cancel)
        .unwrap();

    assert!(output.is_cancelled());
    assert_eq!(engine.calls(), 4);
    assert_eq!(output.pages.len(), 1);
    assert_eq!(output.pages[0].index, 0);
    assert_eq!(output.provenance.len(), 4);
    assert!(output.provenance.iter().all(|p| p.page_index == 0));
    assert_eq!(content_nodes(&output.tree.nodes).len(), 4);
}

#[cfg(feature = "async")]
#[tokio::test(flavor = "multi_thread")]
async fn test_process_async() {
    let registry = Arc::new(
        ExtractorRegistry::new().with_local(ContentKind::Text, MockExtractor::echo("paddleocr", 0.9)),
    );
    let pipeline = Arc::new(Pipeline::new(registry, PipelineOptions::default()).unwrap());

    let output = unlayout::pipeline::process_async(
        pipeline,
        vec![PageInput::new(two_column_page(0), raster())],
        DocumentInfo::new(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(output.provenance.len(), 4);
}
