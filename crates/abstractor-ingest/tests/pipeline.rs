//! End-to-end runs of [`process_pdf`] with an in-memory PDF backend.
//!
//! Page text comes from a fixed list instead of MuPDF, and generation either
//! runs without a credential (empty payload, no backend call) or against a
//! scripted fake backend.

use std::path::{Path, PathBuf};

use abstractor_core::{ArticleSummary, BackendError, FieldKey, PdfBackend};
use abstractor_ingest::{OutputLayout, PipelineError, process_pdf};
use abstractor_llm::fake::{FakeBackend, FakeResponse};
use abstractor_llm::{GenerationConfig, GenerationFailure, Generator};
use serde_json::json;

/// Returns the same pages for every path.
struct StaticPdf {
    pages: Vec<String>,
}

impl StaticPdf {
    fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl PdfBackend for StaticPdf {
    fn extract_pages(&self, _path: &Path) -> Result<Vec<String>, BackendError> {
        Ok(self.pages.clone())
    }
}

struct BrokenPdf;

impl PdfBackend for BrokenPdf {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        Err(BackendError::OpenError(format!(
            "{}: not a PDF",
            path.display()
        )))
    }
}

fn three_page_article() -> StaticPdf {
    StaticPdf::new(&[
        "Abstract\nWe measure how X affects Y.",
        "Results\nX raises Y by ten percent.",
        "References\n[1] Someone. A paper. 2019.",
    ])
}

fn offline_generator() -> Generator<FakeBackend> {
    Generator::new(
        GenerationConfig::default(),
        FakeBackend::new(FakeResponse::Text(String::new())),
    )
}

fn read_summary(path: &PathBuf) -> ArticleSummary {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn no_credential_produces_empty_summary() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let generator = offline_generator();

    let output = process_pdf(
        Path::new("papers/smith2020.pdf"),
        &layout,
        &three_page_article(),
        &generator,
    )
    .await
    .unwrap();

    assert_eq!(generator.backend().call_count(), 0);
    assert_eq!(output.md, dir.path().join("summaries").join("smith2020.md"));
    assert_eq!(output.json, dir.path().join("summaries").join("smith2020.json"));
    assert_eq!(output.csv, dir.path().join("csv").join("master_table.csv"));

    let summary = read_summary(&output.json);
    let keys: Vec<&str> = summary.raw_sections.as_ref().unwrap().keys().collect();
    assert_eq!(keys, vec!["abstract", "results", "references"]);
    assert_eq!(summary.citation, "smith2020");
    assert!(summary.fields.is_blank());

    let md = std::fs::read_to_string(&output.md).unwrap();
    assert!(md.contains("**Citation:** smith2020"));
    assert!(!md.contains("_(pp."));

    let csv = std::fs::read_to_string(&output.csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "smith2020,smith2020,,,,,");
}

#[tokio::test]
async fn headingless_document_uses_page_split() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let pdf = StaticPdf::new(&["one", "two", "three", "four"]);

    let output = process_pdf(Path::new("plain.pdf"), &layout, &pdf, &offline_generator())
        .await
        .unwrap();

    let sections = read_summary(&output.json).raw_sections.unwrap();
    assert_eq!(sections.get("abstract_or_intro"), Some("one\ntwo"));
    assert_eq!(sections.get("body"), Some("three"));
    assert_eq!(sections.get("conclusion"), Some("four"));
}

#[tokio::test]
async fn generated_fields_flow_into_every_output() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let payload = json!({
        "citation": "Smith, J. (2020). X and Y.",
        "results_core": {"text": "X raises Y.", "evidence_pages": [2, 5, 5, 1]},
        "future_gaps": {"text": "Longer studies.", "evidence_pages": []},
    });
    let generator = Generator::new(
        GenerationConfig {
            api_key: Some("sk-test".into()),
            ..Default::default()
        },
        FakeBackend::new(FakeResponse::Structured(payload)),
    );

    let output = process_pdf(
        Path::new("smith2020.pdf"),
        &layout,
        &three_page_article(),
        &generator,
    )
    .await
    .unwrap();

    assert_eq!(generator.backend().call_count(), 1);
    let md = std::fs::read_to_string(&output.md).unwrap();
    assert!(md.contains("### 4) Results — Core findings\nX raises Y. _(pp. 1, 2, 5)_\n"));
    assert!(md.contains("### 5) Future — Gaps\nLonger studies.\n"));

    let summary = read_summary(&output.json);
    assert_eq!(summary.field(FieldKey::ResultsCore).evidence_pages, vec![1, 2, 5]);
    assert_eq!(
        summary.raw_llm_json.unwrap()["results_core"]["evidence_pages"],
        json!([1, 2, 5])
    );

    let rows = layout.master_table().read_rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], "Smith, J. (2020). X and Y.");
    assert_eq!(rows[0][5], "X raises Y.");
    assert_eq!(rows[0][6], "Longer studies.");
}

#[tokio::test]
async fn master_table_accumulates_across_documents() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let generator = offline_generator();
    let pdf = three_page_article();

    for name in ["first.pdf", "second.pdf"] {
        process_pdf(Path::new(name), &layout, &pdf, &generator)
            .await
            .unwrap();
    }

    let rows = layout.master_table().read_rows().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "first");
    assert_eq!(rows[1][0], "second");
}

#[tokio::test]
async fn extraction_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());

    let err = process_pdf(Path::new("bad.pdf"), &layout, &BrokenPdf, &offline_generator())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Extraction(_)));
    assert!(!layout.summaries_dir().exists());
    assert!(!layout.master_table().path().exists());
}

#[tokio::test]
async fn wrong_payload_shape_fails_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let generator = Generator::new(
        GenerationConfig {
            api_key: Some("sk-test".into()),
            ..Default::default()
        },
        FakeBackend::new(FakeResponse::Structured(json!({"citation": ["not", "a", "string"]}))),
    );

    let err = process_pdf(
        Path::new("odd.pdf"),
        &layout,
        &three_page_article(),
        &generator,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::Generation(_)));
    assert!(!layout.master_table().path().exists());
}

#[tokio::test]
async fn server_error_fails_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let generator = Generator::new(
        GenerationConfig {
            api_key: Some("sk-test".into()),
            ..Default::default()
        },
        FakeBackend::new(FakeResponse::Fail(GenerationFailure::Api {
            status: 500,
            message: "upstream down".into(),
        })),
    );

    let err = process_pdf(
        Path::new("down.pdf"),
        &layout,
        &three_page_article(),
        &generator,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::Generation(_)));
    assert_eq!(
        err.to_string(),
        "generation request failed: API error [500]: upstream down"
    );
    assert_eq!(generator.backend().call_count(), 1);
    assert!(!layout.summaries_dir().exists());
    assert!(!layout.master_table().path().exists());
}
