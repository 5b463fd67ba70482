use std::path::{Path, PathBuf};

use thiserror::Error;

use abstractor_core::config_file::PdfSection;
use abstractor_llm::{GenerationBackend, GenerationError, Generator};
use abstractor_parsing::SegmentationResult;
use abstractor_reporting::{ExportError, MasterTable, assemble_summary, export_json, export_markdown};

// Re-export domain types for convenience
pub use abstractor_core::{ArticleSummary, BackendError, Metadata, PageText, PdfBackend};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("PDF extraction error: {0}")]
    Extraction(#[from] BackendError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    #[cfg(not(feature = "pdf"))]
    #[error("PDF support not compiled in (enable the `pdf` feature of abstractor-ingest)")]
    NoPdfSupport,
}

/// Where one document's outputs were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub md: PathBuf,
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// Directory layout under the output root.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/summaries`, holding `<stem>.md` and `<stem>.json`.
    pub fn summaries_dir(&self) -> PathBuf {
        self.root.join("summaries")
    }

    /// `<root>/csv`, holding the master table.
    pub fn csv_dir(&self) -> PathBuf {
        self.root.join("csv")
    }

    pub fn master_table(&self) -> MasterTable {
        MasterTable::in_dir(&self.csv_dir())
    }
}

/// File name without its final extension.
pub fn document_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extract pages and segment them; nothing is generated or written.
pub fn segment_pdf(
    path: &Path,
    pdf: &dyn PdfBackend,
) -> Result<(PageText, SegmentationResult), PipelineError> {
    Ok(abstractor_parsing::extract_sections(path, pdf)?)
}

/// Run one PDF through extraction, segmentation, generation, assembly, and
/// export.
///
/// Generation falls back to the empty payload on its own; the errors that
/// reach the caller are extraction failures, payloads of the wrong shape,
/// and I/O failures while exporting.
pub async fn process_pdf<B: GenerationBackend>(
    path: &Path,
    layout: &OutputLayout,
    pdf: &dyn PdfBackend,
    generator: &Generator<B>,
) -> Result<PipelineOutput, PipelineError> {
    let stem = document_stem(path);
    let metadata = Metadata::from_stem(&stem);

    let (pages, segmentation) = segment_pdf(path, pdf)?;
    tracing::info!(
        path = %path.display(),
        pages = pages.num_pages(),
        sections = segmentation.sections.len(),
        strategy = ?segmentation.strategy,
        "segmented document"
    );

    let sections = segmentation.sections;
    let generation = generator.generate(&metadata, &sections).await?;
    if let abstractor_llm::GenerationOutcome::Degraded(reason) = generation.outcome {
        tracing::info!(path = %path.display(), reason = %reason, "summary fields left empty");
    }

    let summary = assemble_summary(&metadata, &sections, generation);

    let summaries = layout.summaries_dir();
    let md = export_markdown(&summary, &summaries, &stem)?;
    let table = layout.master_table();
    let csv = table.append(&summary, &stem)?.to_path_buf();
    let json = export_json(&summary, &summaries, &stem)?;

    Ok(PipelineOutput { md, csv, json })
}

/// The PDF backend compiled into this build, configured from `[pdf]`.
#[cfg(feature = "pdf")]
pub fn pdf_backend(config: Option<&PdfSection>) -> Result<Box<dyn PdfBackend>, PipelineError> {
    Ok(Box::new(abstractor_pdf_mupdf::MupdfBackend::from_config(
        config,
    )))
}

#[cfg(not(feature = "pdf"))]
pub fn pdf_backend(_config: Option<&PdfSection>) -> Result<Box<dyn PdfBackend>, PipelineError> {
    Err(PipelineError::NoPdfSupport)
}
