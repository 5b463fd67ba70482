use std::path::Path;

pub mod section;

pub use section::{
    FALLBACK_BODY, FALLBACK_CONCLUSION, FALLBACK_INTRO, HeadingMatch, SECTION_HEADINGS,
    SegmentationResult, SegmentationStrategy, find_headings, segment, split_into_sections,
};
// Re-export domain types from core (canonical definitions live there)
pub use abstractor_core::{BackendError, PageText, PdfBackend, SectionMap};

/// Extract a PDF's pages with `backend` and segment them.
///
/// Pipeline:
/// 1. Extract per-page text via `backend` (the document is released before this returns)
/// 2. Locate heading lines in the concatenated text
/// 3. Slice between headings, or split by page count when there are none
pub fn extract_sections(
    pdf_path: &Path,
    backend: &dyn PdfBackend,
) -> Result<(PageText, SegmentationResult), BackendError> {
    let doc = backend.load(pdf_path)?;
    let result = segment(&doc);
    Ok((doc, result))
}
