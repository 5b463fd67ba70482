use std::path::Path;

use mupdf::{Document, TextPageFlags};

use abstractor_core::config_file::PdfSection;
use abstractor_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// The mupdf dependency (AGPL-3.0) is confined to this crate.
///
/// Every text block is kept by default. Header and footer bands, given as
/// fractions of page height, are excluded only when configured.
#[derive(Debug, Default)]
pub struct MupdfBackend {
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    /// `None` disables footer exclusion.
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    /// `None` disables header exclusion.
    header_exclusion_ratio: Option<f32>,
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backend from the `[pdf]` config section; unset ratios stay
    /// disabled.
    pub fn from_config(section: Option<&PdfSection>) -> Self {
        let mut backend = Self::default();
        if let Some(ratio) = section.and_then(|s| s.header_exclusion) {
            backend = backend.with_header_exclusion(ratio);
        }
        if let Some(ratio) = section.and_then(|s| s.footer_exclusion) {
            backend = backend.with_footer_exclusion(ratio);
        }
        backend
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    fn page_text(&self, page: &mupdf::Page) -> Result<String, BackendError> {
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let page_bounds = page
            .bounds()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        let page_height = page_bounds.y1 - page_bounds.y0;

        let header_threshold = self
            .header_exclusion_ratio
            .map(|r| page_bounds.y0 + page_height * r);
        let footer_threshold = self
            .footer_exclusion_ratio
            .map(|r| page_bounds.y1 - page_height * r);

        // Block/line iteration mirrors plain "text" mode extraction
        let mut page_text = String::new();
        for block in text_page.blocks() {
            let block_bounds = block.bounds();

            if let Some(threshold) = header_threshold
                && block_bounds.y1 <= threshold
            {
                continue;
            }
            if let Some(threshold) = footer_threshold
                && block_bounds.y0 >= threshold
            {
                continue;
            }

            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                page_text.push_str(&line_text);
                page_text.push('\n');
            }
        }
        Ok(page_text)
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        // Dropped at the end of this scope on every return path.
        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut pages_text = Vec::new();
        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            pages_text.push(self.page_text(&page)?);
        }

        tracing::debug!(path = %path.display(), pages = pages_text.len(), "extracted page text");
        Ok(pages_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ratio_disables_exclusion() {
        let backend = MupdfBackend::new()
            .with_header_exclusion(0.0)
            .with_footer_exclusion(0.0);
        assert!(backend.header_exclusion_ratio.is_none());
        assert!(backend.footer_exclusion_ratio.is_none());
    }

    #[test]
    fn from_config_overrides_only_set_ratios() {
        let section = PdfSection {
            header_exclusion: None,
            footer_exclusion: Some(0.1),
        };
        let backend = MupdfBackend::from_config(Some(&section));
        assert_eq!(backend.header_exclusion_ratio, None);
        assert_eq!(backend.footer_exclusion_ratio, Some(0.1));
    }

    #[test]
    fn default_keeps_header_and_footer_text() {
        for backend in [MupdfBackend::new(), MupdfBackend::from_config(None)] {
            assert_eq!(backend.header_exclusion_ratio, None);
            assert_eq!(backend.footer_exclusion_ratio, None);
        }
        let empty = PdfSection {
            header_exclusion: None,
            footer_exclusion: None,
        };
        let backend = MupdfBackend::from_config(Some(&empty));
        assert_eq!(backend.header_exclusion_ratio, None);
        assert_eq!(backend.footer_exclusion_ratio, None);
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = MupdfBackend::new()
            .extract_pages(Path::new("/nonexistent/abstractor/paper.pdf"))
            .unwrap_err();
        assert!(matches!(err, BackendError::OpenError(_)));
    }
}
