use std::path::Path;

use thiserror::Error;

use crate::document::PageText;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Implementors open the document, pull plain text out of every page in
/// reading order and release the document before returning, so no handle
/// outlives the call regardless of how it exits. Section segmentation lives
/// in `abstractor_parsing`.
pub trait PdfBackend: Send + Sync {
    /// Extract the plain text of each page, in page order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError>;

    /// Extract the pages and wrap them as a [`PageText`].
    fn load(&self, path: &Path) -> Result<PageText, BackendError> {
        self.extract_pages(path).map(PageText::new)
    }
}
