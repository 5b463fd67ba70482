pub mod backend;
pub mod config_file;
pub mod document;
pub mod sections;
pub mod summary;
pub mod text_utils;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use document::PageText;
pub use sections::SectionMap;
pub use summary::{
    ArticleSummary, EvidenceField, FieldGroup, FieldKey, Metadata, SummaryFields,
    normalize_page_values, normalize_pages,
};
pub use text_utils::{normalize_spaces, preview};
