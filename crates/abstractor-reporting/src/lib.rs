//! Turning generation output into the finalized summary and writing it out.

use std::path::PathBuf;

use thiserror::Error;

pub mod assemble;
pub mod export;
pub mod master_table;

pub use assemble::assemble_summary;
pub use export::{export_json, export_markdown, render_markdown};
pub use master_table::{MASTER_TABLE_COLUMNS, MasterTable};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Create `path`'s parent directory if it has one.
pub(crate) fn ensure_parent(path: &std::path::Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
    }
    Ok(())
}
