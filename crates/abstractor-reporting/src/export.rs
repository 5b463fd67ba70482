use std::io::Write;
use std::path::{Path, PathBuf};

use abstractor_core::{ArticleSummary, EvidenceField};

use crate::{ExportError, ensure_parent};

fn page_suffix(field: &EvidenceField) -> String {
    if field.evidence_pages.is_empty() {
        return String::new();
    }
    let pages: Vec<String> = field.evidence_pages.iter().map(|p| p.to_string()).collect();
    format!(" _(pp. {})_", pages.join(", "))
}

/// Render the summary as a Markdown document, one block per template field.
pub fn render_markdown(summary: &ArticleSummary) -> String {
    let mut out = format!(
        "# Article Summary\n\n**Citation:** {}\n\n---\n",
        summary.citation
    );
    for (key, field) in summary.fields.iter() {
        out.push_str(&format!(
            "### {}\n{}{}\n\n",
            key.heading(),
            field.text,
            page_suffix(field)
        ));
    }
    out
}

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    ensure_parent(path)?;
    let mut file = std::fs::File::create(path).map_err(|e| ExportError::io(path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| ExportError::io(path, e))?;
    Ok(())
}

/// Write `<out_dir>/<stem>.md` and return its path.
pub fn export_markdown(
    summary: &ArticleSummary,
    out_dir: &Path,
    stem: &str,
) -> Result<PathBuf, ExportError> {
    let path = out_dir.join(format!("{stem}.md"));
    write_file(&path, &render_markdown(summary))?;
    tracing::debug!(path = %path.display(), "wrote markdown summary");
    Ok(path)
}

/// Write `<out_dir>/<stem>.json` (pretty-printed, raw artifacts included).
pub fn export_json(
    summary: &ArticleSummary,
    out_dir: &Path,
    stem: &str,
) -> Result<PathBuf, ExportError> {
    let path = out_dir.join(format!("{stem}.json"));
    let content = serde_json::to_string_pretty(summary)?;
    write_file(&path, &content)?;
    tracing::debug!(path = %path.display(), "wrote JSON summary");
    Ok(path)
}
