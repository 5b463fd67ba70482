use std::io::Write;
use std::path::Path;

use abstractor_core::{PageText, preview};
use abstractor_ingest::{PipelineError, PipelineOutput};
use abstractor_parsing::{SegmentationResult, SegmentationStrategy};
use owo_colors::OwoColorize;

const PREVIEW_CHARS: usize = 60;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// One report line for a processed document.
pub fn print_result(
    w: &mut dyn Write,
    path: &Path,
    result: &Result<PipelineOutput, PipelineError>,
    color: ColorMode,
) -> std::io::Result<()> {
    match result {
        Ok(output) => {
            let name = display_name(path);
            if color.enabled() {
                writeln!(w, "{} {} -> {}", "✓".green(), name, output.md.display())
            } else {
                writeln!(w, "✓ {} -> {}", name, output.md.display())
            }
        }
        Err(e) => {
            if color.enabled() {
                writeln!(
                    w,
                    "{} {}: {}",
                    "✗ Failed on".red(),
                    path.display(),
                    e
                )
            } else {
                writeln!(w, "✗ Failed on {}: {}", path.display(), e)
            }
        }
    }
}

/// Dry-run listing: every section found, with its size and a one-line preview.
pub fn print_sections(
    w: &mut dyn Write,
    path: &Path,
    pages: &PageText,
    segmentation: &SegmentationResult,
    color: ColorMode,
) -> std::io::Result<()> {
    let strategy = match segmentation.strategy {
        SegmentationStrategy::Headings => "headings",
        SegmentationStrategy::PageSplit => "no headings, split by page",
    };
    let name = display_name(path);
    if color.enabled() {
        writeln!(
            w,
            "{} {} ({} pages, {} sections, {})",
            "DRY RUN:".bold().cyan(),
            name.bold(),
            pages.num_pages(),
            segmentation.sections.len(),
            strategy
        )?;
    } else {
        writeln!(
            w,
            "DRY RUN: {} ({} pages, {} sections, {})",
            name,
            pages.num_pages(),
            segmentation.sections.len(),
            strategy
        )?;
    }

    let width = segmentation
        .sections
        .keys()
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(0);
    for (key, text) in segmentation.sections.iter() {
        let chars = text.chars().count();
        let snippet = preview(text, PREVIEW_CHARS);
        if color.enabled() {
            writeln!(
                w,
                "  {:<width$}  {:>7} chars  {}",
                key.yellow(),
                chars,
                snippet.dimmed()
            )?;
        } else {
            writeln!(w, "  {:<width$}  {:>7} chars  {}", key, chars, snippet)?;
        }
    }
    writeln!(w)
}
