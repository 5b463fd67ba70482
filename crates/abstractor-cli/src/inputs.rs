use std::path::{Path, PathBuf};

/// Documents to process for `input`.
///
/// A directory yields every entry with a `.pdf` extension (any case), sorted
/// by file name. Any other existing path is taken as a single document.
pub fn resolve_inputs(input: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !input.exists() {
        anyhow::bail!("Input not found: {}", input.display());
    }
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut pdfs: Vec<PathBuf> = std::fs::read_dir(input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", input.display(), e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_pdf(p))
        .collect();
    pdfs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(pdfs)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_pdfs_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.Pdf"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let found = resolve_inputs(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf", "c.Pdf"]);
    }

    #[test]
    fn single_file_taken_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("paper.pdf");
        std::fs::write(&file, b"").unwrap();
        assert_eq!(resolve_inputs(&file).unwrap(), vec![file]);
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_inputs(&dir.path().join("nope")).unwrap_err();
        assert!(err.to_string().starts_with("Input not found"));
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_inputs(dir.path()).unwrap().is_empty());
    }
}
