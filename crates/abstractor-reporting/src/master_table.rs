//! The cumulative CSV with one row per processed document.

use std::path::{Path, PathBuf};

use abstractor_core::{ArticleSummary, FieldGroup};

use crate::{ExportError, ensure_parent};

/// Header row: document id, citation, then one representative field per group.
pub const MASTER_TABLE_COLUMNS: [&str; 7] = [
    "id",
    "citation",
    "about_main_questions",
    "methods_design",
    "analysis_type",
    "results_core",
    "future_gaps",
];

/// Owner of all reads and writes to the master table file.
///
/// Appending reads every existing row, adds the new one, and rewrites the
/// whole file. Rows are never deduplicated. A single writer is assumed.
#[derive(Debug, Clone)]
pub struct MasterTable {
    path: PathBuf,
}

impl MasterTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The table under `<csv_dir>/master_table.csv`.
    pub fn in_dir(csv_dir: &Path) -> Self {
        Self::new(csv_dir.join("master_table.csv"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build the row for one summary.
    pub fn row(summary: &ArticleSummary, id: &str) -> Vec<String> {
        let mut row = vec![id.to_string(), summary.citation.clone()];
        row.extend(
            FieldGroup::ALL
                .iter()
                .map(|g| summary.field(g.representative()).text.clone()),
        );
        row
    }

    /// Existing data rows (header excluded), in [`MASTER_TABLE_COLUMNS`]
    /// order. Cells are matched to columns by header name; a column the file
    /// lacks reads as empty and a column it adds is dropped. Missing file
    /// reads as empty.
    pub fn read_rows(&self) -> Result<Vec<Vec<String>>, ExportError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.csv_error(e))?;

        let headers = reader.headers().map_err(|e| self.csv_error(e))?;
        let positions: Vec<Option<usize>> = MASTER_TABLE_COLUMNS
            .iter()
            .map(|column| headers.iter().position(|h| h.trim() == *column))
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| self.csv_error(e))?;
            rows.push(
                positions
                    .iter()
                    .map(|p| p.and_then(|i| record.get(i)).unwrap_or_default().to_string())
                    .collect(),
            );
        }
        Ok(rows)
    }

    /// Append the row for `summary` and rewrite the table.
    pub fn append(&self, summary: &ArticleSummary, id: &str) -> Result<&Path, ExportError> {
        let mut rows = self.read_rows()?;
        rows.push(Self::row(summary, id));

        ensure_parent(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.csv_error(e))?;
        writer
            .write_record(MASTER_TABLE_COLUMNS)
            .map_err(|e| self.csv_error(e))?;
        for row in &rows {
            writer.write_record(row).map_err(|e| self.csv_error(e))?;
        }
        writer
            .flush()
            .map_err(|e| ExportError::io(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), rows = rows.len(), "updated master table");
        Ok(&self.path)
    }

    fn csv_error(&self, source: csv::Error) -> ExportError {
        ExportError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abstractor_core::{EvidenceField, FieldKey, SummaryFields};

    fn summary(citation: &str, core: &str) -> ArticleSummary {
        let mut fields = SummaryFields::empty();
        fields.set(FieldKey::ResultsCore, EvidenceField::new(core, [3]));
        fields.set(
            FieldKey::ResultsSurprising,
            EvidenceField::new("not exported", Vec::<i64>::new()),
        );
        ArticleSummary {
            citation: citation.into(),
            fields,
            raw_sections: None,
            raw_llm_json: None,
        }
    }

    #[test]
    fn row_uses_group_representatives() {
        let row = MasterTable::row(&summary("Doe 2020", "core finding"), "doe2020");
        assert_eq!(
            row,
            vec!["doe2020", "Doe 2020", "", "", "", "core finding", ""]
        );
    }

    #[test]
    fn first_append_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let table = MasterTable::in_dir(&dir.path().join("csv"));
        assert!(table.read_rows().unwrap().is_empty());

        table.append(&summary("A", "x"), "a").unwrap();
        let content = std::fs::read_to_string(table.path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("id,citation,about_main_questions,methods_design,analysis_type,results_core,future_gaps")
        );
        assert_eq!(lines.next(), Some("a,A,,,,x,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn appends_accumulate_without_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let table = MasterTable::in_dir(dir.path());

        table
            .append(&summary("Smith, J. (2019), \"Quoted\"", "multi\nline"), "smith")
            .unwrap();
        table.append(&summary("Lee 2021", "y"), "lee").unwrap();
        table.append(&summary("Lee 2021", "y"), "lee").unwrap();

        let rows = table.read_rows().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "smith");
        assert_eq!(rows[0][1], "Smith, J. (2019), \"Quoted\"");
        assert_eq!(rows[0][5], "multi\nline");
        assert_eq!(rows[1], rows[2]);
        assert!(rows.iter().all(|r| r.len() == MASTER_TABLE_COLUMNS.len()));
    }

    #[test]
    fn reordered_header_is_read_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let table = MasterTable::in_dir(dir.path());
        std::fs::write(
            table.path(),
            "citation,id,about_main_questions,methods_design,analysis_type,future_gaps,notes\n\
             Old Cite,old,,,,old gaps,hand note\n",
        )
        .unwrap();

        let rows = table.read_rows().unwrap();
        assert_eq!(rows, vec![vec!["old", "Old Cite", "", "", "", "", "old gaps"]]);

        table.append(&summary("New Cite", "x"), "new").unwrap();
        let rows = table.read_rows().unwrap();
        assert_eq!(rows[0], vec!["old", "Old Cite", "", "", "", "", "old gaps"]);
        assert_eq!(rows[1], vec!["new", "New Cite", "", "", "", "x", ""]);

        let content = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(
            content.lines().next(),
            Some("id,citation,about_main_questions,methods_design,analysis_type,results_core,future_gaps")
        );
    }
}
