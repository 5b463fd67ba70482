use abstractor_core::{ArticleSummary, Metadata, SectionMap};
use abstractor_llm::Generation;

/// Merge metadata, raw sections, and a generation into the finalized record.
///
/// An empty generated citation is replaced by the metadata citation. A
/// whitespace-only one is not empty and is kept as generated.
pub fn assemble_summary(
    metadata: &Metadata,
    sections: &SectionMap,
    generation: Generation,
) -> ArticleSummary {
    let Generation { summary, raw, .. } = generation;
    let citation = if summary.citation.is_empty() {
        metadata.citation_or_empty().to_string()
    } else {
        summary.citation
    };

    ArticleSummary {
        citation,
        fields: summary.fields,
        raw_sections: Some(sections.clone()),
        raw_llm_json: Some(raw),
    }
}
