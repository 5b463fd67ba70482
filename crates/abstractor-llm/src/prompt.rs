use serde::Serialize;

use abstractor_core::{Metadata, SectionMap};

pub const SYSTEM_INSTRUCTION: &str = "You are an academic summarization assistant. \
Return ONLY valid JSON that matches the provided JSON schema. \
Include short, clear bullet points and page numbers (1-indexed) for evidence.";

pub const CONTENT_INSTRUCTIONS: &str = "Return a JSON object strictly matching the schema. \
Bullet points welcome. Provide evidence page numbers as a list of integers.";

pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// The user prompt: paper metadata, the section names on offer, and the fill rule.
pub fn build_user_prompt(metadata: &Metadata, sections: &SectionMap) -> String {
    let title = metadata
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(UNKNOWN_TITLE);
    let citation = metadata.citation_or_empty();

    let mut lines = vec![
        format!("Paper: {title}"),
        format!("Citation: {citation}"),
        "Sections provided:".to_string(),
    ];
    lines.extend(sections.keys().map(|k| format!("- {k}")));
    lines.push(
        "Fill all template fields succinctly. If unknown, leave empty strings and [] for pages."
            .to_string(),
    );
    lines.join("\n")
}

#[derive(Serialize)]
struct SectionContent<'a> {
    sections: &'a SectionMap,
    instructions: &'static str,
}

/// The section bodies and output instructions, serialized as one JSON message.
pub fn build_content_message(sections: &SectionMap) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SectionContent {
        sections,
        instructions: CONTENT_INSTRUCTIONS,
    })
}
