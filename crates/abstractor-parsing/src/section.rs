use once_cell::sync::Lazy;
use regex::Regex;

use abstractor_core::{PageText, SectionMap};

/// Recognized section headings, matched case-insensitively on their own line.
pub const SECTION_HEADINGS: [&str; 16] = [
    "abstract",
    "introduction",
    "background",
    "methods",
    "methodology",
    "data",
    "materials and methods",
    "analysis",
    "results",
    "findings",
    "discussion",
    "limitations",
    "conclusion",
    "conclusions",
    "acknowledgments",
    "references",
];

/// Keys used when no heading is found.
pub const FALLBACK_INTRO: &str = "abstract_or_intro";
pub const FALLBACK_BODY: &str = "body";
pub const FALLBACK_CONCLUSION: &str = "conclusion";

/// How a document was segmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationStrategy {
    Headings,
    PageSplit,
}

/// A heading line found in the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMatch {
    /// Lowercased heading token.
    pub name: String,
    /// Byte offset of the match start in the full text.
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct SegmentationResult {
    pub strategy: SegmentationStrategy,
    pub sections: SectionMap,
}

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = SECTION_HEADINGS.iter().map(|h| regex::escape(h)).collect();
    Regex::new(&format!(r"(?im)^\s*({})\s*$", alternatives.join("|"))).unwrap()
});

/// Find every heading line in `text`, in document order.
///
/// A heading line holds nothing but one of [`SECTION_HEADINGS`] (any case)
/// and surrounding whitespace. The recorded offset is where the match
/// starts, which may include blank lines right before the heading.
pub fn find_headings(text: &str) -> Vec<HeadingMatch> {
    HEADING_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let token = caps.get(1)?;
            Some(HeadingMatch {
                name: token.as_str().to_lowercase(),
                offset: whole.start(),
            })
        })
        .collect()
}

/// Split a document into named sections.
///
/// See [`segment`] for the strategy used.
pub fn split_into_sections(doc: &PageText) -> SectionMap {
    segment(doc).sections
}

/// Split a document into named sections, reporting which strategy applied.
///
/// With headings present, each section runs from its heading to the next
/// heading (or the end of the text), trimmed. A heading that occurs more
/// than once keeps the text of its last occurrence. Without headings the
/// pages are split three ways: the first two pages, the middle, and the
/// last page.
pub fn segment(doc: &PageText) -> SegmentationResult {
    let text = doc.all_text();
    let headings = find_headings(&text);

    if headings.is_empty() {
        tracing::debug!(pages = doc.num_pages(), "no headings found, splitting by page");
        return SegmentationResult {
            strategy: SegmentationStrategy::PageSplit,
            sections: split_by_pages(doc),
        };
    }

    let mut sections = SectionMap::new();
    let ends = headings
        .iter()
        .skip(1)
        .map(|h| h.offset)
        .chain(std::iter::once(text.len()));
    for (heading, end) in headings.iter().zip(ends) {
        let content = text[heading.offset..end].trim();
        if sections.insert(heading.name.as_str(), content).is_some() {
            tracing::debug!(section = %heading.name, "repeated heading replaces earlier section");
        }
    }

    SegmentationResult {
        strategy: SegmentationStrategy::Headings,
        sections,
    }
}

/// Fixed three-way split used when a document has no recognizable headings.
fn split_by_pages(doc: &PageText) -> SectionMap {
    let pages = doc.pages();
    let n = pages.len();
    let intro_end = n.min(2);
    let body_end = n.saturating_sub(1).max(2).min(n);
    let body = if intro_end < body_end {
        pages[intro_end..body_end].join("\n")
    } else {
        String::new()
    };

    let mut sections = SectionMap::new();
    sections.insert(FALLBACK_INTRO, pages[..intro_end].join("\n"));
    sections.insert(FALLBACK_BODY, body);
    sections.insert(
        FALLBACK_CONCLUSION,
        pages.last().cloned().unwrap_or_default(),
    );
    sections
}
