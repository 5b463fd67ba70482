//! The fixed shape of an article summary.
//!
//! [`FieldKey`] enumerates every template field once; the JSON schema, the
//! empty payload, page normalization, and every exporter iterate it instead
//! of naming fields by hand.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::sections::SectionMap;

/// Thematic group of a template field, in template order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldGroup {
    About,
    Methods,
    Analysis,
    Results,
    Future,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 5] = [
        Self::About,
        Self::Methods,
        Self::Analysis,
        Self::Results,
        Self::Future,
    ];

    /// 1-based position used for numbered headings.
    pub fn number(self) -> u8 {
        match self {
            Self::About => 1,
            Self::Methods => 2,
            Self::Analysis => 3,
            Self::Results => 4,
            Self::Future => 5,
        }
    }

    /// The field that stands in for this group in the master table.
    pub fn representative(self) -> FieldKey {
        match self {
            Self::About => FieldKey::AboutMainQuestions,
            Self::Methods => FieldKey::MethodsDesign,
            Self::Analysis => FieldKey::AnalysisType,
            Self::Results => FieldKey::ResultsCore,
            Self::Future => FieldKey::FutureGaps,
        }
    }
}

/// Identifier of one evidence-backed template field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    AboutMainQuestions,
    AboutPurpose,
    AboutTheory,
    MethodsDesign,
    MethodsDataSources,
    MethodsSample,
    MethodsInstruments,
    AnalysisType,
    AnalysisTechniques,
    AnalysisValidation,
    ResultsCore,
    ResultsSurprising,
    ResultsContributions,
    ResultsLimitations,
    FutureGaps,
    FutureExtensions,
    FutureYourIdeas,
}

impl FieldKey {
    pub const ALL: [FieldKey; 17] = [
        Self::AboutMainQuestions,
        Self::AboutPurpose,
        Self::AboutTheory,
        Self::MethodsDesign,
        Self::MethodsDataSources,
        Self::MethodsSample,
        Self::MethodsInstruments,
        Self::AnalysisType,
        Self::AnalysisTechniques,
        Self::AnalysisValidation,
        Self::ResultsCore,
        Self::ResultsSurprising,
        Self::ResultsContributions,
        Self::ResultsLimitations,
        Self::FutureGaps,
        Self::FutureExtensions,
        Self::FutureYourIdeas,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AboutMainQuestions => "about_main_questions",
            Self::AboutPurpose => "about_purpose",
            Self::AboutTheory => "about_theory",
            Self::MethodsDesign => "methods_design",
            Self::MethodsDataSources => "methods_data_sources",
            Self::MethodsSample => "methods_sample",
            Self::MethodsInstruments => "methods_instruments",
            Self::AnalysisType => "analysis_type",
            Self::AnalysisTechniques => "analysis_techniques",
            Self::AnalysisValidation => "analysis_validation",
            Self::ResultsCore => "results_core",
            Self::ResultsSurprising => "results_surprising",
            Self::ResultsContributions => "results_contributions",
            Self::ResultsLimitations => "results_limitations",
            Self::FutureGaps => "future_gaps",
            Self::FutureExtensions => "future_extensions",
            Self::FutureYourIdeas => "future_your_ideas",
        }
    }

    pub fn group(self) -> FieldGroup {
        match self {
            Self::AboutMainQuestions | Self::AboutPurpose | Self::AboutTheory => FieldGroup::About,
            Self::MethodsDesign
            | Self::MethodsDataSources
            | Self::MethodsSample
            | Self::MethodsInstruments => FieldGroup::Methods,
            Self::AnalysisType | Self::AnalysisTechniques | Self::AnalysisValidation => {
                FieldGroup::Analysis
            }
            Self::ResultsCore
            | Self::ResultsSurprising
            | Self::ResultsContributions
            | Self::ResultsLimitations => FieldGroup::Results,
            Self::FutureGaps | Self::FutureExtensions | Self::FutureYourIdeas => FieldGroup::Future,
        }
    }

    /// Human-readable heading used in the Markdown summary.
    pub fn heading(self) -> &'static str {
        match self {
            Self::AboutMainQuestions => "1) What is it about — Main questions",
            Self::AboutPurpose => "1) Purpose / aim",
            Self::AboutTheory => "1) Theory / key concepts",
            Self::MethodsDesign => "2) Methods — Research design",
            Self::MethodsDataSources => "2) Methods — Data sources",
            Self::MethodsSample => "2) Methods — Sample/participants",
            Self::MethodsInstruments => "2) Methods — Instruments/tools",
            Self::AnalysisType => "3) Analysis — Type",
            Self::AnalysisTechniques => "3) Analysis — Techniques/frameworks",
            Self::AnalysisValidation => "3) Analysis — Validation/reliability",
            Self::ResultsCore => "4) Results — Core findings",
            Self::ResultsSurprising => "4) Results — Surprising results",
            Self::ResultsContributions => "4) Results — Contributions",
            Self::ResultsLimitations => "4) Results — Limitations",
            Self::FutureGaps => "5) Future — Gaps",
            Self::FutureExtensions => "5) Future — Extensions",
            Self::FutureYourIdeas => "5) Future — Your ideas",
        }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of summary text with the 1-indexed pages that support it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceField {
    #[serde(default)]
    pub text: String,
    /// Page numbers (1-indexed) supporting the text, ascending and unique.
    #[serde(default)]
    pub evidence_pages: Vec<u32>,
}

impl EvidenceField {
    pub fn new(text: impl Into<String>, pages: impl IntoIterator<Item = i64>) -> Self {
        Self {
            text: text.into(),
            evidence_pages: normalize_pages(pages),
        }
    }
}

/// Keep positive page numbers, drop duplicates, sort ascending.
pub fn normalize_pages(pages: impl IntoIterator<Item = i64>) -> Vec<u32> {
    pages
        .into_iter()
        .filter(|&p| p > 0)
        .filter_map(|p| u32::try_from(p).ok())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Coerce loosely typed page values to page numbers and normalize them.
///
/// Integral numbers are kept (including floats with no fractional part);
/// strings, booleans, nulls, fractional and non-positive values are dropped.
pub fn normalize_page_values(values: &[Value]) -> Vec<u32> {
    normalize_pages(values.iter().filter_map(page_number))
}

fn page_number(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if n.is_u64() {
        // Larger than i64::MAX; no real document has that many pages.
        return None;
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// The evidence fields of a summary, always complete.
///
/// Every [`FieldKey`] has an entry; missing entries are filled with empty
/// fields on construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryFields {
    fields: BTreeMap<FieldKey, EvidenceField>,
}

impl Default for SummaryFields {
    fn default() -> Self {
        Self::empty()
    }
}

impl SummaryFields {
    pub fn empty() -> Self {
        Self {
            fields: FieldKey::ALL
                .into_iter()
                .map(|k| (k, EvidenceField::default()))
                .collect(),
        }
    }

    pub fn get(&self, key: FieldKey) -> &EvidenceField {
        // Every key is inserted by `empty()` and never removed.
        &self.fields[&key]
    }

    pub fn set(&mut self, key: FieldKey, field: EvidenceField) {
        self.fields.insert(key, field);
    }

    pub fn text(&self, key: FieldKey) -> &str {
        &self.get(key).text
    }

    /// Fields in template order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &EvidenceField)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_blank(&self) -> bool {
        self.fields
            .values()
            .all(|f| f.text.is_empty() && f.evidence_pages.is_empty())
    }
}

impl Serialize for SummaryFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SummaryFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = BTreeMap::<FieldKey, EvidenceField>::deserialize(deserializer)?;
        let mut fields = SummaryFields::empty();
        for (k, v) in parsed {
            fields.set(k, v);
        }
        Ok(fields)
    }
}

/// Document metadata handed to generation and assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub citation: Option<String>,
}

impl Metadata {
    /// Metadata derived from a file stem: both title and citation are the stem.
    pub fn from_stem(stem: &str) -> Self {
        Self {
            title: Some(stem.to_string()),
            citation: Some(stem.to_string()),
        }
    }

    pub fn citation_or_empty(&self) -> &str {
        self.citation.as_deref().unwrap_or("")
    }
}

/// The finalized summary of one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
    #[serde(default)]
    pub citation: String,
    #[serde(flatten)]
    pub fields: SummaryFields,
    #[serde(default)]
    pub raw_sections: Option<SectionMap>,
    #[serde(default)]
    pub raw_llm_json: Option<Value>,
}

impl ArticleSummary {
    pub fn field(&self, key: FieldKey) -> &EvidenceField {
        self.fields.get(key)
    }
}
