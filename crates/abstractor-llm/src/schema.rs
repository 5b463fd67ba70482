//! JSON schema sent with every request, validation of what comes back,
//! and the empty payload used when generation is unavailable.

use serde_json::{Map, Value, json};
use thiserror::Error;

use abstractor_core::{EvidenceField, FieldKey, Metadata, SummaryFields, normalize_page_values};

/// Name attached to the schema in the `response_format` block.
pub const SCHEMA_NAME: &str = "article_summary_schema";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("{path}: expected {expected}, found {found}")]
    Mismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// A validated, page-normalized generation payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedSummary {
    pub citation: String,
    pub fields: SummaryFields,
}

fn evidence_field_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "text": {"type": "string"},
            "evidence_pages": {"type": "array", "items": {"type": "integer"}},
        },
        "required": ["text", "evidence_pages"],
        "additionalProperties": false,
    })
}

/// Strict schema: `citation` plus every [`FieldKey`], all required, nothing else.
pub fn summary_schema() -> Value {
    let mut props = Map::new();
    props.insert("citation".into(), json!({"type": "string"}));
    for key in FieldKey::ALL {
        props.insert(key.as_str().into(), evidence_field_schema());
    }
    let required: Vec<Value> = props.keys().cloned().map(Value::String).collect();

    json!({
        "type": "object",
        "properties": props,
        "required": required,
        "additionalProperties": false,
    })
}

/// Every field present with empty text and no pages; citation from metadata.
pub fn mock_payload(metadata: &Metadata) -> Value {
    let mut payload = Map::new();
    payload.insert(
        "citation".into(),
        Value::String(metadata.citation_or_empty().to_string()),
    );
    for key in FieldKey::ALL {
        payload.insert(key.as_str().into(), json!({"text": "", "evidence_pages": []}));
    }
    Value::Object(payload)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(path: impl Into<String>, expected: &'static str, found: &Value) -> SchemaError {
    SchemaError::Mismatch {
        path: path.into(),
        expected,
        found: kind(found),
    }
}

/// Validate a payload against the summary shape and normalize its pages.
///
/// Absent properties take their defaults (empty text, no pages) and unknown
/// properties are ignored. A property that is present with the wrong JSON
/// type is an error. Page arrays are not type-checked per item; their
/// entries go through [`normalize_page_values`].
pub fn validate_payload(payload: &Value) -> Result<GeneratedSummary, SchemaError> {
    let obj = payload.as_object().ok_or(SchemaError::NotAnObject)?;

    let citation = match obj.get("citation") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => return Err(mismatch("citation", "string", other)),
    };

    let mut fields = SummaryFields::empty();
    for key in FieldKey::ALL {
        if let Some(value) = obj.get(key.as_str()) {
            fields.set(key, validate_field(key, value)?);
        }
    }

    Ok(GeneratedSummary { citation, fields })
}

fn validate_field(key: FieldKey, value: &Value) -> Result<EvidenceField, SchemaError> {
    let field = value
        .as_object()
        .ok_or_else(|| mismatch(key.as_str(), "object", value))?;

    let text = match field.get("text") {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => return Err(mismatch(format!("{key}.text"), "string", other)),
    };

    let evidence_pages = match field.get("evidence_pages") {
        None => Vec::new(),
        Some(Value::Array(items)) => normalize_page_values(items),
        Some(other) => return Err(mismatch(format!("{key}.evidence_pages"), "array", other)),
    };

    Ok(EvidenceField {
        text,
        evidence_pages,
    })
}

/// Rewrite every `evidence_pages` array in `payload` to its normalized form.
///
/// Used on the raw payload kept for traceability so it agrees with the
/// validated fields. Non-array values are left alone.
pub fn normalize_payload_pages(payload: &mut Value) {
    let Some(obj) = payload.as_object_mut() else {
        return;
    };
    for key in FieldKey::ALL {
        if let Some(Value::Array(items)) = obj
            .get_mut(key.as_str())
            .and_then(|f| f.get_mut("evidence_pages"))
        {
            let normalized = normalize_page_values(items);
            *items = normalized.into_iter().map(Value::from).collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_every_property() {
        let schema = summary_schema();
        let props = schema["properties"].as_object().unwrap();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(props.len(), 18);
        assert_eq!(required.len(), 18);
        assert_eq!(schema["additionalProperties"], false);
        for key in FieldKey::ALL {
            let field = &props[key.as_str()];
            assert_eq!(field["additionalProperties"], false);
            assert_eq!(field["required"], json!(["text", "evidence_pages"]));
        }
    }

    #[test]
    fn mock_payload_is_complete_and_empty() {
        let metadata = Metadata {
            title: None,
            citation: Some("Doe et al. 2021".into()),
        };
        let mock = mock_payload(&metadata);
        let obj = mock.as_object().unwrap();
        assert_eq!(obj.len(), 18);
        assert_eq!(obj["citation"], "Doe et al. 2021");
        for key in FieldKey::ALL {
            assert_eq!(obj[key.as_str()], json!({"text": "", "evidence_pages": []}));
        }
        let validated = validate_payload(&mock).unwrap();
        assert!(validated.fields.is_blank());
    }

    #[test]
    fn mock_payload_without_citation() {
        let mock = mock_payload(&Metadata::default());
        assert_eq!(mock["citation"], "");
    }

    #[test]
    fn validate_normalizes_pages() {
        let payload = json!({
            "citation": "X",
            "results_core": {"text": "found it", "evidence_pages": [3, 1, 3, -2, 1, "x"]},
        });
        let summary = validate_payload(&payload).unwrap();
        assert_eq!(summary.citation, "X");
        let field = summary.fields.get(FieldKey::ResultsCore);
        assert_eq!(field.text, "found it");
        assert_eq!(field.evidence_pages, vec![1, 3]);
        assert!(summary.fields.get(FieldKey::AboutPurpose).text.is_empty());
    }

    #[test]
    fn validate_rejects_wrong_types() {
        assert_eq!(
            validate_payload(&json!([1, 2])).unwrap_err(),
            SchemaError::NotAnObject
        );
        assert!(matches!(
            validate_payload(&json!({"citation": 5})).unwrap_err(),
            SchemaError::Mismatch { expected: "string", .. }
        ));
        assert!(matches!(
            validate_payload(&json!({"about_theory": "plain text"})).unwrap_err(),
            SchemaError::Mismatch { expected: "object", .. }
        ));
        let err = validate_payload(&json!({"future_gaps": {"text": "t", "evidence_pages": "4"}}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "future_gaps.evidence_pages: expected array, found string"
        );
    }

    #[test]
    fn validate_ignores_unknown_properties() {
        let summary = validate_payload(&json!({"citation": "c", "notes": 1})).unwrap();
        assert_eq!(summary.citation, "c");
    }

    #[test]
    fn normalize_payload_pages_rewrites_in_place() {
        let mut payload = json!({
            "analysis_type": {"text": "", "evidence_pages": [2, 5, 5, 1]},
            "citation": "c",
        });
        normalize_payload_pages(&mut payload);
        assert_eq!(payload["analysis_type"]["evidence_pages"], json!([1, 2, 5]));
        normalize_payload_pages(&mut payload);
        assert_eq!(payload["analysis_type"]["evidence_pages"], json!([1, 2, 5]));
    }
}
