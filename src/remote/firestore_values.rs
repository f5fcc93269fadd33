//! Conversion between documents and the Firestore REST typed-value encoding.
//!
//! Firestore wraps every field in an object naming its type, e.g.
//! `{"stringValue": "x"}` or `{"integerValue": "42"}` (64-bit integers
//! travel as strings). Decoding is lenient about which numeric encoding
//! another client chose.

use super::models::{AnnouncementDocument, JobDocument};
use serde_json::{json, Map, Value};

pub type Fields = Map<String, Value>;

pub fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

pub fn integer_value(value: i64) -> Value {
    json!({ "integerValue": value.to_string() })
}

pub fn decode_string(value: Option<&Value>) -> Option<String> {
    let value = value?.as_object()?;
    if let Some(text) = value.get("stringValue").and_then(Value::as_str) {
        return Some(text.to_string());
    }
    if let Some(number) = value.get("integerValue") {
        return match number {
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        };
    }
    value.get("doubleValue").map(|number| number.to_string())
}

pub fn decode_integer(value: Option<&Value>) -> Option<i64> {
    let value = value?.as_object()?;
    if let Some(number) = value.get("integerValue") {
        return match number {
            Value::String(text) => text.trim().parse().ok(),
            other => other.as_i64(),
        };
    }
    if let Some(number) = value.get("doubleValue").and_then(Value::as_f64) {
        return number.is_finite().then_some(number as i64);
    }
    if let Some(timestamp) = value.get("timestampValue").and_then(Value::as_str) {
        return chrono::DateTime::parse_from_rfc3339(timestamp)
            .ok()
            .map(|t| t.timestamp_millis());
    }
    value
        .get("stringValue")
        .and_then(Value::as_str)
        .and_then(|text| text.trim().parse().ok())
}

fn decode_counter(value: Option<&Value>) -> Option<u64> {
    decode_integer(value).map(|n| n.max(0) as u64)
}

pub fn job_fields(document: &JobDocument) -> Fields {
    let mut fields = Fields::new();
    let strings = [
        ("title", &document.title),
        ("raw", &document.raw),
        ("apply", &document.apply),
    ];
    for (name, value) in strings {
        if let Some(value) = value {
            fields.insert(name.to_string(), string_value(value));
        }
    }
    if let Some(views) = document.views {
        fields.insert("views".to_string(), integer_value(views as i64));
    }
    if let Some(applies) = document.applies {
        fields.insert("applies".to_string(), integer_value(applies as i64));
    }
    if let Some(created_at) = document.created_at {
        fields.insert("createdAt".to_string(), integer_value(created_at));
    }
    fields
}

pub fn job_document(fields: &Fields) -> JobDocument {
    JobDocument {
        title: decode_string(fields.get("title")),
        raw: decode_string(fields.get("raw")),
        apply: decode_string(fields.get("apply")),
        views: decode_counter(fields.get("views")),
        applies: decode_counter(fields.get("applies")),
        created_at: decode_integer(fields.get("createdAt")),
    }
}

pub fn announcement_fields(announcement: &AnnouncementDocument) -> Fields {
    let mut fields = Fields::new();
    fields.insert("text".to_string(), string_value(&announcement.text));
    fields
}

pub fn announcement_document(fields: &Fields) -> AnnouncementDocument {
    AnnouncementDocument {
        text: decode_string(fields.get("text")).unwrap_or_default(),
    }
}

/// Last path segment of a full document name.
pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_fields_use_typed_values() {
        let document = JobDocument {
            title: Some("Dev".to_string()),
            raw: Some("Dev\nRemote".to_string()),
            apply: Some(String::new()),
            views: Some(3),
            applies: Some(0),
            created_at: Some(1_700_000_000_000),
        };

        let fields = job_fields(&document);
        assert_eq!(fields["title"], json!({"stringValue": "Dev"}));
        assert_eq!(fields["views"], json!({"integerValue": "3"}));
        assert_eq!(
            fields["createdAt"],
            json!({"integerValue": "1700000000000"})
        );
        assert_eq!(job_document(&fields), document);
    }

    #[test]
    fn test_decoding_is_lenient_about_numeric_encodings() {
        let fields: Fields = serde_json::from_value(json!({
            "title": {"stringValue": "Ops"},
            "views": {"doubleValue": 7.0},
            "applies": {"integerValue": "-2"},
            "createdAt": {"timestampValue": "2024-01-01T00:00:00Z"},
            "apply": {"nullValue": null}
        }))
        .unwrap();

        let document = job_document(&fields);
        assert_eq!(document.title.as_deref(), Some("Ops"));
        assert_eq!(document.views, Some(7));
        assert_eq!(document.applies, Some(0));
        assert_eq!(document.created_at, Some(1_704_067_200_000));
        assert_eq!(document.apply, None);
        assert_eq!(document.raw, None);
    }

    #[test]
    fn test_document_id_is_last_segment() {
        assert_eq!(
            document_id("projects/p/databases/(default)/documents/jobs/job_1"),
            "job_1"
        );
        assert_eq!(document_id("job_2"), "job_2");
    }
}
