//! Job posting and announcement records.
//!
//! Records read back from storage (or written by older versions of the
//! board) may miss fields or carry them with the wrong JSON type, so the
//! decoding here is deliberately lenient: every stored value is repaired into
//! a complete [`JobRecord`] instead of being rejected.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Title used when neither a title nor a first body line is available.
pub const UNTITLED: &str = "Untitled";

const ID_SUFFIX_LEN: usize = 4;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A single job posting.
///
/// Serialized with camelCase keys, which is the persisted layout of the
/// `jobs` storage key: `{id, title, raw, apply, views, applies, createdAt}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub raw: String,
    pub apply: String,
    pub views: u64,
    pub applies: u64,
    /// Unix timestamp in milliseconds.
    pub created_at: i64,
}

impl JobRecord {
    /// Create a brand new posting from its free-text body.
    ///
    /// The id is minted, the title is taken from the first line of `raw`
    /// and the creation instant is now.
    pub fn new(raw: impl Into<String>, apply: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            id: mint_job_id(),
            title: derive_title(&raw),
            raw,
            apply: apply.into(),
            views: 0,
            applies: 0,
            created_at: now_millis(),
        }
    }

    /// Case-insensitive match against the JSON form of the record.
    ///
    /// This is what the search box filters on, so ids, URLs and counters
    /// are all searchable along with the text.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        serde_json::to_string(self)
            .map(|json| json.to_lowercase().contains(&needle))
            .unwrap_or(false)
    }
}

/// The announcement singleton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementRecord {
    #[serde(default)]
    pub text: String,
}

/// The posting shown when nothing has been stored yet.
pub fn default_jobs() -> Vec<JobRecord> {
    let raw = "🎯 iOPEX Walkin Drive
Role: Finance Executive
Qualification: Any Graduate
Experience: 1-4 Years
Date: 19th December
https://www.naukri.com/";

    vec![JobRecord {
        id: "job_default_1".to_string(),
        title: "🎯 iOPEX Walkin Drive".to_string(),
        raw: raw.to_string(),
        apply: "https://www.naukri.com/".to_string(),
        views: 0,
        applies: 0,
        created_at: 0,
    }]
}

/// Result of normalizing a stored job list.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedJobs {
    pub jobs: Vec<JobRecord>,
    /// True when at least one stored record had no id, meaning the list
    /// should be written back.
    pub repaired: bool,
}

/// Normalize every stored value into a complete [`JobRecord`].
///
/// Minted ids never collide with ids already present in the list.
pub fn normalize_jobs(values: &[Value]) -> NormalizedJobs {
    let mut taken: HashSet<String> = values
        .iter()
        .filter_map(|v| text_of(field(v, "id")))
        .collect();

    let mut repaired = false;
    let jobs = values
        .iter()
        .map(|value| {
            let id = match text_of(field(value, "id")) {
                Some(id) => id,
                None => {
                    repaired = true;
                    let id = mint_unique_job_id(&taken);
                    taken.insert(id.clone());
                    id
                }
            };
            let raw = text_of(field(value, "raw")).unwrap_or_default();
            let title = text_of(field(value, "title")).unwrap_or_else(|| derive_title(&raw));

            JobRecord {
                id,
                title,
                raw,
                apply: text_of(field(value, "apply")).unwrap_or_default(),
                views: counter_of(field(value, "views")),
                applies: counter_of(field(value, "applies")),
                created_at: timestamp_of(field(value, "createdAt")),
            }
        })
        .collect();

    NormalizedJobs { jobs, repaired }
}

/// Title for a body: its first line, or [`UNTITLED`] when that is empty.
pub fn derive_title(raw: &str) -> String {
    match raw.split('\n').next() {
        Some(line) if !line.is_empty() => line.to_string(),
        _ => UNTITLED.to_string(),
    }
}

/// Mint a time-based job id with a short random suffix.
pub fn mint_job_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("job_{}_{}", now_millis(), suffix)
}

fn mint_unique_job_id(taken: &HashSet<String>) -> String {
    loop {
        let id = mint_job_id();
        if !taken.contains(&id) {
            return id;
        }
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn field<'a>(value: &'a Value, name: &str) -> &'a Value {
    value.get(name).unwrap_or(&Value::Null)
}

/// Non-empty text content of a JSON value. Empty strings count as missing.
pub(crate) fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Non-negative counter; anything unusable decodes as 0.
pub(crate) fn counter_of(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    number_of(value)
        .filter(|f| *f > 0.0)
        .map(|f| f as u64)
        .unwrap_or(0)
}

pub(crate) fn timestamp_of(value: &Value) -> i64 {
    if let Some(n) = value.as_i64() {
        return n;
    }
    number_of(value).map(|f| f as i64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_is_first_line_of_raw() {
        let normalized = normalize_jobs(&[json!({"id": "a", "raw": "Line1\nLine2"})]);
        assert_eq!(normalized.jobs[0].title, "Line1");
        assert!(!normalized.repaired);
    }

    #[test]
    fn test_empty_raw_gives_untitled() {
        let normalized = normalize_jobs(&[json!({"id": "a", "raw": ""})]);
        assert_eq!(normalized.jobs[0].title, UNTITLED);

        let normalized = normalize_jobs(&[json!({"id": "a", "raw": "\nsecond line"})]);
        assert_eq!(normalized.jobs[0].title, UNTITLED);
    }

    #[test]
    fn test_missing_ids_are_minted_unique() {
        let values: Vec<Value> = (0..50).map(|i| json!({"raw": format!("job {}", i)})).collect();
        let normalized = normalize_jobs(&values);

        assert!(normalized.repaired);
        let ids: HashSet<_> = normalized.jobs.iter().map(|j| j.id.clone()).collect();
        assert_eq!(ids.len(), 50);
        assert!(normalized.jobs.iter().all(|j| j.id.starts_with("job_")));
    }

    #[test]
    fn test_empty_id_counts_as_missing() {
        let normalized = normalize_jobs(&[json!({"id": "", "title": "x"})]);
        assert!(normalized.repaired);
        assert!(!normalized.jobs[0].id.is_empty());
    }

    #[test]
    fn test_lenient_numeric_fields() {
        let normalized = normalize_jobs(&[json!({
            "id": "a",
            "views": "7",
            "applies": -3,
            "createdAt": 1700000000000.9_f64,
        })]);
        let job = &normalized.jobs[0];
        assert_eq!(job.views, 7);
        assert_eq!(job.applies, 0);
        assert_eq!(job.created_at, 1700000000000);
    }

    #[test]
    fn test_non_object_entries_are_repaired() {
        let normalized = normalize_jobs(&[Value::Null, json!(42)]);
        assert_eq!(normalized.jobs.len(), 2);
        assert!(normalized.jobs.iter().all(|j| j.title == UNTITLED));
        assert!(normalized.repaired);
    }

    #[test]
    fn test_serialized_layout_uses_camel_case() {
        let job = JobRecord {
            id: "job_1".to_string(),
            title: "t".to_string(),
            raw: "t".to_string(),
            apply: String::new(),
            views: 1,
            applies: 2,
            created_at: 3,
        };
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["createdAt"], 3);
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_matches_query_is_case_insensitive() {
        let job = JobRecord::new("Senior RUST engineer\nRemote", "https://example.com/apply");
        assert!(job.matches_query("rust"));
        assert!(job.matches_query("EXAMPLE.COM"));
        assert!(!job.matches_query("golang"));
        assert!(job.matches_query(""));
    }
}
