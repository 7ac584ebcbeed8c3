//! Complaint records as served by `GET /admin/complaints`.
//!
//! ## Observed shape
//!
//! The backend returns a JSON object keyed by complaint id. The id is never
//! repeated inside the record. Every field of a record may be missing on
//! older entries:
//!
//! - `status` is written as free text by the update endpoint, so besides the
//!   three known values it can hold anything. Unknown strings are modelled as
//!   a missing status.
//! - `submitted_at` is `time.time()` on the server, i.e. fractional seconds.
//! - `assigned_departments` and `predicted` may be absent or `null`; both are
//!   read as empty lists.
//!
//! Nothing here rejects a record for a wrongly typed field. Each field is
//! read on its own and falls back to "missing" when its type is off, so a
//! record with a numeric `pnr` or a string `submitted_at` still shows up and
//! still counts. Numbers where text is expected are stringified, and numeric
//! strings where a timestamp is expected are parsed.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Complaint id → record. Ordered by id so identical inputs always iterate
/// identically.
pub type Complaints = BTreeMap<String, ComplaintRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 3] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
    ];

    /// The exact string the backend stores for this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
        }
    }

    /// Exact match against the stored wire value. Anything else is `None`.
    #[must_use]
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient parse for operator input: case-insensitive, and `in-progress` /
/// `in_progress` are accepted for `In Progress`.
impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "pending" => Ok(ComplaintStatus::Pending),
            "in progress" => Ok(ComplaintStatus::InProgress),
            "resolved" => Ok(ComplaintStatus::Resolved),
            _ => Err(format!(
                "unknown status '{s}'; expected one of: Pending, In Progress, Resolved"
            )),
        }
    }
}

/// One AI-predicted department with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub department: String,
    /// Confidence in `[0, 1]`. The submit endpoint omits it.
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub pnr: Option<String>,
    #[serde(default, deserialize_with = "lenient_body")]
    pub complaint: String,
    #[serde(default, deserialize_with = "known_status")]
    pub status: Option<ComplaintStatus>,
    #[serde(default, deserialize_with = "lenient_departments")]
    pub assigned_departments: Vec<String>,
    #[serde(default, deserialize_with = "lenient_predictions")]
    pub predicted: Vec<Prediction>,
    /// Unix seconds, possibly fractional.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub submitted_at: Option<f64>,
}

impl ComplaintRecord {
    /// Sort key for display: a missing timestamp is the oldest possible value.
    #[must_use]
    pub fn submitted_at_or_epoch(&self) -> f64 {
        self.submitted_at.unwrap_or(0.0)
    }

    /// Returns `true` if `department` is one of the assigned departments.
    #[must_use]
    pub fn is_assigned_to(&self, department: &str) -> bool {
        self.assigned_departments.iter().any(|d| d == department)
    }
}

/// Strings as-is, numbers and booleans stringified, anything else missing.
fn text_of(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => {
            tracing::debug!(value = %other, "ignoring non-text complaint field");
            None
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(Value::deserialize(deserializer)?))
}

fn lenient_body<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn known_status<'de, D>(deserializer: D) -> Result<Option<ComplaintStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::String(raw) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let status = ComplaintStatus::from_wire(&raw);
    if status.is_none() {
        tracing::debug!(status = %raw, "unrecognised complaint status; treating as missing");
    }
    Ok(status)
}

/// A list of names. A non-list reads as empty; non-text entries are dropped.
fn lenient_departments<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items.into_iter().filter_map(text_of).collect())
}

/// Entries without a department name are dropped; a score that is not a
/// number reads as missing.
fn lenient_predictions<'de, D>(deserializer: D) -> Result<Vec<Prediction>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| {
            let Value::Object(mut fields) = item else {
                return None;
            };
            let department = fields.remove("department").and_then(text_of)?;
            let score = fields.get("score").and_then(Value::as_f64);
            Some(Prediction { department, score })
        })
        .collect())
}

/// Numbers, or strings that parse as a number.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|t| t.is_finite()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_record_deserializes() {
        let json = serde_json::json!({
            "pnr": "4521789630",
            "submitted_at": 1_712_000_000.25,
            "complaint": "Coach B2 toilet is not clean",
            "predicted": [{ "department": "Cleanliness", "score": 1.0 }],
            "assigned_departments": ["Cleanliness"],
            "status": "In Progress"
        });
        let record: ComplaintRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.pnr.as_deref(), Some("4521789630"));
        assert_eq!(record.status, Some(ComplaintStatus::InProgress));
        assert_eq!(record.assigned_departments, vec!["Cleanliness"]);
        assert_eq!(record.predicted[0].score, Some(1.0));
        assert!((record.submitted_at_or_epoch() - 1_712_000_000.25).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_record_uses_fallbacks() {
        let record: ComplaintRecord = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(record.pnr.is_none());
        assert!(record.status.is_none());
        assert!(record.assigned_departments.is_empty());
        assert!(record.predicted.is_empty());
        assert!(record.submitted_at.is_none());
        assert!(record.submitted_at_or_epoch().abs() < f64::EPSILON);
    }

    #[test]
    fn null_lists_read_as_empty() {
        let json = serde_json::json!({
            "complaint": null,
            "assigned_departments": null,
            "predicted": null,
            "status": null
        });
        let record: ComplaintRecord = serde_json::from_value(json).unwrap();
        assert!(record.complaint.is_empty());
        assert!(record.assigned_departments.is_empty());
        assert!(record.predicted.is_empty());
        assert!(record.status.is_none());
    }

    #[test]
    fn wrongly_typed_fields_fall_back_instead_of_failing() {
        let json = serde_json::json!({
            "pnr": 4_521_789_630_u64,
            "complaint": ["not", "text"],
            "status": 3,
            "assigned_departments": ["HR", 7, null, {"x": 1}],
            "predicted": [
                {"department": "HR", "score": "high"},
                {"score": 0.4},
                "IT"
            ],
            "submitted_at": "2000"
        });
        let record: ComplaintRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.pnr.as_deref(), Some("4521789630"));
        assert!(record.complaint.is_empty());
        assert!(record.status.is_none());
        assert_eq!(record.assigned_departments, vec!["HR", "7"]);
        assert_eq!(
            record.predicted,
            vec![Prediction {
                department: "HR".to_string(),
                score: None
            }]
        );
        assert_eq!(record.submitted_at, Some(2000.0));
    }

    #[test]
    fn non_list_departments_and_garbage_timestamp_read_as_missing() {
        let json = serde_json::json!({
            "assigned_departments": "HR",
            "predicted": {"department": "HR"},
            "submitted_at": "yesterday"
        });
        let record: ComplaintRecord = serde_json::from_value(json).unwrap();
        assert!(record.assigned_departments.is_empty());
        assert!(record.predicted.is_empty());
        assert!(record.submitted_at.is_none());
    }

    #[test]
    fn unknown_status_string_is_missing() {
        let record: ComplaintRecord =
            serde_json::from_value(serde_json::json!({ "status": "Escalated" })).unwrap();
        assert!(record.status.is_none());
    }

    #[test]
    fn wire_status_match_is_exact() {
        assert_eq!(ComplaintStatus::from_wire("Resolved"), Some(ComplaintStatus::Resolved));
        assert_eq!(ComplaintStatus::from_wire("resolved"), None);
        assert_eq!(ComplaintStatus::from_wire("In Progress"), Some(ComplaintStatus::InProgress));
    }

    #[test]
    fn operator_status_parse_is_lenient() {
        assert_eq!("pending".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::Pending);
        assert_eq!(
            "in-progress".parse::<ComplaintStatus>().unwrap(),
            ComplaintStatus::InProgress
        );
        assert_eq!(
            "In_Progress".parse::<ComplaintStatus>().unwrap(),
            ComplaintStatus::InProgress
        );
        assert!("closed".parse::<ComplaintStatus>().is_err());
    }

    #[test]
    fn status_serializes_to_wire_value() {
        let json = serde_json::to_value(ComplaintStatus::InProgress).unwrap();
        assert_eq!(json, serde_json::json!("In Progress"));
    }

    #[test]
    fn is_assigned_to_checks_membership() {
        let record = ComplaintRecord {
            assigned_departments: vec!["IT".to_string(), "HR".to_string()],
            ..ComplaintRecord::default()
        };
        assert!(record.is_assigned_to("HR"));
        assert!(!record.is_assigned_to("Security"));
    }
}
