pub mod applicant;
pub mod career;
pub mod company;
pub mod department;
pub mod employee;
pub mod salary;

// Re-export all models for easy importing
pub use applicant::*;
pub use career::*;
pub use company::*;
pub use department::*;
pub use employee::*;
pub use salary::*;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Anything the backend stores under a server-assigned `_id`.
pub trait Record {
    fn id(&self) -> &str;
}

/// Hosted upload reference. Older records store a bare URL, newer ones an object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FileRef {
    Url(String),
    Hosted {
        url: String,
        #[serde(default, rename = "public_id", skip_serializing_if = "Option::is_none")]
        public_id: Option<String>,
    },
}

impl FileRef {
    pub fn url(&self) -> &str {
        match self {
            FileRef::Url(url) => url,
            FileRef::Hosted { url, .. } => url,
        }
    }
}

/// Parses `YYYY-MM-DD` or a full RFC 3339 timestamp into a calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

/// `dd/mm/yyyy`, or empty when the input is not a date.
pub fn display_date(raw: Option<&str>) -> String {
    raw.and_then(parse_date)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// `yyyy-mm-dd` for form inputs.
pub fn input_date(raw: Option<&str>) -> String {
    raw.and_then(parse_date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Accepts a string, number or null and yields optional text.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Accepts a number, numeric string or null; anything unparseable becomes zero.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

pub fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(crate::api::envelope::lenient_u64).map(|n| n as u32))
}
