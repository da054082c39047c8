use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{FileRef, Record, lenient_text};
use crate::api::FilePart;

/// Skills are stored as a list but some postings carry a JSON-encoded string instead.
fn skill_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) => serde_json::from_str::<Vec<String>>(&s).unwrap_or_else(|_| {
            s.split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        }),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CareerPosting {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub short_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub qualifications: Option<String>,
    #[serde(default, deserialize_with = "skill_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub salary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub age: Option<String>,
    #[serde(default)]
    pub timings: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image: Option<FileRef>,
}

impl Record for CareerPosting {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Multipart payload; `skills` is sent as a JSON-encoded array.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CareerInput {
    pub title: String,
    pub short_title: String,
    pub description: String,
    pub qualifications: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub salary: String,
    pub age: String,
    pub timings: String,
    pub category: String,
    pub job_type: String,
    pub location: String,
    pub link: String,
    #[serde(skip)]
    pub image: Option<FilePart>,
}
