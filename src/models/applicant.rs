use serde::{Deserialize, Serialize};

use super::{FileRef, Record, lenient_text};

/// A submitted application form, listed per designation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Applicant {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub contact_no: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub file: Option<FileRef>, // resume
}

impl Record for Applicant {
    fn id(&self) -> &str {
        &self.id
    }
}
