use serde::{Deserialize, Serialize};

use super::{FileRef, Record};
use crate::api::FilePart;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_address: Option<String>,
    #[serde(default)]
    pub company_email: Option<String>,
    #[serde(default)]
    pub company_logo: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Record for Company {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Create/update payload. Sent as multipart; the logo travels as the `image` part.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInput {
    pub company_name: String,
    pub company_address: String,
    pub company_email: String,
    #[serde(skip)]
    pub image: Option<FilePart>,
}
