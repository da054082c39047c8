use serde::{Deserialize, Serialize};

use super::Record;

/// A department's company reference is either the bare id or a populated summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CompanyRef {
    Id(String),
    Summary {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default, rename = "companyName")]
        company_name: Option<String>,
    },
}

impl CompanyRef {
    pub fn id(&self) -> &str {
        match self {
            CompanyRef::Id(id) => id,
            CompanyRef::Summary { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub department: String,
    #[serde(default, alias = "companyId", skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Record for Department {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Create carries the owning company; update only renames.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub department: String,
}
