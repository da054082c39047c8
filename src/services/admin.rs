use std::collections::BTreeMap;

use serde_json::Value;

use super::auth::message_of;
use crate::api::envelope::lenient_u64;
use crate::api::{ApiClient, ApiRequest, accepted, path_of};
use crate::error::{ClientError, ClientResult};
use crate::models::{CareerPosting, Company};

/// Dashboard figures and bulk actions on the admin home screen.
pub struct AdminService {
    api: ApiClient,
}

impl AdminService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn total_employees(&self) -> ClientResult<u64> {
        let body = self
            .api
            .lookup(ApiRequest::get("/admin/total-employees"))
            .await
            .and_then(|body| accepted(body, "Failed to fetch employee count"))?;
        Ok(body.get("totalEmployees").and_then(lenient_u64).unwrap_or(0))
    }

    /// Pulls employee records from the shared sheet into the backend.
    pub async fn upload_employee_records(&self) -> ClientResult<String> {
        let body = self
            .api
            .send(ApiRequest::post("/bulk/admin/upload-employeeRecords"))
            .await?;
        log::info!("Employee records uploaded");
        Ok(message_of(&body).unwrap_or_else(|| "Employee records uploaded successfully".to_string()))
    }

    /// Removes every bulk-uploaded employee. Returns how many went.
    pub async fn delete_uploaded_employees(&self) -> ClientResult<u64> {
        let body = self
            .api
            .send(ApiRequest::delete("/bulk/admin/delete-uploaded-employeedata"))
            .await
            .and_then(|body| accepted(body, "Failed to delete uploaded employees"))?;
        let deleted = body.get("deletedCount").and_then(lenient_u64).unwrap_or(0);
        log::info!("Deleted {} uploaded employees", deleted);
        Ok(deleted)
    }

    /// Submitted applications per designation.
    pub async fn career_counts(&self) -> ClientResult<BTreeMap<String, u64>> {
        let body = self
            .api
            .lookup(ApiRequest::get("/careersSubmittedCount"))
            .await?;

        let counts = match body.get("counts") {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(designation, count)| (designation.clone(), lenient_u64(count).unwrap_or(0)))
                .collect(),
            _ => BTreeMap::new(),
        };
        Ok(counts)
    }

    pub async fn company_details(&self, id: &str) -> ClientResult<Company> {
        let body = self
            .api
            .lookup(ApiRequest::get(path_of(&["admin", "comp-details", id])))
            .await
            .and_then(|body| accepted(body, "Failed to fetch company details"))?;
        decode_data(body, "company")
    }

    pub async fn career_details(&self, id: &str) -> ClientResult<CareerPosting> {
        let body = self
            .api
            .lookup(ApiRequest::get(path_of(&["getIndCareer", id])))
            .await?;
        decode_data(body, "career")
    }
}

fn decode_data<T: serde::de::DeserializeOwned>(mut body: Value, what: &str) -> ClientResult<T> {
    match body.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => Ok(serde_json::from_value(data)?),
        _ => Err(ClientError::Decode(format!("Response carried no {}", what))),
    }
}
