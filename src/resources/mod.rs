//! Resource descriptors: one per collection the admin panel manages. Each names its record
//! and payload types and knows how to build the list/create/update/delete requests.

pub mod admin;
pub mod careers;

pub use admin::{CompanyResource, DepartmentResource, EmployeeResource, SalarySlipResource};
pub use careers::{ApplicantResource, CareerResource};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{ApiRequest, MultipartForm};
use crate::controller::query::PageQuery;
use crate::error::{ClientError, ClientResult};
use crate::models::Record;
use crate::view::Tabular;

pub trait Resource: Send + Sync + 'static {
    type Record: Record
        + Tabular
        + std::fmt::Debug
        + Serialize
        + DeserializeOwned
        + Clone
        + Send
        + Sync
        + 'static;
    type Payload: Serialize + Send + Sync;

    /// Singular noun used in log lines and notifications.
    const NAME: &'static str;
    const LABEL: &'static str;
    /// Shown for a 409 when the server gives no message of its own.
    const CONFLICT_MESSAGE: &'static str;

    /// Field holding the records in a list response.
    fn items_key(&self) -> &'static str;

    fn list_request(&self, query: &PageQuery) -> ApiRequest;

    fn create_request(&self, payload: &Self::Payload) -> ClientResult<ApiRequest>;

    fn update_request(&self, id: &str, payload: &Self::Payload) -> ClientResult<ApiRequest>;

    fn delete_request(&self, id: &str) -> ApiRequest;

    /// Collections whose list endpoint answers 404 for "nothing here yet".
    fn empty_on_not_found(&self) -> bool {
        false
    }

    /// Local copy of `record` with the submitted fields applied. Blank strings clear a field.
    /// Falls back to the unchanged record when the merge does not decode.
    fn patch(record: &Self::Record, payload: &Self::Payload) -> Self::Record {
        let (Ok(mut base), Ok(Value::Object(changes))) =
            (serde_json::to_value(record), serde_json::to_value(payload))
        else {
            return record.clone();
        };

        if let Value::Object(fields) = &mut base {
            for (key, value) in changes {
                let value = match value {
                    Value::String(s) if s.trim().is_empty() => Value::Null,
                    other => other,
                };
                fields.insert(key, value);
            }
        }

        serde_json::from_value(base).unwrap_or_else(|e| {
            log::debug!("Could not patch {} locally: {}", Self::NAME, e);
            record.clone()
        })
    }
}

/// Flattens a payload into multipart text fields. Arrays travel JSON-encoded, nulls are dropped.
pub fn multipart_fields<T: Serialize>(payload: &T) -> ClientResult<MultipartForm> {
    let Value::Object(fields) = serde_json::to_value(payload)? else {
        return Err(ClientError::Decode(
            "Multipart payload must be an object".to_string(),
        ));
    };

    let mut form = MultipartForm::new();
    for (name, value) in fields {
        form = match value {
            Value::Null => form,
            Value::String(s) => form.text(&name, s),
            other => form.text(&name, other.to_string()),
        };
    }
    Ok(form)
}

pub(crate) fn json_body<T: Serialize>(request: ApiRequest, payload: &T) -> ClientResult<ApiRequest> {
    Ok(request.json(serde_json::to_value(payload)?))
}
