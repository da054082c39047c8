use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use serde_json::json;

use super::auth::message_of;
use crate::api::{ApiClient, ApiRequest, accepted};
use crate::controller::ListState;
use crate::error::{ClientError, ClientResult};
use crate::forms::{FieldErrors, FormDraft, SalarySlipForm};
use crate::models::{EmployeeSummary, SalaryDefaults, SalarySlip};
use crate::resources::SalarySlipResource;

/// Payroll actions around one employee's salary slips that are not plain list CRUD.
pub struct PayrollService {
    api: ApiClient,
    resource: SalarySlipResource,
    sending: Mutex<BTreeSet<String>>,
}

impl PayrollService {
    pub fn new(api: ApiClient, resource: SalarySlipResource) -> Self {
        Self {
            api,
            resource,
            sending: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn resource(&self) -> &SalarySlipResource {
        &self.resource
    }

    fn sending(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.sending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stored salary components for the employee. Any failure means "no defaults".
    pub async fn salary_defaults(&self) -> Option<SalaryDefaults> {
        let request = ApiRequest::get(self.resource.defaults_path());
        match self.api.lookup(request).await {
            Ok(body) => {
                let defaults = body
                    .get("data")
                    .and_then(|d| d.get("salaryDefaults"))
                    .filter(|d| !d.is_null())?;
                serde_json::from_value(defaults.clone())
                    .inspect_err(|e| log::warn!("Unreadable salary defaults: {}", e))
                    .ok()
            }
            Err(e) => {
                log::warn!(
                    "Could not fetch stored salary defaults for employee {}: {}",
                    self.resource.employee_id,
                    e
                );
                None
            }
        }
    }

    /// Create draft for a new slip, prefilled from stored defaults when there are any.
    pub async fn prefilled_draft(&self) -> FormDraft {
        match self.salary_defaults().await {
            Some(defaults) => SalarySlipForm.prefilled(&defaults),
            None => FormDraft::new(),
        }
    }

    pub fn is_sending(&self, slip_id: &str) -> bool {
        self.sending().contains(slip_id)
    }

    /// Emails one slip to the employee. Sends of different slips may overlap.
    pub async fn send_slip(
        &self,
        slip_id: &str,
        employee: Option<&EmployeeSummary>,
    ) -> ClientResult<Option<String>> {
        let recipient = employee
            .and_then(|e| e.email.as_deref())
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| {
                ClientError::Validation(FieldErrors::single(
                    "recipient",
                    "Employee has no email. Provide recipient before sending.",
                ))
            })?
            .to_string();

        if !self.sending().insert(slip_id.to_string()) {
            return Err(ClientError::Validation(FieldErrors::single(
                "id",
                format!("Salary slip {} is already being sent", slip_id),
            )));
        }

        let request = ApiRequest::post(self.resource.slip_path(slip_id))
            .json(json!({ "recipient": recipient }));
        let result = self
            .api
            .send(request)
            .await
            .and_then(|body| accepted(body, "Failed to send salary slip"));

        self.sending().remove(slip_id);

        let body = result.inspect_err(|e| {
            log::warn!("Failed to send salary slip {}: {}", slip_id, e);
        })?;
        log::info!("Salary slip {} sent to {}", slip_id, recipient);
        Ok(message_of(&body))
    }

    /// Link to the printable slip.
    pub fn slip_url(&self, slip_id: &str) -> String {
        self.api.url(&self.resource.slip_path(slip_id))
    }
}

/// Employee the slips belong to: the list response's header, else the first slip's.
pub fn employee_of(state: &ListState<SalarySlip>) -> Option<EmployeeSummary> {
    state
        .context
        .get("employee")
        .filter(|e| e.is_object())
        .and_then(|e| serde_json::from_value::<EmployeeSummary>(e.clone()).ok())
        .or_else(|| state.items.iter().find_map(|slip| slip.employee.clone()))
}
