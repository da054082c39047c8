use super::{Resource, json_body, multipart_fields};
use crate::api::{ApiRequest, path_of};
use crate::controller::query::PageQuery;
use crate::error::ClientResult;
use crate::models::{
    Company, CompanyInput, Department, DepartmentInput, Employee, EmployeeInput, SalarySlip,
    SalarySlipInput,
};

#[derive(Debug, Clone, Default)]
pub struct CompanyResource;

impl Resource for CompanyResource {
    type Record = Company;
    type Payload = CompanyInput;

    const NAME: &'static str = "company";
    const LABEL: &'static str = "Companies";
    const CONFLICT_MESSAGE: &'static str = "Company already exists";

    fn items_key(&self) -> &'static str {
        "company"
    }

    fn list_request(&self, _query: &PageQuery) -> ApiRequest {
        ApiRequest::get("/admin/get-companies")
    }

    fn create_request(&self, payload: &CompanyInput) -> ClientResult<ApiRequest> {
        let mut form = multipart_fields(payload)?;
        if let Some(image) = &payload.image {
            form = form.file(image.clone());
        }
        Ok(ApiRequest::post("/admin/add-company").multipart(form))
    }

    fn update_request(&self, id: &str, payload: &CompanyInput) -> ClientResult<ApiRequest> {
        let mut form = multipart_fields(payload)?;
        if let Some(image) = &payload.image {
            form = form.file(image.clone());
        }
        Ok(ApiRequest::put(path_of(&["admin", "update-company", id])).multipart(form))
    }

    fn delete_request(&self, id: &str) -> ApiRequest {
        ApiRequest::delete(path_of(&["admin", "delete-company", id]))
    }
}

#[derive(Debug, Clone)]
pub struct DepartmentResource {
    pub company_id: String,
}

impl DepartmentResource {
    pub fn new(company_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
        }
    }

    fn base(&self) -> String {
        path_of(&["admin", "companies", &self.company_id, "departments"])
    }

    fn member(&self, id: &str) -> String {
        path_of(&["admin", "companies", &self.company_id, "departments", id])
    }
}

impl Resource for DepartmentResource {
    type Record = Department;
    type Payload = DepartmentInput;

    const NAME: &'static str = "department";
    const LABEL: &'static str = "Departments";
    const CONFLICT_MESSAGE: &'static str = "Department already exists";

    fn items_key(&self) -> &'static str {
        "departments"
    }

    fn list_request(&self, _query: &PageQuery) -> ApiRequest {
        ApiRequest::get(self.base())
    }

    fn create_request(&self, payload: &DepartmentInput) -> ClientResult<ApiRequest> {
        let payload = DepartmentInput {
            company_id: Some(self.company_id.clone()),
            department: payload.department.clone(),
        };
        json_body(ApiRequest::post("/admin/create-dept"), &payload)
    }

    fn update_request(&self, id: &str, payload: &DepartmentInput) -> ClientResult<ApiRequest> {
        let payload = DepartmentInput {
            company_id: None,
            department: payload.department.clone(),
        };
        json_body(ApiRequest::put(self.member(id)), &payload)
    }

    fn delete_request(&self, id: &str) -> ApiRequest {
        ApiRequest::delete(self.member(id))
    }
}

#[derive(Debug, Clone)]
pub struct EmployeeResource {
    pub company_id: String,
    pub dept_id: String,
}

impl EmployeeResource {
    pub fn new(company_id: impl Into<String>, dept_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            dept_id: dept_id.into(),
        }
    }

    fn base(&self) -> String {
        path_of(&[
            "admin",
            "companies",
            &self.company_id,
            "departments",
            &self.dept_id,
            "employees",
        ])
    }

    fn member(&self, id: &str) -> String {
        path_of(&[
            "admin",
            "companies",
            &self.company_id,
            "departments",
            &self.dept_id,
            "employees",
            id,
        ])
    }
}

impl Resource for EmployeeResource {
    type Record = Employee;
    type Payload = EmployeeInput;

    const NAME: &'static str = "employee";
    const LABEL: &'static str = "Employees";
    const CONFLICT_MESSAGE: &'static str = "Employee ID already exists";

    fn items_key(&self) -> &'static str {
        "employees"
    }

    fn list_request(&self, query: &PageQuery) -> ApiRequest {
        ApiRequest::get(self.base())
            .with_query("page", query.page)
            .with_query("limit", query.limit)
            .with_query("reveal", true)
    }

    fn create_request(&self, payload: &EmployeeInput) -> ClientResult<ApiRequest> {
        json_body(ApiRequest::post(self.base()), payload)
    }

    fn update_request(&self, id: &str, payload: &EmployeeInput) -> ClientResult<ApiRequest> {
        json_body(ApiRequest::put(self.member(id)), payload)
    }

    fn delete_request(&self, id: &str) -> ApiRequest {
        ApiRequest::delete(self.member(id))
    }
}

#[derive(Debug, Clone)]
pub struct SalarySlipResource {
    pub company_id: String,
    pub dept_id: String,
    pub employee_id: String,
}

impl SalarySlipResource {
    pub fn new(
        company_id: impl Into<String>,
        dept_id: impl Into<String>,
        employee_id: impl Into<String>,
    ) -> Self {
        Self {
            company_id: company_id.into(),
            dept_id: dept_id.into(),
            employee_id: employee_id.into(),
        }
    }

    fn base(&self) -> String {
        path_of(&[
            "admin",
            "companies",
            &self.company_id,
            "departments",
            &self.dept_id,
            "employees",
            &self.employee_id,
        ])
    }

    fn member(&self, slip_id: &str) -> String {
        path_of(&[
            "admin",
            "companies",
            &self.company_id,
            "departments",
            &self.dept_id,
            "employees",
            &self.employee_id,
            "salaries",
            slip_id,
        ])
    }

    /// Path shared by the printable slip and the send-by-email action.
    pub fn slip_path(&self, slip_id: &str) -> String {
        path_of(&[
            "slip",
            "admin",
            "companies",
            &self.company_id,
            "departments",
            &self.dept_id,
            "employees",
            &self.employee_id,
            "salary",
            slip_id,
        ])
    }

    pub fn defaults_path(&self) -> String {
        path_of(&[
            "admin",
            "companies",
            &self.company_id,
            "departments",
            &self.dept_id,
            "fetchStoredEmpSalary",
            &self.employee_id,
        ])
    }
}

impl Resource for SalarySlipResource {
    type Record = SalarySlip;
    type Payload = SalarySlipInput;

    const NAME: &'static str = "salary slip";
    const LABEL: &'static str = "Salary slips";
    const CONFLICT_MESSAGE: &'static str = "A salary slip for this month already exists";

    fn items_key(&self) -> &'static str {
        "data"
    }

    fn list_request(&self, query: &PageQuery) -> ApiRequest {
        ApiRequest::get(self.base())
            .with_query("page", query.page)
            .with_query("limit", query.limit)
    }

    fn create_request(&self, payload: &SalarySlipInput) -> ClientResult<ApiRequest> {
        json_body(ApiRequest::post(self.base()), payload)
    }

    fn update_request(&self, id: &str, payload: &SalarySlipInput) -> ClientResult<ApiRequest> {
        json_body(ApiRequest::put(self.member(id)), payload)
    }

    fn delete_request(&self, id: &str) -> ApiRequest {
        ApiRequest::delete(self.member(id))
    }

    fn empty_on_not_found(&self) -> bool {
        true
    }
}
