use super::{FieldErrors, FieldRule, FieldSpec, FormDraft, FormMode, FormSpec};
use crate::models::{
    CareerInput, CareerPosting, Company, CompanyInput, Department, DepartmentInput, Employee,
    EmployeeInput, SalaryDefaults, SalarySlip, SalarySlipInput, input_date, parse_pay_month,
};
use crate::resources::{
    CareerResource, CompanyResource, DepartmentResource, EmployeeResource, SalarySlipResource,
};

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyForm;

const COMPANY_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("companyName", "Company name", FieldRule::Text),
    FieldSpec::required("companyAddress", "Company address", FieldRule::Text),
    FieldSpec::required("companyEmail", "Company email", FieldRule::Email),
    FieldSpec::on_create("image", "Company logo", FieldRule::Image),
];

impl FormSpec for CompanyForm {
    type Resource = CompanyResource;

    fn fields(&self) -> &'static [FieldSpec] {
        COMPANY_FIELDS
    }

    fn draft_from(&self, record: &Company) -> FormDraft {
        FormDraft::new()
            .with("companyName", record.company_name.clone())
            .with("companyAddress", opt(&record.company_address))
            .with("companyEmail", opt(&record.company_email))
    }

    fn to_payload(&self, draft: &FormDraft) -> CompanyInput {
        CompanyInput {
            company_name: draft.text("companyName"),
            company_address: draft.text("companyAddress"),
            company_email: draft.text("companyEmail"),
            image: draft.file("image").cloned(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DepartmentForm;

const DEPARTMENT_FIELDS: &[FieldSpec] =
    &[FieldSpec::required("department", "Department name", FieldRule::Text)];

impl FormSpec for DepartmentForm {
    type Resource = DepartmentResource;

    fn fields(&self) -> &'static [FieldSpec] {
        DEPARTMENT_FIELDS
    }

    fn draft_from(&self, record: &Department) -> FormDraft {
        FormDraft::new().with("department", record.department.clone())
    }

    fn to_payload(&self, draft: &FormDraft) -> DepartmentInput {
        DepartmentInput {
            company_id: None,
            department: draft.text("department"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmployeeForm;

const EMPLOYEE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("employeeName", "Employee name", FieldRule::Text),
    FieldSpec::required("employeeId", "Employee ID", FieldRule::Text),
    FieldSpec::optional("designation", "Designation", FieldRule::Text),
    FieldSpec::optional("dateOfJoining", "Date of joining", FieldRule::Date),
    FieldSpec::optional("aadhar", "Aadhar", FieldRule::Text),
    FieldSpec::optional("UAN", "UAN", FieldRule::Text),
    FieldSpec::optional("pfNo", "PF number", FieldRule::Text),
    FieldSpec::optional("esiNo", "ESI number", FieldRule::Text),
    FieldSpec::optional("bankName", "Bank name", FieldRule::Text),
    FieldSpec::optional("bankBranchName", "Bank branch", FieldRule::Text),
    FieldSpec::optional("bankAccountNo", "Bank account number", FieldRule::Text),
    FieldSpec::optional("bankIFSCNo", "IFSC code", FieldRule::Text),
    FieldSpec::optional("email", "Email", FieldRule::Email),
    FieldSpec::optional("mobileNumber", "Mobile number", FieldRule::Mobile),
];

impl FormSpec for EmployeeForm {
    type Resource = EmployeeResource;

    fn fields(&self) -> &'static [FieldSpec] {
        EMPLOYEE_FIELDS
    }

    fn draft_from(&self, record: &Employee) -> FormDraft {
        FormDraft::new()
            .with("employeeName", record.employee_name.clone())
            .with("employeeId", opt(&record.employee_id))
            .with("designation", opt(&record.designation))
            .with("dateOfJoining", input_date(record.date_of_joining.as_deref()))
            .with("aadhar", opt(&record.aadhar))
            .with("UAN", opt(&record.uan))
            .with("pfNo", opt(&record.pf_no))
            .with("esiNo", opt(&record.esi_no))
            .with("bankName", opt(&record.bank_name))
            .with("bankBranchName", opt(&record.bank_branch_name))
            .with("bankAccountNo", opt(&record.bank_account_no))
            .with("bankIFSCNo", opt(&record.bank_ifsc_no))
            .with("email", opt(&record.email))
            .with("mobileNumber", opt(&record.mobile_number))
    }

    fn to_payload(&self, draft: &FormDraft) -> EmployeeInput {
        EmployeeInput {
            employee_name: draft.text("employeeName"),
            employee_id: draft.text("employeeId"),
            designation: draft.text("designation"),
            date_of_joining: draft.text("dateOfJoining"),
            aadhar: draft.text("aadhar"),
            uan: draft.text("UAN"),
            pf_no: draft.text("pfNo"),
            esi_no: draft.text("esiNo"),
            bank_name: draft.text("bankName"),
            bank_branch_name: draft.text("bankBranchName"),
            bank_account_no: draft.text("bankAccountNo"),
            bank_ifsc_no: draft.text("bankIFSCNo"),
            email: draft.text("email"),
            mobile_number: draft.text("mobileNumber"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SalarySlipForm;

const SALARY_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("payMonth", "Pay month", FieldRule::Month),
    FieldSpec::optional("basicSalary", "Basic salary", FieldRule::Amount),
    FieldSpec::optional("hra", "HRA", FieldRule::Amount),
    FieldSpec::optional("trAllowance", "Travel allowance", FieldRule::Amount),
    FieldSpec::optional("specialAllowance", "Special allowance", FieldRule::Amount),
    FieldSpec::optional("vda", "VDA", FieldRule::Amount),
    FieldSpec::optional("epf", "EPF", FieldRule::Amount),
    FieldSpec::optional("esic", "ESIC", FieldRule::Amount),
    FieldSpec::optional("professionalTax", "Professional tax", FieldRule::Amount),
    FieldSpec::optional("advance", "Advance", FieldRule::Amount),
    FieldSpec::optional("uniform_deduction", "Uniform deduction", FieldRule::Amount),
    FieldSpec::optional("late_login", "Late login", FieldRule::Amount),
    FieldSpec::optional("others", "Other deductions", FieldRule::Amount),
    FieldSpec::optional("lop", "LOP", FieldRule::Amount),
    FieldSpec::optional("totalWorkingDays", "Total working days", FieldRule::Amount),
    FieldSpec::optional("lopDays", "LOP days", FieldRule::Amount),
    FieldSpec::optional("paidDays", "Paid days", FieldRule::Amount),
    FieldSpec::optional("leaves_taken", "Leaves taken", FieldRule::Amount),
    FieldSpec::optional("salarySlipNumber", "Salary slip number", FieldRule::Text),
    FieldSpec::optional("notes", "Notes", FieldRule::Text),
];

impl SalarySlipForm {
    /// Create draft with the stored salary components filled in.
    pub fn prefilled(&self, defaults: &SalaryDefaults) -> FormDraft {
        let mut draft = FormDraft::new();
        let components = [
            ("basicSalary", defaults.basic_salary),
            ("vda", defaults.vda),
            ("hra", defaults.hra),
            ("trAllowance", defaults.tr_allowance),
            ("specialAllowance", defaults.special_allowance),
        ];
        for (name, value) in components {
            if let Some(amount) = value {
                draft.set(name, amount.to_string());
            }
        }
        draft
    }
}

impl FormSpec for SalarySlipForm {
    type Resource = SalarySlipResource;

    fn fields(&self) -> &'static [FieldSpec] {
        SALARY_FIELDS
    }

    fn draft_from(&self, record: &SalarySlip) -> FormDraft {
        FormDraft::new()
            .with("payMonth", record.pay_month_input())
            .with("basicSalary", record.basic_salary.to_string())
            .with("hra", record.hra.to_string())
            .with("trAllowance", record.tr_allowance.to_string())
            .with("specialAllowance", record.special_allowance.to_string())
            .with("vda", record.vda.to_string())
            .with("epf", record.epf.to_string())
            .with("esic", record.esic.to_string())
            .with("professionalTax", record.professional_tax.to_string())
            .with("advance", record.advance.to_string())
            .with("uniform_deduction", record.uniform_deduction.to_string())
            .with("late_login", record.late_login.to_string())
            .with("others", record.others.to_string())
            .with("lop", record.lop.to_string())
            .with("totalWorkingDays", record.total_working_days.to_string())
            .with("lopDays", record.lop_days.to_string())
            .with("paidDays", record.paid_days.to_string())
            .with("leaves_taken", record.leaves_taken.to_string())
            .with("salarySlipNumber", opt(&record.salary_slip_number))
            .with("notes", opt(&record.notes))
    }

    fn to_payload(&self, draft: &FormDraft) -> SalarySlipInput {
        let (pay_year, pay_month) = parse_pay_month(draft.get("payMonth")).unwrap_or((0, 0));

        SalarySlipInput {
            pay_month,
            pay_year,
            basic_salary: draft.number("basicSalary"),
            hra: draft.number("hra"),
            tr_allowance: draft.number("trAllowance"),
            special_allowance: draft.number("specialAllowance"),
            vda: draft.number("vda"),
            epf: draft.number("epf"),
            esic: draft.number("esic"),
            professional_tax: draft.number("professionalTax"),
            advance: draft.number("advance"),
            uniform_deduction: draft.number("uniform_deduction"),
            late_login: draft.number("late_login"),
            others: draft.number("others"),
            lop: draft.number("lop"),
            total_working_days: draft.number("totalWorkingDays"),
            lop_days: draft.number("lopDays"),
            paid_days: draft.number("paidDays"),
            leaves_taken: draft.number("leaves_taken"),
            salary_slip_number: draft.optional("salarySlipNumber"),
            notes: draft.optional("notes"),
        }
    }

    fn validate_extra(&self, draft: &FormDraft, _mode: &FormMode, errors: &mut FieldErrors) {
        let working = draft.number("totalWorkingDays");
        if working > 0.0 && draft.number("paidDays") > working {
            errors.insert("paidDays", "Paid days cannot exceed total working days.");
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CareerForm;

const CAREER_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", "Career title", FieldRule::Text),
    FieldSpec::required("shortTitle", "Career short title", FieldRule::Text),
    FieldSpec::required("description", "Job role description", FieldRule::Text),
    FieldSpec::required("qualifications", "Qualifications", FieldRule::Text),
    FieldSpec::required("skills", "Skills", FieldRule::List),
    FieldSpec::required("experience", "Experience", FieldRule::Text),
    FieldSpec::required("category", "Job category", FieldRule::Text),
    FieldSpec::required("jobType", "Job type", FieldRule::Text),
    FieldSpec::required("location", "Location", FieldRule::Text),
    FieldSpec::required("salary", "Salary", FieldRule::Text),
    FieldSpec::required("age", "Age", FieldRule::Text),
    FieldSpec::required("timings", "Timings", FieldRule::Text),
    FieldSpec::required("link", "Link", FieldRule::Text),
    FieldSpec::on_create("image", "Image", FieldRule::Image),
];

impl FormSpec for CareerForm {
    type Resource = CareerResource;

    fn fields(&self) -> &'static [FieldSpec] {
        CAREER_FIELDS
    }

    fn draft_from(&self, record: &CareerPosting) -> FormDraft {
        FormDraft::new()
            .with("title", record.title.clone())
            .with("shortTitle", opt(&record.short_title))
            .with("description", opt(&record.description))
            .with("qualifications", opt(&record.qualifications))
            .with("skills", record.skills.join(", "))
            .with("experience", opt(&record.experience))
            .with("category", opt(&record.category))
            .with("jobType", opt(&record.job_type))
            .with("location", opt(&record.location))
            .with("salary", opt(&record.salary))
            .with("age", opt(&record.age))
            .with("timings", opt(&record.timings))
            .with("link", opt(&record.link))
    }

    fn to_payload(&self, draft: &FormDraft) -> CareerInput {
        CareerInput {
            title: draft.text("title"),
            short_title: draft.text("shortTitle"),
            description: draft.text("description"),
            qualifications: draft.text("qualifications"),
            skills: draft.list("skills"),
            experience: draft.text("experience"),
            salary: draft.text("salary"),
            age: draft.text("age"),
            timings: draft.text("timings"),
            category: draft.text("category"),
            job_type: draft.text("jobType"),
            location: draft.text("location"),
            link: draft.text("link"),
            image: draft.file("image").cloned(),
        }
    }
}
