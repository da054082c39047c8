use super::{RowAction, Tabular};
use crate::models::{
    Applicant, CareerPosting, Company, Department, Employee, SalarySlip, display_date,
};

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

impl Tabular for Company {
    fn headers() -> Vec<&'static str> {
        vec!["Company", "Address", "Email", "Logo"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.company_name.clone(),
            text(&self.company_address),
            text(&self.company_email),
            self.company_logo
                .as_ref()
                .map(|l| l.url().to_string())
                .unwrap_or_default(),
        ]
    }
}

impl Tabular for Department {
    fn headers() -> Vec<&'static str> {
        vec!["Department"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.department.clone()]
    }
}

impl Tabular for Employee {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Employee ID", "Designation", "Joined", "Email", "Mobile"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.employee_name.clone(),
            text(&self.employee_id),
            text(&self.designation),
            display_date(self.date_of_joining.as_deref()),
            text(&self.email),
            text(&self.mobile_number),
        ]
    }
}

impl Tabular for SalarySlip {
    fn headers() -> Vec<&'static str> {
        vec!["Month", "Slip No", "Gross", "Deductions", "Net", "Paid days"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.period(),
            text(&self.salary_slip_number),
            money(self.gross_earnings()),
            money(self.total_deductions()),
            money(self.net_pay()),
            self.paid_days.to_string(),
        ]
    }
}

impl Tabular for CareerPosting {
    fn headers() -> Vec<&'static str> {
        vec!["Title", "Category", "Job type", "Location", "Skills"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            text(&self.category),
            text(&self.job_type),
            text(&self.location),
            self.skills.join(", "),
        ]
    }
}

impl Tabular for Applicant {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Email", "Contact", "Resume"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            text(&self.email),
            text(&self.contact_no),
            self.file
                .as_ref()
                .map(|f| f.url().to_string())
                .unwrap_or_default(),
        ]
    }

    fn row_actions() -> &'static [RowAction] {
        &[RowAction::Delete]
    }
}
