use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{EmployeeSummary, Record, lenient_amount, lenient_count};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// `"March 2025"`; out-of-range months fall back to `"<m>-<y>"`, missing parts to `"-"`.
pub fn month_display(month: Option<u32>, year: Option<u32>) -> String {
    match (month, year) {
        (Some(m), Some(y)) if m > 0 && y > 0 => match MONTH_NAMES.get(m as usize - 1) {
            Some(name) => format!("{} {}", name, y),
            None => format!("{}-{}", m, y),
        },
        _ => "-".to_string(),
    }
}

/// `YYYY-MM` as used by month inputs.
pub fn parse_pay_month(raw: &str) -> Option<(u32, u32)> {
    let mut parts = raw.trim().splitn(3, '-');
    let year = parts.next()?.parse::<u32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    if year == 0 || !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SalarySlip {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub pay_month: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub pay_year: Option<u32>,

    // Earnings
    #[serde(default, deserialize_with = "lenient_amount")]
    pub basic_salary: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub hra: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub tr_allowance: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub special_allowance: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub vda: f64,

    // Deductions
    #[serde(default, deserialize_with = "lenient_amount")]
    pub epf: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub esic: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub professional_tax: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub advance: f64,
    #[serde(default, rename = "uniform_deduction", deserialize_with = "lenient_amount")]
    pub uniform_deduction: f64,
    #[serde(default, rename = "late_login", deserialize_with = "lenient_amount")]
    pub late_login: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub others: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub lop: f64,

    // Attendance
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_working_days: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub lop_days: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub paid_days: f64,
    #[serde(default, rename = "leaves_taken", deserialize_with = "lenient_amount")]
    pub leaves_taken: f64,

    #[serde(default)]
    pub salary_slip_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<EmployeeSummary>,
}

impl SalarySlip {
    pub fn gross_earnings(&self) -> f64 {
        self.basic_salary + self.hra + self.tr_allowance + self.special_allowance + self.vda
    }

    pub fn total_deductions(&self) -> f64 {
        self.epf
            + self.esic
            + self.professional_tax
            + self.advance
            + self.uniform_deduction
            + self.late_login
            + self.others
            + self.lop
    }

    pub fn net_pay(&self) -> f64 {
        self.gross_earnings() - self.total_deductions()
    }

    pub fn period(&self) -> String {
        month_display(self.pay_month, self.pay_year)
    }

    /// `YYYY-MM` for the month input of an edit form.
    pub fn pay_month_input(&self) -> String {
        match (self.pay_year, self.pay_month) {
            (Some(y), Some(m)) if y > 0 && m > 0 => format!("{:04}-{:02}", y, m),
            _ => String::new(),
        }
    }
}

impl Record for SalarySlip {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalarySlipInput {
    pub pay_month: u32,
    pub pay_year: u32,
    pub basic_salary: f64,
    pub hra: f64,
    pub tr_allowance: f64,
    pub special_allowance: f64,
    pub vda: f64,
    pub epf: f64,
    pub esic: f64,
    pub professional_tax: f64,
    pub advance: f64,
    #[serde(rename = "uniform_deduction")]
    pub uniform_deduction: f64,
    #[serde(rename = "late_login")]
    pub late_login: f64,
    pub others: f64,
    pub lop: f64,
    pub total_working_days: f64,
    pub lop_days: f64,
    pub paid_days: f64,
    #[serde(rename = "leaves_taken")]
    pub leaves_taken: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_slip_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Salary components stored against an employee, used to prefill a new slip.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalaryDefaults {
    #[serde(default, deserialize_with = "optional_amount")]
    pub basic_salary: Option<f64>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub vda: Option<f64>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub hra: Option<f64>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub tr_allowance: Option<f64>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub special_allowance: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_totals() {
        let slip: SalarySlip = serde_json::from_value(json!({
            "_id": "s1",
            "payMonth": 3,
            "payYear": 2025,
            "basicSalary": 20000,
            "hra": "8000",
            "trAllowance": 1600,
            "specialAllowance": 400,
            "vda": null,
            "epf": 1800,
            "esic": 150,
            "professionalTax": 200,
            "uniform_deduction": 50,
            "late_login": "100",
            "lop": 0
        }))
        .unwrap();

        assert_eq!(slip.gross_earnings(), 30000.0);
        assert_eq!(slip.total_deductions(), 2300.0);
        assert_eq!(slip.net_pay(), 27700.0);
        assert_eq!(slip.period(), "March 2025");
        assert_eq!(slip.pay_month_input(), "2025-03");
    }

    #[test]
    fn test_month_display_edges() {
        assert_eq!(month_display(Some(12), Some(2024)), "December 2024");
        assert_eq!(month_display(Some(13), Some(2024)), "13-2024");
        assert_eq!(month_display(None, Some(2024)), "-");
    }

    #[test]
    fn test_parse_pay_month() {
        assert_eq!(parse_pay_month("2025-03"), Some((2025, 3)));
        assert_eq!(parse_pay_month("2025-13"), None);
        assert_eq!(parse_pay_month("March"), None);
        assert_eq!(parse_pay_month(""), None);
    }

    #[test]
    fn test_input_wire_names() {
        let input = SalarySlipInput {
            pay_month: 3,
            pay_year: 2025,
            uniform_deduction: 10.0,
            ..Default::default()
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["payMonth"], 3);
        assert_eq!(value["uniform_deduction"], 10.0);
        assert!(value.get("notes").is_none());
    }
}
