use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, lenient_text, parse_date};

/// Employee record. Identity documents and bank details arrive decrypted because every list
/// request asks the server to reveal them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub employee_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub date_of_joining: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub aadhar: Option<String>,
    #[serde(default, rename = "UAN", deserialize_with = "lenient_text")]
    pub uan: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pf_no: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub esi_no: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub bank_branch_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub bank_account_no: Option<String>,
    #[serde(default, rename = "bankIFSCNo")]
    pub bank_ifsc_no: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub mobile_number: Option<String>,
}

impl Employee {
    pub fn date_of_joining(&self) -> Option<NaiveDate> {
        self.date_of_joining.as_deref().and_then(parse_date)
    }
}

impl Record for Employee {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Every optional field is sent, blank included, so an edit can clear it.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub employee_name: String,
    pub employee_id: String,
    pub designation: String,
    pub date_of_joining: String,
    pub aadhar: String,
    #[serde(rename = "UAN")]
    pub uan: String,
    pub pf_no: String,
    pub esi_no: String,
    pub bank_name: String,
    pub bank_branch_name: String,
    pub bank_account_no: String,
    #[serde(rename = "bankIFSCNo")]
    pub bank_ifsc_no: String,
    pub email: String,
    pub mobile_number: String,
}

/// Employee header embedded in salary-slip responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub employee_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_wire_names() {
        let emp: Employee = serde_json::from_value(json!({
            "_id": "e1",
            "employeeName": "Asha",
            "employeeId": 1042,
            "UAN": "100200300400",
            "bankIFSCNo": "SBIN0001",
            "mobileNumber": 9876543210u64,
            "dateOfJoining": "2023-06-01T00:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(emp.employee_id.as_deref(), Some("1042"));
        assert_eq!(emp.uan.as_deref(), Some("100200300400"));
        assert_eq!(emp.bank_ifsc_no.as_deref(), Some("SBIN0001"));
        assert_eq!(emp.mobile_number.as_deref(), Some("9876543210"));
        assert_eq!(emp.date_of_joining(), NaiveDate::from_ymd_opt(2023, 6, 1));
    }
}
