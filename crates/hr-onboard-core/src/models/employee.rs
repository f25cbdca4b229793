//! New-joiner records captured by the onboarding form.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{check_email, check_len};
use crate::error::{HrError, HrResult};
use crate::store::Document;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_code: String,
    pub employee_name: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub date_of_joining: NaiveDate,
    pub designation: String,
    /// Cost to company in rupees.
    pub ctc_at_joining: f64,
    pub aadhaar_number: String,
    #[serde(default)]
    pub uan: Option<String>,
    pub personal_email_id: String,
    pub official_email_id: String,
    pub contact_number: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
}

impl Employee {
    pub fn validate(&self) -> HrResult<()> {
        check_len("employee_code", &self.employee_code, 1, 50)?;
        check_len("employee_name", &self.employee_name, 2, 100)?;
        check_len("gender", &self.gender, 1, 20)?;
        check_len("designation", &self.designation, 2, 100)?;
        if !(self.ctc_at_joining.is_finite() && self.ctc_at_joining > 0.0) {
            return Err(HrError::validation(
                "ctc_at_joining",
                "must be greater than 0",
            ));
        }
        check_len("aadhaar_number", &self.aadhaar_number, 8, 20)?;
        if let Some(uan) = &self.uan {
            check_len("uan", uan, 0, 20)?;
        }
        check_email("personal_email_id", &self.personal_email_id)?;
        check_email("official_email_id", &self.official_email_id)?;
        check_len("contact_number", &self.contact_number, 5, 30)?;
        check_len("emergency_contact_name", &self.emergency_contact_name, 2, 100)?;
        check_len("emergency_contact_number", &self.emergency_contact_number, 5, 30)
    }
}

/// Stored form: the submitted fields plus server-assigned id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: String,
    #[serde(flatten)]
    pub employee: Employee,
    pub created_at: DateTime<Utc>,
}

impl Document for EmployeeRecord {
    const COLLECTION: &'static str = "employees";
    const KEY_FIELD: &'static str = "id";

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Outcome of the spreadsheet append, reported verbatim to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Ok,
    Failed,
}

impl ExportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportStatus::Ok => "ok",
            ExportStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeResponse {
    pub status: String,
    pub id: String,
    pub excel_export: ExportStatus,
}
