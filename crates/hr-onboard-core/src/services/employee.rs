//! Employee onboarding: persist the form, then mirror it to the HR spreadsheet.

use chrono::Utc;
use uuid::Uuid;

use super::duplicate_or_store;
use crate::error::{HrError, HrResult};
use crate::models::employee::{Employee, EmployeeRecord, EmployeeResponse};
use crate::spreadsheet::SpreadsheetExporter;
use crate::store::{Collection, DocumentStore};

#[derive(Clone)]
pub struct EmployeeService {
    employees: Collection<EmployeeRecord>,
    exporter: SpreadsheetExporter,
}

fn not_found() -> HrError {
    HrError::NotFound("Employee not found".to_string())
}

impl EmployeeService {
    pub fn new(store: &DocumentStore, exporter: SpreadsheetExporter) -> HrResult<Self> {
        Ok(Self {
            employees: store.collection()?,
            exporter,
        })
    }

    /// Store the record, then append it to the spreadsheet. A failed export does not undo
    /// the stored record; it is reported as `excel_export: "failed"`.
    pub async fn onboard(&self, employee: Employee) -> HrResult<EmployeeResponse> {
        employee.validate()?;
        let record = EmployeeRecord {
            id: Uuid::new_v4().to_string(),
            employee,
            created_at: Utc::now(),
        };
        self.employees.insert_one(&record).map_err(duplicate_or_store)?;
        tracing::info!(
            "Onboarded employee {} ({})",
            record.employee.employee_code,
            record.id
        );

        let excel_export = self.exporter.append_employee_row(&record).await;
        Ok(EmployeeResponse {
            status: "success".to_string(),
            id: record.id,
            excel_export,
        })
    }

    pub fn get(&self, id: &str) -> HrResult<EmployeeRecord> {
        self.employees.find_one(id)?.ok_or_else(not_found)
    }

    /// Oldest first.
    pub fn list(&self, offset: usize, limit: usize) -> HrResult<Vec<EmployeeRecord>> {
        let all = self
            .employees
            .find_sorted(|_| true, |e| (e.created_at, e.id.clone()))?;
        Ok(super::page(all, offset, limit))
    }

    pub fn delete(&self, id: &str) -> HrResult<()> {
        let removed = self.employees.delete_one(id)?.ok_or_else(not_found)?;
        tracing::info!("Deleted employee {} ({})", removed.employee.employee_code, id);
        Ok(())
    }
}
