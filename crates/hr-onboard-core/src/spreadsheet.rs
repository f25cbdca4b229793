//! Employee spreadsheet export: one CSV row per onboarded employee.
//!
//! Appends are serialized across processes by an exclusive lock on a sibling
//! `<file>.lock`. Waiting for the lock is bounded; on timeout or any I/O error the append
//! is abandoned before the workbook is opened for writing.

use std::fs::{File, OpenOptions, TryLockError};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::models::employee::{EmployeeRecord, ExportStatus};

pub const COLUMNS: [&str; 15] = [
    "employee_code",
    "employee_name",
    "gender",
    "date_of_birth",
    "date_of_joining",
    "designation",
    "ctc_at_joining",
    "aadhaar_number",
    "uan",
    "personal_email_id",
    "official_email_id",
    "contact_number",
    "emergency_contact_name",
    "emergency_contact_number",
    "created_at",
];

const LOCK_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("lock on {path} not acquired within {waited:?}")]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("spreadsheet io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct SpreadsheetExporter {
    path: PathBuf,
    lock_timeout: Duration,
}

fn header_line() -> String {
    COLUMNS.join(",")
}

/// RFC 4180 quoting: only fields that need it are wrapped.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) || field.trim() != field {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn format_row(record: &EmployeeRecord) -> String {
    let e = &record.employee;
    let cells = [
        e.employee_code.clone(),
        e.employee_name.clone(),
        e.gender.clone(),
        e.date_of_birth.format("%Y-%m-%d").to_string(),
        e.date_of_joining.format("%Y-%m-%d").to_string(),
        e.designation.clone(),
        format!("{:.2}", e.ctc_at_joining),
        e.aadhaar_number.clone(),
        e.uan.clone().unwrap_or_default(),
        e.personal_email_id.clone(),
        e.official_email_id.clone(),
        e.contact_number.clone(),
        e.emergency_contact_name.clone(),
        e.emergency_contact_number.clone(),
        record.created_at.format("%Y-%m-%d").to_string(),
    ];
    cells.iter().map(|c| escape(c)).collect::<Vec<_>>().join(",")
}

impl SpreadsheetExporter {
    pub fn new(path: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            lock_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Append `record` on the blocking pool. Never fails; the outcome is the status.
    pub async fn append_employee_row(&self, record: &EmployeeRecord) -> ExportStatus {
        let row = format_row(record);
        let exporter = self.clone();
        let code = record.employee.employee_code.clone();
        match tokio::task::spawn_blocking(move || exporter.append_blocking(&row)).await {
            Ok(Ok(())) => {
                tracing::info!("Employee {} appended to {}", code, self.path.display());
                ExportStatus::Ok
            }
            Ok(Err(e)) => {
                tracing::error!("Spreadsheet export for {} failed: {}", code, e);
                ExportStatus::Failed
            }
            Err(e) => {
                tracing::error!("Spreadsheet export task for {} aborted: {}", code, e);
                ExportStatus::Failed
            }
        }
    }

    /// Synchronous append under the file lock.
    pub fn append_blocking(&self, row: &str) -> Result<(), ExportError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let lock_path = self.lock_path();
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        self.acquire(&lock, &lock_path)?;
        let written = self.write_row(row);
        // Dropping the handle releases the lock as well.
        if let Err(e) = lock.unlock() {
            tracing::warn!("Releasing {} failed: {}", lock_path.display(), e);
        }
        written
    }

    fn acquire(&self, lock: &File, lock_path: &Path) -> Result<(), ExportError> {
        let started = Instant::now();
        loop {
            match lock.try_lock() {
                Ok(()) => return Ok(()),
                Err(TryLockError::WouldBlock) => {
                    let waited = started.elapsed();
                    if waited >= self.lock_timeout {
                        return Err(ExportError::LockTimeout {
                            path: lock_path.to_path_buf(),
                            waited,
                        });
                    }
                    std::thread::sleep(LOCK_POLL.min(self.lock_timeout - waited));
                }
                Err(TryLockError::Error(e)) => return Err(e.into()),
            }
        }
    }

    fn existing_header(&self) -> Result<Option<String>, ExportError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut first = String::new();
        BufReader::new(file).read_line(&mut first)?;
        let first = first.trim_end_matches(['\r', '\n']);
        Ok((!first.is_empty()).then(|| first.to_string()))
    }

    fn write_row(&self, row: &str) -> Result<(), ExportError> {
        let header = header_line();
        let mut file = match self.existing_header()? {
            Some(found) if found == header => {
                OpenOptions::new().append(true).open(&self.path)?
            }
            Some(found) => {
                tracing::warn!(
                    "{} has unexpected header ({}); starting a new sheet",
                    self.path.display(),
                    found
                );
                let mut f = File::create(&self.path)?;
                writeln!(f, "{}", header)?;
                f
            }
            None => {
                let mut f = File::create(&self.path)?;
                writeln!(f, "{}", header)?;
                f
            }
        };
        writeln!(file, "{}", row)?;
        file.sync_data()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::fixtures::employee;
    use chrono::{TimeZone, Utc};

    fn record(code: &str) -> EmployeeRecord {
        EmployeeRecord {
            id: format!("id-{}", code),
            employee: employee(code),
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap(),
        }
    }

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn row_uses_fixed_columns_and_formats() {
        let row = format_row(&record("EMP001"));
        assert_eq!(
            row,
            "EMP001,Priya Nair,Female,1994-04-12,2026-10-01,Data Analyst,1250000.00,123412341234,100200300400,priya@example.com,priya.nair@acme.co.in,+91 98450 12345,Ravi Nair,+91 98450 54321,2026-10-01"
        );
    }

    #[test]
    fn created_at_is_written_as_a_plain_date() {
        let mut late = record("EMP009");
        late.created_at = Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap();
        assert!(format_row(&late).ends_with(",2026-12-31"));
    }

    #[test]
    fn fields_with_commas_and_quotes_are_quoted() {
        assert_eq!(escape("Nair, Priya"), "\"Nair, Priya\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("plain"), "plain");
    }

    #[tokio::test]
    async fn header_written_once_then_rows_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("employees.csv");
        let exporter = SpreadsheetExporter::new(&path, Duration::from_secs(2));

        assert_eq!(exporter.append_employee_row(&record("EMP001")).await, ExportStatus::Ok);
        assert_eq!(exporter.append_employee_row(&record("EMP002")).await, ExportStatus::Ok);

        let lines = lines(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], header_line());
        assert!(lines[1].starts_with("EMP001,"));
        assert!(lines[2].starts_with("EMP002,"));
    }

    #[tokio::test]
    async fn held_lock_fails_closed_after_bounded_wait() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("employees.csv");
        let exporter = SpreadsheetExporter::new(&path, Duration::from_millis(200));

        let holder = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(exporter.lock_path())
            .unwrap();
        holder.lock().unwrap();

        let started = Instant::now();
        let status = exporter.append_employee_row(&record("EMP001")).await;
        assert_eq!(status, ExportStatus::Failed);
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(!path.exists());

        holder.unlock().unwrap();
        assert_eq!(exporter.append_employee_row(&record("EMP001")).await, ExportStatus::Ok);
    }

    #[test]
    fn mismatched_header_restarts_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("employees.csv");
        std::fs::write(&path, "name,code\nold,row\n").unwrap();
        let exporter = SpreadsheetExporter::new(&path, Duration::from_secs(1));

        exporter.append_blocking(&format_row(&record("EMP003"))).unwrap();
        let lines = lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], header_line());
        assert!(lines[1].starts_with("EMP003,"));
    }

    #[test]
    fn lock_file_sits_next_to_sheet() {
        let exporter = SpreadsheetExporter::new("/srv/hr/employees.csv", Duration::from_secs(1));
        assert_eq!(exporter.lock_path(), PathBuf::from("/srv/hr/employees.csv.lock"));
    }
}
