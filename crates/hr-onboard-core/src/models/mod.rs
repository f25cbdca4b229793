//! Records stored by the onboarding desk and the payloads that create or patch them.

pub mod employee;
pub mod feedback;
pub mod knowledge_base;
pub mod policy;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{HrError, HrResult};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Character-length bound check (inclusive), counted in Unicode scalar values.
pub(crate) fn check_len(field: &'static str, value: &str, min: usize, max: usize) -> HrResult<()> {
    let len = value.chars().count();
    if len < min {
        return Err(HrError::validation(
            field,
            format!("must be at least {} characters", min),
        ));
    }
    if len > max {
        return Err(HrError::validation(
            field,
            format!("must be {} characters or less", max),
        ));
    }
    Ok(())
}

pub(crate) fn check_email(field: &'static str, value: &str) -> HrResult<()> {
    if EMAIL_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(HrError::validation(field, "must be a valid email address"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_counts_chars_not_bytes() {
        assert!(check_len("title", "ééé", 1, 3).is_ok());
        assert!(check_len("title", "éééé", 1, 3).is_err());
        assert!(check_len("title", "", 1, 3).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(check_email("email", "priya.n@acme.co.in").is_ok());
        assert!(check_email("email", "not-an-email").is_err());
        assert!(check_email("email", "a@b").is_err());
    }
}
