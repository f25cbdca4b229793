//! User feedback on the onboarding experience.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{check_email, check_len};
use crate::error::{HrError, HrResult};
use crate::store::Document;

pub const CATEGORIES: [&str; 6] = [
    "HR",
    "Onboarding",
    "Technical",
    "Bug Report",
    "Feature Request",
    "Other",
];

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackCreate {
    pub rating: i64,
    pub category: String,
    pub message: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl FeedbackCreate {
    pub fn validate(&self) -> HrResult<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(HrError::OutOfRange {
                field: "rating",
                value: self.rating,
                min: 1,
                max: 5,
            });
        }
        if !CATEGORIES.contains(&self.category.as_str()) {
            return Err(HrError::validation(
                "category",
                format!("must be one of: {}", CATEGORIES.join(", ")),
            ));
        }
        check_len("message", self.message.trim(), 10, 2000)?;
        if let Some(email) = &self.email {
            check_email("email", email)?;
        }
        if let Some(user_id) = &self.user_id {
            check_len("user_id", user_id, 0, 100)?;
        }
        Ok(())
    }

    /// Validate and build the stored record. Anonymous feedback drops contact fields.
    pub fn into_feedback(self, id: String, now: DateTime<Utc>) -> HrResult<Feedback> {
        self.validate()?;
        let (email, user_id) = if self.anonymous {
            (None, None)
        } else {
            (self.email, self.user_id)
        };
        Ok(Feedback {
            id,
            rating: self.rating as u8,
            category: self.category,
            message: self.message.trim().to_string(),
            email,
            anonymous: self.anonymous,
            user_id,
            timestamp: now,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub rating: u8,
    pub category: String,
    pub message: String,
    pub email: Option<String>,
    pub anonymous: bool,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Document for Feedback {
    const COLLECTION: &'static str = "feedback";
    const KEY_FIELD: &'static str = "id";

    fn key(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackStats {
    pub total_feedback: usize,
    pub average_rating: f64,
    pub category_breakdown: BTreeMap<String, usize>,
    pub recent_feedback_count: usize,
    pub anonymous_percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(anonymous: bool) -> FeedbackCreate {
        FeedbackCreate {
            rating: 4,
            category: "Onboarding".to_string(),
            message: "  The step-by-step flow was clear.  ".to_string(),
            email: Some("joiner@example.com".to_string()),
            anonymous,
            user_id: Some("u-17".to_string()),
        }
    }

    #[test]
    fn anonymous_feedback_drops_contact_fields() {
        let fb = create(true).into_feedback("f1".into(), Utc::now()).unwrap();
        assert!(fb.email.is_none());
        assert!(fb.user_id.is_none());
        assert_eq!(fb.message, "The step-by-step flow was clear.");
    }

    #[test]
    fn named_feedback_keeps_contact_fields() {
        let fb = create(false).into_feedback("f1".into(), Utc::now()).unwrap();
        assert_eq!(fb.email.as_deref(), Some("joiner@example.com"));
    }

    #[test]
    fn rejects_unknown_category_and_bad_rating() {
        let mut c = create(false);
        c.category = "Gossip".to_string();
        assert!(matches!(c.validate(), Err(HrError::Validation { field: "category", .. })));

        let mut c = create(false);
        c.rating = 6;
        assert!(matches!(c.validate(), Err(HrError::OutOfRange { field: "rating", .. })));
    }

    #[test]
    fn short_message_rejected_after_trim() {
        let mut c = create(false);
        c.message = "   short    ".to_string();
        assert!(c.validate().is_err());
    }
}
