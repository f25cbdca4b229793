//! Policy sections: the ordered onboarding steps.
//!
//! `section_id` is the primary key and `order` carries a unique index, so the store
//! rejects a second section claiming either value.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::check_len;
use crate::error::{HrError, HrResult};
use crate::store::Document;

/// First onboarding step.
pub const ORDER_MIN: i64 = 1;
/// The onboarding flow has exactly this many steps.
pub const ORDER_MAX: i64 = 17;

pub const SECTION_ID_MAX: usize = 100;
pub const TITLE_MAX: usize = 150;
pub const CONTENT_MAX: usize = 20_000;

static SECTION_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("section id pattern is valid"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySection {
    pub section_id: String,
    pub title: String,
    pub content: String,
    pub order: u32,
    pub updated_at: DateTime<Utc>,
}

impl Document for PolicySection {
    const COLLECTION: &'static str = "policy_sections";
    const KEY_FIELD: &'static str = "section_id";
    const UNIQUE_FIELDS: &'static [&'static str] = &["order"];

    fn key(&self) -> String {
        self.section_id.clone()
    }

    fn unique_value(&self, field: &str) -> Option<String> {
        match field {
            "order" => Some(self.order.to_string()),
            _ => None,
        }
    }
}

/// Range check for a step number; runs before any storage access.
pub fn check_order(value: i64) -> HrResult<u32> {
    if !(ORDER_MIN..=ORDER_MAX).contains(&value) {
        return Err(HrError::OutOfRange {
            field: "order",
            value,
            min: ORDER_MIN,
            max: ORDER_MAX,
        });
    }
    // In range, so it fits.
    Ok(value as u32)
}

pub fn check_section_id(section_id: &str) -> HrResult<()> {
    if section_id.chars().count() > SECTION_ID_MAX {
        return Err(HrError::validation(
            "section_id",
            format!("must be {} characters or less", SECTION_ID_MAX),
        ));
    }
    if !SECTION_ID_RE.is_match(section_id) {
        return Err(HrError::validation(
            "section_id",
            "must contain only alphanumeric characters and underscores",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicySectionCreate {
    pub section_id: String,
    pub title: String,
    pub content: String,
    pub order: i64,
}

impl PolicySectionCreate {
    pub fn validate(&self) -> HrResult<u32> {
        check_section_id(&self.section_id)?;
        check_len("title", &self.title, 1, TITLE_MAX)?;
        check_len("content", &self.content, 1, CONTENT_MAX)?;
        check_order(self.order)
    }

    /// Validate and build the stored record.
    pub fn into_section(self, now: DateTime<Utc>) -> HrResult<PolicySection> {
        let order = self.validate()?;
        Ok(PolicySection {
            section_id: self.section_id,
            title: self.title,
            content: self.content,
            order,
            updated_at: now,
        })
    }
}

/// Partial update: `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicySectionUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
}

impl PolicySectionUpdate {
    /// Returns the checked order when the patch carries one.
    pub fn validate(&self) -> HrResult<Option<u32>> {
        if let Some(title) = &self.title {
            check_len("title", title, 1, TITLE_MAX)?;
        }
        if let Some(content) = &self.content {
            check_len("content", content, 1, CONTENT_MAX)?;
        }
        self.order.map(check_order).transpose()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.order.is_none()
    }

    /// Apply a validated patch. `order` is the value returned by [`Self::validate`].
    pub fn apply(&self, section: &mut PolicySection, order: Option<u32>, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            section.title = title.clone();
        }
        if let Some(content) = &self.content {
            section.content = content.clone();
        }
        if let Some(order) = order {
            section.order = order;
        }
        section.updated_at = now;
    }
}
