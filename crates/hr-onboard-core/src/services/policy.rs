//! Policy sections: ordered onboarding steps with unique ids and step numbers.

use chrono::Utc;

use super::{duplicate_or_store, page};
use crate::error::{HrError, HrResult};
use crate::models::policy::{
    check_order, PolicySection, PolicySectionCreate, PolicySectionUpdate,
};
use crate::store::{Collection, DocumentStore, StoreError};

/// `order` violations carry the step number; the rest go through the generic mapping.
fn translate(err: StoreError) -> HrError {
    match err {
        StoreError::ConstraintViolation {
            field: "order",
            value,
        } => match value.parse::<u32>() {
            Ok(order) => HrError::DuplicateOrder {
                field: "order",
                value: order,
            },
            Err(_) => HrError::DuplicateIdentifier {
                field: "order",
                value,
            },
        },
        other => duplicate_or_store(other),
    }
}

#[derive(Clone)]
pub struct PolicyService {
    sections: Collection<PolicySection>,
}

impl PolicyService {
    pub fn new(store: &DocumentStore) -> HrResult<Self> {
        Ok(Self {
            sections: store.collection()?,
        })
    }

    /// The section collection, for context assembly.
    pub fn corpus(&self) -> &Collection<PolicySection> {
        &self.sections
    }

    pub fn create(&self, input: PolicySectionCreate) -> HrResult<PolicySection> {
        let section = input.into_section(Utc::now())?;
        self.sections.insert_one(&section).map_err(translate)?;
        tracing::info!(
            "Created policy section {} (step {})",
            section.section_id,
            section.order
        );
        Ok(section)
    }

    pub fn get(&self, section_id: &str) -> HrResult<PolicySection> {
        self.sections
            .find_one(section_id)?
            .ok_or_else(|| HrError::NotFound("Policy section not found".to_string()))
    }

    /// Lookup by step number; the range check runs before the store is touched.
    pub fn get_by_step(&self, step: i64) -> HrResult<PolicySection> {
        let order = check_order(step)?;
        self.sections
            .find_one_by("order", &order.to_string())?
            .ok_or_else(|| {
                HrError::NotFound(format!("Policy section for step {} not found", order))
            })
    }

    /// Ascending by step.
    pub fn list(&self, offset: usize, limit: usize) -> HrResult<Vec<PolicySection>> {
        let all = self.sections.find_sorted(|_| true, |s| s.order)?;
        Ok(page(all, offset, limit))
    }

    /// Case-insensitive substring match on title or content, ascending by step.
    pub fn search(&self, query: &str, offset: usize, limit: usize) -> HrResult<Vec<PolicySection>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.list(offset, limit);
        }
        let hits = self.sections.find_sorted(
            |s| {
                s.title.to_lowercase().contains(&needle)
                    || s.content.to_lowercase().contains(&needle)
            },
            |s| s.order,
        )?;
        Ok(page(hits, offset, limit))
    }

    /// Partial update. `order` uniqueness is only re-checked when the patch changes it.
    pub fn update(&self, section_id: &str, patch: PolicySectionUpdate) -> HrResult<PolicySection> {
        let order = patch.validate()?;
        let now = Utc::now();
        let updated = self
            .sections
            .update_one(section_id, |s| patch.apply(s, order, now))
            .map_err(translate)?
            .ok_or_else(|| HrError::NotFound("Policy section not found".to_string()))?;
        tracing::info!("Updated policy section {}", section_id);
        Ok(updated)
    }

    pub fn delete(&self, section_id: &str) -> HrResult<PolicySection> {
        let removed = self
            .sections
            .delete_one(section_id)?
            .ok_or_else(|| HrError::NotFound("Policy section not found".to_string()))?;
        tracing::info!("Deleted policy section {} (step {} released)", section_id, removed.order);
        Ok(removed)
    }

    pub fn used_orders(&self) -> HrResult<Vec<u32>> {
        let mut orders: Vec<u32> = self.sections.find(|_| true)?.into_iter().map(|s| s.order).collect();
        orders.sort_unstable();
        Ok(orders)
    }

    pub fn used_section_ids(&self) -> HrResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .sections
            .find(|_| true)?
            .into_iter()
            .map(|s| s.section_id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
