//! Feedback on the onboarding experience, with aggregate stats for HR.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{duplicate_or_store, page};
use crate::error::{HrError, HrResult};
use crate::models::feedback::{Feedback, FeedbackCreate, FeedbackStats};
use crate::store::{Collection, DocumentStore};

/// Window for `recent_feedback_count`.
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Clone)]
pub struct FeedbackService {
    feedback: Collection<Feedback>,
}

fn not_found() -> HrError {
    HrError::NotFound("Feedback not found".to_string())
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn newest_first(items: &mut [Feedback]) {
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
}

impl FeedbackService {
    pub fn new(store: &DocumentStore) -> HrResult<Self> {
        Ok(Self {
            feedback: store.collection()?,
        })
    }

    pub fn create(&self, input: FeedbackCreate) -> HrResult<Feedback> {
        let feedback = input.into_feedback(Uuid::new_v4().to_string(), Utc::now())?;
        self.feedback.insert_one(&feedback).map_err(duplicate_or_store)?;
        tracing::info!(
            "Feedback {} recorded ({}, rating {})",
            feedback.id,
            feedback.category,
            feedback.rating
        );
        Ok(feedback)
    }

    /// Newest first.
    pub fn list(&self, offset: usize, limit: usize) -> HrResult<Vec<Feedback>> {
        let mut all = self.feedback.find(|_| true)?;
        newest_first(&mut all);
        Ok(page(all, offset, limit))
    }

    pub fn list_by_category(&self, category: &str, limit: usize) -> HrResult<Vec<Feedback>> {
        let mut hits = self.feedback.find(|f| f.category == category)?;
        newest_first(&mut hits);
        hits.truncate(limit);
        Ok(hits)
    }

    pub fn get(&self, id: &str) -> HrResult<Feedback> {
        self.feedback.find_one(id)?.ok_or_else(not_found)
    }

    pub fn delete(&self, id: &str) -> HrResult<()> {
        self.feedback.delete_one(id)?.ok_or_else(not_found)?;
        tracing::info!("Deleted feedback {}", id);
        Ok(())
    }

    pub fn stats(&self) -> HrResult<FeedbackStats> {
        self.stats_at(Utc::now())
    }

    /// Stats as of `now`: average rounded to 2 places, anonymous share to 1.
    pub fn stats_at(&self, now: DateTime<Utc>) -> HrResult<FeedbackStats> {
        let all = self.feedback.find(|_| true)?;
        let total = all.len();
        if total == 0 {
            return Ok(FeedbackStats {
                total_feedback: 0,
                average_rating: 0.0,
                category_breakdown: BTreeMap::new(),
                recent_feedback_count: 0,
                anonymous_percentage: 0.0,
            });
        }

        let rating_sum: u64 = all.iter().map(|f| u64::from(f.rating)).sum();
        let mut category_breakdown = BTreeMap::new();
        for f in &all {
            *category_breakdown.entry(f.category.clone()).or_insert(0) += 1;
        }
        let since = now - Duration::days(RECENT_WINDOW_DAYS);
        let recent = all.iter().filter(|f| f.timestamp >= since).count();
        let anonymous = all.iter().filter(|f| f.anonymous).count();

        Ok(FeedbackStats {
            total_feedback: total,
            average_rating: round_to(rating_sum as f64 / total as f64, 2),
            category_breakdown,
            recent_feedback_count: recent,
            anonymous_percentage: round_to(anonymous as f64 * 100.0 / total as f64, 1),
        })
    }
}
