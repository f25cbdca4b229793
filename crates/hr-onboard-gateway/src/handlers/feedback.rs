//! Onboarding feedback.

use axum::extract::{Path, Query, State};
use axum::Json;
use hr_onboard_core::models::feedback::{Feedback, FeedbackCreate, FeedbackStats};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::{ApiJson, ApiResult};
use hr_onboard_core::services::DEFAULT_PAGE_LIMIT;

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<FeedbackCreate>,
) -> ApiResult<Json<Value>> {
    let feedback = state.services.feedback.create(input)?;
    Ok(Json(json!({
        "status": "success",
        "message": "Thank you for your feedback!",
        "feedback_id": feedback.id,
    })))
}

/// Newest first; `category` narrows the list (offset is ignored then).
pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<FeedbackQuery>,
) -> ApiResult<Json<Vec<Feedback>>> {
    let limit = q.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let items = match q.category.as_deref().filter(|c| !c.is_empty()) {
        Some(category) => state.services.feedback.list_by_category(category, limit)?,
        None => state
            .services
            .feedback
            .list(q.offset.unwrap_or(0), limit)?,
    };
    Ok(Json(items))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Feedback>> {
    Ok(Json(state.services.feedback.get(&id)?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state.services.feedback.delete(&id)?;
    Ok(Json(json!({ "status": "success", "message": "Feedback deleted successfully" })))
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<FeedbackStats>> {
    Ok(Json(state.services.feedback.stats()?))
}
