//! Policy sections: one query endpoint for every read, CRUD, and the step/id
//! availability lists the admin form validates against.

use axum::extract::{Path, Query, State};
use axum::Json;
use hr_onboard_core::models::policy::{PolicySection, PolicySectionCreate, PolicySectionUpdate};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::{ApiJson, ApiResult};
use hr_onboard_core::services::DEFAULT_PAGE_LIMIT;

#[derive(Debug, Default, Deserialize)]
pub struct PolicyQuery {
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub step: Option<i64>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

/// GET /api/policies. Precedence: `section_id`, then `step`, then `search`, else all.
/// Single lookups still answer with a one-element list.
pub async fn query(
    State(state): State<AppState>,
    Query(q): Query<PolicyQuery>,
) -> ApiResult<Json<Vec<PolicySection>>> {
    let policies = &state.services.policies;
    let offset = q.offset.unwrap_or(0);
    let limit = q.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

    let sections = if let Some(id) = q.section_id.as_deref().filter(|s| !s.trim().is_empty()) {
        vec![policies.get(id.trim())?]
    } else if let Some(step) = q.step {
        vec![policies.get_by_step(step)?]
    } else if let Some(search) = q.search.as_deref().filter(|s| !s.trim().is_empty()) {
        policies.search(search, offset, limit)?
    } else {
        policies.list(offset, limit)?
    };
    Ok(Json(sections))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<PolicySectionCreate>,
) -> ApiResult<Json<Value>> {
    let section = state.services.policies.create(input)?;
    Ok(Json(json!({
        "status": "success",
        "message": "Policy section created successfully",
        "section_id": section.section_id,
    })))
}

pub async fn update(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
    ApiJson(patch): ApiJson<PolicySectionUpdate>,
) -> ApiResult<Json<Value>> {
    let section = state.services.policies.update(&section_id, patch)?;
    Ok(Json(json!({
        "status": "success",
        "message": "Policy section updated successfully",
        "section": section,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.services.policies.delete(&section_id)?;
    Ok(Json(json!({
        "status": "success",
        "message": "Policy section deleted successfully",
    })))
}

pub async fn used_orders(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let used = state.services.policies.used_orders()?;
    Ok(Json(json!({ "status": "success", "used_orders": used })))
}

pub async fn used_section_ids(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let used = state.services.policies.used_section_ids()?;
    Ok(Json(json!({ "status": "success", "used_section_ids": used })))
}
