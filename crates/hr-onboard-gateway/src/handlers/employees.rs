//! New-joiner onboarding form and employee records.

use axum::extract::{Path, Query, State};
use axum::Json;
use hr_onboard_core::models::employee::{Employee, EmployeeRecord, EmployeeResponse};
use serde_json::{json, Value};

use super::Paging;
use crate::app::AppState;
use crate::error::{ApiJson, ApiResult};

/// POST /api/onboard
pub async fn onboard(
    State(state): State<AppState>,
    ApiJson(employee): ApiJson<Employee>,
) -> ApiResult<Json<EmployeeResponse>> {
    Ok(Json(state.services.employees.onboard(employee).await?))
}

pub async fn list(
    State(state): State<AppState>,
    Query(paging): Query<Paging>,
) -> ApiResult<Json<Vec<EmployeeRecord>>> {
    Ok(Json(
        state
            .services
            .employees
            .list(paging.offset(), paging.limit())?,
    ))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EmployeeRecord>> {
    Ok(Json(state.services.employees.get(&id)?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state.services.employees.delete(&id)?;
    Ok(Json(json!({ "status": "success", "message": "Employee deleted successfully" })))
}
