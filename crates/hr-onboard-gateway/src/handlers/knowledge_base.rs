//! Helpdesk knowledge base.

use axum::extract::{Path, Query, State};
use axum::Json;
use hr_onboard_core::models::knowledge_base::{
    KnowledgeBaseCreate, KnowledgeBaseDocument, KnowledgeBaseUpdate,
};
use serde_json::{json, Value};

use super::Paging;
use crate::app::AppState;
use crate::error::{ApiJson, ApiResult};

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<KnowledgeBaseCreate>,
) -> ApiResult<Json<Value>> {
    let doc = state.services.knowledge_base.create(input)?;
    Ok(Json(json!({
        "status": "success",
        "message": "Employee KB document created successfully",
        "doc_id": doc.id,
    })))
}

pub async fn list(
    State(state): State<AppState>,
    Query(paging): Query<Paging>,
) -> ApiResult<Json<Vec<KnowledgeBaseDocument>>> {
    Ok(Json(state.services.knowledge_base.list(paging.limit())?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> ApiResult<Json<KnowledgeBaseDocument>> {
    Ok(Json(state.services.knowledge_base.get(&doc_id)?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    ApiJson(patch): ApiJson<KnowledgeBaseUpdate>,
) -> ApiResult<Json<Value>> {
    state.services.knowledge_base.update(&doc_id, patch)?;
    Ok(Json(json!({
        "status": "success",
        "message": "Employee KB document updated successfully",
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.services.knowledge_base.delete(&doc_id)?;
    Ok(Json(json!({
        "status": "success",
        "message": "Employee KB document deleted successfully",
    })))
}

pub async fn stats(State(state): State<AppState>) -> Json<Value> {
    let stats = state.services.knowledge_base.stats();
    Json(json!({ "status": "success", "stats": stats }))
}
