use axum::extract::State;
use axum::Json;
use hr_onboard_core::{AskRequest, AskResponse};

use crate::app::AppState;
use crate::error::{ApiJson, ApiResult};

/// POST /api/ask
pub async fn ask(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AskRequest>,
) -> ApiResult<Json<AskResponse>> {
    Ok(Json(state.services.ask.ask(request).await?))
}
