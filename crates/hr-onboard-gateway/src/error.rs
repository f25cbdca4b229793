//! HTTP mapping for core errors: one `IntoResponse`, JSON bodies throughout.

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hr_onboard_core::ai_gateway::user_message;
use hr_onboard_core::HrError;
use serde_json::json;

pub enum ApiError {
    Core(HrError),
    /// Request body missing, unparsable or of the wrong shape.
    Body(JsonRejection),
}

impl From<HrError> for ApiError {
    fn from(err: HrError) -> Self {
        ApiError::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

/// `axum::Json` for request bodies, with rejections reported through [`ApiError`].
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

fn body_rejection(rejection: &JsonRejection) -> (StatusCode, serde_json::Value) {
    let message = rejection.body_text();
    match rejection {
        JsonRejection::JsonSyntaxError(_) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": "invalid_json", "message": message }),
        ),
        JsonRejection::MissingJsonContentType(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            json!({ "error": "validation", "message": message }),
        ),
        _ => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": "validation", "message": message }),
        ),
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::Core(err) => err,
            ApiError::Body(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                let (status, body) = body_rejection(&rejection);
                return (status, Json(body)).into_response();
            }
        };
        let message = err.to_string();
        let (status, body) = match &err {
            HrError::DuplicateIdentifier { field, .. } | HrError::DuplicateOrder { field, .. } => (
                StatusCode::CONFLICT,
                json!({ "error": "duplicate", "field": field, "message": message }),
            ),
            HrError::NotFound(_) | HrError::EmptyCorpus(_) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "not_found", "message": message }),
            ),
            HrError::OutOfRange { field, .. } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "out_of_range", "field": field, "message": message }),
            ),
            HrError::InvalidScope(_)
            | HrError::InvalidMode(_)
            | HrError::InapplicableField { .. }
            | HrError::Validation { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "validation", "message": message }),
            ),
            HrError::UpstreamUnavailable(failure) => {
                tracing::error!("Upstream failure reached the HTTP layer: {}", failure);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "upstream_unavailable", "message": user_message(failure) }),
                )
            }
            HrError::Store(e) => {
                tracing::error!("Store failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal", "message": "Storage error. Please try again." }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
