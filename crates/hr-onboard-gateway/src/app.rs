//! Router assembly: routes, CORS, request logging.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use hr_onboard_core::{HrConfig, Services};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::handlers::{ask, employees, feedback, knowledge_base, policies};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<HrConfig>,
    pub services: Arc<Services>,
}

fn cors(config: &HrConfig) -> CorsLayer {
    let origin = match config.cors_origin_list() {
        None => AllowOrigin::any(),
        Some(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

pub fn build_app(state: AppState) -> Router {
    let cors = cors(&state.config);
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/onboard", post(employees::onboard))
        .route("/api/employees", get(employees::list))
        .route("/api/employees/:id", get(employees::get).delete(employees::delete))
        .route("/api/policies", get(policies::query).post(policies::create))
        .route(
            "/api/policies/validation/used-orders",
            get(policies::used_orders),
        )
        .route(
            "/api/policies/validation/used-section-ids",
            get(policies::used_section_ids),
        )
        .route(
            "/api/policies/:section_id",
            axum::routing::put(policies::update).delete(policies::delete),
        )
        .route(
            "/api/employee-kb",
            get(knowledge_base::list).post(knowledge_base::create),
        )
        .route("/api/employee-kb/stats", get(knowledge_base::stats))
        .route(
            "/api/employee-kb/:doc_id",
            get(knowledge_base::get)
                .put(knowledge_base::update)
                .delete(knowledge_base::delete),
        )
        .route("/api/feedback", get(feedback::list).post(feedback::create))
        .route("/api/feedback/stats", get(feedback::stats))
        .route("/api/feedback/:id", get(feedback::get).delete(feedback::delete))
        .route("/api/ask", post(ask::ask))
        .with_state(state)
        .layer(cors)
        .layer(axum::middleware::from_fn(log_requests))
}

/// One line per request: peer, method, path, status, latency.
async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        "{} {} {} -> {} ({} ms)",
        peer,
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "message": format!("{} API", state.config.app_name),
        "version": hr_onboard_core::version(),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
