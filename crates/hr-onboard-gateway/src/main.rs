//! HR Onboarding Desk gateway: policy sections, helpdesk knowledge base, new-joiner
//! onboarding, feedback and the AI ask endpoint over one sled store.

mod app;
mod error;
mod handlers;

use hr_onboard_core::{ChatCompletionGateway, DocumentStore, HrConfig, Services, SpreadsheetExporter};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{build_app, AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match HrConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let store = match DocumentStore::connect(&config.storage_path) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Cannot open store at {}: {}", config.storage_path, e);
            std::process::exit(1);
        }
    };

    if config.ai.is_configured() {
        tracing::info!("AI deployment: {}", config.ai.deployment);
    } else {
        tracing::warn!("AI endpoint or key not set; /api/ask will answer with a notice");
    }

    let exporter = SpreadsheetExporter::new(
        &config.spreadsheet_path,
        Duration::from_secs(config.spreadsheet_lock_timeout_secs),
    );
    let engine = Arc::new(ChatCompletionGateway::new(config.ai.clone()));
    let services = match Services::new(&store, exporter, engine, config.ask_max_tokens) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Cannot open collections: {}", e);
            std::process::exit(1);
        }
    };

    let bind_addr = config.bind_addr();
    let app_name = config.app_name.clone();
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };
    let app = build_app(state);

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Cannot bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("{} listening on {}", app_name, bind_addr);

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    if let Err(e) = store.close() {
        tracing::warn!("Store flush on shutdown failed: {}", e);
    }
}
