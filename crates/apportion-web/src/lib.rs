//! Apportion web surface
//!
//! Serves the interactive weighted-division calculator: upload a contract
//! spreadsheet, enter each salesperson's fixed income, inspect the allocation
//! and download it as CSV. Every visitor gets an isolated session keyed by a
//! cookie.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use chrono::{DateTime, Utc};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod session_store;
pub mod tracing_setup;
pub mod views;

use config::ApportionConfig;
use session_store::SessionStore;

/// Shared state behind every request.
#[derive(Debug)]
pub struct AppState {
    pub start_time: DateTime<Utc>,
    pub config: ApportionConfig,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: ApportionConfig) -> Self {
        let sessions = SessionStore::new(&config.session);
        Self { start_time: Utc::now(), config, sessions }
    }
}

/// Builds the router with all pages, API endpoints and middleware.
pub fn create_app(config: ApportionConfig) -> Router {
    router(Arc::new(AppState::new(config)))
}

/// Router over an existing state, for callers that keep a handle on it.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.limits.max_upload_bytes();
    info!(body_limit, "building router");

    Router::new()
        .route("/", get(handlers::index))
        .route("/upload", post(handlers::upload))
        .route("/fixed-income", post(handlers::fixed_income))
        .route("/results", get(handlers::results))
        .route("/results/export", get(handlers::export))
        .route("/api/session", get(handlers::api_session))
        .route("/api/report", get(handlers::api_report))
        .route("/reset", post(handlers::reset))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
