//! HTTP API for the ProPass activation service.
//!
//! Thin shell around [`propass_engine::EntitlementEngine`]: route
//! wiring, request/response shaping, CORS, and webhook signature
//! verification. All lifecycle semantics live in the engine.

mod config;
mod handlers;
mod response;

pub use config::{Config, ConfigError};

use axum::routing::{get, post};
use axum::Router;
use propass_engine::EntitlementEngine;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared per-process state, constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    /// The token lifecycle engine.
    pub engine: Arc<EntitlementEngine>,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: String,
}

/// Builds the API router. Every route carries permissive CORS and the
/// layer answers pre-flight OPTIONS requests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/webhook", post(handlers::webhook))
        .route("/api/v1/resend", post(handlers::resend))
        .route("/api/v1/verify-email", post(handlers::verify_email))
        .route("/api/v1/verify-token", post(handlers::verify_token))
        .route(
            "/api/v1/validate-subscription",
            get(handlers::validate_subscription_get).post(handlers::validate_subscription_post),
        )
        .route("/api/v1/check-subscription", get(handlers::check_subscription))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
