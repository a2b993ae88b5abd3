//! HTTP relay in front of the weather normalizer.
//!
//! The binary in `main.rs` wires configuration and logging; this library
//! exposes the router so it can be driven directly in tests.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod chat;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use state::AppState;

pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(routes::meta::root))
        .route("/api/health", get(routes::meta::health))
        .route("/api/weather", post(routes::weather::weather_by_coordinate))
        .route("/api/weather/city", post(routes::weather::weather_by_city))
        .route("/api/chat", post(routes::chat::send_message))
        .route("/api/webhook/telegram", post(routes::chat::telegram_webhook))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
