//! API and page routes.
//!
//! Organized by functionality:
//! - `pages` - HTML shells served to the browser
//! - `proxy` - Cached pass-through to the upstream QC service
//! - `session` - Login, logout, and current-session endpoints

pub mod pages;
pub mod proxy;
pub mod session;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// Liveness endpoint. Sits under `/api/` so the navigation gate skips it.
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "service": "QC Portal",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}
