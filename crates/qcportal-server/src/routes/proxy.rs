//! Cached pass-through to the upstream QC service.
//!
//! `GET /api/data/{path}` answers from the response cache when it can and
//! loads from upstream otherwise. Failed loads are never cached. Mutating
//! verbs go straight upstream and invalidate the affected cache keys.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use qcportal_client::{ApiResponse, ClientError, RequestSpec};
use serde_json::{Value, json};

use crate::state::AppState;

/// GET proxy with caching.
pub async fn fetch(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    let key = cache_key(&path, query.as_deref());
    let target = upstream_path(&path, query.as_deref());
    let upstream = Arc::clone(&state.upstream);

    let result = state
        .cache
        .get(&key, || async move { upstream.get(target).await })
        .await;

    match result {
        Ok(response) => {
            let stats = state.cache.stats().await;
            tracing::debug!(
                hits = stats.hits,
                misses = stats.misses,
                entries = stats.entries,
                "Proxy cache served"
            );
            success_response(&response)
        }
        Err(error) => error_response(&path, error),
    }
}

/// POST/PUT/DELETE proxy. Bypasses the cache and invalidates what the
/// mutation may have changed: the exact path and its collection.
pub async fn mutate(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    body: Option<Json<Value>>,
) -> Response {
    let target = upstream_path(&path, query.as_deref());

    let mut spec = RequestSpec::new(method, target);
    if let Some(Json(body)) = body {
        spec = spec.json(body);
    }

    match state.upstream.execute(spec).await {
        Ok(response) => {
            invalidate(&state, &path).await;
            success_response(&response)
        }
        Err(error) => error_response(&path, error),
    }
}

async fn invalidate(state: &AppState, path: &str) {
    state.cache.delete(path).await;
    if let Some((collection, _)) = path.rsplit_once('/') {
        state.cache.delete(collection).await;
    }
    tracing::debug!(path = %path, "Cache invalidated after mutation");
}

fn cache_key(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{path}?{q}"),
        _ => path.to_string(),
    }
}

fn upstream_path(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("/{path}?{q}"),
        _ => format!("/{path}"),
    }
}

fn success_response(response: &ApiResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    (status, Json(response.body.clone())).into_response()
}

fn error_response(path: &str, error: ClientError) -> Response {
    match error {
        ClientError::Status { status, message } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(json!({"message": message}))).into_response()
        }
        ClientError::InvalidRequest { message } => {
            (StatusCode::BAD_REQUEST, Json(json!({"message": message}))).into_response()
        }
        other => {
            tracing::warn!(path = %path, error = %other, "Upstream request failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"message": "upstream unavailable"})),
            )
                .into_response()
        }
    }
}
