//! Session endpoints: login, logout, and current-session lookup.

use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use qcportal_auth::{AuthError, CurrentSession, SessionClaims, gate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// What the login form needs back: the role and where to send the browser.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub role: String,
    pub redirect: String,
}

/// Verifies credentials, issues a session cookie, and names the landing page.
///
/// The redirect target mirrors what the navigation gate would pick for the
/// role, so the form and the gate always agree.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError> {
    let user = state
        .directory
        .authenticate(&body.username, &body.password)
        .await?;

    let ttl_secs = state.config.auth.token_ttl.as_secs() as i64;
    let mut builder = SessionClaims::builder(&user.username, &user.role);
    if let (Some(id), Some(name)) = (&user.area_id, &user.area_name) {
        builder = builder.area(id, name);
    }
    let claims = builder.expires_in_seconds(ttl_secs).build();

    let token = state
        .gate
        .tokens
        .encode(&claims)
        .map_err(|e| AuthError::configuration(format!("token encoding failed: {e}")))?;
    let cookie = state
        .gate
        .cookie
        .build(&token, time::Duration::seconds(ttl_secs));

    tracing::info!(username = %user.username, role = %user.role, "Login succeeded");

    let redirect = gate::role_home(&user.role).to_string();
    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            role: user.role,
            redirect,
        }),
    ))
}

/// Drops the session cookie and flushes the response cache.
///
/// The cache may hold data the next user of this browser must not inherit,
/// so logout always clears it.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    state.cache.clear().await;
    tracing::info!("Session ended; response cache cleared");

    (
        jar.add(state.gate.cookie.build_clear()),
        Json(json!({"status": "logged_out"})),
    )
}

/// Returns the decoded claims of the calling session.
pub async fn session(CurrentSession(session): CurrentSession) -> Json<SessionClaims> {
    Json(session.claims().clone())
}
