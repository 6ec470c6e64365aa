//! Server-rendered page shells.
//!
//! The portal UI is a single-page application. The server only hands out a
//! shell document per route class; the session gate decides beforehand
//! whether the caller may see it.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};

const APP_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>QC Portal</title>
</head>
<body>
  <div id="app" data-portal="qc"></div>
  <noscript>QC Portal requires JavaScript.</noscript>
</body>
</html>
"#;

const LOGIN_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Sign in - QC Portal</title>
</head>
<body>
  <div id="app" data-portal="qc" data-page="login"></div>
  <noscript>QC Portal requires JavaScript.</noscript>
</body>
</html>
"#;

const FORBIDDEN_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>403 - QC Portal</title>
</head>
<body>
  <main>
    <h1>403</h1>
    <p>Your account does not have access to this area.</p>
    <p><a href="/">Back to the dashboard</a></p>
  </main>
</body>
</html>
"#;

/// Shell for every application route. Client-side routing takes over.
pub async fn app_shell() -> Html<&'static str> {
    Html(APP_SHELL)
}

/// Sign-in page. Reachable without a session.
pub async fn login() -> Html<&'static str> {
    Html(LOGIN_SHELL)
}

/// Shown when the gate sends a signed-in user away from a managed area.
pub async fn forbidden() -> Html<&'static str> {
    Html(FORBIDDEN_SHELL)
}

/// No bundled icon. Answering 204 keeps browser probes out of the error log.
pub async fn favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
