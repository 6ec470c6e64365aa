use std::net::SocketAddr;

use axum::{
    Router,
    middleware,
    routing::{get, post},
};
use qcportal_auth::session_gate;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, middleware as app_middleware, routes, state::AppState};

pub struct PortalServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    Router::new()
        // Page shells
        .route("/", get(routes::pages::app_shell))
        .route("/login", get(routes::pages::login))
        .route("/403", get(routes::pages::forbidden))
        // Browser favicon shortcut
        .route("/favicon.ico", get(routes::pages::favicon))
        // Health endpoint
        .route("/api/health", get(routes::health))
        // Session lifecycle
        .route("/api/auth/login", post(routes::session::login))
        .route("/api/auth/logout", post(routes::session::logout))
        .route("/api/auth/session", get(routes::session::session))
        // Cached upstream proxy
        .route(
            "/api/data/{*path}",
            get(routes::proxy::fetch)
                .post(routes::proxy::mutate)
                .put(routes::proxy::mutate)
                .delete(routes::proxy::mutate),
        )
        // Every other path is an application route handled client-side
        .route("/{*path}", get(routes::pages::app_shell))
        // Middleware stack (request flow: body limit -> request id -> cors ->
        // compression -> trace -> session gate -> handler). The request id
        // layer sits outside the trace layer so the span sees the id.
        .layer(middleware::from_fn_with_state(
            state.gate.clone(),
            session_gate,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    // Skip creating a span for browser favicon requests to avoid noisy logs
                    if req.uri().path() == "/favicon.ico" {
                        return tracing::span!(tracing::Level::TRACE, "noop");
                    }
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %method,
                        http.target = %uri,
                        http.route = Empty,
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(|res: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                    span.record("http.status_code", &tracing::field::display(res.status().as_u16()));
                    // The noop favicon span carries no request fields; skip its access log
                    if let Some(meta) = span.metadata() {
                        if meta.name() != "noop" {
                            tracing::info!(
                                http.status = %res.status().as_u16(),
                                elapsed_ms = %latency.as_millis(),
                                "request handled"
                            );
                        }
                    }
                })
        )
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> anyhow::Result<PortalServer> {
        let state = AppState::from_config(self.config)?;
        let app = build_app(state);

        Ok(PortalServer {
            addr: self.addr,
            app,
        })
    }
}

impl PortalServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
