//! Shared application state.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use qcportal_auth::{GateState, TokenService};
use qcportal_cache::ResponseCache;
use qcportal_client::{ApiClient, ApiResponse, RequestDefaults};
use url::Url;

use crate::config::AppConfig;
use crate::directory::{Directory, UpstreamDirectory};

/// Everything the handlers need, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Token service and cookie settings used by the navigation gate.
    pub gate: GateState,
    /// Cache for proxied GET responses.
    pub cache: Arc<ResponseCache<ApiResponse>>,
    /// Client for the upstream QC service.
    pub upstream: Arc<ApiClient>,
    /// Credential verifier.
    pub directory: Arc<dyn Directory>,
}

impl AppState {
    /// Builds state from configuration, wiring the upstream-backed directory
    /// and a cache with the configured TTL.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.upstream.base_url)
            .with_context(|| format!("invalid upstream.base_url {:?}", config.upstream.base_url))?;

        let defaults = RequestDefaults::new()
            .with_base_url(base_url)
            .with_timeout(config.upstream.timeout);
        let upstream = Arc::new(ApiClient::new(defaults));
        let directory = Arc::new(UpstreamDirectory::new(Arc::clone(&upstream)));
        let cache = Arc::new(ResponseCache::with_default_ttl(config.upstream.cache_ttl));

        Ok(Self::assemble(config, upstream, directory, cache))
    }

    /// Assembles state from parts. Tests inject their own directory or cache
    /// through this.
    #[must_use]
    pub fn assemble(
        config: AppConfig,
        upstream: Arc<ApiClient>,
        directory: Arc<dyn Directory>,
        cache: Arc<ResponseCache<ApiResponse>>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(config.auth.secret.as_bytes()));
        let gate = GateState::new(tokens, config.auth.cookie.clone());

        Self {
            config: Arc::new(config),
            gate,
            cache,
            upstream,
            directory,
        }
    }
}

impl FromRef<AppState> for GateState {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}
