//! Request execution with observable lifecycle state.

use std::sync::Arc;

use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::{ClientError, ClientResult};
use crate::request::{RequestDefaults, RequestSpec, ResolvedRequest};
use crate::state::RequestState;

/// Callback invoked with the download percentage as it advances.
pub type ProgressHandler = Arc<dyn Fn(u8) + Send + Sync>;

/// Executes requests and publishes their lifecycle through a watch channel.
///
/// Every [`send`](Self::send) merges its spec over the executor's defaults,
/// dispatches it, and drives the shared [`RequestState`]:
///
/// 1. On dispatch: `loading` becomes `true`, `progress` resets, `error`
///    clears. The previous `data` stays visible.
/// 2. While the body downloads: `progress` advances, but only when the
///    response announced its total size, and never backwards.
/// 3. On settlement: `loading` flips to `false` in the same update that
///    records the outcome. Success stores the payload and clears `error`;
///    failure records the message and keeps the previous payload.
///
/// Failures are recorded in the state *and* returned to the caller.
/// Concurrent sends are not deduplicated; whichever settles last determines
/// the final state.
///
/// # Example
///
/// ```ignore
/// use qcportal_client::{RequestDefaults, RequestExecutor, RequestSpec};
/// use url::Url;
///
/// let defaults = RequestDefaults::new()
///     .with_base_url(Url::parse("https://qc.example.com/api/")?);
/// let executor = RequestExecutor::new(defaults);
///
/// let widgets = executor.send(RequestSpec::get("/widgets")).await?;
/// assert!(executor.state().is_ready());
/// ```
pub struct RequestExecutor {
    http: reqwest::Client,
    defaults: RequestDefaults,
    state: watch::Sender<RequestState>,
    on_progress: Option<ProgressHandler>,
}

impl RequestExecutor {
    /// Creates an executor with the given defaults and a fresh HTTP client.
    #[must_use]
    pub fn new(defaults: RequestDefaults) -> Self {
        Self::with_client(reqwest::Client::new(), defaults)
    }

    /// Creates an executor that reuses an existing HTTP client.
    #[must_use]
    pub fn with_client(http: reqwest::Client, defaults: RequestDefaults) -> Self {
        let (state, _) = watch::channel(RequestState::default());
        Self {
            http,
            defaults,
            state,
            on_progress: None,
        }
    }

    /// Installs a callback that observes download progress.
    #[must_use]
    pub fn with_progress_handler(mut self, handler: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(handler));
        self
    }

    /// The defaults merged under every request.
    #[must_use]
    pub fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }

    /// Subscribes to lifecycle updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    /// Snapshot of the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    /// Sends a request and returns its decoded JSON payload.
    ///
    /// The outcome is also recorded in the shared state: see the type-level
    /// documentation for the exact transitions. `loading` is guaranteed to
    /// return to `false` even if the returned future is dropped mid-flight.
    ///
    /// # Errors
    ///
    /// Returns the same error that is recorded in the state: invalid request,
    /// transport failure, non-success status, or undecodable body.
    pub async fn send(&self, spec: RequestSpec) -> ClientResult<Value> {
        let request = spec.merge_over(&self.defaults)?;
        tracing::debug!(method = %request.method, url = %request.url, "Dispatching request");

        self.state.send_modify(|state| {
            state.loading = true;
            state.progress = 0;
            state.error = None;
        });

        let mut guard = SettleGuard::new(&self.state);
        let outcome = self.dispatch(request).await;
        guard.disarm();

        match outcome {
            Ok(data) => {
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = None;
                    state.data = Some(data.clone());
                });
                Ok(data)
            }
            Err(error) => {
                let message = error.to_string();
                tracing::warn!(error = %message, "Request failed");
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(message);
                });
                Err(error)
            }
        }
    }

    /// Performs the HTTP exchange and decodes the body, reporting progress
    /// as chunks arrive.
    async fn dispatch(&self, request: ResolvedRequest) -> ClientResult<Value> {
        let response = request.build(&self.http).send().await?;
        let status = response.status();
        let total = response.content_length().filter(|len| *len > 0);

        let mut body = Vec::new();
        let mut last_percent = 0u8;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            body.extend_from_slice(&chunk);
            if let Some(total) = total {
                let percent = progress_percent(body.len() as u64, total);
                if percent > last_percent {
                    last_percent = percent;
                    self.record_progress(percent);
                }
            }
        }

        if !status.is_success() {
            return Err(ClientError::from_status(status, &body));
        }
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(|e| ClientError::decode(e.to_string()))
    }

    fn record_progress(&self, percent: u8) {
        self.state.send_modify(|state| {
            if percent > state.progress {
                state.progress = percent;
            }
        });
        if let Some(handler) = &self.on_progress {
            handler(percent);
        }
    }
}

/// Rounded percentage of `loaded` over `total`, capped at 100.
///
/// The cap matters when a response body overruns a stale `Content-Length`.
fn progress_percent(loaded: u64, total: u64) -> u8 {
    let percent = (loaded as f64 * 100.0 / total as f64).round();
    if percent >= 100.0 { 100 } else { percent as u8 }
}

/// Resets `loading` if a request future is dropped before it settles.
struct SettleGuard<'a> {
    state: &'a watch::Sender<RequestState>,
    armed: bool,
}

impl<'a> SettleGuard<'a> {
    fn new(state: &'a watch::Sender<RequestState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_modify(|state| {
                state.loading = false;
            });
        }
    }
}
