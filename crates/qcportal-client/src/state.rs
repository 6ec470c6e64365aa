//! Observable request lifecycle state.

use serde::Serialize;
use serde_json::Value;

/// Snapshot of a request executor's lifecycle.
///
/// The executor publishes one of these through a watch channel on every
/// transition. The fields mirror what a dashboard widget binds to: a busy
/// flag, a download percentage, the last error message, and the last
/// successfully loaded payload.
///
/// Settlements are atomic: `data` and `loading` change in the same update,
/// so observers never see fresh data while `loading` is still `true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestState {
    /// `true` from dispatch until the request settles.
    pub loading: bool,
    /// Download progress in percent, `0..=100`. Only advances when the
    /// response announces its total size.
    pub progress: u8,
    /// Message of the most recent failure. Cleared when a new request
    /// starts and when a request succeeds.
    pub error: Option<String>,
    /// Payload of the most recent success. A failed request leaves the
    /// previous payload in place.
    pub data: Option<Value>,
}

impl RequestState {
    /// `true` once a request has settled with data and no newer failure.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.loading && self.error.is_none() && self.data.is_some()
    }
}

impl Default for RequestState {
    fn default() -> Self {
        Self {
            loading: false,
            progress: 0,
            error: None,
            data: None,
        }
    }
}
