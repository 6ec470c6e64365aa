//! Plain request/response client for server-side upstream calls.
//!
//! Unlike [`RequestExecutor`](crate::executor::RequestExecutor), this client
//! keeps no lifecycle state. It is meant for the portal backend, where each
//! call stands alone and the caller wants the upstream status back.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::request::{RequestDefaults, RequestSpec};

/// A decoded upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code. Always a success code; error statuses are returned
    /// as [`ClientError::Status`] instead.
    pub status: u16,
    /// Decoded JSON body. `Value::Null` when the response had no body.
    pub body: Value,
}

impl ApiResponse {
    /// Deserializes the body into a concrete type.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Decode` when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        serde_json::from_value(self.body.clone()).map_err(|e| ClientError::decode(e.to_string()))
    }
}

/// Stateless JSON client with merged defaults.
///
/// # Example
///
/// ```ignore
/// use qcportal_client::{ApiClient, RequestDefaults};
/// use url::Url;
///
/// let api = ApiClient::new(
///     RequestDefaults::new().with_base_url(Url::parse("http://upstream:9000/api/")?),
/// );
/// let response = api.get("/areas").await?;
/// assert_eq!(response.status, 200);
/// ```
pub struct ApiClient {
    http: reqwest::Client,
    defaults: RequestDefaults,
}

impl ApiClient {
    /// Creates a client with the given defaults and a fresh HTTP client.
    #[must_use]
    pub fn new(defaults: RequestDefaults) -> Self {
        Self::with_client(reqwest::Client::new(), defaults)
    }

    /// Creates a client that reuses an existing HTTP client.
    #[must_use]
    pub fn with_client(http: reqwest::Client, defaults: RequestDefaults) -> Self {
        Self { http, defaults }
    }

    /// Executes an arbitrary request spec.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` for non-success responses, with the
    /// message extracted from the body where possible.
    pub async fn execute(&self, spec: RequestSpec) -> ClientResult<ApiResponse> {
        let request = spec.merge_over(&self.defaults)?;
        tracing::debug!(method = %request.method, url = %request.url, "Upstream call");

        let response = request.build(&self.http).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::from_status(status, &bytes));
        }

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| ClientError::decode(e.to_string()))?
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// GET a path relative to the base URL.
    pub async fn get(&self, path: impl Into<String>) -> ClientResult<ApiResponse> {
        self.execute(RequestSpec::get(path)).await
    }

    /// POST a JSON body to a path relative to the base URL.
    pub async fn post(&self, path: impl Into<String>, body: Value) -> ClientResult<ApiResponse> {
        self.execute(RequestSpec::post(path).json(body)).await
    }

    /// PUT a JSON body to a path relative to the base URL.
    pub async fn put(&self, path: impl Into<String>, body: Value) -> ClientResult<ApiResponse> {
        self.execute(RequestSpec::put(path).json(body)).await
    }

    /// DELETE a path relative to the base URL.
    pub async fn delete(&self, path: impl Into<String>) -> ClientResult<ApiResponse> {
        self.execute(RequestSpec::delete(path)).await
    }
}
