//! Request descriptions and default merging.
//!
//! A [`RequestSpec`] describes one request: method, URL, query parameters,
//! headers, and an optional JSON body. An executor carries
//! [`RequestDefaults`] that every spec is merged over before dispatch.
//! Merging is per key and the spec always wins over the defaults.

use std::time::Duration;

use indexmap::IndexMap;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Description of a single HTTP request.
///
/// # Example
///
/// ```ignore
/// use qcportal_client::RequestSpec;
/// use serde_json::json;
///
/// let spec = RequestSpec::post("/inspections")
///     .param("areaId", "7")
///     .header("X-Portal-Page", "inspection-list")
///     .json(json!({"status": "pending"}));
/// ```
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, or a path resolved against the defaults' base URL.
    pub url: String,
    /// Query parameters.
    pub params: IndexMap<String, String>,
    /// Request headers.
    pub headers: IndexMap<String, String>,
    /// JSON request body.
    pub body: Option<Value>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    /// Creates a spec with the given method and URL.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: IndexMap::new(),
            headers: IndexMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Creates a GET spec.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a POST spec.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Creates a PUT spec.
    #[must_use]
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Creates a DELETE spec.
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Merges this spec over the given defaults.
    ///
    /// Query parameters and headers merge per key, with the spec winning on
    /// conflicts. The body and timeout fall back to the defaults only when
    /// the spec leaves them unset. A relative URL is resolved against the
    /// defaults' base URL.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidRequest` when the URL is relative and no
    /// base URL is configured, or when the final URL does not parse.
    pub fn merge_over(self, defaults: &RequestDefaults) -> ClientResult<ResolvedRequest> {
        let url = resolve_url(&self.url, defaults.base_url.as_ref())?;

        let mut params = defaults.params.clone();
        params.extend(self.params);

        let mut headers = defaults.headers.clone();
        headers.extend(self.headers);

        let body = self.body.or_else(|| defaults.body.clone());
        let timeout = self.timeout.or(defaults.timeout);

        Ok(ResolvedRequest {
            method: self.method,
            url,
            params,
            headers,
            body,
            timeout,
        })
    }
}

/// Baseline applied to every request an executor sends.
#[derive(Debug, Clone, Default)]
pub struct RequestDefaults {
    /// Base URL that relative request URLs are resolved against.
    pub base_url: Option<Url>,
    /// Query parameters added to every request.
    pub params: IndexMap<String, String>,
    /// Headers added to every request.
    pub headers: IndexMap<String, String>,
    /// Body used when a request does not carry its own.
    pub body: Option<Value>,
    /// Timeout used when a request does not carry its own.
    pub timeout: Option<Duration>,
}

impl RequestDefaults {
    /// Creates empty defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Adds a default query parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds a default header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the default body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the default timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A spec merged over defaults, ready to dispatch.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: Url,
    /// Merged query parameters.
    pub params: IndexMap<String, String>,
    /// Merged headers.
    pub headers: IndexMap<String, String>,
    /// Effective JSON body.
    pub body: Option<Value>,
    /// Effective timeout.
    pub timeout: Option<Duration>,
}

impl ResolvedRequest {
    /// Builds a reqwest request from this description.
    pub fn build(&self, http: &reqwest::Client) -> reqwest::RequestBuilder {
        let mut builder = http.request(self.method.clone(), self.url.clone());

        if !self.params.is_empty() {
            builder = builder.query(&self.params);
        }
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &self.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder
    }
}

/// Resolves a spec URL to an absolute one.
///
/// Absolute URLs pass through. Relative URLs are appended to the base URL
/// with exactly one slash between the two parts, matching how the portal
/// frontends concatenated their API roots.
fn resolve_url(url: &str, base_url: Option<&Url>) -> ClientResult<Url> {
    match Url::parse(url) {
        Ok(absolute) => Ok(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base_url.ok_or_else(|| {
                ClientError::invalid_request(format!(
                    "relative URL {url:?} requires a base URL in the defaults"
                ))
            })?;
            let joined = format!(
                "{}/{}",
                base.as_str().trim_end_matches('/'),
                url.trim_start_matches('/')
            );
            Url::parse(&joined)
                .map_err(|e| ClientError::invalid_request(format!("invalid URL {joined:?}: {e}")))
        }
        Err(e) => Err(ClientError::invalid_request(format!(
            "invalid URL {url:?}: {e}"
        ))),
    }
}
