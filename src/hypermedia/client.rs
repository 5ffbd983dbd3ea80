//! HTTP client for the account resource.
//!
//! Provides the [`ResourceFetch`] seam that the discovery engine and the
//! invocation proxy depend on, plus the reqwest-backed [`ResourceClient`]
//! production implementation. Keeping the seam a trait lets tests drive
//! the engine with scripted fakes instead of a live server.
//!
//! No retry logic lives here: the engine's fixed retry-on-next-tick
//! policy owns that concern.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{InvokeError, ResourceError};
use crate::hypermedia::types::{AccountRepresentation, UpstreamError};

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 10;

// ---------------------------------------------------------------------------
// ResourceFetch trait
// ---------------------------------------------------------------------------

/// Read and invoke operations against the upstream resource.
///
/// `fetch` is the polling path; `execute` is the invocation path. Both
/// take an opaque, non-empty resource identifier or resolved URL and
/// never retry; callers decide the retry policy.
#[async_trait]
pub trait ResourceFetch: Send + Sync {
    /// Fetch the current representation of an account resource.
    ///
    /// # Errors
    ///
    /// * [`ResourceError::InvalidResource`] - empty `resource_id`.
    /// * [`ResourceError::Network`] - connection or timeout failure.
    /// * [`ResourceError::NotFound`] - the resource is absent upstream.
    /// * [`ResourceError::Decode`] - malformed body.
    async fn fetch(&self, resource_id: &str) -> Result<AccountRepresentation, ResourceError>;

    /// Forward an invocation to a capability target and return the
    /// upstream response body verbatim.
    ///
    /// `href` may be server-relative; implementations resolve it against
    /// their configured base URL. A body is attached only for mutating
    /// methods (POST/PUT/PATCH).
    async fn execute(
        &self,
        method: &str,
        href: &str,
        payload: Option<Value>,
    ) -> Result<Value, InvokeError>;
}

// ---------------------------------------------------------------------------
// ResourceClient
// ---------------------------------------------------------------------------

/// Production [`ResourceFetch`] implementation over HTTP.
///
/// # Example
///
/// ```rust,no_run
/// use hateoas_bridge::hypermedia::ResourceClient;
///
/// let client = ResourceClient::new("http://localhost:9001")
///     .unwrap()
///     .with_timeout(30);
/// ```
#[derive(Debug, Clone)]
pub struct ResourceClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl ResourceClient {
    /// Create a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidResource`] if `base_url` is empty.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ResourceError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ResourceError::InvalidResource {
                message: "base URL must not be empty".to_string(),
            });
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT),
            http: reqwest::Client::new(),
        })
    }

    /// Builder: set the per-request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds);
        self
    }

    /// The configured base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a link href against the base URL.
    ///
    /// Server-relative hrefs (leading `/`) join the base URL, absolute
    /// hrefs pass through untouched, anything else joins with a `/`
    /// separator.
    pub fn resolve_href(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if let Some(rest) = href.strip_prefix('/') {
            format!("{}/{}", self.base_url, rest)
        } else {
            format!("{}/{}", self.base_url, href)
        }
    }

    fn network_error(err: reqwest::Error) -> ResourceError {
        ResourceError::Network {
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl ResourceFetch for ResourceClient {
    async fn fetch(&self, resource_id: &str) -> Result<AccountRepresentation, ResourceError> {
        if resource_id.trim().is_empty() {
            return Err(ResourceError::InvalidResource {
                message: "resource id must not be empty".to_string(),
            });
        }

        let url = format!("{}/accounts/{}", self.base_url, resource_id);
        log::debug!("Resource fetch started: url='{}'", url);

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(Self::network_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ResourceError::NotFound {
                resource_id: resource_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ResourceError::Network {
                message: format!("unexpected status {} from {}", status, url),
            });
        }

        let body = response.text().await.map_err(Self::network_error)?;
        serde_json::from_str(&body).map_err(|e| ResourceError::Decode {
            message: e.to_string(),
        })
    }

    async fn execute(
        &self,
        method: &str,
        href: &str,
        payload: Option<Value>,
    ) -> Result<Value, InvokeError> {
        let url = self.resolve_href(href);
        let method = method.to_ascii_uppercase();

        let mut request = match method.as_str() {
            "GET" => self.http.get(&url),
            "POST" => self.http.post(&url),
            "PUT" => self.http.put(&url),
            "PATCH" => self.http.patch(&url),
            "DELETE" => self.http.delete(&url),
            other => {
                return Err(ResourceError::InvalidResource {
                    message: format!("unsupported method '{}'", other),
                }
                .into())
            }
        };

        // Only mutating methods carry a body.
        if matches!(method.as_str(), "POST" | "PUT" | "PATCH") {
            request = request.json(&payload.unwrap_or_else(|| Value::Object(Default::default())));
        }

        log::debug!("Invocation dispatch: method='{}', url='{}'", method, url);

        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| InvokeError::Resource(Self::network_error(e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InvokeError::Resource(Self::network_error(e)))?;

        if status.is_client_error() {
            // Pass the upstream rejection through verbatim.
            let message = serde_json::from_str::<UpstreamError>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| body.clone());
            return Err(InvokeError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(InvokeError::Resource(ResourceError::Network {
                message: format!("unexpected status {} from {}", status, url),
            }));
        }

        serde_json::from_str(&body).map_err(|e| {
            InvokeError::Resource(ResourceError::Decode {
                message: e.to_string(),
            })
        })
    }
}
