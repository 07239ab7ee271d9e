//! Request dispatch and response normalization.
//!
//! # Design
//! `Dispatcher::request` is the single code path for every service call:
//! build the `RequestConfig`, run it through the `Transport`, parse the body
//! as JSON and normalize encoded buffers. It resolves exactly once, either
//! to a `Reply` or to an `ApiError`; parse failures keep the response.
//!
//! `Dispatcher::dispatch` layers the `(error, result, response)` callback
//! convention on top for fire-and-forget callers.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpResponse, RequestConfig};
use crate::normalize::normalize;
use crate::transport::Transport;

/// A successfully normalized reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub value: Value,
    pub response: HttpResponse,
}

impl Reply {
    pub fn status(&self) -> u16 {
        self.response.status
    }

    /// Map non-success statuses to the appropriate `ApiError` variant.
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.response.is_success() {
            return Ok(self);
        }
        if self.response.status == 404 {
            return Err(ApiError::NotFound);
        }
        Err(ApiError::Status {
            status: self.response.status,
            body: self.response.text(),
        })
    }

    pub fn into_value<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(self.value).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

/// Issues requests through a `Transport`. Cheap to clone; clones share the
/// transport.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    headers: Arc<[(String, String)]>,
    decode_buffers: bool,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("headers", &self.headers)
            .field("decode_buffers", &self.decode_buffers)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            headers: Arc::from(Vec::new()),
            decode_buffers: true,
        }
    }

    pub fn with_config(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            headers: Arc::from(config.headers.clone()),
            decode_buffers: config.decode_buffers,
        }
    }

    /// Perform one request and normalize its JSON result.
    pub async fn request(
        &self,
        url: &str,
        method: HttpMethod,
        body: Option<&Value>,
    ) -> Result<Reply, ApiError> {
        let url = parse_url(url)?;
        let config = RequestConfig::new(method, body).with_headers(&self.headers);
        debug!(%method, %url, "dispatching request");

        let response = match self.transport.fetch(&url, &config).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, %url, error = %err, "request failed");
                return Err(err);
            }
        };

        let value = response.json().and_then(|parsed| {
            if self.decode_buffers {
                normalize(parsed)
            } else {
                Ok(parsed)
            }
        });
        match value {
            Ok(value) => {
                debug!(%method, %url, status = response.status, "request completed");
                Ok(Reply { value, response })
            }
            Err(source) => {
                warn!(%method, %url, status = response.status, error = %source, "unparseable response");
                Err(ApiError::parse(source, response))
            }
        }
    }

    /// Like [`Dispatcher::request`] with a verb string. Verbs other than
    /// `GET` and `POST` fail with `ApiError::UnsupportedVerb` before any I/O.
    pub async fn request_verb(
        &self,
        url: &str,
        verb: &str,
        body: Option<&Value>,
    ) -> Result<Reply, ApiError> {
        let method: HttpMethod = verb.parse()?;
        self.request(url, method, body).await
    }

    /// Fire-and-forget form of [`Dispatcher::request`].
    ///
    /// Spawns onto the current tokio runtime and calls `callback` exactly
    /// once with `(error, result, response)`. `response` is present on
    /// success and on parse failures.
    ///
    /// Outside a tokio runtime nothing is spawned: `callback` runs before
    /// this returns with an `ApiError::Config` error, and `None` is
    /// returned instead of a join handle.
    pub fn dispatch<F>(
        &self,
        url: impl Into<String>,
        method: HttpMethod,
        body: Option<Value>,
        callback: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Option<ApiError>, Option<Value>, Option<HttpResponse>) + Send + 'static,
    {
        let url = url.into();
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(%method, %url, error = %err, "dispatch outside a tokio runtime");
                callback(
                    Some(ApiError::Config(format!("no tokio runtime to dispatch on: {err}"))),
                    None,
                    None,
                );
                return None;
            }
        };
        let dispatcher = self.clone();
        Some(runtime.spawn(async move {
            match dispatcher.request(&url, method, body.as_ref()).await {
                Ok(reply) => callback(None, Some(reply.value), Some(reply.response)),
                Err(err) => {
                    let response = err.response().cloned();
                    callback(Some(err), None, response)
                }
            }
        }))
    }
}

/// Parse `url`, requiring an absolute URL with a host.
pub(crate) fn parse_url(url: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !parsed.has_host() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(parsed)
}
