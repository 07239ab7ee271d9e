//! Injectable HTTP transport.
//!
//! The dispatcher never performs I/O itself; it hands a `RequestConfig` to a
//! `Transport` and gets back an `HttpResponse`. `ReqwestTransport` is the
//! network implementation. Tests supply in-memory transports.

use async_trait::async_trait;
use url::{Origin, Url};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpResponse, RequestConfig, RequestMode};

/// Performs one HTTP round-trip.
///
/// Returning `Err` means no response was obtained; the error should be an
/// `ApiError::Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &Url, config: &RequestConfig) -> Result<HttpResponse, ApiError>;
}

/// `reqwest`-backed transport.
///
/// When given an origin, same-origin requests to any other scheme, host or
/// port are refused before they reach the network.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    origin: Option<Origin>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: &Url) -> Self {
        self.origin = Some(origin.origin());
        self
    }

    fn check_origin(&self, url: &Url, mode: RequestMode) -> Result<(), ApiError> {
        match (mode, &self.origin) {
            (RequestMode::SameOrigin, Some(origin)) if url.origin() != *origin => Err(
                ApiError::Transport(format!("{url} is not same-origin with {}", origin.ascii_serialization())),
            ),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, url: &Url, config: &RequestConfig) -> Result<HttpResponse, ApiError> {
        self.check_origin(url, config.mode)?;

        let method = match config.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };
        let mut builder = self.client.request(method, url.clone());
        for (name, value) in &config.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &config.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
