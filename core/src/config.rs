//! Client configuration.
//!
//! # Design
//! Configuration is an explicit value handed to one client, never process
//! state. Extra request headers live here rather than in any global header
//! constructor.

use url::Url;

use crate::error::ApiError;

/// Environment variable read by `ClientConfig::from_env`.
pub const HOST_ENV: &str = "CEALLOGA_HOST";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the service, without a trailing slash.
    pub host: String,
    /// Headers sent with every request after `content-type`.
    pub headers: Vec<(String, String)>,
    /// Whether replies may be encoded buffers that need decoding.
    pub decode_buffers: bool,
}

impl ClientConfig {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            headers: Vec::new(),
            decode_buffers: true,
        }
    }

    pub fn from_env() -> Result<Self, ApiError> {
        match std::env::var(HOST_ENV) {
            Ok(host) if !host.trim().is_empty() => Ok(Self::new(host.trim())),
            _ => Err(ApiError::Config(format!("{HOST_ENV} is not set"))),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn decode_buffers(mut self, decode: bool) -> Self {
        self.decode_buffers = decode;
        self
    }

    /// Parse `host` as an absolute URL.
    pub fn base_url(&self) -> Result<Url, ApiError> {
        crate::dispatch::parse_url(&self.host)
    }
}
