//! Error types for the cealloga API client.
//!
//! # Design
//! Every failure of a request is delivered as a single `ApiError` value. The
//! variants that happen after the network round-trip (`Parse`) carry the
//! response metadata so callers can still inspect the status and headers of
//! a reply whose body could not be understood.

use thiserror::Error;

use crate::http::HttpResponse;

/// Reasons a response body could not be turned into a JSON result.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The outer response body is not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Body(#[source] serde_json::Error),

    /// An encoded buffer element is not a Unicode scalar value.
    #[error("encoded buffer holds invalid code point {0:#x}")]
    BufferCodePoint(u32),

    /// An encoded buffer payload decodes to text that is not valid JSON.
    #[error("encoded buffer does not contain valid JSON: {0}")]
    BufferJson(#[source] serde_json::Error),
}

/// Errors returned by the dispatcher and the resource methods built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The network call itself failed; no response is available.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response arrived but its body could not be parsed.
    #[error("{source}")]
    Parse {
        source: ParseError,
        response: Option<Box<HttpResponse>>,
    },

    /// A verb other than `GET` or `POST` was requested.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedVerb(String),

    /// The request URL is not an absolute URL.
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Client configuration is incomplete.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A JSON result could not be deserialized into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The server returned 404 for the requested record or service.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl ApiError {
    pub(crate) fn parse(source: ParseError, response: HttpResponse) -> Self {
        ApiError::Parse {
            source,
            response: Some(Box::new(response)),
        }
    }

    /// Response metadata that accompanied the failure, if the round-trip
    /// completed before it.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ApiError::Parse { response, .. } => response.as_deref(),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, ApiError::Parse { .. })
    }
}
