//! HTTP request configuration and response metadata as plain data.
//!
//! # Design
//! `RequestConfig` is what the transport needs to perform one call: verb,
//! request mode, headers and serialized body. It is built fresh for every
//! request and holds no references to shared state. `HttpResponse` is what a
//! transport hands back: status, headers and the raw body bytes, parsed
//! lazily by `json()`.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{ApiError, ParseError};

pub const CONTENT_TYPE: &str = "content-type";
pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request. The service only speaks `GET` and `POST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("GET") {
            Ok(HttpMethod::Get)
        } else if s.eq_ignore_ascii_case("POST") {
            Ok(HttpMethod::Post)
        } else {
            Err(ApiError::UnsupportedVerb(s.to_string()))
        }
    }
}

/// Origin policy applied to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    SameOrigin,
}

/// Everything a transport needs to perform one HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    pub method: HttpMethod,
    pub mode: RequestMode,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestConfig {
    /// Build the configuration for `method`.
    ///
    /// `GET` never carries a body, even when one is supplied. `POST`
    /// serializes `body` (an absent body serializes as `null`). Both verbs
    /// get the `application/json` content type and same-origin mode.
    pub fn new(method: HttpMethod, body: Option<&Value>) -> Self {
        let body = match method {
            HttpMethod::Get => None,
            HttpMethod::Post => Some(body.unwrap_or(&Value::Null).to_string()),
        };
        Self {
            method,
            mode: RequestMode::SameOrigin,
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            body,
        }
    }

    /// Append client-configured headers after the fixed content type.
    /// A configured `content-type` is ignored.
    pub fn with_headers(mut self, extra: &[(String, String)]) -> Self {
        self.headers.extend(
            extra
                .iter()
                .filter(|(name, _)| !name.eq_ignore_ascii_case(CONTENT_TYPE))
                .cloned(),
        );
        self
    }
}

/// A response as returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with a case-insensitive name match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, ParseError> {
        serde_json::from_slice(&self.body).map_err(ParseError::Body)
    }
}
