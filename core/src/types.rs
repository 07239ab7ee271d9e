//! Domain DTOs for the cealloga API.
//!
//! # Design
//! These mirror the mock-server's schema but are defined independently;
//! integration tests catch drift between the two crates. Resource methods
//! accept any `Serialize` payload and return raw JSON in a `Reply`, so these
//! types are a convenience for callers, not a requirement.

use serde::{Deserialize, Serialize};

/// A stored code artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeRecord {
    pub id: String,
    pub name: String,
    pub service: String,
    #[serde(default)]
    pub published: bool,
}

/// Payload for `/code/validate`: a named service and its source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeSubmission {
    pub name: String,
    pub service: String,
}

/// Filters for `/code`, encoded in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeQuery {
    params: Vec<(String, String)>,
}

impl CodeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(self, name: &str) -> Self {
        self.param("name", name)
    }

    /// Published flag, sent as `1` or `0`.
    pub fn published(self, published: bool) -> Self {
        self.param("published", if published { "1" } else { "0" })
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `key=value` pairs joined by `&`, values percent-encoded.
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
