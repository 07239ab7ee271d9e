//! Asynchronous client for the cealloga code service.
//!
//! # Overview
//! The service stores code artifacts (`/code`: validate, list, record,
//! publish, unpublish) and runs them (`/cealloga`: by published name or by
//! record id for testing). Every call goes through one dispatch path that
//! builds the request, performs it over an injectable `Transport`, parses
//! the JSON body and decodes encoded-buffer replies into their logical
//! result.
//!
//! # Design
//! - `RequestConfig` / `HttpResponse` describe the HTTP exchange as plain data.
//! - `Dispatcher::request` resolves exactly once to `Reply` or `ApiError`;
//!   `Dispatcher::dispatch` offers the `(error, result, response)` callback
//!   form on top of it.
//! - `ApiClient` holds only a base URL and a dispatcher; configuration is
//!   per client, never global.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod normalize;
pub mod transport;
pub mod types;

pub use client::{ApiClient, Cealloga, Code};
pub use config::ClientConfig;
pub use dispatch::{Dispatcher, Reply};
pub use error::{ApiError, ParseError};
pub use http::{HttpMethod, HttpResponse, RequestConfig, RequestMode};
pub use normalize::normalize;
pub use transport::{ReqwestTransport, Transport};
pub use types::{CodeQuery, CodeRecord, CodeSubmission};
