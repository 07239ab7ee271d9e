//! Resource methods for the cealloga service.
//!
//! # Design
//! `ApiClient` holds the base URL and a `Dispatcher`. Each resource method
//! formats a URL from the endpoint table and delegates to
//! `Dispatcher::request` with a fixed verb, so an unsupported verb cannot be
//! reached from here. Status codes are not interpreted; use
//! `Reply::error_for_status` for that.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::dispatch::{Dispatcher, Reply};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::CodeQuery;

/// Service endpoint paths, relative to the host.
pub mod endpoints {
    pub const CEALLOGA_TEST: &str = "/cealloga/_test";
    pub const CEALLOGA: &str = "/cealloga";
    pub const CODE_LIST: &str = "/code";
    pub const CODE_PUBLISH: &str = "/code/publish";
    pub const CODE_RECORD: &str = "/code";
    pub const CODE_UNPUBLISH: &str = "/code/unpublish";
    pub const CODE_VALIDATE: &str = "/code/validate";
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    host: String,
    dispatcher: Dispatcher,
}

impl ApiClient {
    /// Client over the network, restricted to the configured host's origin.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let base = config.base_url()?;
        let transport = ReqwestTransport::new().with_origin(&base);
        Self::with_transport(config, Arc::new(transport))
    }

    /// Client over a caller-supplied transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ApiError> {
        config.base_url()?;
        let dispatcher = Dispatcher::with_config(transport, &config);
        Ok(Self {
            host: config.host,
            dispatcher,
        })
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn code(&self) -> Code<'_> {
        Code { client: self }
    }

    pub fn cealloga(&self) -> Cealloga<'_> {
        Cealloga { client: self }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.host)
    }

    async fn get(&self, endpoint: &str) -> Result<Reply, ApiError> {
        self.dispatcher
            .request(&self.url(endpoint), HttpMethod::Get, None)
            .await
    }

    async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Reply, ApiError> {
        let body = to_json(body)?;
        self.dispatcher
            .request(&self.url(endpoint), HttpMethod::Post, Some(&body))
            .await
    }
}

/// `/code` service mappings.
#[derive(Debug, Clone, Copy)]
pub struct Code<'a> {
    client: &'a ApiClient,
}

impl Code<'_> {
    pub async fn list(&self, query: &CodeQuery) -> Result<Reply, ApiError> {
        let endpoint = if query.is_empty() {
            endpoints::CODE_LIST.to_string()
        } else {
            format!("{}?{}", endpoints::CODE_LIST, query.to_query_string())
        };
        self.client.get(&endpoint).await
    }

    pub async fn publish(&self, id: &str) -> Result<Reply, ApiError> {
        self.client
            .get(&path(endpoints::CODE_PUBLISH, id))
            .await
    }

    pub async fn record(&self, id: &str) -> Result<Reply, ApiError> {
        self.client
            .get(&path(endpoints::CODE_RECORD, id))
            .await
    }

    pub async fn unpublish(&self, name: &str) -> Result<Reply, ApiError> {
        self.client
            .get(&path(endpoints::CODE_UNPUBLISH, name))
            .await
    }

    pub async fn validate<B: Serialize + ?Sized>(&self, body: &B) -> Result<Reply, ApiError> {
        self.client.post(endpoints::CODE_VALIDATE, body).await
    }
}

/// `/cealloga` service mappings.
#[derive(Debug, Clone, Copy)]
pub struct Cealloga<'a> {
    client: &'a ApiClient,
}

impl Cealloga<'_> {
    /// Run the published service `name` with `body`.
    pub async fn exec<B: Serialize + ?Sized>(&self, name: &str, body: &B) -> Result<Reply, ApiError> {
        self.client
            .post(&path(endpoints::CEALLOGA, name), body)
            .await
    }

    /// Run the unpublished record `id` with `body`.
    pub async fn test<B: Serialize + ?Sized>(&self, id: &str, body: &B) -> Result<Reply, ApiError> {
        self.client
            .post(&path(endpoints::CEALLOGA_TEST, id), body)
            .await
    }

    /// Run against an explicit endpoint path, e.g. `/cealloga/barchart`.
    pub async fn exec_at<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Reply, ApiError> {
        self.client.post(endpoint, body).await
    }
}

fn path(endpoint: &str, segment: &str) -> String {
    format!("{endpoint}/{}", urlencoding::encode(segment))
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Serialization(e.to_string()))
}
