//! Remote Gateway
//!
//! Every remote call the adapter makes goes through the `Gateway` trait as a
//! logical request: method, resource, optional query, optional JSON body.
//! The HTTP implementation lives in `http`; tests swap in an in-memory stub.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               ThemeFs (proxy)               │
//! │  list, stat, read, write, rename, remove    │
//! └─────────────────────────────────────────────┘
//!                      │ ApiRequest
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │               Gateway trait                 │
//! │      send (GET/PUT/DELETE), fetch (URL)     │
//! └─────────────────────────────────────────────┘
//!            │                       │
//!            ▼                       ▼
//!     ┌─────────────┐         ┌─────────────┐
//!     │ HttpGateway │         │ stub (test) │
//!     └─────────────┘         └─────────────┘
//! ```

pub mod http;
pub mod http_retry;
pub mod types;

pub use http::{build_client, HttpGateway};
pub use http_retry::{send_with_retry, HttpRetryConfig};

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::FsError;

/// Theme listing resource
pub const THEMES_RESOURCE: &str = "/admin/themes";

/// Query parameter naming an asset by key
pub const ASSET_KEY_PARAM: &str = "asset[key]";

/// Asset collection resource of one theme
pub fn assets_resource(theme_id: u64) -> String {
    format!("{}/{}/assets", THEMES_RESOURCE, theme_id)
}

/// Query selecting a single asset
pub fn asset_query(key: &str) -> Vec<(String, String)> {
    vec![(ASSET_KEY_PARAM.to_string(), key.to_string())]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Logical request against the remote API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub resource: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(resource: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self { method: Method::Get, resource: resource.into(), query, body: None }
    }

    pub fn put(resource: impl Into<String>, body: Value) -> Self {
        Self { method: Method::Put, resource: resource.into(), query: Vec::new(), body: Some(body) }
    }

    pub fn delete(resource: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self { method: Method::Delete, resource: resource.into(), query, body: None }
    }

    /// Value of a query parameter, if present
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.resource)?;
        if !self.query.is_empty() {
            write!(f, "?{}", crate::credentials::encode_query(&self.query))?;
        }
        Ok(())
    }
}

/// Remote API access for one session
///
/// Implementations enforce the response contract: status exactly 200,
/// JSON content type, parseable JSON body. Failures come back as the
/// matching `FsError` remote variants.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Issue a logical request and decode the JSON response body
    async fn send(&self, request: ApiRequest) -> Result<Value, FsError>;

    /// Fetch raw bytes from an absolute URL outside the API (public asset copies)
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FsError>;

    /// Display name for logs
    fn display_name(&self) -> String {
        "gateway".to_string()
    }

    async fn get(&self, resource: &str, query: Vec<(String, String)>) -> Result<Value, FsError> {
        self.send(ApiRequest::get(resource, query)).await
    }

    async fn put(&self, resource: &str, body: Value) -> Result<Value, FsError> {
        self.send(ApiRequest::put(resource, body)).await
    }

    async fn delete(&self, resource: &str, query: Vec<(String, String)>) -> Result<Value, FsError> {
        self.send(ApiRequest::delete(resource, query)).await
    }
}

/// Lets several owners share one gateway
#[async_trait]
impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    async fn send(&self, request: ApiRequest) -> Result<Value, FsError> {
        (**self).send(request).await
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FsError> {
        (**self).fetch(url).await
    }

    fn display_name(&self) -> String {
        (**self).display_name()
    }
}
