//! reqwest-backed gateway
//!
//! Builds credentialed URLs from the session, sends JSON both ways and
//! enforces the response contract: status 200, `application/json`, parseable
//! body.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, info};

use super::{send_with_retry, ApiRequest, Gateway, HttpRetryConfig, Method};
use crate::config::HttpConfig;
use crate::credentials::Session;
use crate::error::FsError;

const JSON_CONTENT_TYPE: &str = "application/json";

fn gateway_log(msg: &str) {
    info!("[GATEWAY] {}", msg);
}

pub struct HttpGateway {
    session: Session,
    client: reqwest::Client,
    retry: HttpRetryConfig,
}

impl HttpGateway {
    pub fn new(session: Session, config: &HttpConfig) -> Result<Self, FsError> {
        let client = build_client(config)?;
        Ok(Self::with_client(session, client, config))
    }

    /// Share one connection pool across sessions
    pub fn with_client(session: Session, client: reqwest::Client, config: &HttpConfig) -> Self {
        Self {
            session,
            client,
            retry: HttpRetryConfig::from(config),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn build(&self, request: &ApiRequest) -> Result<reqwest::Request, FsError> {
        let url = self.session.resource_url(&request.resource, &request.query)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        // Credentials in the URL become a basic auth header here
        let mut builder = self.client.request(method, url).header(ACCEPT, JSON_CONTENT_TYPE);
        if let Some(ref body) = request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| FsError::ParseError(format!("Failed to encode request body: {}", e)))?;
            builder = builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(bytes);
        }
        builder
            .build()
            .map_err(|e| FsError::Transport(format!("Build request failed: {}", e)))
    }
}

/// Client with the configured timeouts
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client, FsError> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .build()
        .map_err(|e| FsError::Transport(format!("Failed to build HTTP client: {}", e)))
}

/// Content type without parameters, lowercased
fn media_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    Some(value.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
}

/// Apply the response contract to a status, headers and raw body
fn decode_response(
    resource: &str,
    status: u16,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Value, FsError> {
    if status != 200 {
        return Err(FsError::HttpStatus { status, resource: resource.to_string() });
    }
    match media_type(headers) {
        Some(ref media) if media == JSON_CONTENT_TYPE => {}
        other => {
            return Err(FsError::UnexpectedContentType(
                other.unwrap_or_else(|| "<missing>".to_string()),
            ))
        }
    }
    serde_json::from_slice(body).map_err(|e| {
        let length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        FsError::ParseError(format!(
            "Unable to parse response JSON; Content-Length: {} ({})",
            length, e
        ))
    })
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn send(&self, request: ApiRequest) -> Result<Value, FsError> {
        let http_request = self.build(&request)?;
        debug!(
            "{} {}",
            request.method,
            self.session.redacted_url(&request.resource, &request.query)
        );

        let response = send_with_retry(&self.client, http_request, &self.retry)
            .await
            .map_err(|e| FsError::Transport(format!("Request failed: {}", e.without_url())))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| FsError::Transport(format!("Read body failed: {}", e.without_url())))?;

        decode_response(&request.resource, status, &headers, &body)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FsError> {
        gateway_log(&format!("Fetching public copy {}", url));
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FsError::Transport(format!("Fetch failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FsError::HttpStatus { status: status.as_u16(), resource: url.to_string() });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FsError::Transport(format!("Read body failed: {}", e)))?;
        Ok(bytes.to_vec())
    }

    fn display_name(&self) -> String {
        format!("{} ({})", self.session.host(), self.session.api_key())
    }
}
