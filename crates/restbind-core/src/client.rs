//! `reqwest`-backed transport.
//!
//! [`ApiClient`] prefixes every resolved path with the configured base URL,
//! attaches the configured bearer token and sends bodies as JSON. Each call
//! returns a boxed future; nothing is sent until it is polled.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{Method, RequestBuilder};
use serde_json::Value as JsonValue;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::transport::HttpTransport;

/// Failure of a call performed by [`ApiClient`]
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("server responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Pending response of an [`ApiClient`] call
pub type ApiResponse = BoxFuture<'static, Result<JsonValue, TransportError>>;

/// HTTP transport for described APIs
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> crate::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| crate::Error::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(http, config))
    }

    /// Use an existing `reqwest::Client`
    pub fn with_client(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            bearer_token: config.bearer_token.clone(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for a resolved path. The path is appended to the base URL
    /// as is, so a base of `https://host/api` keeps its `/api` prefix.
    pub fn url_for(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        if path.starts_with('/') {
            Url::parse(&format!("{}{}", base, path))
        } else {
            Url::parse(&format!("{}/{}", base, path))
        }
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, TransportError> {
        let url = self.url_for(path)?;
        let mut request = self.http.request(method, url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    fn send(request: Result<RequestBuilder, TransportError>) -> ApiResponse {
        Box::pin(async move {
            let response = request?.send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            if !status.is_success() {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(JsonValue::Null);
            }
            Ok(serde_json::from_slice(&bytes)?)
        })
    }

    fn with_body(
        request: Result<RequestBuilder, TransportError>,
        body: Option<&JsonValue>,
    ) -> Result<RequestBuilder, TransportError> {
        match body {
            Some(body) => request.map(|r| r.json(body)),
            None => request,
        }
    }
}

impl HttpTransport for ApiClient {
    type Output = ApiResponse;

    fn get(&self, path: &str, query: &[(String, String)]) -> Self::Output {
        let request = self.request(Method::GET, path).map(|r| {
            if query.is_empty() {
                r
            } else {
                r.query(query)
            }
        });
        Self::send(request)
    }

    fn post(&self, path: &str, body: Option<&JsonValue>) -> Self::Output {
        Self::send(Self::with_body(self.request(Method::POST, path), body))
    }

    fn put(&self, path: &str, body: Option<&JsonValue>) -> Self::Output {
        Self::send(Self::with_body(self.request(Method::PUT, path), body))
    }

    fn delete(&self, path: &str) -> Self::Output {
        Self::send(self.request(Method::DELETE, path))
    }
}
