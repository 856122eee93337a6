use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCESS_CONTROL_ALLOW_ORIGIN, HeaderMap, ORIGIN};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use webchat_core::DeliveryOptions;

use crate::payload::OutboundPayload;

/// One POST as a transport sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

/// A response that made it back, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failures below the HTTP layer: nothing usable came back.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("failed to fetch: {0}")]
    Network(String),

    #[error("cross-origin response from {url} not allowed for {origin}")]
    CrossOriginBlocked { url: String, origin: String },
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        request: &TransportRequest,
        payload: &OutboundPayload,
    ) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn post(
        &self,
        request: &TransportRequest,
        payload: &OutboundPayload,
    ) -> Result<TransportResponse, TransportError> {
        (**self).post(request, payload).await
    }
}

/// reqwest-backed transport.
///
/// Holds no cookie store, so nothing but the explicit request headers leaves
/// the process. With `enforce_cors` and an `origin` configured it behaves like
/// a browser: the request announces the origin and a response without a
/// matching `Access-Control-Allow-Origin` is rejected.
pub struct HttpTransport {
    client: Client,
    origin: Option<String>,
    enforce_cors: bool,
}

impl HttpTransport {
    pub fn new(options: &DeliveryOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = options.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            origin: options.origin.clone(),
            enforce_cors: options.enforce_cors,
        })
    }

    fn check_origin(&self, url: &str, headers: &HeaderMap) -> Result<(), TransportError> {
        let Some(origin) = self.origin.as_deref().filter(|_| self.enforce_cors) else {
            return Ok(());
        };

        let allowed = headers
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "*" || v == origin);

        if allowed {
            Ok(())
        } else {
            Err(TransportError::CrossOriginBlocked {
                url: url.to_string(),
                origin: origin.to_string(),
            })
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        request: &TransportRequest,
        payload: &OutboundPayload,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = self.client.post(&request.url).json(payload);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(origin) = &self.origin {
            builder = builder.header(ORIGIN, origin.as_str());
        }

        let response = builder.send().await.map_err(from_reqwest)?;
        let status = response.status();
        debug!(url = %request.url, %status, "Webhook response status");
        debug!(url = %request.url, headers = ?response.headers(), "Webhook response headers");

        self.check_origin(&request.url, response.headers())?;

        let body = response.text().await.map_err(from_reqwest)?;
        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn from_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn transport(origin: Option<&str>, enforce_cors: bool) -> HttpTransport {
        let options = DeliveryOptions {
            origin: origin.map(str::to_string),
            enforce_cors,
            ..DeliveryOptions::default()
        };
        HttpTransport::new(&options).unwrap()
    }

    #[test]
    fn success_range() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(301, "").is_success());
        assert!(!TransportResponse::new(500, "").is_success());
    }

    #[test]
    fn origin_check_disabled_by_default() {
        let http = transport(Some("https://site.example"), false);
        assert!(http.check_origin("https://hook", &HeaderMap::new()).is_ok());
    }

    #[test]
    fn origin_check_requires_matching_header() {
        let http = transport(Some("https://site.example"), true);
        let mut headers = HeaderMap::new();
        assert!(matches!(
            http.check_origin("https://hook", &headers),
            Err(TransportError::CrossOriginBlocked { .. })
        ));

        headers.insert(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("https://other.example"),
        );
        assert!(http.check_origin("https://hook", &headers).is_err());

        headers.insert(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("https://site.example"),
        );
        assert!(http.check_origin("https://hook", &headers).is_ok());

        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        assert!(http.check_origin("https://hook", &headers).is_ok());
    }
}
