//! Verification client: one outbound call per inbound request.
use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode, header};
use std::time::Duration;
use thiserror::Error;

use super::request::VerifyRequest;

/// Fully-read verification response. The transport is already released
/// by the time a caller sees this.
#[derive(Debug, Clone)]
pub struct VerifyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// The outbound call could not complete.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("verification request timed out")]
    Timeout,
    #[error("could not connect to authentication service: {0}")]
    Connect(String),
    #[error("failed to read verification response body: {0}")]
    Body(String),
    #[error("verification request failed: {0}")]
    Request(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Issues a verification request.
///
/// Implementations must:
/// - not follow redirects (a 3xx is an answer, not a detour)
/// - bound the call with a timeout
/// - read the body to completion and release the connection on every path
#[async_trait]
pub trait VerifyClient: Send + Sync + 'static {
    // Client name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn call(&self, req: VerifyRequest) -> Result<VerifyResponse, TransportError>;
}

/// reqwest-backed client. Cheap to share: the connection pool lives
/// inside `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct HttpVerifyClient {
    client: reqwest::Client,
}

impl HttpVerifyClient {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self { client })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else if e.is_body() || e.is_decode() {
        TransportError::Body(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

#[async_trait]
impl VerifyClient for HttpVerifyClient {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    async fn call(&self, req: VerifyRequest) -> Result<VerifyResponse, TransportError> {
        let VerifyRequest {
            method,
            url,
            mut headers,
        } = req;

        // Framing belongs to the outbound connection: Host comes from the
        // target URL and a GET without body carries no length.
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);

        let response = self
            .client
            .request(method, url)
            .headers(headers)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let headers = response.headers().clone();

        // `bytes()` consumes the response; the connection goes back to the
        // pool (or is closed) when it is dropped, on success and on error.
        let body = response.bytes().await.map_err(classify)?;

        Ok(VerifyResponse {
            status,
            headers,
            body,
        })
    }
}
