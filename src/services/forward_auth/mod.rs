//! Forward-auth exchange: ask the authentication service whether an
//! inbound request may proceed.
//!
//! inbound request -> [`VerifyRequest`] (header rules) -> [`VerifyClient`]
//! -> [`Verdict`] -> deny response, or identity vars for the next stage.
use std::sync::Arc;

use thiserror::Error;

pub mod client;
pub mod factory;
pub mod headers;
pub mod identity;
pub mod inbound;
pub mod request;
pub mod target;
pub mod verdict;

pub use client::{HttpVerifyClient, TransportError, VerifyClient, VerifyResponse};
pub use factory::build_forward_auth;
pub use identity::{Identity, RequestVars};
pub use inbound::{ConnectionTls, HttpInbound, InboundRequest, StaticInbound};
pub use request::VerifyRequest;
pub use target::VerifyTarget;
pub use verdict::{Denial, MirroredResponse, Verdict};

#[derive(Debug, Error)]
pub enum ForwardAuthError {
    #[error("invalid verification target: {0}")]
    InvalidTarget(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub struct ForwardAuth {
    target: VerifyTarget,
    client: Arc<dyn VerifyClient>,
}

impl std::fmt::Debug for ForwardAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardAuth")
            .field("target", &self.target.url().as_str())
            .field("client", &self.client.backend_name())
            .finish()
    }
}

impl ForwardAuth {
    pub fn new(target: VerifyTarget, client: Arc<dyn VerifyClient>) -> Self {
        Self { target, client }
    }

    /// Build the verification request for `inbound`.
    ///
    /// Kept separate from [`ForwardAuth::verify`] so the borrow of the
    /// inbound request ends before the outbound call is awaited.
    pub fn prepare<R: InboundRequest + ?Sized>(&self, inbound: &R) -> VerifyRequest {
        VerifyRequest::build(inbound, &self.target)
    }

    /// Make the single verification call and classify the answer.
    ///
    /// Transport failures are returned as errors and never retried.
    pub async fn verify(&self, req: VerifyRequest) -> Result<Verdict, ForwardAuthError> {
        tracing::debug!(target_url = %req.url, "forwarding verification request");

        let resp = self.client.call(req).await?;

        tracing::debug!(status = %resp.status, "verification response received");
        Ok(Verdict::from_response(resp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForwardAuthSettings;
    use async_trait::async_trait;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records the request it receives and answers with a canned result.
    struct CannedClient {
        seen: Mutex<Vec<VerifyRequest>>,
        answer: Answer,
    }

    #[async_trait]
    impl VerifyClient for CannedClient {
        fn backend_name(&self) -> &'static str {
            "canned"
        }

        async fn call(&self, req: VerifyRequest) -> Result<VerifyResponse, TransportError> {
            self.seen.lock().unwrap().push(req);
            (self.answer)()
        }
    }

    type Answer = fn() -> Result<VerifyResponse, TransportError>;

    fn forward_auth(answer: Answer) -> (ForwardAuth, Arc<CannedClient>) {
        let client = Arc::new(CannedClient {
            seen: Mutex::new(Vec::new()),
            answer,
        });
        let target = VerifyTarget::new(&ForwardAuthSettings {
            tls: false,
            domain: "authelia".into(),
            port: 9091,
            redirect_url: None,
            timeout: Duration::from_secs(30),
        })
        .unwrap();

        (ForwardAuth::new(target, client.clone()), client)
    }

    fn allowed() -> Result<VerifyResponse, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert("remote-user", HeaderValue::from_static("alice"));
        headers.insert("remote-groups", HeaderValue::from_static("admins"));
        Ok(VerifyResponse {
            status: StatusCode::OK,
            headers,
            body: Bytes::new(),
        })
    }

    fn timed_out() -> Result<VerifyResponse, TransportError> {
        Err(TransportError::Timeout)
    }

    #[tokio::test]
    async fn verify_makes_exactly_one_call() {
        let (fa, client) = forward_auth(allowed);
        let inbound = StaticInbound {
            method: "GET".into(),
            request_uri: "/".into(),
            ..StaticInbound::default()
        };

        let verdict = fa.verify(fa.prepare(&inbound)).await.unwrap();

        assert!(verdict.is_allow());
        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url.as_str(), "http://authelia:9091/api/verify");
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let (fa, client) = forward_auth(timed_out);

        let err = fa
            .verify(fa.prepare(&StaticInbound::default()))
            .await
            .unwrap_err();

        assert!(matches!(err, ForwardAuthError::Transport(TransportError::Timeout)));
        assert_eq!(client.seen.lock().unwrap().len(), 1);
    }
}
