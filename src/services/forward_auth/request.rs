use axum::http::{HeaderMap, Method};
use url::Url;

use super::headers::assign_forward_headers;
use super::inbound::InboundRequest;
use super::target::VerifyTarget;

/// Outbound `GET` to the verify endpoint. Bodyless; owned by the client
/// for the duration of one call.
#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl VerifyRequest {
    pub fn build<R: InboundRequest + ?Sized>(inbound: &R, target: &VerifyTarget) -> Self {
        let mut headers = HeaderMap::new();
        assign_forward_headers(inbound, &mut headers);

        Self {
            method: Method::GET,
            url: target.url().clone(),
            headers,
        }
    }
}
