//! Classification of a verification response.
//!
//! - 2xx + `Remote-User` + `Remote-Groups` => [`Verdict::Allow`]
//! - 2xx missing either identity header => [`Denial::InvalidIdentity`]
//! - anything else => [`Denial::Mirror`]: the caller gets the auth service's
//!   own status, headers (minus hop-by-hop) and body
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use super::client::VerifyResponse;
use super::headers::copy_headers_without_hop;
use super::identity::Identity;

/// Fixed message for a 2xx answer without a usable identity.
pub const INVALID_IDENTITY_MESSAGE: &str = "authentication service failed to return a valid user";

#[derive(Debug, Clone)]
pub enum Verdict {
    Allow(Identity),
    Deny(Denial),
}

#[derive(Debug, Clone)]
pub enum Denial {
    /// Explicit rejection, relayed verbatim to the original caller.
    Mirror(MirroredResponse),
    /// Success status without the required identity headers: the auth
    /// service broke its contract.
    InvalidIdentity,
}

impl Verdict {
    pub fn from_response(resp: VerifyResponse) -> Self {
        if !resp.status.is_success() {
            return Verdict::Deny(Denial::Mirror(MirroredResponse::from(resp)));
        }

        match Identity::from_headers(&resp.headers) {
            Some(identity) => Verdict::Allow(identity),
            None => Verdict::Deny(Denial::InvalidIdentity),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Verdict::Allow(_))
    }
}

/// Static response rebuilt from a rejected verification.
#[derive(Debug, Clone)]
pub struct MirroredResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl From<VerifyResponse> for MirroredResponse {
    fn from(resp: VerifyResponse) -> Self {
        let mut headers = HeaderMap::new();
        copy_headers_without_hop(&mut headers, &resp.headers);

        Self {
            status: resp.status,
            headers,
            body: resp.body,
        }
    }
}

impl IntoResponse for MirroredResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
