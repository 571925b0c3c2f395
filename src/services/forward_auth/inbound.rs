//! Read-only view of the inbound request.
//!
//! The exchange never touches axum's request type directly; it only needs
//! the handful of facts exposed by [`InboundRequest`].

use axum::extract::{ConnectInfo, OriginalUri};
use axum::http::{HeaderMap, Request, header};
use std::net::SocketAddr;

/// Capabilities the forward-auth exchange needs from an inbound request.
pub trait InboundRequest {
    fn headers(&self) -> &HeaderMap;

    fn method(&self) -> &str;

    /// Host the client addressed (`:authority` or `Host`).
    fn host(&self) -> Option<String>;

    /// Raw request-target (path and query) as the client sent it.
    fn request_uri(&self) -> String;

    /// Peer address as `host:port`.
    fn remote_addr(&self) -> Option<String>;

    fn is_tls(&self) -> bool;
}

/// Request extension set by a TLS-terminating host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionTls(pub bool);

/// Adapter over an axum request.
pub struct HttpInbound<'a, B> {
    req: &'a Request<B>,
}

impl<'a, B> HttpInbound<'a, B> {
    pub fn new(req: &'a Request<B>) -> Self {
        Self { req }
    }
}

impl<B> InboundRequest for HttpInbound<'_, B> {
    fn headers(&self) -> &HeaderMap {
        self.req.headers()
    }

    fn method(&self) -> &str {
        self.req.method().as_str()
    }

    fn host(&self) -> Option<String> {
        if let Some(authority) = self.req.uri().authority() {
            return Some(authority.as_str().to_string());
        }
        self.req
            .headers()
            .get(header::HOST)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
    }

    fn request_uri(&self) -> String {
        // Nested routers rewrite the URI; the original one is what the client sent.
        let uri = self
            .req
            .extensions()
            .get::<OriginalUri>()
            .map(|OriginalUri(uri)| uri)
            .unwrap_or_else(|| self.req.uri());

        uri.path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default()
    }

    fn remote_addr(&self) -> Option<String> {
        self.req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
    }

    fn is_tls(&self) -> bool {
        self.req
            .extensions()
            .get::<ConnectionTls>()
            .is_some_and(|ConnectionTls(tls)| *tls)
    }
}

/// Owned inbound request facts, for callers that are not an axum request.
#[derive(Debug, Clone, Default)]
pub struct StaticInbound {
    pub headers: HeaderMap,
    pub method: String,
    pub host: Option<String>,
    pub request_uri: String,
    pub remote_addr: Option<String>,
    pub tls: bool,
}

impl InboundRequest for StaticInbound {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn host(&self) -> Option<String> {
        self.host.clone()
    }

    fn request_uri(&self) -> String {
        self.request_uri.clone()
    }

    fn remote_addr(&self) -> Option<String> {
        self.remote_addr.clone()
    }

    fn is_tls(&self) -> bool {
        self.tls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderValue;

    #[test]
    fn reads_facts_from_axum_request() {
        let mut req = Request::builder()
            .method("POST")
            .uri("/inner?q=1")
            .header(header::HOST, "app.example.com")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(OriginalUri("/api/v1/inner?q=1".parse().unwrap()));
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 7], 51000))));
        req.extensions_mut().insert(ConnectionTls(true));

        let inbound = HttpInbound::new(&req);
        assert_eq!(inbound.method(), "POST");
        assert_eq!(inbound.host().as_deref(), Some("app.example.com"));
        assert_eq!(inbound.request_uri(), "/api/v1/inner?q=1");
        assert_eq!(inbound.remote_addr().as_deref(), Some("10.0.0.7:51000"));
        assert!(inbound.is_tls());
    }

    #[test]
    fn utf8_host_header_is_read() {
        let req = Request::builder()
            .uri("/")
            .header(header::HOST, HeaderValue::from_bytes("bücher.example".as_bytes()).unwrap())
            .body(Body::empty())
            .unwrap();

        assert_eq!(HttpInbound::new(&req).host().as_deref(), Some("bücher.example"));
    }

    #[test]
    fn defaults_without_extensions() {
        let req = Request::builder()
            .uri("http://app.example.com:8080/x")
            .body(Body::empty())
            .unwrap();

        let inbound = HttpInbound::new(&req);
        assert_eq!(inbound.host().as_deref(), Some("app.example.com:8080"));
        assert_eq!(inbound.request_uri(), "/x");
        assert_eq!(inbound.remote_addr(), None);
        assert!(!inbound.is_tls());
    }
}
