//! Header propagation between the inbound request and the verification
//! request, and between the verification response and a mirrored denial.
//!
//! Every rule here is pure: it reads one header map (plus a few facts
//! about the inbound connection) and edits another in place.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use super::inbound::InboundRequest;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_METHOD: HeaderName = HeaderName::from_static("x-forwarded-method");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_FORWARDED_PORT: HeaderName = HeaderName::from_static("x-forwarded-port");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_URI: HeaderName = HeaderName::from_static("x-forwarded-uri");

pub const REMOTE_USER: HeaderName = HeaderName::from_static("remote-user");
pub const REMOTE_GROUPS: HeaderName = HeaderName::from_static("remote-groups");
pub const REMOTE_EMAIL: HeaderName = HeaderName::from_static("remote-email");
pub const REMOTE_NAME: HeaderName = HeaderName::from_static("remote-name");

/// Headers that only describe a single transport hop and never cross a
/// proxy boundary.
pub static HOP_HEADERS: [HeaderName; 9] = [
    HeaderName::from_static("connection"),
    HeaderName::from_static("proxy-connection"),
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-authenticate"),
    HeaderName::from_static("proxy-authorization"),
    HeaderName::from_static("te"),
    HeaderName::from_static("trailer"),
    HeaderName::from_static("transfer-encoding"),
    HeaderName::from_static("upgrade"),
];

pub fn is_hop_header(name: &HeaderName) -> bool {
    HOP_HEADERS.contains(name)
}

/// Append every value of `src` to `dst`. Existing values in `dst` are kept.
pub fn copy_headers(dst: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src {
        dst.append(name.clone(), value.clone());
    }
}

pub fn remove_headers<'a>(headers: &mut HeaderMap, names: impl IntoIterator<Item = &'a HeaderName>) {
    for name in names {
        headers.remove(name);
    }
}

pub fn copy_headers_without_hop(dst: &mut HeaderMap, src: &HeaderMap) {
    copy_headers(dst, src);
    remove_headers(dst, HOP_HEADERS.iter());
}

/// First value of `name`, if it is non-empty.
fn first_non_empty<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a HeaderValue> {
    headers.get(name).filter(|v| !v.is_empty())
}

/// Set `name` to `value`, or delete it when `value` is unusable.
fn set_or_delete(dst: &mut HeaderMap, name: HeaderName, value: Option<HeaderValue>) {
    match value {
        Some(value) => {
            dst.insert(name, value);
        }
        None => {
            dst.remove(name);
        }
    }
}

// `from_bytes` admits obs-text (bytes >= 0x80), so a UTF-8 host survives;
// only control characters make a value unusable.
fn value_from_str(s: &str) -> Option<HeaderValue> {
    if s.is_empty() {
        return None;
    }
    HeaderValue::from_bytes(s.as_bytes()).ok()
}

/// Populate the verification request headers from the inbound request.
///
/// Generic headers are appended, hop-by-hop headers are dropped, then the
/// `X-Forwarded-*` family is recomputed so the authentication service sees
/// the client-facing coordinates of the original request.
pub fn assign_forward_headers<R: InboundRequest + ?Sized>(inbound: &R, dst: &mut HeaderMap) {
    let src = inbound.headers();
    copy_headers_without_hop(dst, src);

    let remote_addr = inbound.remote_addr();
    if let Some((client_ip, _)) = remote_addr.as_deref().and_then(split_host_port) {
        if let Some(value) = forwarded_for(src, client_ip) {
            dst.insert(X_FORWARDED_FOR, value);
        }
    }

    let method = first_non_empty(src, &X_FORWARDED_METHOD)
        .cloned()
        .or_else(|| value_from_str(inbound.method()));
    set_or_delete(dst, X_FORWARDED_METHOD, method);

    let proto = first_non_empty(src, &X_FORWARDED_PROTO)
        .cloned()
        .unwrap_or_else(|| {
            if inbound.is_tls() {
                HeaderValue::from_static("https")
            } else {
                HeaderValue::from_static("http")
            }
        });
    dst.insert(X_FORWARDED_PROTO, proto);

    if let Some(port) = first_non_empty(src, &X_FORWARDED_PORT) {
        dst.insert(X_FORWARDED_PORT, port.clone());
    }

    let host = first_non_empty(src, &X_FORWARDED_HOST)
        .cloned()
        .or_else(|| inbound.host().as_deref().and_then(value_from_str));
    set_or_delete(dst, X_FORWARDED_HOST, host);

    let uri = first_non_empty(src, &X_FORWARDED_URI)
        .cloned()
        .or_else(|| value_from_str(&inbound.request_uri()));
    set_or_delete(dst, X_FORWARDED_URI, uri);
}

/// `prior, prior, client_ip`, or just `client_ip` without prior values.
fn forwarded_for(src: &HeaderMap, client_ip: &str) -> Option<HeaderValue> {
    let mut joined: Vec<u8> = Vec::new();
    for prior in src.get_all(&X_FORWARDED_FOR) {
        joined.extend_from_slice(prior.as_bytes());
        joined.extend_from_slice(b", ");
    }
    joined.extend_from_slice(client_ip.as_bytes());
    HeaderValue::from_bytes(&joined).ok()
}

/// Split `host:port` or `[host]:port`. Returns `None` when there is no port.
pub fn split_host_port(addr: &str) -> Option<(&str, &str)> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        let port = tail.strip_prefix(':')?;
        return Some((host, port));
    }

    let (host, port) = addr.rsplit_once(':')?;
    // An unbracketed IPv6 address has more than one colon.
    if host.contains(':') {
        return None;
    }
    Some((host, port))
}
