//! Property tests for header propagation onto the verification request.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use forward_auth_edge::services::forward_auth::StaticInbound;
use forward_auth_edge::services::forward_auth::headers::{
    HOP_HEADERS, X_FORWARDED_FOR, assign_forward_headers, is_hop_header,
};
use proptest::prelude::*;

// Strategy: generic header names that no forwarding rule rewrites
fn arb_generic_name() -> impl Strategy<Value = HeaderName> {
    prop::string::string_regex("x-[a-z]{1,8}")
        .unwrap()
        .prop_map(|s| HeaderName::from_bytes(s.as_bytes()).unwrap())
}

// Strategy: any of the hop-by-hop names
fn arb_hop_name() -> impl Strategy<Value = HeaderName> {
    (0..HOP_HEADERS.len()).prop_map(|i| HOP_HEADERS[i].clone())
}

fn arb_value() -> impl Strategy<Value = HeaderValue> {
    prop::string::string_regex("[a-zA-Z0-9=;/ ]{0,16}")
        .unwrap()
        .prop_map(|s| HeaderValue::from_str(&s).unwrap())
}

fn arb_headers() -> impl Strategy<Value = Vec<(HeaderName, HeaderValue)>> {
    prop::collection::vec(
        (prop_oneof![3 => arb_generic_name(), 1 => arb_hop_name()], arb_value()),
        0..12,
    )
}

fn inbound_with(headers: &[(HeaderName, HeaderValue)], remote_addr: Option<String>) -> StaticInbound {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.append(name.clone(), value.clone());
    }
    StaticInbound {
        headers: map,
        method: "GET".into(),
        host: Some("app.example.com".into()),
        request_uri: "/".into(),
        remote_addr,
        tls: false,
    }
}

proptest! {
    /// Property: every value of a non-hop header survives, in order
    #[test]
    fn proptest_generic_values_are_preserved(headers in arb_headers()) {
        let inbound = inbound_with(&headers, Some("10.0.0.1:1234".into()));
        let mut dst = HeaderMap::new();
        assign_forward_headers(&inbound, &mut dst);

        for name in inbound.headers.keys().filter(|n| !is_hop_header(n)) {
            let expected: Vec<_> = inbound.headers.get_all(name).iter().collect();
            let actual: Vec<_> = dst.get_all(name).iter().collect();
            prop_assert_eq!(expected, actual);
        }
    }

    /// Property: hop-by-hop headers never reach the verification request
    #[test]
    fn proptest_hop_headers_never_forwarded(headers in arb_headers()) {
        let inbound = inbound_with(&headers, None);
        let mut dst = HeaderMap::new();
        assign_forward_headers(&inbound, &mut dst);

        for name in HOP_HEADERS.iter() {
            prop_assert!(!dst.contains_key(name));
        }
    }

    /// Property: X-Forwarded-For is the prior chain plus the peer host
    #[test]
    fn proptest_forwarded_for_ends_with_peer(
        priors in prop::collection::vec("[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}", 0..4),
        octet in 1u8..255,
        port in 1u16..,
    ) {
        let headers: Vec<_> = priors
            .iter()
            .map(|p| (X_FORWARDED_FOR, HeaderValue::from_str(p).unwrap()))
            .collect();
        let peer = format!("192.0.2.{octet}");
        let inbound = inbound_with(&headers, Some(format!("{peer}:{port}")));

        let mut dst = HeaderMap::new();
        assign_forward_headers(&inbound, &mut dst);

        let mut expected = priors.clone();
        expected.push(peer);
        let values: Vec<_> = dst.get_all(X_FORWARDED_FOR).iter().collect();
        prop_assert_eq!(values.len(), 1);
        prop_assert_eq!(values[0].to_str().unwrap(), expected.join(", "));
    }
}
