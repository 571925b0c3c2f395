//! Host / port parsing helpers for the authentication service address.
//!
//! Accepts the `host`, `host:port` and `[v6]:port` spellings and checks
//! that the host is either a DNS name or an IP literal.

use std::net::IpAddr;

use super::ConfigError;

/// Parse a non-zero TCP port.
pub fn parse_port(key: &'static str, s: &str) -> Result<u16, ConfigError> {
    match s.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ConfigError::Invalid(key)),
        Ok(port) => Ok(port),
    }
}

/// Split `host[:port]` into its parts. The port is `None` when not given.
pub fn split_domain_port(s: &str) -> Result<(String, Option<u16>), ConfigError> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| ConfigError::InvalidDomain(s.to_string()))?;
        return match tail {
            "" => Ok((host.to_string(), None)),
            _ => {
                let port = tail
                    .strip_prefix(':')
                    .ok_or_else(|| ConfigError::InvalidDomain(s.to_string()))?;
                Ok((host.to_string(), Some(parse_port("AUTH_DOMAIN", port)?)))
            }
        };
    }

    match s.split_once(':') {
        None => Ok((s.to_string(), None)),
        Some((host, port)) => Ok((host.to_string(), Some(parse_port("AUTH_DOMAIN", port)?))),
    }
}

/// Accept DNS names and IP literals.
pub fn validate_host(host: &str) -> Result<(), ConfigError> {
    if host.parse::<IpAddr>().is_ok() || is_domain_name(host) {
        Ok(())
    } else {
        Err(ConfigError::InvalidDomain(host.to_string()))
    }
}

/// RFC 1035 label rules, loosened to accept `_` (seen in SRV-style names)
/// and requiring at least one non-numeric character so that dotted
/// numbers which are not valid IPs are rejected.
pub fn is_domain_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    let len = bytes.len();
    if len == 0 || len > 254 || (len == 254 && bytes[len - 1] != b'.') {
        return false;
    }

    let mut last = b'.';
    let mut non_numeric = false;
    let mut label_len = 0usize;

    for &c in bytes {
        match c {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                non_numeric = true;
                label_len += 1;
            }
            b'0'..=b'9' => label_len += 1,
            b'-' => {
                if last == b'.' {
                    return false;
                }
                non_numeric = true;
                label_len += 1;
            }
            b'.' => {
                if last == b'.' || last == b'-' || label_len == 0 || label_len > 63 {
                    return false;
                }
                label_len = 0;
            }
            _ => return false,
        }
        last = c;
    }

    last != b'-' && label_len <= 63 && non_numeric
}
