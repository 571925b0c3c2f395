/*
 * Responsibility
 * - Identity facts asserted by the authentication service (user/groups required, email/name optional)
 * - Per-request variable namespace read by later pipeline stages
 */
use std::collections::BTreeMap;

use axum::http::{HeaderMap, HeaderName};
use serde::Serialize;

use super::headers::{REMOTE_EMAIL, REMOTE_GROUPS, REMOTE_NAME, REMOTE_USER};

pub const USER_ID_VAR: &str = "auth.user.id";
pub const USER_GROUPS_VAR: &str = "auth.user.groups";
pub const USER_EMAIL_VAR: &str = "auth.user.email";
pub const USER_NAME_VAR: &str = "auth.user.name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user: String,
    pub groups: String,
    pub email: String,
    pub name: String,
}

// Values are decoded from raw bytes: names like `José` arrive as UTF-8,
// which `HeaderValue::to_str` refuses. Only an absent or empty value counts
// as missing.
fn header_str(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .filter(|s| !s.is_empty())
}

impl Identity {
    /// `None` unless both `Remote-User` and `Remote-Groups` are non-empty.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let user = header_str(headers, &REMOTE_USER)?;
        let groups = header_str(headers, &REMOTE_GROUPS)?;

        Some(Self {
            user,
            groups,
            email: header_str(headers, &REMOTE_EMAIL).unwrap_or_default(),
            name: header_str(headers, &REMOTE_NAME).unwrap_or_default(),
        })
    }

    pub fn apply_to(&self, vars: &mut RequestVars) {
        vars.set(USER_ID_VAR, &self.user);
        vars.set(USER_GROUPS_VAR, &self.groups);
        vars.set(USER_EMAIL_VAR, &self.email);
        vars.set(USER_NAME_VAR, &self.name);
    }
}

/// String variables scoped to a single request, carried in the request
/// extensions. Dropped with the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestVars(BTreeMap<String, String>);

impl RequestVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn optional_fields_default_to_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(REMOTE_USER, HeaderValue::from_static("alice"));
        headers.insert(REMOTE_GROUPS, HeaderValue::from_static("admins,dev"));
        headers.insert(REMOTE_EMAIL, HeaderValue::from_static("alice@example.com"));

        let identity = Identity::from_headers(&headers).unwrap();
        assert_eq!(identity.email, "alice@example.com");
        assert_eq!(identity.name, "");
    }

    #[test]
    fn missing_groups_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(REMOTE_USER, HeaderValue::from_static("alice"));
        assert_eq!(Identity::from_headers(&headers), None);
    }

    #[test]
    fn non_ascii_values_are_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(REMOTE_USER, HeaderValue::from_bytes("josé".as_bytes()).unwrap());
        headers.insert(REMOTE_GROUPS, HeaderValue::from_static("admins"));
        headers.insert(
            REMOTE_NAME,
            HeaderValue::from_bytes("José Pérez".as_bytes()).unwrap(),
        );

        let identity = Identity::from_headers(&headers).unwrap();
        assert_eq!(identity.user, "josé");
        assert_eq!(identity.name, "José Pérez");
    }

    #[test]
    fn empty_user_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(REMOTE_USER, HeaderValue::from_static(""));
        headers.insert(REMOTE_GROUPS, HeaderValue::from_static("admins"));
        assert_eq!(Identity::from_headers(&headers), None);
    }

    #[test]
    fn apply_sets_all_four_vars() {
        let identity = Identity {
            user: "alice".into(),
            groups: "admins".into(),
            email: String::new(),
            name: "Alice".into(),
        };

        let mut vars = RequestVars::new();
        assert!(vars.is_empty());
        vars.set("upstream.stage", "kept");
        identity.apply_to(&mut vars);

        assert_eq!(vars.len(), 5);
        assert_eq!(vars.get(USER_ID_VAR), Some("alice"));
        assert_eq!(vars.get(USER_GROUPS_VAR), Some("admins"));
        assert_eq!(vars.get(USER_EMAIL_VAR), Some(""));
        assert_eq!(vars.get(USER_NAME_VAR), Some("Alice"));
        assert_eq!(vars.get("upstream.stage"), Some("kept"));
    }
}
