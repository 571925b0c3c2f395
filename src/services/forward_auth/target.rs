use url::Url;

use crate::config::ForwardAuthSettings;

use super::ForwardAuthError;

pub const VERIFY_PATH: &str = "/api/verify";

/// Query parameter carrying the redirect target.
pub const REDIRECT_PARAM: &str = "rd";

/// `{scheme}://{host}:{port}/api/verify[?rd=...]`, assembled once from the
/// validated settings and reused for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyTarget {
    url: Url,
}

impl VerifyTarget {
    pub fn new(settings: &ForwardAuthSettings) -> Result<Self, ForwardAuthError> {
        let host = if settings.domain.contains(':') {
            format!("[{}]", settings.domain)
        } else {
            settings.domain.clone()
        };

        let raw = format!(
            "{}://{}:{}{}",
            settings.scheme(),
            host,
            settings.port,
            VERIFY_PATH
        );
        let mut url = Url::parse(&raw).map_err(|e| ForwardAuthError::InvalidTarget(e.to_string()))?;

        if let Some(redirect) = &settings.redirect_url {
            url.query_pairs_mut()
                .append_pair(REDIRECT_PARAM, redirect.as_str());
        }

        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}
