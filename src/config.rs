/*
 * Responsibility
 * - Load settings from the environment (listen port, auth service address, redirect target)
 * - Validate them once at startup (missing or malformed values abort the process)
 * - Normalize both address shapes (AUTH_URL vs AUTH_DOMAIN/AUTH_PORT/AUTH_TLS) into one
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

pub mod domain;

/// Port the authentication service listens on when none is configured.
pub const DEFAULT_AUTH_PORT: u16 = 9091;

const DEFAULT_AUTH_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    InvalidDomain(String),
    InvalidUrl { key: &'static str, reason: String },
    PortConflict { in_domain: u16, explicit: u16 },
    TimeoutOrder { request: Duration, verify: Duration },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::InvalidDomain(domain) => write!(f, "{}: invalid domain", domain),
            ConfigError::InvalidUrl { key, reason } => {
                write!(f, "invalid configuration: {}: {}", key, reason)
            }
            ConfigError::PortConflict {
                in_domain,
                explicit,
            } => write!(
                f,
                "port should only be defined once (AUTH_DOMAIN has {}, AUTH_PORT has {})",
                in_domain, explicit
            ),
            ConfigError::TimeoutOrder { request, verify } => write!(
                f,
                "REQUEST_TIMEOUT_SECONDS ({}s) must be longer than AUTH_TIMEOUT_SECONDS ({}s)",
                request.as_secs(),
                verify.as_secs()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validated address of the authentication service plus the optional
/// static redirect target forwarded as `rd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardAuthSettings {
    pub tls: bool,
    pub domain: String,
    pub port: u16,
    pub redirect_url: Option<Url>,
    pub timeout: Duration,
}

impl ForwardAuthSettings {
    pub fn scheme(&self) -> &'static str {
        if self.tls { "https" } else { "http" }
    }
}

/// Raw, unvalidated auth settings as read from the environment.
#[derive(Debug, Clone, Default)]
pub struct AuthEnv {
    pub url: Option<String>,
    pub domain: Option<String>,
    pub port: Option<String>,
    pub tls: Option<String>,
    pub redirect_url: Option<String>,
    pub timeout_seconds: Option<String>,
}

impl AuthEnv {
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            url: var("AUTH_URL"),
            domain: var("AUTH_DOMAIN"),
            port: var("AUTH_PORT"),
            tls: var("AUTH_TLS"),
            redirect_url: var("AUTH_REDIRECT_URL"),
            timeout_seconds: var("AUTH_TIMEOUT_SECONDS"),
        }
    }

    pub fn resolve(self) -> Result<ForwardAuthSettings, ConfigError> {
        let explicit_port = self
            .port
            .as_deref()
            .map(|p| domain::parse_port("AUTH_PORT", p))
            .transpose()?;

        let (tls, host, port) = match (self.url.as_deref(), self.domain.as_deref()) {
            (Some(url), _) => {
                let (tls, host, port) = parse_base_url(url)?;
                (tls, host, merge_port(port, explicit_port)?)
            }
            (None, Some(domain)) => {
                let (host, port) = domain::split_domain_port(domain)?;
                let tls = parse_bool("AUTH_TLS", self.tls.as_deref())?;
                (tls, host, merge_port(port, explicit_port)?)
            }
            (None, None) => return Err(ConfigError::Missing("AUTH_URL")),
        };

        domain::validate_host(&host)?;

        let redirect_url = self
            .redirect_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
                    key: "AUTH_REDIRECT_URL",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let timeout_seconds = match self.timeout_seconds.as_deref() {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::Invalid("AUTH_TIMEOUT_SECONDS"))?,
            None => DEFAULT_AUTH_TIMEOUT_SECONDS,
        };

        Ok(ForwardAuthSettings {
            tls,
            domain: host,
            port: port.unwrap_or(DEFAULT_AUTH_PORT),
            redirect_url,
            timeout: Duration::from_secs(timeout_seconds),
        })
    }
}

fn merge_port(in_address: Option<u16>, explicit: Option<u16>) -> Result<Option<u16>, ConfigError> {
    match (in_address, explicit) {
        (Some(a), Some(b)) if a != b => Err(ConfigError::PortConflict {
            in_domain: a,
            explicit: b,
        }),
        (a, b) => Ok(a.or(b)),
    }
}

fn parse_bool(key: &'static str, raw: Option<&str>) -> Result<bool, ConfigError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") | Some("off") => Ok(false),
        Some("true") | Some("1") | Some("yes") | Some("on") => Ok(true),
        Some(_) => Err(ConfigError::Invalid(key)),
    }
}

// The url crate drops default ports (`http://auth:80` has no port), so the
// authority is split by hand once the URL is known to be well-formed.
fn parse_base_url(raw: &str) -> Result<(bool, String, Option<u16>), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidUrl {
        key: "AUTH_URL",
        reason: reason.to_string(),
    };

    let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;

    let tls = match url.scheme() {
        "https" => true,
        "http" => false,
        _ => return Err(invalid("scheme must be http or https")),
    };

    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if url.path() != "/" && !url.path().is_empty() {
        return Err(invalid("base URL must not carry a path"));
    }

    let authority = raw
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(raw)
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let authority = authority.rsplit_once('@').map(|(_, a)| a).unwrap_or(authority);

    let (host, port) = domain::split_domain_port(authority)?;
    Ok((tls, host, port))
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub request_timeout: Duration,
    pub forward_auth: ForwardAuthSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_setting("PORT", std::env::var("PORT").ok(), 3000)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let request_timeout_seconds: u64 = parse_setting(
            "REQUEST_TIMEOUT_SECONDS",
            std::env::var("REQUEST_TIMEOUT_SECONDS").ok(),
            DEFAULT_REQUEST_TIMEOUT_SECONDS,
        )?;

        let forward_auth = AuthEnv::from_env().resolve()?;

        let config = Self {
            addr,
            app_env,
            request_timeout: Duration::from_secs(request_timeout_seconds),
            forward_auth,
        };
        config.validate()?;
        Ok(config)
    }

    /// The whole-request timeout must outlast the verification call, or a
    /// slow auth service surfaces as 408 instead of a gateway error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout <= self.forward_auth.timeout {
            return Err(ConfigError::TimeoutOrder {
                request: self.request_timeout,
                verify: self.forward_auth.timeout,
            });
        }
        Ok(())
    }
}

/// Unset or blank => `default`; anything unparsable is rejected.
fn parse_setting<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) => v.parse::<T>().map_err(|_| ConfigError::Invalid(key)),
    }
}
