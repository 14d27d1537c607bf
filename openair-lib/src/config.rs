//! Connection settings and credentials

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Connection settings and session credentials for the OpenAir XML API.
///
/// A `Config` is built once and never mutated afterwards; the client shares
/// it read-only between concurrent enumerations.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use openair_lib::Config;
///
/// let config = Config::new("api-key", "Acme", "jdoe", "secret")
///     .domain("acme.app.openair.com")
///     .retry_delay(Duration::from_millis(250));
///
/// assert_eq!(config.endpoint().unwrap().as_str(), "https://acme.app.openair.com/api.pl");
/// ```
#[derive(Clone)]
pub struct Config {
    pub(crate) scheme: String,
    pub(crate) domain: String,
    pub(crate) key: String,
    pub(crate) namespace: String,
    pub(crate) company: String,
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) retry_delay: Duration,
}

impl Config {
    /// Default URL scheme.
    pub const DEFAULT_SCHEME: &'static str = "https";
    /// Default API host.
    pub const DEFAULT_DOMAIN: &'static str = "sandbox.openair.com";
    /// Default API namespace.
    pub const DEFAULT_NAMESPACE: &'static str = "default";
    /// Default base retry delay.
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

    /// Creates a config with the required credentials and default settings.
    pub fn new(
        key: impl Into<String>,
        company: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            scheme: Self::DEFAULT_SCHEME.to_string(),
            domain: Self::DEFAULT_DOMAIN.to_string(),
            key: key.into(),
            namespace: Self::DEFAULT_NAMESPACE.to_string(),
            company: company.into(),
            user: user.into(),
            password: password.into(),
            retry_delay: Self::DEFAULT_RETRY_DELAY,
        }
    }

    /// Loads the config from `OPENAIR_*` environment variables.
    ///
    /// `OPENAIR_KEY`, `OPENAIR_COMPANY`, `OPENAIR_USER` and `OPENAIR_PASSWORD`
    /// are required. `OPENAIR_SCHEME`, `OPENAIR_DOMAIN`, `OPENAIR_NAMESPACE`
    /// and `OPENAIR_RETRYDELAY` (milliseconds) fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::Missing(name.to_string()))
        };

        let mut config = Self::new(
            required("OPENAIR_KEY")?,
            required("OPENAIR_COMPANY")?,
            required("OPENAIR_USER")?,
            required("OPENAIR_PASSWORD")?,
        );

        if let Some(scheme) = lookup("OPENAIR_SCHEME") {
            config.scheme = scheme;
        }
        if let Some(domain) = lookup("OPENAIR_DOMAIN") {
            config.domain = domain;
        }
        if let Some(namespace) = lookup("OPENAIR_NAMESPACE") {
            config.namespace = namespace;
        }
        if let Some(delay) = lookup("OPENAIR_RETRYDELAY") {
            let millis: u64 = delay.trim().parse().map_err(|e| ConfigError::Invalid {
                var: "OPENAIR_RETRYDELAY".to_string(),
                message: format!("{e}"),
            })?;
            config.retry_delay = Duration::from_millis(millis);
        }

        Ok(config)
    }

    /// Sets the URL scheme.
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets the API host.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Sets the API namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the base delay between retries.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Returns the API endpoint, `{scheme}://{domain}/api.pl`.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let raw = format!("{}://{}/api.pl", self.scheme, self.domain);
        Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(format!("{raw}: {e}")))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("scheme", &self.scheme)
            .field("domain", &self.domain)
            .field("key", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("company", &self.company)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("OPENAIR_KEY", "k"),
        ("OPENAIR_COMPANY", "c"),
        ("OPENAIR_USER", "u"),
        ("OPENAIR_PASSWORD", "p"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.scheme, "https");
        assert_eq!(config.domain, "sandbox.openair.com");
        assert_eq!(config.namespace, "default");
        assert_eq!(config.retry_delay, Duration::from_millis(100));
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "https://sandbox.openair.com/api.pl"
        );
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("OPENAIR_DOMAIN", "acme.app.openair.com"));
        pairs.push(("OPENAIR_NAMESPACE", "acme"));
        pairs.push(("OPENAIR_RETRYDELAY", "5"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.domain, "acme.app.openair.com");
        assert_eq!(config.namespace, "acme");
        assert_eq!(config.retry_delay, Duration::from_millis(5));
    }

    #[test]
    fn test_missing_required() {
        let err = Config::from_lookup(lookup(&REQUIRED[..3])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("OPENAIR_PASSWORD".to_string()));
    }

    #[test]
    fn test_invalid_delay() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("OPENAIR_RETRYDELAY", "soon"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "OPENAIR_RETRYDELAY"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::new("top-key", "c", "u", "hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("top-key"));
        assert!(!debug.contains("hunter2"));
    }
}
