use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Bearer credential handed to the client explicitly by the composition root.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Returns `None` for a blank token.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Clone, Debug)]
pub struct AssessmentClientConfig {
    pub base_url: Url,
    pub credentials: Option<AccessToken>,
    pub timeout: Duration,
}

/// Parse and check a service base URL. Only absolute `http`/`https` URLs
/// that can carry path segments are accepted.
///
/// # Errors
///
/// Returns `ConfigError::InvalidBaseUrl` when the value is not such a URL.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        raw: raw.to_owned(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

impl AssessmentClientConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            credentials: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` for an unusable base URL.
    pub fn parse(base_url: &str) -> Result<Self, ConfigError> {
        parse_base_url(base_url).map(Self::new)
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<AccessToken>) -> Self {
        self.credentials = credentials;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `CAMPUS_API_BASE_URL`, `CAMPUS_API_TOKEN` and
    /// `CAMPUS_API_TIMEOUT_SECS`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if `CAMPUS_API_BASE_URL` is set
    /// to something that is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("CAMPUS_API_BASE_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let credentials = lookup("CAMPUS_API_TOKEN").and_then(AccessToken::new);
        let timeout = lookup("CAMPUS_API_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);
        Ok(Self::parse(&base_url)?
            .with_credentials(credentials)
            .with_timeout(timeout))
    }

    /// Base URL extended by `segments`, each percent-encoded as one path
    /// segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        // Only fails for cannot-be-a-base URLs, which `parse_base_url` rejects.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
