//! Client configuration.
//!
//! Values normally come from the environment of the test process, mirroring
//! how the integration suites receive their credentials. Every value has a
//! default suitable for a locally running API server.

use std::env;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::errors::{Error, Result};
use crate::fixtures::TEMPLATE_REPOSITORY_URL;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Default base URL of the template API server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:9090";

const DEFAULT_SHORT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MED_TIMEOUT_SECS: u64 = 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Named timeout budgets handed to lifecycle hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutBudgets {
    /// Budget for a single fetch or restore.
    pub short: Duration,
    /// Budget for hooks that fetch and then reset the repository set.
    pub med: Duration,
}

impl Default for TimeoutBudgets {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(DEFAULT_SHORT_TIMEOUT_SECS),
            med: Duration::from_secs(DEFAULT_MED_TIMEOUT_SECS),
        }
    }
}

/// Configuration for [`crate::TemplateApiClient`].
#[derive(Debug)]
pub struct ClientConfig {
    /// Base URL of the template API server. Any path on it, such as the
    /// `/pfe` in `http://host/pfe`, is kept as a prefix of every endpoint.
    pub base_url: Url,
    /// Cookie value sent with every admin request. Empty means no cookie.
    pub admin_cookie: SecretString,
    /// Location of the remote template index.
    pub index_url: Url,
    /// Hook timeout budgets.
    pub timeouts: TimeoutBudgets,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the given server with default settings.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_url("base URL", base_url)?,
            admin_cookie: SecretString::from(String::new()),
            index_url: parse_url("index URL", TEMPLATE_REPOSITORY_URL)?,
            timeouts: TimeoutBudgets::default(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Recognised variables:
    /// - `TEMPLATE_API_BASE_URL`: API server (default `http://localhost:9090`)
    /// - `ADMIN_COOKIE`: cookie value for admin requests
    /// - `TEMPLATE_INDEX_URL`: remote template index
    /// - `TEST_TIMEOUT_SHORT_SECS` / `TEST_TIMEOUT_MED_SECS`: hook budgets
    /// - `TEST_HTTP_TIMEOUT_SECS`: per-request timeout
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url =
            lookup("TEMPLATE_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;

        if let Some(cookie) = lookup("ADMIN_COOKIE") {
            config.admin_cookie = SecretString::from(cookie);
        }
        if let Some(index_url) = lookup("TEMPLATE_INDEX_URL") {
            config.index_url = parse_url("TEMPLATE_INDEX_URL", &index_url)?;
        }

        config.timeouts = TimeoutBudgets {
            short: parse_secs(
                "TEST_TIMEOUT_SHORT_SECS",
                lookup("TEST_TIMEOUT_SHORT_SECS"),
                DEFAULT_SHORT_TIMEOUT_SECS,
            )?,
            med: parse_secs(
                "TEST_TIMEOUT_MED_SECS",
                lookup("TEST_TIMEOUT_MED_SECS"),
                DEFAULT_MED_TIMEOUT_SECS,
            )?,
        };
        config.http_timeout = parse_secs(
            "TEST_HTTP_TIMEOUT_SECS",
            lookup("TEST_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        Ok(config)
    }

    /// Set the admin cookie value.
    pub fn with_admin_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.admin_cookie = SecretString::from(cookie.into());
        self
    }

    /// Point the index fetch at a different location.
    pub fn with_index_url(mut self, index_url: &str) -> Result<Self> {
        self.index_url = parse_url("index URL", index_url)?;
        Ok(self)
    }

    /// Replace the hook timeout budgets.
    pub fn with_timeouts(mut self, timeouts: TimeoutBudgets) -> Self {
        self.timeouts = timeouts;
        self
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url> {
    Url::parse(value)
        .map_err(|e| Error::Configuration(format!("{name} '{value}' is not a valid URL: {e}")))
}

fn parse_secs(name: &str, value: Option<String>, default: u64) -> Result<Duration> {
    match value {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| Error::Configuration(format!("{name} must be a whole number of seconds"))),
    }
}
