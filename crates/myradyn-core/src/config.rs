//! Configuration types for myra-dyn
//!
//! The key names of [`MyraDynConfig`] follow the `config.yml` format users
//! already have (`apikey`, `secret`, `ipdetection`, ...). Loading the file
//! is the binary's job; this module only defines and validates the values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default Myra API host
pub const DEFAULT_API_HOST: &str = "api.myracloud.com";

/// Default API language segment
pub const DEFAULT_LANGUAGE: &str = "en";

/// Records requested per list call
///
/// The API default page is far too small for real domains; only one page
/// is ever fetched.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Default HTTP timeout for every outgoing request
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Main myra-dyn configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct MyraDynConfig {
    /// Myra API key
    #[serde(rename = "apikey")]
    pub api_key: String,

    /// Myra API secret
    /// ⚠️ NEVER log this value
    pub secret: String,

    /// API host, with or without scheme
    #[serde(default = "default_host")]
    pub host: String,

    /// Language segment of the API path
    #[serde(default = "default_language")]
    pub language: String,

    /// Echo service queried when no interface carries a public address
    #[serde(rename = "ipdetection")]
    pub ip_detection: String,

    /// Only scan this network interface (all interfaces when absent)
    #[serde(default)]
    pub interface: Option<String>,

    /// Records requested in the single list call per domain
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Upper bound on in-flight updates (unbounded when absent)
    #[serde(default)]
    pub max_concurrent_updates: Option<usize>,

    /// HTTP timeout applied to the echo and API clients (in seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Log update payloads instead of sending them
    #[serde(default)]
    pub dry_run: bool,
}

// Hides the secret
impl fmt::Debug for MyraDynConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MyraDynConfig")
            .field("api_key", &self.api_key)
            .field("secret", &"<REDACTED>")
            .field("host", &self.host)
            .field("language", &self.language)
            .field("ip_detection", &self.ip_detection)
            .field("interface", &self.interface)
            .field("page_size", &self.page_size)
            .field("max_concurrent_updates", &self.max_concurrent_updates)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl MyraDynConfig {
    /// Create a configuration with defaults for everything but credentials
    /// and the echo service
    pub fn new(
        api_key: impl Into<String>,
        secret: impl Into<String>,
        ip_detection: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            host: default_host(),
            language: default_language(),
            ip_detection: ip_detection.into(),
            interface: None,
            page_size: default_page_size(),
            max_concurrent_updates: None,
            http_timeout_secs: default_http_timeout_secs(),
            dry_run: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.trim().is_empty() {
            return Err(crate::Error::config("apikey cannot be empty"));
        }
        if self.secret.trim().is_empty() {
            return Err(crate::Error::config("secret cannot be empty"));
        }
        if self.api_key == "ADD_YOUR_API_KEY" || self.secret == "ADD_YOUR_SECRET" {
            return Err(crate::Error::config(
                "apikey/secret still hold the placeholder values from the sample config.yml",
            ));
        }

        if self.host.trim().is_empty() {
            return Err(crate::Error::config("host cannot be empty"));
        }

        if self.language.len() != 2 || !self.language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(crate::Error::config(format!(
                "language must be a two-letter code, got '{}'",
                self.language
            )));
        }

        if self.ip_detection.is_empty() {
            return Err(crate::Error::config("ipdetection URL cannot be empty"));
        }
        if !self.ip_detection.starts_with("https://") && !self.ip_detection.starts_with("http://")
        {
            return Err(crate::Error::config(format!(
                "ipdetection must use HTTP or HTTPS scheme. Got: {}",
                self.ip_detection
            )));
        }

        if self.http_timeout_secs == 0 {
            return Err(crate::Error::config("http_timeout_secs must be > 0"));
        }

        self.engine().validate()
    }

    /// Engine settings taken from this configuration
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            page_size: self.page_size,
            max_concurrent_updates: self.max_concurrent_updates,
        }
    }

    /// HTTP timeout as a [`Duration`]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Records requested in the single list call per domain
    pub page_size: usize,

    /// Upper bound on in-flight updates
    ///
    /// `None` dispatches every qualifying record at once.
    pub max_concurrent_updates: Option<usize>,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.page_size == 0 {
            return Err(crate::Error::config("page_size must be > 0"));
        }
        if self.max_concurrent_updates == Some(0) {
            return Err(crate::Error::config(
                "max_concurrent_updates must be > 0 when set",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_concurrent_updates: None,
        }
    }
}

fn default_host() -> String {
    DEFAULT_API_HOST.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
