//! Error types for myra-dyn
//!
//! Provider-side business rejections are not errors: they are reported as
//! [`UpdateOutcome::Rejected`](crate::traits::UpdateOutcome::Rejected).

use thiserror::Error;

/// Result type alias for myra-dyn operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for myra-dyn
#[derive(Error, Debug)]
pub enum Error {
    /// No public address could be found locally or through the echo service
    #[error("IP discovery failed: {0}")]
    Discovery(String),

    /// Listing the records of a domain failed (transport or malformed response)
    #[error("Failed to fetch records for {domain}: {message}")]
    Fetch {
        /// Domain whose records were requested
        domain: String,
        /// Error message
        message: String,
    },

    /// Sending an update failed before the provider could judge it
    #[error("Failed to update {name} in {domain}: {message}")]
    Update {
        /// Domain the record belongs to
        domain: String,
        /// Record name
        name: String,
        /// Error message
        message: String,
    },

    /// A request could not be built or signed
    #[error("Signing error: {0}")]
    Signing(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a discovery error
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Create a fetch error for a domain
    pub fn fetch(domain: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create an update error for a single record
    pub fn update(
        domain: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Update {
            domain: domain.into(),
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a signing error
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
