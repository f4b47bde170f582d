//! Error types for the DDNS reconciler
//!
//! Every failure in a run is fatal: errors propagate to the binary,
//! which maps them to an exit code. There is no retry inside a run.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS reconciler
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing or malformed fields)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external IP could not be determined
    #[error("IP resolution error: {0}")]
    IpResolution(String),

    /// Listing the zone's records failed
    #[error("Failed to list records of zone {zone}: {source}")]
    ZoneRead {
        /// Managed zone name
        zone: String,
        /// Underlying collaborator error
        #[source]
        source: Box<Error>,
    },

    /// Submitting the batched change failed (zone left untouched)
    #[error("Failed to apply change to zone {zone}: {source}")]
    ZoneWrite {
        /// Managed zone name
        zone: String,
        /// Underlying collaborator error
        #[source]
        source: Box<Error>,
    },

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors (transport level)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Zone or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IP resolution error
    pub fn ip_resolution(msg: impl Into<String>) -> Self {
        Self::IpResolution(msg.into())
    }

    /// Wrap a collaborator error raised while listing records
    pub fn zone_read(zone: impl Into<String>, source: Error) -> Self {
        Self::ZoneRead {
            zone: zone.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a collaborator error raised while applying a change
    pub fn zone_write(zone: impl Into<String>, source: Error) -> Self {
        Self::ZoneWrite {
            zone: zone.into(),
            source: Box::new(source),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error happened before any network call was made
    ///
    /// The binary uses this to pick its exit code.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
