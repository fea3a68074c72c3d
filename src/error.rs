//! Error handling for the boxinfo status aggregator.

/// A specialized `Result` type for boxinfo operations.
pub type Result<T> = std::result::Result<T, SystemError>;

/// The main error type for fact providers and the aggregator.
///
/// None of these ever escape [`SnapshotAggregator::snapshot`](crate::SnapshotAggregator::snapshot):
/// host provider errors become sentinel values and session errors end up in
/// the snapshot's `EX` slot.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A fact source could not be queried
    #[error("{provider} unavailable: {reason}")]
    ProviderUnavailable {
        provider: &'static str,
        reason: String,
    },

    /// Provider data was malformed
    #[error("Failed to parse system information: {0}")]
    ParseFailure(String),

    /// Failure while correlating session facts (streams, recordings, live service)
    #[error("Session correlation failed: {0}")]
    SessionCorrelation(String),

    /// Host name resolution failed
    #[error("Could not resolve {host}: {reason}")]
    Resolution { host: String, reason: String },

    /// A provider exceeded its time budget
    #[error("{provider} timed out after {timeout_ms}ms")]
    Timeout {
        provider: &'static str,
        timeout_ms: u64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SystemError {
    /// Create a new provider-unavailable error
    pub fn unavailable(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider,
            reason: reason.into(),
        }
    }

    /// Create a new parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::ParseFailure(msg.into())
    }

    /// Create a new session correlation error
    pub fn session_error(msg: impl Into<String>) -> Self {
        Self::SessionCorrelation(msg.into())
    }

    /// Create a new resolution error
    pub fn resolution_error(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
