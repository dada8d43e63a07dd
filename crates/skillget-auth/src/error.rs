//! Error types for the auth crate.
//!
//! Every login failure surfaces as an [`AuthError`].  The three terminal
//! outcomes of polling (expired, denied, timed out) have their own variants so
//! the command line can print a precise message.

/// Unified error type for registry authentication.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The device code expired before the user approved it.
    #[error("authentication expired")]
    Expired,

    /// The user rejected the authorization request.
    #[error("authentication denied")]
    Denied,

    /// The local deadline passed while polling.
    #[error("authentication timed out after {timeout_secs} seconds")]
    TimedOut {
        /// How long we polled before giving up.
        timeout_secs: u64,
    },

    /// The registry refused to start a device flow.
    #[error("failed to initiate authentication: {reason}")]
    FlowFailed {
        /// Message from the registry, or a description of the bad response.
        reason: String,
    },

    /// An HTTP request to the registry failed.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
