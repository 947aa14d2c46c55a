//! Client error taxonomy.

use thiserror::Error;

use formvault_core::ChannelError;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced to callers of the credential operations.
///
/// None of these are fatal to the engine: a failed call leaves the
/// channel reusable for subsequent calls, and nothing is retried
/// silently.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The daemon replied `ERROR`. The payload is opaque and surfaced
    /// verbatim for the UI to render.
    #[error("Daemon error: {0}")]
    Remote(serde_json::Value),

    /// The channel failed to deliver or receive.
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// An inbound message arrived where the protocol state machine did
    /// not expect one.
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// No reply arrived within the configured call timeout.
    #[error("Request timed out")]
    Timeout,

    /// A rename `update` wrote the record under its new key but failed
    /// to remove the old one. No data was lost; the caller should retry
    /// removing `old_key`.
    #[error("Record written, but old key {old_key:?} was not removed: {source}")]
    PartialUpdate {
        /// Key the stranded record is still stored under.
        old_key: String,
        /// Why the removal failed.
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Create a protocol-violation error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Channel(ChannelError::Json(err))
    }
}
