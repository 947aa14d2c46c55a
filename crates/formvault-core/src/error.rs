//! Channel-level error types.

use std::io;
use thiserror::Error;

/// Errors raised by the channel transport itself, as opposed to errors
/// the daemon reports in-band with an `ERROR` reply.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// I/O error on the underlying pipe.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A message failed to serialize or deserialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A frame exceeded the configured limit.
    #[error("Frame too large: {len} bytes (max: {max} bytes)")]
    FrameTooLarge {
        /// Declared frame length.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// The daemon closed its end of the channel.
    #[error("Channel closed")]
    Closed,
}
