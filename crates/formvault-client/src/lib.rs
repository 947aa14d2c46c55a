//! FormVault client protocol engine.
//!
//! Talks to the local secret-store daemon over a single long-lived
//! duplex message channel: frames tagged JSON envelopes, correlates
//! replies to requests by correlation id, drives the passphrase
//! challenge handshake, and exposes the credential operations the UI
//! layer calls.

pub mod channel;
pub mod client;
pub mod codec;
pub mod correlator;
pub mod error;

pub use channel::{Channel, FramedChannel};
pub use client::VaultClient;
pub use codec::{FrameCodec, DEFAULT_MAX_FRAME_LEN};
pub use correlator::Correlator;
pub use error::{ClientError, Result};
