//! Core types for the FormVault protocol engine.
//!
//! This crate defines the tagged-message vocabulary spoken over the
//! daemon channel, the credential record model, passphrase handling,
//! and client configuration. The transport and request correlation
//! live in `formvault-client`.

pub mod config;
pub mod error;
pub mod protocol;
pub mod record;
pub mod secret;

pub use config::ClientConfig;
pub use error::ChannelError;
pub use protocol::{Envelope, GetData, KeyData, PasswordData, SearchData, Tag};
pub use record::{Field, Record};
pub use secret::Passphrase;
