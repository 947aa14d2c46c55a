//! Tagged-message vocabulary for the daemon channel.
//!
//! Every message on the wire is a JSON object `{id, type, data}`. The
//! `type` tag and `data` shapes match what the daemon speaks; the `id`
//! is a correlation UUID echoed back on replies so the client can route
//! each reply to the call that caused it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::record::Record;
use crate::secret::Passphrase;

/// Message tags exchanged with the daemon.
///
/// `List` through `Password` are client commands; `Form` through
/// `GetPassword` originate from the daemon. `GetPassword` is the
/// passphrase challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tag {
    List,
    Search,
    Get,
    Put,
    Remove,
    Password,
    Form,
    Forms,
    Ok,
    Error,
    GetPassword,
    /// Catch-all for tags this client does not recognize. Decoding must
    /// not fail on them; the correlator reports them as protocol
    /// violations instead of tearing down the connection.
    #[serde(other)]
    Unknown,
}

/// One message on the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Correlation ID. Always present on outbound commands; replies are
    /// expected to echo it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Message tag.
    #[serde(rename = "type")]
    pub tag: Tag,

    /// Tag-dependent payload. `ERROR` payloads stay opaque and are
    /// surfaced to the caller verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    /// Create an envelope with a fresh correlation ID and no payload.
    pub fn new(tag: Tag) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            tag,
            data: None,
        }
    }

    /// Override the correlation ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Attach a payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// `LIST` command.
    pub fn list() -> Self {
        Self::new(Tag::List)
    }

    /// `SEARCH` command.
    pub fn search(query: &str) -> Self {
        Self::new(Tag::Search).with_data(json!({ "query": query }))
    }

    /// `GET` command carrying the key and the passphrase used to
    /// decrypt the record.
    pub fn get(key: &str, passphrase: &Passphrase) -> Self {
        Self::new(Tag::Get).with_data(json!({ "key": key, "passphrase": passphrase }))
    }

    /// `PUT` command. Fails only if the record cannot be serialized.
    pub fn put(record: &Record) -> Result<Self, serde_json::Error> {
        Ok(Self::new(Tag::Put).with_data(serde_json::to_value(record)?))
    }

    /// `REMOVE` command.
    pub fn remove(key: &str) -> Self {
        Self::new(Tag::Remove).with_data(json!({ "key": key }))
    }

    /// `PASSWORD` follow-up answering a `GET_PASSWORD` challenge. Reuses
    /// the correlation ID of the challenged request.
    pub fn password(id: Uuid, passphrase: &Passphrase) -> Self {
        Self::new(Tag::Password)
            .with_id(id)
            .with_data(json!({ "passphrase": passphrase }))
    }
}

/// Payload of a `SEARCH` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchData {
    pub query: String,
}

/// Payload of a `REMOVE` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyData {
    pub key: String,
}

/// Payload of a `GET` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetData {
    pub key: String,
    pub passphrase: Passphrase,
}

/// Payload of a `PASSWORD` follow-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordData {
    pub passphrase: Passphrase,
}
