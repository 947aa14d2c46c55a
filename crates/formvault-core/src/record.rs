//! Credential records.

use serde::{Deserialize, Serialize};
use url::Url;

/// One named form field inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// A stored credential entry.
///
/// The key is derived from the URL of the page the form was captured on
/// (host + path) and identifies the record in the daemon's store. Field
/// order is preserved. Summaries returned by `LIST` and `SEARCH` omit
/// `fields` entirely, so it defaults to empty on deserialize; an empty
/// `fields` is also a valid, newly created record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

impl Record {
    /// Create an empty record under `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: Vec::new(),
        }
    }

    /// Create an empty record keyed by `url` (see [`Record::key_for_url`]).
    pub fn for_url(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Self::key_for_url(url)?))
    }

    /// Append a field, preserving insertion order.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Derive the storage key for a page URL: host followed by path,
    /// with the scheme, query, and fragment dropped. A bare host yields
    /// just the host.
    pub fn key_for_url(url: &str) -> Result<String, url::ParseError> {
        let url = Url::parse(url)?;
        let host = url.host_str().ok_or(url::ParseError::EmptyHost)?;
        match url.path() {
            "/" => Ok(host.to_string()),
            path => Ok(format!("{host}{path}")),
        }
    }
}
