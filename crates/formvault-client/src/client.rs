//! Credential operations.

use serde_json::Value;
use tracing::debug;

use formvault_core::{ClientConfig, Envelope, Passphrase, Record};

use crate::channel::Channel;
use crate::correlator::Correlator;
use crate::error::{ClientError, Result};

/// Typed client for the daemon's credential store.
///
/// Thin layer over the [`Correlator`]: each operation is one tagged
/// command (plus the handshake `get` may trigger), and `update` is the
/// composite rename-aware write.
#[derive(Clone)]
pub struct VaultClient {
    correlator: Correlator,
}

impl VaultClient {
    /// Build a client owning `channel`.
    pub fn new(channel: impl Channel + 'static, config: ClientConfig) -> Self {
        Self {
            correlator: Correlator::spawn(channel, config),
        }
    }

    /// List summaries of every stored record.
    pub async fn list(&self) -> Result<Vec<Record>> {
        let data = self.correlator.call(Envelope::list(), None).await?;
        decode_records(data)
    }

    /// Search stored records by key/URL. An empty result is `Ok(vec![])`,
    /// never an error.
    pub async fn search(&self, query: &str) -> Result<Vec<Record>> {
        let data = self.correlator.call(Envelope::search(query), None).await?;
        decode_records(data)
    }

    /// Fetch and decrypt the record stored under `key`.
    ///
    /// The daemon answers with a `GET_PASSWORD` challenge when the
    /// store is locked; the correlator answers it with `passphrase` in
    /// exactly one follow-up round trip.
    pub async fn get(&self, key: &str, passphrase: &Passphrase) -> Result<Record> {
        let request = Envelope::get(key, passphrase);
        let data = self
            .correlator
            .call(request, Some(passphrase.clone()))
            .await?;
        let data =
            data.ok_or_else(|| ClientError::protocol("record reply without a payload"))?;
        Ok(serde_json::from_value(data)?)
    }

    /// Create or overwrite the record stored under `record.key`.
    pub async fn put(&self, record: &Record) -> Result<()> {
        self.correlator.call(Envelope::put(record)?, None).await?;
        Ok(())
    }

    /// Delete the record stored under `key`.
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.correlator.call(Envelope::remove(key), None).await?;
        Ok(())
    }

    /// Rename-aware update: write `record`, then delete `old_key` if
    /// the key changed.
    ///
    /// The write goes first. If it fails, the delete is never attempted
    /// and the old record is untouched; a failure between the two steps
    /// can leave both keys present, never neither. If the write lands
    /// but the delete fails, the error is
    /// [`ClientError::PartialUpdate`] naming the stranded key.
    pub async fn update(&self, old_key: &str, record: &Record) -> Result<()> {
        self.put(record).await?;
        if old_key == record.key {
            return Ok(());
        }
        debug!(old_key, new_key = %record.key, "record renamed, removing old key");
        self.remove(old_key)
            .await
            .map_err(|source| ClientError::PartialUpdate {
                old_key: old_key.to_string(),
                source: Box::new(source),
            })
    }
}

fn decode_records(data: Option<Value>) -> Result<Vec<Record>> {
    match data {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}
