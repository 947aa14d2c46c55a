//! Request/reply correlation and the passphrase handshake.
//!
//! Every outbound command carries a correlation UUID; a background
//! reader task routes each inbound envelope to the pending call with
//! the matching id. This makes overlapping calls safe: replies go to
//! the call that caused them, not to whichever listener happens to be
//! registered.
//!
//! The passphrase handshake is a per-call two-state machine. A `GET`
//! whose first reply is the `GET_PASSWORD` challenge gets exactly one
//! `PASSWORD` follow-up under the same id; the follow-up's reply is the
//! terminal outcome. A second challenge for the same call is a protocol
//! violation, never a loop.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use formvault_core::{ChannelError, ClientConfig, Envelope, Passphrase, Tag};

use crate::channel::Channel;
use crate::error::{ClientError, Result};

/// Handshake progress of one pending call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    /// Waiting for the first reply.
    AwaitingData,
    /// Challenge answered; waiting for the reply to `PASSWORD`.
    AwaitingPassphraseAck,
}

/// Correlation state for one in-flight call.
struct PendingCall {
    reply: oneshot::Sender<Result<Option<Value>>>,
    /// Passphrase from the original request, consumed if the daemon
    /// challenges. Calls without one cannot answer a challenge.
    passphrase: Option<Passphrase>,
    state: CallState,
}

type PendingMap = Arc<Mutex<HashMap<Uuid, PendingCall>>>;

/// Routes daemon replies to the calls that caused them.
///
/// Takes exclusive ownership of the channel and spawns a reader task
/// that lives until the channel closes. Cheap to clone; clones share
/// the channel and the pending-call map.
#[derive(Clone)]
pub struct Correlator {
    channel: Arc<dyn Channel>,
    pending: PendingMap,
    config: ClientConfig,
}

impl Correlator {
    /// Take ownership of `channel` and start routing replies.
    pub fn spawn(channel: impl Channel + 'static, config: ClientConfig) -> Self {
        let channel: Arc<dyn Channel> = Arc::new(channel);
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        tokio::spawn(read_loop(Arc::clone(&channel), Arc::clone(&pending)));
        Self {
            channel,
            pending,
            config,
        }
    }

    /// Send `request` and await its reply.
    ///
    /// Resolves with the reply's payload, or fails with the daemon's
    /// `ERROR` payload, a channel failure, a protocol violation, or a
    /// timeout. Exactly one resolution per call; the pending entry is
    /// removed on every path, so a failed call leaves the channel
    /// reusable.
    pub async fn call(
        &self,
        request: Envelope,
        passphrase: Option<Passphrase>,
    ) -> Result<Option<Value>> {
        let id = request
            .id
            .ok_or_else(|| ClientError::protocol("outbound request without a correlation id"))?;
        let tag = request.tag;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(
            id,
            PendingCall {
                reply: tx,
                passphrase,
                state: CallState::AwaitingData,
            },
        );

        debug!(%id, ?tag, "sending request");
        if let Err(err) = self.channel.send(request).await {
            self.pending.lock().await.remove(&id);
            return Err(err.into());
        }

        match tokio::time::timeout(self.config.call_timeout(), rx).await {
            Ok(Ok(outcome)) => outcome,
            // Reader task gone without resolving us: channel is dead.
            Ok(Err(_)) => Err(ClientError::Channel(ChannelError::Closed)),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                warn!(%id, ?tag, "request timed out");
                Err(ClientError::Timeout)
            }
        }
    }
}

async fn read_loop(channel: Arc<dyn Channel>, pending: PendingMap) {
    loop {
        match channel.recv().await {
            Ok(Some(envelope)) => dispatch(channel.as_ref(), &pending, envelope).await,
            Ok(None) => {
                debug!("channel closed by daemon");
                break;
            }
            Err(err) => {
                warn!(error = %err, "channel receive failed");
                break;
            }
        }
    }
    drain(&pending).await;
}

/// Route one inbound envelope.
async fn dispatch(channel: &dyn Channel, pending: &PendingMap, envelope: Envelope) {
    let Some(id) = envelope.id else {
        warn!(tag = ?envelope.tag, "dropping reply without a correlation id");
        return;
    };

    if envelope.tag == Tag::GetPassword {
        handle_challenge(channel, pending, id).await;
        return;
    }

    let mut map = pending.lock().await;
    let Some(call) = map.remove(&id) else {
        warn!(%id, tag = ?envelope.tag, "dropping reply for unknown request");
        return;
    };
    drop(map);

    let outcome = match envelope.tag {
        Tag::Error => Err(ClientError::Remote(envelope.data.unwrap_or(Value::Null))),
        Tag::Form | Tag::Forms | Tag::Ok => Ok(envelope.data),
        Tag::Unknown => Err(ClientError::protocol("reply with unrecognized tag")),
        tag => Err(ClientError::protocol(format!(
            "unexpected reply tag {tag:?}"
        ))),
    };
    let _ = call.reply.send(outcome);
}

/// Drive the passphrase handshake for the challenged call.
async fn handle_challenge(channel: &dyn Channel, pending: &PendingMap, id: Uuid) {
    let mut map = pending.lock().await;
    let Some(call) = map.get_mut(&id) else {
        warn!(%id, "dropping challenge for unknown request");
        return;
    };

    match (call.state, call.passphrase.take()) {
        (CallState::AwaitingData, Some(passphrase)) => {
            call.state = CallState::AwaitingPassphraseAck;
            drop(map);
            debug!(%id, "answering passphrase challenge");
            if let Err(err) = channel.send(Envelope::password(id, &passphrase)).await {
                fail(pending, id, err.into()).await;
            }
        }
        (CallState::AwaitingData, None) => {
            fail_locked(
                &mut map,
                id,
                ClientError::protocol("passphrase challenge for a request that carried none"),
            );
        }
        (CallState::AwaitingPassphraseAck, _) => {
            fail_locked(
                &mut map,
                id,
                ClientError::protocol("second passphrase challenge for the same request"),
            );
        }
    }
}

fn fail_locked(map: &mut HashMap<Uuid, PendingCall>, id: Uuid, err: ClientError) {
    warn!(%id, error = %err, "failing request");
    if let Some(call) = map.remove(&id) {
        let _ = call.reply.send(Err(err));
    }
}

async fn fail(pending: &PendingMap, id: Uuid, err: ClientError) {
    let mut map = pending.lock().await;
    fail_locked(&mut map, id, err);
}

/// Fail every outstanding call; runs once when the channel dies.
async fn drain(pending: &PendingMap) {
    let mut map = pending.lock().await;
    for (_, call) in map.drain() {
        let _ = call.reply.send(Err(ClientError::Channel(ChannelError::Closed)));
    }
}
