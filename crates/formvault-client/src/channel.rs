//! Channel abstraction over the daemon pipe.
//!
//! The channel is a plain duplex message pipe: FIFO per direction, no
//! multiplexing. Ordering and correlation are imposed by the
//! [`Correlator`](crate::Correlator) above it. The channel handle is
//! explicitly constructed and passed to whoever builds the client, so
//! tests can substitute a fake.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite};

use formvault_core::{ChannelError, Envelope};

use crate::codec::FrameCodec;

/// A duplex message pipe to the daemon.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Send one envelope.
    async fn send(&self, envelope: Envelope) -> Result<(), ChannelError>;

    /// Receive the next envelope. `Ok(None)` means the daemon closed
    /// its end.
    async fn recv(&self) -> Result<Option<Envelope>, ChannelError>;
}

/// [`Channel`] over any byte pipe, framed with [`FrameCodec`].
///
/// Covers the real daemon pipe (stdio or a socket) as well as
/// in-process [`tokio::io::duplex`] pipes in tests.
pub struct FramedChannel<R, W> {
    reader: Mutex<FramedRead<R, FrameCodec>>,
    writer: Mutex<FramedWrite<W, FrameCodec>>,
}

impl<R, W> FramedChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Frame a read/write pair, enforcing `max_frame_len` per frame.
    pub fn new(read: R, write: W, max_frame_len: usize) -> Self {
        Self {
            reader: Mutex::new(FramedRead::new(read, FrameCodec::new(max_frame_len))),
            writer: Mutex::new(FramedWrite::new(write, FrameCodec::new(max_frame_len))),
        }
    }
}

impl<S> FramedChannel<ReadHalf<S>, WriteHalf<S>>
where
    S: AsyncRead + AsyncWrite + Send,
{
    /// Frame a single bidirectional stream (a socket or a duplex pipe).
    pub fn from_stream(stream: S, max_frame_len: usize) -> Self {
        let (read, write) = tokio::io::split(stream);
        Self::new(read, write, max_frame_len)
    }
}

impl FramedChannel<tokio::io::Stdin, tokio::io::Stdout> {
    /// Frame this process's stdin/stdout, for running under a browser
    /// native-messaging host entry.
    pub fn stdio(max_frame_len: usize) -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout(), max_frame_len)
    }
}

#[async_trait]
impl<R, W> Channel for FramedChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&self, envelope: Envelope) -> Result<(), ChannelError> {
        self.writer.lock().await.send(envelope).await
    }

    async fn recv(&self) -> Result<Option<Envelope>, ChannelError> {
        self.reader.lock().await.next().await.transpose()
    }
}
