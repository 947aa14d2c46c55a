//! Native-messaging wire framing.
//!
//! Each frame is a 32-bit native-endian byte length followed by that
//! many bytes of JSON. This is the framing browsers use on native
//! messaging pipes, and what the daemon speaks on its end.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use formvault_core::{ChannelError, Envelope};

/// Default maximum frame length: browsers cap daemon-bound messages at
/// 1 MiB.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

const LENGTH_PREFIX_LEN: usize = 4;

/// [`Encoder`]/[`Decoder`] for length-prefixed JSON envelopes.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_frame_len: usize,
}

impl FrameCodec {
    /// Create a codec enforcing `max_frame_len` in both directions.
    pub fn new(max_frame_len: usize) -> Self {
        Self { max_frame_len }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl Decoder for FrameCodec {
    type Item = Envelope;
    type Error = ChannelError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Envelope>, ChannelError> {
        if src.len() < LENGTH_PREFIX_LEN {
            return Ok(None);
        }

        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        prefix.copy_from_slice(&src[..LENGTH_PREFIX_LEN]);
        let len = u32::from_ne_bytes(prefix) as usize;

        if len > self.max_frame_len {
            return Err(ChannelError::FrameTooLarge {
                len,
                max: self.max_frame_len,
            });
        }

        if src.len() < LENGTH_PREFIX_LEN + len {
            src.reserve(LENGTH_PREFIX_LEN + len - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX_LEN);
        let body = src.split_to(len);
        Ok(Some(serde_json::from_slice(&body)?))
    }
}

impl Encoder<Envelope> for FrameCodec {
    type Error = ChannelError;

    fn encode(&mut self, envelope: Envelope, dst: &mut BytesMut) -> Result<(), ChannelError> {
        let body = serde_json::to_vec(&envelope)?;
        if body.len() > self.max_frame_len {
            return Err(ChannelError::FrameTooLarge {
                len: body.len(),
                max: self.max_frame_len,
            });
        }

        dst.reserve(LENGTH_PREFIX_LEN + body.len());
        dst.put_u32_ne(body.len() as u32);
        dst.put_slice(&body);
        Ok(())
    }
}
