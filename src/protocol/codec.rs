//! Protocol codec
//!
//! Encoding and decoding of complete messages.
//!
//! ## Wire Format
//! ```text
//! ┌──────────────────────┬──────────────────────┬───────────┬───────────┬─────┐
//! │ MessageHeader (12)   │ OperationalHeader (4)│ Component │ Component │ ... │
//! └──────────────────────┴──────────────────────┴───────────┴───────────┴─────┘
//!  |<──────────────────────────── msg_size ──────────────────────────────────>|
//! ```
//!
//! ## Decoding
//! ```text
//! AwaitingMessageHeader ─► AwaitingOperationalHeader ─► ReadingComponents ─► Complete
//!          │                          │                         │
//!          └──────────────────────────┴─────────────────────────┴──► Rejected
//! ```

use std::io::{Read, Write};

use bytes::{Buf, Bytes, BytesMut};

use super::component::Component;
use super::header::{MessageHeader, MESSAGE_HEADER_SIZE};
use super::message::Message;
use super::operational::{OperationalHeader, OPERATIONAL_HEADER_SIZE};
use super::FIXED_HEADERS_SIZE;
use crate::config::CodecConfig;
use crate::error::{FrameError, Result};

/// Byte offset of `msg_size` inside the message header
const MSG_SIZE_OFFSET: usize = 4;

// =============================================================================
// Encoding
// =============================================================================

/// Serializes messages under a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct MessageEncoder {
    config: CodecConfig,
}

impl MessageEncoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Total encoded length of `message`, i.e. the `msg_size` it will carry
    pub fn encoded_len(&self, message: &Message) -> Result<usize> {
        self.config.validate()?;
        let mut total = FIXED_HEADERS_SIZE;
        for component in &message.components {
            total += component.encoded_len(&self.config)?;
        }
        Ok(total)
    }

    /// Encode a message into a fresh buffer
    pub fn encode(&self, message: &Message) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len(message)?);
        self.encode_into(message, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Append an encoded message to `dst`, returning the bytes written.
    ///
    /// Headers go out first with a zero size; `msg_size` is patched in once
    /// every component has been written. On error `dst` is left as it was.
    /// A config that fails [`CodecConfig::validate`] is reported before
    /// anything is written.
    pub fn encode_into(&self, message: &Message, dst: &mut BytesMut) -> Result<usize> {
        self.config.validate()?;
        let start = dst.len();
        let result = self.write_message(message, dst, start);
        if result.is_err() {
            dst.truncate(start);
        }
        result
    }

    fn write_message(&self, message: &Message, dst: &mut BytesMut, start: usize) -> Result<usize> {
        let mut header = message.header;
        header.set_msg_size(0);
        header.encode(dst);
        message.operational.encode(dst);

        for component in &message.components {
            component.encode(dst, &self.config)?;
        }

        let written = dst.len() - start;
        if written > self.config.max_message_size as usize {
            return Err(FrameError::OverflowOnEncode {
                field: "message size",
                value: written,
                max: self.config.max_message_size as usize,
            });
        }

        let offset = start + MSG_SIZE_OFFSET;
        dst[offset..offset + 4].copy_from_slice(&(written as u32).to_be_bytes());

        tracing::trace!(
            "Encoded message opaque={:#x} size={} components={}",
            message.header.opaque(),
            written,
            message.components.len()
        );

        Ok(written)
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Where a [`MessageDecoder`] is in the current message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    AwaitingMessageHeader,
    AwaitingOperationalHeader,
    ReadingComponents,
    /// The last message decoded completely
    Complete,
    /// The last message failed validation; nothing of it was returned
    Rejected,
}

/// Parses one message at a time out of a buffer
#[derive(Debug, Clone)]
pub struct MessageDecoder {
    config: CodecConfig,
    state: DecodeState,
    consumed: usize,
}

impl Default for MessageDecoder {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl MessageDecoder {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            state: DecodeState::AwaitingMessageHeader,
            consumed: 0,
        }
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Bytes of the current (or last) message accounted for so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Decode the message at the front of `src`.
    ///
    /// Bytes after `msg_size` are ignored. Returns a message only when
    /// every component was read and the total matches `msg_size` exactly.
    pub fn decode(&mut self, src: Bytes) -> Result<Message> {
        self.state = DecodeState::AwaitingMessageHeader;
        self.consumed = 0;

        match self.run(src) {
            Ok(message) => {
                self.transition(DecodeState::Complete);
                Ok(message)
            }
            Err(e) => {
                self.transition(DecodeState::Rejected);
                Err(e)
            }
        }
    }

    fn run(&mut self, mut src: Bytes) -> Result<Message> {
        self.config.validate()?;
        let available = src.len();

        let header = MessageHeader::decode(&mut src)?;
        header.ensure_supported()?;
        let msg_size = declared_size(&header, &self.config)?;
        if available < msg_size {
            return Err(FrameError::truncated(msg_size, available));
        }
        self.consumed = MESSAGE_HEADER_SIZE;

        // Everything past this point is bounded by msg_size.
        let mut rest = src.split_to(msg_size - MESSAGE_HEADER_SIZE);

        self.transition(DecodeState::AwaitingOperationalHeader);
        let operational = OperationalHeader::decode(&mut rest)?;
        self.consumed += OPERATIONAL_HEADER_SIZE;

        self.transition(DecodeState::ReadingComponents);
        let mut components = Vec::new();
        while rest.has_remaining() {
            let before = rest.remaining();
            let component = Component::decode(&mut rest, &self.config)?;
            self.consumed += before - rest.remaining();

            tracing::trace!(
                "Read component tag=0x{:02x} ({} of {} bytes consumed)",
                component.tag(),
                self.consumed,
                msg_size
            );
            components.push(component);
        }

        Ok(Message {
            header,
            operational,
            components,
        })
    }

    fn transition(&mut self, next: DecodeState) {
        tracing::trace!("Decoder state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// `msg_size` of an already-supported header, bounds-checked
fn declared_size(header: &MessageHeader, config: &CodecConfig) -> Result<usize> {
    let msg_size = header.msg_size();
    if (msg_size as usize) < FIXED_HEADERS_SIZE {
        return Err(FrameError::Malformed(format!(
            "message size {} is smaller than the fixed headers ({} bytes)",
            msg_size, FIXED_HEADERS_SIZE
        )));
    }
    if msg_size > config.max_message_size {
        return Err(FrameError::Malformed(format!(
            "message size {} exceeds maximum {}",
            msg_size, config.max_message_size
        )));
    }
    Ok(msg_size as usize)
}

/// Length of the message at the front of `buf`, once its header is available.
///
/// Returns `Ok(None)` while fewer than 12 bytes are buffered. Lets a
/// transport find message boundaries without decoding components.
pub fn frame_length(buf: &[u8], config: &CodecConfig) -> Result<Option<usize>> {
    if buf.len() < MESSAGE_HEADER_SIZE {
        return Ok(None);
    }
    let header = MessageHeader::decode(&mut &buf[..MESSAGE_HEADER_SIZE])?;
    header.ensure_supported()?;
    declared_size(&header, config).map(Some)
}

/// Encode a message with the default configuration
pub fn encode_message(message: &Message) -> Result<Bytes> {
    MessageEncoder::default().encode(message)
}

/// Decode a message with the default configuration
pub fn decode_message(bytes: &[u8]) -> Result<Message> {
    MessageDecoder::default().decode(Bytes::copy_from_slice(bytes))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete message from a stream
///
/// Blocks until a complete message is received or an error occurs
pub fn read_message<R: Read>(reader: &mut R) -> Result<Message> {
    read_message_with(reader, &CodecConfig::default())
}

/// Read a complete message from a stream under `config`
pub fn read_message_with<R: Read>(reader: &mut R, config: &CodecConfig) -> Result<Message> {
    // Read header first
    let mut head = [0u8; MESSAGE_HEADER_SIZE];
    reader.read_exact(&mut head)?;

    // Reject foreign traffic before reading the body
    let header = MessageHeader::decode(&mut &head[..])?;
    header.ensure_supported()?;
    let msg_size = declared_size(&header, config)?;

    // Read the rest of the message
    let mut buf = BytesMut::with_capacity(msg_size);
    buf.extend_from_slice(&head);
    buf.resize(msg_size, 0);
    reader.read_exact(&mut buf[MESSAGE_HEADER_SIZE..])?;

    tracing::debug!("Read message opaque={:#x} size={}", header.opaque(), msg_size);

    MessageDecoder::new(config.clone()).decode(buf.freeze())
}

/// Write a message to a stream
pub fn write_message<W: Write>(writer: &mut W, message: &Message) -> Result<()> {
    write_message_with(writer, message, &MessageEncoder::default())
}

/// Write a message to a stream with a configured encoder
pub fn write_message_with<W: Write>(
    writer: &mut W,
    message: &Message,
    encoder: &MessageEncoder,
) -> Result<()> {
    let bytes = encoder.encode(message)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
