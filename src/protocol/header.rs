//! Message header
//!
//! The fixed 12-byte envelope at the start of every message.
//!
//! ```text
//! ┌──────────────┬─────────────┬───────────────┬──────────────┬─────────────┐
//! │ Magic (2)    │ Version (1) │ TypeFlag (1)  │ MsgSize (4)  │ Opaque (4)  │
//! └──────────────┴─────────────┴───────────────┴──────────────┴─────────────┘
//! ```
//!
//! ### Type flag
//! ```text
//!   7   6   5   4   3   2   1   0
//! ┌───────────────────────┬───┬───┐
//! │   message kind (6)    │OW │RSP│
//! └───────────────────────┴───┴───┘
//! ```
//! - RSP: set on responses
//! - OW:  one-way request, no response expected

use std::fmt;

use bytes::{Buf, BufMut};

use crate::error::{FrameError, Result};

/// Protocol magic
pub const MESSAGE_MAGIC: u16 = 0x5050;

/// Current protocol version
pub const CURRENT_VERSION: u8 = 1;

/// Serialized size of the message header
pub const MESSAGE_HEADER_SIZE: usize = 12;

const RESPONSE_BIT: u8 = 0b0000_0001;
const ONE_WAY_BIT: u8 = 0b0000_0010;
const KIND_SHIFT: u8 = 2;

/// Message kind carried in the upper six bits of the type flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Operational,
    Admin,
    ClusterControl,
    Unknown(UnknownKind),
}

/// A six-bit kind value with no named variant.
///
/// Only [`MessageKind::from_u8`] builds one, so it never holds 0, 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownKind(u8);

impl UnknownKind {
    pub fn value(self) -> u8 {
        self.0
    }
}

impl MessageKind {
    /// Kind for the low six bits of `raw`
    pub fn from_u8(raw: u8) -> Self {
        match raw & 0x3F {
            0 => MessageKind::Operational,
            1 => MessageKind::Admin,
            2 => MessageKind::ClusterControl,
            other => MessageKind::Unknown(UnknownKind(other)),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            MessageKind::Operational => 0,
            MessageKind::Admin => 1,
            MessageKind::ClusterControl => 2,
            MessageKind::Unknown(kind) => kind.0,
        }
    }
}

/// Request/response framing of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Request expecting a response
    Request,
    /// Fire-and-forget request
    OneWayRequest,
    Response,
}

impl Direction {
    pub fn is_response(self) -> bool {
        self == Direction::Response
    }
}

/// Message header
///
/// Construct with [`MessageHeader::new`]; a fresh header is an operational
/// two-way request with size and opaque zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHeader {
    magic: u16,
    version: u8,
    type_flag: u8,
    msg_size: u32,
    opaque: u32,
}

impl MessageHeader {
    pub const fn new() -> Self {
        Self {
            magic: MESSAGE_MAGIC,
            version: CURRENT_VERSION,
            type_flag: 0,
            msg_size: 0,
            opaque: 0,
        }
    }

    /// Build a header from raw wire fields without validating them
    pub const fn from_raw(magic: u16, version: u8, type_flag: u8, msg_size: u32, opaque: u32) -> Self {
        Self {
            magic,
            version,
            type_flag,
            msg_size,
            opaque,
        }
    }

    /// Re-apply the protocol constants and clear everything else
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// True iff magic, version and message kind are all the ones this codec speaks
    pub fn is_supported(&self) -> bool {
        self.magic == MESSAGE_MAGIC
            && self.version == CURRENT_VERSION
            && self.message_kind() == MessageKind::Operational
    }

    /// Check [`is_supported`](Self::is_supported), returning the offending fields on failure
    pub fn ensure_supported(&self) -> Result<()> {
        if self.is_supported() {
            return Ok(());
        }
        Err(FrameError::UnsupportedProtocol {
            magic: self.magic,
            version: self.version,
            message_type: self.message_type(),
        })
    }

    // -------------------------------------------------------------------------
    // Type flag
    // -------------------------------------------------------------------------

    /// Raw message type (upper six bits of the type flag)
    pub fn message_type(&self) -> u8 {
        self.type_flag >> KIND_SHIFT
    }

    pub fn message_kind(&self) -> MessageKind {
        MessageKind::from_u8(self.message_type())
    }

    pub fn set_message_kind(&mut self, kind: MessageKind) {
        self.type_flag = (kind.to_u8() << KIND_SHIFT) | (self.type_flag & (RESPONSE_BIT | ONE_WAY_BIT));
    }

    pub fn direction(&self) -> Direction {
        if self.type_flag & RESPONSE_BIT != 0 {
            Direction::Response
        } else if self.type_flag & ONE_WAY_BIT != 0 {
            Direction::OneWayRequest
        } else {
            Direction::Request
        }
    }

    /// Switch to response framing; message kind is left untouched
    pub fn set_as_response(&mut self) {
        self.type_flag = (self.type_flag & !ONE_WAY_BIT) | RESPONSE_BIT;
    }

    /// Switch to request framing; `one_way` requests expect no response
    pub fn set_as_request(&mut self, one_way: bool) {
        self.type_flag &= !(RESPONSE_BIT | ONE_WAY_BIT);
        if one_way {
            self.type_flag |= ONE_WAY_BIT;
        }
    }

    pub fn is_request(&self) -> bool {
        !self.is_response()
    }

    pub fn is_response(&self) -> bool {
        self.direction().is_response()
    }

    pub fn is_one_way(&self) -> bool {
        self.direction() == Direction::OneWayRequest
    }

    // -------------------------------------------------------------------------
    // Plain accessors
    // -------------------------------------------------------------------------

    pub fn magic(&self) -> u16 {
        self.magic
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn type_flag(&self) -> u8 {
        self.type_flag
    }

    pub fn msg_size(&self) -> u32 {
        self.msg_size
    }

    pub fn set_msg_size(&mut self, size: u32) {
        self.msg_size = size;
    }

    pub fn opaque(&self) -> u32 {
        self.opaque
    }

    pub fn set_opaque(&mut self, opaque: u32) {
        self.opaque = opaque;
    }

    // -------------------------------------------------------------------------
    // Wire format
    // -------------------------------------------------------------------------

    /// Write the 12 header bytes
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u16(self.magic);
        dst.put_u8(self.version);
        dst.put_u8(self.type_flag);
        dst.put_u32(self.msg_size);
        dst.put_u32(self.opaque);
    }

    /// Read 12 header bytes. Does not check [`is_supported`](Self::is_supported).
    pub fn decode(src: &mut impl Buf) -> Result<Self> {
        if src.remaining() < MESSAGE_HEADER_SIZE {
            return Err(FrameError::truncated(MESSAGE_HEADER_SIZE, src.remaining()));
        }

        Ok(Self {
            magic: src.get_u16(),
            version: src.get_u8(),
            type_flag: src.get_u8(),
            msg_size: src.get_u32(),
            opaque: src.get_u32(),
        })
    }
}

impl Default for MessageHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Header:")?;
        writeln!(f, "  Magic       : {:#06X}", self.magic)?;
        writeln!(f, "  Version     : {}", self.version)?;
        writeln!(f, "  MessageType : {} ({:?})", self.message_type(), self.message_kind())?;
        writeln!(f, "  Direction   : {:?}", self.direction())?;
        writeln!(f, "  MessageSize : {}", self.msg_size)?;
        write!(f, "  Opaque      : {:#010X}", self.opaque)
    }
}
