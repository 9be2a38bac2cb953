//! Protocol Module
//!
//! Defines the wire protocol spoken with the storage service.
//!
//! ## Message Format
//! ```text
//! ┌───────────┬─────────────┬──────────────┬──────────────┬─────────────┐
//! │ Magic (2) │ Version (1) │ TypeFlag (1) │ MsgSize (4)  │ Opaque (4)  │   MessageHeader
//! ├───────────┼─────────────┼──────────────┴──────────────┴─────────────┤
//! │ OpCode(1) │ Flags (1)   │ ShardId / Status (2)                      │   OperationalHeader
//! ├───────────┴─────────────┴───────────────────────────────────────────┤
//! │ Component 0 .. N   (size-prefixed, tagged, padded)                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All multi-byte integers are Big Endian.
//!
//! ### Component Tags
//! - 0x01: PAYLOAD - namespace + key + value
//! - 0x02: META    - metadata field entries
//!
//! ### Flags
//! - 0x01: REPLICATION
//! - 0x02: MARK_DELETE
//! - 0x04: DELETE_REPLICATION (predicate tests 0x05)

mod codec;
mod component;
mod flags;
mod header;
mod message;
mod operational;

pub use codec::{
    decode_message, encode_message, frame_length, read_message, read_message_with,
    write_message, write_message_with, DecodeState, MessageDecoder, MessageEncoder,
};
pub use component::{
    Component, ComponentHeader, ComponentTag, MetaComponent, MetaComponentHeader,
    PayloadComponent, PayloadComponentHeader, RawComponent, COMPONENT_HEADER_SIZE,
    META_COMPONENT_HEADER_SIZE, PAYLOAD_COMPONENT_HEADER_SIZE,
};
pub use flags::OpFlags;
pub use header::{
    Direction, MessageHeader, MessageKind, UnknownKind, CURRENT_VERSION, MESSAGE_HEADER_SIZE,
    MESSAGE_MAGIC,
};
pub use message::Message;
pub use operational::{
    OpCode, OperationalHeader, ShardId, ShardOrStatus, Status, OPERATIONAL_HEADER_SIZE,
};

/// Message header plus operational header: the smallest valid message
pub const FIXED_HEADERS_SIZE: usize = MESSAGE_HEADER_SIZE + OPERATIONAL_HEADER_SIZE;
