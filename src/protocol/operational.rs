//! Operational header
//!
//! The 4 bytes following the message header.
//!
//! ```text
//! ┌────────────┬───────────┬──────────────────────────┐
//! │ OpCode (1) │ Flags (1) │ ShardId / Status (2)     │
//! └────────────┴───────────┴──────────────────────────┘
//! ```
//!
//! The last field is a shard id on requests and a status code on responses.
//! Nothing on the wire says which; the enclosing header's direction decides.

use bytes::{Buf, BufMut};

use super::header::Direction;
use super::OpFlags;
use crate::error::{FrameError, Result};

/// Serialized size of the operational header
pub const OPERATIONAL_HEADER_SIZE: usize = 4;

/// Operation identifier. The catalog of values lives with the request handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpCode(pub u8);

/// Partition a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShardId(pub u16);

/// Response status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Status(pub u16);

/// Interpretation of the shard-id/status slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShardOrStatus {
    Shard(ShardId),
    Status(Status),
}

impl ShardOrStatus {
    /// Wire value, whichever meaning it carries
    pub fn raw(self) -> u16 {
        match self {
            ShardOrStatus::Shard(ShardId(id)) => id,
            ShardOrStatus::Status(Status(code)) => code,
        }
    }
}

/// Operational header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OperationalHeader {
    pub opcode: OpCode,
    pub flags: OpFlags,
    shard_id_or_status: u16,
}

impl OperationalHeader {
    /// Header for a request routed to `shard`
    pub fn request(opcode: OpCode, shard: ShardId) -> Self {
        Self {
            opcode,
            flags: OpFlags::empty(),
            shard_id_or_status: shard.0,
        }
    }

    /// Header for a response carrying `status`
    pub fn response(opcode: OpCode, status: Status) -> Self {
        Self {
            opcode,
            flags: OpFlags::empty(),
            shard_id_or_status: status.0,
        }
    }

    /// Read the shard-id/status slot under the given framing
    pub fn shard_or_status(&self, direction: Direction) -> ShardOrStatus {
        if direction.is_response() {
            ShardOrStatus::Status(Status(self.shard_id_or_status))
        } else {
            ShardOrStatus::Shard(ShardId(self.shard_id_or_status))
        }
    }

    pub fn set_shard_or_status(&mut self, value: ShardOrStatus) {
        self.shard_id_or_status = value.raw();
    }

    /// Untyped wire value of the shard-id/status slot
    pub fn raw_shard_or_status(&self) -> u16 {
        self.shard_id_or_status
    }

    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(self.opcode.0);
        dst.put_u8(self.flags.to_byte());
        dst.put_u16(self.shard_id_or_status);
    }

    pub fn decode(src: &mut impl Buf) -> Result<Self> {
        if src.remaining() < OPERATIONAL_HEADER_SIZE {
            return Err(FrameError::truncated(OPERATIONAL_HEADER_SIZE, src.remaining()));
        }

        Ok(Self {
            opcode: OpCode(src.get_u8()),
            flags: OpFlags::from_byte(src.get_u8()),
            shard_id_or_status: src.get_u16(),
        })
    }
}
