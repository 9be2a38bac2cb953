//! Message definitions
//!
//! A complete message: envelope, operational header and components.

use std::fmt;

use bytes::Bytes;

use super::component::{Component, MetaComponent, PayloadComponent};
use super::header::MessageHeader;
use super::operational::{OpCode, OperationalHeader, ShardId, ShardOrStatus, Status};
use super::OpFlags;

/// A request or response exchanged with the storage service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    /// Envelope. `msg_size` is recomputed on every encode.
    pub header: MessageHeader,

    pub operational: OperationalHeader,

    /// Components in wire order
    pub components: Vec<Component>,
}

impl Message {
    /// Create a two-way request for `opcode` routed to `shard`
    pub fn request(opcode: OpCode, shard: ShardId) -> Self {
        Self {
            header: MessageHeader::new(),
            operational: OperationalHeader::request(opcode, shard),
            components: Vec::new(),
        }
    }

    /// Create the response to `request`, echoing its opcode and opaque
    pub fn response_to(request: &Message, status: Status) -> Self {
        let mut header = MessageHeader::new();
        header.set_opaque(request.header.opaque());
        header.set_as_response();

        Self {
            header,
            operational: OperationalHeader::response(request.operational.opcode, status),
            components: Vec::new(),
        }
    }

    pub fn with_opaque(mut self, opaque: u32) -> Self {
        self.header.set_opaque(opaque);
        self
    }

    pub fn with_flags(mut self, flags: OpFlags) -> Self {
        self.operational.flags = flags;
        self
    }

    /// Mark as a fire-and-forget request
    pub fn one_way(mut self) -> Self {
        self.header.set_as_request(true);
        self
    }

    pub fn with_payload(
        mut self,
        namespace: impl Into<Bytes>,
        key: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Self {
        self.components
            .push(Component::Payload(PayloadComponent::new(namespace, key, value)));
        self
    }

    pub fn with_meta(mut self, num_fields: u8, fields: impl Into<Bytes>) -> Self {
        self.components
            .push(Component::Meta(MetaComponent::new(num_fields, fields)));
        self
    }

    pub fn push_component(&mut self, component: Component) {
        self.components.push(component);
    }

    /// The shard-id/status slot, read under this message's direction
    pub fn shard_or_status(&self) -> ShardOrStatus {
        self.operational.shard_or_status(self.header.direction())
    }

    /// Target shard, if this is a request
    pub fn shard_id(&self) -> Option<ShardId> {
        match self.shard_or_status() {
            ShardOrStatus::Shard(shard) => Some(shard),
            ShardOrStatus::Status(_) => None,
        }
    }

    /// Status code, if this is a response
    pub fn status(&self) -> Option<Status> {
        match self.shard_or_status() {
            ShardOrStatus::Status(status) => Some(status),
            ShardOrStatus::Shard(_) => None,
        }
    }

    /// First payload component, if any
    pub fn payload(&self) -> Option<&PayloadComponent> {
        self.components.iter().find_map(|c| match c {
            Component::Payload(payload) => Some(payload),
            _ => None,
        })
    }

    /// First meta component, if any
    pub fn meta(&self) -> Option<&MetaComponent> {
        self.components.iter().find_map(|c| match c {
            Component::Meta(meta) => Some(meta),
            _ => None,
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        writeln!(f, "OperationalHeader:")?;
        writeln!(f, "  OpCode      : {:#04X}", self.operational.opcode.0)?;
        writeln!(f, "  Flags       : {:#04X} {:?}", self.operational.flags.to_byte(), self.operational.flags)?;
        match self.shard_or_status() {
            ShardOrStatus::Shard(ShardId(id)) => writeln!(f, "  ShardId     : {}", id)?,
            ShardOrStatus::Status(Status(code)) => writeln!(f, "  Status      : {}", code)?,
        }

        write!(f, "Components  : {}", self.components.len())?;
        for (i, component) in self.components.iter().enumerate() {
            match component {
                Component::Meta(meta) => write!(
                    f,
                    "\n  [{}] Meta    fields={} bytes={}",
                    i,
                    meta.num_fields,
                    meta.fields.len()
                )?,
                Component::Payload(payload) => write!(
                    f,
                    "\n  [{}] Payload namespace={:?} key={} value={} bytes",
                    i,
                    String::from_utf8_lossy(&payload.namespace),
                    hex::encode(&payload.key),
                    payload.value.len()
                )?,
                Component::Unknown(raw) => write!(
                    f,
                    "\n  [{}] Unknown tag=0x{:02x} bytes={}",
                    i,
                    raw.tag,
                    raw.body.len()
                )?,
            }
        }
        Ok(())
    }
}
