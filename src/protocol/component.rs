//! Components
//!
//! Self-delimiting, typed segments that follow the fixed headers.
//!
//! ### Base header (shared prefix)
//! ```text
//! ┌──────────┬─────────┬─────────────┐
//! │ Size (4) │ Tag (1) │ Padding (1) │  then `size` body bytes, then `padding` zero bytes
//! └──────────┴─────────┴─────────────┘
//! ```
//!
//! ### Meta (tag 0x02)
//! ```text
//! ┌──────────────┬───────────────┬────────────────────┐
//! │ Base (6)     │ NumFields (1) │ HeaderPadding (1)  │  then `header_padding` zero bytes
//! └──────────────┴───────────────┴────────────────────┘
//! ```
//!
//! ### Payload (tag 0x01)
//! ```text
//! ┌──────────┬───────────┬────────────┬────────────┐
//! │ Base (6) │ NsLen (1) │ KeyLen (2) │ ValLen (4) │  then namespace, key, value, padding
//! └──────────┴───────────┴────────────┴────────────┘
//! ```

use bytes::{Buf, BufMut, Bytes};

use crate::config::CodecConfig;
use crate::error::{FrameError, Result};

/// Serialized size of the base component header
pub const COMPONENT_HEADER_SIZE: usize = 6;

/// Serialized size of the meta component header, excluding header padding
pub const META_COMPONENT_HEADER_SIZE: usize = COMPONENT_HEADER_SIZE + 2;

/// Serialized size of the payload component header
pub const PAYLOAD_COMPONENT_HEADER_SIZE: usize = COMPONENT_HEADER_SIZE + 7;

/// Known component kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComponentTag {
    Payload = 0x01,
    Meta = 0x02,
}

impl ComponentTag {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0x01 => Some(ComponentTag::Payload),
            0x02 => Some(ComponentTag::Meta),
            _ => None,
        }
    }
}

// =============================================================================
// Headers
// =============================================================================

/// Prefix shared by every component header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ComponentHeader {
    /// Body length, excluding any header bytes and trailing padding
    pub size: u32,
    pub tag: u8,
    /// Zero bytes following the body
    pub padding: u8,
}

impl ComponentHeader {
    pub fn kind(&self) -> Option<ComponentTag> {
        ComponentTag::from_u8(self.tag)
    }

    /// Bytes that follow the complete header: body plus trailing padding
    pub fn body_and_padding_len(&self) -> usize {
        self.size as usize + self.padding as usize
    }

    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u32(self.size);
        dst.put_u8(self.tag);
        dst.put_u8(self.padding);
    }

    pub fn decode(src: &mut impl Buf) -> Result<Self> {
        if src.remaining() < COMPONENT_HEADER_SIZE {
            return Err(FrameError::truncated(COMPONENT_HEADER_SIZE, src.remaining()));
        }

        Ok(Self {
            size: src.get_u32(),
            tag: src.get_u8(),
            padding: src.get_u8(),
        })
    }
}

/// Header of a metadata-field component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MetaComponentHeader {
    pub base: ComponentHeader,
    pub num_fields: u8,
    /// Zero bytes between the fixed header fields and the body
    pub header_padding: u8,
}

impl MetaComponentHeader {
    /// Header width on the wire, including header padding
    pub fn header_len(&self) -> usize {
        META_COMPONENT_HEADER_SIZE + self.header_padding as usize
    }

    /// Every byte the component occupies
    pub fn total_len(&self) -> usize {
        self.header_len() + self.base.body_and_padding_len()
    }

    pub fn encode(&self, dst: &mut impl BufMut) {
        self.base.encode(dst);
        dst.put_u8(self.num_fields);
        dst.put_u8(self.header_padding);
        dst.put_bytes(0, self.header_padding as usize);
    }

    /// Read the meta-specific fields and header padding after `base`
    pub fn decode_after(base: ComponentHeader, src: &mut impl Buf) -> Result<Self> {
        let fixed = META_COMPONENT_HEADER_SIZE - COMPONENT_HEADER_SIZE;
        if src.remaining() < fixed {
            return Err(FrameError::truncated(fixed, src.remaining()));
        }

        let num_fields = src.get_u8();
        let header_padding = src.get_u8();
        if src.remaining() < header_padding as usize {
            return Err(FrameError::truncated(header_padding as usize, src.remaining()));
        }
        skip_padding(src, header_padding as usize, "meta header padding")?;

        Ok(Self {
            base,
            num_fields,
            header_padding,
        })
    }
}

/// Header of the namespace/key/value payload component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PayloadComponentHeader {
    pub base: ComponentHeader,
    pub namespace_len: u8,
    pub key_len: u16,
    pub value_len: u32,
}

impl PayloadComponentHeader {
    /// Every byte the component occupies
    pub fn total_len(&self) -> usize {
        PAYLOAD_COMPONENT_HEADER_SIZE + self.base.body_and_padding_len()
    }

    /// Sum of the three segment lengths
    pub fn segments_len(&self) -> usize {
        self.namespace_len as usize + self.key_len as usize + self.value_len as usize
    }

    /// The segments must exactly fill the declared body
    pub fn validate(&self) -> Result<()> {
        let segments = self.segments_len();
        if segments != self.base.size as usize {
            return Err(FrameError::Malformed(format!(
                "payload segments total {} bytes (namespace {}, key {}, value {}) but component body is {}",
                segments, self.namespace_len, self.key_len, self.value_len, self.base.size
            )));
        }
        Ok(())
    }

    pub fn encode(&self, dst: &mut impl BufMut) {
        self.base.encode(dst);
        dst.put_u8(self.namespace_len);
        dst.put_u16(self.key_len);
        dst.put_u32(self.value_len);
    }

    /// Read the payload-specific length fields after `base`
    pub fn decode_after(base: ComponentHeader, src: &mut impl Buf) -> Result<Self> {
        let fixed = PAYLOAD_COMPONENT_HEADER_SIZE - COMPONENT_HEADER_SIZE;
        if src.remaining() < fixed {
            return Err(FrameError::truncated(fixed, src.remaining()));
        }

        Ok(Self {
            base,
            namespace_len: src.get_u8(),
            key_len: src.get_u16(),
            value_len: src.get_u32(),
        })
    }
}

// =============================================================================
// Component bodies
// =============================================================================

/// Metadata fields; entry layout is defined by the field catalog
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetaComponent {
    pub num_fields: u8,
    pub fields: Bytes,
}

/// Namespace, key and value of a record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PayloadComponent {
    pub namespace: Bytes,
    pub key: Bytes,
    pub value: Bytes,
}

/// Component with a tag this codec does not interpret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComponent {
    pub tag: u8,
    pub body: Bytes,
}

/// A decoded or to-be-encoded component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Meta(MetaComponent),
    Payload(PayloadComponent),
    Unknown(RawComponent),
}

fn fit<T: TryFrom<usize>>(field: &'static str, value: usize, max: usize) -> Result<T> {
    T::try_from(value).map_err(|_| FrameError::OverflowOnEncode { field, value, max })
}

impl MetaComponent {
    pub fn new(num_fields: u8, fields: impl Into<Bytes>) -> Self {
        Self {
            num_fields,
            fields: fields.into(),
        }
    }

    /// Header describing this component under `config`'s alignment
    pub fn header(&self, config: &CodecConfig) -> Result<MetaComponentHeader> {
        let size: u32 = fit("meta component size", self.fields.len(), u32::MAX as usize)?;
        let header_padding = config.padding_for(META_COMPONENT_HEADER_SIZE)?;
        let used = META_COMPONENT_HEADER_SIZE + header_padding + self.fields.len();
        let padding = config.padding_for(used)?;

        Ok(MetaComponentHeader {
            base: ComponentHeader {
                size,
                tag: ComponentTag::Meta as u8,
                padding: fit("component padding", padding, u8::MAX as usize)?,
            },
            num_fields: self.num_fields,
            header_padding: fit("meta header padding", header_padding, u8::MAX as usize)?,
        })
    }
}

impl PayloadComponent {
    pub fn new(namespace: impl Into<Bytes>, key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Header describing this component under `config`'s alignment
    pub fn header(&self, config: &CodecConfig) -> Result<PayloadComponentHeader> {
        let namespace_len: u8 = fit("namespace length", self.namespace.len(), u8::MAX as usize)?;
        let key_len: u16 = fit("key length", self.key.len(), u16::MAX as usize)?;
        let value_len: u32 = fit("value length", self.value.len(), u32::MAX as usize)?;

        let body = self.namespace.len() + self.key.len() + self.value.len();
        let size: u32 = fit("payload component size", body, u32::MAX as usize)?;
        let padding = config.padding_for(PAYLOAD_COMPONENT_HEADER_SIZE + body)?;

        Ok(PayloadComponentHeader {
            base: ComponentHeader {
                size,
                tag: ComponentTag::Payload as u8,
                padding: fit("component padding", padding, u8::MAX as usize)?,
            },
            namespace_len,
            key_len,
            value_len,
        })
    }
}

impl RawComponent {
    pub fn header(&self, config: &CodecConfig) -> Result<ComponentHeader> {
        if let Some(kind) = ComponentTag::from_u8(self.tag) {
            return Err(FrameError::Malformed(format!(
                "raw component cannot use the {:?} tag 0x{:02x}",
                kind, self.tag
            )));
        }
        let size: u32 = fit("component size", self.body.len(), u32::MAX as usize)?;
        let padding = config.padding_for(COMPONENT_HEADER_SIZE + self.body.len())?;

        Ok(ComponentHeader {
            size,
            tag: self.tag,
            padding: fit("component padding", padding, u8::MAX as usize)?,
        })
    }
}

/// Consume `len` padding bytes, which must all be zero
fn skip_padding(src: &mut impl Buf, len: usize, what: &str) -> Result<()> {
    for offset in 0..len {
        let byte = src.get_u8();
        if byte != 0 {
            return Err(FrameError::Malformed(format!(
                "{} byte {} is 0x{:02x}, expected zero",
                what, offset, byte
            )));
        }
    }
    Ok(())
}

/// Fail with `Malformed` unless `needed` bytes remain inside the message
fn claim(src: &Bytes, needed: usize, what: &str) -> Result<()> {
    if src.remaining() < needed {
        return Err(FrameError::Malformed(format!(
            "{} claims {} bytes but only {} remain in the message",
            what,
            needed,
            src.remaining()
        )));
    }
    Ok(())
}

impl Component {
    pub fn tag(&self) -> u8 {
        match self {
            Component::Meta(_) => ComponentTag::Meta as u8,
            Component::Payload(_) => ComponentTag::Payload as u8,
            Component::Unknown(raw) => raw.tag,
        }
    }

    /// Bytes this component occupies once encoded
    pub fn encoded_len(&self, config: &CodecConfig) -> Result<usize> {
        Ok(match self {
            Component::Meta(meta) => meta.header(config)?.total_len(),
            Component::Payload(payload) => payload.header(config)?.total_len(),
            Component::Unknown(raw) => {
                COMPONENT_HEADER_SIZE + raw.header(config)?.body_and_padding_len()
            }
        })
    }

    /// Write header, body and trailing padding
    pub fn encode(&self, dst: &mut impl BufMut, config: &CodecConfig) -> Result<()> {
        match self {
            Component::Meta(meta) => {
                let header = meta.header(config)?;
                header.encode(dst);
                dst.put_slice(&meta.fields);
                dst.put_bytes(0, header.base.padding as usize);
            }
            Component::Payload(payload) => {
                let header = payload.header(config)?;
                header.encode(dst);
                dst.put_slice(&payload.namespace);
                dst.put_slice(&payload.key);
                dst.put_slice(&payload.value);
                dst.put_bytes(0, header.base.padding as usize);
            }
            Component::Unknown(raw) => {
                let header = raw.header(config)?;
                header.encode(dst);
                dst.put_slice(&raw.body);
                dst.put_bytes(0, header.padding as usize);
            }
        }
        Ok(())
    }

    /// Decode one component from the front of `src`.
    ///
    /// `src` holds exactly the not-yet-consumed remainder of the message, so
    /// any declared length that does not fit in it is `Malformed`. Padding
    /// must be zero-filled; anything else is `Malformed` too.
    pub fn decode(src: &mut Bytes, config: &CodecConfig) -> Result<Self> {
        claim(src, COMPONENT_HEADER_SIZE, "component header")?;
        let base = ComponentHeader::decode(src)?;

        match base.kind() {
            Some(ComponentTag::Meta) => {
                claim(src, META_COMPONENT_HEADER_SIZE - COMPONENT_HEADER_SIZE, "meta component header")?;
                let header_padding = src.chunk()[1] as usize;
                claim(src, 2 + header_padding, "meta component header padding")?;
                let header = MetaComponentHeader::decode_after(base, src)?;

                claim(src, base.body_and_padding_len(), "meta component body")?;
                let fields = src.split_to(base.size as usize);
                skip_padding(src, base.padding as usize, "component padding")?;

                Ok(Component::Meta(MetaComponent {
                    num_fields: header.num_fields,
                    fields,
                }))
            }
            Some(ComponentTag::Payload) => {
                claim(src, PAYLOAD_COMPONENT_HEADER_SIZE - COMPONENT_HEADER_SIZE, "payload component header")?;
                let header = PayloadComponentHeader::decode_after(base, src)?;
                header.validate()?;

                claim(src, base.body_and_padding_len(), "payload component body")?;
                let namespace = src.split_to(header.namespace_len as usize);
                let key = src.split_to(header.key_len as usize);
                let value = src.split_to(header.value_len as usize);
                skip_padding(src, base.padding as usize, "component padding")?;

                Ok(Component::Payload(PayloadComponent { namespace, key, value }))
            }
            None if config.reject_unknown_components => Err(FrameError::Malformed(format!(
                "unknown component tag 0x{:02x}",
                base.tag
            ))),
            None => {
                claim(src, base.body_and_padding_len(), "component body")?;
                let body = src.split_to(base.size as usize);
                skip_padding(src, base.padding as usize, "component padding")?;

                Ok(Component::Unknown(RawComponent { tag: base.tag, body }))
            }
        }
    }
}
