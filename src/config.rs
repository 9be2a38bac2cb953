//! Configuration for kvframe
//!
//! Centralized codec configuration with sensible defaults.

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

/// Largest alignment whose padding still fits the 1-byte padding fields
pub const MAX_COMPONENT_ALIGNMENT: usize = 128;

/// Codec configuration shared by the encoder and decoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    // -------------------------------------------------------------------------
    // Size Limits
    // -------------------------------------------------------------------------
    /// Upper bound on `msg_size`, applied on both encode and decode
    pub max_message_size: u32,

    // -------------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------------
    /// Every encoded component is padded to a multiple of this many bytes.
    /// Must be a power of two no larger than [`MAX_COMPONENT_ALIGNMENT`].
    pub component_alignment: usize,

    // -------------------------------------------------------------------------
    // Decoding Policy
    // -------------------------------------------------------------------------
    /// Reject components whose tag is neither meta nor payload
    /// instead of carrying them through as opaque bytes
    pub reject_unknown_components: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_message_size: 16 * 1024 * 1024, // 16 MB
            component_alignment: 8,
            reject_unknown_components: false,
        }
    }
}

impl CodecConfig {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the configured values can be honored on the wire
    pub fn validate(&self) -> Result<()> {
        let align = self.component_alignment;
        if align == 0 || !align.is_power_of_two() || align > MAX_COMPONENT_ALIGNMENT {
            return Err(FrameError::Config(format!(
                "component_alignment must be a power of two in 1..={}, got {}",
                MAX_COMPONENT_ALIGNMENT, align
            )));
        }

        if (self.max_message_size as usize) < crate::protocol::FIXED_HEADERS_SIZE {
            return Err(FrameError::Config(format!(
                "max_message_size {} is smaller than the fixed headers ({} bytes)",
                self.max_message_size,
                crate::protocol::FIXED_HEADERS_SIZE
            )));
        }

        Ok(())
    }

    /// Number of zero bytes needed to bring `len` up to the alignment boundary
    pub(crate) fn padding_for(&self, len: usize) -> Result<usize> {
        let align = self.component_alignment;
        if align == 0 {
            return Err(FrameError::Config(
                "component_alignment must be at least 1".to_string(),
            ));
        }
        Ok((align - len % align) % align)
    }
}

/// Builder for CodecConfig
#[derive(Default)]
pub struct ConfigBuilder {
    config: CodecConfig,
}

impl ConfigBuilder {
    /// Set the maximum accepted message size (in bytes)
    pub fn max_message_size(mut self, size: u32) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Set the component alignment (in bytes)
    pub fn component_alignment(mut self, align: usize) -> Self {
        self.config.component_alignment = align;
        self
    }

    /// Reject components with an unrecognized tag
    pub fn reject_unknown_components(mut self, reject: bool) -> Self {
        self.config.reject_unknown_components = reject;
        self
    }

    /// Build and validate the config
    pub fn build(self) -> Result<CodecConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
