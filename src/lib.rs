//! # kvframe
//!
//! Binary framing codec for request/response messages exchanged with a
//! distributed key-value storage service:
//! - Fixed 12-byte envelope with protocol magic/version validation
//! - Operational header with packed flags and a shard-id/status slot
//! - Chain of size-prefixed, tagged, aligned components
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │               Transport / Request Handlers                  │
//! │                    (external)                               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Message
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │            MessageEncoder / MessageDecoder                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────┐
//!          │            │                 │
//!          ▼            ▼                 ▼
//!   ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//!   │  Message    │ │ Operational │ │ Components  │
//!   │  Header     │ │ Header      │ │ Meta/Payload│
//!   └─────────────┘ └─────────────┘ └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FrameError, Result};
pub use config::CodecConfig;
pub use protocol::{Message, MessageDecoder, MessageEncoder};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvframe
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
