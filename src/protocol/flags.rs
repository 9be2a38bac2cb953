//! Operational flags
//!
//! The one-byte flag field of the operational header.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Operational flag bits (8 bits)
    ///
    /// Unknown bits are retained so a relay can forward them untouched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct OpFlags: u8 {
        /// Request is a replicated copy from a peer
        const REPLICATION = 0b0000_0001;

        /// Tombstone the record instead of removing it
        const MARK_DELETE = 0b0000_0010;

        /// Delete being propagated via replication
        const DELETE_REPLICATION = 0b0000_0100;
    }
}

impl OpFlags {
    /// Bits tested by the delete-replication predicate
    const DELETE_REPLICATION_MASK: u8 = 0x05;

    /// Create flags from raw byte value (all 256 values are valid)
    pub const fn from_byte(byte: u8) -> Self {
        Self::from_bits_retain(byte)
    }

    /// Convert to raw byte value
    pub const fn to_byte(self) -> u8 {
        self.bits()
    }

    pub fn is_replication(self) -> bool {
        self.contains(Self::REPLICATION)
    }

    pub fn set_replication(&mut self) {
        self.insert(Self::REPLICATION);
    }

    pub fn is_mark_delete(self) -> bool {
        self.contains(Self::MARK_DELETE)
    }

    pub fn set_mark_delete(&mut self) {
        self.insert(Self::MARK_DELETE);
    }

    /// True iff both the replication bit and the delete-replication bit are set
    pub fn is_delete_replication(self) -> bool {
        self.bits() & Self::DELETE_REPLICATION_MASK == Self::DELETE_REPLICATION_MASK
    }

    /// Mark as a replicated delete.
    ///
    /// Sets replication, mark-delete and delete-replication as one unit, so
    /// every predicate reads true afterwards.
    pub fn set_delete_replication(&mut self) {
        self.insert(Self::REPLICATION | Self::MARK_DELETE | Self::DELETE_REPLICATION);
    }
}

impl Default for OpFlags {
    fn default() -> Self {
        Self::empty()
    }
}
