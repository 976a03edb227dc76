// Copyright 2025-2026 CEMAXECUTER LLC

use std::os::raw::c_uint;

/// TX: the first sample of the buffer starts a burst.
pub const FLAG_TX_BURST_START: u32 = 1 << 0;
/// TX: the last sample of the buffer ends a burst.
pub const FLAG_TX_BURST_END: u32 = 1 << 1;
/// TX: transmit as soon as possible, ignoring the timestamp.
pub const FLAG_TX_NOW: u32 = 1 << 2;
/// TX: move the burst to the timestamp, padding with zeros.
pub const FLAG_TX_UPDATE_TIMESTAMP: u32 = 1 << 3;
/// RX: read the next available samples, ignoring the timestamp.
pub const FLAG_RX_NOW: u32 = 1 << 31;

/// RX: samples were lost in the host or device before this buffer.
pub const STATUS_OVERRUN: u32 = 1 << 0;
/// TX: the device ran out of samples to transmit.
pub const STATUS_UNDERRUN: u32 = 1 << 1;

/// Mirrors `struct bladerf_metadata`.
///
/// Passed by pointer to the sync RX/TX calls and handed to stream callbacks.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    /// Hardware timestamp, in samples since the module was enabled
    pub timestamp: u64,
    /// `FLAG_*` bits
    pub flags: u32,
    /// `STATUS_*` bits, written by the driver
    pub status: u32,
    /// Samples actually transferred, written by the driver on RX
    pub actual_count: c_uint,
    pub reserved: [u8; 32],
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            timestamp: 0,
            flags: 0,
            status: 0,
            actual_count: 0,
            reserved: [0; 32],
        }
    }
}

impl Metadata {
    /// Receive whatever is available next.
    pub fn rx_now() -> Self {
        Self {
            flags: FLAG_RX_NOW,
            ..Self::default()
        }
    }

    /// Receive starting at a hardware timestamp.
    pub fn rx_at(timestamp: u64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    /// A single-buffer burst scheduled at a hardware timestamp.
    pub fn tx_burst_at(timestamp: u64) -> Self {
        Self {
            timestamp,
            flags: FLAG_TX_BURST_START | FLAG_TX_BURST_END,
            ..Self::default()
        }
    }

    /// A single-buffer burst sent immediately.
    pub fn tx_burst_now() -> Self {
        Self {
            flags: FLAG_TX_BURST_START | FLAG_TX_BURST_END | FLAG_TX_NOW,
            ..Self::default()
        }
    }

    pub fn overrun(&self) -> bool {
        self.status & STATUS_OVERRUN != 0
    }

    pub fn underrun(&self) -> bool {
        self.status & STATUS_UNDERRUN != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_c_struct() {
        // u64 + u32 + u32 + unsigned int + 32 reserved bytes
        assert_eq!(std::mem::size_of::<Metadata>(), 56);
        assert_eq!(std::mem::align_of::<Metadata>(), 8);
    }

    #[test]
    fn test_constructors() {
        let rx = Metadata::rx_now();
        assert_eq!(rx.flags, FLAG_RX_NOW);
        assert_eq!(rx.timestamp, 0);

        let tx = Metadata::tx_burst_at(123_456);
        assert_eq!(tx.timestamp, 123_456);
        assert_eq!(tx.flags, FLAG_TX_BURST_START | FLAG_TX_BURST_END);
        assert_eq!(tx.flags & FLAG_TX_NOW, 0);

        assert_ne!(Metadata::tx_burst_now().flags & FLAG_TX_NOW, 0);
    }

    #[test]
    fn test_status_bits() {
        let mut meta = Metadata::default();
        assert!(!meta.overrun());
        meta.status = STATUS_OVERRUN;
        assert!(meta.overrun());
        assert!(!meta.underrun());
        meta.status |= STATUS_UNDERRUN;
        assert!(meta.underrun());
    }
}
