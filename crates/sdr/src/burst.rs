// Copyright 2025-2026 CEMAXECUTER LLC

//! Timestamp arithmetic for scheduled TX/RX bursts.
//!
//! Both modules' timestamp counters start when they are enabled and count
//! samples, so scheduling is plain addition on the sample clock.

use crate::metadata::Metadata;

/// Lead used by the sweep tool: 1/20 of a second of samples.
pub const DEFAULT_LEAD_DIVISOR: u32 = 20;

/// A timestamp `sample_rate / lead_divisor` samples after `now`.
pub fn schedule_after(now: u64, sample_rate: u32, lead_divisor: u32) -> u64 {
    now + u64::from(sample_rate / lead_divisor.max(1))
}

/// A matched TX and RX burst of `num_samples` each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstPlan {
    pub tx_at: u64,
    pub rx_at: u64,
    pub num_samples: u64,
}

impl BurstPlan {
    /// Schedule both bursts one lead interval after their current timestamps.
    pub fn new(tx_now: u64, rx_now: u64, sample_rate: u32, lead_divisor: u32, num_samples: usize) -> Self {
        Self {
            tx_at: schedule_after(tx_now, sample_rate, lead_divisor),
            rx_at: schedule_after(rx_now, sample_rate, lead_divisor),
            num_samples: num_samples as u64,
        }
    }

    pub fn tx_metadata(&self) -> Metadata {
        Metadata::tx_burst_at(self.tx_at)
    }

    pub fn rx_metadata(&self) -> Metadata {
        Metadata::rx_at(self.rx_at)
    }

    /// True once the TX clock has moved past the burst plus an equal guard.
    pub fn tx_drained(&self, tx_now: u64) -> bool {
        tx_now >= self.tx_at + 2 * self.num_samples
    }
}
