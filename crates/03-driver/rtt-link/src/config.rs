//! Build-time tunables for the RTT bridge.
//!
//! Values are fixed once a handler or writer is constructed; nothing here is
//! mutated at runtime. The ring capacity is the `N` const generic of
//! [`byte_ring::ByteRing`] and therefore not part of this struct.

use byte_ring::OverflowPolicy;
use serde::{Deserialize, Serialize};

use crate::{LinkError, LinkResult};

/// Upper bound for both the receive stage and the transmit chunk.
pub const MAX_CHUNK_LEN: usize = 64;
/// Bytes pulled from the transport per receive event.
pub const DEFAULT_RX_STAGE_LEN: usize = 64;
/// Largest slice handed to a single transport write.
pub const DEFAULT_TX_CHUNK_LEN: usize = 64;
/// Time a single chunk may spend being retried.
pub const DEFAULT_TX_TIMEOUT_MS: u32 = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RttConfig {
    pub rx_stage_len: usize,
    pub tx_chunk_len: usize,
    pub tx_timeout_ms: u32,
    pub overflow: OverflowPolicy,
}

impl RttConfig {
    /// 64-byte stage and chunks, 25 ms per chunk, drop-tail on overflow.
    pub const fn new() -> Self {
        Self {
            rx_stage_len: DEFAULT_RX_STAGE_LEN,
            tx_chunk_len: DEFAULT_TX_CHUNK_LEN,
            tx_timeout_ms: DEFAULT_TX_TIMEOUT_MS,
            overflow: OverflowPolicy::DropTailBytes,
        }
    }

    /// Default sizes with whole-chunk dropping on receive overflow.
    pub const fn drop_whole_chunk() -> Self {
        Self::new().with_overflow(OverflowPolicy::DropWholeChunk)
    }

    /// Replaces the receive overflow policy.
    pub const fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Replaces the per-chunk transmit deadline.
    pub const fn with_tx_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.tx_timeout_ms = timeout_ms;
        self
    }

    /// Replaces the largest slice offered to one transport write.
    pub const fn with_tx_chunk_len(mut self, len: usize) -> Self {
        self.tx_chunk_len = len;
        self
    }

    /// Replaces the bytes staged per receive event.
    pub const fn with_rx_stage_len(mut self, len: usize) -> Self {
        self.rx_stage_len = len;
        self
    }

    /// Rejects stage or chunk lengths outside `1..=MAX_CHUNK_LEN`.
    pub fn validate(&self) -> LinkResult<()> {
        if self.rx_stage_len == 0 || self.rx_stage_len > MAX_CHUNK_LEN {
            return Err(LinkError::InvalidConfig(
                "rx_stage_len must be between 1 and 64 bytes",
            ));
        }
        if self.tx_chunk_len == 0 || self.tx_chunk_len > MAX_CHUNK_LEN {
            return Err(LinkError::InvalidConfig(
                "tx_chunk_len must be between 1 and 64 bytes",
            ));
        }
        Ok(())
    }
}

impl Default for RttConfig {
    fn default() -> Self {
        Self::new()
    }
}
