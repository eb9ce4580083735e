//! Integer encodings for callers bound to the C-style RTT hooks.
//!
//! Reads map "nothing available" to `-1` and a byte to `0..=255`. Writes
//! report the claimed byte count, which is `0` only after a transmit timeout.

use crate::writer::WriteOutcome;

/// Value returned by a raw read when no byte is available.
pub const EMPTY_READ: i32 = -1;

pub const fn encode_read(byte: Option<u8>) -> i32 {
    match byte {
        Some(byte) => byte as i32,
        None => EMPTY_READ,
    }
}

/// Inverse of [`encode_read`]; values outside `-1..=255` decode as empty.
pub fn decode_read(raw: i32) -> Option<u8> {
    u8::try_from(raw).ok()
}

/// Claimed byte count of a write, saturated to `u32`.
pub fn encode_claimed(outcome: &WriteOutcome) -> u32 {
    u32::try_from(outcome.claimed()).unwrap_or(u32::MAX)
}
