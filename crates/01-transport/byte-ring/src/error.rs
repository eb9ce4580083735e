//! Error handling helpers for the byte ring crate.
//!
//! The ring keeps its error surface tiny: capacity is checked at compile
//! time, so the only runtime failure is handing out the producer/consumer
//! roles a second time. Data-path operations report outcomes instead of
//! errors.

use std::fmt;

/// Convenience result alias for fallible ring operations.
pub type RingResult<T, E = RingError> = Result<T, E>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Errors surfaced by ring setup helpers.
pub enum RingError {
    /// The producer and consumer handles of this ring were already taken.
    AlreadySplit,
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingError::AlreadySplit => {
                write!(f, "ring producer/consumer handles were already handed out")
            }
        }
    }
}

impl std::error::Error for RingError {}
