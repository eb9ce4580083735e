//! Lock-free byte ring shared between an event-driven producer and a polled
//! consumer.
//!
//! * [`ByteRing`] – fixed-capacity single-producer/single-consumer byte queue
//!   with `N` slots, `N - 1` of them usable.
//! * [`Producer`] / [`Consumer`] – role handles handed out once by
//!   [`ByteRing::split`]; only the producer moves `head`, only the consumer
//!   moves `tail`.
//! * [`OverflowPolicy`] / [`PushOutcome`] – what happens to a batch that
//!   does not fit.
//! * [`RingError`] – setup failures.

mod error;
mod ring;

pub use error::{RingError, RingResult};
pub use ring::{ByteRing, Consumer, OverflowPolicy, Producer, PushOutcome};
