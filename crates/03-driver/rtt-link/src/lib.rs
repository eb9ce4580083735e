//! RTT channel plumbing between a target's debug channels and a host-facing
//! serial transport.
//!
//! * [`ReceiveHandler`] – transport event hook that stages inbound bytes into a
//!   [`byte_ring::ByteRing`] (producer context, interrupt-safe).
//! * [`ChannelReader`] – polled reads of down channel 0 (consumer context).
//! * [`EgressWriter`] – chunked, timeout-bounded writes to up channel 0.
//! * [`RttBridge`] – all three behind one handle for single-context targets.
//! * [`TransportRx`] / [`TransportTx`] / [`Clock`] – collaborator seams.
//!
//! Only channel 0 in each direction is served; the control block that maps
//! other channels lives elsewhere.

mod bridge;
mod channel;
mod config;
pub mod deadline;
mod error;
mod port;
mod reader;
mod receive;
pub mod sentinel;
mod writer;

pub use bridge::RttBridge;
pub use byte_ring::{ByteRing, OverflowPolicy, PushOutcome, RingError};
pub use channel::{DownChannel, UpChannel};
pub use config::{
    RttConfig, DEFAULT_RX_STAGE_LEN, DEFAULT_TX_CHUNK_LEN, DEFAULT_TX_TIMEOUT_MS, MAX_CHUNK_LEN,
};
pub use deadline::{retry_until, Deadline, Expired};
pub use error::{LinkError, LinkResult};
pub use port::{Clock, LinkState, MonotonicClock, TransportRx, TransportTx};
pub use reader::ChannelReader;
pub use receive::{ReceiveHandler, RxOutcome};
pub use writer::{EgressWriter, WriteOutcome};
