//! Up-channel egress: pushes target output to the host transport.
//!
//! Per call the writer walks a small state machine:
//!
//! ```text
//! GATE_CHECK ── closed ──────────────────────────────────────────▶ NoPeer(len)
//!     │ open
//!     ▼
//! for each chunk (≤ tx_chunk_len):
//!     RETRY_UNTIL_ACCEPTED_OR_TIMEOUT ── timeout ───────────────▶ TimedOut (0 claimed)
//!     │ accepted
//!     ▼
//! FLUSH ────────────────────────────────────────────────────────▶ Sent(len)
//! ```
//!
//! A closed gate discards the payload but still claims it, so a target
//! printing with nobody attached never stalls. A timeout claims nothing even
//! if earlier chunks already left; callers treat it as "possibly partial, do
//! not blindly retry".

use log::{debug, trace};

use crate::channel::UpChannel;
use crate::config::RttConfig;
use crate::deadline::retry_until;
use crate::port::{Clock, TransportTx};
use crate::{sentinel, LinkResult};

/// What a single write did with its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Every chunk was accepted and the transport flushed.
    Sent(usize),
    /// The channel is not served; nothing was transmitted.
    Ignored(usize),
    /// The gate was closed; the payload was discarded.
    NoPeer(usize),
    /// A chunk was not accepted in time. `sent` bytes had already been taken
    /// by the transport and are not retracted.
    TimedOut { sent: usize },
}

impl WriteOutcome {
    /// Bytes reported back to the protocol engine as written.
    pub const fn claimed(&self) -> usize {
        match *self {
            WriteOutcome::Sent(len) | WriteOutcome::Ignored(len) | WriteOutcome::NoPeer(len) => {
                len
            }
            WriteOutcome::TimedOut { .. } => 0,
        }
    }

    /// Bytes the transport actually took.
    pub const fn transmitted(&self) -> usize {
        match *self {
            WriteOutcome::Sent(len) => len,
            WriteOutcome::Ignored(_) | WriteOutcome::NoPeer(_) => 0,
            WriteOutcome::TimedOut { sent } => sent,
        }
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self, WriteOutcome::TimedOut { .. })
    }
}

pub struct EgressWriter<T, C> {
    transport: T,
    clock: C,
    chunk_len: usize,
    timeout_ms: u32,
}

impl<T: TransportTx, C: Clock> EgressWriter<T, C> {
    pub fn new(transport: T, clock: C, config: &RttConfig) -> LinkResult<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            clock,
            chunk_len: config.tx_chunk_len,
            timeout_ms: config.tx_timeout_ms,
        })
    }

    /// Sends `data` on `channel`. Busy-waits for at most `tx_timeout_ms` per chunk.
    pub fn write(&mut self, channel: UpChannel, data: &[u8]) -> WriteOutcome {
        if !channel.is_served() {
            return WriteOutcome::Ignored(data.len());
        }
        if data.is_empty() {
            return WriteOutcome::Sent(0);
        }

        let state = self.transport.link_state();
        if !state.is_open() {
            trace!("rtt::tx: gate closed ({state:?}), discarding {} bytes", data.len());
            return WriteOutcome::NoPeer(data.len());
        }

        let mut sent = 0;
        for chunk in data.chunks(self.chunk_len) {
            match self.send_chunk(chunk) {
                Ok(()) => sent += chunk.len(),
                Err(partial) => {
                    debug!(
                        "rtt::tx: chunk timed out after {} ms ({} of {} bytes already sent)",
                        self.timeout_ms,
                        sent + partial,
                        data.len()
                    );
                    return WriteOutcome::TimedOut {
                        sent: sent + partial,
                    };
                }
            }
        }

        self.transport.flush();
        WriteOutcome::Sent(data.len())
    }

    /// Integer form of [`EgressWriter::write`]: the claimed byte count.
    pub fn write_raw(&mut self, channel: u32, data: &[u8]) -> u32 {
        sentinel::encode_claimed(&self.write(UpChannel(channel), data))
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Retries `chunk` until all of it is accepted. A short write resumes
    /// from the first unaccepted byte. On timeout returns how much of the
    /// chunk was taken.
    fn send_chunk(&mut self, chunk: &[u8]) -> Result<(), usize> {
        let transport = &mut self.transport;
        let mut offset = 0;
        let result = retry_until(&self.clock, self.timeout_ms, || {
            let accepted = transport.write(&chunk[offset..]);
            offset += accepted.min(chunk.len() - offset);
            (offset == chunk.len()).then_some(())
        });
        result.map_err(|_| offset)
    }
}
