//! Collaborator seams: the host-facing transport and the millisecond clock.
//!
//! The receive side and the transmit side of the transport run in different
//! execution contexts, so they are separate traits. A backend that serves
//! both usually hands out two cheap handles onto the same device.

use std::time::Instant;

/// Inbound half of the host transport.
pub trait TransportRx {
    /// Copies up to `buf.len()` pending bytes into `buf`. Never blocks;
    /// returns 0 when nothing is available.
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

/// Outbound half of the host transport plus its readiness signals.
pub trait TransportTx {
    /// Queues bytes for transmission without blocking and returns how many
    /// were taken, possibly fewer than `buf.len()` and possibly 0.
    fn write(&mut self, buf: &[u8]) -> usize;

    /// Pushes queued bytes out to the host.
    fn flush(&mut self);

    /// The transport has been configured by the host.
    fn is_configured(&self) -> bool;

    /// The host asserted its ready signal (DTR on a CDC link).
    fn is_peer_ready(&self) -> bool;

    /// A host is attached to this endpoint.
    fn is_connected(&self) -> bool;

    /// Snapshot of the three readiness signals.
    fn link_state(&self) -> LinkState {
        LinkState {
            configured: self.is_configured(),
            peer_ready: self.is_peer_ready(),
            connected: self.is_connected(),
        }
    }
}

/// Monotonic millisecond counter. Wraps at `u32::MAX`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Readiness signals sampled from a [`TransportTx`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkState {
    pub configured: bool,
    pub peer_ready: bool,
    pub connected: bool,
}

impl LinkState {
    /// All three signals asserted.
    pub const OPEN: Self = Self {
        configured: true,
        peer_ready: true,
        connected: true,
    };

    /// The gate: outbound bytes are only transmitted when this holds.
    pub const fn is_open(&self) -> bool {
        self.configured && self.peer_ready && self.connected
    }
}

impl<T: TransportRx + ?Sized> TransportRx for &mut T {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        (**self).read(buf)
    }
}

impl<T: TransportTx + ?Sized> TransportTx for &mut T {
    fn write(&mut self, buf: &[u8]) -> usize {
        (**self).write(buf)
    }

    fn flush(&mut self) {
        (**self).flush()
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }

    fn is_peer_ready(&self) -> bool {
        (**self).is_peer_ready()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Host clock measuring milliseconds since construction.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the wrap-around every `Clock` consumer already handles.
        self.origin.elapsed().as_millis() as u32
    }
}
