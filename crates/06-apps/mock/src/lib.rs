//! Mock host transport and clocks for driving the RTT bridge without hardware.
//!
//! [`MockTransport`] is a cheap handle onto shared state, so one clone can be
//! moved into the receive path while another backs the egress writer and a
//! third is kept by the test to play the host.

use parking_lot::Mutex;
use rtt_link::{Clock, LinkState, TransportRx, TransportTx};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How the mock answers transport writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AcceptMode {
    /// Take every offered byte.
    All,
    /// Take nothing, as when the host stopped reading.
    Nothing,
    /// Take at most this many bytes per call.
    UpTo(usize),
    /// Per-call budgets consumed in order; the host stops reading once the
    /// script runs out.
    Script(VecDeque<usize>),
}

/// One call to [`TransportTx::write`] as seen by the mock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteCall {
    pub offered: usize,
    pub accepted: SmallVec<[u8; 64]>,
}

#[derive(Debug)]
struct MockState {
    inbound: VecDeque<u8>,
    link: LinkState,
    accept: AcceptMode,
    writes: Vec<WriteCall>,
    flushes: usize,
    reads: usize,
    write_cost: Option<(ManualClock, u32)>,
    write_delay: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Configured, connected and accepting everything.
    pub fn new() -> Self {
        Self::with_link(LinkState::OPEN)
    }

    /// Nobody attached: every readiness signal low.
    pub fn disconnected() -> Self {
        Self::with_link(LinkState::default())
    }

    pub fn with_link(link: LinkState) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                inbound: VecDeque::new(),
                link,
                accept: AcceptMode::All,
                writes: Vec::new(),
                flushes: 0,
                reads: 0,
                write_cost: None,
                write_delay: None,
            })),
        }
    }

    /// Queues bytes as if the host had sent them.
    pub fn host_send(&self, bytes: &[u8]) {
        self.state.lock().inbound.extend(bytes);
    }

    pub fn pending_inbound(&self) -> usize {
        self.state.lock().inbound.len()
    }

    pub fn set_link(&self, link: LinkState) {
        self.state.lock().link = link;
    }

    pub fn set_accept(&self, accept: AcceptMode) {
        self.state.lock().accept = accept;
    }

    /// Advances `clock` by `cost_ms` on every write attempt.
    pub fn charge_writes_to(&self, clock: &ManualClock, cost_ms: u32) {
        self.state.lock().write_cost = Some((clock.clone(), cost_ms));
    }

    /// Sleeps for `delay` on every write attempt, so real-time retry loops
    /// make a bounded number of calls.
    pub fn throttle_writes(&self, delay: Duration) {
        self.state.lock().write_delay = Some(delay);
    }

    pub fn write_calls(&self) -> Vec<WriteCall> {
        self.state.lock().writes.clone()
    }

    /// Every byte the transport accepted, in order.
    pub fn transmitted(&self) -> Vec<u8> {
        self.state
            .lock()
            .writes
            .iter()
            .flat_map(|call| call.accepted.iter().copied())
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        self.state.lock().flushes
    }

    pub fn read_count(&self) -> usize {
        self.state.lock().reads
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportRx for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut state = self.state.lock();
        state.reads += 1;
        let n = buf.len().min(state.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(state.inbound.drain(..n)) {
            *slot = byte;
        }
        n
    }
}

impl TransportTx for MockTransport {
    fn write(&mut self, buf: &[u8]) -> usize {
        let delay = self.state.lock().write_delay;
        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        let mut state = self.state.lock();
        if let Some((clock, cost)) = &state.write_cost {
            clock.advance(*cost);
        }

        let budget = match &mut state.accept {
            AcceptMode::All => buf.len(),
            AcceptMode::Nothing => 0,
            AcceptMode::UpTo(limit) => *limit,
            AcceptMode::Script(budgets) => budgets.pop_front().unwrap_or(0),
        };
        let n = budget.min(buf.len());
        state.writes.push(WriteCall {
            offered: buf.len(),
            accepted: SmallVec::from_slice(&buf[..n]),
        });
        n
    }

    fn flush(&mut self) {
        self.state.lock().flushes += 1;
    }

    fn is_configured(&self) -> bool {
        self.state.lock().link.configured
    }

    fn is_peer_ready(&self) -> bool {
        self.state.lock().link.peer_ready
    }

    fn is_connected(&self) -> bool {
        self.state.lock().link.connected
    }
}

/// Clock that only moves when told to.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU32>,
}

impl ManualClock {
    pub fn starting_at(ms: u32) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(ms)),
        }
    }

    pub fn advance(&self, ms: u32) {
        self.now.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn set(&self, ms: u32) {
        self.now.store(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.load(Ordering::Relaxed)
    }
}

/// Clock that advances by a fixed step on every reading.
#[derive(Debug)]
pub struct SteppingClock {
    now: AtomicU32,
    step: u32,
    reads: AtomicU32,
}

impl SteppingClock {
    pub fn new(start_ms: u32, step_ms: u32) -> Self {
        Self {
            now: AtomicU32::new(start_ms),
            step: step_ms,
            reads: AtomicU32::new(0),
        }
    }

    /// Current value without advancing.
    pub fn peek(&self) -> u32 {
        self.now.load(Ordering::Relaxed)
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl Clock for SteppingClock {
    fn now_ms(&self) -> u32 {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.now.fetch_add(self.step, Ordering::Relaxed)
    }
}
