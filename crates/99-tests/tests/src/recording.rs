use log::trace;
use parking_lot::Mutex;
use rtt_link::{RxOutcome, TransportRx};
use std::sync::Arc;

/// One receive event as the producer context saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedChunk {
    pub bytes: Vec<u8>,
    pub accepted: usize,
}

/// Everything the producer context staged, in order.
#[derive(Clone, Debug, Default)]
pub struct RxLog {
    pub chunks: Vec<StagedChunk>,
    pub idle_events: usize,
}

impl RxLog {
    pub fn accepted(&self) -> usize {
        self.chunks.iter().map(|c| c.accepted).sum()
    }

    pub fn dropped(&self) -> usize {
        self.chunks.iter().map(|c| c.bytes.len() - c.accepted).sum()
    }

    pub fn staged(&self) -> usize {
        self.chunks.iter().map(|c| c.bytes.len()).sum()
    }
}

/// Wraps a receive transport and remembers what each read returned, so a
/// scenario can pair staged bytes with the ring's verdict on them.
pub struct RecordingRx<R> {
    inner: R,
    last: Vec<u8>,
    log: Arc<Mutex<RxLog>>,
}

impl<R: TransportRx> RecordingRx<R> {
    pub fn new(inner: R, log: Arc<Mutex<RxLog>>) -> Self {
        Self {
            inner,
            last: Vec::new(),
            log,
        }
    }

    /// Files the last staged read under `outcome`.
    pub fn settle(&mut self, outcome: RxOutcome) {
        let mut log = self.log.lock();
        match outcome {
            RxOutcome::Idle => log.idle_events += 1,
            RxOutcome::Received(push) => {
                trace!("recording: staged {} bytes, {push:?}", self.last.len());
                log.chunks.push(StagedChunk {
                    bytes: std::mem::take(&mut self.last),
                    accepted: push.accepted(),
                });
            }
        }
    }
}

impl<R: TransportRx> TransportRx for RecordingRx<R> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let n = self.inner.read(buf);
        self.last.clear();
        self.last.extend_from_slice(&buf[..n]);
        n
    }
}
