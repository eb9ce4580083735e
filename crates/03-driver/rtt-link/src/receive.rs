//! Producer side: moves host bytes from the transport into the ingress ring.
//!
//! [`ReceiveHandler::on_receive_event`] is invoked by the transport's event
//! dispatch, possibly at interrupt level. It stages at most one chunk on the
//! stack, offers it to the ring once and returns; it never blocks, allocates
//! or retries a short read. The next transport event re-invokes it.

use byte_ring::{OverflowPolicy, Producer, PushOutcome};
use log::trace;

use crate::config::{RttConfig, MAX_CHUNK_LEN};
use crate::port::TransportRx;
use crate::LinkResult;

/// What a single receive event did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RxOutcome {
    /// The transport had no bytes; the ring was not touched.
    Idle,
    /// A chunk was read and offered to the ring.
    Received(PushOutcome),
}

impl RxOutcome {
    /// Bytes that reached the ring.
    pub const fn accepted(&self) -> usize {
        match self {
            RxOutcome::Idle => 0,
            RxOutcome::Received(push) => push.accepted(),
        }
    }

    /// Bytes read from the transport and then dropped on overflow.
    pub const fn dropped(&self) -> usize {
        match self {
            RxOutcome::Idle => 0,
            RxOutcome::Received(push) => push.dropped(),
        }
    }
}

pub struct ReceiveHandler<'a, R, const N: usize> {
    transport: R,
    producer: Producer<'a, N>,
    policy: OverflowPolicy,
    stage_len: usize,
}

impl<'a, R: TransportRx, const N: usize> ReceiveHandler<'a, R, N> {
    pub fn new(transport: R, producer: Producer<'a, N>, config: &RttConfig) -> LinkResult<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            producer,
            policy: config.overflow,
            stage_len: config.rx_stage_len,
        })
    }

    /// Pulls one staged chunk from the transport into the ring.
    pub fn on_receive_event(&mut self) -> RxOutcome {
        let mut stage = [0u8; MAX_CHUNK_LEN];
        let read = self
            .transport
            .read(&mut stage[..self.stage_len])
            .min(self.stage_len);
        if read == 0 {
            return RxOutcome::Idle;
        }

        let push = self.producer.try_push(&stage[..read], self.policy);
        if push.dropped() > 0 {
            trace!(
                "rtt::rx: dropped {} of {} bytes ({:?})",
                push.dropped(),
                read,
                self.policy
            );
        }
        RxOutcome::Received(push)
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub fn transport(&self) -> &R {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut R {
        &mut self.transport
    }
}
