//! Threaded receive path: a host thread feeds the mock transport, a "USB task"
//! thread services receive events, and the test thread polls the reader.

use crate::checks::{verify_overflowed, verify_receive};
use crate::recording::{RecordingRx, RxLog};
use anyhow::{anyhow, Result};
use byte_ring::ByteRing;
use crossbeam_channel::{bounded, unbounded};
use mock::MockTransport;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rtt_link::{ChannelReader, DownChannel, OverflowPolicy, ReceiveHandler, RttConfig, RxOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Host traffic: a running counter split into random-sized packets.
fn host_packets(seed: u64, total: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut packets = Vec::new();
    let mut next = 0usize;
    while next < total {
        let len = rng.gen_range(1..=96).min(total - next);
        packets.push((next..next + len).map(|i| (i % 251) as u8).collect());
        next += len;
    }
    packets
}

struct RunReport {
    sent: Vec<u8>,
    received: Vec<u8>,
    log: RxLog,
}

/// Drives one full host -> ring -> reader session across three threads.
fn run_session<const N: usize>(
    ring: &ByteRing<N>,
    policy: OverflowPolicy,
    packets: Vec<Vec<u8>>,
    reader_pause: Option<Duration>,
) -> Result<RunReport> {
    let (producer, consumer) = ring.split()?;
    let host = MockTransport::new();
    let log = Arc::new(Mutex::new(RxLog::default()));
    let rx = RecordingRx::new(host.clone(), Arc::clone(&log));
    let config = RttConfig::new().with_overflow(policy);
    let mut handler = ReceiveHandler::new(rx, producer, &config)?;
    let mut reader = ChannelReader::new(consumer);
    let sent: Vec<u8> = packets.concat();

    let (event_tx, event_rx) = unbounded::<()>();
    let usb_done = AtomicBool::new(false);

    let received = thread::scope(|scope| {
        scope.spawn(move || {
            for packet in packets {
                host.host_send(&packet);
                if event_tx.send(()).is_err() {
                    break;
                }
            }
        });

        let usb_done = &usb_done;
        scope.spawn(move || {
            // Each event drains what the transport holds, one stage at a time.
            for () in event_rx.iter() {
                loop {
                    let outcome = handler.on_receive_event();
                    handler.transport_mut().settle(outcome);
                    if outcome == RxOutcome::Idle {
                        break;
                    }
                }
            }
            usb_done.store(true, Ordering::Release);
        });

        let mut received = Vec::with_capacity(sent.len());
        loop {
            let finished = usb_done.load(Ordering::Acquire);
            match reader.read_one(DownChannel::PRIMARY) {
                Some(byte) => received.push(byte),
                None if finished => break,
                None => match reader_pause {
                    Some(pause) => thread::sleep(pause),
                    None => thread::yield_now(),
                },
            }
        }
        received
    });

    let log = log.lock().clone();
    Ok(RunReport {
        sent,
        received,
        log,
    })
}

fn check(report: &RunReport, policy: OverflowPolicy) -> Result<()> {
    verify_receive(&report.sent, &report.received, &report.log, policy).map_err(|e| anyhow!(e))
}

#[test]
fn fast_reader_drop_tail_keeps_order() -> Result<()> {
    let ring = ByteRing::<1024>::new();
    let report = run_session(
        &ring,
        OverflowPolicy::DropTailBytes,
        host_packets(7, 40_000),
        None,
    )?;
    check(&report, OverflowPolicy::DropTailBytes)
}

#[test]
fn fast_reader_whole_chunk_keeps_order() -> Result<()> {
    let ring = ByteRing::<1024>::new();
    let report = run_session(
        &ring,
        OverflowPolicy::DropWholeChunk,
        host_packets(11, 40_000),
        None,
    )?;
    check(&report, OverflowPolicy::DropWholeChunk)
}

/// A slow reader and a tiny ring force drops; what survives is still ordered.
#[test]
fn slow_reader_small_ring_under_both_policies() -> Result<()> {
    for policy in [OverflowPolicy::DropTailBytes, OverflowPolicy::DropWholeChunk] {
        let ring = ByteRing::<32>::new();
        let report = run_session(
            &ring,
            policy,
            host_packets(23, 4_000),
            Some(Duration::from_micros(50)),
        )?;
        check(&report, policy)?;
        if report.received.len() != report.log.accepted() {
            return Err(anyhow!(
                "{policy:?}: read {} bytes, ring accepted {}",
                report.received.len(),
                report.log.accepted()
            ));
        }
    }
    Ok(())
}

/// The USB task runs to completion before the reader wakes, so the ring holds
/// at most its capacity and the rest was dropped.
#[test]
fn stalled_reader_drops_past_capacity() -> Result<()> {
    static RING: ByteRing<64> = ByteRing::new();
    let (producer, consumer) = RING.split()?;
    let host = MockTransport::new();
    let log = Arc::new(Mutex::new(RxLog::default()));
    let mut handler = ReceiveHandler::new(
        RecordingRx::new(host.clone(), Arc::clone(&log)),
        producer,
        &RttConfig::new(),
    )?;
    let (ready_tx, ready_rx) = bounded::<()>(1);
    let sent: Vec<u8> = host_packets(3, 500).concat();
    let inbound = &sent;

    let received = thread::scope(|scope| {
        scope.spawn(move || {
            host.host_send(inbound);
            loop {
                let outcome = handler.on_receive_event();
                handler.transport_mut().settle(outcome);
                if outcome == RxOutcome::Idle {
                    break;
                }
            }
            let _ = ready_tx.send(());
        });

        ready_rx.recv()?;
        let mut reader = ChannelReader::new(consumer);
        let mut buf = [0u8; 128];
        let n = reader.read(DownChannel::PRIMARY, &mut buf);
        anyhow::Ok(buf[..n].to_vec())
    })?;

    let log = log.lock().clone();
    verify_overflowed(&log, RING.capacity()).map_err(|e| anyhow!(e))?;
    verify_receive(&sent, &received, &log, OverflowPolicy::DropTailBytes)
        .map_err(|e| anyhow!(e))?;
    assert_eq!(received, sent[..63]);
    Ok(())
}

#[test]
#[ignore]
fn slow_long_session_with_jittery_reader() -> Result<()> {
    for (seed, policy) in [
        (101, OverflowPolicy::DropTailBytes),
        (202, OverflowPolicy::DropWholeChunk),
    ] {
        let ring = ByteRing::<256>::new();
        let report = run_session(
            &ring,
            policy,
            host_packets(seed, 1_000_000),
            Some(Duration::from_micros(1)),
        )?;
        check(&report, policy)?;
    }
    Ok(())
}
