//! Egress against wall-clock time: the writer's per-chunk deadline measured
//! with the monotonic clock, and a host that wakes up mid-retry.

use anyhow::{ensure, Result};
use crossbeam_channel::bounded;
use mock::{AcceptMode, MockTransport};
use rtt_link::{
    EgressWriter, LinkState, MonotonicClock, RttConfig, UpChannel, WriteOutcome,
    DEFAULT_TX_TIMEOUT_MS,
};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn stalled_host_costs_one_deadline_per_write() -> Result<()> {
    let host = MockTransport::new();
    host.set_accept(AcceptMode::Nothing);
    host.throttle_writes(Duration::from_millis(1));
    let mut writer = EgressWriter::new(host.clone(), MonotonicClock::new(), &RttConfig::new())?;

    let started = Instant::now();
    let outcome = writer.write(UpChannel::PRIMARY, &[0x55; 200]);
    let elapsed = started.elapsed();

    ensure!(outcome == WriteOutcome::TimedOut { sent: 0 }, "got {outcome:?}");
    ensure!(
        elapsed >= Duration::from_millis(u64::from(DEFAULT_TX_TIMEOUT_MS)),
        "gave up after {elapsed:?}"
    );
    ensure!(
        elapsed < Duration::from_secs(2),
        "kept retrying for {elapsed:?}"
    );
    // Only the first chunk is attempted.
    ensure!(host.write_calls().iter().all(|call| call.offered == 64));
    ensure!(host.flush_count() == 0);
    Ok(())
}

#[test]
fn closed_gate_returns_immediately() -> Result<()> {
    let host = MockTransport::disconnected();
    host.set_accept(AcceptMode::Nothing);
    let mut writer = EgressWriter::new(host.clone(), MonotonicClock::new(), &RttConfig::new())?;

    let started = Instant::now();
    for _ in 0..100 {
        ensure!(writer.write(UpChannel::PRIMARY, b"log line\n") == WriteOutcome::NoPeer(9));
    }
    ensure!(started.elapsed() < Duration::from_millis(u64::from(DEFAULT_TX_TIMEOUT_MS)));
    ensure!(host.write_calls().is_empty());
    Ok(())
}

/// The host starts reading while the writer is still inside its window.
#[test]
fn host_waking_mid_retry_completes_the_write() -> Result<()> {
    let host = MockTransport::new();
    host.set_accept(AcceptMode::Nothing);
    host.throttle_writes(Duration::from_micros(200));
    let config = RttConfig::new().with_tx_timeout_ms(2_000);
    let mut writer = EgressWriter::new(host.clone(), MonotonicClock::new(), &config)?;
    let (started_tx, started_rx) = bounded::<()>(1);
    let payload: Vec<u8> = (0..=255u8).collect();

    let outcome = thread::scope(|scope| {
        let waker = host.clone();
        scope.spawn(move || {
            if started_rx.recv().is_ok() {
                thread::sleep(Duration::from_millis(5));
                waker.set_accept(AcceptMode::All);
            }
        });
        let _ = started_tx.send(());
        writer.write(UpChannel::PRIMARY, &payload)
    });

    ensure!(outcome == WriteOutcome::Sent(256), "got {outcome:?}");
    ensure!(host.transmitted() == payload);
    ensure!(host.flush_count() == 1);
    Ok(())
}

/// Unplugging the host between writes flips the writer to discard mode.
#[test]
fn unplug_between_writes() -> Result<()> {
    let host = MockTransport::new();
    let mut writer = EgressWriter::new(host.clone(), MonotonicClock::new(), &RttConfig::new())?;

    ensure!(writer.write(UpChannel::PRIMARY, b"before") == WriteOutcome::Sent(6));
    host.set_link(LinkState {
        connected: false,
        ..LinkState::OPEN
    });
    ensure!(writer.write(UpChannel::PRIMARY, b"during") == WriteOutcome::NoPeer(6));
    host.set_link(LinkState::OPEN);
    ensure!(writer.write(UpChannel::PRIMARY, b"after") == WriteOutcome::Sent(5));

    ensure!(host.transmitted() == b"beforeafter");
    Ok(())
}
