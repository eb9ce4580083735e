//! Bounded busy-wait retries driven by an injectable [`Clock`].
//!
//! Targets without blocking primitives poll instead of parking, so the retry
//! loop spins on the clock. Elapsed time uses wrapping `u32` arithmetic, which
//! keeps windows that straddle a counter rollover correct. Once started, a
//! retry cannot be cancelled; it ends on success or when the window closes.

use crate::port::Clock;

/// A timeout window opened at a clock reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deadline {
    start_ms: u32,
    timeout_ms: u32,
}

impl Deadline {
    /// Opens a window of `timeout_ms` at the clock's current reading.
    pub fn start<C: Clock + ?Sized>(clock: &C, timeout_ms: u32) -> Self {
        Self {
            start_ms: clock.now_ms(),
            timeout_ms,
        }
    }

    /// Milliseconds since the window opened, across counter rollover.
    pub fn elapsed_ms<C: Clock + ?Sized>(&self, clock: &C) -> u32 {
        clock.now_ms().wrapping_sub(self.start_ms)
    }

    /// `true` once the full timeout has elapsed.
    pub fn expired<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        self.elapsed_ms(clock) >= self.timeout_ms
    }

    /// Length of the window.
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}

/// The retry window closed before an attempt succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expired {
    pub elapsed_ms: u32,
}

/// Calls `attempt` until it yields `Some` or `timeout_ms` have elapsed.
///
/// `attempt` always runs at least once, even with a zero timeout. The clock is
/// sampled after each failed attempt.
pub fn retry_until<C, T, F>(clock: &C, timeout_ms: u32, mut attempt: F) -> Result<T, Expired>
where
    C: Clock + ?Sized,
    F: FnMut() -> Option<T>,
{
    let deadline = Deadline::start(clock, timeout_ms);
    loop {
        if let Some(value) = attempt() {
            return Ok(value);
        }
        let elapsed_ms = deadline.elapsed_ms(clock);
        if elapsed_ms >= timeout_ms {
            return Err(Expired { elapsed_ms });
        }
        std::hint::spin_loop();
    }
}
