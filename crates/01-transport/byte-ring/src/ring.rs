//! Single-producer/single-consumer byte ring.
//!
//! Layout:
//!
//! ```text
//!       tail (consumer)           head (producer)
//!            v                         v
//! +----+----+----+----+----+----+----+----+
//! |    | A  | B  | C  | D  | E  |    |    |   N slots, N - 1 usable
//! +----+----+----+----+----+----+----+----+
//! ```
//!
//! The ring is empty iff `head == tail` and full iff `(head + 1) % N == tail`;
//! one slot is always left free so two indices are enough to tell the states
//! apart. The producer copies bytes into the free region and then publishes
//! `head` with `Release`. The consumer observes `head` with `Acquire` before
//! reading slots and hands them back by publishing `tail` with `Release`.
//! Neither side ever stores the other side's index, so no lock is taken and
//! the producer may run in interrupt context.

use crate::{RingError, RingResult};
#[cfg(feature = "loom")]
use loom::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::cell::UnsafeCell;
use std::fmt;
use std::ptr;
#[cfg(not(feature = "loom"))]
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Behaviour when an inbound batch is larger than the free space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverflowPolicy {
    /// Reject the entire batch unless all of it fits.
    DropWholeChunk,
    /// Store the leading bytes that fit and silently discard the remainder.
    #[default]
    DropTailBytes,
}

/// Result of offering a batch to the producer side of the ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// Every byte of the batch was stored.
    Accepted(usize),
    /// Only the first `accepted` bytes fit; `dropped` trailing bytes were discarded.
    Truncated { accepted: usize, dropped: usize },
    /// The batch did not fit and nothing was stored.
    Rejected(usize),
}

impl PushOutcome {
    /// Number of bytes that made it into the ring.
    pub const fn accepted(&self) -> usize {
        match *self {
            PushOutcome::Accepted(accepted) => accepted,
            PushOutcome::Truncated { accepted, .. } => accepted,
            PushOutcome::Rejected(_) => 0,
        }
    }

    /// Number of bytes of the batch that were discarded.
    pub const fn dropped(&self) -> usize {
        match *self {
            PushOutcome::Accepted(_) => 0,
            PushOutcome::Truncated { dropped, .. } => dropped,
            PushOutcome::Rejected(dropped) => dropped,
        }
    }

    /// `true` when no byte of the batch was lost.
    pub const fn is_lossless(&self) -> bool {
        matches!(self, PushOutcome::Accepted(_))
    }
}

/// Fixed-capacity byte queue shared by exactly one producer and one consumer.
///
/// `N` is the number of slots; `N - 1` bytes can be buffered. The ring is
/// built by a `const fn`, so it can live in a `static` for the lifetime of
/// the program, and it never allocates.
pub struct ByteRing<const N: usize> {
    head: AtomicUsize,
    tail: AtomicUsize,
    split: AtomicBool,
    slots: UnsafeCell<[u8; N]>,
}

// SAFETY: slots in `[tail, head)` are only read by the consumer role and slots
// in `[head, tail - 1)` are only written by the producer role. Each role moves
// its own index with a release store after touching the slots and reads the
// peer index with an acquire load, so the two ranges never overlap.
unsafe impl<const N: usize> Sync for ByteRing<N> {}

impl<const N: usize> ByteRing<N> {
    const SLOTS_OK: () = assert!(N >= 2, "ByteRing needs at least two slots");

    /// Creates an empty ring.
    #[cfg(not(feature = "loom"))]
    pub const fn new() -> Self {
        let () = Self::SLOTS_OK;
        Self {
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            split: AtomicBool::new(false),
            slots: UnsafeCell::new([0; N]),
        }
    }

    /// Creates an empty ring.
    #[cfg(feature = "loom")]
    pub fn new() -> Self {
        let () = Self::SLOTS_OK;
        Self {
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            split: AtomicBool::new(false),
            slots: UnsafeCell::new([0; N]),
        }
    }

    /// Maximum number of bytes the ring can hold (`N - 1`).
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Number of bytes currently buffered.
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        used(head, tail, N)
    }

    /// Number of bytes that can be pushed before the ring is full.
    pub fn free_space(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Returns `true` when `head == tail`.
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Returns `true` when advancing `head` would run into `tail`.
    pub fn is_full(&self) -> bool {
        self.free_space() == 0
    }

    /// Hands out the producer and consumer roles.
    ///
    /// Succeeds exactly once per ring; later calls fail with
    /// [`RingError::AlreadySplit`] so a `static` ring cannot grow a second
    /// producer or consumer.
    pub fn split(&self) -> RingResult<(Producer<'_, N>, Consumer<'_, N>)> {
        self.split
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RingError::AlreadySplit)?;
        Ok((Producer { ring: self }, Consumer { ring: self }))
    }

    /// Copies `bytes` into the ring according to `policy`. Only `head` is stored.
    ///
    /// # Safety
    /// The caller must be the only producer of this ring for the duration of
    /// the call: no other `producer_push` may run concurrently and no
    /// [`Producer`] handle may be in use.
    pub unsafe fn producer_push(&self, bytes: &[u8], policy: OverflowPolicy) -> PushOutcome {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        let free = N - 1 - used(head, tail, N);

        let count = match policy {
            OverflowPolicy::DropWholeChunk if bytes.len() > free => {
                return PushOutcome::Rejected(bytes.len());
            }
            _ => bytes.len().min(free),
        };

        if count > 0 {
            let first = count.min(N - head);
            let base = self.slots.get().cast::<u8>();
            // SAFETY: `count <= free`, so `[head, head + count)` modulo N lies in
            // the free region. The consumer does not read it until the release
            // store below publishes the new head.
            unsafe {
                ptr::copy_nonoverlapping(bytes.as_ptr(), base.add(head), first);
                ptr::copy_nonoverlapping(bytes.as_ptr().add(first), base, count - first);
            }
            self.head.store((head + count) % N, Ordering::Release);
        }

        if count == bytes.len() {
            PushOutcome::Accepted(count)
        } else {
            PushOutcome::Truncated {
                accepted: count,
                dropped: bytes.len() - count,
            }
        }
    }

    /// Removes and returns the oldest byte. Only `tail` is stored.
    ///
    /// # Safety
    /// The caller must be the only consumer of this ring for the duration of
    /// the call.
    pub unsafe fn consumer_pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if head == tail {
            return None;
        }

        // SAFETY: `tail != head`, so slot `tail` was published by the producer's
        // release store and will not be rewritten before `tail` moves past it.
        let byte = unsafe { self.slots.get().cast::<u8>().add(tail).read() };
        self.tail.store((tail + 1) % N, Ordering::Release);
        Some(byte)
    }

    /// Pops up to `out.len()` bytes in FIFO order and returns how many were copied.
    ///
    /// # Safety
    /// Same contract as [`ByteRing::consumer_pop`].
    pub unsafe fn consumer_drain(&self, out: &mut [u8]) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        let count = used(head, tail, N).min(out.len());
        if count == 0 {
            return 0;
        }

        let first = count.min(N - tail);
        let base = self.slots.get().cast::<u8>();
        // SAFETY: `[tail, tail + count)` modulo N is published data owned by the
        // consumer until the release store below.
        unsafe {
            ptr::copy_nonoverlapping(base.add(tail), out.as_mut_ptr(), first);
            ptr::copy_nonoverlapping(base, out.as_mut_ptr().add(first), count - first);
        }
        self.tail.store((tail + count) % N, Ordering::Release);
        count
    }
}

impl<const N: usize> Default for ByteRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for ByteRing<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteRing")
            .field("capacity", &self.capacity())
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .finish()
    }
}

/// Producer role of a [`ByteRing`]; the only writer of `head`.
#[derive(Debug)]
pub struct Producer<'a, const N: usize> {
    ring: &'a ByteRing<N>,
}

impl<'a, const N: usize> Producer<'a, N> {
    /// Offers a batch to the ring. Never blocks.
    pub fn try_push(&mut self, bytes: &[u8], policy: OverflowPolicy) -> PushOutcome {
        // SAFETY: `split` hands out a single producer and this takes `&mut self`.
        unsafe { self.ring.producer_push(bytes, policy) }
    }

    /// Bytes that fit before the next push starts dropping.
    pub fn free_space(&self) -> usize {
        self.ring.free_space()
    }

    /// `true` when every usable slot holds an unread byte.
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// The ring this handle produces into.
    pub fn ring(&self) -> &'a ByteRing<N> {
        self.ring
    }
}

/// Consumer role of a [`ByteRing`]; the only writer of `tail`.
#[derive(Debug)]
pub struct Consumer<'a, const N: usize> {
    ring: &'a ByteRing<N>,
}

impl<'a, const N: usize> Consumer<'a, N> {
    /// Removes the oldest byte, or `None` when the ring is empty.
    pub fn try_pop(&mut self) -> Option<u8> {
        // SAFETY: `split` hands out a single consumer and this takes `&mut self`.
        unsafe { self.ring.consumer_pop() }
    }

    /// Pops up to `out.len()` bytes; returns the number copied.
    pub fn drain_into(&mut self, out: &mut [u8]) -> usize {
        // SAFETY: as in `try_pop`.
        unsafe { self.ring.consumer_drain(out) }
    }

    /// Bytes waiting to be popped.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// `true` when the next pop would return `None`.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// The ring this handle consumes from.
    pub fn ring(&self) -> &'a ByteRing<N> {
        self.ring
    }
}

#[inline]
fn used(head: usize, tail: usize, slots: usize) -> usize {
    (head + slots - tail) % slots
}
