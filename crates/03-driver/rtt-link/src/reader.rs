//! Consumer side: the protocol engine polls down-channel bytes from here.

use byte_ring::Consumer;

use crate::channel::DownChannel;
use crate::sentinel;

/// Serves down channel 0 from the ingress ring. Every other down channel
/// reads as permanently empty.
pub struct ChannelReader<'a, const N: usize> {
    consumer: Consumer<'a, N>,
}

impl<'a, const N: usize> ChannelReader<'a, N> {
    pub fn new(consumer: Consumer<'a, N>) -> Self {
        Self { consumer }
    }

    /// Pops the oldest byte of `channel`, or `None` when there is nothing to read.
    pub fn read_one(&mut self, channel: DownChannel) -> Option<u8> {
        if !channel.is_served() {
            return None;
        }
        self.consumer.try_pop()
    }

    /// Copies up to `buf.len()` bytes of `channel` and returns the count.
    pub fn read(&mut self, channel: DownChannel, buf: &mut [u8]) -> usize {
        if !channel.is_served() {
            return 0;
        }
        self.consumer.drain_into(buf)
    }

    pub fn has_no_data(&self, channel: DownChannel) -> bool {
        !channel.is_served() || self.consumer.is_empty()
    }

    /// Integer form of [`ChannelReader::read_one`]: the byte value, or
    /// [`sentinel::EMPTY_READ`] when nothing is available.
    pub fn read_one_raw(&mut self, channel: u32) -> i32 {
        sentinel::encode_read(self.read_one(DownChannel(channel)))
    }

    /// Bytes waiting on the served channel.
    pub fn pending(&self) -> usize {
        self.consumer.len()
    }
}
