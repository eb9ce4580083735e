//! Single-context facade over the receive handler, channel reader and
//! egress writer.
//!
//! Targets that dispatch transport events from the same polled loop that
//! runs the RTT engine can drive everything through one [`RttBridge`]. When
//! the receive path has to move into an interrupt handler, take the pieces
//! apart with [`RttBridge::into_parts`].

use byte_ring::ByteRing;

use crate::channel::{DownChannel, UpChannel};
use crate::config::RttConfig;
use crate::port::{Clock, TransportRx, TransportTx};
use crate::reader::ChannelReader;
use crate::receive::{ReceiveHandler, RxOutcome};
use crate::writer::{EgressWriter, WriteOutcome};
use crate::LinkResult;

pub struct RttBridge<'a, R, T, C, const N: usize> {
    receiver: ReceiveHandler<'a, R, N>,
    reader: ChannelReader<'a, N>,
    writer: EgressWriter<T, C>,
    config: RttConfig,
}

impl<'a, R, T, C, const N: usize> RttBridge<'a, R, T, C, N>
where
    R: TransportRx,
    T: TransportTx,
    C: Clock,
{
    /// Splits `ring` and wires both transport halves to it.
    ///
    /// Fails if the configuration is out of range or the ring's roles were
    /// already handed out.
    pub fn new(
        ring: &'a ByteRing<N>,
        rx: R,
        tx: T,
        clock: C,
        config: RttConfig,
    ) -> LinkResult<Self> {
        config.validate()?;
        let (producer, consumer) = ring.split()?;
        Ok(Self {
            receiver: ReceiveHandler::new(rx, producer, &config)?,
            reader: ChannelReader::new(consumer),
            writer: EgressWriter::new(tx, clock, &config)?,
            config,
        })
    }

    pub fn on_receive_event(&mut self) -> RxOutcome {
        self.receiver.on_receive_event()
    }

    pub fn read_one(&mut self, channel: DownChannel) -> Option<u8> {
        self.reader.read_one(channel)
    }

    pub fn has_no_data(&self, channel: DownChannel) -> bool {
        self.reader.has_no_data(channel)
    }

    pub fn write(&mut self, channel: UpChannel, data: &[u8]) -> WriteOutcome {
        self.writer.write(channel, data)
    }

    pub fn config(&self) -> &RttConfig {
        &self.config
    }

    pub fn reader_mut(&mut self) -> &mut ChannelReader<'a, N> {
        &mut self.reader
    }

    pub fn writer_mut(&mut self) -> &mut EgressWriter<T, C> {
        &mut self.writer
    }

    pub fn into_parts(
        self,
    ) -> (
        ReceiveHandler<'a, R, N>,
        ChannelReader<'a, N>,
        EgressWriter<T, C>,
    ) {
        (self.receiver, self.reader, self.writer)
    }
}
