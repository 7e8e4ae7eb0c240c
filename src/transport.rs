use arrayvec::ArrayVec;
use embedded_hal::serial::{Read, Write};
use log::{error, warn};
use nb::block;

use crate::responses::RECEIVE_CAPACITY;

/// Byte stream the driver talks over.
///
/// The driver only ever needs these three operations; adapters exist per
/// physical link.
pub trait Transport {
    /// Writes all bytes, blocking until they are handed to the link.
    fn write(&mut self, bytes: &[u8]);

    /// Number of bytes that can be read right now without blocking.
    fn bytes_available(&mut self) -> usize;

    /// Reads one byte if one is available.
    fn read_byte(&mut self) -> Option<u8>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes)
    }

    fn bytes_available(&mut self) -> usize {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
}

/// [`Transport`] over an embedded-hal U(S)ART pair.
///
/// embedded-hal serial reads cannot report a pending byte count, so every
/// poll drains whatever the RX half has ready into a small buffer and
/// `bytes_available` reports how much is buffered.
///
/// The driver pauses between bytes while reading a reply and only polls
/// then. The RX half must therefore buffer on its own (an interrupt or DMA
/// fed ring): a bare UART data register without a FIFO will overrun.
#[derive(Debug)]
pub struct SerialTransport<TX, RX> {
    tx: TX,
    rx: RX,
    buffered: ArrayVec<[u8; RECEIVE_CAPACITY]>,
}

impl<TX, RX> SerialTransport<TX, RX>
where
    TX: Write<u8>,
    RX: Read<u8>,
{
    pub fn new(tx: TX, rx: RX) -> Self {
        Self {
            tx,
            rx,
            buffered: ArrayVec::new(),
        }
    }

    /// Gives back the serial halves.
    pub fn release(self) -> (TX, RX) {
        (self.tx, self.rx)
    }

    fn poll(&mut self) -> Option<u8> {
        match self.rx.read() {
            Ok(byte) => Some(byte),
            Err(nb::Error::WouldBlock) => None,
            Err(nb::Error::Other(_)) => {
                warn!("serial read error, dropping byte");
                None
            }
        }
    }

    fn fill(&mut self) {
        while !self.buffered.is_full() {
            match self.poll() {
                Some(byte) => self.buffered.push(byte),
                None => break,
            }
        }
    }
}

impl<TX, RX> Transport for SerialTransport<TX, RX>
where
    TX: Write<u8>,
    RX: Read<u8>,
{
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            if block!(self.tx.write(*byte)).is_err() {
                error!("serial write failed");
                return;
            }
        }
        if block!(self.tx.flush()).is_err() {
            error!("serial flush failed");
        }
    }

    fn bytes_available(&mut self) -> usize {
        self.fill();
        self.buffered.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.fill();
        if self.buffered.is_empty() {
            return None;
        }
        Some(self.buffered.remove(0))
    }
}
