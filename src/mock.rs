//! Scripted transport and delay sharing a virtual millisecond clock.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayMs;

use crate::frame::CODE_OFFSET;
use crate::templates::CONTROL_BLN;
use crate::transport::Transport;

#[derive(Debug, Default)]
struct State {
    now_ms: u32,
    delays: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct MockDelay(Rc<RefCell<State>>);

impl DelayMs<u32> for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        let mut state = self.0.borrow_mut();
        state.now_ms += ms;
        state.delays.push(ms);
    }
}

impl MockDelay {
    pub fn elapsed_ms(&self) -> u32 {
        self.0.borrow().now_ms
    }

    pub fn delays(&self) -> Vec<u32> {
        self.0.borrow().delays.clone()
    }
}

/// A reply the device will send after `latency_ms`.
#[derive(Debug, Clone)]
pub struct Scripted {
    pub bytes: Vec<u8>,
    pub latency_ms: u32,
}

#[derive(Debug)]
pub struct MockTransport {
    clock: Rc<RefCell<State>>,
    /// Replies consumed one per non-indicator frame; `None` means silence.
    replies: VecDeque<Option<Scripted>>,
    /// Bytes in flight, keyed by the time they land on the receive line.
    pending: Vec<(u32, Vec<u8>)>,
    rx: VecDeque<u8>,
    echo: bool,
    indicator_ack_ms: Option<u32>,
    pub written: Vec<Vec<u8>>,
}

/// Builds a transport and a delay tied to the same clock.
pub fn pair() -> (MockTransport, MockDelay) {
    let clock = Rc::new(RefCell::new(State::default()));
    let transport = MockTransport {
        clock: clock.clone(),
        replies: VecDeque::new(),
        pending: Vec::new(),
        rx: VecDeque::new(),
        echo: false,
        indicator_ack_ms: None,
        written: Vec::new(),
    };
    (transport, MockDelay(clock))
}

impl MockTransport {
    /// Queues a reply arriving 1 ms after the matching frame is written.
    pub fn reply(&mut self, bytes: &[u8]) -> &mut Self {
        self.reply_after(bytes, 1)
    }

    pub fn reply_after(&mut self, bytes: &[u8], latency_ms: u32) -> &mut Self {
        self.replies.push_back(Some(Scripted {
            bytes: bytes.to_vec(),
            latency_ms,
        }));
        self
    }

    /// Queues a frame that gets no reply at all.
    pub fn silence(&mut self) -> &mut Self {
        self.replies.push_back(None);
        self
    }

    /// Echo every written frame back on the receive line.
    pub fn echo(&mut self, enabled: bool) -> &mut Self {
        self.echo = enabled;
        self
    }

    /// Acknowledge every indicator frame `latency_ms` after it is written,
    /// the way the module does. Off by default.
    pub fn ack_indicators(&mut self, latency_ms: u32) -> &mut Self {
        self.indicator_ack_ms = Some(latency_ms);
        self
    }

    /// Frames whose instruction code is `code`.
    pub fn frames_with_code(&self, code: u8) -> Vec<&Vec<u8>> {
        self.written
            .iter()
            .filter(|f| f.get(CODE_OFFSET) == Some(&code))
            .collect()
    }

    pub fn indicator_frames(&self) -> Vec<&Vec<u8>> {
        self.frames_with_code(CONTROL_BLN.code())
    }

    fn now(&self) -> u32 {
        self.clock.borrow().now_ms
    }

    // The module answers packets in the order it got them, so a reply never
    // overtakes one still in flight.
    fn schedule(&mut self, latency_ms: u32, bytes: Vec<u8>) {
        let mut at = self.now() + latency_ms;
        if let Some((last, _)) = self.pending.last() {
            at = at.max(last + 1);
        }
        self.pending.push((at, bytes));
    }
}

impl Transport for MockTransport {
    fn write(&mut self, bytes: &[u8]) {
        self.written.push(bytes.to_vec());
        if self.echo {
            self.rx.extend(bytes.iter().copied());
        }
        if bytes.get(CODE_OFFSET) == Some(&CONTROL_BLN.code()) {
            if let Some(latency_ms) = self.indicator_ack_ms {
                self.schedule(latency_ms, ack(0x00, &[]));
            }
            return;
        }
        if let Some(Some(reply)) = self.replies.pop_front() {
            self.schedule(reply.latency_ms, reply.bytes);
        }
    }

    fn bytes_available(&mut self) -> usize {
        let now = self.now();
        while self.pending.first().map_or(false, |(at, _)| now >= *at) {
            let (_, bytes) = self.pending.remove(0);
            self.rx.extend(bytes);
        }
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

/// Acknowledgement frame carrying `code` and `payload`. Checksum is filled
/// in even though the driver does not check it.
pub fn ack(code: u8, payload: &[u8]) -> Vec<u8> {
    let len = (1 + payload.len() + 2) as u16;
    let mut frame = vec![0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x07];
    frame.extend_from_slice(&len.to_be_bytes());
    frame.push(code);
    frame.extend_from_slice(payload);
    let sum = frame[6..]
        .iter()
        .fold(0u16, |s, b| s.wrapping_add(*b as u16));
    frame.extend_from_slice(&sum.to_be_bytes());
    frame
}
