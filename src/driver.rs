use embedded_hal::blocking::delay::DelayMs;
use log::{debug, error, trace, warn};

use arrayvec::ArrayVec;

use crate::commands::{Command, ReplyWait};
use crate::config::Config;
use crate::frame::{HEADER, LENGTH_OFFSET, PID_ACK, PID_OFFSET};
use crate::indicator::Pattern;
use crate::responses::{
    AutoEnrollResult, ChipSnResult, ConfirmationCode, ReadSysParaResult, Response, SearchResult,
    TemplateNumResult, RECEIVE_CAPACITY,
};
use crate::transport::Transport;

/// Size of the module's reply to `PS_ControlBLN`: header, address, packet
/// id, length 0x0003, confirmation code, checksum.
const INDICATOR_ACK_LEN: usize = 12;
const INDICATOR_ACK_LENGTH_FIELD: u16 = 0x0003;

/// An FPM383 module reachable over some [`Transport`].
///
/// Every call blocks until the module replies or the command's timeout runs
/// out. A session is single-owner; wrap it in a mutex to share it.
#[derive(Debug)]
pub struct Fpm383<T, D> {
    pub(crate) transport: T,
    pub(crate) delay: D,
    pub(crate) config: Config,
    /// Indicator packets whose acknowledgement has not been seen yet.
    unacked_indicators: u8,
}

impl<T, D> Fpm383<T, D>
where
    T: Transport,
    D: DelayMs<u32>,
{
    pub fn new(transport: T, delay: D, config: Config) -> Self {
        Self {
            transport,
            delay,
            config,
            unacked_indicators: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gives back the transport and delay.
    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }

    /// Writes `frame` and waits up to `timeout_ms` for a reply.
    ///
    /// Returns an all-0xFF response if nothing arrives in time. Does not retry.
    /// Acknowledgements still owed for earlier indicator packets are dropped
    /// from the front of the reply.
    pub fn transact(&mut self, frame: &[u8], timeout_ms: u32) -> Response {
        trace!("-> {:02x?}", frame);
        self.transport.write(frame);
        self.drain_echo(frame.len());

        let mut remaining = timeout_ms;
        loop {
            let mut response = self.receive(&mut remaining);
            let mut dropped = false;
            while self.unacked_indicators > 0 && is_indicator_ack(&response) {
                trace!("dropping late indicator acknowledgement");
                self.unacked_indicators -= 1;
                response = response.skip(INDICATOR_ACK_LEN);
                dropped = true;
            }
            if response.is_empty() {
                if dropped {
                    continue;
                }
                warn!("no reply within {} ms", timeout_ms);
            }
            // any indicator ack still owed has been lost
            self.unacked_indicators = 0;
            return response;
        }
    }

    // Waits for the first byte, spending `remaining` one millisecond at a
    // time, then reads until the line goes quiet or the buffer is full.
    fn receive(&mut self, remaining: &mut u32) -> Response {
        while self.transport.bytes_available() == 0 {
            if *remaining == 0 {
                return Response::sentinel();
            }
            self.delay.delay_ms(1);
            *remaining -= 1;
        }

        let mut response = Response::sentinel();
        while !response.is_full() && self.transport.bytes_available() > 0 {
            self.delay.delay_ms(self.config.inter_byte_ms);
            match self.transport.read_byte() {
                Some(byte) => {
                    response.push(byte);
                }
                None => break,
            }
        }
        trace!("<- {:02x?}", response.as_bytes());
        response
    }

    // Some links hand the written bytes straight back; drop whatever is
    // already waiting before the real reply starts. Indicator
    // acknowledgements that arrived in the meantime are counted off.
    fn drain_echo(&mut self, written: usize) {
        let mut drained = ArrayVec::<[u8; 128]>::new();
        let mut budget = written + RECEIVE_CAPACITY;
        while budget > 0 && self.transport.bytes_available() > 0 {
            if let Some(byte) = self.transport.read_byte() {
                let _ = drained.try_push(byte);
            }
            budget -= 1;
        }

        let acks = count_acks(&drained);
        if acks > 0 && self.unacked_indicators > 0 {
            trace!("drained {} acknowledgement(s) before the reply", acks);
        }
        self.unacked_indicators = self.unacked_indicators.saturating_sub(acks);
    }

    /// Encodes and sends a command, waiting for the reply as long as the
    /// command's class requires.
    ///
    /// Fire-and-forget commands return [`Response::sentinel`] right after the
    /// write.
    pub fn send_command(&mut self, cmd: Command) -> Response {
        let frame = match cmd.encode(self.config.address) {
            Ok(frame) => frame,
            Err(e) => {
                error!("cannot encode {:?}: {}", cmd, e);
                return Response::sentinel();
            }
        };

        let timeout_ms = match cmd.reply_wait() {
            ReplyWait::None => {
                trace!("-> {:02x?}", frame.as_bytes());
                self.transport.write(frame.as_bytes());
                if let Command::ControlBln { .. } = cmd {
                    self.unacked_indicators = self.unacked_indicators.saturating_add(1);
                }
                return Response::sentinel();
            }
            ReplyWait::Short => self.config.short_timeout_ms,
            ReplyWait::Long => self.config.long_timeout_ms,
        };

        let response = self.transact(frame.as_bytes(), timeout_ms);
        if !response.is_empty() && !response.is_ack() {
            warn!(
                "{}: reply is not an acknowledgement (packet id {:#04x})",
                cmd.template().name,
                response.packet_id()
            );
        }
        response
    }

    fn confirm(&mut self, cmd: Command) -> ConfirmationCode {
        let code = self.send_command(cmd).confirmation_code();
        debug!("{} -> {:?}", cmd.template().name, code);
        code
    }

    /// Captures a fingerprint image.
    pub fn get_image(&mut self) -> ConfirmationCode {
        self.confirm(Command::GetImage)
    }

    /// Extracts features from the captured image into `buffer`.
    pub fn gen_char(&mut self, buffer: u8) -> ConfirmationCode {
        self.confirm(Command::GenChar { buffer })
    }

    /// Searches slots `start..=end` for the features in `buffer`.
    pub fn search(&mut self, buffer: u8, start: u16, end: u16) -> SearchResult {
        let response = self.send_command(Command::Search { buffer, start, end });
        let result = SearchResult::from_response(&response);
        debug!("PS_Search -> {:?}", result);
        result
    }

    /// Deletes the template stored in `slot_id`.
    pub fn delete(&mut self, slot_id: u16) -> ConfirmationCode {
        self.delete_range(slot_id, 1)
    }

    /// Deletes `count` templates starting at `start`.
    pub fn delete_range(&mut self, start: u16, count: u16) -> ConfirmationCode {
        self.confirm(Command::DeletChar { start, count })
    }

    /// Deletes every stored template.
    pub fn empty(&mut self) -> ConfirmationCode {
        self.confirm(Command::Empty)
    }

    /// Aborts an enrollment or identification running on the module.
    pub fn cancel(&mut self) -> ConfirmationCode {
        self.confirm(Command::Cancel)
    }

    pub fn sleep(&mut self) -> ConfirmationCode {
        self.confirm(Command::Sleep)
    }

    /// Runs the module's one-shot enrollment. `captures` is clamped to 1..=12.
    pub fn auto_enroll(&mut self, slot_id: u16, captures: u8) -> AutoEnrollResult {
        let response = self.send_command(Command::AutoEnroll { slot_id, captures });
        let result = AutoEnrollResult::from_response(&response);
        debug!("PS_AutoEnroll -> {:?}", result);
        result
    }

    /// Number of valid templates in the library.
    pub fn template_num(&mut self) -> TemplateNumResult {
        let response = self.send_command(Command::ValidTempleteNum);
        TemplateNumResult::from_response(&response)
    }

    pub fn read_sys_para(&mut self) -> ReadSysParaResult {
        let response = self.send_command(Command::ReadSysPara);
        ReadSysParaResult::from_response(&response)
    }

    pub fn chip_sn(&mut self) -> ChipSnResult {
        let response = self.send_command(Command::GetChipSn);
        ChipSnResult::from_response(&response)
    }

    /// Sends an LED pattern. Returns once the packet is written; the module's
    /// acknowledgement is not awaited.
    pub fn indicator(&mut self, pattern: Pattern) {
        debug!("indicator {:?}", pattern);
        self.send_command(Command::ControlBln { pattern });
    }
}

fn is_indicator_ack(response: &Response) -> bool {
    response.len() >= INDICATOR_ACK_LEN
        && response.is_ack()
        && response.field_u16(LENGTH_OFFSET) == Some(INDICATOR_ACK_LENGTH_FIELD)
}

// Acknowledgement packet starts in a run of raw bytes. Echoed commands carry
// packet id 0x01 and are not counted.
fn count_acks(bytes: &[u8]) -> u8 {
    if bytes.len() <= PID_OFFSET {
        return 0;
    }
    (0..bytes.len() - PID_OFFSET)
        .filter(|i| bytes[*i..*i + 2] == HEADER && bytes[*i + PID_OFFSET] == PID_ACK)
        .count()
        .min(u8::MAX as usize) as u8
}
