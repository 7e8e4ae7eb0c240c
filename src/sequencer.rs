//! Multi-step procedures built from the primitive commands.
//!
//! Each procedure is a small state machine. Every terminal state produces one
//! outcome and at most one indicator pattern. Nothing is retried and nothing
//! is cleaned up on the module; call [`Fpm383::cancel`] to abort an
//! enrollment from the outside.

use embedded_hal::blocking::delay::DelayMs;
use log::debug;

use crate::commands::clamp_captures;
use crate::driver::Fpm383;
use crate::indicator::Pattern;
use crate::responses::{AutoEnrollResult, ConfirmationCode, SENTINEL};
use crate::transport::Transport;

/// How an identification ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifyOutcome {
    /// The finger matched the template in `slot_id`.
    Matched { slot_id: u16, score: Option<u16> },
    /// Nothing was on the sensor.
    NoFinger,
    /// The search ran but nothing in range matched.
    NotFound,
    /// The search failed or returned an unusable reply.
    Rejected(ConfirmationCode),
    /// Capture or feature extraction failed.
    Failed(ConfirmationCode),
}

impl IdentifyOutcome {
    /// Matched slot ID, or 0xFF for every other outcome.
    pub fn code(&self) -> u16 {
        match self {
            Self::Matched { slot_id, .. } => *slot_id,
            _ => SENTINEL as u16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdentifyState {
    Capture,
    Extract,
    Search,
    Done(IdentifyOutcome),
}

/// How an enrollment ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollStatus {
    Enrolled,
    /// The target slot already holds a template.
    AlreadyEnrolled,
    Failed(AutoEnrollResult),
}

impl EnrollStatus {
    /// 0x00 on success, 0x01 when the slot is taken, 0xFF otherwise.
    pub fn code(&self) -> u8 {
        match self {
            Self::Enrolled => 0x00,
            Self::AlreadyEnrolled => 0x01,
            Self::Failed(_) => SENTINEL,
        }
    }

    /// Reads the enrollment reply. Confirmation code and both parameter
    /// bytes must match together; a bare 0x00 confirmation is not success.
    pub fn from_result(result: &AutoEnrollResult) -> Self {
        match result.triple() {
            ENROLLED => Self::Enrolled,
            SLOT_TAKEN => Self::AlreadyEnrolled,
            _ => Self::Failed(*result),
        }
    }
}

const ENROLLED: (u8, u8, u8) = (0x00, 0x06, 0xF2);
const SLOT_TAKEN: (u8, u8, u8) = (ConfirmationCode::SLOT_OCCUPIED.0, 0x00, 0x00);

impl<T, D> Fpm383<T, D>
where
    T: Transport,
    D: DelayMs<u32>,
{
    /// Captures a finger and searches the configured slot range for it.
    pub fn identify(&mut self) -> IdentifyOutcome {
        let mut state = IdentifyState::Capture;
        loop {
            let next = match state {
                IdentifyState::Capture => self.identify_capture(),
                IdentifyState::Extract => self.identify_extract(),
                IdentifyState::Search => self.identify_search(),
                IdentifyState::Done(outcome) => return outcome,
            };
            debug!("identify: {:?} -> {:?}", state, next);
            state = next;
        }
    }

    fn identify_capture(&mut self) -> IdentifyState {
        match self.get_image() {
            ConfirmationCode::SUCCESS => IdentifyState::Extract,
            ConfirmationCode::NO_FINGER => {
                if self.config.no_finger_indicator {
                    self.indicator(Pattern::NO_FINGER);
                }
                IdentifyState::Done(IdentifyOutcome::NoFinger)
            }
            code => IdentifyState::Done(IdentifyOutcome::Failed(code)),
        }
    }

    fn identify_extract(&mut self) -> IdentifyState {
        match self.gen_char(self.config.feature_buffer) {
            ConfirmationCode::SUCCESS => IdentifyState::Search,
            code => IdentifyState::Done(IdentifyOutcome::Failed(code)),
        }
    }

    fn identify_search(&mut self) -> IdentifyState {
        let (buffer, start, end) = (
            self.config.feature_buffer,
            self.config.search_start,
            self.config.search_end,
        );
        let result = self.search(buffer, start, end);
        let outcome = match (result.confirmation_code, result.slot_id) {
            (ConfirmationCode::SUCCESS, Some(slot_id)) => IdentifyOutcome::Matched {
                slot_id,
                score: result.score,
            },
            // reply too short to hold a slot ID
            (ConfirmationCode::SUCCESS, None) => IdentifyOutcome::Rejected(ConfirmationCode::NO_REPLY),
            (ConfirmationCode::NOT_FOUND, _) => IdentifyOutcome::NotFound,
            (code, _) => IdentifyOutcome::Rejected(code),
        };
        match outcome {
            IdentifyOutcome::Matched { .. } => self.indicator(Pattern::MATCH),
            IdentifyOutcome::Rejected(_) => self.indicator(Pattern::REJECT),
            _ => {}
        }
        IdentifyState::Done(outcome)
    }

    /// Enrolls a finger into `slot_id` using `captures` presses (clamped to
    /// 1..=12), signalling start and result on the LED.
    pub fn enroll(&mut self, slot_id: u16, captures: u8) -> EnrollStatus {
        self.indicator(Pattern::START);
        self.delay.delay_ms(self.config.settle_delay_ms);

        let result = self.auto_enroll(slot_id, clamp_captures(captures));
        let status = EnrollStatus::from_result(&result);
        debug!("enroll slot {}: {:?}", slot_id, status);

        self.indicator(match status {
            EnrollStatus::Enrolled => Pattern::SUCCESS,
            EnrollStatus::AlreadyEnrolled => Pattern::ALREADY_ENROLLED,
            EnrollStatus::Failed(_) => Pattern::OFF,
        });
        status
    }
}
