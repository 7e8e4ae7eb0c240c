//# Naming follows the FPM383C communication protocol manual (V1.2).

use arrayvec::ArrayVec;

use crate::error::Error;
use crate::frame::Frame;
use crate::indicator::Pattern;
use crate::templates::{self, Template};

/// Highest number of captures the module accepts for `PS_AutoEnroll`.
pub const MAX_ENROLL_CAPTURES: u8 = 12;

/// Clamps an enrollment capture count into `1..=MAX_ENROLL_CAPTURES`.
pub fn clamp_captures(captures: u8) -> u8 {
    captures.max(1).min(MAX_ENROLL_CAPTURES)
}

/// How long the driver waits for the reply to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyWait {
    /// Single-step commands.
    Short,
    /// Commands that need several physical captures.
    Long,
    /// Fire-and-forget; no reply is read.
    None,
}

/// Enum for commands one can send to the module. Names match the manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Captures a fingerprint image into the image buffer.
    GetImage,

    /// Turns the image buffer into a feature file.
    GenChar {
        /// Feature buffer to write into (1 or 2).
        buffer: u8,
    },

    /// Searches the library for the feature file in `buffer`.
    Search {
        buffer: u8,
        /// First slot ID to search.
        start: u16,
        /// Last slot ID to search.
        end: u16,
    },

    /// Deletes `count` templates starting at slot `start`.
    DeletChar { start: u16, count: u16 },

    /// Deletes every stored template.
    Empty,

    /// Aborts a running auto-enroll or auto-identify.
    Cancel,

    /// One-shot enrollment into `slot_id`.
    AutoEnroll {
        slot_id: u16,
        /// Number of captures; clamped to `1..=12` when encoded.
        captures: u8,
    },

    /// Puts the sensor to sleep.
    Sleep,

    /// Reads the number of valid templates.
    ValidTempleteNum,

    /// Reads system status and basic configuration.
    ReadSysPara,

    /// Reads the chip's unique serial number.
    GetChipSn,

    /// Drives the status LED.
    ControlBln { pattern: Pattern },
}

impl Command {
    pub fn template(&self) -> &'static Template {
        match self {
            Self::GetImage => &templates::GET_IMAGE,
            Self::GenChar { .. } => &templates::GEN_CHAR,
            Self::Search { .. } => &templates::SEARCH,
            Self::DeletChar { .. } => &templates::DELET_CHAR,
            Self::Empty => &templates::EMPTY,
            Self::Cancel => &templates::CANCEL,
            Self::AutoEnroll { .. } => &templates::AUTO_ENROLL,
            Self::Sleep => &templates::SLEEP,
            Self::ValidTempleteNum => &templates::VALID_TEMPLATE_NUM,
            Self::ReadSysPara => &templates::READ_SYS_PARA,
            Self::GetChipSn => &templates::GET_CHIP_SN,
            Self::ControlBln { .. } => &templates::CONTROL_BLN,
        }
    }

    /// Parameter values, in the order of the template's parameter sites.
    fn params(&self) -> ArrayVec<[u32; 4]> {
        let mut params = ArrayVec::new();
        match *self {
            Self::GenChar { buffer } => params.push(buffer as u32),
            Self::Search { buffer, start, end } => {
                params.push(buffer as u32);
                params.push(start as u32);
                params.push(end as u32);
            }
            Self::DeletChar { start, count } => {
                params.push(start as u32);
                params.push(count as u32);
            }
            Self::AutoEnroll { slot_id, captures } => {
                params.push(slot_id as u32);
                params.push(clamp_captures(captures) as u32);
            }
            Self::ControlBln { pattern } => params.extend(pattern.params().iter().copied()),
            _ => {}
        }
        params
    }

    pub fn reply_wait(&self) -> ReplyWait {
        match self {
            Self::AutoEnroll { .. } => ReplyWait::Long,
            Self::ControlBln { .. } => ReplyWait::None,
            _ => ReplyWait::Short,
        }
    }

    /// Encodes this command into a frame addressed to `address`.
    pub fn encode(&self, address: u32) -> Result<Frame, Error> {
        Frame::encode(self.template(), &self.params(), address)
    }
}
