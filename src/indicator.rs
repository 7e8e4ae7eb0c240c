//! Status LED patterns for `PS_ControlBLN`.

use core::ops::BitOr;

/// LED behaviour. Values match the `PS_ControlBLN` function code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Function {
    Breathe = 0x01,
    Blink = 0x02,
    On = 0x03,
    Off = 0x04,
    FadeIn = 0x05,
    FadeOut = 0x06,
}

/// Colour bitmask. Combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colors(pub u8);

impl Colors {
    pub const NONE: Self = Self(0x00);
    pub const BLUE: Self = Self(0x01);
    pub const GREEN: Self = Self(0x02);
    pub const RED: Self = Self(0x04);
}

impl BitOr for Colors {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Everything one `PS_ControlBLN` packet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub function: Function,
    pub start: Colors,
    pub end: Colors,
    /// Number of cycles for blink/breathe; 0 repeats forever.
    pub cycles: u8,
}

impl Pattern {
    /// Shown when an enrollment starts.
    pub const START: Self = Self::steady(Colors::BLUE);
    /// Shown when identification matched a stored template.
    pub const MATCH: Self = Self::blink(Colors::GREEN, 2);
    /// Shown when identification failed.
    pub const REJECT: Self = Self::blink(Colors::RED, 2);
    /// Shown when no finger was on the sensor, if requested.
    pub const NO_FINGER: Self = Self::breathe(Colors::BLUE, Colors::RED, 1);
    /// Shown when an enrollment stored its template.
    pub const SUCCESS: Self = Self::blink(Colors::GREEN, 3);
    /// Shown when the target slot of an enrollment is already in use.
    pub const ALREADY_ENROLLED: Self = Self::blink(Colors(Colors::RED.0 | Colors::GREEN.0), 3);
    pub const OFF: Self = Self::off();

    pub const fn steady(color: Colors) -> Self {
        Self {
            function: Function::On,
            start: color,
            end: color,
            cycles: 0,
        }
    }

    pub const fn blink(color: Colors, cycles: u8) -> Self {
        Self {
            function: Function::Blink,
            start: color,
            end: color,
            cycles,
        }
    }

    pub const fn breathe(start: Colors, end: Colors, cycles: u8) -> Self {
        Self {
            function: Function::Breathe,
            start,
            end,
            cycles,
        }
    }

    pub const fn off() -> Self {
        Self {
            function: Function::Off,
            start: Colors::NONE,
            end: Colors::NONE,
            cycles: 0,
        }
    }

    /// Parameter values in template order.
    pub(crate) fn params(&self) -> [u32; 4] {
        [
            self.function as u32,
            self.start.0 as u32,
            self.end.0 as u32,
            self.cycles as u32,
        ]
    }
}
