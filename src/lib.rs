//! **fpm383** is an embedded-hal driver for the FPM383 (and likely similar) fingerprint
//! modules that speak the `0xEF01` packet protocol.
//!
//! The driver frames commands, waits for the module's acknowledgement and hands back its
//! confirmation code. On top of the primitive commands it offers two composite
//! procedures, [`Fpm383::identify`] and [`Fpm383::enroll`], which drive the module's
//! status LED as they go.
//!
//! ## Example
//!
//! To capture an image:
//! ```
//! # use embedded_hal::serial::{Read, Write};
//! # use embedded_hal::blocking::delay::DelayMs;
//! use fpm383::{Config, ConfirmationCode, Fpm383, SerialTransport};
//! # struct TestTx;
//! # struct TestRx(usize, bool);
//! # struct NoDelay;
//! #
//! # impl Write<u8> for TestTx {
//! #     type Error = ();
//! #     fn write(&mut self, _word: u8) -> nb::Result<(), Self::Error> {
//! #         return Ok(());
//! #     }
//! #     fn flush(&mut self) -> nb::Result<(), Self::Error> {
//! #         return Ok(());
//! #     }
//! # }
//! #
//! # const res_data: &[u8] = &[ 0xef, 0x01, 0xff, 0xff, 0xff, 0xff, 0x07, 0x00, 0x03, 0x00, 0x00, 0x0a ];
//! #
//! # impl Read<u8> for TestRx {
//! #     type Error = ();
//! #     fn read(&mut self) -> nb::Result<u8, Self::Error> {
//! #         if !self.1 {
//! #             self.1 = true;
//! #             return Err(nb::Error::WouldBlock);
//! #         }
//! #         let word = *res_data.get(self.0).ok_or(nb::Error::WouldBlock)?;
//! #         self.0 += 1;
//! #         return Ok(word);
//! #     }
//! # }
//! #
//! # impl DelayMs<u32> for NoDelay {
//! #     fn delay_ms(&mut self, _ms: u32) {}
//! # }
//! # let rx = TestRx(0, false);
//! # let tx = TestTx;
//! # let delay = NoDelay;
//!
//! // Obtain tx, rx from some serial port implementation and delay from a timer
//! let transport = SerialTransport::new(tx, rx);
//! let mut fpm = Fpm383::new(transport, delay, Config::default());
//! match fpm.get_image() {
//!     ConfirmationCode::SUCCESS => println!("Got an image"),
//!     ConfirmationCode::NO_FINGER => println!("No finger on the sensor"),
//!     code => println!("Failed: {:?}", code),
//! }
//! ```
//!
//! For host-side programs using a PC serial port, see the `demos` directory.
#![warn(missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(not(test), no_std)]

mod commands;
mod config;
mod driver;
mod error;
pub mod frame;
mod indicator;
#[cfg(test)]
mod mock;
mod responses;
mod sequencer;
pub mod templates;
mod transport;

pub use crate::commands::{clamp_captures, Command, ReplyWait, MAX_ENROLL_CAPTURES};
pub use crate::config::Config;
pub use crate::driver::Fpm383;
pub use crate::error::Error;
pub use crate::frame::Frame;
pub use crate::indicator::{Colors, Function, Pattern};
pub use crate::responses::{
    AutoEnrollResult, ChipSnResult, ConfirmationCode, ReadSysParaResult, Response, SearchResult,
    SystemParameters, TemplateNumResult, CHIP_SN_LEN, RECEIVE_CAPACITY, SENTINEL,
};
pub use crate::sequencer::{EnrollStatus, IdentifyOutcome};
pub use crate::transport::{SerialTransport, Transport};
