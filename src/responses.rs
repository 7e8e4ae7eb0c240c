use core::fmt;

use byteorder::{BigEndian, ByteOrder};

use crate::frame::{CODE_OFFSET, PAYLOAD_OFFSET, PID_ACK, PID_OFFSET};

/// Size of the receive buffer. Anything the device sends beyond this is dropped.
pub const RECEIVE_CAPACITY: usize = 64;

/// Fill value for receive buffer bytes that were not written by the device.
pub const SENTINEL: u8 = 0xFF;

/// Single status byte from an acknowledgement packet.
///
/// Names follow the module's manual. [`ConfirmationCode::NO_REPLY`] is never
/// sent by the device; the driver produces it when no acknowledgement was seen.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfirmationCode(pub u8);

impl ConfirmationCode {
    pub const SUCCESS: Self = Self(0x00);
    pub const PACKET_ERROR: Self = Self(0x01);
    pub const NO_FINGER: Self = Self(0x02);
    pub const IMAGE_FAILED: Self = Self(0x03);
    pub const IMAGE_TOO_DRY: Self = Self(0x04);
    pub const IMAGE_TOO_WET: Self = Self(0x05);
    pub const IMAGE_DISORDERLY: Self = Self(0x06);
    pub const TOO_FEW_FEATURES: Self = Self(0x07);
    pub const NOT_MATCHED: Self = Self(0x08);
    /// Search finished without a hit in the requested range.
    pub const NOT_FOUND: Self = Self(0x09);
    pub const MERGE_FAILED: Self = Self(0x0A);
    pub const ID_OUT_OF_RANGE: Self = Self(0x0B);
    pub const DELETE_FAILED: Self = Self(0x10);
    pub const CLEAR_FAILED: Self = Self(0x11);
    /// The target slot already holds a template.
    pub const SLOT_OCCUPIED: Self = Self(0x22);
    pub const NO_REPLY: Self = Self(SENTINEL);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// True if this code was synthesized locally because no trustworthy
    /// acknowledgement arrived.
    pub fn is_sentinel(self) -> bool {
        self == Self::NO_REPLY
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::SUCCESS => "Success",
            Self::PACKET_ERROR => "PacketError",
            Self::NO_FINGER => "NoFinger",
            Self::IMAGE_FAILED => "ImageFailed",
            Self::IMAGE_TOO_DRY => "ImageTooDry",
            Self::IMAGE_TOO_WET => "ImageTooWet",
            Self::IMAGE_DISORDERLY => "ImageDisorderly",
            Self::TOO_FEW_FEATURES => "TooFewFeatures",
            Self::NOT_MATCHED => "NotMatched",
            Self::NOT_FOUND => "NotFound",
            Self::MERGE_FAILED => "MergeFailed",
            Self::ID_OUT_OF_RANGE => "IdOutOfRange",
            Self::DELETE_FAILED => "DeleteFailed",
            Self::CLEAR_FAILED => "ClearFailed",
            Self::SLOT_OCCUPIED => "SlotOccupied",
            Self::NO_REPLY => "NoReply",
            _ => return None,
        })
    }
}

impl fmt::Debug for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({:#04x})", name, self.0),
            None => write!(f, "ConfirmationCode({:#04x})", self.0),
        }
    }
}

impl From<ConfirmationCode> for u8 {
    fn from(code: ConfirmationCode) -> u8 {
        code.0
    }
}

/// Raw bytes captured during one receive window.
///
/// Incoming checksums are not verified; the device's replies are taken as-is.
/// Bytes past [`Response::len`] read back as [`SENTINEL`].
#[derive(Clone, PartialEq, Eq)]
pub struct Response {
    raw: [u8; RECEIVE_CAPACITY],
    len: usize,
}

impl Response {
    /// An all-0xFF response, i.e. nothing was received.
    pub fn sentinel() -> Self {
        Self {
            raw: [SENTINEL; RECEIVE_CAPACITY],
            len: 0,
        }
    }

    /// Builds a response from received bytes, dropping anything past capacity.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut response = Self::sentinel();
        for byte in bytes {
            if !response.push(*byte) {
                break;
            }
        }
        response
    }

    /// The bytes after the first `count`, moved to the front.
    pub(crate) fn skip(&self, count: usize) -> Self {
        Self::from_bytes(&self.as_bytes()[count.min(self.len)..])
    }

    /// Appends one byte. Returns false (and drops the byte) when full.
    pub(crate) fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.raw[self.len] = byte;
        self.len += 1;
        true
    }

    /// Number of bytes actually received.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == RECEIVE_CAPACITY
    }

    /// The received bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw[..self.len]
    }

    /// The whole buffer, including sentinel-filled tail.
    pub fn raw(&self) -> &[u8; RECEIVE_CAPACITY] {
        &self.raw
    }

    /// Byte at an absolute offset; [`SENTINEL`] when out of range.
    pub fn byte(&self, offset: usize) -> u8 {
        self.raw.get(offset).copied().unwrap_or(SENTINEL)
    }

    pub fn packet_id(&self) -> u8 {
        self.byte(PID_OFFSET)
    }

    /// True if this is a command acknowledgement packet.
    pub fn is_ack(&self) -> bool {
        self.packet_id() == PID_ACK
    }

    /// Confirmation code, or [`ConfirmationCode::NO_REPLY`] if this is not
    /// an acknowledgement packet.
    pub fn confirmation_code(&self) -> ConfirmationCode {
        if self.is_ack() {
            ConfirmationCode(self.byte(CODE_OFFSET))
        } else {
            ConfirmationCode::NO_REPLY
        }
    }

    /// `len` received bytes starting at an absolute offset, if all of them
    /// were actually received.
    pub fn field(&self, offset: usize, len: usize) -> Option<&[u8]> {
        if offset + len > self.len {
            return None;
        }
        Some(&self.raw[offset..offset + len])
    }

    /// Big-endian 16-bit field at an absolute offset, if it was received.
    pub fn field_u16(&self, offset: usize) -> Option<u16> {
        self.field(offset, 2).map(BigEndian::read_u16)
    }

    /// Result payload bytes (everything after the confirmation code).
    pub fn payload(&self) -> &[u8] {
        if self.len <= PAYLOAD_OFFSET {
            return &[];
        }
        &self.raw[PAYLOAD_OFFSET..self.len]
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("len", &self.len)
            .field("bytes", &self.as_bytes())
            .finish()
    }
}

/// Reply to `PS_Search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub confirmation_code: ConfirmationCode,
    /// Matched slot ID. Only present on success.
    pub slot_id: Option<u16>,
    /// Match score. Only present on success.
    pub score: Option<u16>,
}

impl SearchResult {
    pub(crate) fn from_response(response: &Response) -> Self {
        let confirmation_code = response.confirmation_code();
        let (slot_id, score) = if confirmation_code.is_success() {
            (
                response.field_u16(PAYLOAD_OFFSET),
                response.field_u16(PAYLOAD_OFFSET + 2),
            )
        } else {
            (None, None)
        };
        Self {
            confirmation_code,
            slot_id,
            score,
        }
    }
}

/// Reply to `PS_ValidTempleteNum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateNumResult {
    pub confirmation_code: ConfirmationCode,
    /// Number of valid templates stored on the device.
    pub template_num: Option<u16>,
}

impl TemplateNumResult {
    pub(crate) fn from_response(response: &Response) -> Self {
        let confirmation_code = response.confirmation_code();
        Self {
            confirmation_code,
            template_num: if confirmation_code.is_success() {
                response.field_u16(PAYLOAD_OFFSET)
            } else {
                None
            },
        }
    }
}

/// Reply to `PS_AutoEnroll`.
///
/// The module reports progress through two parameter bytes after the
/// confirmation code; only the full triple says whether the template was
/// stored. Missing bytes read as [`SENTINEL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoEnrollResult {
    pub confirmation_code: ConfirmationCode,
    pub stage: u8,
    pub detail: u8,
}

impl AutoEnrollResult {
    pub(crate) fn from_response(response: &Response) -> Self {
        Self {
            confirmation_code: response.confirmation_code(),
            stage: response.byte(PAYLOAD_OFFSET),
            detail: response.byte(PAYLOAD_OFFSET + 1),
        }
    }

    pub fn triple(&self) -> (u8, u8, u8) {
        (self.confirmation_code.0, self.stage, self.detail)
    }
}

pub const CHIP_SN_LEN: usize = 32;

/// Reply to `PS_GetChipSN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipSnResult {
    pub confirmation_code: ConfirmationCode,
    pub serial_number: Option<[u8; CHIP_SN_LEN]>,
}

impl ChipSnResult {
    pub(crate) fn from_response(response: &Response) -> Self {
        let confirmation_code = response.confirmation_code();
        let serial_number = if confirmation_code.is_success() {
            response.field(PAYLOAD_OFFSET, CHIP_SN_LEN).map(|bytes| {
                let mut sn = [0u8; CHIP_SN_LEN];
                sn.copy_from_slice(bytes);
                sn
            })
        } else {
            None
        };
        Self {
            confirmation_code,
            serial_number,
        }
    }
}

const SYS_PARA_LEN: usize = 16;

/// Reply to `PS_ReadSysPara`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadSysParaResult {
    pub confirmation_code: ConfirmationCode,
    pub system_parameters: Option<SystemParameters>,
}

impl ReadSysParaResult {
    pub(crate) fn from_response(response: &Response) -> Self {
        let confirmation_code = response.confirmation_code();
        let system_parameters = if confirmation_code.is_success() {
            response
                .field(PAYLOAD_OFFSET, SYS_PARA_LEN)
                .map(SystemParameters::from_payload)
        } else {
            None
        };
        Self {
            confirmation_code,
            system_parameters,
        }
    }
}

/// System status and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemParameters {
    /// Status information. Use the instance methods to get to individual bits.
    pub status_register: u16,

    /// System identifier code.
    pub system_identifier_code: u16,

    /// Finger library size.
    pub finger_library_size: u16,

    /// Security level [1-5]
    pub security_level: u16,

    /// Device address.
    pub device_address: u32,

    /// Packet size code [0-3]:\
    /// 0 = 32 bytes\
    /// 1 = 64 bytes\
    /// 2 = 128 bytes\
    /// 3 = 256 bytes
    pub packet_size: u16,

    /// Baud setting. Multiply by 9600 to get the baud rate.
    pub baud_setting: u16,
}

impl SystemParameters {
    fn from_payload(payload: &[u8]) -> Self {
        // Sizes in the manual are in 16-bit words; everything here is bytes.
        Self {
            status_register: BigEndian::read_u16(&payload[0..2]),
            system_identifier_code: BigEndian::read_u16(&payload[2..4]),
            finger_library_size: BigEndian::read_u16(&payload[4..6]),
            security_level: BigEndian::read_u16(&payload[6..8]),
            device_address: BigEndian::read_u32(&payload[8..12]),
            packet_size: BigEndian::read_u16(&payload[12..14]),
            baud_setting: BigEndian::read_u16(&payload[14..16]),
        }
    }

    /// True if the module is busy executing another command.
    pub fn busy(&self) -> bool {
        self.status_register & (1u16 << 0) != 0
    }

    /// True if the module found a matching finger. Always check the reply to
    /// the actual search as well.
    pub fn has_finger_match(&self) -> bool {
        self.status_register & (1u16 << 1) != 0
    }

    /// True if the handshake password was accepted.
    pub fn password_ok(&self) -> bool {
        self.status_register & (1u16 << 2) != 0
    }

    /// True if the image buffer holds a valid image.
    pub fn has_valid_image(&self) -> bool {
        self.status_register & (1u16 << 3) != 0
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_setting as u32 * 9600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACK_OK: &[u8] = &[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x07, 0x00, 0x03, 0x00, 0x00, 0x0A];

    #[test]
    fn unfilled_bytes_read_as_sentinel() {
        let response = Response::from_bytes(ACK_OK);
        assert_eq!(response.len(), 12);
        assert_eq!(response.as_bytes(), ACK_OK);
        assert!(response.raw()[12..].iter().all(|b| *b == SENTINEL));
        assert_eq!(response.byte(200), SENTINEL);
    }

    #[test]
    fn overflow_is_discarded() {
        let long = [0x55u8; RECEIVE_CAPACITY + 10];
        let response = Response::from_bytes(&long);
        assert!(response.is_full());
        assert_eq!(response.len(), RECEIVE_CAPACITY);
    }

    #[test]
    fn confirmation_code_requires_ack_packet() {
        assert_eq!(Response::from_bytes(ACK_OK).confirmation_code(), ConfirmationCode::SUCCESS);

        let mut not_ack = ACK_OK.to_vec();
        not_ack[6] = 0x01;
        assert!(Response::from_bytes(&not_ack).confirmation_code().is_sentinel());
        assert!(Response::sentinel().confirmation_code().is_sentinel());
    }

    #[test]
    fn short_reply_reports_missing_fields() {
        let response = Response::from_bytes(&ACK_OK[..10]);
        assert_eq!(response.field_u16(10), None);
        assert!(response.payload().is_empty());
        assert_eq!(TemplateNumResult::from_response(&response).template_num, None);
    }

    #[test]
    fn search_result_decodes_slot_and_score() {
        let reply = [
            0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x07, 0x00, 0x07, 0x00, 0x01, 0x2C, 0x00, 0x64,
            0x00, 0x00,
        ];
        let result = SearchResult::from_response(&Response::from_bytes(&reply));
        assert_eq!(result.slot_id, Some(300));
        assert_eq!(result.score, Some(100));
    }

    #[test]
    fn system_parameters_decode() {
        let mut reply = vec![0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x07, 0x00, 0x13, 0x00];
        reply.extend_from_slice(&[
            0x00, 0x0A, 0x00, 0x09, 0x00, 0x3C, 0x00, 0x03, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x02,
            0x00, 0x06,
        ]);
        reply.extend_from_slice(&[0x00, 0x00]);
        let result = ReadSysParaResult::from_response(&Response::from_bytes(&reply));
        let params = result.system_parameters.unwrap();
        assert!(params.has_finger_match());
        assert!(params.has_valid_image());
        assert!(!params.busy());
        assert_eq!(params.finger_library_size, 60);
        assert_eq!(params.device_address, 0xFFFF_FFFF);
        assert_eq!(params.baud_rate(), 57600);
    }

    #[test]
    fn confirmation_code_debug_names_known_codes() {
        assert_eq!(format!("{:?}", ConfirmationCode::NO_FINGER), "NoFinger(0x02)");
        assert_eq!(format!("{:?}", ConfirmationCode(0x42)), "ConfirmationCode(0x42)");
    }
}
