use arrayvec::ArrayVec;
use byteorder::{BigEndian, ByteOrder};

use crate::error::Error;
use crate::templates::Template;

// Frame layout:
// headr  | 0xEF 0x01 [2]
// addr   | address [4]
// ident  | packet id [1]
// length | code + params + checksum [2]
// instr  | instruction / confirmation code [1]
// params | 0..N
// chksum | sum(ident..params) [2]
pub const HEADER: [u8; 2] = [0xEF, 0x01];
pub const ADDRESS_OFFSET: usize = 2;
pub const PID_OFFSET: usize = 6;
pub const LENGTH_OFFSET: usize = 7;
pub const CODE_OFFSET: usize = 9;
pub const PAYLOAD_OFFSET: usize = 10;
pub const CHECKSUM_SPAN_START: usize = PID_OFFSET;

pub const PID_COMMAND: u8 = 0x01;
pub const PID_ACK: u8 = 0x07;

pub const BROADCAST_ADDRESS: u32 = 0xFFFF_FFFF;

/// Upper bound on the size of any outbound command frame.
pub const MAX_FRAME_LEN: usize = 32;

/// Sums every byte from the packet identifier up to (not including) the
/// trailing two checksum bytes, modulo 2^16.
pub fn compute_checksum(frame: &[u8]) -> u16 {
    if frame.len() < CHECKSUM_SPAN_START + 2 {
        return 0;
    }
    frame[CHECKSUM_SPAN_START..frame.len() - 2]
        .iter()
        .fold(0u16, |sum, byte| sum.wrapping_add(*byte as u16))
}

/// A fully encoded outbound command frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: ArrayVec<[u8; MAX_FRAME_LEN]>,
}

impl Frame {
    /// Copies `template`, writes `address` and each parameter value big-endian
    /// into its site, then writes a freshly computed checksum.
    ///
    /// `params` must hold exactly one value per parameter site, each fitting
    /// its site's width.
    pub fn encode(template: &Template, params: &[u32], address: u32) -> Result<Self, Error> {
        if params.len() != template.params.len() {
            return Err(Error::ParameterCount {
                template: template.name,
                expected: template.params.len(),
                actual: params.len(),
            });
        }

        let mut bytes = ArrayVec::<[u8; MAX_FRAME_LEN]>::new();
        bytes
            .try_extend_from_slice(template.bytes)
            .map_err(|_| Error::FrameTooLong { len: template.len() })?;

        BigEndian::write_u32(&mut bytes[ADDRESS_OFFSET..ADDRESS_OFFSET + 4], address);

        let mut checksum = template.fixed_sum();
        for (index, (site, value)) in template.params.iter().zip(params).enumerate() {
            if site.width < 4 && (*value >> (8 * site.width)) != 0 {
                return Err(Error::ParameterOverflow {
                    index,
                    width: site.width,
                    value: *value,
                });
            }
            let field = &mut bytes[site.offset..site.offset + site.width];
            BigEndian::write_uint(field, *value as u64, site.width);
            checksum = field
                .iter()
                .fold(checksum, |sum, byte| sum.wrapping_add(*byte as u16));
        }

        let end = bytes.len();
        BigEndian::write_u16(&mut bytes[end - 2..], checksum);
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..]
    }

    pub fn code(&self) -> u8 {
        self.bytes[CODE_OFFSET]
    }

    /// The checksum currently stored in the frame.
    pub fn checksum(&self) -> u16 {
        BigEndian::read_u16(&self.bytes[self.bytes.len() - 2..])
    }

    /// True if the stored checksum matches the frame contents.
    pub fn is_valid(&self) -> bool {
        self.checksum() == compute_checksum(self.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;

    #[test]
    fn checksum_covers_identifier_through_parameters() {
        // 0x01 + 0x0003 + 0x0F
        let frame = Frame::encode(&templates::READ_SYS_PARA, &[], BROADCAST_ADDRESS).unwrap();
        assert_eq!(frame.checksum(), 0x0013);
        assert!(frame.is_valid());
    }

    #[test]
    fn every_template_encodes_to_a_valid_frame() {
        for t in templates::ALL.iter() {
            let params = [0u32; 4];
            let frame = Frame::encode(t, &params[..t.params.len()], BROADCAST_ADDRESS).unwrap();
            assert!(frame.is_valid(), "{}", t.name);
            assert_eq!(frame.code(), t.code());
        }
    }

    #[test]
    fn encoding_is_idempotent() {
        let a = Frame::encode(&templates::SEARCH, &[1, 0, 0x0FFF], BROADCAST_ADDRESS).unwrap();
        let b = Frame::encode(&templates::SEARCH, &[1, 0, 0x0FFF], BROADCAST_ADDRESS).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn stale_template_checksum_is_replaced() {
        // the prototype's trailing bytes are 0x00 0x00
        let frame = Frame::encode(&templates::DELET_CHAR, &[300, 1], BROADCAST_ADDRESS).unwrap();
        assert_eq!(&frame.as_bytes()[10..12], &[0x01, 0x2C]);
        assert_eq!(&frame.as_bytes()[12..14], &[0x00, 0x01]);
        assert_eq!(frame.checksum(), 0x01 + 0x07 + 0x0C + 0x01 + 0x2C + 0x01);
        assert!(frame.is_valid());
    }

    #[test]
    fn address_is_written_but_not_checksummed() {
        let broadcast = Frame::encode(&templates::GET_IMAGE, &[], BROADCAST_ADDRESS).unwrap();
        let custom = Frame::encode(&templates::GET_IMAGE, &[], 0x1234_5678).unwrap();
        assert_eq!(&custom.as_bytes()[2..6], &[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(custom.checksum(), broadcast.checksum());
    }

    #[test]
    fn oversized_parameter_is_rejected() {
        let err = Frame::encode(&templates::GEN_CHAR, &[0x100], BROADCAST_ADDRESS).unwrap_err();
        assert_eq!(err, Error::ParameterOverflow { index: 0, width: 1, value: 0x100 });

        let err = Frame::encode(&templates::DELET_CHAR, &[0x1_0000, 1], BROADCAST_ADDRESS).unwrap_err();
        assert_eq!(err, Error::ParameterOverflow { index: 0, width: 2, value: 0x1_0000 });
    }

    #[test]
    fn parameter_count_must_match() {
        let err = Frame::encode(&templates::DELET_CHAR, &[1], BROADCAST_ADDRESS).unwrap_err();
        assert_eq!(
            err,
            Error::ParameterCount { template: "PS_DeletChar", expected: 2, actual: 1 }
        );
    }

    #[test]
    fn short_input_has_no_checksum() {
        assert_eq!(compute_checksum(&[0xEF, 0x01]), 0);
    }
}
