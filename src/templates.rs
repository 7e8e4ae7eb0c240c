//# Packet layouts follow the FPM383C communication protocol manual (V1.2).
//# Every template is a complete command frame. Bytes at parameter sites and the
//# trailing checksum are placeholders; the codec patches both on every encode.

use crate::frame::{CHECKSUM_SPAN_START, CODE_OFFSET};

/// One parameter write site inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSite {
    /// Absolute byte offset of the (big-endian) field in the frame.
    pub offset: usize,
    /// Field width in bytes.
    pub width: usize,
}

const fn site(offset: usize, width: usize) -> ParamSite {
    ParamSite { offset, width }
}

/// Immutable prototype of a command frame.
#[derive(Debug, PartialEq, Eq)]
pub struct Template {
    pub name: &'static str,
    pub bytes: &'static [u8],
    pub params: &'static [ParamSite],
}

impl Template {
    /// Instruction code of this template.
    pub fn code(&self) -> u8 {
        self.bytes[CODE_OFFSET]
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Sum of the checksummed bytes that are *not* parameter sites.
    ///
    /// This is the additive constant each command's checksum starts from.
    pub fn fixed_sum(&self) -> u16 {
        let end = self.bytes.len() - 2;
        (CHECKSUM_SPAN_START..end)
            .filter(|i| !self.is_param_byte(*i))
            .fold(0u16, |sum, i| sum.wrapping_add(self.bytes[i] as u16))
    }

    fn is_param_byte(&self, index: usize) -> bool {
        self.params
            .iter()
            .any(|p| index >= p.offset && index < p.offset + p.width)
    }
}

pub static GET_IMAGE: Template = Template {
    name: "PS_GetImage",
    bytes: &[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x03, 0x01, 0x00, 0x05],
    params: &[],
};

// bufid
pub static GEN_CHAR: Template = Template {
    name: "PS_GetChar",
    bytes: &[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x04, 0x02, 0x01, 0x00, 0x08],
    params: &[site(10, 1)],
};

// bufid | start page [2] | end page [2]
pub static SEARCH: Template = Template {
    name: "PS_Search",
    bytes: &[
        0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x08, 0x04, 0x01, 0x00, 0x00, 0xFF, 0xFF,
        0x02, 0x0C,
    ],
    params: &[site(10, 1), site(11, 2), site(13, 2)],
};

// page id [2] | count [2]
pub static DELET_CHAR: Template = Template {
    name: "PS_DeletChar",
    bytes: &[
        0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x07, 0x0C, 0x00, 0x00, 0x00, 0x01, 0x00,
        0x00,
    ],
    params: &[site(10, 2), site(12, 2)],
};

pub static EMPTY: Template = Template {
    name: "PS_Empty",
    bytes: &[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x03, 0x0D, 0x00, 0x11],
    params: &[],
};

pub static CANCEL: Template = Template {
    name: "PS_Cancel",
    bytes: &[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x03, 0x30, 0x00, 0x34],
    params: &[],
};

// page id [2] | entry count | options [2], options fixed at 0x0016
pub static AUTO_ENROLL: Template = Template {
    name: "PS_AutoEnroll",
    bytes: &[
        0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x08, 0x31, 0x00, 0x00, 0x04, 0x00, 0x16,
        0x00, 0x00,
    ],
    params: &[site(10, 2), site(12, 1)],
};

pub static SLEEP: Template = Template {
    name: "PS_Sleep",
    bytes: &[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x03, 0x33, 0x00, 0x37],
    params: &[],
};

pub static VALID_TEMPLATE_NUM: Template = Template {
    name: "PS_ValidTempleteNum",
    bytes: &[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x03, 0x1D, 0x00, 0x21],
    params: &[],
};

pub static READ_SYS_PARA: Template = Template {
    name: "PS_ReadSysPara",
    bytes: &[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x03, 0x0F, 0x00, 0x13],
    params: &[],
};

// reserved byte, always 0
pub static GET_CHIP_SN: Template = Template {
    name: "PS_GetChipSN",
    bytes: &[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x04, 0x34, 0x00, 0x00, 0x39],
    params: &[],
};

// function | start colour | end colour | cycles
pub static CONTROL_BLN: Template = Template {
    name: "PS_ControlBLN",
    bytes: &[
        0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x07, 0x3C, 0x03, 0x01, 0x01, 0x00, 0x00,
        0x49,
    ],
    params: &[site(10, 1), site(11, 1), site(12, 1), site(13, 1)],
};

/// Every template in the catalog.
pub static ALL: [&Template; 12] = [
    &GET_IMAGE,
    &GEN_CHAR,
    &SEARCH,
    &DELET_CHAR,
    &EMPTY,
    &CANCEL,
    &AUTO_ENROLL,
    &SLEEP,
    &VALID_TEMPLATE_NUM,
    &READ_SYS_PARA,
    &GET_CHIP_SN,
    &CONTROL_BLN,
];
