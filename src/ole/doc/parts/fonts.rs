//! Font table (SttbfFfn).

use super::super::package::Result;
use super::stylesheet::FormatVersion;
use crate::common::binary::{parse_utf16le_string, read_slice, read_u8, read_u16_le};
use crate::ole::codepage::decode_8bit_cstr;
use serde::Serialize;

/// One font (FFN).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Font {
    pub name: String,
    /// Pitch in bits 0-1, TrueType flag in bit 2, family in bits 4-6
    pub family: u8,
    pub weight: u16,
    pub charset: u8,
}

impl Font {
    pub fn pitch(&self) -> u8 {
        self.family & 0x03
    }

    pub fn is_true_type(&self) -> bool {
        self.family & 0x04 != 0
    }
}

/// Font table in `ftc` order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FontTable {
    fonts: Vec<Font>,
}

impl FontTable {
    /// Parse the font table.
    ///
    /// Entries start at offset 4. Each begins with its length minus one,
    /// and the name sits after a fixed header (39 bytes in Word 97, 5 in
    /// Word 6).
    pub fn parse(data: &[u8], version: FormatVersion) -> Result<Self> {
        let count = read_u16_le(data, 0)? as usize;
        let mut fonts = Vec::with_capacity(count);
        let mut offset = 4;

        for _ in 0..count {
            let length = read_u8(data, offset)? as usize + 1;
            let ffn = read_slice(data, offset, length)?;
            let family = read_u8(ffn, 1)?;
            let weight = read_u16_le(ffn, 2)?;
            let charset = read_u8(ffn, 4)?;
            let name = match version {
                FormatVersion::Word97 => parse_utf16le_string(ffn.get(40..).unwrap_or_default()),
                FormatVersion::Word6 => {
                    decode_8bit_cstr(ffn.get(6..).unwrap_or_default(), encoding_rs::WINDOWS_1252)
                },
            };
            fonts.push(Font {
                name,
                family,
                weight,
                charset,
            });
            offset += length;
        }

        Ok(Self { fonts })
    }

    pub fn get(&self, ftc: u16) -> Option<&Font> {
        self.fonts.get(ftc as usize)
    }

    pub fn name(&self, ftc: u16) -> Option<&str> {
        self.get(ftc).map(|font| font.name.as_str())
    }

    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}
