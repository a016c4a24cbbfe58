//! Single property modifier (sprm) decoding.
//!
//! A grpprl is a packed sequence of sprms: a two-byte opcode followed by an
//! operand whose size is encoded in the top three bits of the opcode (the
//! spra). The low nine bits select the operation and bits 10-12 the property
//! group it targets.
use crate::common::binary::{
    BinaryError, BinaryResult, read_i16_le, read_i32_le, read_slice, read_u8, read_u16_le,
};

/// Table definition sprm; its operand length is a two-byte count.
pub const SPRM_T_DEF_TABLE: u16 = 0xD608;

/// Property group a sprm targets (opcode bits 10-12).
pub const SGC_PARAGRAPH: u8 = 1;
pub const SGC_CHARACTER: u8 = 2;
pub const SGC_PICTURE: u8 = 3;
pub const SGC_SECTION: u8 = 4;
pub const SGC_TABLE: u8 = 5;

/// Operand size class (opcode bits 13-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spra {
    /// Size code 0 - one-byte toggle
    Toggle,
    /// Size code 1 - one byte
    Byte,
    /// Size code 2 - two bytes
    Word,
    /// Size code 3 - four bytes
    DWord,
    /// Size code 4 - two bytes
    Word2,
    /// Size code 5 - two bytes
    Word3,
    /// Size code 6 - length-prefixed
    Variable,
    /// Size code 7 - three bytes
    ThreeByte,
}

impl From<u16> for Spra {
    fn from(opcode: u16) -> Self {
        match (opcode & 0xE000) >> 13 {
            0 => Spra::Toggle,
            1 => Spra::Byte,
            2 => Spra::Word,
            3 => Spra::DWord,
            4 => Spra::Word2,
            5 => Spra::Word3,
            6 => Spra::Variable,
            _ => Spra::ThreeByte,
        }
    }
}

/// One decoded sprm.
#[derive(Debug, Clone, Copy)]
pub struct Sprm<'a> {
    /// Full opcode
    pub opcode: u16,
    /// Operation within the property group (opcode & 0x1FF)
    pub operation: u16,
    /// Property group (opcode bits 10-12)
    pub sgc: u8,
    /// Operand size class
    pub spra: Spra,
    /// Fixed-size operand; one- and two-byte operands are sign-extended,
    /// three-byte operands are not. Zero for variable operands.
    pub param: i32,
    /// Variable-length operand, empty for fixed sizes
    pub var_param: &'a [u8],
    grpprl: &'a [u8],
    end: usize,
}

impl<'a> Sprm<'a> {
    /// Offset just past this sprm's operand.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Signed word `back` bytes before the end of the operand.
    ///
    /// Two-word operands (borders, line spacing, revision times) are read
    /// as the words at `end - 4` and `end - 2`.
    pub fn word_before_end(&self, back: usize) -> BinaryResult<i16> {
        let offset = self
            .end
            .checked_sub(back)
            .ok_or(BinaryError::InsufficientData {
                expected: back,
                available: self.end,
            })?;
        read_i16_le(self.grpprl, offset)
    }

    /// The operand as an unsigned byte.
    #[inline]
    pub fn byte(&self) -> u8 {
        self.param as u8
    }

    /// The operand as a flag (non-zero byte).
    #[inline]
    pub fn flag(&self) -> bool {
        self.param as u8 != 0
    }
}

/// Iterator over the sprms of a grpprl.
///
/// Yields an error and stops when an operand runs past the end of the data.
/// A single trailing byte (padding) is ignored.
#[derive(Debug, Clone)]
pub struct SprmIter<'a> {
    grpprl: &'a [u8],
    offset: usize,
    done: bool,
}

/// Iterate the sprms of `grpprl` starting at `offset`.
pub fn iter_sprms(grpprl: &[u8], offset: usize) -> SprmIter<'_> {
    SprmIter {
        grpprl,
        offset,
        done: false,
    }
}

impl<'a> SprmIter<'a> {
    fn decode(&mut self) -> BinaryResult<Sprm<'a>> {
        let grpprl = self.grpprl;
        let opcode = read_u16_le(grpprl, self.offset)?;
        let mut offset = self.offset + 2;
        let spra = Spra::from(opcode);

        let mut param = 0i32;
        let mut var_param: &[u8] = &[];
        match spra {
            Spra::Toggle | Spra::Byte => {
                param = read_u8(grpprl, offset)? as i8 as i32;
                offset += 1;
            },
            Spra::Word | Spra::Word2 | Spra::Word3 => {
                param = read_i16_le(grpprl, offset)? as i32;
                offset += 2;
            },
            Spra::DWord => {
                param = read_i32_le(grpprl, offset)?;
                offset += 4;
            },
            Spra::ThreeByte => {
                let bytes = read_slice(grpprl, offset, 3)?;
                param = bytes[0] as i32 | (bytes[1] as i32) << 8 | (bytes[2] as i32) << 16;
                offset += 3;
            },
            Spra::Variable => {
                let len = if opcode == SPRM_T_DEF_TABLE {
                    let len = (read_u16_le(grpprl, offset)? as usize).saturating_sub(1);
                    offset += 2;
                    len
                } else {
                    let len = read_u8(grpprl, offset)? as usize;
                    offset += 1;
                    len
                };
                var_param = read_slice(grpprl, offset, len)?;
                offset += len;
            },
        }

        self.offset = offset;
        Ok(Sprm {
            opcode,
            operation: opcode & 0x01FF,
            sgc: ((opcode & 0x1C00) >> 10) as u8,
            spra,
            param,
            var_param,
            grpprl,
            end: offset,
        })
    }
}

impl<'a> Iterator for SprmIter<'a> {
    type Item = BinaryResult<Sprm<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset + 1 >= self.grpprl.len() {
            return None;
        }
        let sprm = self.decode();
        if sprm.is_err() {
            self.done = true;
        }
        Some(sprm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(grpprl: &[u8]) -> Vec<Sprm<'_>> {
        iter_sprms(grpprl, 0).collect::<BinaryResult<Vec<_>>>().unwrap()
    }

    #[test]
    fn test_operand_sizes() {
        let grpprl = [
            0x35, 0x08, 0x81, // sprmCFBold, toggle 0x81
            0x43, 0x4A, 0x30, 0x00, // sprmCHps = 48
            0x12, 0x64, 0xF0, 0x00, 0x01, 0x00, // sprmPDyaLine, two words
            0x48, 0xE8, 0x01, 0x02, 0x03, // three-byte operand
        ];
        let sprms = collect(&grpprl);
        assert_eq!(sprms.len(), 4);

        assert_eq!(sprms[0].operation, 0x35);
        assert_eq!(sprms[0].sgc, SGC_CHARACTER);
        assert_eq!(sprms[0].spra, Spra::Toggle);
        assert_eq!(sprms[0].byte(), 0x81);
        assert_eq!(sprms[0].param, -127);

        assert_eq!(sprms[1].param, 48);
        assert_eq!(sprms[1].spra, Spra::Word);

        assert_eq!(sprms[2].sgc, SGC_PARAGRAPH);
        assert_eq!(sprms[2].word_before_end(4).unwrap(), 240);
        assert_eq!(sprms[2].word_before_end(2).unwrap(), 1);

        assert_eq!(sprms[3].spra, Spra::ThreeByte);
        assert_eq!(sprms[3].param, 0x030201);
        assert_eq!(sprms[3].end(), grpprl.len());
    }

    #[test]
    fn test_variable_operands() {
        let grpprl = [0x3E, 0xC6, 0x02, 0xAA, 0xBB, 0x00, 0x00, 0x00];
        let sprms: Vec<_> = iter_sprms(&grpprl, 0).collect();
        let first = sprms[0].as_ref().unwrap();
        assert_eq!(first.spra, Spra::Variable);
        assert_eq!(first.var_param, &[0xAA, 0xBB]);
        // Zero padding decodes as a toggle with operand 0.
        assert_eq!(sprms.len(), 2);
    }

    #[test]
    fn test_table_definition_length() {
        // Length word 4 means three operand bytes.
        let grpprl = [0x08, 0xD6, 0x04, 0x00, 0x01, 0x02, 0x03];
        let sprms = collect(&grpprl);
        assert_eq!(sprms[0].var_param, &[0x01, 0x02, 0x03]);
        assert_eq!(sprms[0].sgc, SGC_TABLE);
    }

    #[test]
    fn test_truncated_operand_stops_iteration() {
        let grpprl = [0x43, 0x4A, 0x30];
        let mut iter = iter_sprms(&grpprl, 0);
        assert!(matches!(iter.next(), Some(Err(_))));
        assert!(iter.next().is_none());

        let grpprl = [0x3E, 0xC6, 0x09, 0x01];
        assert!(iter_sprms(&grpprl, 0).any(|s| s.is_err()));
    }

    #[test]
    fn test_start_offset_and_padding() {
        let grpprl = [0x0F, 0x00, 0x35, 0x08, 0x01, 0x00];
        let sprms = collect(&grpprl[..]);
        // Offset 0 decodes the istd prefix as an opcode; offset 2 skips it.
        assert_ne!(sprms[0].opcode, 0x0835);
        let sprms: Vec<_> = iter_sprms(&grpprl, 2).map(|s| s.unwrap()).collect();
        assert_eq!(sprms.len(), 1);
        assert_eq!(sprms[0].opcode, 0x0835);
    }
}
