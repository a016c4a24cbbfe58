//! Document properties (DOP).

use super::super::package::Result;
use super::border::Dttm;
use crate::common::binary::{read_i16_le, read_i32_le, read_u8, read_u16_le, read_u32_le};
use serde::Serialize;

/// Document-wide settings and statistics from the DOP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentProperties {
    /// Odd and even pages get different headers
    pub facing_pages: bool,
    /// Footnote position
    pub fpc: u8,
    /// Footnote numbering restart rule
    pub rnc_ftn: u8,
    /// Starting footnote number
    pub n_ftn: u16,
    /// Endnote numbering restart rule
    pub rnc_edn: u8,
    pub n_edn: u16,
    /// Endnote position
    pub epc: u8,
    pub created: Dttm,
    pub revised: Dttm,
    pub last_printed: Dttm,
    pub revision: i16,
    pub words: i32,
    pub characters: i32,
    pub pages: i16,
    pub paragraphs: i32,
}

impl DocumentProperties {
    /// Parse the DOP. Statistics past the end of a short (Word 6) DOP are
    /// left at zero.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let flags = read_u8(data, 0)?;
        let footnotes = read_u16_le(data, 2)?;
        let mut dop = DocumentProperties {
            facing_pages: flags & 0x01 != 0,
            fpc: (flags & 0x60) >> 5,
            rnc_ftn: (footnotes & 0x03) as u8,
            n_ftn: footnotes >> 2,
            ..Default::default()
        };

        if let Ok(created) = read_u32_le(data, 20) {
            dop.created = Dttm(created);
        }
        if let Ok(revised) = read_u32_le(data, 24) {
            dop.revised = Dttm(revised);
        }
        if let Ok(printed) = read_u32_le(data, 28) {
            dop.last_printed = Dttm(printed);
        }
        dop.revision = read_i16_le(data, 32).unwrap_or_default();
        dop.words = read_i32_le(data, 38).unwrap_or_default();
        dop.characters = read_i32_le(data, 42).unwrap_or_default();
        dop.pages = read_i16_le(data, 46).unwrap_or_default();
        dop.paragraphs = read_i32_le(data, 48).unwrap_or_default();

        if let Ok(endnotes) = read_u16_le(data, 52) {
            dop.rnc_edn = (endnotes & 0x03) as u8;
            dop.n_edn = endnotes >> 2;
        }
        if let Ok(epc) = read_u16_le(data, 54) {
            dop.epc = (epc & 0x03) as u8;
        }
        Ok(dop)
    }
}
