//! Style sheet (STSH) parsing and style inheritance.
//!
//! Each style description (STD) names a base style and carries the
//! compressed properties (UPXs) that differ from it. The effective PAP/CHP
//! of a style is its base style's record with the UPX applied, resolved on
//! first use and memoized.

use super::super::package::{DocError, Result};
use super::chp::CharacterProperties;
use super::pap::ParagraphProperties;
use super::uncompress::{PropertyRecord, uncompress};
use crate::common::binary::{parse_utf16le_string_len, read_slice, read_u8, read_u16_le};
use crate::ole::codepage::decode_8bit;
use bytes::Bytes;
use fixedbitset::FixedBitSet;
use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::cell::RefCell;

/// Base-style index meaning "no base style".
pub const NIL_STYLE: u16 = 4095;

/// File format generation, which decides how style names are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FormatVersion {
    /// Word 6/95: one-byte name length, 8-bit names
    Word6,
    /// Word 97 and later: two-byte name length, UTF-16 names
    #[default]
    Word97,
}

impl FormatVersion {
    /// Derive the version from the FIB `nFib` field.
    pub fn from_nfib(nfib: u16) -> Self {
        if nfib >= 0x00C1 {
            FormatVersion::Word97
        } else {
            FormatVersion::Word6
        }
    }

    /// Bytes per name length unit and per name character.
    #[inline]
    fn unit(self) -> usize {
        match self {
            FormatVersion::Word6 => 1,
            FormatVersion::Word97 => 2,
        }
    }
}

/// Style kind (STD `sgc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
    Unknown(u8),
}

impl From<u8> for StyleType {
    fn from(sgc: u8) -> Self {
        match sgc {
            1 => StyleType::Paragraph,
            2 => StyleType::Character,
            3 => StyleType::Table,
            4 => StyleType::Numbering,
            other => StyleType::Unknown(other),
        }
    }
}

/// One style description.
#[derive(Debug)]
pub struct StyleDescription {
    /// Built-in style identifier
    pub sti: u16,
    pub style_type: StyleType,
    /// Base style, [`NIL_STYLE`] when none
    pub base_istd: u16,
    /// Style applied to the following paragraph
    pub next_istd: u16,
    pub name: String,
    /// Paragraph UPX, including its two-byte style index prefix
    pub papx: Option<Bytes>,
    pub chpx: Option<Bytes>,
    pap: OnceCell<ParagraphProperties>,
    chp: OnceCell<CharacterProperties>,
}

impl StyleDescription {
    /// Parse the STD body (without its size word).
    fn parse(std: &[u8], base_length: usize, version: FormatVersion) -> Result<Self> {
        let sti = read_u16_le(std, 0)? & 0x0FFF;
        let word = read_u16_le(std, 2)?;
        let style_type = StyleType::from((word & 0x000F) as u8);
        let base_istd = word >> 4;
        let word = read_u16_le(std, 4)?;
        let upx_count = (word & 0x000F) as usize;
        let next_istd = word >> 4;

        let unit = version.unit();
        let (name_length, name) = match version {
            FormatVersion::Word97 => {
                let length = read_u16_le(std, base_length)? as usize;
                (length, parse_utf16le_string_len(std, base_length + 2, length)?)
            },
            FormatVersion::Word6 => {
                let length = read_u8(std, base_length)? as usize;
                let bytes = read_slice(std, base_length + 1, length)?;
                (length, decode_8bit(bytes, encoding_rs::WINDOWS_1252))
            },
        };

        // UPXs follow the name and its terminator.
        let mut offset = base_length + unit + (name_length + 1) * unit;
        let mut upxs = Vec::with_capacity(upx_count);
        for _ in 0..upx_count {
            if offset + 2 > std.len() {
                break;
            }
            let size = read_u16_le(std, offset)? as usize;
            let data = read_slice(std, offset + 2, size)?;
            upxs.push(Bytes::copy_from_slice(data));
            offset += 2 + size;
            if size % 2 == 1 {
                offset += 1;
            }
        }

        let mut upxs = upxs.into_iter();
        let (papx, chpx) = match style_type {
            StyleType::Paragraph => (upxs.next(), upxs.next()),
            StyleType::Character => (None, upxs.next()),
            _ => (None, None),
        };

        Ok(StyleDescription {
            sti,
            style_type,
            base_istd,
            next_istd,
            name,
            papx,
            chpx,
            pap: OnceCell::new(),
            chp: OnceCell::new(),
        })
    }
}

/// Parsed style sheet with lazily resolved style records.
#[derive(Debug, Default)]
pub struct StyleSheet {
    styles: Vec<Option<StyleDescription>>,
    default_fonts: [u16; 3],
    /// Styles whose CHP is being resolved; the style-defaults sprm looks
    /// styles up while a CHP is still being built.
    chp_busy: RefCell<FixedBitSet>,
    pap_busy: RefCell<FixedBitSet>,
}

impl StyleSheet {
    /// A style sheet without styles; every lookup yields the defaults.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the STSH from the table stream.
    pub fn parse(stsh: &[u8], version: FormatVersion) -> Result<Self> {
        if stsh.is_empty() {
            return Ok(Self::empty());
        }

        let stshi_length = read_u16_le(stsh, 0)? as usize;
        let count = read_u16_le(stsh, 2)? as usize;
        let base_length = read_u16_le(stsh, 4)? as usize;
        let default_fonts = [
            read_u16_le(stsh, 14).unwrap_or_default(),
            read_u16_le(stsh, 16).unwrap_or_default(),
            read_u16_le(stsh, 18).unwrap_or_default(),
        ];

        let mut styles = Vec::with_capacity(count);
        let mut offset = 2 + stshi_length;
        for istd in 0..count {
            let size = read_u16_le(stsh, offset)? as usize;
            if size == 0 {
                styles.push(None);
            } else {
                let std = read_slice(stsh, offset + 2, size)?;
                let style = StyleDescription::parse(std, base_length, version).map_err(|err| {
                    DocError::CorruptRecord(format!("style {istd}: {err}"))
                })?;
                styles.push(Some(style));
            }
            offset += 2 + size;
        }
        log::debug!("style sheet: {} slots", styles.len());

        Ok(StyleSheet {
            chp_busy: RefCell::new(FixedBitSet::with_capacity(styles.len())),
            pap_busy: RefCell::new(FixedBitSet::with_capacity(styles.len())),
            styles,
            default_fonts,
        })
    }

    /// Number of style slots, empty ones included.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// The style at `istd`, if the slot exists and is not empty.
    pub fn style(&self, istd: u16) -> Option<&StyleDescription> {
        self.styles.get(istd as usize)?.as_ref()
    }

    pub fn style_name(&self, istd: u16) -> Option<&str> {
        self.style(istd).map(|style| style.name.as_str())
    }

    /// Default ASCII, East Asian and other font indices.
    pub fn default_fonts(&self) -> [u16; 3] {
        self.default_fonts
    }

    /// Effective paragraph properties of style `istd`.
    pub fn paragraph_properties(&self, istd: u16) -> Result<ParagraphProperties> {
        self.resolve_record(
            istd,
            &self.pap_busy,
            |style| &style.pap,
            |style| style.papx.as_ref(),
            |pap, istd| pap.istd = istd,
        )
    }

    /// Effective character properties of style `istd`.
    pub fn character_properties(&self, istd: u16) -> Result<CharacterProperties> {
        self.resolve_record(
            istd,
            &self.chp_busy,
            |style| &style.chp,
            |style| style.chpx.as_ref(),
            |chp, istd| chp.istd = istd,
        )
    }

    /// Both records of style `istd`.
    pub fn resolve(&self, istd: u16) -> Result<(ParagraphProperties, CharacterProperties)> {
        Ok((self.paragraph_properties(istd)?, self.character_properties(istd)?))
    }

    /// Resolve one record kind for `istd`.
    ///
    /// Walks the base chain up to the first resolved ancestor (or the nil
    /// style), then applies the UPXs back down, caching every record on the
    /// way.
    fn resolve_record<P, S, U, I>(
        &self,
        istd: u16,
        busy: &RefCell<FixedBitSet>,
        slot: S,
        upx: U,
        set_istd: I,
    ) -> Result<P>
    where
        P: PropertyRecord + Default,
        S: Fn(&StyleDescription) -> &OnceCell<P>,
        U: Fn(&StyleDescription) -> Option<&Bytes>,
        I: Fn(&mut P, u16),
    {
        let mut path: Vec<(u16, &StyleDescription)> = Vec::new();
        let mut seen = FixedBitSet::with_capacity(self.styles.len());
        let mut current = istd;

        let mut record = loop {
            if current == NIL_STYLE {
                break P::default();
            }
            let Some(style) = self.style(current) else {
                log::warn!("style {current} is not defined, using defaults");
                break P::default();
            };
            if let Some(resolved) = slot(style).get() {
                break resolved.clone();
            }
            if seen.put(current as usize) || busy.borrow().contains(current as usize) {
                return Err(DocError::StyleCycle(current));
            }
            path.push((current, style));
            current = style.base_istd;
        };

        {
            let mut busy = busy.borrow_mut();
            for &(index, _) in &path {
                busy.insert(index as usize);
            }
        }

        let mut outcome = Ok(());
        for &(index, style) in path.iter().rev() {
            let mut next = match upx(style) {
                Some(upx) => match uncompress(upx, &record, self) {
                    Ok(next) => next,
                    Err(err) => {
                        outcome = Err(err);
                        break;
                    },
                },
                None => record.clone(),
            };
            set_istd(&mut next, index);
            record = slot(style).get_or_init(|| next).clone();
        }

        {
            let mut busy = busy.borrow_mut();
            for &(index, _) in &path {
                busy.set(index as usize, false);
            }
        }

        outcome.map(|()| record)
    }
}
