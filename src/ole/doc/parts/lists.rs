//! List tables (PlfLst and PlfLfo) and list label numbering.
//!
//! A list definition (LSTF) owns one or nine levels (LVL). Paragraphs refer
//! to lists indirectly through a list format override (LFO), which can
//! replace the start value or the whole definition of single levels.
//!
//! References:
//! - [MS-DOC] 2.9.147 LSTF, 2.9.150 LVL, 2.9.131 LFO, 2.9.133 LFOLVL

use super::super::package::Result;
use super::numbering::format_number;
use crate::common::binary::{read_i32_le, read_slice, read_u8, read_u16_le, read_u32_le};
use bitflags::bitflags;
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;

/// Size of a list definition record.
const LSTF_SIZE: usize = 28;
/// Size of the fixed part of a level.
const LVLF_SIZE: usize = 28;
/// Size of a list format override record.
const LFO_SIZE: usize = 16;
/// Levels in a non-simple list.
pub const MAX_LEVELS: usize = 9;

bitflags! {
    /// LVLF flag byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
    pub struct LevelFlags: u8 {
        /// Justification of the number (two bits)
        const JC = 0x03;
        /// Legal numbering: referenced levels show arabic numbers
        const LEGAL = 0x04;
        /// Do not restart after a higher level
        const NO_RESTART = 0x08;
        const PREV = 0x10;
        const PREV_SPACE = 0x20;
        /// Converted from a Word 6 list
        const WORD6 = 0x40;
    }
}

/// What follows the number text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FollowChar {
    Tab,
    Space,
    Nothing,
}

impl From<u8> for FollowChar {
    fn from(ixch: u8) -> Self {
        match ixch {
            0 => FollowChar::Tab,
            1 => FollowChar::Space,
            _ => FollowChar::Nothing,
        }
    }
}

impl FollowChar {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowChar::Tab => "\t",
            FollowChar::Space => " ",
            FollowChar::Nothing => "",
        }
    }
}

/// One list level (LVL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListLevel {
    pub start_at: i32,
    /// Number format code
    pub nfc: u8,
    pub flags: LevelFlags,
    /// Positions of level placeholders within the number text
    pub number_positions: [u8; 9],
    pub follow: FollowChar,
    pub dxa_space: i32,
    pub dxa_indent: i32,
    /// Paragraph sprms without a style index prefix
    pub papx: Bytes,
    pub chpx: Bytes,
    /// Number text; code units below 9 are placeholders for the number of
    /// that level
    pub text: Vec<u16>,
}

impl ListLevel {
    /// Parse a level at `offset`; returns the level and the offset past it.
    pub fn parse(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let start_at = read_i32_le(data, offset)?;
        let nfc = read_u8(data, offset + 4)?;
        let flags = LevelFlags::from_bits_truncate(read_u8(data, offset + 5)?);
        let mut number_positions = [0u8; 9];
        number_positions.copy_from_slice(read_slice(data, offset + 6, 9)?);
        let follow = FollowChar::from(read_u8(data, offset + 15)?);
        let dxa_space = read_i32_le(data, offset + 16)?;
        let dxa_indent = read_i32_le(data, offset + 20)?;
        let chpx_len = read_u8(data, offset + 24)? as usize;
        let papx_len = read_u8(data, offset + 25)? as usize;

        let mut pos = offset + LVLF_SIZE;
        let papx = Bytes::copy_from_slice(read_slice(data, pos, papx_len)?);
        pos += papx_len;
        let chpx = Bytes::copy_from_slice(read_slice(data, pos, chpx_len)?);
        pos += chpx_len;

        let text_len = read_u16_le(data, pos)? as usize;
        pos += 2;
        let text = read_slice(data, pos, text_len * 2)?
            .chunks_exact(2)
            .map(|unit| u16::from_le_bytes([unit[0], unit[1]]))
            .collect();
        pos += text_len * 2;

        Ok((
            ListLevel {
                start_at,
                nfc,
                flags,
                number_positions,
                follow,
                dxa_space,
                dxa_indent,
                papx,
                chpx,
                text,
            },
            pos,
        ))
    }

    pub fn is_legal(&self) -> bool {
        self.flags.contains(LevelFlags::LEGAL)
    }

    pub fn restarts(&self) -> bool {
        !self.flags.contains(LevelFlags::NO_RESTART)
    }
}

/// A list definition (LSTF plus its levels).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListDefinition {
    pub lsid: i32,
    pub tplc: i32,
    /// Paragraph style linked to each level
    pub styles: [u16; 9],
    pub simple: bool,
    pub levels: Vec<ListLevel>,
}

/// Override of one level in an LFO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelOverride {
    pub ilvl: u8,
    /// Replacement start value
    pub start_at: Option<i32>,
    /// Replacement level definition
    pub level: Option<ListLevel>,
}

/// A list format override (LFO).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListOverride {
    pub lsid: i32,
    pub levels: Vec<LevelOverride>,
}

/// Identity of a level definition for numbering purposes: either a level of
/// a list or a level replaced by an override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LevelKey {
    List { lsid: i32, ilvl: u8 },
    Override { ilfo: u16, ilvl: u8 },
}

/// List definitions and overrides of a document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListTables {
    lists: Vec<ListDefinition>,
    overrides: Vec<ListOverride>,
}

impl ListTables {
    /// Parse from the PlfLst bytes and the PlfLfo bytes. Either may be empty.
    pub fn parse(lst: &[u8], lfo: &[u8]) -> Result<Self> {
        let lists = if lst.is_empty() { Vec::new() } else { Self::parse_lists(lst)? };
        let overrides = if lfo.is_empty() {
            Vec::new()
        } else {
            Self::parse_overrides(lfo)?
        };
        log::debug!("list tables: {} lists, {} overrides", lists.len(), overrides.len());
        Ok(Self { lists, overrides })
    }

    fn parse_lists(data: &[u8]) -> Result<Vec<ListDefinition>> {
        let count = read_u16_le(data, 0)? as usize;
        let mut lists = Vec::with_capacity(count);
        for x in 0..count {
            let offset = 2 + x * LSTF_SIZE;
            let lsid = read_i32_le(data, offset)?;
            let tplc = read_i32_le(data, offset + 4)?;
            let mut styles = [0u16; 9];
            for (i, style) in styles.iter_mut().enumerate() {
                *style = read_u16_le(data, offset + 8 + i * 2)?;
            }
            let simple = read_u8(data, offset + 26)? & 0x01 != 0;
            lists.push(ListDefinition {
                lsid,
                tplc,
                styles,
                simple,
                levels: Vec::new(),
            });
        }

        // Levels of all lists follow the definitions, in list order.
        let mut pos = 2 + count * LSTF_SIZE;
        for list in &mut lists {
            let level_count = if list.simple { 1 } else { MAX_LEVELS };
            for _ in 0..level_count {
                let (level, next) = ListLevel::parse(data, pos)?;
                list.levels.push(level);
                pos = next;
            }
        }
        Ok(lists)
    }

    fn parse_overrides(data: &[u8]) -> Result<Vec<ListOverride>> {
        let count = read_u32_le(data, 0)? as usize;
        let mut overrides = Vec::with_capacity(count.min(data.len() / LFO_SIZE));
        let mut level_counts = Vec::with_capacity(overrides.capacity());
        for x in 0..count {
            let offset = 4 + x * LFO_SIZE;
            let lsid = read_i32_le(data, offset)?;
            level_counts.push(read_u8(data, offset + 12)? as usize);
            overrides.push(ListOverride {
                lsid,
                levels: Vec::new(),
            });
        }

        // Override data: per LFO a character position, then its LFOLVLs.
        let mut pos = 4 + count * LFO_SIZE;
        for (lfo, &level_count) in overrides.iter_mut().zip(&level_counts) {
            if pos >= data.len() {
                break;
            }
            pos += 4;
            for _ in 0..level_count {
                let start_at = read_i32_le(data, pos)?;
                let word = read_u32_le(data, pos + 4)?;
                pos += 8;
                let ilvl = (word & 0x0F) as u8;
                let level = if word & 0x20 != 0 {
                    let (level, next) = ListLevel::parse(data, pos)?;
                    pos = next;
                    Some(level)
                } else {
                    None
                };
                lfo.levels.push(LevelOverride {
                    ilvl,
                    start_at: (word & 0x10 != 0).then_some(start_at),
                    level,
                });
            }
        }
        Ok(overrides)
    }

    pub fn lists(&self) -> &[ListDefinition] {
        &self.lists
    }

    pub fn overrides(&self) -> &[ListOverride] {
        &self.overrides
    }

    pub fn list(&self, lsid: i32) -> Option<&ListDefinition> {
        self.lists.iter().find(|list| list.lsid == lsid)
    }

    /// The override referenced by a paragraph's 1-based `ilfo`.
    pub fn override_for(&self, ilfo: u16) -> Option<&ListOverride> {
        self.overrides.get((ilfo as usize).checked_sub(1)?)
    }

    /// Effective level `ilvl` for `ilfo`, with overrides applied.
    pub fn level(&self, ilfo: u16, ilvl: u8) -> Option<ListLevel> {
        self.lookup(ilfo, ilvl).map(|(_, level)| level)
    }

    fn lookup(&self, ilfo: u16, ilvl: u8) -> Option<(LevelKey, ListLevel)> {
        let lfo = self.override_for(ilfo)?;
        let level_override = lfo.levels.iter().find(|o| o.ilvl == ilvl);
        if let Some(LevelOverride {
            level: Some(level), ..
        }) = level_override
        {
            return Some((LevelKey::Override { ilfo, ilvl }, level.clone()));
        }

        let list = self.list(lfo.lsid)?;
        let mut level = list.levels.get(ilvl as usize)?.clone();
        if let Some(start_at) = level_override.and_then(|o| o.start_at) {
            level.start_at = start_at;
        }
        Some((LevelKey::List { lsid: list.lsid, ilvl }, level))
    }
}

/// Running list numbers for one pass over a document.
///
/// A level's counter advances only when a paragraph of that same level
/// definition is numbered. Numbering a level restarts the deeper levels of
/// the same list unless they opt out.
#[derive(Debug, Default)]
pub struct ListCounter {
    next: HashMap<LevelKey, i32>,
}

impl ListCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number text for a paragraph at level `ilvl` of `ilfo`, advancing the
    /// counter. Returns the level along with its text.
    pub fn label(
        &mut self,
        tables: &ListTables,
        ilfo: u16,
        ilvl: u8,
    ) -> Option<(ListLevel, String)> {
        let Some((key, level)) = tables.lookup(ilfo, ilvl) else {
            log::warn!("list level {ilvl} of override {ilfo} is not defined");
            return None;
        };

        let next = self.next.entry(key).or_insert(level.start_at);
        let own = *next;
        *next = next.saturating_add(1);

        for deeper in ilvl.saturating_add(1)..MAX_LEVELS as u8 {
            if let Some((deeper_key, deeper_level)) = tables.lookup(ilfo, deeper)
                && deeper_level.restarts()
            {
                self.next.remove(&deeper_key);
            }
        }

        let mut text = String::new();
        for &unit in &level.text {
            if unit < 9 {
                let referenced = unit as u8;
                let (value, nfc) = if referenced == ilvl {
                    (own, level.nfc)
                } else {
                    let Some((ref_key, ref_level)) = tables.lookup(ilfo, referenced) else {
                        continue;
                    };
                    let value = match self.next.get(&ref_key) {
                        Some(&next) if next > ref_level.start_at => next - 1,
                        _ => ref_level.start_at,
                    };
                    let nfc = if level.is_legal() { 0 } else { ref_level.nfc };
                    (value, nfc)
                };
                text.push_str(&format_number(value, nfc));
            } else {
                text.push_str(&String::from_utf16_lossy(&[unit]));
            }
        }
        Some((level, text))
    }
}
