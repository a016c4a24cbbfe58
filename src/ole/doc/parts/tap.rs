/// Table Properties (TAP) for DOC files.
///
/// A TAP is decoded from the PAPX of the paragraph mark that terminates a
/// table row. Only the table-group sprms of that PAPX apply.
use super::super::package::Result;
use super::border::BorderCode;
use super::stylesheet::StyleSheet;
use super::uncompress::{PropertyRecord, uncompress};
use crate::common::binary::{read_i16_le, read_u8};
use crate::ole::sprm::{SGC_TABLE, Sprm};
use bitflags::bitflags;
use serde::Serialize;
use smallvec::SmallVec;

/// Size of a TC record in the table definition operand.
const TC_SIZE: usize = 20;

bitflags! {
    /// Table cell flags (TC rgf word)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
    pub struct TcFlags: u16 {
        /// First cell of a horizontally merged range
        const FIRST_MERGED = 0x0001;
        /// Cell merged into the preceding one
        const MERGED = 0x0002;
        /// Vertical text flow
        const VERTICAL = 0x0004;
        /// Right-to-left vertical text
        const BACKWARD = 0x0008;
        const ROTATE_FONT = 0x0010;
        /// Cell is part of a vertical merge
        const VERT_MERGE = 0x0020;
        /// First cell of a vertical merge
        const VERT_RESTART = 0x0040;
    }
}

/// Table cell descriptor (TC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TableCell {
    pub flags: TcFlags,
    /// Vertical alignment (0 top, 1 center, 2 bottom)
    pub vert_align: u8,
    pub brc_top: BorderCode,
    pub brc_left: BorderCode,
    pub brc_bottom: BorderCode,
    pub brc_right: BorderCode,
}

impl TableCell {
    /// Decode a 20-byte TC at `offset`.
    ///
    /// Table definitions may omit trailing TCs; a record that does not fit
    /// decodes as the default cell.
    pub fn parse(data: &[u8], offset: usize) -> TableCell {
        if data.len() < offset + TC_SIZE {
            return TableCell::default();
        }
        let word = |at: usize| read_i16_le(data, offset + at).unwrap_or(0);
        let brc = |at: usize| BorderCode::from_words(word(at), word(at + 2));
        let rgf = word(0) as u16;
        TableCell {
            flags: TcFlags::from_bits_truncate(rgf),
            vert_align: ((rgf & 0x0180) >> 7) as u8,
            brc_top: brc(4),
            brc_left: brc(8),
            brc_bottom: brc(12),
            brc_right: brc(16),
        }
    }
}

/// Table Properties structure.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableProperties {
    /// Row justification
    pub jc: i16,
    /// Half the gap between cells in twips
    pub dxa_gap_half: i32,
    pub cant_split: bool,
    /// Row repeats as a header on each page
    pub table_header: bool,
    pub brc_top: BorderCode,
    pub brc_left: BorderCode,
    pub brc_bottom: BorderCode,
    pub brc_right: BorderCode,
    pub brc_horizontal: BorderCode,
    pub brc_vertical: BorderCode,
    pub dya_row_height: i32,
    /// Number of cells
    pub itc_mac: usize,
    /// Cell boundaries, `itc_mac + 1` entries
    pub rgdxa_center: SmallVec<[i16; 16]>,
    /// Cell descriptors, `itc_mac` entries
    pub rgtc: SmallVec<[TableCell; 8]>,
}

impl TableProperties {
    /// Create a new TableProperties with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Width of cell `index` in twips.
    pub fn cell_width(&self, index: usize) -> Option<i32> {
        let start = *self.rgdxa_center.get(index)?;
        let end = *self.rgdxa_center.get(index + 1)?;
        Some(end as i32 - start as i32)
    }

    /// sprmTDefTable: cell count, boundaries, then TC records.
    fn define_table(&mut self, var: &[u8]) -> Result<()> {
        let count = read_u8(var, 0)? as usize;
        self.itc_mac = count;
        self.rgdxa_center = (0..=count)
            .map(|x| read_i16_le(var, 1 + x * 2))
            .collect::<std::result::Result<_, _>>()?;
        let tc_start = 1 + (count + 1) * 2;
        self.rgtc = (0..count)
            .map(|x| TableCell::parse(var, tc_start + x * TC_SIZE))
            .collect();
        Ok(())
    }

    /// sprmTSetBrc: assign one border side to a range of cells.
    fn set_cell_borders(&mut self, var: &[u8]) -> Result<()> {
        let first = read_u8(var, 0)? as usize;
        let lim = (read_u8(var, 1)? as usize).min(self.rgtc.len());
        let sides = read_u8(var, 2)?;
        let brc = BorderCode::from_words(read_i16_le(var, 6)?, read_i16_le(var, 8)?);
        for cell in self.rgtc.iter_mut().take(lim).skip(first) {
            if sides & 0x08 != 0 {
                cell.brc_right = brc;
            } else if sides & 0x04 != 0 {
                cell.brc_bottom = brc;
            } else if sides & 0x02 != 0 {
                cell.brc_left = brc;
            } else if sides & 0x01 != 0 {
                cell.brc_top = brc;
            }
        }
        Ok(())
    }

    /// sprmTInsert: `count` cells of `width` twips before cell `index`.
    fn insert_cells(&mut self, param: i32) {
        let param = param as u32;
        let count = ((param >> 16) & 0xFF) as usize;
        let width = (param & 0xFFFF) as u16 as i16;
        let index = ((param >> 24) as usize).min(self.itc_mac);

        if self.rgdxa_center.is_empty() {
            self.rgdxa_center.push(0);
        }
        let index = index.min(self.rgdxa_center.len() - 1);
        let base = self.rgdxa_center[index];
        let shift = width.wrapping_mul(count as i16);

        let mut boundaries: SmallVec<[i16; 16]> =
            SmallVec::with_capacity(self.rgdxa_center.len() + count);
        boundaries.extend_from_slice(&self.rgdxa_center[..=index]);
        for k in 1..=count {
            boundaries.push(base.wrapping_add(width.wrapping_mul(k as i16)));
        }
        boundaries.extend(self.rgdxa_center[index + 1..].iter().map(|dxa| dxa.wrapping_add(shift)));
        self.rgdxa_center = boundaries;

        let at = index.min(self.rgtc.len());
        self.rgtc
            .insert_many(at, std::iter::repeat_n(TableCell::default(), count));
        self.itc_mac += count;
    }

    /// sprmTDelete: remove cells `first..lim`.
    fn delete_cells(&mut self, param: i32) {
        let first = (param & 0xFF) as usize;
        let lim = (((param >> 8) & 0xFF) as usize).min(self.rgtc.len());
        if first >= lim {
            return;
        }
        self.rgtc.drain(first..lim);

        if lim < self.rgdxa_center.len() {
            let width = self.rgdxa_center[lim].wrapping_sub(self.rgdxa_center[first]);
            self.rgdxa_center.drain(first + 1..=lim);
            for dxa in self.rgdxa_center.iter_mut().skip(first + 1) {
                *dxa = dxa.wrapping_sub(width);
            }
        }
        self.itc_mac = self.rgtc.len();
    }
}

impl PropertyRecord for TableProperties {
    fn begin(&mut self, _parent: &Self, _grpprl: &[u8], _read_istd: bool) -> usize {
        2
    }

    fn accepts(sgc: u8) -> bool {
        sgc == SGC_TABLE
    }

    fn apply_sprm(&mut self, _old: &Self, sprm: &Sprm<'_>, _styles: &StyleSheet) -> Result<()> {
        let param = sprm.param;
        let var = sprm.var_param;

        match sprm.operation {
            0x00 => self.jc = param as i16,
            0x01 => {
                let first = self.rgdxa_center.first().copied().unwrap_or(0) as i32;
                let adjust = param - (first + self.dxa_gap_half);
                for dxa in self.rgdxa_center.iter_mut().take(self.itc_mac) {
                    *dxa = (*dxa as i32 + adjust) as i16;
                }
            },
            0x02 => {
                let adjust = self.dxa_gap_half - param;
                if let Some(first) = self.rgdxa_center.first_mut() {
                    *first = (*first as i32 + adjust) as i16;
                }
                self.dxa_gap_half = param;
            },
            0x03 => self.cant_split = param != 0,
            0x04 => self.table_header = param != 0,
            0x05 => {
                let brc = |at: usize| -> Result<BorderCode> {
                    Ok(BorderCode::from_words(read_i16_le(var, at)?, read_i16_le(var, at + 2)?))
                };
                self.brc_top = brc(0)?;
                self.brc_left = brc(4)?;
                self.brc_bottom = brc(8)?;
                self.brc_right = brc(12)?;
                self.brc_horizontal = brc(16)?;
                self.brc_vertical = brc(20)?;
            },
            0x07 => self.dya_row_height = param,
            0x08 => self.define_table(var)?,
            0x20 => self.set_cell_borders(var)?,
            0x21 => self.insert_cells(param),
            0x22 => self.delete_cells(param),
            _ => {},
        }
        Ok(())
    }
}

/// Decode the TAP of a row-terminating paragraph from its PAPX.
pub fn parse_row(papx: &[u8], styles: &StyleSheet) -> Result<TableProperties> {
    uncompress(papx, &TableProperties::default(), styles)
}
