/// Section Properties (SEP) for DOC files.
///
/// Sections start from Word's defaults (letter paper, one-inch top and
/// bottom margins, 1.25-inch side margins) and apply the SEPX stored in the
/// WordDocument stream.
use super::super::package::Result;
use super::border::BorderCode;
use super::stylesheet::StyleSheet;
use super::uncompress::PropertyRecord;
use crate::common::binary::read_u8;
use crate::ole::sprm::Sprm;
use serde::Serialize;

/// Section Properties structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionProperties {
    pub cns_pgn: u8,
    pub i_heading_pgn: u8,
    pub olst_ann: Vec<u8>,
    pub evenly_spaced: bool,
    pub unlocked: bool,
    pub dm_bin_first: i16,
    pub dm_bin_other: i16,
    /// Break code (0 continuous, 1 new column, 2 new page, 3 even, 4 odd)
    pub bkc: u8,
    /// Distinct first page header/footer
    pub title_page: bool,
    /// Number of columns minus one
    pub ccol_m1: i16,
    pub dxa_columns: i32,
    pub auto_pgn: bool,
    /// Page number format
    pub nfc_pgn: u8,
    pub dya_pgn: i16,
    pub dxa_pgn: i16,
    pub pgn_restart: bool,
    pub end_note: bool,
    pub lnc: u8,
    /// Which headers and footers the section defines
    pub grpf_ihdt: u8,
    pub n_lnn_mod: i16,
    pub dxa_lnn: i32,
    pub dya_hdr_top: i32,
    pub dya_hdr_bottom: i32,
    pub l_between: bool,
    pub vjc: u8,
    pub lnn_min: i16,
    pub pgn_start: i16,
    pub dm_orient_page: u8,
    /// Page width in twips
    pub xa_page: i32,
    /// Page height in twips
    pub ya_page: i32,
    pub dxa_left: i32,
    pub dxa_right: i32,
    pub dya_top: i32,
    pub dya_bottom: i32,
    pub dza_gutter: i32,
    pub dm_paper_req: i16,
    pub prop_mark: bool,
    pub brc_top: BorderCode,
    pub brc_left: BorderCode,
    pub brc_bottom: BorderCode,
    pub brc_right: BorderCode,
    pub pgb_prop: i16,
    pub dxt_char_space: i32,
    pub dya_line_pitch: i32,
    pub w_text_flow: i16,
}

impl Default for SectionProperties {
    fn default() -> Self {
        Self {
            cns_pgn: 0,
            i_heading_pgn: 0,
            olst_ann: Vec::new(),
            evenly_spaced: true,
            unlocked: false,
            dm_bin_first: 0,
            dm_bin_other: 0,
            bkc: 2,
            title_page: false,
            ccol_m1: 0,
            dxa_columns: 720,
            auto_pgn: false,
            nfc_pgn: 0,
            dya_pgn: 720,
            dxa_pgn: 720,
            pgn_restart: false,
            end_note: true,
            lnc: 0,
            grpf_ihdt: 0,
            n_lnn_mod: 0,
            dxa_lnn: 0,
            dya_hdr_top: 720,
            dya_hdr_bottom: 720,
            l_between: false,
            vjc: 0,
            lnn_min: 0,
            pgn_start: 1,
            dm_orient_page: 1,
            xa_page: 12240,
            ya_page: 15840,
            dxa_left: 1800,
            dxa_right: 1800,
            dya_top: 1440,
            dya_bottom: 1440,
            dza_gutter: 0,
            dm_paper_req: 0,
            prop_mark: false,
            brc_top: BorderCode::default(),
            brc_left: BorderCode::default(),
            brc_bottom: BorderCode::default(),
            brc_right: BorderCode::default(),
            pgb_prop: 0,
            dxt_char_space: 0,
            dya_line_pitch: 0,
            w_text_flow: 0,
        }
    }
}

impl SectionProperties {
    /// Create a new SectionProperties with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of text columns.
    pub fn columns(&self) -> usize {
        (self.ccol_m1.max(0) as usize) + 1
    }

    /// Width available for text in twips.
    pub fn text_width(&self) -> i32 {
        self.xa_page - self.dxa_left - self.dxa_right - self.dza_gutter
    }

    /// Four-byte border operand: low word then high word.
    fn border(param: i32) -> BorderCode {
        BorderCode::from_words((param & 0xFFFF) as i16, ((param >> 16) & 0xFFFF) as i16)
    }
}

impl PropertyRecord for SectionProperties {
    fn apply_sprm(&mut self, _old: &Self, sprm: &Sprm<'_>, _styles: &StyleSheet) -> Result<()> {
        let param = sprm.param;

        match sprm.operation {
            0x00 => self.cns_pgn = sprm.byte(),
            0x01 => self.i_heading_pgn = sprm.byte(),
            0x02 => self.olst_ann = sprm.var_param.to_vec(),
            0x05 => self.evenly_spaced = param != 0,
            0x06 => self.unlocked = param != 0,
            0x07 => self.dm_bin_first = param as i16,
            0x08 => self.dm_bin_other = param as i16,
            0x09 => self.bkc = sprm.byte(),
            0x0A => self.title_page = param != 0,
            0x0B => self.ccol_m1 = param as i16,
            0x0C => self.dxa_columns = param,
            0x0D => self.auto_pgn = param != 0,
            0x0E => self.nfc_pgn = sprm.byte(),
            0x0F => self.dya_pgn = param as i16,
            0x10 => self.dxa_pgn = param as i16,
            0x11 => self.pgn_restart = param != 0,
            0x12 => self.end_note = param != 0,
            0x13 => self.lnc = sprm.byte(),
            0x14 => self.grpf_ihdt = sprm.byte(),
            0x15 => self.n_lnn_mod = param as i16,
            0x16 => self.dxa_lnn = param,
            0x17 => self.dya_hdr_top = param,
            0x18 => self.dya_hdr_bottom = param,
            0x19 => self.l_between = param != 0,
            0x1A => self.vjc = sprm.byte(),
            0x1B => self.lnn_min = param as i16,
            0x1C => self.pgn_start = param as i16,
            0x1D => self.dm_orient_page = sprm.byte(),
            0x1F => self.xa_page = param,
            0x20 => self.ya_page = param,
            0x21 => self.dxa_left = param,
            0x22 => self.dxa_right = param,
            0x23 => self.dya_top = param,
            0x24 => self.dya_bottom = param,
            0x25 => self.dza_gutter = param,
            0x26 => self.dm_paper_req = param as i16,
            0x27 => self.prop_mark = read_u8(sprm.var_param, 0)? != 0,
            0x2B => self.brc_top = Self::border(param),
            0x2C => self.brc_left = Self::border(param),
            0x2D => self.brc_bottom = Self::border(param),
            0x2E => self.brc_right = Self::border(param),
            0x2F => self.pgb_prop = param as i16,
            0x30 => self.dxt_char_space = param,
            0x31 => self.dya_line_pitch = param,
            0x33 => self.w_text_flow = param as i16,
            _ => {},
        }
        Ok(())
    }
}
