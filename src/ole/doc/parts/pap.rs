/// Paragraph Properties (PAP) for DOC files.
///
/// Built from the paragraph style's PAP and the PAPX found in the paragraph
/// FKP. Table sprms sharing the PAPX are filtered out and applied to a
/// [`TableProperties`](super::tap::TableProperties) instead.
use super::super::package::Result;
use super::border::BorderCode;
use super::stylesheet::StyleSheet;
use super::uncompress::PropertyRecord;
use crate::common::binary::{read_i16_le, read_u8, read_u16_le};
use crate::ole::sprm::{SGC_PARAGRAPH, Spra, Sprm};
use serde::Serialize;

/// Line spacing descriptor (LSPD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineSpacing {
    /// Line height in twips, or in 240ths of a line when `multiple` is set
    pub dya_line: i16,
    pub multiple: i16,
}

impl Default for LineSpacing {
    fn default() -> Self {
        Self {
            dya_line: 240,
            multiple: 1,
        }
    }
}

/// A tab stop position with its packed TBD descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TabStop {
    /// Position in twips
    pub position: i16,
    /// Alignment in bits 0-2, leader in bits 3-5
    pub descriptor: u8,
}

impl TabStop {
    pub fn alignment(&self) -> u8 {
        self.descriptor & 0x07
    }

    pub fn leader(&self) -> u8 {
        (self.descriptor >> 3) & 0x07
    }
}

/// Paragraph Properties structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParagraphProperties {
    /// Paragraph style index
    pub istd: u16,
    /// Justification (0 left, 1 center, 2 right, 3 both)
    pub jc: u8,
    pub side_by_side: bool,
    pub keep: bool,
    pub keep_follow: bool,
    pub page_break_before: bool,
    pub brcl: u8,
    pub brcp: u8,
    /// List level
    pub ilvl: u8,
    /// List format override index, 0 when the paragraph is not in a list
    pub ilfo: i32,
    pub no_lnn: bool,
    pub dxa_right: i32,
    pub dxa_left: i32,
    /// First-line indent relative to `dxa_left`
    pub dxa_left1: i32,
    pub lspd: LineSpacing,
    pub dya_before: i32,
    pub dya_after: i32,
    pub tabs: Vec<TabStop>,
    pub in_table: bool,
    /// Table terminating paragraph mark
    pub ttp: bool,
    pub dxa_abs: i32,
    pub dya_abs: i32,
    pub dxa_width: i32,
    pub pc_vert: u8,
    pub pc_horz: u8,
    pub brc_top1: i16,
    pub brc_left1: i16,
    pub brc_bottom1: i16,
    pub brc_right1: i16,
    pub brc_between1: i16,
    pub brc_bar1: u8,
    pub dxa_from_text: i32,
    pub dya_from_text: i32,
    pub wr: u8,
    pub brc_top: BorderCode,
    pub brc_left: BorderCode,
    pub brc_bottom: BorderCode,
    pub brc_right: BorderCode,
    pub brc_between: BorderCode,
    pub brc_bar: BorderCode,
    pub no_auto_hyph: bool,
    pub dya_height: i32,
    pub dcs: i32,
    pub shd: i32,
    pub locked: bool,
    pub window_control: bool,
    pub kinsoku: bool,
    pub word_wrap: bool,
    pub overflow_punct: bool,
    pub top_line_punct: bool,
    pub auto_space_de: bool,
    pub auto_space_dn: bool,
    pub w_align_font: i32,
    pub font_align: i16,
    /// Autonumber list descriptor (Word 6)
    pub anld: Vec<u8>,
    /// Numbering revision mark data
    pub numrm: Vec<u8>,
    pub use_pgsu_settings: bool,
    pub adjust_right: bool,
}

impl Default for ParagraphProperties {
    fn default() -> Self {
        Self {
            istd: 0,
            jc: 0,
            side_by_side: false,
            keep: false,
            keep_follow: false,
            page_break_before: false,
            brcl: 0,
            brcp: 0,
            ilvl: 0,
            ilfo: 0,
            no_lnn: false,
            dxa_right: 0,
            dxa_left: 0,
            dxa_left1: 0,
            lspd: LineSpacing::default(),
            dya_before: 0,
            dya_after: 0,
            tabs: Vec::new(),
            in_table: false,
            ttp: false,
            dxa_abs: 0,
            dya_abs: 0,
            dxa_width: 0,
            pc_vert: 0,
            pc_horz: 0,
            brc_top1: 0,
            brc_left1: 0,
            brc_bottom1: 0,
            brc_right1: 0,
            brc_between1: 0,
            brc_bar1: 0,
            dxa_from_text: 0,
            dya_from_text: 0,
            wr: 0,
            brc_top: BorderCode::default(),
            brc_left: BorderCode::default(),
            brc_bottom: BorderCode::default(),
            brc_right: BorderCode::default(),
            brc_between: BorderCode::default(),
            brc_bar: BorderCode::default(),
            no_auto_hyph: false,
            dya_height: 0,
            dcs: 0,
            shd: 0,
            locked: false,
            window_control: true,
            kinsoku: false,
            word_wrap: false,
            overflow_punct: false,
            top_line_punct: false,
            auto_space_de: false,
            auto_space_dn: false,
            w_align_font: 0,
            font_align: 0,
            anld: Vec::new(),
            numrm: Vec::new(),
            use_pgsu_settings: false,
            adjust_right: false,
        }
    }
}

impl ParagraphProperties {
    /// Create a new ParagraphProperties with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the paragraph belongs to a list.
    #[inline]
    pub fn is_list_item(&self) -> bool {
        self.ilfo > 0
    }

    /// Whether the paragraph mark terminates a table row.
    #[inline]
    pub fn is_table_row(&self) -> bool {
        self.in_table && self.ttp
    }

    /// sprmPChgTabsPapx: delete then add tab stops.
    ///
    /// Operand layout: deletion count, deletion positions, addition count,
    /// addition positions, one descriptor byte per addition.
    fn change_tabs(&mut self, var: &[u8]) -> Result<()> {
        let del_count = read_u8(var, 0)? as usize;
        let mut offset = 1;
        for _ in 0..del_count {
            let position = read_i16_le(var, offset)?;
            self.tabs.retain(|tab| tab.position != position);
            offset += 2;
        }

        let add_count = read_u8(var, offset)? as usize;
        let positions_at = offset + 1;
        let descriptors_at = positions_at + add_count * 2;
        for i in 0..add_count {
            let position = read_i16_le(var, positions_at + i * 2)?;
            let descriptor = read_u8(var, descriptors_at + i)?;
            match self.tabs.binary_search_by_key(&position, |tab| tab.position) {
                Ok(index) => self.tabs[index].descriptor = descriptor,
                Err(index) => self.tabs.insert(index, TabStop { position, descriptor }),
            }
        }
        Ok(())
    }
}

impl PropertyRecord for ParagraphProperties {
    fn begin(&mut self, _parent: &Self, grpprl: &[u8], read_istd: bool) -> usize {
        if !read_istd {
            return 0;
        }
        // A PAPX too short for its style index carries no sprms either.
        if let Ok(istd) = read_u16_le(grpprl, 0) {
            self.istd = istd;
        }
        2
    }

    fn accepts(sgc: u8) -> bool {
        sgc == SGC_PARAGRAPH
    }

    fn apply_sprm(&mut self, _old: &Self, sprm: &Sprm<'_>, _styles: &StyleSheet) -> Result<()> {
        let param = sprm.param;

        match sprm.operation {
            0x00 => self.istd = param as u16,
            0x02 => {
                if (1..=9).contains(&self.istd) {
                    self.istd = (self.istd as i32 + param).clamp(1, 9) as u16;
                }
            },
            0x03 => self.jc = sprm.byte(),
            0x04 => self.side_by_side = sprm.flag(),
            0x05 => self.keep = sprm.flag(),
            0x06 => self.keep_follow = sprm.flag(),
            0x07 => self.page_break_before = sprm.flag(),
            0x08 => self.brcl = sprm.byte(),
            0x09 => self.brcp = sprm.byte(),
            0x0A => self.ilvl = sprm.byte(),
            0x0B => self.ilfo = param,
            0x0C => self.no_lnn = sprm.flag(),
            0x0D => self.change_tabs(sprm.var_param)?,
            0x0E => self.dxa_right = param,
            0x0F => self.dxa_left = param,
            0x10 => self.dxa_left = (self.dxa_left + param).max(0),
            0x11 => self.dxa_left1 = param,
            0x12 => {
                self.lspd = LineSpacing {
                    dya_line: sprm.word_before_end(4)?,
                    multiple: sprm.word_before_end(2)?,
                }
            },
            0x13 => self.dya_before = param,
            0x14 => self.dya_after = param,
            0x16 => self.in_table = sprm.flag(),
            0x17 => self.ttp = sprm.flag(),
            0x18 => self.dxa_abs = param,
            0x19 => self.dya_abs = param,
            0x1A => self.dxa_width = param,
            0x1B => {
                let pc_vert = ((param & 0x30) >> 4) as u8;
                let pc_horz = ((param & 0xC0) >> 6) as u8;
                if pc_vert != 3 {
                    self.pc_vert = pc_vert;
                }
                if pc_horz != 3 {
                    self.pc_horz = pc_horz;
                }
            },
            0x1C => self.brc_top1 = param as i16,
            0x1D => self.brc_left1 = param as i16,
            0x1E => self.brc_bottom1 = param as i16,
            0x1F => self.brc_right1 = param as i16,
            0x20 => self.brc_between1 = param as i16,
            0x21 => self.brc_bar1 = sprm.byte(),
            0x22 | 0x2F => self.dxa_from_text = param,
            0x23 => self.wr = sprm.byte(),
            0x24..=0x29 => {
                let brc =
                    BorderCode::from_words(sprm.word_before_end(4)?, sprm.word_before_end(2)?);
                match sprm.operation {
                    0x24 => self.brc_top = brc,
                    0x25 => self.brc_left = brc,
                    0x26 => self.brc_bottom = brc,
                    0x27 => self.brc_right = brc,
                    0x28 => self.brc_between = brc,
                    _ => self.brc_bar = brc,
                }
            },
            0x2A => self.no_auto_hyph = sprm.flag(),
            0x2B => self.dya_height = param,
            0x2C => self.dcs = param,
            0x2D => self.shd = param,
            0x2E => self.dya_from_text = param,
            0x30 => self.locked = sprm.flag(),
            0x31 => self.window_control = sprm.flag(),
            0x33 => self.kinsoku = sprm.flag(),
            0x34 => self.word_wrap = sprm.flag(),
            0x35 => self.overflow_punct = sprm.flag(),
            0x36 => self.top_line_punct = sprm.flag(),
            0x37 => self.auto_space_de = sprm.flag(),
            0x38 => self.auto_space_dn = sprm.flag(),
            0x39 => self.w_align_font = param,
            0x3A => self.font_align = param as i16,
            0x3E => self.anld = sprm.var_param.to_vec(),
            0x45 => {
                if sprm.spra == Spra::Variable {
                    self.numrm = sprm.var_param.to_vec();
                }
            },
            0x47 => self.use_pgsu_settings = sprm.flag(),
            0x48 => self.adjust_right = sprm.flag(),
            _ => {},
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::doc::parts::uncompress::{uncompress, uncompress_with};

    fn apply(papx: &[u8]) -> ParagraphProperties {
        uncompress(papx, &ParagraphProperties::default(), &StyleSheet::empty()).unwrap()
    }

    #[test]
    fn test_default_pap() {
        let pap = ParagraphProperties::new();
        assert!(pap.window_control);
        assert_eq!(pap.lspd, LineSpacing { dya_line: 240, multiple: 1 });
        assert!(!pap.is_list_item());
    }

    #[test]
    fn test_istd_prefix_and_indents() {
        // istd 7, sprmPDxaLeft 720, sprmPDxaLeft1 -360
        let pap = apply(&[0x07, 0x00, 0x0F, 0x84, 0xD0, 0x02, 0x11, 0x84, 0x98, 0xFE]);
        assert_eq!(pap.istd, 7);
        assert_eq!(pap.dxa_left, 720);
        assert_eq!(pap.dxa_left1, -360);
    }

    #[test]
    fn test_nested_indent_clamps_at_zero() {
        let pap = apply(&[0x00, 0x00, 0x10, 0x84, 0x00, 0xFF]);
        assert_eq!(pap.dxa_left, 0);
    }

    #[test]
    fn test_list_path_skips_prefix() {
        // sprmPIlfo 2 without a prefix
        let pap = uncompress_with(
            &[0x0B, 0x46, 0x02, 0x00],
            &ParagraphProperties::default(),
            &StyleSheet::empty(),
            false,
        )
        .unwrap();
        assert_eq!(pap.ilfo, 2);
        assert_eq!(pap.istd, 0);
    }

    #[test]
    fn test_line_spacing_and_borders() {
        let pap = apply(&[
            0x00, 0x00, // istd
            0x12, 0x64, 0x68, 0x01, 0x00, 0x00, // sprmPDyaLine 360 exact
            0x24, 0x64, 0x08, 0x01, 0x00, 0x00, // sprmPBrcTop
        ]);
        assert_eq!(pap.lspd, LineSpacing { dya_line: 360, multiple: 0 });
        assert_eq!(pap.brc_top.line_width(), 8);
        assert_eq!(pap.brc_top.border_type(), 1);
    }

    #[test]
    fn test_table_flags() {
        let pap = apply(&[0x00, 0x00, 0x16, 0x24, 0x01, 0x17, 0x24, 0x01]);
        assert!(pap.is_table_row());
    }

    #[test]
    fn test_outline_increment_is_clamped() {
        let mut parent = ParagraphProperties::default();
        parent.istd = 8;
        // The prefix sets istd to 8 again, then sprmPIncLvl +3
        let styles = StyleSheet::empty();
        let pap = uncompress(&[0x08, 0x00, 0x02, 0x26, 0x03], &parent, &styles).unwrap();
        assert_eq!(pap.istd, 9);
    }

    #[test]
    fn test_change_tabs() {
        let mut parent = ParagraphProperties::default();
        parent.tabs = vec![
            TabStop { position: 720, descriptor: 0 },
            TabStop { position: 1440, descriptor: 0 },
        ];
        // delete 720, add 360 (right aligned) and 2160
        let var = [0x01, 0xD0, 0x02, 0x02, 0x68, 0x01, 0x70, 0x08, 0x02, 0x00];
        let mut papx = vec![0x00, 0x00, 0x0D, 0xC6, var.len() as u8];
        papx.extend_from_slice(&var);
        let pap = uncompress(&papx, &parent, &StyleSheet::empty()).unwrap();
        let positions: Vec<i16> = pap.tabs.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![360, 1440, 2160]);
        assert_eq!(pap.tabs[0].alignment(), 2);
    }

    #[test]
    fn test_positioning_code_keeps_three() {
        let pap = apply(&[0x00, 0x00, 0x1B, 0x26, 0x70]);
        // vertical 3 is ignored, horizontal 1 applies
        assert_eq!(pap.pc_vert, 0);
        assert_eq!(pap.pc_horz, 1);
    }
}
