/// Character Properties (CHP) for DOC files.
///
/// A CHP is rebuilt for every run by applying the run's CHPX to the CHP of
/// its paragraph style. Revision marks, symbol references and embedded
/// object offsets are carried along with the visible formatting.
use super::super::package::Result;
use super::border::{BorderCode, Dttm};
use super::stylesheet::StyleSheet;
use super::uncompress::{PropertyRecord, uncompress};
use crate::common::binary::{read_i32_le, read_u8, read_u16_le};
use crate::ole::sprm::Sprm;
use serde::Serialize;

/// Largest font size in half-points a CHP holds.
pub const MAX_HPS: i32 = i16::MAX as i32;

/// Character Properties structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterProperties {
    /// Character style index
    pub istd: u16,
    /// Style index of the parent record this one was built from
    pub base_istd: u16,

    pub rmark_del: bool,
    pub rmark: bool,
    pub fld_vanish: bool,
    /// Picture location in the Data stream
    pub fc_pic: i32,
    pub ibst_rmark: i16,
    pub dttm_rmark: Dttm,
    pub data: bool,
    pub chs_diff: bool,
    pub chse: u16,
    /// Symbol font and character (sprmCSymbol)
    pub ftc_sym: u16,
    pub xch_sym: u16,
    pub ole2: bool,
    pub ico_highlight: u8,
    pub highlighted: bool,
    pub fc_obj: i32,

    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub outline: bool,
    pub shadow: bool,
    pub small_caps: bool,
    pub caps: bool,
    pub vanish: bool,
    pub dstrike: bool,
    pub imprint: bool,
    pub emboss: bool,
    pub spec: bool,
    pub obj: bool,

    /// Font index (Word 6)
    pub ftc: u16,
    pub ftc_ascii: u16,
    pub ftc_fe: u16,
    pub ftc_other: u16,
    /// Underline code
    pub kul: u8,
    /// Font size in half points
    pub hps: i32,
    /// Vertical position in half points, positive raises
    pub hps_pos: i32,
    pub hps_kern: i32,
    /// Extra spacing in twips
    pub dxa_space: i32,
    pub lid_default: u16,
    pub lid_fe: u16,
    /// Color index
    pub ico: u8,
    /// Superscript/subscript (0 none, 1 super, 2 sub)
    pub iss: u8,
    pub ysr: u8,
    pub sfxt_text: u8,
    pub idct_hint: u8,
    pub shd: i16,
    pub brc: BorderCode,

    pub prop_rmark: bool,
    pub ibst_prop_rmark: u16,
    pub dttm_prop_rmark: i32,
    pub disp_fld_rmark: bool,
    pub ibst_disp_fld_rmark: u16,
    pub dttm_disp_fld_rmark: i32,
    pub xst_disp_fld_rmark: Vec<u8>,
    pub ibst_rmark_del: i16,
    pub dttm_rmark_del: Dttm,
}

impl Default for CharacterProperties {
    fn default() -> Self {
        Self {
            istd: 10,
            base_istd: 10,
            rmark_del: false,
            rmark: false,
            fld_vanish: false,
            fc_pic: -1,
            ibst_rmark: 0,
            dttm_rmark: Dttm::default(),
            data: false,
            chs_diff: false,
            chse: 0,
            ftc_sym: 0,
            xch_sym: 0,
            ole2: false,
            ico_highlight: 0,
            highlighted: false,
            fc_obj: 0,
            bold: false,
            italic: false,
            strike: false,
            outline: false,
            shadow: false,
            small_caps: false,
            caps: false,
            vanish: false,
            dstrike: false,
            imprint: false,
            emboss: false,
            spec: false,
            obj: false,
            ftc: 0,
            ftc_ascii: 0,
            ftc_fe: 0,
            ftc_other: 0,
            kul: 0,
            hps: 20,
            hps_pos: 0,
            hps_kern: 0,
            dxa_space: 0,
            lid_default: 0x0400,
            lid_fe: 0x0400,
            ico: 0,
            iss: 0,
            ysr: 0,
            sfxt_text: 0,
            idct_hint: 0,
            shd: 0,
            brc: BorderCode::default(),
            prop_rmark: false,
            ibst_prop_rmark: 0,
            dttm_prop_rmark: 0,
            disp_fld_rmark: false,
            ibst_disp_fld_rmark: 0,
            dttm_disp_fld_rmark: 0,
            xst_disp_fld_rmark: Vec::new(),
            ibst_rmark_del: 0,
            dttm_rmark_del: Dttm::default(),
        }
    }
}

impl CharacterProperties {
    /// Create a new CharacterProperties with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Font size in points.
    pub fn font_size_points(&self) -> f32 {
        self.hps as f32 / 2.0
    }

    /// Store a computed size, held to `min..=MAX_HPS`.
    fn set_hps(&mut self, hps: i64, min: i32) {
        self.hps = hps.clamp(min as i64, MAX_HPS as i64) as i32;
    }

    /// Toggle operand semantics shared by the boolean character sprms.
    ///
    /// - 0: false
    /// - 1: true
    /// - 0x80: keep the parent value
    /// - 0x81: invert the parent value
    fn toggle(operand: u8, old: bool) -> bool {
        match operand {
            0 => false,
            1 => true,
            0x80 => old,
            0x81 => !old,
            _ => false,
        }
    }

    /// sprmCSizePos: size, size increment, position and auto-adjust packed
    /// into a three-byte operand.
    fn apply_size_pos(&mut self, old: &Self, param: i32) {
        let param = param as u32;

        let hps = (param & 0xFF) as i32;
        if hps != 0 {
            self.hps = hps;
        }

        // Seven-bit signed increment in bits 9-15.
        let increment = ((((param & 0xFE00) >> 9) as u8) << 1) as i8 >> 1;
        if increment != 0 {
            self.set_hps(self.hps as i64 + increment as i64 * 2, 2);
        }

        let hps_pos = ((param >> 16) & 0xFF) as u8;
        if hps_pos != 0x80 {
            self.hps_pos = hps_pos as i8 as i32;
        }

        let adjust = param & 0x0100 != 0;
        if adjust && hps_pos != 0x80 && hps_pos != 0 && old.hps_pos == 0 {
            self.set_hps(self.hps as i64 - 2, 2);
        }
        if adjust && hps_pos == 0 && old.hps_pos != 0 {
            self.set_hps(self.hps as i64 + 2, 2);
        }
    }

    /// Restore the fields a generic CHP built from `grpprl` agrees on to the
    /// values of the parent's base style.
    fn apply_style_defaults(
        &mut self,
        old: &Self,
        grpprl: &[u8],
        styles: &StyleSheet,
    ) -> Result<()> {
        let generic = CharacterProperties {
            ftc: 4,
            ..Default::default()
        };
        let generic = uncompress(grpprl, &generic, styles)?;

        let style = match styles.character_properties(old.base_istd) {
            Ok(style) => style,
            Err(err) => {
                log::debug!("style defaults skipped for istd {}: {err}", old.base_istd);
                return Ok(());
            },
        };

        macro_rules! restore {
            ($($field:ident),* $(,)?) => {
                $(
                    if self.$field == generic.$field {
                        self.$field = style.$field;
                    }
                )*
            };
        }
        restore!(
            bold,
            italic,
            small_caps,
            vanish,
            strike,
            caps,
            ftc_ascii,
            ftc_fe,
            ftc_other,
            hps,
            hps_pos,
            kul,
            dxa_space,
            ico,
            lid_default,
            lid_fe,
        );
        Ok(())
    }
}

impl PropertyRecord for CharacterProperties {
    fn begin(&mut self, parent: &Self, _grpprl: &[u8], _read_istd: bool) -> usize {
        self.base_istd = parent.istd;
        0
    }

    fn apply_sprm(&mut self, old: &Self, sprm: &Sprm<'_>, styles: &StyleSheet) -> Result<()> {
        let param = sprm.param;
        let var = sprm.var_param;

        match sprm.operation {
            0x00 => self.rmark_del = sprm.flag(),
            0x01 => self.rmark = sprm.flag(),
            0x02 => self.fld_vanish = sprm.flag(),
            0x03 => {
                self.fc_pic = param;
                self.spec = true;
            },
            0x04 => self.ibst_rmark = param as i16,
            0x05 => {
                self.dttm_rmark =
                    Dttm::from_words(sprm.word_before_end(4)?, sprm.word_before_end(2)?)
            },
            0x06 => self.data = sprm.flag(),
            0x08 => {
                // Flag byte, then the character set word.
                self.chs_diff = param & 0xFF != 0;
                self.chse = ((param >> 8) & 0xFFFF) as u16;
            },
            0x09 => {
                self.spec = true;
                if var.is_empty() {
                    self.ftc_sym = (param & 0xFFFF) as u16;
                    self.xch_sym = ((param >> 16) & 0xFFFF) as u16;
                } else {
                    self.ftc_sym = read_u16_le(var, 0)?;
                    self.xch_sym = read_u16_le(var, 2)?;
                }
            },
            0x0A => self.ole2 = sprm.flag(),
            0x0C => {
                self.ico_highlight = sprm.byte();
                self.highlighted = sprm.byte() != 0;
            },
            0x0E => self.fc_obj = param,
            0x30 => self.istd = param as u16,
            0x32 => {
                self.bold = false;
                self.italic = false;
                self.outline = false;
                self.strike = false;
                self.shadow = false;
                self.small_caps = false;
                self.caps = false;
                self.vanish = false;
                self.kul = 0;
                self.ico = 0;
            },
            0x33 => *self = old.clone(),
            0x35 => self.bold = Self::toggle(sprm.byte(), old.bold),
            0x36 => self.italic = Self::toggle(sprm.byte(), old.italic),
            0x37 => self.strike = Self::toggle(sprm.byte(), old.strike),
            0x38 => self.outline = Self::toggle(sprm.byte(), old.outline),
            0x39 => self.shadow = Self::toggle(sprm.byte(), old.shadow),
            0x3A => self.small_caps = Self::toggle(sprm.byte(), old.small_caps),
            0x3B => self.caps = Self::toggle(sprm.byte(), old.caps),
            0x3C => self.vanish = Self::toggle(sprm.byte(), old.vanish),
            0x3D => self.ftc = param as u16,
            0x3E => self.kul = sprm.byte(),
            0x3F => self.apply_size_pos(old, param),
            0x40 => self.dxa_space = param,
            0x41 => self.lid_default = param as u16,
            0x42 => self.ico = sprm.byte(),
            0x43 => self.set_hps(param as i64, 0),
            0x44 => self.set_hps(self.hps as i64 + param as i64 * 2, 2),
            0x45 => self.hps_pos = param,
            0x46 => {
                if param != 0 {
                    if old.hps_pos == 0 {
                        self.set_hps(self.hps as i64 - 2, 2);
                    }
                } else if old.hps_pos != 0 {
                    self.set_hps(self.hps as i64 + 2, 2);
                }
            },
            0x47 | 0x4C => self.apply_style_defaults(old, var, styles)?,
            0x48 => self.iss = sprm.byte(),
            0x49 => {
                if !var.is_empty() {
                    self.set_hps(read_u16_le(var, 0)? as i64, 0);
                }
            },
            0x4A => {
                let increment = if var.is_empty() {
                    param
                } else {
                    read_u8(var, 0)? as i8 as i32
                };
                self.set_hps(self.hps as i64 + increment as i64, 8);
            },
            0x4B => self.hps_kern = param,
            0x4D => {
                let hps = self.hps as i64;
                self.set_hps(hps + hps * param as i64 / 100, 0)
            },
            0x4E => self.ysr = sprm.byte(),
            0x4F => self.ftc_ascii = param as u16,
            0x50 => self.ftc_fe = param as u16,
            0x51 => self.ftc_other = param as u16,
            0x53 => self.dstrike = sprm.flag(),
            0x54 => self.imprint = sprm.flag(),
            0x55 => self.spec = sprm.flag(),
            0x56 => self.obj = sprm.flag(),
            0x57 => {
                self.prop_rmark = read_u8(var, 0)? != 0;
                self.ibst_prop_rmark = read_u16_le(var, 1)?;
                self.dttm_prop_rmark = read_i32_le(var, 3)?;
            },
            0x58 => self.emboss = sprm.flag(),
            0x59 => self.sfxt_text = sprm.byte(),
            0x62 => {
                self.disp_fld_rmark = read_u8(var, 0)? != 0;
                self.ibst_disp_fld_rmark = read_u16_le(var, 1)?;
                self.dttm_disp_fld_rmark = read_i32_le(var, 3)?;
                let xst = var.get(7..).unwrap_or_default();
                self.xst_disp_fld_rmark = xst[..xst.len().min(32)].to_vec();
            },
            0x63 => self.ibst_rmark_del = param as i16,
            0x64 => {
                self.dttm_rmark_del =
                    Dttm::from_words(sprm.word_before_end(4)?, sprm.word_before_end(2)?)
            },
            0x65 => {
                self.brc =
                    BorderCode::from_words(sprm.word_before_end(4)?, sprm.word_before_end(2)?)
            },
            0x66 => self.shd = param as i16,
            0x6D => self.lid_default = param as u16,
            0x6E => self.lid_fe = param as u16,
            0x6F => self.idct_hint = sprm.byte(),
            _ => {},
        }
        Ok(())
    }
}
