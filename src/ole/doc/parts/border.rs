//! Border codes and packed revision timestamps shared by the property records.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Border code (BRC): two packed words.
///
/// The first word holds the line width in eighths of a point and the border
/// type; the second holds the color index, the spacing and the shadow flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BorderCode {
    pub line: i16,
    pub color_space: i16,
}

impl BorderCode {
    /// Build from the two operand words.
    #[inline]
    pub fn from_words(line: i16, color_space: i16) -> Self {
        Self { line, color_space }
    }

    /// Line width in eighths of a point.
    pub fn line_width(&self) -> u8 {
        (self.line as u16 & 0xFF) as u8
    }

    /// Border type (0 = none, 1 = single, 3 = double, ...).
    pub fn border_type(&self) -> u8 {
        ((self.line as u16) >> 8) as u8
    }

    /// Color index.
    pub fn color(&self) -> u8 {
        (self.color_space as u16 & 0xFF) as u8
    }

    /// Space between border and text in points.
    pub fn space(&self) -> u8 {
        ((self.color_space as u16 >> 8) & 0x1F) as u8
    }

    pub fn has_shadow(&self) -> bool {
        self.color_space as u16 & 0x2000 != 0
    }

    pub fn is_none(&self) -> bool {
        self.line == 0 && self.color_space == 0
    }
}

/// Packed date and time (DTTM) used by revision marks and the DOP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Dttm(pub u32);

impl Dttm {
    /// Build from the low and high operand words.
    #[inline]
    pub fn from_words(low: i16, high: i16) -> Self {
        Dttm(low as u16 as u32 | (high as u16 as u32) << 16)
    }

    /// Day of week, 0 = Sunday.
    pub fn weekday(&self) -> u8 {
        (self.0 >> 29) as u8
    }

    /// Decode to a calendar date and time. Zero and out-of-range values give
    /// `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wordbin::ole::doc::parts::border::Dttm;
    ///
    /// // 2004-03-15 10:30
    /// let dttm = Dttm(30 | 10 << 6 | 15 << 11 | 3 << 16 | 104 << 20);
    /// let when = dttm.to_datetime().unwrap();
    /// assert_eq!(when.to_string(), "2004-03-15 10:30:00");
    /// ```
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        if self.0 == 0 {
            return None;
        }
        let minute = self.0 & 0x3F;
        let hour = (self.0 >> 6) & 0x1F;
        let day = (self.0 >> 11) & 0x1F;
        let month = (self.0 >> 16) & 0x0F;
        let year = ((self.0 >> 20) & 0x1FF) as i32 + 1900;
        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
    }
}
