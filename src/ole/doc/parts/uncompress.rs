//! Property decompression: applying a grpprl to a parent property record.
//!
//! Every record kind starts from a clone of its parent and applies the sprms
//! that belong to it in order. What counts as "belongs" and where the sprms
//! start differ per record kind; [`PropertyRecord`] captures that.

use super::super::package::Result;
use super::stylesheet::StyleSheet;
use crate::ole::sprm::{Sprm, iter_sprms};

/// A property record that can be rebuilt from a parent and a grpprl.
pub trait PropertyRecord: Clone {
    /// Adjust the fresh clone of `parent` before any sprm is applied and
    /// return the offset of the first sprm in `grpprl`.
    fn begin(&mut self, _parent: &Self, _grpprl: &[u8], _read_istd: bool) -> usize {
        0
    }

    /// Whether sprms of property group `sgc` apply to this record.
    fn accepts(_sgc: u8) -> bool {
        true
    }

    /// Apply one sprm. `old` is the parent record.
    fn apply_sprm(&mut self, old: &Self, sprm: &Sprm<'_>, styles: &StyleSheet) -> Result<()>;
}

/// Build a record from `parent` and `grpprl`.
///
/// Paragraph grpprls start with a two-byte style index which is read into
/// the record.
pub fn uncompress<P: PropertyRecord>(grpprl: &[u8], parent: &P, styles: &StyleSheet) -> Result<P> {
    uncompress_with(grpprl, parent, styles, true)
}

/// [`uncompress`] with control over the paragraph style-index prefix.
/// List level grpprls carry no prefix and pass `read_istd = false`.
pub fn uncompress_with<P: PropertyRecord>(
    grpprl: &[u8],
    parent: &P,
    styles: &StyleSheet,
    read_istd: bool,
) -> Result<P> {
    let mut record = parent.clone();
    let start = record.begin(parent, grpprl, read_istd);
    for sprm in iter_sprms(grpprl, start) {
        let sprm = sprm?;
        if P::accepts(sprm.sgc) {
            record.apply_sprm(parent, &sprm, styles)?;
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::doc::parts::chp::CharacterProperties;
    use crate::ole::doc::parts::pap::ParagraphProperties;
    use crate::ole::doc::parts::sep::SectionProperties;
    use crate::ole::doc::parts::tap::TableProperties;
    use proptest::prelude::*;

    #[test]
    fn test_empty_grpprl_is_identity() {
        let styles = StyleSheet::empty();
        let pap = ParagraphProperties::default();
        assert_eq!(uncompress(&[], &pap, &styles).unwrap(), pap);
        let sep = SectionProperties::default();
        assert_eq!(uncompress(&[], &sep, &styles).unwrap(), sep);
        let tap = TableProperties::default();
        assert_eq!(uncompress(&[], &tap, &styles).unwrap(), tap);
    }

    #[test]
    fn test_truncated_grpprl_is_corrupt_record() {
        let styles = StyleSheet::empty();
        let chp = CharacterProperties::default();
        let err = uncompress(&[0x43, 0x4A, 0x30], &chp, &styles).unwrap_err();
        assert!(matches!(err, crate::ole::doc::DocError::CorruptRecord(_)));
    }

    #[test]
    fn test_sprms_of_other_groups_are_skipped() {
        let styles = StyleSheet::empty();
        let pap = ParagraphProperties::default();
        // istd 0, then sprmCFBold (character group) and sprmPJc (paragraph group)
        let papx = [0x00, 0x00, 0x35, 0x08, 0x01, 0x03, 0x24, 0x01];
        let out = uncompress(&papx, &pap, &styles).unwrap();
        assert_eq!(out.jc, 1);
        let mut expected = pap.clone();
        expected.jc = 1;
        expected.istd = 0;
        assert_eq!(out, expected);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        /// Unknown operations leave the record untouched.
        #[test]
        fn prop_unknown_operations_are_noops(operation in 0x70u16..0x1FF, operand in any::<u8>()) {
            let styles = StyleSheet::empty();
            let chp = CharacterProperties::default();
            let opcode = 0x2800 | operation;
            let grpprl = [opcode as u8, (opcode >> 8) as u8, operand];
            let out = uncompress(&grpprl, &chp, &styles).unwrap();
            let mut expected = chp.clone();
            expected.base_istd = chp.istd;
            prop_assert_eq!(out, expected);
        }
    }
}
