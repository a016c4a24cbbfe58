//! Header and footer story lookup (PlcfHdd).
//!
//! The header document holds six stories per section, in the order of
//! [`HeaderFooterKind`]. PlcfHdd stores their character positions relative to
//! the start of the header text.

use crate::common::binary::read_u32_le;
use serde::Serialize;

/// Stories per section.
const STORIES_PER_SECTION: usize = 6;
/// PlcfHdd shorter than this holds no section stories.
const MIN_PLCF_SIZE: usize = 50;

/// Which header or footer of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HeaderFooterKind {
    HeaderEven,
    HeaderOdd,
    FooterEven,
    FooterOdd,
    HeaderFirst,
    FooterFirst,
}

impl HeaderFooterKind {
    pub const ALL: [HeaderFooterKind; 6] = [
        HeaderFooterKind::HeaderEven,
        HeaderFooterKind::HeaderOdd,
        HeaderFooterKind::FooterEven,
        HeaderFooterKind::FooterOdd,
        HeaderFooterKind::HeaderFirst,
        HeaderFooterKind::FooterFirst,
    ];

    /// Position of this story within a section's group.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_header(self) -> bool {
        matches!(
            self,
            HeaderFooterKind::HeaderEven
                | HeaderFooterKind::HeaderOdd
                | HeaderFooterKind::HeaderFirst
        )
    }
}

/// Character range of one header or footer story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderFooterRange {
    pub kind: HeaderFooterKind,
    pub start: u32,
    pub end: u32,
}

impl HeaderFooterRange {
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Locate the `kind` story of the 1-based `section`.
///
/// `base` is where header text starts. An empty story inherits the one of
/// the previous section. A missing or truncated table gives an empty range.
pub fn header_range(
    plcfhdd: &[u8],
    kind: HeaderFooterKind,
    section: usize,
    base: u32,
) -> HeaderFooterRange {
    let empty = HeaderFooterRange {
        kind,
        start: 0,
        end: 0,
    };
    if plcfhdd.len() < MIN_PLCF_SIZE {
        return empty;
    }

    let mut section = section;
    loop {
        let index = kind.index() + section * STORIES_PER_SECTION;
        let bounds = (read_u32_le(plcfhdd, index * 4), read_u32_le(plcfhdd, (index + 1) * 4));
        let (Ok(start), Ok(end)) = bounds else {
            log::debug!("no {kind:?} entry for section {section}");
            return empty;
        };
        let range = HeaderFooterRange {
            kind,
            start: base.saturating_add(start),
            end: base.saturating_add(end),
        };
        if range.start != range.end || section <= 1 {
            return range;
        }
        section -= 1;
    }
}
