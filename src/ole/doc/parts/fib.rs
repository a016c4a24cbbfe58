/// File Information Block (FIB) parser for DOC files.
///
/// The FIB is located at the beginning of the WordDocument stream and contains
/// critical information about the document structure, including:
/// - File format version
/// - Which table stream to use (0Table or 1Table)
/// - Text extents in the WordDocument stream
/// - Offsets and sizes of the tables in the table stream
use super::super::package::{DocError, Result};
use super::stylesheet::FormatVersion;
use zerocopy::{FromBytes, LE, U16, U32};

/// Smallest WordDocument stream that holds every field read here.
const FIB_MIN_SIZE: usize = 0x2F2;

/// Word 97+ identifier
const MAGIC_WORD97: u16 = 0xA5EC;
/// Word 6/95 identifier
const MAGIC_WORD6: u16 = 0xA5DC;

const FLAG_COMPLEX: u16 = 0x0004;
const FLAG_ENCRYPTED: u16 = 0x0100;
const FLAG_WHICH_TABLE: u16 = 0x0200;

/// Offset/length pair locating a table in the table stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FcLcb {
    pub fc: u32,
    pub lcb: u32,
}

impl FcLcb {
    /// The bytes of this table, or `None` when empty or out of range.
    pub fn slice<'a>(&self, stream: &'a [u8]) -> Option<&'a [u8]> {
        if self.lcb == 0 {
            return None;
        }
        let start = self.fc as usize;
        let end = start.checked_add(self.lcb as usize)?;
        stream.get(start..end)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lcb == 0
    }
}

/// File Information Block.
///
/// The FIB is the primary metadata structure in a DOC file.
/// It's located at offset 0 in the WordDocument stream.
#[derive(Debug, Clone)]
pub struct FileInformationBlock {
    /// File format version
    pub nfib: u16,
    /// Language ID
    pub lid: u16,
    /// Flags including encryption, table stream selection, etc.
    pub flags: u16,
    /// First text byte in the WordDocument stream
    pub fc_min: u32,
    /// Byte past the last text byte
    pub fc_mac: u32,
    /// Main document length in characters
    pub ccp_text: u32,
    /// Footnote text length in characters
    pub ccp_ftn: u32,
    /// Header text length in characters
    pub ccp_hdd: u32,
    pub stsh: FcLcb,
    pub plcf_sed: FcLcb,
    pub plcf_hdd: FcLcb,
    pub plcf_bte_chpx: FcLcb,
    pub plcf_bte_papx: FcLcb,
    pub sttbf_ffn: FcLcb,
    pub dop: FcLcb,
    pub clx: FcLcb,
    pub plcf_lst: FcLcb,
    pub plf_lfo: FcLcb,
}

fn u16_at(data: &[u8], offset: usize) -> u16 {
    U16::<LE>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .unwrap_or(0)
}

fn u32_at(data: &[u8], offset: usize) -> u32 {
    U32::<LE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .unwrap_or(0)
}

fn fc_lcb(data: &[u8], offset: usize) -> FcLcb {
    FcLcb {
        fc: u32_at(data, offset),
        lcb: u32_at(data, offset + 4),
    }
}

impl FileInformationBlock {
    /// Parse a FIB from the WordDocument stream.
    pub fn parse(word_document: &[u8]) -> Result<Self> {
        if word_document.len() < FIB_MIN_SIZE {
            return Err(DocError::InvalidFormat(format!(
                "WordDocument stream of {} bytes is too short for a FIB",
                word_document.len()
            )));
        }
        let data = word_document;

        let magic = u16_at(data, 0);
        if magic != MAGIC_WORD97 && magic != MAGIC_WORD6 {
            return Err(DocError::InvalidFormat(format!(
                "Invalid FIB magic number: 0x{magic:04X}"
            )));
        }

        Ok(Self {
            nfib: u16_at(data, 0x02),
            lid: u16_at(data, 0x06),
            flags: u16_at(data, 0x0A),
            fc_min: u32_at(data, 0x18),
            fc_mac: u32_at(data, 0x1C),
            ccp_text: u32_at(data, 0x4C),
            ccp_ftn: u32_at(data, 0x50),
            ccp_hdd: u32_at(data, 0x54),
            stsh: fc_lcb(data, 0xA2),
            plcf_sed: fc_lcb(data, 0xCA),
            plcf_hdd: fc_lcb(data, 0xF2),
            plcf_bte_chpx: fc_lcb(data, 0xFA),
            plcf_bte_papx: fc_lcb(data, 0x102),
            sttbf_ffn: fc_lcb(data, 0x112),
            dop: fc_lcb(data, 0x192),
            clx: fc_lcb(data, 0x1A2),
            plcf_lst: fc_lcb(data, 0x2E2),
            plf_lfo: fc_lcb(data, 0x2EA),
        })
    }

    /// Name of the table stream holding the style sheet and the tables.
    #[inline]
    pub fn table_stream_name(&self) -> &'static str {
        if self.flags & FLAG_WHICH_TABLE != 0 {
            "1Table"
        } else {
            "0Table"
        }
    }

    /// Whether the document was fast-saved and needs the piece table.
    #[inline]
    pub fn is_complex(&self) -> bool {
        self.flags & FLAG_COMPLEX != 0
    }

    /// Check if the document is encrypted.
    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    pub fn format_version(&self) -> FormatVersion {
        FormatVersion::from_nfib(self.nfib)
    }

    /// Character position where the header document starts.
    pub fn header_cp_start(&self) -> u32 {
        self.ccp_text.saturating_add(self.ccp_ftn)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A zeroed Word 97 FIB with the given `(offset, u32)` fields set.
    pub(crate) fn build_fib(fields: &[(usize, u32)]) -> Vec<u8> {
        let mut data = vec![0u8; FIB_MIN_SIZE];
        data[0..2].copy_from_slice(&MAGIC_WORD97.to_le_bytes());
        data[2..4].copy_from_slice(&0x00C1u16.to_le_bytes());
        for &(offset, value) in fields {
            data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_parse_fields() {
        let data = build_fib(&[
            (0x18, 0x400),
            (0x4C, 20),
            (0xA2, 0x10),
            (0xA6, 0x80),
            (0x0A, 0x0204),
        ]);
        let fib = FileInformationBlock::parse(&data).unwrap();
        assert_eq!(fib.fc_min, 0x400);
        assert_eq!(fib.ccp_text, 20);
        assert_eq!(fib.stsh, FcLcb { fc: 0x10, lcb: 0x80 });
        assert_eq!(fib.table_stream_name(), "1Table");
        assert!(fib.is_complex());
        assert!(!fib.is_encrypted());
        assert_eq!(fib.format_version(), FormatVersion::Word97);
        assert_eq!(fib.header_cp_start(), 20);
    }

    #[test]
    fn test_bad_magic_and_short_stream() {
        let mut data = build_fib(&[]);
        data[0] = 0;
        assert!(matches!(FileInformationBlock::parse(&data), Err(DocError::InvalidFormat(_))));
        assert!(FileInformationBlock::parse(&[0xEC, 0xA5]).is_err());
    }

    #[test]
    fn test_fc_lcb_slice() {
        let stream = [1u8, 2, 3, 4, 5];
        assert_eq!(FcLcb { fc: 1, lcb: 3 }.slice(&stream), Some(&[2u8, 3, 4][..]));
        assert_eq!(FcLcb { fc: 4, lcb: 3 }.slice(&stream), None);
        assert_eq!(FcLcb { fc: 0, lcb: 0 }.slice(&stream), None);
    }
}
