/// FKP (Formatted Disk Page) parser for DOC files.
///
/// FKPs are 512-byte pages in the WordDocument stream that store character
/// and paragraph properties for runs of file positions. A bin table in the
/// table stream lists the page number of every FKP.
///
/// References:
/// - [MS-DOC] 2.9.33 ChpxFkp
/// - [MS-DOC] 2.9.175 PapxFkp
/// - [MS-DOC] 2.8.9 PlcBteChpx / PlcBtePapx
use super::super::package::{DocError, Result};
use super::range_index::{PropertyNode, RangeIndex};
use super::stylesheet::FormatVersion;
use crate::common::binary::{read_slice, read_u8, read_u16_le, read_u32_le};
use crate::ole::plcf::Plcf;
use bytes::Bytes;

/// Size of an FKP page in bytes (always 512)
pub const FKP_PAGE_SIZE: usize = 512;

/// A single entry in an FKP page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FkpEntry {
    /// Start file position
    pub fc_start: u32,
    /// End file position, exclusive
    pub fc_end: u32,
    /// CHPX or PAPX bytes; empty when the run has no formatting
    pub grpprl: Bytes,
}

/// Read the `count + 1` run boundaries at the start of a page.
fn read_boundaries(page: &[u8], count: usize) -> Result<Vec<u32>> {
    (0..=count)
        .map(|i| read_u32_le(page, i * 4).map_err(DocError::from))
        .collect()
}

/// Run count stored in the last byte of a page.
fn run_count(page: &[u8]) -> Result<usize> {
    if page.len() != FKP_PAGE_SIZE {
        return Err(DocError::CorruptRecord(format!(
            "FKP page of {} bytes",
            page.len()
        )));
    }
    Ok(page[FKP_PAGE_SIZE - 1] as usize)
}

/// CHPX FKP (Character Property Formatted Disk Page).
///
/// Each page contains:
/// - FC array at start (4 bytes each, crun + 1 entries)
/// - one-byte word offsets to the CHPXs (0 = no formatting)
/// - CHPXs as a length byte followed by the sprms
/// - crun at byte 511
#[derive(Debug, Clone)]
pub struct ChpxFkp {
    entries: Vec<FkpEntry>,
}

impl ChpxFkp {
    /// Parse a CHPX FKP from a 512-byte page.
    pub fn parse(page: &[u8]) -> Result<Self> {
        let crun = run_count(page)?;
        let fcs = read_boundaries(page, crun)?;
        let bx_offset = (crun + 1) * 4;

        let mut entries = Vec::with_capacity(crun);
        for y in 0..crun {
            let bx = read_u8(page, bx_offset + y)? as usize * 2;
            let grpprl = if bx == 0 {
                Bytes::new()
            } else {
                let size = read_u8(page, bx)? as usize;
                Bytes::copy_from_slice(read_slice(page, bx + 1, size)?)
            };
            entries.push(FkpEntry {
                fc_start: fcs[y],
                fc_end: fcs[y + 1],
                grpprl,
            });
        }
        Ok(Self { entries })
    }

    /// Get the number of entries in this FKP.
    #[inline]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Get all entries.
    #[inline]
    pub fn entries(&self) -> &[FkpEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<FkpEntry> {
        self.entries
    }
}

/// PAPX FKP (Paragraph Property Formatted Disk Page).
///
/// Like the CHPX page, but each offset is followed by paragraph height
/// information (BX entries of 13 bytes, 7 in Word 6) and PAPX lengths count
/// words.
#[derive(Debug, Clone)]
pub struct PapxFkp {
    entries: Vec<FkpEntry>,
}

impl PapxFkp {
    /// Parse a PAPX FKP from a 512-byte page.
    pub fn parse(page: &[u8], version: FormatVersion) -> Result<Self> {
        let cpara = run_count(page)?;
        let fcs = read_boundaries(page, cpara)?;
        let bx_offset = (cpara + 1) * 4;
        let bx_size = match version {
            FormatVersion::Word97 => 13,
            FormatVersion::Word6 => 7,
        };

        let mut entries = Vec::with_capacity(cpara);
        for y in 0..cpara {
            let mut bx = read_u8(page, bx_offset + y * bx_size)? as usize * 2;
            let mut size = read_u8(page, bx)? as usize * 2;
            if size == 0 {
                // Padded form: the real length word follows.
                bx += 1;
                size = read_u8(page, bx)? as usize * 2;
            } else {
                size -= 1;
            }
            bx += 1;
            let grpprl = Bytes::copy_from_slice(read_slice(page, bx, size)?);
            entries.push(FkpEntry {
                fc_start: fcs[y],
                fc_end: fcs[y + 1],
                grpprl,
            });
        }
        Ok(Self { entries })
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn entries(&self) -> &[FkpEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<FkpEntry> {
        self.entries
    }
}

/// Which property an FKP bin table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinKind {
    Character,
    Paragraph,
}

/// Bin table (PlcBte): file position ranges and the FKP page of each.
#[derive(Debug, Clone)]
pub struct BinTable {
    pages: Vec<u32>,
    kind: BinKind,
    version: FormatVersion,
}

impl BinTable {
    /// Parse a bin table from the table stream bytes at its FIB location.
    pub fn parse(plcf: &[u8], kind: BinKind, version: FormatVersion) -> Result<Self> {
        let element_size = match version {
            FormatVersion::Word97 => 4,
            FormatVersion::Word6 => 2,
        };
        let plcf = Plcf::new(plcf, element_size);
        let mut pages = Vec::with_capacity(plcf.count());
        for i in 0..plcf.count() {
            let element = plcf.element(i)?;
            let pn = match version {
                FormatVersion::Word97 => read_u32_le(element, 0)? & 0x003F_FFFF,
                FormatVersion::Word6 => read_u16_le(element, 0)? as u32,
            };
            pages.push(pn);
        }
        Ok(Self { pages, kind, version })
    }

    /// FKP page numbers in table order.
    pub fn pages(&self) -> &[u32] {
        &self.pages
    }

    /// Read every referenced FKP from the WordDocument stream and index its
    /// runs by file position.
    pub fn read_nodes(&self, word_document: &[u8]) -> Result<RangeIndex<Bytes>> {
        let mut index = RangeIndex::new();
        for &pn in &self.pages {
            let offset = pn as usize * FKP_PAGE_SIZE;
            let page = read_slice(word_document, offset, FKP_PAGE_SIZE)?;
            let entries = match self.kind {
                BinKind::Character => ChpxFkp::parse(page)?.into_entries(),
                BinKind::Paragraph => PapxFkp::parse(page, self.version)?.into_entries(),
            };
            for entry in entries {
                index.insert(PropertyNode::new(entry.fc_start, entry.fc_end, entry.grpprl));
            }
        }
        log::debug!(
            "{:?} bin table: {} runs from {} pages",
            self.kind,
            index.len(),
            self.pages.len()
        );
        Ok(index)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a CHPX page for `runs` of `(fc_start, fc_end, chpx)`; runs must
    /// be contiguous.
    pub(crate) fn chpx_page(runs: &[(u32, u32, &[u8])]) -> Vec<u8> {
        let mut page = vec![0u8; FKP_PAGE_SIZE];
        let crun = runs.len();
        for (i, (start, _, _)) in runs.iter().enumerate() {
            page[i * 4..i * 4 + 4].copy_from_slice(&start.to_le_bytes());
        }
        if let Some((_, end, _)) = runs.last() {
            page[crun * 4..crun * 4 + 4].copy_from_slice(&end.to_le_bytes());
        }
        let mut top = FKP_PAGE_SIZE - 1;
        for (i, (_, _, chpx)) in runs.iter().enumerate() {
            if chpx.is_empty() {
                continue;
            }
            top -= chpx.len() + 1;
            top &= !1;
            page[top] = chpx.len() as u8;
            page[top + 1..top + 1 + chpx.len()].copy_from_slice(chpx);
            page[(crun + 1) * 4 + i] = (top / 2) as u8;
        }
        page[FKP_PAGE_SIZE - 1] = crun as u8;
        page
    }

    /// Build a Word 97 PAPX page. Each PAPX must have an even length
    /// (istd prefix plus sprms, padded by the caller).
    pub(crate) fn papx_page(runs: &[(u32, u32, &[u8])]) -> Vec<u8> {
        let mut page = vec![0u8; FKP_PAGE_SIZE];
        let cpara = runs.len();
        for (i, (start, _, _)) in runs.iter().enumerate() {
            page[i * 4..i * 4 + 4].copy_from_slice(&start.to_le_bytes());
        }
        if let Some((_, end, _)) = runs.last() {
            page[cpara * 4..cpara * 4 + 4].copy_from_slice(&end.to_le_bytes());
        }
        let mut top = FKP_PAGE_SIZE - 1;
        for (i, (_, _, papx)) in runs.iter().enumerate() {
            // Padded form: zero byte, word count byte, then the PAPX.
            top -= papx.len() + 2;
            top &= !1;
            page[top] = 0;
            page[top + 1] = (papx.len() / 2) as u8;
            page[top + 2..top + 2 + papx.len()].copy_from_slice(papx);
            page[(cpara + 1) * 4 + i * 13] = (top / 2) as u8;
        }
        page[FKP_PAGE_SIZE - 1] = cpara as u8;
        page
    }

    #[test]
    fn test_chpx_page() {
        let page = chpx_page(&[(0x400, 0x40A, &[0x35, 0x08, 0x01]), (0x40A, 0x420, &[])]);
        let fkp = ChpxFkp::parse(&page).unwrap();
        assert_eq!(fkp.count(), 2);
        assert_eq!(fkp.entries()[0].fc_start, 0x400);
        assert_eq!(fkp.entries()[0].fc_end, 0x40A);
        assert_eq!(&fkp.entries()[0].grpprl[..], &[0x35, 0x08, 0x01]);
        assert!(fkp.entries()[1].grpprl.is_empty());
    }

    #[test]
    fn test_papx_page_both_length_forms() {
        let mut page = papx_page(&[(0x400, 0x410, &[0x00, 0x00, 0x03, 0x24, 0x01, 0x00])]);
        let fkp = PapxFkp::parse(&page, FormatVersion::Word97).unwrap();
        assert_eq!(&fkp.entries()[0].grpprl[..], &[0x00, 0x00, 0x03, 0x24, 0x01, 0x00]);

        // Short form: count byte 2 * 3 - 1 = 5 bytes follow directly.
        let bx = page[8] as usize * 2;
        page[bx] = 3;
        page.copy_within(bx + 2..bx + 7, bx + 1);
        let fkp = PapxFkp::parse(&page, FormatVersion::Word97).unwrap();
        assert_eq!(&fkp.entries()[0].grpprl[..], &[0x00, 0x00, 0x03, 0x24, 0x01]);
    }

    #[test]
    fn test_wrong_page_size() {
        assert!(ChpxFkp::parse(&[0u8; 100]).is_err());
    }

    #[test]
    fn test_bin_table_reads_pages() {
        let mut word_document = vec![0u8; FKP_PAGE_SIZE * 3];
        let page = chpx_page(&[(0x400, 0x410, &[0x35, 0x08, 0x01])]);
        word_document[FKP_PAGE_SIZE * 2..].copy_from_slice(&page);

        let mut plcf = Vec::new();
        plcf.extend_from_slice(&0x400u32.to_le_bytes());
        plcf.extend_from_slice(&0x410u32.to_le_bytes());
        plcf.extend_from_slice(&2u32.to_le_bytes());

        let table = BinTable::parse(&plcf, BinKind::Character, FormatVersion::Word97).unwrap();
        assert_eq!(table.pages(), &[2]);
        let nodes = table.read_nodes(&word_document).unwrap();
        let found = nodes.find(0x400, 0x401);
        assert_eq!(found.len(), 1);
        assert_eq!(&found[0].payload[..], &[0x35, 0x08, 0x01]);
    }

    #[test]
    fn test_page_beyond_stream() {
        let mut plcf = Vec::new();
        plcf.extend_from_slice(&0u32.to_le_bytes());
        plcf.extend_from_slice(&10u32.to_le_bytes());
        plcf.extend_from_slice(&7u32.to_le_bytes());
        let table = BinTable::parse(&plcf, BinKind::Paragraph, FormatVersion::Word97).unwrap();
        assert!(table.read_nodes(&[0u8; 512]).is_err());
    }
}
