use super::consts::*;
use crate::config::{ParseOptions, SmallDepotLayout};
use fixedbitset::FixedBitSet;
use std::io::{self, Read, Seek, SeekFrom};
use thiserror::Error;
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw compound file header (512 bytes).
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawHeader {
    magic: [u8; 8],
    clsid: [u8; 16],
    minor_version: U16<LE>,
    major_version: U16<LE>,
    byte_order: U16<LE>,
    sector_shift: U16<LE>,
    mini_sector_shift: U16<LE>,
    reserved: [u8; 6],
    num_dir_sectors: U32<LE>,
    /// Number of big block depot sectors (0x2C)
    num_bbd_blocks: U32<LE>,
    /// First sector of the directory (0x30)
    root_start: U32<LE>,
    transaction: U32<LE>,
    /// Streams below this size live in the mini stream (0x38)
    mini_cutoff: U32<LE>,
    /// First sector of the small block depot (0x3C)
    sbd_start: U32<LE>,
    num_sbd_blocks: U32<LE>,
    /// First depot extension sector (0x44)
    xbbd_start: U32<LE>,
    /// Number of depot extension sectors (0x48)
    num_xbbd_blocks: U32<LE>,
    /// First 109 depot sector numbers (0x4C)
    bbd_list: [U32<LE>; HEADER_BBD_ENTRIES],
}

/// Raw directory entry structure (128 bytes)
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    /// Entry type (1 = storage, 2 = stream, 5 = root)
    entry_type: u8,
    /// Node color (0 = red, 1 = black)
    node_color: u8,
    /// Left sibling
    sid_left: U32<LE>,
    /// Right sibling
    sid_right: U32<LE>,
    /// First child
    sid_child: U32<LE>,
    clsid: [u8; 16],
    state_bits: U32<LE>,
    creation_time: U64<LE>,
    modified_time: U64<LE>,
    /// Starting sector
    start_sector: U32<LE>,
    /// Stream size; only the low 32 bits are meaningful with 512-byte sectors
    stream_size: U64<LE>,
}

/// Error types for compound file parsing
#[derive(Debug, Error)]
pub enum OleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Not a compound file")]
    NotACompoundFile,
    #[error("Corrupt chain starting at sector {start}: {reason}")]
    CorruptChain { start: u32, reason: String },
    #[error("Stream not found: {0}")]
    StreamNotFound(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl OleError {
    fn corrupt_chain(start: u32, reason: impl Into<String>) -> Self {
        OleError::CorruptChain {
            start,
            reason: reason.into(),
        }
    }
}

/// One directory entry (stream, storage or root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySetEntry {
    /// Index in the directory
    pub sid: u32,
    /// Entry name
    pub name: String,
    /// Entry type (`STGTY_*`)
    pub entry_type: u8,
    /// Left sibling in the directory tree
    pub prev: u32,
    /// Right sibling in the directory tree
    pub next: u32,
    /// First child (storages only)
    pub child: u32,
    /// First sector of the stream
    pub start_block: u32,
    /// Size of the stream in bytes
    pub size: u32,
}

impl PropertySetEntry {
    /// Whether this entry holds stream data.
    #[inline]
    pub fn is_stream(&self) -> bool {
        self.entry_type == STGTY_STREAM
    }

    /// Whether this entry is a storage or the root.
    #[inline]
    pub fn is_storage(&self) -> bool {
        self.entry_type == STGTY_STORAGE || self.entry_type == STGTY_ROOT
    }
}

/// An OLE2 compound file.
///
/// The depots and the directory are read once in [`CompoundFile::open`];
/// afterwards the reader is only used to fetch stream sectors.
#[derive(Debug)]
pub struct CompoundFile<R: Read + Seek> {
    reader: R,
    file_size: u64,
    mini_cutoff: u32,
    big_depot: Vec<u32>,
    small_depot: Vec<u32>,
    root_chain: Vec<u32>,
    entries: Vec<Option<PropertySetEntry>>,
    /// Mini stream data (loaded on first small-stream read)
    mini_stream: Option<Vec<u8>>,
}

impl<R: Read + Seek> CompoundFile<R> {
    /// Open a compound file with default options.
    pub fn open(reader: R) -> Result<Self, OleError> {
        Self::open_with_options(reader, &ParseOptions::default())
    }

    /// Open a compound file.
    ///
    /// Fails with [`OleError::NotACompoundFile`] when the magic does not
    /// match and with [`OleError::CorruptChain`] when a depot or directory
    /// chain cannot be followed.
    pub fn open_with_options(mut reader: R, options: &ParseOptions) -> Result<Self, OleError> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if file_size < HEADER_SIZE as u64 {
            return Err(OleError::NotACompoundFile);
        }

        let mut block = [0u8; HEADER_SIZE];
        reader.read_exact(&mut block)?;
        let header =
            RawHeader::read_from_bytes(&block[..]).map_err(|_| OleError::NotACompoundFile)?;
        if &header.magic != MAGIC {
            return Err(OleError::NotACompoundFile);
        }

        let mini_cutoff = match header.mini_cutoff.get() {
            0 => DEFAULT_MINI_STREAM_CUTOFF,
            cutoff => cutoff,
        };

        let mut file = CompoundFile {
            reader,
            file_size,
            mini_cutoff,
            big_depot: Vec::new(),
            small_depot: Vec::new(),
            root_chain: Vec::new(),
            entries: Vec::new(),
            mini_stream: None,
        };

        let bbd_list = file.read_bbd_list(&header)?;
        file.load_big_depot(&bbd_list)?;
        file.load_small_depot(header.sbd_start.get(), options.small_depot_layout)?;
        file.root_chain = read_chain(&file.big_depot, header.root_start.get())?;
        file.load_directory()?;

        log::debug!(
            "compound file: {} depot entries, {} small depot entries, {} directory entries",
            file.big_depot.len(),
            file.small_depot.len(),
            file.entries.len()
        );
        Ok(file)
    }

    /// Number of whole or partial sectors after the header.
    fn sector_count(&self) -> usize {
        (self.file_size.saturating_sub(HEADER_SIZE as u64)).div_ceil(SECTOR_SIZE as u64) as usize
    }

    /// Collect the depot sector numbers from the header and, past 109, from
    /// the extension sectors. The extension chain is walked by raw sector
    /// address since no depot exists yet.
    fn read_bbd_list(&mut self, header: &RawHeader) -> Result<Vec<u32>, OleError> {
        let count = header.num_bbd_blocks.get() as usize;
        let total_sectors = self.sector_count();
        if count > total_sectors {
            return Err(OleError::InvalidFormat(format!(
                "header claims {count} depot sectors but the file holds {total_sectors}"
            )));
        }

        let mut list: Vec<u32> = header
            .bbd_list
            .iter()
            .take(count.min(HEADER_BBD_ENTRIES))
            .map(|v| v.get())
            .collect();

        if count > HEADER_BBD_ENTRIES {
            let start = header.xbbd_start.get();
            let mut sector = start;
            let mut visited = FixedBitSet::with_capacity(total_sectors);

            for _ in 0..header.num_xbbd_blocks.get() {
                if list.len() >= count {
                    break;
                }
                let index = sector as usize;
                if index >= total_sectors {
                    return Err(OleError::corrupt_chain(
                        start,
                        format!("extension sector {sector} lies outside the file"),
                    ));
                }
                if visited.put(index) {
                    return Err(OleError::corrupt_chain(
                        start,
                        format!("extension sector {sector} visited twice"),
                    ));
                }

                let data = self.read_sector(sector, start)?;
                let wanted = XBBD_ENTRIES_PER_SECTOR.min(count - list.len());
                list.extend(data.chunks_exact(4).take(wanted).map(le_u32));
                sector = le_u32(&data[XBBD_ENTRIES_PER_SECTOR * 4..SECTOR_SIZE]);
            }

            if list.len() < count {
                return Err(OleError::corrupt_chain(
                    start,
                    format!(
                        "extension chain ended after {} of {count} depot sectors",
                        list.len()
                    ),
                ));
            }
        }

        Ok(list)
    }

    /// Load the big block depot: 128 entries per depot sector, in list order.
    fn load_big_depot(&mut self, bbd_list: &[u32]) -> Result<(), OleError> {
        let mut depot = Vec::with_capacity(bbd_list.len() * DEPOT_ENTRIES_PER_SECTOR);
        for &sector in bbd_list {
            let data = self.read_sector(sector, sector)?;
            depot.extend(data.chunks_exact(4).map(le_u32));
        }
        self.big_depot = depot;
        Ok(())
    }

    /// Load the small block depot from its big-block chain.
    fn load_small_depot(&mut self, start: u32, layout: SmallDepotLayout) -> Result<(), OleError> {
        if start == ENDOFCHAIN || start == FREESECT {
            return Ok(());
        }

        let chain = read_chain(&self.big_depot, start)?;
        let mut depot = vec![FREESECT; chain.len() * DEPOT_ENTRIES_PER_SECTOR];
        for (i, &sector) in chain.iter().enumerate() {
            let data = self.read_sector(sector, start)?;
            let base = match layout {
                SmallDepotLayout::Overlay => 0,
                SmallDepotLayout::Sequential => i * DEPOT_ENTRIES_PER_SECTOR,
            };
            for (slot, chunk) in data.chunks_exact(4).enumerate() {
                depot[base + slot] = le_u32(chunk);
            }
        }
        if layout == SmallDepotLayout::Overlay && chain.len() > 1 {
            log::debug!(
                "small depot spans {} sectors; overlay layout keeps only the last",
                chain.len()
            );
        }
        self.small_depot = depot;
        Ok(())
    }

    /// Parse every directory entry along the root chain.
    fn load_directory(&mut self) -> Result<(), OleError> {
        let root_start = self.root_chain.first().copied().unwrap_or(ENDOFCHAIN);
        let chain = self.root_chain.clone();
        let mut entries = Vec::with_capacity(chain.len() * DIRENTRIES_PER_SECTOR);

        for sector in chain {
            let data = self.read_sector(sector, root_start)?;
            for raw in data.chunks_exact(DIRENTRY_SIZE) {
                let sid = entries.len() as u32;
                entries.push(parse_directory_entry(raw, sid)?);
            }
        }

        self.entries = entries;
        Ok(())
    }

    /// Read one sector. A sector that starts inside the file but runs past
    /// its end is zero-padded.
    fn read_sector(&mut self, sector: u32, chain_start: u32) -> Result<Vec<u8>, OleError> {
        let position = (sector as u64 + 1) * SECTOR_SIZE as u64;
        if position >= self.file_size {
            return Err(OleError::corrupt_chain(
                chain_start,
                format!("sector {sector} lies beyond the end of the file"),
            ));
        }

        self.reader.seek(SeekFrom::Start(position))?;
        let mut buffer = Vec::with_capacity(SECTOR_SIZE);
        self.reader
            .by_ref()
            .take(SECTOR_SIZE as u64)
            .read_to_end(&mut buffer)?;
        buffer.resize(SECTOR_SIZE, 0);
        Ok(buffer)
    }

    /// Mini stream data, read from the root entry's big-block chain.
    fn mini_stream(&mut self) -> Result<&[u8], OleError> {
        if self.mini_stream.is_none() {
            let root_start = self
                .root()
                .map(|root| root.start_block)
                .ok_or_else(|| OleError::InvalidFormat("missing root entry".to_string()))?;
            let chain = read_chain(&self.big_depot, root_start)?;
            let mut data = Vec::with_capacity(chain.len() * SECTOR_SIZE);
            for sector in chain {
                data.extend_from_slice(&self.read_sector(sector, root_start)?);
            }
            self.mini_stream = Some(data);
        }
        Ok(self.mini_stream.as_deref().unwrap_or_default())
    }

    /// Read the named stream.
    ///
    /// Streams smaller than the mini stream cutoff are read from the mini
    /// stream through the small block depot when the file has one; all
    /// others from sectors through the big block depot. The walk stops once enough sectors for the
    /// declared size are collected and the result is truncated to that size.
    pub fn get_stream(&mut self, name: &str) -> Result<Vec<u8>, OleError> {
        let entry = self
            .entry(name)
            .cloned()
            .ok_or_else(|| OleError::StreamNotFound(name.to_string()))?;
        if !entry.is_stream() {
            return Err(OleError::InvalidFormat(format!("{name} is not a stream")));
        }
        self.read_entry(&entry)
    }

    fn read_entry(&mut self, entry: &PropertySetEntry) -> Result<Vec<u8>, OleError> {
        let size = entry.size as usize;
        if size == 0 {
            return Ok(Vec::new());
        }

        // Without a small depot every stream lives on the big chain.
        let in_mini_stream = entry.size < self.mini_cutoff && !self.small_depot.is_empty();
        let mut data = if in_mini_stream {
            let needed = size.div_ceil(MINI_SECTOR_SIZE);
            let chain = walk_chain(&self.small_depot, entry.start_block, needed)?;
            let start = entry.start_block;
            let mini = self.mini_stream()?;
            let mut out = Vec::with_capacity(chain.len() * MINI_SECTOR_SIZE);
            for sector in chain {
                let position = sector as usize * MINI_SECTOR_SIZE;
                let block = mini
                    .get(position..position + MINI_SECTOR_SIZE)
                    .ok_or_else(|| {
                        OleError::corrupt_chain(
                            start,
                            format!("mini sector {sector} lies beyond the mini stream"),
                        )
                    })?;
                out.extend_from_slice(block);
            }
            out
        } else {
            let needed = size.div_ceil(SECTOR_SIZE);
            let chain = walk_chain(&self.big_depot, entry.start_block, needed)?;
            let mut out = Vec::with_capacity(chain.len() * SECTOR_SIZE);
            for sector in chain {
                out.extend_from_slice(&self.read_sector(sector, entry.start_block)?);
            }
            out
        };

        if data.len() < size {
            return Err(OleError::corrupt_chain(
                entry.start_block,
                format!("chain holds {} of {size} bytes", data.len()),
            ));
        }
        data.truncate(size);
        Ok(data)
    }

    /// The root entry.
    pub fn root(&self) -> Option<&PropertySetEntry> {
        self.entries
            .first()
            .and_then(|entry| entry.as_ref())
            .filter(|entry| entry.entry_type == STGTY_ROOT)
    }

    /// Find an entry by name: the root storage's children first, then any
    /// entry in the directory. Names compare case-insensitively.
    pub fn entry(&self, name: &str) -> Option<&PropertySetEntry> {
        self.root()
            .and_then(|root| self.find_child_by_name(root.child, name))
            .or_else(|| self.entries().find(|entry| names_match(&entry.name, name)))
    }

    /// Search a sibling tree without trusting it to be acyclic.
    fn find_child_by_name(&self, first: u32, name: &str) -> Option<&PropertySetEntry> {
        let mut visited = FixedBitSet::with_capacity(self.entries.len());
        let mut stack = vec![first];

        while let Some(sid) = stack.pop() {
            let index = sid as usize;
            if sid == NOSTREAM || index >= self.entries.len() || visited.put(index) {
                continue;
            }
            let Some(entry) = self.entries[index].as_ref() else {
                continue;
            };
            if names_match(&entry.name, name) {
                return Some(entry);
            }
            stack.push(entry.next);
            stack.push(entry.prev);
        }
        None
    }

    /// All non-empty directory entries in directory order.
    pub fn entries(&self) -> impl Iterator<Item = &PropertySetEntry> {
        self.entries.iter().flatten()
    }

    /// Names of all stream entries.
    pub fn list_streams(&self) -> Vec<String> {
        self.entries()
            .filter(|entry| entry.is_stream())
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Check if a stream or storage exists.
    pub fn exists(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// The big block depot.
    pub fn big_depot(&self) -> &[u32] {
        &self.big_depot
    }

    /// The small block depot.
    pub fn small_depot(&self) -> &[u32] {
        &self.small_depot
    }

    /// Sectors holding the directory.
    pub fn root_chain(&self) -> &[u32] {
        &self.root_chain
    }

    /// Streams below this size are stored in the mini stream.
    pub fn mini_stream_cutoff(&self) -> u32 {
        self.mini_cutoff
    }

    /// Release the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn parse_directory_entry(data: &[u8], sid: u32) -> Result<Option<PropertySetEntry>, OleError> {
    let raw = RawDirectoryEntry::read_from_bytes(data)
        .map_err(|_| OleError::InvalidFormat("failed to parse directory entry".to_string()))?;
    if raw.entry_type == STGTY_EMPTY {
        return Ok(None);
    }

    let units = (raw.name_len.get() as usize / 2)
        .saturating_sub(1)
        .min(raw.name.len() / 2);
    let name = decode_utf16_units(&raw.name[..units * 2]);

    Ok(Some(PropertySetEntry {
        sid,
        name,
        entry_type: raw.entry_type,
        prev: raw.sid_left.get(),
        next: raw.sid_right.get(),
        child: raw.sid_child.get(),
        start_block: raw.start_sector.get(),
        size: (raw.stream_size.get() & 0xFFFF_FFFF) as u32,
    }))
}

/// Follow a chain through a depot until the end-of-chain marker.
///
/// An index outside the depot, a free or reserved marker inside the chain,
/// or a sector seen twice is reported as [`OleError::CorruptChain`]. The walk
/// takes at most `depot.len() + 1` steps.
pub fn read_chain(depot: &[u32], start: u32) -> Result<Vec<u32>, OleError> {
    walk_chain(depot, start, usize::MAX)
}

/// [`read_chain`] that stops after `limit` sectors.
fn walk_chain(depot: &[u32], start: u32, limit: usize) -> Result<Vec<u32>, OleError> {
    let mut chain = Vec::new();
    let mut visited = FixedBitSet::with_capacity(depot.len());
    let mut sector = start;

    while sector != ENDOFCHAIN && chain.len() < limit {
        if matches!(sector, FREESECT | FATSECT | DIFSECT) {
            return Err(OleError::corrupt_chain(
                start,
                format!("reserved marker 0x{sector:08X} inside chain"),
            ));
        }
        let index = sector as usize;
        if index >= depot.len() {
            return Err(OleError::corrupt_chain(
                start,
                format!("sector {sector} outside depot of {} entries", depot.len()),
            ));
        }
        if visited.put(index) {
            return Err(OleError::corrupt_chain(
                start,
                format!("sector {sector} visited twice"),
            ));
        }
        chain.push(sector);
        sector = depot[index];
    }

    Ok(chain)
}

#[inline]
fn le_u32(chunk: &[u8]) -> u32 {
    U32::<LE>::read_from_bytes(chunk).map_or(0, |v| v.get())
}

fn decode_utf16_units(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Check if data starts with the compound file magic and holds a header.
pub fn is_compound_file(data: &[u8]) -> bool {
    data.len() >= HEADER_SIZE && data.starts_with(MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::fixtures::{CfbBuilder, dir_entry, header, u32_sector};
    use proptest::prelude::*;
    use std::io::Cursor;

    /// Header, depot at sector 0, directory at sector 1 and a 1024-byte
    /// `WordDocument` stream over sectors 2 and 3.
    fn two_sector_stream_file() -> (Vec<u8>, Vec<u8>) {
        let payload: Vec<u8> = (0..1024u32).map(|i| (i % 251) as u8).collect();
        let mut file = header(1, &[0], 1, DEFAULT_MINI_STREAM_CUTOFF, ENDOFCHAIN, ENDOFCHAIN, 0);
        file.extend(u32_sector(&[FATSECT, ENDOFCHAIN, 3, ENDOFCHAIN], FREESECT));
        let mut dir = Vec::new();
        dir.extend_from_slice(&dir_entry(
            "Root Entry",
            STGTY_ROOT,
            NOSTREAM,
            NOSTREAM,
            1,
            ENDOFCHAIN,
            0,
        ));
        dir.extend_from_slice(&dir_entry(
            "WordDocument",
            STGTY_STREAM,
            NOSTREAM,
            NOSTREAM,
            NOSTREAM,
            2,
            1024,
        ));
        dir.resize(SECTOR_SIZE, 0);
        file.extend(dir);
        file.extend_from_slice(&payload);
        (file, payload)
    }

    #[test]
    fn test_reads_stream_over_two_sectors() {
        let (bytes, payload) = two_sector_stream_file();
        let mut cfb = CompoundFile::open(Cursor::new(bytes)).unwrap();
        assert_eq!(cfb.root_chain(), &[1]);
        assert_eq!(read_chain(cfb.big_depot(), 2).unwrap(), vec![2, 3]);
        let stream = cfb.get_stream("WordDocument").unwrap();
        assert_eq!(stream.len(), 1024);
        assert_eq!(stream, payload);
        assert!(cfb.exists("worddocument"));
    }

    #[test]
    fn test_rejects_bad_magic_and_short_input() {
        let (mut bytes, _) = two_sector_stream_file();
        bytes[0] = 0;
        assert!(matches!(
            CompoundFile::open(Cursor::new(bytes)),
            Err(OleError::NotACompoundFile)
        ));
        assert!(matches!(
            CompoundFile::open(Cursor::new(vec![0xD0u8; 100])),
            Err(OleError::NotACompoundFile)
        ));
    }

    #[test]
    fn test_missing_stream() {
        let (bytes, _) = two_sector_stream_file();
        let mut cfb = CompoundFile::open(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            cfb.get_stream("1Table"),
            Err(OleError::StreamNotFound(name)) if name == "1Table"
        ));
    }

    #[test]
    fn test_declared_size_longer_than_chain() {
        let (mut bytes, _) = two_sector_stream_file();
        // Directory sector starts at file offset 1024; entry 1 size field at 0x78.
        let size_offset = 1024 + DIRENTRY_SIZE + 0x78;
        bytes[size_offset..size_offset + 4].copy_from_slice(&5000u32.to_le_bytes());
        let mut cfb = CompoundFile::open(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            cfb.get_stream("WordDocument"),
            Err(OleError::CorruptChain { start: 2, .. })
        ));
    }

    #[test]
    fn test_chain_errors() {
        let depot = [1, 2, 0];
        assert!(matches!(
            read_chain(&depot, 0),
            Err(OleError::CorruptChain { start: 0, .. })
        ));
        assert!(read_chain(&[5], 0).is_err());
        assert!(read_chain(&[FREESECT], 0).is_err());
        assert_eq!(read_chain(&[1, ENDOFCHAIN], 0).unwrap(), vec![0, 1]);
        assert!(read_chain(&[], ENDOFCHAIN).unwrap().is_empty());
    }

    #[test]
    fn test_builder_round_trip_small_and_big() {
        let small = b"tiny stream".to_vec();
        let big: Vec<u8> = (0..5000u32).map(|i| (i * 7) as u8).collect();
        let bytes = CfbBuilder::new()
            .stream("Small", small.clone())
            .stream("Big", big.clone())
            .build();
        let mut cfb = CompoundFile::open(Cursor::new(bytes)).unwrap();
        assert_eq!(cfb.get_stream("Small").unwrap(), small);
        assert_eq!(cfb.get_stream("Big").unwrap(), big);
        let mut names = cfb.list_streams();
        names.sort();
        assert_eq!(names, vec!["Big".to_string(), "Small".to_string()]);
    }

    #[test]
    fn test_small_depot_layouts() {
        let streams: Vec<Vec<u8>> = (0..3u8).map(|n| vec![n + 1; 4000]).collect();
        let bytes = CfbBuilder::new()
            .stream("A", streams[0].clone())
            .stream("B", streams[1].clone())
            .stream("C", streams[2].clone())
            .build();

        let overlay = CompoundFile::open(Cursor::new(bytes.clone())).unwrap();
        assert_eq!(overlay.small_depot().len(), 256);
        assert!(overlay.small_depot()[128..].iter().all(|&v| v == FREESECT));

        let options = ParseOptions::new().with_small_depot_layout(SmallDepotLayout::Sequential);
        let mut sequential = CompoundFile::open_with_options(Cursor::new(bytes), &options).unwrap();
        assert_eq!(sequential.get_stream("C").unwrap(), streams[2]);
        assert_eq!(sequential.get_stream("A").unwrap(), streams[0]);
    }

    #[test]
    fn test_depot_extension_sectors() {
        // 110 depot sectors at 0..=109, extension sector 110, directory 111, data 112.
        let mut depot = vec![FATSECT; 110];
        depot.extend([DIFSECT, ENDOFCHAIN, ENDOFCHAIN]);
        let list: Vec<u32> = (0..109).collect();
        let mut file = header(110, &list, 111, 512, ENDOFCHAIN, 110, 1);
        file.extend(u32_sector(&depot, FREESECT));
        for _ in 1..110 {
            file.extend(u32_sector(&[], FREESECT));
        }
        let mut xbbd = u32_sector(&[109], FREESECT);
        xbbd[508..512].copy_from_slice(&ENDOFCHAIN.to_le_bytes());
        file.extend(xbbd);
        let mut dir = Vec::new();
        dir.extend_from_slice(&dir_entry(
            "Root Entry",
            STGTY_ROOT,
            NOSTREAM,
            NOSTREAM,
            1,
            ENDOFCHAIN,
            0,
        ));
        dir.extend_from_slice(&dir_entry(
            "Data",
            STGTY_STREAM,
            NOSTREAM,
            NOSTREAM,
            NOSTREAM,
            112,
            512,
        ));
        dir.resize(SECTOR_SIZE, 0);
        file.extend(dir);
        file.extend(vec![0xAB; SECTOR_SIZE]);

        let mut cfb = CompoundFile::open(Cursor::new(file)).unwrap();
        assert_eq!(cfb.big_depot().len(), 110 * 128);
        assert_eq!(cfb.mini_stream_cutoff(), 512);
        assert_eq!(cfb.get_stream("Data").unwrap(), vec![0xAB; SECTOR_SIZE]);
    }

    #[test]
    fn test_into_inner_releases_reader() {
        let (bytes, _) = two_sector_stream_file();
        let len = bytes.len();
        let cfb = CompoundFile::open(Cursor::new(bytes)).unwrap();
        assert_eq!(cfb.into_inner().into_inner().len(), len);
    }

    #[test]
    fn test_is_compound_file() {
        let (bytes, _) = two_sector_stream_file();
        assert!(is_compound_file(&bytes));
        assert!(!is_compound_file(&bytes[..100]));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_read_chain_terminates(
            depot in proptest::collection::vec(
                prop_oneof![0u32..40, Just(ENDOFCHAIN), Just(FREESECT)],
                0..40,
            ),
            start in 0u32..40,
        ) {
            if let Ok(chain) = read_chain(&depot, start) {
                prop_assert!(chain.len() <= depot.len());
                let mut seen = chain.clone();
                seen.sort_unstable();
                seen.dedup();
                prop_assert_eq!(seen.len(), chain.len());
            }
        }
    }
}
