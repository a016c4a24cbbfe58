//! Constants for the OLE2 compound file layout.

/// Magic bytes at the start of every compound file.
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Sector ("big block") size.
pub const SECTOR_SIZE: usize = 512;
/// Mini sector ("small block") size.
pub const MINI_SECTOR_SIZE: usize = 64;
/// Size of the header block.
pub const HEADER_SIZE: usize = 512;
/// Size of one directory entry.
pub const DIRENTRY_SIZE: usize = 128;
/// Directory entries per sector.
pub const DIRENTRIES_PER_SECTOR: usize = SECTOR_SIZE / DIRENTRY_SIZE;
/// Depot entries per sector.
pub const DEPOT_ENTRIES_PER_SECTOR: usize = SECTOR_SIZE / 4;
/// Depot sector numbers held in the header.
pub const HEADER_BBD_ENTRIES: usize = 109;
/// Depot sector numbers held in each extension sector; the last slot links
/// to the next extension sector.
pub const XBBD_ENTRIES_PER_SECTOR: usize = DEPOT_ENTRIES_PER_SECTOR - 1;
/// Streams shorter than this live in the mini stream unless the header says
/// otherwise.
pub const DEFAULT_MINI_STREAM_CUTOFF: u32 = 4096;

// Header field offsets
pub const HDR_NUM_BBD_BLOCKS: usize = 0x2C;
pub const HDR_ROOT_START: usize = 0x30;
pub const HDR_MINI_CUTOFF: usize = 0x38;
pub const HDR_SBD_START: usize = 0x3C;
pub const HDR_XBBD_START: usize = 0x44;
pub const HDR_XBBD_COUNT: usize = 0x48;
pub const HDR_BBD_LIST: usize = 0x4C;

// Sector sentinels
pub const DIFSECT: u32 = 0xFFFF_FFFC;
pub const FATSECT: u32 = 0xFFFF_FFFD;
pub const ENDOFCHAIN: u32 = 0xFFFF_FFFE;
pub const FREESECT: u32 = 0xFFFF_FFFF;

/// Unused sibling/child pointer in a directory entry.
pub const NOSTREAM: u32 = 0xFFFF_FFFF;

// Directory entry types
pub const STGTY_EMPTY: u8 = 0;
pub const STGTY_STORAGE: u8 = 1;
pub const STGTY_STREAM: u8 = 2;
pub const STGTY_ROOT: u8 = 5;
