//! In-memory compound file writer for tests.
//!
//! Produces version 3 files (512-byte sectors) with a single depot sector,
//! which is plenty for synthetic documents.

use super::consts::*;

fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Encode one 128-byte directory entry.
pub fn dir_entry(
    name: &str,
    entry_type: u8,
    left: u32,
    right: u32,
    child: u32,
    start: u32,
    size: u32,
) -> [u8; DIRENTRY_SIZE] {
    let mut entry = [0u8; DIRENTRY_SIZE];
    let units: Vec<u16> = name.encode_utf16().collect();
    for (i, unit) in units.iter().enumerate() {
        put_u16(&mut entry, i * 2, *unit);
    }
    put_u16(&mut entry, 0x40, ((units.len() + 1) * 2) as u16);
    entry[0x42] = entry_type;
    entry[0x43] = 1;
    put_u32(&mut entry, 0x44, left);
    put_u32(&mut entry, 0x48, right);
    put_u32(&mut entry, 0x4C, child);
    put_u32(&mut entry, 0x74, start);
    put_u32(&mut entry, 0x78, size);
    entry
}

/// Encode a header block. `bbd_list` entries past its length are free.
pub fn header(
    num_bbd: u32,
    bbd_list: &[u32],
    root_start: u32,
    mini_cutoff: u32,
    sbd_start: u32,
    xbbd_start: u32,
    xbbd_count: u32,
) -> Vec<u8> {
    let mut block = vec![0u8; HEADER_SIZE];
    block[..8].copy_from_slice(MAGIC);
    put_u16(&mut block, 0x18, 0x003E);
    put_u16(&mut block, 0x1A, 3);
    put_u16(&mut block, 0x1C, 0xFFFE);
    put_u16(&mut block, 0x1E, 9);
    put_u16(&mut block, 0x20, 6);
    put_u32(&mut block, HDR_NUM_BBD_BLOCKS, num_bbd);
    put_u32(&mut block, HDR_ROOT_START, root_start);
    put_u32(&mut block, HDR_MINI_CUTOFF, mini_cutoff);
    put_u32(&mut block, HDR_SBD_START, sbd_start);
    put_u32(&mut block, HDR_XBBD_START, xbbd_start);
    put_u32(&mut block, HDR_XBBD_COUNT, xbbd_count);
    for i in 0..HEADER_BBD_ENTRIES {
        let value = bbd_list.get(i).copied().unwrap_or(FREESECT);
        put_u32(&mut block, HDR_BBD_LIST + i * 4, value);
    }
    block
}

/// Encode a slice of u32 values into a zero-padded sector.
pub fn u32_sector(values: &[u32], fill: u32) -> Vec<u8> {
    let mut sector = vec![0u8; SECTOR_SIZE];
    for i in 0..DEPOT_ENTRIES_PER_SECTOR {
        put_u32(&mut sector, i * 4, values.get(i).copied().unwrap_or(fill));
    }
    sector
}

/// Builder for small compound files.
#[derive(Debug, Default)]
pub struct CfbBuilder {
    streams: Vec<(String, Vec<u8>)>,
}

impl CfbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stream(mut self, name: &str, data: Vec<u8>) -> Self {
        self.streams.push((name.to_string(), data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut sectors: Vec<Vec<u8>> = vec![Vec::new()];
        let mut depot: Vec<u32> = vec![FATSECT];

        fn push_chain(sectors: &mut Vec<Vec<u8>>, depot: &mut Vec<u32>, data: &[u8]) -> u32 {
            if data.is_empty() {
                return ENDOFCHAIN;
            }
            let start = sectors.len() as u32;
            let chunks: Vec<&[u8]> = data.chunks(SECTOR_SIZE).collect();
            for (i, chunk) in chunks.iter().enumerate() {
                let mut sector = chunk.to_vec();
                sector.resize(SECTOR_SIZE, 0);
                sectors.push(sector);
                let next = if i + 1 == chunks.len() {
                    ENDOFCHAIN
                } else {
                    sectors.len() as u32
                };
                depot.push(next);
            }
            start
        }

        let mut mini = Vec::new();
        let mut small_depot: Vec<u32> = Vec::new();
        let mut placed = Vec::new();
        for (name, data) in &self.streams {
            let start = if data.is_empty() {
                ENDOFCHAIN
            } else if (data.len() as u32) < DEFAULT_MINI_STREAM_CUTOFF {
                let start = (mini.len() / MINI_SECTOR_SIZE) as u32;
                let blocks = data.len().div_ceil(MINI_SECTOR_SIZE);
                for i in 0..blocks {
                    let next = if i + 1 == blocks {
                        ENDOFCHAIN
                    } else {
                        start + i as u32 + 1
                    };
                    small_depot.push(next);
                }
                mini.extend_from_slice(data);
                mini.resize(small_depot.len() * MINI_SECTOR_SIZE, 0);
                start
            } else {
                push_chain(&mut sectors, &mut depot, data)
            };
            placed.push((name.clone(), start, data.len() as u32));
        }

        let mini_start = push_chain(&mut sectors, &mut depot, &mini);
        let sbd_bytes: Vec<u8> = if small_depot.is_empty() {
            Vec::new()
        } else {
            let padded = small_depot.len().div_ceil(DEPOT_ENTRIES_PER_SECTOR);
            let mut bytes = Vec::new();
            for i in 0..padded * DEPOT_ENTRIES_PER_SECTOR {
                let value = small_depot.get(i).copied().unwrap_or(FREESECT);
                bytes.extend_from_slice(&value.to_le_bytes());
            }
            bytes
        };
        let sbd_start = push_chain(&mut sectors, &mut depot, &sbd_bytes);

        let mut directory = Vec::new();
        let child = if placed.is_empty() { NOSTREAM } else { 1 };
        directory.extend_from_slice(&dir_entry(
            "Root Entry",
            STGTY_ROOT,
            NOSTREAM,
            NOSTREAM,
            child,
            mini_start,
            mini.len() as u32,
        ));
        for (i, (name, start, size)) in placed.iter().enumerate() {
            let right = if i + 1 < placed.len() {
                i as u32 + 2
            } else {
                NOSTREAM
            };
            directory.extend_from_slice(&dir_entry(
                name,
                STGTY_STREAM,
                NOSTREAM,
                right,
                NOSTREAM,
                *start,
                *size,
            ));
        }
        let root_start = push_chain(&mut sectors, &mut depot, &directory);

        assert!(depot.len() <= DEPOT_ENTRIES_PER_SECTOR, "fixture too large");
        sectors[0] = u32_sector(&depot, FREESECT);

        let mut file = header(
            1,
            &[0],
            root_start,
            DEFAULT_MINI_STREAM_CUTOFF,
            sbd_start,
            ENDOFCHAIN,
            0,
        );
        for sector in sectors {
            file.extend_from_slice(&sector);
        }
        file
    }
}
