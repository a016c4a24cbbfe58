/// Piece table decoder for DOC files.
///
/// The piece table (inside the CLX) maps character positions (CP) to file
/// positions (FC) in the WordDocument stream. Each piece stores its text
/// either as UTF-16LE or as 8-bit characters.
///
/// References:
/// - [MS-DOC] 2.9.38 Clx
/// - [MS-DOC] 2.9.177 Pcd (Piece Descriptor)
use super::super::package::{DocError, Result};
use crate::common::binary::{read_u8, read_u16_le, read_u32_le};
use serde::Serialize;

/// Bit set in a piece's file position when its text is 8-bit.
const FC_COMPRESSED: u32 = 0x4000_0000;

/// Size of a piece descriptor.
const PCD_SIZE: usize = 8;

/// A text piece - maps a range of CPs to a byte range of the WordDocument
/// stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextPiece {
    /// Start character position (CP)
    pub cp_start: u32,
    /// End character position (CP), exclusive
    pub cp_end: u32,
    /// Start byte offset in the WordDocument stream
    pub fc: u32,
    /// End byte offset, exclusive
    pub fc_end: u32,
    /// Whether the text is UTF-16LE (true) or 8-bit (false)
    pub is_unicode: bool,
}

impl TextPiece {
    /// Get the length in characters.
    #[inline]
    pub fn length(&self) -> u32 {
        self.cp_end - self.cp_start
    }

    /// Bytes per character.
    #[inline]
    pub fn char_size(&self) -> u32 {
        if self.is_unicode { 2 } else { 1 }
    }

    /// Convert a CP within this piece to an FC.
    pub fn cp_to_fc(&self, cp: u32) -> Option<u32> {
        if cp < self.cp_start || cp > self.cp_end {
            return None;
        }
        Some(self.fc + (cp - self.cp_start) * self.char_size())
    }

    /// Convert an FC to a CP within this piece.
    pub fn fc_to_cp(&self, fc: u32) -> Option<u32> {
        if fc < self.fc || fc > self.fc_end {
            return None;
        }
        Some(self.cp_start + (fc - self.fc) / self.char_size())
    }
}

/// Decode the piece table of the CLX at `offset` in the table stream.
///
/// Property modifier records (type 1) before the piece table are skipped.
/// Pieces are returned in table order.
pub fn decode_piece_table(table: &[u8], offset: usize) -> Result<Vec<TextPiece>> {
    let corrupt = |what: &str| DocError::CorruptPieceTable(format!("{what} at offset {offset}"));
    let mut pos = offset;

    while read_u8(table, pos).map_err(|_| corrupt("truncated CLX"))? == 1 {
        pos += 1;
        let skip = read_u16_le(table, pos).map_err(|_| corrupt("truncated property record"))?;
        pos += 2 + skip as usize;
    }

    if read_u8(table, pos).map_err(|_| corrupt("truncated CLX"))? != 2 {
        return Err(corrupt("missing piece table marker"));
    }
    pos += 1;

    let size = read_u32_le(table, pos).map_err(|_| corrupt("truncated piece table size"))? as usize;
    pos += 4;
    let count = size.saturating_sub(4) / (4 + PCD_SIZE);
    let descriptors = pos + (count + 1) * 4;

    let mut pieces = Vec::with_capacity(count);
    for x in 0..count {
        let read_cp = |index: usize| {
            read_u32_le(table, pos + index * 4).map_err(|_| corrupt("truncated piece boundaries"))
        };
        let cp_start = read_cp(x)?;
        let cp_end = read_cp(x + 1)?;
        if cp_end <= cp_start {
            return Err(corrupt("empty or reversed piece"));
        }

        let raw_fc = read_u32_le(table, descriptors + x * PCD_SIZE + 2)
            .map_err(|_| corrupt("truncated piece descriptor"))?;
        let is_unicode = raw_fc & FC_COMPRESSED == 0;
        let fc = if is_unicode {
            raw_fc
        } else {
            (raw_fc & !FC_COMPRESSED) / 2
        };

        let length = cp_end - cp_start;
        let fc_end = if is_unicode {
            fc.checked_add(length.saturating_mul(2))
        } else {
            fc.checked_add(length)
        }
        .ok_or_else(|| corrupt("piece past the end of the address space"))?;

        pieces.push(TextPiece {
            cp_start,
            cp_end,
            fc,
            fc_end,
            is_unicode,
        });
    }

    log::debug!("piece table: {} pieces", pieces.len());
    Ok(pieces)
}

/// Piece Table - manages the mapping between CP and FC.
#[derive(Debug, Clone, Default)]
pub struct PieceTable {
    /// All text pieces, sorted by CP
    pieces: Vec<TextPiece>,
}

impl PieceTable {
    /// Decode the piece table of the CLX at `offset`.
    pub fn parse(table: &[u8], offset: usize) -> Result<Self> {
        Ok(Self::from_pieces(decode_piece_table(table, offset)?))
    }

    /// Build a table from pieces in any order.
    pub fn from_pieces(mut pieces: Vec<TextPiece>) -> Self {
        pieces.sort_by_key(|p| p.cp_start);
        Self { pieces }
    }

    /// Get all text pieces.
    #[inline]
    pub fn pieces(&self) -> &[TextPiece] {
        &self.pieces
    }

    /// Find the text piece containing a given CP.
    pub fn piece_for_cp(&self, cp: u32) -> Option<&TextPiece> {
        let index = self.pieces.partition_point(|piece| piece.cp_end <= cp);
        self.pieces
            .get(index)
            .filter(|piece| piece.cp_start <= cp && cp < piece.cp_end)
    }

    /// Convert a CP to an FC.
    pub fn cp_to_fc(&self, cp: u32) -> Option<u32> {
        self.piece_for_cp(cp)?.cp_to_fc(cp)
    }

    /// Convert an FC to a CP.
    pub fn fc_to_cp(&self, fc: u32) -> Option<u32> {
        self.pieces.iter().find_map(|piece| {
            if fc < piece.fc_end {
                piece.fc_to_cp(fc)
            } else {
                None
            }
        })
    }

    /// Get the total number of characters (last CP).
    pub fn total_cps(&self) -> u32 {
        self.pieces.last().map(|p| p.cp_end).unwrap_or(0)
    }
}
