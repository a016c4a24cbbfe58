//! Binary data parsing utilities shared across the readers.
//!
//! Every read is bounds-checked and reports how many bytes it needed, so the
//! callers can turn a truncated record into a format error instead of a panic.

use thiserror::Error;
use zerocopy::{FromBytes, I16, I32, LE, U16, U32};

/// Binary parsing error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    #[error("Insufficient data: expected {expected}, got {available}")]
    InsufficientData { expected: usize, available: usize },
}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

#[inline]
fn window(data: &[u8], offset: usize, len: usize) -> BinaryResult<&[u8]> {
    let end = offset.checked_add(len).unwrap_or(usize::MAX);
    data.get(offset..end).ok_or(BinaryError::InsufficientData {
        expected: end,
        available: data.len(),
    })
}

/// Read a single byte at the given offset.
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> BinaryResult<u8> {
    window(data, offset, 1).map(|b| b[0])
}

/// Read a little-endian u16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use wordbin::common::binary::read_u16_le;
/// let data = [0x34, 0x12, 0x78, 0x56];
/// assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_le(&data, 2).unwrap(), 0x5678);
/// ```
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> BinaryResult<u16> {
    let bytes = window(data, offset, 2)?;
    Ok(U16::<LE>::read_from_bytes(bytes).map_or(0, |v| v.get()))
}

/// Read a little-endian i16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use wordbin::common::binary::read_i16_le;
/// let data = [0xFF, 0xFF];
/// assert_eq!(read_i16_le(&data, 0).unwrap(), -1i16);
/// ```
#[inline]
pub fn read_i16_le(data: &[u8], offset: usize) -> BinaryResult<i16> {
    let bytes = window(data, offset, 2)?;
    Ok(I16::<LE>::read_from_bytes(bytes).map_or(0, |v| v.get()))
}

/// Read a little-endian u32 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use wordbin::common::binary::read_u32_le;
/// let data = [0x78, 0x56, 0x34, 0x12];
/// assert_eq!(read_u32_le(&data, 0).unwrap(), 0x12345678);
/// ```
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> BinaryResult<u32> {
    let bytes = window(data, offset, 4)?;
    Ok(U32::<LE>::read_from_bytes(bytes).map_or(0, |v| v.get()))
}

/// Read a little-endian i32 from a byte slice at the given offset.
#[inline]
pub fn read_i32_le(data: &[u8], offset: usize) -> BinaryResult<i32> {
    let bytes = window(data, offset, 4)?;
    Ok(I32::<LE>::read_from_bytes(bytes).map_or(0, |v| v.get()))
}

/// Borrow `len` bytes starting at `offset`.
#[inline]
pub fn read_slice(data: &[u8], offset: usize, len: usize) -> BinaryResult<&[u8]> {
    window(data, offset, len)
}

/// Decode a run of UTF-16LE code units, stopping at the first NUL.
///
/// Unpaired surrogates are replaced with U+FFFD.
///
/// # Examples
///
/// ```
/// use wordbin::common::binary::parse_utf16le_string;
/// let data = [0x48, 0x00, 0x69, 0x00, 0x00, 0x00, 0x21, 0x00];
/// assert_eq!(parse_utf16le_string(&data), "Hi");
/// ```
pub fn parse_utf16le_string(data: &[u8]) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Decode exactly `char_count` UTF-16LE code units starting at `offset`.
pub fn parse_utf16le_string_len(
    data: &[u8],
    offset: usize,
    char_count: usize,
) -> BinaryResult<String> {
    let bytes = window(data, offset, char_count * 2)?;
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    Ok(String::from_utf16_lossy(&units))
}
