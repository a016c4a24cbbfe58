//! Plex of character positions (PLCF).
//!
//! A PLCF stores `n + 1` little-endian positions followed by `n` fixed-size
//! data elements. Bin tables, section tables and header tables all use it.

use crate::common::binary::{self, BinaryResult};

/// Borrowed view over a PLCF.
///
/// # Examples
///
/// ```
/// use wordbin::ole::plcf::Plcf;
///
/// // CPs 0, 10, 20 with two 2-byte elements
/// let data = [
///     0x00, 0x00, 0x00, 0x00,
///     0x0A, 0x00, 0x00, 0x00,
///     0x14, 0x00, 0x00, 0x00,
///     0x01, 0x02,
///     0x03, 0x04,
/// ];
///
/// let plcf = Plcf::new(&data, 2);
/// assert_eq!(plcf.count(), 2);
/// assert_eq!(plcf.range(1).unwrap(), (10, 20));
/// assert_eq!(plcf.element(1).unwrap(), &[0x03, 0x04]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Plcf<'a> {
    data: &'a [u8],
    element_size: usize,
    count: usize,
}

impl<'a> Plcf<'a> {
    /// View `data` as a PLCF with `element_size`-byte elements.
    ///
    /// The element count is `(len - 4) / (4 + element_size)`.
    pub fn new(data: &'a [u8], element_size: usize) -> Self {
        let count = data.len().saturating_sub(4) / (4 + element_size);
        Self {
            data,
            element_size,
            count,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Position at `index` (0..=count).
    #[inline]
    pub fn position(&self, index: usize) -> BinaryResult<u32> {
        binary::read_u32_le(self.data, index * 4)
    }

    /// Start and end position of element `index`.
    pub fn range(&self, index: usize) -> BinaryResult<(u32, u32)> {
        Ok((self.position(index)?, self.position(index + 1)?))
    }

    /// Byte offset of element `index` within the PLCF.
    #[inline]
    pub fn element_offset(&self, index: usize) -> usize {
        (self.count + 1) * 4 + index * self.element_size
    }

    /// Raw bytes of element `index`.
    pub fn element(&self, index: usize) -> BinaryResult<&'a [u8]> {
        binary::read_slice(self.data, self.element_offset(index), self.element_size)
    }
}
