//! Codepage decoding for 8-bit text in legacy Word files.
//!
//! Text pieces flagged as compressed, Word 6 style names and font names are
//! stored in the document's ANSI codepage. `encoding_rs` does the decoding.

use encoding_rs::Encoding;

/// Map a Windows codepage identifier to an `encoding_rs` encoding.
///
/// Returns `None` for codepages with no equivalent.
#[inline]
pub fn codepage_to_encoding(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        // DOS codepages
        437 => Some(encoding_rs::IBM866), // closest available to CP437

        // Windows codepages (Western scripts)
        874 => Some(encoding_rs::WINDOWS_874),
        1250 => Some(encoding_rs::WINDOWS_1250),
        1251 => Some(encoding_rs::WINDOWS_1251),
        1252 => Some(encoding_rs::WINDOWS_1252),
        1253 => Some(encoding_rs::WINDOWS_1253),
        1254 => Some(encoding_rs::WINDOWS_1254),
        1255 => Some(encoding_rs::WINDOWS_1255),
        1256 => Some(encoding_rs::WINDOWS_1256),
        1257 => Some(encoding_rs::WINDOWS_1257),
        1258 => Some(encoding_rs::WINDOWS_1258),

        // East Asian codepages
        932 => Some(encoding_rs::SHIFT_JIS),
        936 => Some(encoding_rs::GBK),
        949 => Some(encoding_rs::EUC_KR),
        950 => Some(encoding_rs::BIG5),

        // Macintosh
        10000 => Some(encoding_rs::MACINTOSH),

        _ => None,
    }
}

/// Decode 8-bit text with the given encoding. No NUL handling: every byte
/// is one character position.
#[inline]
pub fn decode_8bit(bytes: &[u8], encoding: &'static Encoding) -> String {
    encoding.decode_without_bom_handling(bytes).0.into_owned()
}

/// Decode 8-bit text up to the first NUL.
#[inline]
pub fn decode_8bit_cstr(bytes: &[u8], encoding: &'static Encoding) -> String {
    let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
    decode_8bit(&bytes[..end], encoding)
}

/// Decode UTF-16LE text. Every code unit is kept, NULs included, so the
/// result lines up with character positions.
///
/// # Examples
///
/// ```
/// use wordbin::ole::codepage::decode_utf16le;
///
/// let bytes = b"H\x00i\x00";
/// assert_eq!(decode_utf16le(bytes), "Hi");
/// ```
#[inline]
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
