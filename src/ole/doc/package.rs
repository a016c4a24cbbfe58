/// Package implementation for legacy Word documents (.doc).
use super::super::{CompoundFile, OleError};
use super::document::Document;
use crate::common::binary::BinaryError;
use crate::config::ParseOptions;
use crate::ole::doc::parts::fib::FileInformationBlock;
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;
use thiserror::Error;

/// Name of the main document stream.
const WORD_DOCUMENT_STREAM: &str = "WordDocument";

/// Error types for DOC file parsing.
#[derive(Debug, Error)]
pub enum DocError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Compound file error
    #[error("OLE error: {0}")]
    Ole(#[from] OleError),
    /// The CLX or one of its pieces cannot be decoded
    #[error("Corrupt piece table: {0}")]
    CorruptPieceTable(String),
    /// A record ends early or points outside its stream
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
    /// A style's base chain leads back to itself
    #[error("Style inheritance cycle at style {0}")]
    StyleCycle(u16),
    /// Stream not found
    #[error("Stream not found: {0}")]
    StreamNotFound(String),
    /// Invalid DOC format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl From<BinaryError> for DocError {
    fn from(err: BinaryError) -> Self {
        DocError::CorruptRecord(err.to_string())
    }
}

/// Result type for DOC operations.
pub type Result<T> = std::result::Result<T, DocError>;

/// A Word (.doc) package.
///
/// Opening a package reads the WordDocument stream and the table stream the
/// FIB selects; the compound file and its reader are released afterwards.
///
/// # Examples
///
/// ```rust,no_run
/// use wordbin::Package;
///
/// let pkg = Package::open("document.doc")?;
/// let doc = pkg.document()?;
/// println!("{}", doc.text()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Package {
    word_document: Vec<u8>,
    table_stream: Vec<u8>,
    options: ParseOptions,
}

impl Package {
    /// Open a .doc package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a .doc package from a file path with explicit options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader_with_options(file, options)
    }

    /// Create a Package from any reader that implements Read + Seek.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use std::fs::File;
    /// use wordbin::Package;
    ///
    /// let file = File::open("document.doc")?;
    /// let pkg = Package::from_reader(file)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    pub fn from_reader_with_options<R: Read + Seek>(
        reader: R,
        options: ParseOptions,
    ) -> Result<Self> {
        let mut ole = CompoundFile::open_with_options(reader, &options)?;

        if !ole.exists(WORD_DOCUMENT_STREAM) {
            return Err(DocError::InvalidFormat(
                "Not a valid Word document: WordDocument stream not found".to_string(),
            ));
        }
        let word_document = ole.get_stream(WORD_DOCUMENT_STREAM)?;

        let fib = FileInformationBlock::parse(&word_document)?;
        let table_name = fib.table_stream_name();
        let table_stream = ole.get_stream(table_name).map_err(|err| match err {
            OleError::StreamNotFound(name) => DocError::StreamNotFound(name),
            other => DocError::Ole(other),
        })?;
        log::debug!(
            "read {} bytes of WordDocument and {} bytes of {table_name}",
            word_document.len(),
            table_stream.len()
        );

        Ok(Self {
            word_document,
            table_stream,
            options,
        })
    }

    /// Parse the main document.
    pub fn document(&self) -> Result<Document> {
        Document::parse(&self.word_document, &self.table_stream, &self.options)
    }

    /// Raw WordDocument stream.
    #[inline]
    pub fn word_document(&self) -> &[u8] {
        &self.word_document
    }

    /// Raw table stream (0Table or 1Table).
    #[inline]
    pub fn table_stream(&self) -> &[u8] {
        &self.table_stream
    }

    #[inline]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }
}
