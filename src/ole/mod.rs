/// Constants for OLE file format
pub mod consts;

/// Main OLE file parsing implementation
mod file;

/// Windows codepage to `encoding_rs` mapping and text decoding
pub mod codepage;

/// Plex of character positions shared by the Word tables
pub mod plcf;

/// Sprm (single property modifier) decoding
pub mod sprm;

/// Legacy Word document (.doc) reader
///
/// This module provides functionality to parse Microsoft Word documents
/// in the legacy binary format (.doc files), which are OLE2-based files.
pub mod doc;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export public types for convenient access
pub use file::{CompoundFile, OleError, PropertySetEntry, is_compound_file, read_chain};
