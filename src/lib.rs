//! wordbin - a reader for legacy Word binary documents
//!
//! The crate has two layers. [`ole`] opens OLE2 compound files, follows
//! their sector chains and extracts streams. [`ole::doc`] interprets the
//! Word structures inside: the piece table, the FKP property runs, the style
//! sheet and the sprm interpreter that rebuilds paragraph, character,
//! section and table properties.
//!
//! # Example - Reading a DOC file
//!
//! ```no_run
//! use wordbin::Package;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pkg = Package::open("document.doc")?;
//! let doc = pkg.document()?;
//!
//! // Extract all text
//! println!("{}", doc.main_text()?);
//!
//! // Walk the formatted structure
//! for section in doc.sections()? {
//!     for para in &section.paragraphs {
//!         for run in &para.runs {
//!             println!("bold={} {:?}", run.chp.bold, run.text());
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level OLE access
//!
//! ```no_run
//! use std::fs::File;
//! use wordbin::ole::CompoundFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("document.doc")?;
//! let mut ole = CompoundFile::open(file)?;
//!
//! for stream in ole.list_streams() {
//!     println!("Stream: {stream}");
//! }
//!
//! let data = ole.get_stream("WordDocument")?;
//! println!("Stream size: {} bytes", data.len());
//! # Ok(())
//! # }
//! ```

/// Types and utilities shared by the container and document readers
pub mod common;

/// Options for opening and decoding documents
pub mod config;

/// OLE2 (Object Linking and Embedding) file format parser
///
/// This module provides functionality to parse OLE2 structured storage files.
/// The `doc` submodule parses the legacy Word documents stored in them.
pub mod ole;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use config::{ParseOptions, SmallDepotLayout};
pub use ole::doc::{Document, Package};
