/// Word (.doc) document support.
///
/// This module provides parsing of Microsoft Word documents in the legacy
/// binary format (.doc files), which uses OLE2 structured storage.
///
/// # Architecture
///
/// - `Package`: reads the WordDocument and table streams from the container
/// - `Document`: the FIB, the piece table and the property indexes, and the
///   walk over sections, paragraphs and runs
/// - `parts`: the binary structures (FIB, FKPs, style sheet, sprm
///   interpreter, lists, fonts, headers)
///
/// # DOC File Structure
///
/// A .doc file is an OLE2 structured storage containing several streams:
/// - **WordDocument**: Main document stream containing the FIB, the text and
///   the FKP pages
/// - **1Table** or **0Table**: Style sheet, piece table, bin tables and the
///   other tables the FIB points to
///
/// # Example
///
/// ```rust,no_run
/// use wordbin::ole::doc::Package;
///
/// let package = Package::open("document.doc")?;
/// let doc = package.document()?;
///
/// for section in doc.sections()? {
///     for para in &section.paragraphs {
///         // List labels are part of the paragraph text
///         println!("{}", para.text());
///     }
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod document;
pub mod package;
pub mod paragraph;
pub mod parts;

pub use document::Document;
pub use package::{DocError, Package};
pub use paragraph::{HeaderFooter, ListLabel, Paragraph, Run, Section, TextFragment};
pub use parts::headers::HeaderFooterKind;
