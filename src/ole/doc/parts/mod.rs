/// Internal parts for parsing DOC file structures.
///
/// This module contains parsers for the binary structures used in
/// legacy Word documents, including:
/// - FIB (File Information Block) and the FKP bin tables
/// - The piece table and the range index over property runs
/// - Character, paragraph, section and table properties
/// - The style sheet with its inheritance chains
/// - Lists, fonts, headers and document properties
pub mod border;
pub mod chp;
pub mod dop;
pub mod fib;
pub mod fkp;
pub mod fonts;
pub mod headers;
pub mod lists;
pub mod numbering;
pub mod pap;
pub mod piece_table;
pub mod range_index;
pub mod sep;
pub mod stylesheet;
pub mod tap;
pub mod uncompress;
