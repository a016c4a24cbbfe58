//! Parse options shared by the compound-file and document readers.

use encoding_rs::Encoding;

use crate::ole::codepage::codepage_to_encoding;

/// How the small block depot sectors are laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmallDepotLayout {
    /// Every depot sector is written into slots 0..128.
    ///
    /// Files written by older tools that only ever needed one depot sector
    /// read identically under both layouts; this one reproduces how those
    /// files have historically been decoded.
    #[default]
    Overlay,
    /// Depot sectors are appended in chain order.
    Sequential,
}

/// Options controlling how a document is opened and decoded.
///
/// # Examples
///
/// ```rust
/// use wordbin::{ParseOptions, SmallDepotLayout};
///
/// let options = ParseOptions::new()
///     .with_small_depot_layout(SmallDepotLayout::Sequential)
///     .with_codepage(1251)
///     .with_strict(true);
/// assert!(options.strict);
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Layout used when building the small block depot
    pub small_depot_layout: SmallDepotLayout,
    /// Windows codepage for 8-bit text pieces and Word 6 style names
    pub codepage: u32,
    /// Fail on optional tables (fonts, lists, headers, DOP) that do not parse
    pub strict: bool,
    /// Compute list labels for numbered and bulleted paragraphs
    pub resolve_lists: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            small_depot_layout: SmallDepotLayout::Overlay,
            codepage: 1252,
            strict: false,
            resolve_lists: true,
        }
    }
}

impl ParseOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the small block depot layout.
    pub fn with_small_depot_layout(mut self, layout: SmallDepotLayout) -> Self {
        self.small_depot_layout = layout;
        self
    }

    /// Set the codepage used for 8-bit text.
    pub fn with_codepage(mut self, codepage: u32) -> Self {
        self.codepage = codepage;
        self
    }

    /// Enable or disable strict parsing of optional tables.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable or disable list label resolution.
    pub fn with_resolve_lists(mut self, resolve_lists: bool) -> Self {
        self.resolve_lists = resolve_lists;
        self
    }

    /// Encoding for 8-bit text; unknown codepages fall back to Windows-1252.
    pub fn text_encoding(&self) -> &'static Encoding {
        codepage_to_encoding(self.codepage).unwrap_or(encoding_rs::WINDOWS_1252)
    }
}
