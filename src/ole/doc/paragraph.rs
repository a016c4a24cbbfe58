/// Sections, paragraphs and runs produced by walking a Word document.
use super::parts::chp::CharacterProperties;
use super::parts::headers::HeaderFooterKind;
use super::parts::lists::FollowChar;
use super::parts::pap::ParagraphProperties;
use super::parts::sep::SectionProperties;
use super::parts::tap::TableProperties;
use serde::Serialize;

/// A section and its paragraphs.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    /// 1-based section number
    pub index: usize,
    /// First character position of the section
    pub start: u32,
    /// Character position past the section
    pub end: u32,
    pub sep: SectionProperties,
    pub paragraphs: Vec<Paragraph>,
}

impl Section {
    /// Text of all paragraphs, list labels included.
    pub fn text(&self) -> String {
        self.paragraphs.iter().map(Paragraph::text).collect()
    }
}

/// A paragraph in a Word document.
///
/// A paragraph whose mark ends a table row carries the row's properties in
/// `table_row` and no runs.
#[derive(Debug, Clone, Serialize)]
pub struct Paragraph {
    pub start: u32,
    pub end: u32,
    /// Paragraph formatting properties (PAP)
    pub pap: ParagraphProperties,
    /// Number or bullet of a list paragraph
    pub list_label: Option<ListLabel>,
    pub table_row: Option<TableProperties>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn is_table_row(&self) -> bool {
        self.table_row.is_some()
    }

    /// Text of the runs, preceded by the list label.
    pub fn text(&self) -> String {
        let mut text = String::new();
        if let Some(label) = &self.list_label {
            text.push_str(&label.text);
            text.push_str(label.follow.as_str());
        }
        for run in &self.runs {
            text.push_str(&run.text());
        }
        text
    }
}

/// A region of text with uniform character formatting.
#[derive(Debug, Clone, Serialize)]
pub struct Run {
    pub start: u32,
    pub end: u32,
    /// Character formatting properties (CHP)
    pub chp: CharacterProperties,
    /// Text, one fragment per text piece the run touches
    pub fragments: Vec<TextFragment>,
}

impl Run {
    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

/// Text decoded from one slice of a text piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextFragment {
    pub start: u32,
    pub end: u32,
    pub is_unicode: bool,
    pub text: String,
}

/// The generated number text of a list paragraph.
#[derive(Debug, Clone, Serialize)]
pub struct ListLabel {
    pub text: String,
    /// Formatting of the number text
    pub chp: CharacterProperties,
    pub follow: FollowChar,
    /// Space between the label and the text in twips, from the hanging
    /// indent
    pub padding_end: i32,
}

/// Content of one header or footer story.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderFooter {
    pub kind: HeaderFooterKind,
    /// Section the lookup was made for
    pub section: usize,
    /// Character range of the story
    pub start: u32,
    pub end: u32,
    pub paragraphs: Vec<Paragraph>,
}

impl HeaderFooter {
    pub fn text(&self) -> String {
        self.paragraphs.iter().map(Paragraph::text).collect()
    }
}
