/// Document - the main API for working with Word document content.
///
/// Sections and stories are located by character position and mapped
/// through the piece table to the byte ranges they cover in the
/// WordDocument stream. Paragraphs and character runs are indexed by those
/// byte ranges, each level clipped to its parent.
use super::package::{DocError, Result};
use super::paragraph::{HeaderFooter, ListLabel, Paragraph, Run, Section, TextFragment};
use super::parts::chp::CharacterProperties;
use super::parts::dop::DocumentProperties;
use super::parts::fib::{FcLcb, FileInformationBlock};
use super::parts::fkp::{BinKind, BinTable};
use super::parts::fonts::FontTable;
use super::parts::headers::{HeaderFooterKind, header_range};
use super::parts::lists::{ListCounter, ListTables};
use super::parts::pap::ParagraphProperties;
use super::parts::piece_table::{PieceTable, TextPiece};
use super::parts::range_index::{PropertyNode, RangeIndex};
use super::parts::sep::SectionProperties;
use super::parts::stylesheet::StyleSheet;
use super::parts::tap;
use super::parts::uncompress::{uncompress, uncompress_with};
use crate::common::binary::{read_slice, read_u16_le, read_u32_le};
use crate::config::ParseOptions;
use crate::ole::codepage::{decode_8bit, decode_utf16le};
use crate::ole::plcf::Plcf;
use bytes::Bytes;
use encoding_rs::Encoding;

/// Size of a section descriptor (SED) in PlcfSed.
const SED_SIZE: usize = 12;
/// SED file position meaning "no SEPX".
const NO_SEPX: u32 = 0xFFFF_FFFF;
/// Hanging space reserved per label character, in twips.
const LABEL_CHAR_WIDTH: i32 = 200;

/// A Word document (.doc).
///
/// # Examples
///
/// ```rust,no_run
/// use wordbin::Package;
///
/// let pkg = Package::open("document.doc")?;
/// let doc = pkg.document()?;
///
/// for section in doc.sections()? {
///     for paragraph in &section.paragraphs {
///         println!("{}", paragraph.text());
///     }
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Document {
    /// File Information Block from WordDocument stream
    fib: FileInformationBlock,
    word_document: Bytes,
    encoding: &'static Encoding,
    resolve_lists: bool,
    pieces: PieceTable,
    /// Text pieces keyed by file position
    text: RangeIndex<TextPiece>,
    chpx: RangeIndex<Bytes>,
    papx: RangeIndex<Bytes>,
    sepx: RangeIndex<Bytes>,
    styles: StyleSheet,
    fonts: FontTable,
    lists: ListTables,
    dop: DocumentProperties,
    plcfhdd: Bytes,
}

impl Document {
    /// Parse a document from its WordDocument and table streams.
    pub fn parse(
        word_document: &[u8],
        table_stream: &[u8],
        options: &ParseOptions,
    ) -> Result<Self> {
        let fib = FileInformationBlock::parse(word_document)?;
        if fib.is_encrypted() {
            return Err(DocError::InvalidFormat(
                "encrypted documents are not supported".to_string(),
            ));
        }
        let version = fib.format_version();

        let styles = StyleSheet::parse(table(fib.stsh, table_stream, "style sheet")?, version)?;
        let pieces = read_pieces(&fib, table_stream)?;
        let text = pieces
            .pieces()
            .iter()
            .map(|piece| PropertyNode::new(piece.fc, piece.fc_end, *piece))
            .collect();

        let chpx = BinTable::parse(
            table(fib.plcf_bte_chpx, table_stream, "character bin table")?,
            BinKind::Character,
            version,
        )?
        .read_nodes(word_document)?;
        let papx = BinTable::parse(
            table(fib.plcf_bte_papx, table_stream, "paragraph bin table")?,
            BinKind::Paragraph,
            version,
        )?
        .read_nodes(word_document)?;

        let mut document = Document {
            word_document: Bytes::copy_from_slice(word_document),
            encoding: options.text_encoding(),
            resolve_lists: options.resolve_lists,
            pieces,
            text,
            chpx,
            papx,
            sepx: RangeIndex::new(),
            styles,
            fonts: FontTable::default(),
            lists: ListTables::default(),
            dop: DocumentProperties::default(),
            plcfhdd: Bytes::new(),
            fib,
        };
        let plcf_sed = table(document.fib.plcf_sed, table_stream, "section table")?;
        document.sepx = document.read_sections(plcf_sed)?;

        let fib = &document.fib;
        document.fonts = optional(options, "font table", || {
            let data = table(fib.sttbf_ffn, table_stream, "font table")?;
            if data.is_empty() {
                return Ok(FontTable::default());
            }
            FontTable::parse(data, version)
        })?;
        document.lists = optional(options, "list tables", || {
            ListTables::parse(
                table(fib.plcf_lst, table_stream, "list table")?,
                table(fib.plf_lfo, table_stream, "list override table")?,
            )
        })?;
        document.dop = optional(options, "document properties", || {
            let data = table(fib.dop, table_stream, "document properties")?;
            if data.is_empty() {
                return Ok(DocumentProperties::default());
            }
            DocumentProperties::parse(data)
        })?;
        document.plcfhdd = optional(options, "header table", || {
            Ok(Bytes::copy_from_slice(table(fib.plcf_hdd, table_stream, "header table")?))
        })?;

        Ok(document)
    }

    /// Read PlcfSed and index each section's SEPX by character position.
    fn read_sections(&self, plcfsed: &[u8]) -> Result<RangeIndex<Bytes>> {
        let plcf = Plcf::new(plcfsed, SED_SIZE);
        let mut index = RangeIndex::new();
        for i in 0..plcf.count() {
            let (cp_start, cp_end) = plcf.range(i)?;
            let fc_sepx = read_u32_le(plcf.element(i)?, 2)?;
            let sepx = if fc_sepx == NO_SEPX {
                Bytes::new()
            } else {
                let length = read_u16_le(&self.word_document, fc_sepx as usize)? as usize;
                let bytes = read_slice(&self.word_document, fc_sepx as usize + 2, length)?;
                self.word_document.slice_ref(bytes)
            };
            if !index.insert(PropertyNode::new(cp_start, cp_end, sepx)) {
                log::debug!("section {i} skipped");
            }
        }
        Ok(index)
    }

    /// File ranges holding characters `[cp_start, cp_end)`, in logical order.
    ///
    /// Pieces of a fast-saved file are not stored in file order, so one
    /// character range can map to several file ranges.
    pub fn fc_spans(&self, cp_start: u32, cp_end: u32) -> Vec<(u32, u32)> {
        let mut spans: Vec<(u32, u32)> = Vec::new();
        for piece in self.pieces.pieces() {
            let first = piece.cp_start.max(cp_start);
            let last = piece.cp_end.min(cp_end);
            if first >= last {
                continue;
            }
            let size = piece.char_size();
            let start = piece.fc + (first - piece.cp_start) * size;
            let end = start + (last - first) * size;
            match spans.last_mut() {
                Some(span) if span.1 == start => span.1 = end,
                _ => spans.push((start, end)),
            }
        }
        spans
    }

    /// File ranges of the main text, in logical order.
    pub fn main_text_spans(&self) -> Vec<(u32, u32)> {
        self.fc_spans(0, self.fib.ccp_text)
    }

    /// Walk the main text section by section.
    pub fn sections(&self) -> Result<Vec<Section>> {
        let ccp_text = self.fib.ccp_text;
        let mut counter = ListCounter::new();

        let mut sepx = self.sepx.find_clipped(0, ccp_text);
        if sepx.is_empty() {
            sepx.push(PropertyNode::new(0, ccp_text, Bytes::new()));
        }

        let mut sections = Vec::with_capacity(sepx.len());
        for (i, node) in sepx.into_iter().enumerate() {
            let sep = uncompress(&node.payload, &SectionProperties::default(), &self.styles)?;
            sections.push(Section {
                index: i + 1,
                start: node.start,
                end: node.end,
                sep,
                paragraphs: self.story_paragraphs(node.start, node.end, &mut counter)?,
            });
        }
        Ok(sections)
    }

    /// Paragraphs of characters `[cp_start, cp_end)`, piece by piece.
    fn story_paragraphs(
        &self,
        cp_start: u32,
        cp_end: u32,
        counter: &mut ListCounter,
    ) -> Result<Vec<Paragraph>> {
        let mut paragraphs = Vec::new();
        for (start, end) in self.fc_spans(cp_start, cp_end) {
            paragraphs.extend(self.paragraphs(start, end, counter)?);
        }
        Ok(paragraphs)
    }

    /// Paragraphs overlapping `[start, end)`, clipped to it.
    fn paragraphs(
        &self,
        start: u32,
        end: u32,
        counter: &mut ListCounter,
    ) -> Result<Vec<Paragraph>> {
        self.papx
            .find_clipped(start, end)
            .into_iter()
            .map(|node| self.paragraph(node, counter))
            .collect()
    }

    fn paragraph(&self, node: PropertyNode<Bytes>, counter: &mut ListCounter) -> Result<Paragraph> {
        let papx = &node.payload;
        let istd = read_u16_le(papx, 0).unwrap_or_default();
        let mut pap = uncompress(papx, &self.styles.paragraph_properties(istd)?, &self.styles)?;

        if pap.is_table_row() {
            return Ok(Paragraph {
                start: node.start,
                end: node.end,
                table_row: Some(tap::parse_row(papx, &self.styles)?),
                pap,
                list_label: None,
                runs: Vec::new(),
            });
        }

        let style_chp = self.styles.character_properties(pap.istd)?;
        let runs = self
            .chpx
            .find_clipped(node.start, node.end)
            .into_iter()
            .map(|run| -> Result<Run> {
                Ok(Run {
                    start: run.start,
                    end: run.end,
                    chp: uncompress(&run.payload, &style_chp, &self.styles)?,
                    fragments: self.fragments(run.start, run.end)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let list_label = if self.resolve_lists && pap.is_list_item() {
            let last_chp = runs.last().map_or(&style_chp, |run| &run.chp);
            self.list_label(&mut pap, last_chp, counter)?
        } else {
            None
        };

        Ok(Paragraph {
            start: node.start,
            end: node.end,
            pap,
            list_label,
            table_row: None,
            runs,
        })
    }

    /// Number the list paragraph and apply its level's formatting to `pap`.
    fn list_label(
        &self,
        pap: &mut ParagraphProperties,
        last_chp: &CharacterProperties,
        counter: &mut ListCounter,
    ) -> Result<Option<ListLabel>> {
        let Ok(ilfo) = u16::try_from(pap.ilfo) else {
            log::warn!("list override {} is out of range", pap.ilfo);
            return Ok(None);
        };
        let Some((level, text)) = counter.label(&self.lists, ilfo, pap.ilvl) else {
            return Ok(None);
        };

        *pap = uncompress_with(&level.papx, pap, &self.styles, false)?;
        let chp = uncompress(&level.chpx, last_chp, &self.styles)?;
        let indent = -pap.dxa_left1 - text.chars().count() as i32 * LABEL_CHAR_WIDTH;

        Ok(Some(ListLabel {
            text,
            chp,
            follow: level.follow,
            padding_end: indent.max(0),
        }))
    }

    /// Text of `[start, end)`, one fragment per text piece.
    fn fragments(&self, start: u32, end: u32) -> Result<Vec<TextFragment>> {
        self.text
            .find_clipped(start, end)
            .into_iter()
            .map(|node| -> Result<TextFragment> {
                let length = (node.end - node.start) as usize;
                let bytes = read_slice(&self.word_document, node.start as usize, length)?;
                Ok(TextFragment {
                    start: node.start,
                    end: node.end,
                    is_unicode: node.payload.is_unicode,
                    text: self.decode(bytes, node.payload.is_unicode),
                })
            })
            .collect()
    }

    fn decode(&self, bytes: &[u8], is_unicode: bool) -> String {
        if is_unicode {
            decode_utf16le(bytes)
        } else {
            decode_8bit(bytes, self.encoding)
        }
    }

    /// Text of characters `[cp_start, cp_end)` in logical order.
    fn text_between(&self, cp_start: u32, cp_end: u32) -> Result<String> {
        let mut text = String::new();
        for piece in self.pieces.pieces() {
            let first = piece.cp_start.max(cp_start);
            let last = piece.cp_end.min(cp_end);
            if first >= last {
                continue;
            }
            let size = piece.char_size();
            let offset = piece.fc + (first - piece.cp_start) * size;
            let length = ((last - first) * size) as usize;
            let bytes = read_slice(&self.word_document, offset as usize, length)?;
            text.push_str(&self.decode(bytes, piece.is_unicode));
        }
        Ok(text)
    }

    /// All text of the document in logical order, every story included.
    pub fn text(&self) -> Result<String> {
        self.text_between(0, u32::MAX)
    }

    /// Text of the main story only.
    pub fn main_text(&self) -> Result<String> {
        self.text_between(0, self.fib.ccp_text)
    }

    /// The `kind` header or footer of the 1-based `section`, or `None` when
    /// the document has no such story.
    pub fn header_footer(
        &self,
        kind: HeaderFooterKind,
        section: usize,
    ) -> Result<Option<HeaderFooter>> {
        let range = header_range(&self.plcfhdd, kind, section, self.fib.header_cp_start());
        if range.is_empty() {
            return Ok(None);
        }
        let mut counter = ListCounter::new();
        Ok(Some(HeaderFooter {
            kind,
            section,
            start: range.start,
            end: range.end,
            paragraphs: self.story_paragraphs(range.start, range.end, &mut counter)?,
        }))
    }

    /// Every header and footer that applies to the 1-based `section`.
    pub fn header_footers(&self, section: usize) -> Result<Vec<HeaderFooter>> {
        let mut stories = Vec::new();
        for kind in HeaderFooterKind::ALL {
            if let Some(story) = self.header_footer(kind, section)? {
                stories.push(story);
            }
        }
        Ok(stories)
    }

    #[inline]
    pub fn fib(&self) -> &FileInformationBlock {
        &self.fib
    }

    #[inline]
    pub fn piece_table(&self) -> &PieceTable {
        &self.pieces
    }

    #[inline]
    pub fn style_sheet(&self) -> &StyleSheet {
        &self.styles
    }

    #[inline]
    pub fn fonts(&self) -> &FontTable {
        &self.fonts
    }

    /// Name of font `ftc`.
    pub fn font_name(&self, ftc: u16) -> Option<&str> {
        self.fonts.name(ftc)
    }

    #[inline]
    pub fn document_properties(&self) -> &DocumentProperties {
        &self.dop
    }

    #[inline]
    pub fn list_tables(&self) -> &ListTables {
        &self.lists
    }
}

/// The bytes of a table in the table stream; empty when the FIB has none.
fn table<'a>(location: FcLcb, stream: &'a [u8], name: &str) -> Result<&'a [u8]> {
    if location.is_empty() {
        return Ok(&[]);
    }
    location.slice(stream).ok_or_else(|| {
        DocError::CorruptRecord(format!(
            "{name} at {:#x}+{} lies outside the {}-byte table stream",
            location.fc,
            location.lcb,
            stream.len()
        ))
    })
}

/// Run `parse` for an optional table, falling back to the default unless
/// parsing is strict.
fn optional<T: Default>(
    options: &ParseOptions,
    name: &str,
    parse: impl FnOnce() -> Result<T>,
) -> Result<T> {
    match parse() {
        Ok(value) => Ok(value),
        Err(err) if !options.strict => {
            log::warn!("skipping {name}: {err}");
            Ok(T::default())
        },
        Err(err) => Err(err),
    }
}

/// Piece table from the CLX, or one 8-bit piece over `[fcMin, fcMac)` when
/// the document has none.
fn read_pieces(fib: &FileInformationBlock, table_stream: &[u8]) -> Result<PieceTable> {
    let clx = table(fib.clx, table_stream, "piece table")?;
    if !clx.is_empty() {
        return PieceTable::parse(clx, 0);
    }
    let mut pieces = Vec::new();
    if fib.fc_mac > fib.fc_min {
        pieces.push(TextPiece {
            cp_start: 0,
            cp_end: fib.fc_mac - fib.fc_min,
            fc: fib.fc_min,
            fc_end: fib.fc_mac,
            is_unicode: false,
        });
    }
    Ok(PieceTable::from_pieces(pieces))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ole::doc::parts::fib::tests::build_fib;
    use crate::ole::doc::parts::fkp::FKP_PAGE_SIZE;
    use crate::ole::doc::parts::fkp::tests::{chpx_page, papx_page};
    use crate::ole::doc::parts::fonts::tests::build_font_table;
    use crate::ole::doc::parts::lists::FollowChar;
    use crate::ole::doc::parts::lists::tests::{build_lfo, build_lst};
    use crate::ole::doc::parts::piece_table::tests::build_clx;
    use crate::ole::doc::parts::stylesheet::NIL_STYLE;
    use crate::ole::doc::parts::stylesheet::tests::{TestStyle, build_stsh};

    const FC_MIN: u32 = 0x400;
    const MAIN_TEXT: &str = "Hello\rItem\rMore\r";
    const HEADER_TEXT: &str = "Page\r";

    /// PAPX of a list paragraph: style 0, centered, list 1 level 0.
    const LIST_PAPX: [u8; 12] = [
        0x00, 0x00, 0x03, 0x24, 0x01, 0x0A, 0x26, 0x00, 0x0B, 0x46, 0x01, 0x00,
    ];

    fn u32_plcf(positions: &[u32], elements: &[&[u8]]) -> Vec<u8> {
        let mut data: Vec<u8> = positions.iter().flat_map(|p| p.to_le_bytes()).collect();
        for element in elements {
            data.extend_from_slice(element);
        }
        data
    }

    /// A two-stream document: three main paragraphs (the last two in a
    /// list) and an odd-page header, all 8-bit text.
    pub(crate) fn build_document() -> (Vec<u8>, Vec<u8>) {
        let text = format!("{MAIN_TEXT}{HEADER_TEXT}");
        let text_end = FC_MIN + text.len() as u32;
        let ccp_text = MAIN_TEXT.len() as u32;

        let mut table_stream = Vec::new();
        let mut place = |bytes: Vec<u8>| {
            let fc = table_stream.len() as u32;
            let lcb = bytes.len() as u32;
            table_stream.extend(bytes);
            (fc, lcb)
        };

        let stsh = place(build_stsh(&[Some(TestStyle {
            name: "Normal",
            style_type: 1,
            base: NIL_STYLE,
            upxs: vec![vec![0x00, 0x00], vec![]],
        })]));
        let clx = place(build_clx(&[], &[(text.len() as u32, 0x4000_0000 | FC_MIN * 2)]));
        let bte_chpx = place(u32_plcf(&[FC_MIN, text_end], &[&3u32.to_le_bytes()]));
        let bte_papx = place(u32_plcf(&[FC_MIN, text_end], &[&4u32.to_le_bytes()]));
        let mut sed = [0u8; SED_SIZE];
        sed[2..6].copy_from_slice(&0x300u32.to_le_bytes());
        let plcf_sed = place(u32_plcf(&[0, ccp_text], &[&sed]));
        let fonts = place(build_font_table(&["Times New Roman", "Symbol", "Arial"]));
        let lst = place(build_lst(0x55, false));
        let lfo = place(build_lfo(0x55, &[]));
        let hdd = place(u32_plcf(&[0, 0, 0, 0, 0, 0, 0, 0, 5, 5, 5, 5, 5], &[]));
        let mut dop = vec![0u8; 84];
        dop[38..42].copy_from_slice(&3i32.to_le_bytes());
        let dop = place(dop);

        let fields = [
            (0x0A, 0x0200),
            (0x18, FC_MIN),
            (0x1C, text_end),
            (0x4C, ccp_text),
            (0x54, HEADER_TEXT.len() as u32),
            (0xA2, stsh.0),
            (0xA6, stsh.1),
            (0xCA, plcf_sed.0),
            (0xCE, plcf_sed.1),
            (0xF2, hdd.0),
            (0xF6, hdd.1),
            (0xFA, bte_chpx.0),
            (0xFE, bte_chpx.1),
            (0x102, bte_papx.0),
            (0x106, bte_papx.1),
            (0x112, fonts.0),
            (0x116, fonts.1),
            (0x192, dop.0),
            (0x196, dop.1),
            (0x1A2, clx.0),
            (0x1A6, clx.1),
            (0x2E2, lst.0),
            (0x2E6, lst.1),
            (0x2EA, lfo.0),
            (0x2EE, lfo.1),
        ];
        let mut word_document = build_fib(&fields);
        word_document.resize(FKP_PAGE_SIZE * 5, 0);

        // SEPX: section break "continuous".
        word_document[0x300..0x305].copy_from_slice(&[0x03, 0x00, 0x09, 0x30, 0x00]);
        word_document[FC_MIN as usize..text_end as usize].copy_from_slice(text.as_bytes());

        let chpx = chpx_page(&[
            (FC_MIN, FC_MIN + 6, &[0x35, 0x08, 0x01]),
            (FC_MIN + 6, text_end, &[]),
        ]);
        word_document[FKP_PAGE_SIZE * 3..FKP_PAGE_SIZE * 4].copy_from_slice(&chpx);
        let papx = papx_page(&[
            (FC_MIN, FC_MIN + 6, &[0x00, 0x00]),
            (FC_MIN + 6, FC_MIN + 11, &LIST_PAPX[..]),
            (FC_MIN + 11, FC_MIN + 16, &LIST_PAPX[..]),
            (FC_MIN + 16, text_end, &[0x00, 0x00]),
        ]);
        word_document[FKP_PAGE_SIZE * 4..].copy_from_slice(&papx);

        (word_document, table_stream)
    }

    #[test]
    fn test_walk_sections() {
        let (word_document, table_stream) = build_document();
        let doc = Document::parse(&word_document, &table_stream, &ParseOptions::default()).unwrap();
        assert_eq!(doc.main_text_spans(), vec![(FC_MIN, FC_MIN + 16)]);

        let sections = doc.sections().unwrap();
        assert_eq!(sections.len(), 1);
        let section = &sections[0];
        assert_eq!(section.index, 1);
        assert_eq!((section.start, section.end), (0, 16));
        assert_eq!(section.sep.bkc, 0);
        assert_eq!(section.paragraphs.len(), 3);

        let first = &section.paragraphs[0];
        assert_eq!(first.text(), "Hello\r");
        assert!(first.runs[0].chp.bold);
        assert!(first.list_label.is_none());

        let item = &section.paragraphs[1];
        assert_eq!(item.pap.jc, 1);
        assert_eq!(item.pap.dxa_left1, -720);
        assert!(!item.runs[0].chp.bold);
        let label = item.list_label.as_ref().unwrap();
        assert_eq!(label.text, "1.");
        assert_eq!(label.follow, FollowChar::Tab);
        assert_eq!(label.padding_end, 320);
        assert_eq!(item.text(), "1.\tItem\r");

        assert_eq!(section.paragraphs[2].text(), "2.\tMore\r");
        assert_eq!(section.text(), "Hello\r1.\tItem\r2.\tMore\r");
    }

    #[test]
    fn test_text_and_tables() {
        let (word_document, table_stream) = build_document();
        let doc = Document::parse(&word_document, &table_stream, &ParseOptions::default()).unwrap();
        assert_eq!(doc.text().unwrap(), "Hello\rItem\rMore\rPage\r");
        assert_eq!(doc.main_text().unwrap(), MAIN_TEXT);
        assert_eq!(doc.font_name(2), Some("Arial"));
        assert_eq!(doc.fonts().len(), 3);
        assert_eq!(doc.document_properties().words, 3);
        assert_eq!(doc.list_tables().lists().len(), 1);
        assert_eq!(doc.style_sheet().style_name(0), Some("Normal"));
    }

    #[test]
    fn test_header_lookup() {
        let (word_document, table_stream) = build_document();
        let doc = Document::parse(&word_document, &table_stream, &ParseOptions::default()).unwrap();

        let header = doc.header_footer(HeaderFooterKind::HeaderOdd, 1).unwrap().unwrap();
        assert_eq!((header.start, header.end), (16, 21));
        assert_eq!(header.text(), HEADER_TEXT);
        assert!(doc.header_footer(HeaderFooterKind::FooterFirst, 1).unwrap().is_none());
        assert_eq!(doc.header_footers(1).unwrap().len(), 1);
    }

    #[test]
    fn test_lists_disabled() {
        let (word_document, table_stream) = build_document();
        let options = ParseOptions::new().with_resolve_lists(false);
        let doc = Document::parse(&word_document, &table_stream, &options).unwrap();
        let sections = doc.sections().unwrap();
        assert_eq!(sections[0].paragraphs[1].text(), "Item\r");
        assert_eq!(sections[0].paragraphs[1].pap.dxa_left1, 0);
    }

    #[test]
    fn test_broken_optional_table() {
        let (mut word_document, table_stream) = build_document();
        // Point the font table past the end of the table stream.
        word_document[0x112..0x116].copy_from_slice(&0xFFFFu32.to_le_bytes());

        let doc = Document::parse(&word_document, &table_stream, &ParseOptions::default()).unwrap();
        assert!(doc.fonts().is_empty());

        let strict = ParseOptions::new().with_strict(true);
        let err = Document::parse(&word_document, &table_stream, &strict).unwrap_err();
        assert!(matches!(err, DocError::CorruptRecord(_)));
    }

    #[test]
    fn test_table_row_paragraph() {
        let (mut word_document, table_stream) = build_document();
        // First paragraph: in table, row end, three cells.
        let mut row = vec![0x00, 0x00, 0x16, 0x24, 0x01, 0x17, 0x24, 0x01, 0x08, 0xD6];
        let boundaries: [i16; 4] = [0, 1000, 2000, 3000];
        row.extend_from_slice(&((1 + 1 + boundaries.len() * 2) as u16).to_le_bytes());
        row.push(3);
        for dxa in boundaries {
            row.extend_from_slice(&dxa.to_le_bytes());
        }
        if row.len() % 2 == 1 {
            row.push(0);
        }
        let papx = papx_page(&[
            (FC_MIN, FC_MIN + 6, row.as_slice()),
            (FC_MIN + 6, FC_MIN + 21, &[0x00, 0x00]),
        ]);
        word_document[FKP_PAGE_SIZE * 4..].copy_from_slice(&papx);

        let doc = Document::parse(&word_document, &table_stream, &ParseOptions::default()).unwrap();
        let sections = doc.sections().unwrap();
        let first = &sections[0].paragraphs[0];
        assert!(first.is_table_row());
        assert!(first.runs.is_empty());
        assert_eq!(first.table_row.as_ref().unwrap().itc_mac, 3);
    }

    #[test]
    fn test_encrypted_document_is_rejected() {
        let (mut word_document, table_stream) = build_document();
        word_document[0x0A..0x0C].copy_from_slice(&0x0300u16.to_le_bytes());
        let options = ParseOptions::default();
        let err = Document::parse(&word_document, &table_stream, &options).unwrap_err();
        assert!(matches!(err, DocError::InvalidFormat(_)));
    }

    /// `build_document` with its text stored as three pieces out of file
    /// order: "Item\rMore\r" first, then "Hello\r", then the header.
    fn fast_saved_document() -> (Vec<u8>, Vec<u8>) {
        let (mut word_document, mut table_stream) = build_document();
        let compressed = |fc: u32| 0x4000_0000 | fc * 2;
        let clx = build_clx(
            &[],
            &[
                (10, compressed(FC_MIN + 6)),
                (16, compressed(FC_MIN)),
                (21, compressed(FC_MIN + 16)),
            ],
        );
        let fc = table_stream.len() as u32;
        word_document[0x1A2..0x1A6].copy_from_slice(&fc.to_le_bytes());
        word_document[0x1A6..0x1AA].copy_from_slice(&(clx.len() as u32).to_le_bytes());
        table_stream.extend(clx);
        (word_document, table_stream)
    }

    #[test]
    fn test_fast_saved_walk_follows_piece_order() {
        let (word_document, table_stream) = fast_saved_document();
        let doc = Document::parse(&word_document, &table_stream, &ParseOptions::default()).unwrap();

        let spans = doc.main_text_spans();
        assert_eq!(spans, vec![(FC_MIN + 6, FC_MIN + 16), (FC_MIN, FC_MIN + 6)]);
        let covered: u32 = spans.iter().map(|(start, end)| end - start).sum();
        assert_eq!(covered, doc.fib().ccp_text);
        assert_eq!(doc.main_text().unwrap(), "Item\rMore\rHello\r");

        let sections = doc.sections().unwrap();
        assert_eq!(sections.len(), 1);
        let section = &sections[0];
        assert_eq!(section.paragraphs.len(), 3);
        assert_eq!(section.text(), "1.\tItem\r2.\tMore\rHello\r");
        let hello = &section.paragraphs[2];
        assert_eq!((hello.start, hello.end), (FC_MIN, FC_MIN + 6));
        assert!(hello.runs[0].chp.bold);

        let header = doc.header_footer(HeaderFooterKind::HeaderOdd, 1).unwrap().unwrap();
        assert_eq!(header.text(), HEADER_TEXT);
    }
}
