//! Single-page PDF documents built with `lopdf`.
//!
//! Pages use the two standard Helvetica faces in `WinAnsiEncoding`. Only
//! positioned text lines are supported.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::error::Result;

/// US letter width in points.
pub const PAGE_WIDTH: u32 = 612;

/// US letter height in points.
pub const PAGE_HEIGHT: u32 = 792;

/// Standard font faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Helvetica.
    Regular,
    /// Helvetica-Bold.
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TextLine {
    x: u32,
    y: u32,
    font: Font,
    size: u32,
    text: String,
}

impl TextLine {
    fn operations(&self) -> [Operation; 5] {
        [
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(self.font.resource().as_bytes().to_vec()),
                    Object::Integer(i64::from(self.size)),
                ],
            ),
            Operation::new(
                "Td",
                vec![
                    Object::Integer(i64::from(self.x)),
                    Object::Integer(i64::from(self.y)),
                ],
            ),
            Operation::new("Tj", vec![Object::string_literal(win_ansi(&self.text))]),
            Operation::new("ET", vec![]),
        ]
    }
}

/// A page of positioned text lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    lines: Vec<TextLine>,
}

impl Page {
    /// Create an empty page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a line of text with its baseline starting at `(x, y)`.
    pub fn text(
        &mut self,
        x: u32,
        y: u32,
        font: Font,
        size: u32,
        text: impl Into<String>,
    ) -> &mut Self {
        self.lines.push(TextLine {
            x,
            y,
            font,
            size,
            text: text.into(),
        });
        self
    }

    /// Build the page as a complete PDF 1.4 document.
    ///
    /// # Errors
    ///
    /// Returns an error if the content stream cannot be encoded or the
    /// document cannot be serialized.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let mut fonts = lopdf::Dictionary::new();
        for font in [Font::Regular, Font::Bold] {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource(), font_id);
        }
        let resources_id = doc.add_object(dictionary! { "Font" => fonts });

        let content: Content<Vec<Operation>> = Content {
            operations: self.lines.iter().flat_map(TextLine::operations).collect(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(i64::from(PAGE_WIDTH)),
                Object::Integer(i64::from(PAGE_HEIGHT)),
            ],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => Object::Integer(1),
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok(out)
    }
}

/// Encode text for a `WinAnsiEncoding` font.
///
/// Latin-1 characters map to the same byte; anything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{a0}'..='\u{ff}' => u8::try_from(c).unwrap_or(b'?'),
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Parse a PDF and return the font resource, position and text bytes of
    /// every line on its single page.
    pub(crate) fn page_lines(pdf: &[u8]) -> Vec<(String, i64, i64, Vec<u8>)> {
        let doc = Document::load_mem(pdf).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();

        let mut lines = Vec::new();
        let mut font = String::new();
        let mut position = (0, 0);
        for op in content.operations {
            match op.operator.as_str() {
                "Tf" => {
                    font = String::from_utf8_lossy(op.operands[0].as_name().unwrap()).into_owned();
                }
                "Td" => {
                    position = (
                        op.operands[0].as_i64().unwrap(),
                        op.operands[1].as_i64().unwrap(),
                    );
                }
                "Tj" => lines.push((
                    font.clone(),
                    position.0,
                    position.1,
                    op.operands[0].as_str().unwrap().to_vec(),
                )),
                _ => {}
            }
        }
        lines
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("a(b)c\\"), b"a(b)c\\");
        assert_eq!(win_ansi("Saúde"), b"Sa\xFAde");
        assert_eq!(win_ansi("criança"), b"crian\xE7a");
        assert_eq!(win_ansi("日本"), b"??");
        assert_eq!(win_ansi("tab\there"), b"tab?here");
    }

    #[test]
    fn test_document_parses_back() {
        let mut page = Page::new();
        page.text(100, 750, Font::Bold, 16, "Title")
            .text(100, 700, Font::Regular, 12, "Body (1)");
        let pdf = page.to_pdf().unwrap();

        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert_eq!(
            page_lines(&pdf),
            [
                ("F2".to_string(), 100, 750, b"Title".to_vec()),
                ("F1".to_string(), 100, 700, b"Body (1)".to_vec()),
            ]
        );
    }

    #[test]
    fn test_fonts_and_media_box() {
        let mut page = Page::new();
        page.text(10, 10, Font::Regular, 12, "x");
        let doc = Document::load_mem(&page.to_pdf().unwrap()).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let page_dict = doc.get_dictionary(page_id).unwrap();

        let media_box = page_dict.get(b"MediaBox").unwrap().as_array().unwrap();
        let media_box: Vec<i64> = media_box.iter().map(|o| o.as_i64().unwrap()).collect();
        assert_eq!(media_box, [0, 0, 612, 792]);

        let mut base_fonts: Vec<&[u8]> = doc
            .objects
            .values()
            .filter_map(|object| object.as_dict().ok())
            .filter_map(|dict| dict.get(b"BaseFont").ok())
            .map(|name| name.as_name().unwrap())
            .collect();
        base_fonts.sort_unstable();
        assert_eq!(base_fonts, [&b"Helvetica"[..], &b"Helvetica-Bold"[..]]);
    }

    #[test]
    fn test_empty_page_is_valid() {
        let pdf = Page::new().to_pdf().unwrap();
        assert!(page_lines(&pdf).is_empty());
    }
}
