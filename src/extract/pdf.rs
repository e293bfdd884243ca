//! Word and coordinate extraction from PDF content streams
//!
//! Text positions are tracked through the text and graphics state operators
//! of each page's content stream. Glyph widths are not read from the fonts:
//! every character is assumed to be `0.55 × font size` wide, so word boxes
//! are approximate. Strings are decoded as UTF-16BE when they carry a byte
//! order mark and as Latin-1 otherwise; composite-font text may come out
//! garbled and will then simply not match any finding.

use crate::domain::{PhiError, Result};
use crate::phi::redactor::{media_box, number, BoundingBox, PageWords, Word};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};

// Average glyph width as a fraction of the font size
const CHAR_WIDTH_RATIO: f32 = 0.55;
// Glyph extent below and above the baseline, as fractions of the font size
const DESCENT_RATIO: f32 = 0.2;
const ASCENT_RATIO: f32 = 0.8;

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Extract words with approximate boxes from every page of `bytes`
///
/// A page whose content cannot be read is replaced by a placeholder page
/// with diagnostic text and no words; the rest of the document is still
/// extracted.
///
/// # Errors
///
/// [`PhiError::Extraction`] when the document itself cannot be parsed.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<PageWords>> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| PhiError::Extraction(format!("Failed to parse PDF: {e}")))?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(PhiError::Extraction("PDF has no pages".to_string()));
    }

    let mut extracted = Vec::with_capacity(pages.len());
    for (number, page_id) in pages {
        let page = match extract_page(&doc, number, page_id) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(page = number, error = %e, "Failed to extract page text; using placeholder");
                placeholder(&doc, number, page_id, &e)
            }
        };
        extracted.push(page);
    }

    tracing::debug!(
        pages = extracted.len(),
        words = extracted.iter().map(|p| p.words.len()).sum::<usize>(),
        "PDF text extracted"
    );
    Ok(extracted)
}

fn extract_page(doc: &Document, number: u32, page_id: ObjectId) -> Result<PageWords> {
    let (llx, lly, urx, ury) = media_box(doc, page_id);
    let data = doc
        .get_page_content(page_id)
        .map_err(|e| PhiError::Extraction(format!("Unreadable content stream: {e}")))?;
    let content = Content::decode(&data)
        .map_err(|e| PhiError::Extraction(format!("Malformed content stream: {e}")))?;

    let mut walker = TextWalker::new(PageWords::new(number, urx - llx, ury - lly), llx, ury);
    for op in &content.operations {
        walker.apply(op);
    }
    Ok(walker.page)
}

fn placeholder(doc: &Document, number: u32, page_id: ObjectId, error: &PhiError) -> PageWords {
    let (llx, lly, urx, ury) = media_box(doc, page_id);
    let mut page = PageWords::new(number, urx - llx, ury - lly);
    page.text = format!("[Page {number} could not be read: {error}]");
    page
}

/// Interprets text-related operators and emits positioned words
struct TextWalker {
    page: PageWords,
    // Top-left corner of the page in user space
    origin_x: f32,
    top_y: f32,
    ctm: Matrix,
    saved: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_size: f32,
    leading: f32,
    last_baseline: Option<f32>,
}

impl TextWalker {
    fn new(page: PageWords, origin_x: f32, top_y: f32) -> Self {
        Self {
            page,
            origin_x,
            top_y,
            ctm: IDENTITY,
            saved: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            font_size: 12.0,
            leading: 0.0,
            last_baseline: None,
        }
    }

    fn apply(&mut self, op: &Operation) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.saved.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.saved.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = matrix(operands) {
                    self.ctm = multiply(&m, &self.ctm);
                }
            }
            "BT" => {
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(number) {
                    self.font_size = size.abs();
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    self.leading = leading;
                }
            }
            "Tm" => {
                if let Some(m) = matrix(operands) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ) {
                    if op.operator == "TD" {
                        self.leading = -ty;
                    }
                    self.next_line(tx, ty);
                }
            }
            "T*" => self.next_line(0.0, -self.leading),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "'" => {
                self.next_line(0.0, -self.leading);
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "\"" => {
                self.next_line(0.0, -self.leading);
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show(bytes),
                            other => {
                                if let Some(adjust) = number(other) {
                                    self.advance(-adjust / 1000.0 * self.font_size);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        let translated = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.line_matrix = translated;
        self.text_matrix = translated;
    }

    /// Move the text position along the baseline by `dx` text-space units
    fn advance(&mut self, dx: f32) {
        self.text_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, dx, 0.0], &self.text_matrix);
    }

    fn show(&mut self, bytes: &[u8]) {
        let text = decode(bytes);
        let rendering = multiply(&self.text_matrix, &self.ctm);
        let scale_x = (rendering[0].powi(2) + rendering[1].powi(2)).sqrt();
        let scale_y = (rendering[2].powi(2) + rendering[3].powi(2)).sqrt();
        let size = self.font_size * scale_y;
        let char_width = self.font_size * CHAR_WIDTH_RATIO;
        let (start_x, baseline) = (rendering[4], rendering[5]);

        if self
            .last_baseline
            .is_some_and(|previous| (previous - baseline).abs() > size * 0.5)
        {
            self.page.break_line();
        }
        self.last_baseline = Some(baseline);

        let top = self.top_y - (baseline + size * ASCENT_RATIO);
        let bottom = self.top_y - (baseline - size * DESCENT_RATIO);
        let mut offset = 0usize;
        for (index, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                self.push_word(&text, offset, index, start_x, char_width * scale_x, top, bottom);
                offset = index + 1;
            }
        }
        let total = text.chars().count();
        self.push_word(&text, offset, total, start_x, char_width * scale_x, top, bottom);

        self.advance(char_width * total as f32);
    }

    #[allow(clippy::too_many_arguments)]
    fn push_word(
        &mut self,
        text: &str,
        from: usize,
        to: usize,
        start_x: f32,
        char_width: f32,
        top: f32,
        bottom: f32,
    ) {
        if from >= to {
            return;
        }
        let word: String = text.chars().skip(from).take(to - from).collect();
        let x0 = start_x - self.origin_x + char_width * from as f32;
        let x1 = start_x - self.origin_x + char_width * to as f32;
        self.page
            .push_word(Word::new(word, BoundingBox::new(x0, top, x1, bottom)));
    }
}

fn matrix(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (slot, operand) in m.iter_mut().zip(operands) {
        *slot = number(operand)?;
    }
    Some(m)
}

/// `a × b` for PDF's row-vector affine matrices
fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
        a[4] * b[0] + a[5] * b[2] + b[4],
        a[4] * b[1] + a[5] * b[3] + b[5],
    ]
}

fn decode(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn pdf(pages: &[Vec<Operation>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in pages {
            let content = Content {
                operations: operations.clone(),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => kids.len() as i64,
                "Kids" => kids,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn text_at(x: i64, y: i64, text: &str) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]
    }

    #[test]
    fn test_words_and_boxes() {
        let pages = extract_pages(&pdf(&[text_at(100, 700, "Patient Alice")])).unwrap();
        assert_eq!(pages.len(), 1);

        let page = &pages[0];
        assert_eq!((page.width, page.height), (612.0, 792.0));
        assert_eq!(page.text, "Patient Alice");
        assert_eq!(page.words.len(), 2);

        let alice = &page.words[1];
        assert_eq!(alice.text, "Alice");
        // "Patient " is 8 chars at 5.5 units each
        assert!((alice.bbox.x0 - 144.0).abs() < 0.01);
        assert!((alice.bbox.x1 - 171.5).abs() < 0.01);
        // Baseline at 700 from the bottom is 92 from the top
        assert!((alice.bbox.top - 84.0).abs() < 0.01);
        assert!((alice.bbox.bottom - 94.0).abs() < 0.01);
    }

    #[test]
    fn test_lines_are_separated() {
        let mut ops = text_at(72, 700, "Name: Alice");
        ops.extend(text_at(72, 680, "SSN: 123-45-6789"));
        let pages = extract_pages(&pdf(&[ops])).unwrap();
        assert_eq!(pages[0].text, "Name: Alice\nSSN: 123-45-6789");
    }

    #[test]
    fn test_tj_array_spacing() {
        let ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Td", vec![0.into(), 700.into()]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Bob"),
                    Object::Integer(-1000),
                    Object::string_literal(" Jones"),
                ])],
            ),
            Operation::new("ET", vec![]),
        ];
        let pages = extract_pages(&pdf(&[ops])).unwrap();
        let jones = pages[0].words.iter().find(|w| w.text == "Jones").unwrap();
        // 3 chars, a 10-unit kern, then one space
        assert!((jones.bbox.x0 - (16.5 + 10.0 + 5.5)).abs() < 0.01);
    }

    #[test]
    fn test_multiple_pages_in_order() {
        let pages = extract_pages(&pdf(&[text_at(72, 700, "first"), text_at(72, 700, "second")])).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[1].text, "second");
    }

    #[test]
    fn test_unparseable_document() {
        let err = extract_pages(b"%PDF-1.5 garbage").unwrap_err();
        assert!(matches!(err, PhiError::Extraction(_)));
    }

    #[test]
    fn test_placeholder_keeps_page_geometry() {
        let bytes = pdf(&[text_at(72, 700, "x")]);
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();

        let page = placeholder(&doc, 1, page_id, &PhiError::Extraction("bad stream".into()));
        assert!(page.words.is_empty());
        assert_eq!(page.height, 792.0);
        assert!(page.text.starts_with("[Page 1 could not be read"));
    }

    #[test]
    fn test_utf16_strings() {
        assert_eq!(decode(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0xE9]), "Aé");
        assert_eq!(decode(b"plain"), "plain");
    }

    #[test]
    fn test_matrix_multiply_translation() {
        let scaled = multiply(&[1.0, 0.0, 0.0, 1.0, 10.0, 20.0], &[2.0, 0.0, 0.0, 2.0, 5.0, 5.0]);
        assert_eq!(scaled, [2.0, 0.0, 0.0, 2.0, 25.0, 45.0]);
    }
}
