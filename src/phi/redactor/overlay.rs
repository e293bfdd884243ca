//! Overlay content-stream construction

use super::layout::BoundingBox;
use crate::phi::models::HandlingPolicy;
use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

/// Resource name under which the overlay font is registered on each page
pub const OVERLAY_FONT: &str = "PhiGuardF1";

const FOOTER_FONT_SIZE: f32 = 8.0;
const FOOTER_MARGIN: f32 = 10.0;
const MAX_LABEL_FONT_SIZE: f32 = 10.0;
// Average Helvetica glyph width as a fraction of the font size
const GLYPH_WIDTH_RATIO: f32 = 0.55;

type Rgb = (f32, f32, f32);

const BLACK: Rgb = (0.0, 0.0, 0.0);
const WHITE: Rgb = (1.0, 1.0, 1.0);
const BLUE: Rgb = (0.0, 0.0, 1.0);
const GREY: Rgb = (0.4, 0.4, 0.4);

/// Page geometry needed to place top-left boxes in PDF user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Lower-left corner of the media box
    pub origin_x: f32,
    pub origin_y: f32,
    pub height: f32,
}

impl PageFrame {
    pub fn new(origin_x: f32, origin_y: f32, height: f32) -> Self {
        Self {
            origin_x,
            origin_y,
            height,
        }
    }

    /// `(x, y, width, height)` of a box in PDF coordinates (bottom-left origin)
    pub fn to_pdf_rect(&self, bbox: &BoundingBox) -> (f32, f32, f32, f32) {
        (
            self.origin_x + bbox.x0,
            self.origin_y + (self.height - bbox.bottom),
            bbox.width(),
            bbox.height(),
        )
    }
}

/// Accumulates overlay drawing operations for one page
pub struct OverlayBuilder {
    frame: PageFrame,
    policy: HandlingPolicy,
    operations: Vec<Operation>,
    painted: usize,
}

impl OverlayBuilder {
    pub fn new(frame: PageFrame, policy: HandlingPolicy) -> Self {
        Self {
            frame,
            policy,
            operations: Vec::new(),
            painted: 0,
        }
    }

    /// Paint one box with the policy's treatment
    ///
    /// `label` is the text drawn inside the box: the marker for `redact`,
    /// the token for `tokenize`, ignored for `remove`.
    pub fn paint(&mut self, bbox: &BoundingBox, label: Option<&str>) {
        let rect = self.frame.to_pdf_rect(bbox);
        let (fill, text_color) = match self.policy {
            HandlingPolicy::Redact => (BLACK, Some(WHITE)),
            HandlingPolicy::Tokenize => (WHITE, Some(BLUE)),
            HandlingPolicy::Remove => (WHITE, None),
        };

        self.fill_rect(rect, fill);
        if let (Some(color), Some(label)) = (text_color, label) {
            self.label(rect, label, color);
        }
        self.painted += 1;
    }

    /// Boxes painted so far
    pub fn painted(&self) -> usize {
        self.painted
    }

    /// Finish the overlay with the footer annotation
    pub fn finish(mut self) -> Vec<Operation> {
        let footer = format!(
            "PHI handling: {} | {} redaction(s) on this page",
            self.policy, self.painted
        );
        let x = self.frame.origin_x + FOOTER_MARGIN;
        let y = self.frame.origin_y + FOOTER_MARGIN;
        self.text(x, y, FOOTER_FONT_SIZE, &footer, GREY);
        self.operations
    }

    fn fill_rect(&mut self, (x, y, w, h): (f32, f32, f32, f32), (r, g, b): Rgb) {
        self.operations.extend([
            Operation::new("rg", reals(&[r, g, b])),
            Operation::new("re", reals(&[x, y, w, h])),
            Operation::new("f", vec![]),
        ]);
    }

    fn label(&mut self, (x, y, w, h): (f32, f32, f32, f32), label: &str, color: Rgb) {
        let size = fit_font_size(label, w, h);
        let baseline = y + (h - size) / 2.0 + size * 0.2;
        self.text(x + 1.0, baseline, size, label, color);
    }

    fn text(&mut self, x: f32, y: f32, size: f32, text: &str, (r, g, b): Rgb) {
        self.operations.extend([
            Operation::new("rg", reals(&[r, g, b])),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(OVERLAY_FONT.as_bytes().to_vec()), Object::Real(size)]),
            Operation::new("Td", reals(&[x, y])),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }
}

/// Encode `text` for the overlay font's WinAnsiEncoding
///
/// Characters outside the encoding become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
        _ => match c {
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02C6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02DC}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            _ => b'?',
        },
    }
}

fn reals(values: &[f32]) -> Vec<Object> {
    values.iter().copied().map(Object::Real).collect()
}

/// Largest font size (capped) at which `text` fits inside a `w` x `h` box
fn fit_font_size(text: &str, w: f32, h: f32) -> f32 {
    let chars = text.chars().count().max(1) as f32;
    let by_width = (w - 2.0).max(1.0) / (chars * GLYPH_WIDTH_RATIO);
    let by_height = h * 0.75;
    by_width.min(by_height).min(MAX_LABEL_FONT_SIZE).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operators(ops: &[Operation]) -> Vec<&str> {
        ops.iter().map(|op| op.operator.as_str()).collect()
    }

    fn shown_text(ops: &[Operation]) -> Vec<String> {
        ops.iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            })
            .collect()
    }

    fn numbers(op: &Operation) -> Vec<f32> {
        op.operands
            .iter()
            .filter_map(|o| match o {
                Object::Real(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_top_left_to_pdf_coordinates() {
        let frame = PageFrame::new(0.0, 0.0, 792.0);
        let rect = frame.to_pdf_rect(&BoundingBox::new(100.0, 700.0, 130.0, 712.0));
        assert_eq!(rect, (100.0, 80.0, 30.0, 12.0));

        let shifted = PageFrame::new(5.0, 10.0, 792.0);
        assert_eq!(
            shifted.to_pdf_rect(&BoundingBox::new(0.0, 0.0, 10.0, 10.0)),
            (5.0, 792.0, 10.0, 10.0)
        );
    }

    #[test]
    fn test_redact_draws_dark_box_with_marker() {
        let mut overlay = OverlayBuilder::new(PageFrame::new(0.0, 0.0, 100.0), HandlingPolicy::Redact);
        overlay.paint(&BoundingBox::new(10.0, 10.0, 90.0, 24.0), Some("[REDACTED]"));
        let ops = overlay.finish();

        assert_eq!(&operators(&ops)[..3], &["rg", "re", "f"]);
        assert_eq!(numbers(&ops[0]), vec![0.0, 0.0, 0.0]);
        assert_eq!(numbers(&ops[1]), vec![10.0, 76.0, 80.0, 14.0]);
        assert_eq!(shown_text(&ops)[0], "[REDACTED]");
    }

    #[test]
    fn test_remove_draws_no_label() {
        let mut overlay = OverlayBuilder::new(PageFrame::new(0.0, 0.0, 100.0), HandlingPolicy::Remove);
        overlay.paint(&BoundingBox::new(10.0, 10.0, 40.0, 24.0), Some("ignored"));
        let ops = overlay.finish();

        // Only the footer is shown
        assert_eq!(shown_text(&ops).len(), 1);
        assert_eq!(numbers(&ops[0]), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_footer_counts_redactions() {
        let mut overlay = OverlayBuilder::new(PageFrame::new(0.0, 0.0, 100.0), HandlingPolicy::Tokenize);
        overlay.paint(&BoundingBox::new(1.0, 1.0, 20.0, 10.0), Some("aB3dE"));
        overlay.paint(&BoundingBox::new(30.0, 1.0, 50.0, 10.0), Some("Xy9"));
        assert_eq!(overlay.painted(), 2);

        let shown = shown_text(&overlay.finish());
        assert_eq!(shown[..2], ["aB3dE".to_string(), "Xy9".to_string()]);
        assert_eq!(shown[2], "PHI handling: tokenize | 2 redaction(s) on this page");
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("[REDACTED]"), b"[REDACTED]".to_vec());
        assert_eq!(encode_win_ansi("Caf\u{e9} \u{20ac}5"), vec![b'C', b'a', b'f', 0xE9, b' ', 0x80, b'5']);
        assert_eq!(encode_win_ansi("\u{2014}"), vec![0x97]);
        assert_eq!(encode_win_ansi("[\u{5220}\u{9664}]"), b"[??]".to_vec());
        // Control characters have no glyph
        assert_eq!(encode_win_ansi("a\nb"), b"a?b".to_vec());
    }

    #[test]
    fn test_non_latin_marker_is_transcoded() {
        let mut overlay = OverlayBuilder::new(PageFrame::new(0.0, 0.0, 100.0), HandlingPolicy::Redact);
        overlay.paint(&BoundingBox::new(10.0, 10.0, 90.0, 24.0), Some("[\u{00c9}CART\u{00c9} \u{2192}]"));
        let ops = overlay.finish();

        let tj = ops.iter().find(|op| op.operator == "Tj").unwrap();
        match &tj.operands[0] {
            Object::String(bytes, _) => assert_eq!(bytes, &[b'[', 0xC9, b'C', b'A', b'R', b'T', 0xC9, b' ', b'?', b']']),
            other => panic!("unexpected operand: {other:?}"),
        }
    }

    #[test]
    fn test_font_size_fits_box() {
        let size = fit_font_size("[REDACTED]", 30.0, 12.0);
        assert!(size * 0.55 * 10.0 <= 30.0);
        assert_eq!(fit_font_size("ab", 200.0, 100.0), MAX_LABEL_FONT_SIZE);
    }
}
