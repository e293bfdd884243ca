//! Position-aware page redaction
//!
//! Maps findings back onto word boxes of a paginated document and composites
//! a per-page overlay on top of the original content. The original content
//! streams are kept untouched and wrapped in a saved graphics state; the
//! overlay is appended after them, so it is painted last.
//!
//! The whole output document is built in memory and only returned once it
//! has been serialized successfully. On any failure the caller receives a
//! [`PhiError::RedactionFailure`] and no bytes.

pub mod layout;
pub mod overlay;

pub use layout::{match_words, BoundingBox, MatchedBox, PageWords, Word};
pub use overlay::{OverlayBuilder, PageFrame, OVERLAY_FONT};

use crate::domain::{PhiError, Result};
use crate::phi::models::{FindingsMap, HandlingPolicy};
use crate::phi::transform::{TokenMode, TokenVault, DEFAULT_FIXED_TOKEN_LENGTH, DEFAULT_MARKER};
use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Default padding added around each matched word box
pub const DEFAULT_BOX_PADDING: f32 = 2.0;

/// Findings shorter than this many characters are not painted
pub const DEFAULT_MIN_MATCH_LENGTH: usize = 3;

const LETTER: (f32, f32, f32, f32) = (0.0, 0.0, 612.0, 792.0);
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Output of a page redaction
#[derive(Debug, Clone)]
pub struct RedactedDocument {
    /// Serialized document
    pub bytes: Vec<u8>,
    /// Boxes painted per page, in page order
    pub redactions_per_page: Vec<usize>,
    /// True when nothing matched and `bytes` is the unmodified input
    pub passthrough: bool,
}

impl RedactedDocument {
    /// Total boxes painted across all pages
    pub fn total_redactions(&self) -> usize {
        self.redactions_per_page.iter().sum()
    }
}

/// Paints redaction overlays onto PDF pages
#[derive(Debug, Clone)]
pub struct PageRedactor {
    marker: String,
    padding: f32,
    min_match_length: usize,
    token_mode: TokenMode,
    fixed_token_length: usize,
}

impl PageRedactor {
    /// Create a redactor with default marker, padding and minimum length
    pub fn new() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            padding: DEFAULT_BOX_PADDING,
            min_match_length: DEFAULT_MIN_MATCH_LENGTH,
            token_mode: TokenMode::MatchLength,
            fixed_token_length: DEFAULT_FIXED_TOKEN_LENGTH,
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding.max(0.0);
        self
    }

    pub fn with_min_match_length(mut self, min_match_length: usize) -> Self {
        self.min_match_length = min_match_length;
        self
    }

    pub fn with_token_mode(mut self, mode: TokenMode, fixed_length: usize) -> Self {
        self.token_mode = mode;
        self.fixed_token_length = fixed_length;
        self
    }

    /// Redact `source` using the extracted `pages`
    ///
    /// `pages` must describe every page of `source`, in order. When no word
    /// on any page matches an eligible finding the input bytes are returned
    /// unchanged.
    pub fn redact(
        &self,
        source: &[u8],
        pages: &[PageWords],
        findings: &FindingsMap,
        policy: HandlingPolicy,
    ) -> Result<RedactedDocument> {
        let substrings = findings.substrings_longest_first();
        let matches: Vec<Vec<MatchedBox>> = pages
            .iter()
            .map(|page| match_words(page, &substrings, self.min_match_length, self.padding))
            .collect();

        if matches.iter().all(Vec::is_empty) {
            tracing::debug!(pages = pages.len(), "No word matched any finding; passing document through");
            return Ok(RedactedDocument {
                bytes: source.to_vec(),
                redactions_per_page: vec![0; pages.len()],
                passthrough: true,
            });
        }

        let mut doc = Document::load_mem(source)
            .map_err(|e| PhiError::RedactionFailure(format!("Failed to load document: {e}")))?;
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.len() != pages.len() {
            return Err(PhiError::RedactionFailure(format!(
                "Document has {} pages but {} were extracted",
                page_ids.len(),
                pages.len()
            )));
        }

        let font_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Font".to_vec()),
            "Subtype" => Object::Name(b"Type1".to_vec()),
            "BaseFont" => Object::Name(b"Helvetica".to_vec()),
            "Encoding" => Object::Name(b"WinAnsiEncoding".to_vec()),
        });

        let mut vault = TokenVault::new(self.token_mode, self.fixed_token_length);
        let mut redactions_per_page = Vec::with_capacity(pages.len());

        for ((page, page_id), boxes) in pages.iter().zip(page_ids).zip(matches) {
            let (llx, lly, _, _) = media_box(&doc, page_id);
            let mut overlay = OverlayBuilder::new(PageFrame::new(llx, lly, page.height), policy);

            for matched in &boxes {
                let label = match policy {
                    HandlingPolicy::Redact => Some(self.marker.clone()),
                    HandlingPolicy::Tokenize => Some(vault.token_for(&matched.finding)),
                    HandlingPolicy::Remove => None,
                };
                overlay.paint(&matched.bbox, label.as_deref());
            }

            redactions_per_page.push(overlay.painted());
            install_overlay(&mut doc, page_id, font_id, overlay)?;
            tracing::debug!(page = page.number, redactions = boxes.len(), "Page overlay composited");
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| PhiError::RedactionFailure(format!("Failed to write document: {e}")))?;

        Ok(RedactedDocument {
            bytes,
            redactions_per_page,
            passthrough: false,
        })
    }
}

impl Default for PageRedactor {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap the page's existing content and append the overlay stream
fn install_overlay(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    overlay: OverlayBuilder,
) -> Result<()> {
    let mut operations = vec![lopdf::content::Operation::new("q", vec![])];
    operations.extend(overlay.finish());
    operations.push(lopdf::content::Operation::new("Q", vec![]));
    let encoded = Content { operations }
        .encode()
        .map_err(|e| PhiError::RedactionFailure(format!("Failed to encode overlay: {e}")))?;

    let mut closing = b"Q\n".to_vec();
    closing.extend(encoded);

    let original = original_contents(doc, page_id)?;
    let resources = resources_with_font(doc, page_id, font_id);

    let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let close_id = doc.add_object(Stream::new(Dictionary::new(), closing));

    let mut contents = Vec::with_capacity(original.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(original);
    contents.push(Object::Reference(close_id));

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PhiError::RedactionFailure(format!("Page object is not a dictionary: {e}")))?;
    page.set("Contents", Object::Array(contents));
    page.set("Resources", Object::Dictionary(resources));

    Ok(())
}

/// References to the page's current content streams
fn original_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| PhiError::RedactionFailure(format!("Missing page dictionary: {e}")))?;

    let contents = match page.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => Ok(items.clone()),
            Ok(Object::Stream(_)) => Ok(vec![Object::Reference(*id)]),
            _ => Err(PhiError::RedactionFailure(
                "Page contents reference is not a stream".to_string(),
            )),
        },
        Object::Array(items) => Ok(items.clone()),
        _ => Err(PhiError::RedactionFailure(
            "Unsupported page contents object".to_string(),
        )),
    }
}

/// Effective page resources with the overlay font registered
fn resources_with_font(doc: &Document, page_id: ObjectId, font_id: ObjectId) -> Dictionary {
    let mut resources = inherited(doc, page_id, b"Resources")
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new);

    let mut fonts = resources
        .get(b"Font")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new);

    fonts.set(OVERLAY_FONT, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));
    resources
}

/// Page attribute, following the `Parent` chain for inheritable keys
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// `(llx, lly, urx, ury)` of the page, Letter when absent or malformed
pub(crate) fn media_box(doc: &Document, page_id: ObjectId) -> (f32, f32, f32, f32) {
    let values: Option<Vec<f32>> = inherited(doc, page_id, b"MediaBox").and_then(|obj| {
        let array = resolve(doc, obj)?.as_array().ok()?;
        array.iter().map(number).collect()
    });

    match values.as_deref() {
        Some([llx, lly, urx, ury]) => (*llx, *lly, *urx, *ury),
        _ => {
            tracing::warn!(?page_id, "Page has no usable MediaBox; assuming Letter");
            LETTER
        }
    }
}

pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phi::models::PhiCategory;

    fn one_page_pdf(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let content = Content {
            operations: vec![
                lopdf::content::Operation::new("BT", vec![]),
                lopdf::content::Operation::new("Tf", vec!["F1".into(), 12.into()]),
                lopdf::content::Operation::new("Td", vec![100.into(), 700.into()]),
                lopdf::content::Operation::new("Tj", vec![Object::string_literal(text)]),
                lopdf::content::Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
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

    fn page_with_alice() -> PageWords {
        let mut page = PageWords::new(1, 612.0, 792.0);
        page.push_word(Word::new("Alice", BoundingBox::new(100.0, 80.0, 136.0, 92.0)));
        page
    }

    fn alice_findings() -> FindingsMap {
        [(PhiCategory::Name, "Alice".to_string())].into_iter().collect()
    }

    #[test]
    fn test_no_match_is_byte_identical() {
        let source = one_page_pdf("Nothing to see");
        let out = PageRedactor::new()
            .redact(&source, &[page_with_alice()], &FindingsMap::new(), HandlingPolicy::Redact)
            .unwrap();
        assert!(out.passthrough);
        assert_eq!(out.bytes, source);
    }

    #[test]
    fn test_overlay_appended_after_original_content() {
        let source = one_page_pdf("Alice");
        let out = PageRedactor::new()
            .redact(&source, &[page_with_alice()], &alice_findings(), HandlingPolicy::Redact)
            .unwrap();
        assert!(!out.passthrough);
        assert_eq!(out.redactions_per_page, vec![1]);

        let doc = Document::load_mem(&out.bytes).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        let text = String::from_utf8_lossy(&content);

        let original = text.find("(Alice) Tj").unwrap();
        let marker = text.find("([REDACTED]) Tj").unwrap();
        assert!(original < marker);
        assert!(text.contains("PhiGuardF1"));
    }

    #[test]
    fn test_page_count_mismatch_fails() {
        let source = one_page_pdf("Alice");
        let pages = vec![page_with_alice(), page_with_alice()];
        let err = PageRedactor::new()
            .redact(&source, &pages, &alice_findings(), HandlingPolicy::Remove)
            .unwrap_err();
        assert!(matches!(err, PhiError::RedactionFailure(_)));
    }

    #[test]
    fn test_unreadable_source_fails() {
        let err = PageRedactor::new()
            .redact(b"not a pdf", &[page_with_alice()], &alice_findings(), HandlingPolicy::Redact)
            .unwrap_err();
        assert!(matches!(err, PhiError::RedactionFailure(_)));
    }

    #[test]
    fn test_media_box_inherited_from_parent() {
        let doc = Document::load_mem(&one_page_pdf("x")).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        assert_eq!(media_box(&doc, page_id), (0.0, 0.0, 612.0, 792.0));
    }
}
