//! Paragraph text from `.docx` containers

use crate::domain::{PhiError, Result};
use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::OnceLock;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

static PARAGRAPH: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
static RUN_CONTENT: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
static ENTITY: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

/// Extract paragraph text, one paragraph per line
///
/// Only the main document part is read. Text runs, tabs and explicit line
/// breaks are kept; headers, footers, comments and text boxes are not.
///
/// # Errors
///
/// [`PhiError::Extraction`] when the container or its document part cannot
/// be read.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PhiError::Extraction(format!("Not a DOCX container: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| PhiError::Extraction(format!("Missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| PhiError::Extraction(format!("Unreadable {DOCUMENT_PART}: {e}")))?;

    paragraphs_from_xml(&xml)
}

/// Paragraph text of a WordprocessingML document body
pub fn paragraphs_from_xml(xml: &str) -> Result<String> {
    let paragraph = compiled(&PARAGRAPH, r"(?s)<w:p[ >].*?</w:p>|<w:p/>")?;
    let run_content = compiled(
        &RUN_CONTENT,
        r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:tab/>|<w:br/>|<w:cr/>",
    )?;
    let entity = compiled(
        &ENTITY,
        r"&(?:#([0-9]{1,7})|#[xX]([0-9A-Fa-f]{1,6})|(lt|gt|quot|apos|amp));",
    )?;

    let mut text = String::new();
    let mut count = 0usize;
    for para in paragraph.find_iter(xml) {
        for caps in run_content.captures_iter(para.as_str()) {
            match caps.get(1) {
                Some(run) => text.push_str(&unescape(entity, run.as_str())),
                None if caps[0].starts_with("<w:tab") => text.push('\t'),
                None => text.push('\n'),
            }
        }
        text.push('\n');
        count += 1;
    }

    tracing::debug!(paragraphs = count, chars = text.len(), "DOCX text extracted");
    Ok(text)
}

fn compiled(
    cell: &'static OnceLock<std::result::Result<Regex, regex::Error>>,
    pattern: &str,
) -> Result<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|e| PhiError::Extraction(format!("Invalid DOCX pattern: {e}")))
}

/// Decode named and numeric character references in one pass
///
/// References that do not name a valid scalar value are kept verbatim.
fn unescape(entity: &Regex, text: &str) -> String {
    entity
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let code = match (caps.get(1), caps.get(2)) {
                (Some(dec), _) => dec.as_str().parse::<u32>().ok(),
                (None, Some(hex)) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (None, None) => None,
            };
            if let Some(code) = code {
                return char::from_u32(code).map_or_else(|| caps[0].to_string(), String::from);
            }
            match caps.get(3).map(|name| name.as_str()) {
                Some("lt") => "<".to_string(),
                Some("gt") => ">".to_string(),
                Some("quot") => "\"".to_string(),
                Some("apos") => "'".to_string(),
                Some("amp") => "&".to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}
