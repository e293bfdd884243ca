//! Shared fixtures for integration tests

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use phiguard::phi::detector::{EntityRecognizer, RecognizedEntity, RecognizerRuntime};
use std::sync::Arc;

/// Build a PDF with one page per entry, each page holding the given lines
/// in 12pt Helvetica starting at (72, 700), 20pt apart
pub fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new("Td", vec![0.into(), (-20).into()]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}

/// Raw content of every stream referenced from a page's `Contents`
pub fn page_streams(bytes: &[u8], page_number: u32) -> Vec<Vec<u8>> {
    let doc = Document::load_mem(bytes).expect("load pdf");
    let page_id = doc.get_pages()[&page_number];
    let page = doc.get_dictionary(page_id).expect("page dictionary");

    let refs: Vec<Object> = match page.get(b"Contents").expect("contents") {
        Object::Array(items) => items.clone(),
        other => vec![other.clone()],
    };
    refs.iter()
        .map(|obj| {
            let id = obj.as_reference().expect("stream reference");
            let stream = doc.get_object(id).and_then(Object::as_stream).expect("stream");
            stream.content.clone()
        })
        .collect()
}

/// String operands of every `Tj` in a content stream
pub fn shown_strings(content: &[u8]) -> Vec<String> {
    let content = Content::decode(content).expect("decode content");
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

/// Recognizer labelling every occurrence of fixed words
pub struct FixedRecognizer {
    entities: Vec<(&'static str, &'static str)>,
}

impl FixedRecognizer {
    pub fn new(entities: &[(&'static str, &'static str)]) -> Self {
        Self {
            entities: entities.to_vec(),
        }
    }

    pub fn runtime(entities: &[(&'static str, &'static str)]) -> Arc<RecognizerRuntime> {
        Arc::new(RecognizerRuntime::with_recognizer(Arc::new(Self::new(
            entities,
        ))))
    }
}

impl EntityRecognizer for FixedRecognizer {
    fn name(&self) -> &str {
        "fixed"
    }

    fn recognize(&self, chunk: &str) -> anyhow::Result<Vec<RecognizedEntity>> {
        let mut found = Vec::new();
        for (label, word) in &self.entities {
            for (start, _) in chunk.match_indices(word) {
                found.push(RecognizedEntity::new(*label, *word, start, start + word.len()));
            }
        }
        Ok(found)
    }
}
