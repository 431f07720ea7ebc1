use std::fs;
use std::path::Path;

use scraper::{ElementRef, Html, Selector};

use crate::dom::dom_model::{Document, NodeId};
use crate::error::EngineError;

// ============================================================================
// HTML ingestion
// ============================================================================

/// Parse an HTML document into the arena model. The walk starts at `<body>`;
/// head content is represented only by the captured title.
pub fn parse_html(html: &str, url: &str) -> Document {
    let parsed = Html::parse_document(html);
    let mut doc = Document::new(url, "");

    let title_selector = Selector::parse("title").unwrap();
    if let Some(title) = parsed.select(&title_selector).next() {
        doc.title = title.text().collect::<String>().trim().to_string();
    }

    let body_selector = Selector::parse("body").unwrap();
    if let Some(body) = parsed.select(&body_selector).next() {
        let target = doc.body();
        for (name, value) in body.value().attrs() {
            let _ = doc.set_attribute(target, name, value);
        }
        convert_children(&mut doc, target, body);
    }

    doc
}

/// Read a page from disk. Fixture pages carry no origin, so the caller
/// supplies the URL they stand in for.
pub fn load_page(path: &Path, url: &str) -> Result<Document, EngineError> {
    let html = fs::read_to_string(path).map_err(|e| EngineError::PageRead {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(parse_html(&html, url))
}

fn convert_children(doc: &mut Document, parent: NodeId, element: ElementRef) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            if !text.trim().is_empty() {
                doc.append_text(parent, text);
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let attrs: Vec<(&str, &str)> = child_element.value().attrs().collect();
            let node = doc.append_element(parent, child_element.value().name(), &attrs);
            convert_children(doc, node, child_element);
        }
    }
}
