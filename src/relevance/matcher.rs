use std::collections::HashMap;

use crate::dom::dom_model::{Document, NodeId, NodeKind};
use crate::relevance::synonyms;
use crate::summary::render;
use crate::summary::serializer::{self, SerializeOptions};

// ============================================================================
// Relevance matching — keyword-guided element discovery
// ============================================================================

/// Focused serialization covers at most this many matched elements.
pub const MAX_FOCUS_MATCHES: usize = 8;

/// Below this many chars a focused summary is not worth sending; fall back
/// to the whole page.
pub const FOCUSED_MIN_USEFUL: usize = 500;

/// Subtree text contributes at most this many chars to an element's
/// haystack. Keeps ancestor matching local: without a cap the outermost
/// wrapper would match every text hint on the page.
const HAYSTACK_TEXT_CAP: usize = 200;

const BLOCK_SEPARATOR: &str = "\n---\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMode {
    Focused,
    FullPage,
}

/// Summary text handed to the prompt builder, tagged with how it was built.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub mode: ContextMode,
    pub text: String,
}

/// Elements relevant to a free-text hint, in document order, highest
/// matching ancestor per cluster. Fresh walk per call.
pub fn find_relevant(doc: &Document, hint: &str) -> Vec<NodeId> {
    let tokens = synonyms::tokenize_hint(hint);
    if tokens.is_empty() {
        return Vec::new();
    }
    let keywords = synonyms::expand_keywords(&tokens);
    let subtree_text = collect_subtree_text(doc);

    let mut accepted: Vec<NodeId> = Vec::new();
    let mut accepted_paths: Vec<String> = Vec::new();
    for id in doc.elements() {
        let Some(el) = doc.element(id) else {
            continue;
        };
        if el.tag == "html" || el.tag == "body" || serializer::is_skipped_tag(&el.tag) {
            continue;
        }
        let haystack = build_haystack(doc, id, &subtree_text);
        if !keywords.iter().any(|k| haystack.contains(k.as_str())) {
            continue;
        }
        let path = doc.path_from_body(id);
        if covered_by(&accepted_paths, &path) {
            continue;
        }
        accepted.push(id);
        accepted_paths.push(path);
    }
    accepted
}

/// True when the path duplicates an accepted one or extends it (i.e. the
/// candidate is a descendant of an accepted element).
fn covered_by(accepted: &[String], path: &str) -> bool {
    accepted
        .iter()
        .any(|p| path == p || path.starts_with(&format!("{}>", p)))
}

fn build_haystack(doc: &Document, id: NodeId, subtree_text: &HashMap<NodeId, String>) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(text) = subtree_text.get(&id) {
        if !text.is_empty() {
            parts.push(text.clone());
        }
    }
    if let Some(el) = doc.element(id) {
        parts.push(el.tag.clone());
        for attr in ["class", "id", "aria-label", "role", "title", "placeholder"] {
            if let Some(value) = el.attrs.get(attr) {
                parts.push(value.clone());
            }
        }
        for (name, value) in &el.attrs {
            if name.starts_with("data-") {
                parts.push(name.clone());
                parts.push(value.clone());
            }
        }
    }
    parts.join(" ").to_lowercase()
}

/// Capped, lowercased subtree text per element, one bottom-up pass.
/// Skip-list subtrees (scripts, styles) contribute nothing.
fn collect_subtree_text(doc: &Document) -> HashMap<NodeId, String> {
    let mut map = HashMap::new();
    accumulate_text(doc, doc.body(), &mut map);
    map
}

fn accumulate_text(doc: &Document, id: NodeId, map: &mut HashMap<NodeId, String>) -> String {
    let mut pieces: Vec<String> = Vec::new();
    for child in doc.children(id) {
        match &doc.node(*child).kind {
            NodeKind::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    pieces.push(trimmed.to_string());
                }
            }
            NodeKind::Element(el) => {
                if serializer::is_skipped_tag(&el.tag) {
                    continue;
                }
                let child_text = accumulate_text(doc, *child, map);
                if !child_text.is_empty() {
                    pieces.push(child_text);
                }
            }
        }
    }
    let joined = pieces.join(" ");
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    let capped = serializer::clip(&collapsed, HAYSTACK_TEXT_CAP).to_lowercase();
    map.insert(id, capped.clone());
    capped
}

/// Serialize relaxed-bound context blocks around the first matches.
/// Returns an empty string when nothing matches.
pub fn serialize_focused(doc: &Document, hint: &str) -> String {
    let matches = find_relevant(doc, hint);
    let options = SerializeOptions::focused();

    let mut blocks: Vec<String> = Vec::new();
    let mut root_paths: Vec<String> = Vec::new();
    for id in matches.into_iter().take(MAX_FOCUS_MATCHES) {
        let root = context_root(doc, id);
        let path = doc.path_from_body(root);
        if covered_by(&root_paths, &path) {
            continue;
        }
        if let Some(tree) = serializer::serialize(doc, root, &options) {
            let rendered = render::render(&tree);
            if !rendered.is_empty() {
                blocks.push(rendered);
                root_paths.push(path);
            }
        }
    }
    blocks.join(BLOCK_SEPARATOR)
}

/// Grandparent unless that would reach body/html, then parent, then the
/// element itself.
fn context_root(doc: &Document, id: NodeId) -> NodeId {
    let structural = |candidate: &NodeId| {
        matches!(doc.tag(*candidate), Some("body") | Some("html")) || !doc.is_element(*candidate)
    };
    let Some(parent) = doc.parent(id).filter(|p| !structural(p)) else {
        return id;
    };
    match doc.parent(parent).filter(|gp| !structural(gp)) {
        Some(grandparent) => grandparent,
        None => parent,
    }
}

/// Context for the generation prompt: focused when the focused summary is
/// long enough to be useful, whole page otherwise. Always within the page
/// character budget.
pub fn page_context(doc: &Document, request: &str) -> PageContext {
    let focused = serialize_focused(doc, request);
    if focused.chars().count() >= FOCUSED_MIN_USEFUL {
        PageContext {
            mode: ContextMode::Focused,
            text: render::truncate_output(&focused, render::PAGE_CHAR_BUDGET),
        }
    } else {
        PageContext {
            mode: ContextMode::FullPage,
            text: render::summarize_page(doc),
        }
    }
}
