use indexmap::IndexMap;

use crate::dom::dom_model::{Document, NodeId};
use crate::dom::style;
use crate::selector::generated::{is_generated_class, is_volatile_data_attr};

// ============================================================================
// DOM serialization
// ============================================================================

pub const DEFAULT_MAX_DEPTH: usize = 10;
pub const DEFAULT_MAX_CHILDREN: usize = 20;
pub const DEFAULT_MAX_TEXT: usize = 50;

const MAX_CLASSES: usize = 5;
const MAX_DATA_VALUE: usize = 30;
const MAX_ARIA_LABEL: usize = 50;
const MAX_HREF: usize = 100;

/// Tags that never contribute signal to a page summary: non-rendering
/// machinery and svg internals. The `svg` element itself stays as a marker.
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "meta", "link", "base", "head", "title",
    "iframe", "object", "embed", "source", "track", "path", "g", "defs", "use", "symbol",
    "mask", "pattern", "clippath", "lineargradient", "radialgradient", "stop",
];

#[derive(Debug, Clone, Copy)]
pub struct SerializeOptions {
    pub max_depth: usize,
    pub max_children: usize,
    pub max_text: usize,
    pub include_hidden: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            max_children: DEFAULT_MAX_CHILDREN,
            max_text: DEFAULT_MAX_TEXT,
            include_hidden: false,
        }
    }
}

impl SerializeOptions {
    /// Relaxed bounds for focused context blocks.
    pub fn focused() -> Self {
        SerializeOptions {
            max_depth: 5,
            max_children: 15,
            ..SerializeOptions::default()
        }
    }
}

/// Lossy, size-bounded projection of one element. Built fresh per call,
/// never mutated, discarded after rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedNode {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub data_attrs: IndexMap<String, String>,
    pub aria_label: Option<String>,
    pub role: Option<String>,
    pub href: Option<String>,
    pub text: Option<String>,
    pub children: Vec<SerializedNode>,
}

pub fn is_skipped_tag(tag: &str) -> bool {
    SKIP_TAGS.contains(&tag)
}

/// Serialize a subtree. Returns None for skip-list tags, for elements past
/// the depth bound, and for hidden elements unless `include_hidden`.
pub fn serialize(doc: &Document, root: NodeId, options: &SerializeOptions) -> Option<SerializedNode> {
    serialize_at(doc, root, 0, options)
}

fn serialize_at(
    doc: &Document,
    id: NodeId,
    depth: usize,
    options: &SerializeOptions,
) -> Option<SerializedNode> {
    if depth > options.max_depth {
        return None;
    }
    let el = doc.element(id)?;
    if is_skipped_tag(&el.tag) {
        return None;
    }
    if !options.include_hidden && style::is_render_hidden(doc, id) {
        return None;
    }

    let el_id = el.attrs.get("id").filter(|v| !v.is_empty()).cloned();

    let classes: Vec<String> = doc
        .classes(id)
        .into_iter()
        .filter(|c| !is_generated_class(c))
        .take(MAX_CLASSES)
        .map(|c| c.to_string())
        .collect();

    let mut data_attrs = IndexMap::new();
    for (name, value) in &el.attrs {
        if name.starts_with("data-") && !is_volatile_data_attr(name) {
            data_attrs.insert(name.clone(), clip(value, MAX_DATA_VALUE));
        }
    }

    let aria_label = el
        .attrs
        .get("aria-label")
        .filter(|v| !v.is_empty())
        .map(|v| clip(v, MAX_ARIA_LABEL));
    let role = el.attrs.get("role").filter(|v| !v.is_empty()).cloned();
    let href = if el.tag == "a" {
        el.attrs
            .get("href")
            .filter(|v| !v.is_empty())
            .map(|v| clip(v, MAX_HREF))
    } else {
        None
    };

    let direct = doc.direct_text(id);
    let text = if direct.is_empty() {
        None
    } else {
        Some(snippet(&direct, options.max_text))
    };

    let children: Vec<SerializedNode> = doc
        .child_elements(id)
        .into_iter()
        .take(options.max_children)
        .filter_map(|child| serialize_at(doc, child, depth + 1, options))
        .collect();

    Some(SerializedNode {
        tag: el.tag.clone(),
        id: el_id,
        classes,
        data_attrs,
        aria_label,
        role,
        href,
        text,
        children,
    })
}

/// Hard cut at a char boundary, no marker.
pub fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    s.chars().take(max).collect()
}

/// Cut with a trailing ellipsis marker, total length within `max` chars.
pub fn snippet(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
