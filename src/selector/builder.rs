use crate::dom::dom_model::{Document, NodeId};
use crate::selector::generated::{is_generated_class, is_volatile_data_attr};

// ============================================================================
// Selector synthesis — one best selector per element, fixed priority
// ============================================================================

/// Derive the single best selector for an element. Priority order: id,
/// stable data-attribute, aria-label, role, semantic classes, anchor href,
/// bare tag. Purely structural, never consults style or layout.
pub fn build_selector(doc: &Document, id: NodeId) -> String {
    let Some(el) = doc.element(id) else {
        return String::new();
    };

    if let Some(el_id) = el.attrs.get("id") {
        if !el_id.is_empty() {
            if is_css_identifier(el_id) {
                return format!("#{}", el_id);
            }
            return format!("[id=\"{}\"]", quote_attr(el_id));
        }
    }

    for (name, value) in &el.attrs {
        if name.starts_with("data-") && !is_volatile_data_attr(name) {
            if value.is_empty() {
                return format!("[{}]", name);
            }
            return format!("[{}=\"{}\"]", name, quote_attr(value));
        }
    }

    if let Some(label) = el.attrs.get("aria-label") {
        if !label.is_empty() {
            return format!("[aria-label=\"{}\"]", quote_attr(label));
        }
    }

    if let Some(role) = el.attrs.get("role") {
        if !role.is_empty() {
            return format!("{}[role=\"{}\"]", el.tag, quote_attr(role));
        }
    }

    let classes: Vec<&str> = doc
        .classes(id)
        .into_iter()
        .filter(|c| !is_generated_class(c) && is_css_identifier(c))
        .take(2)
        .collect();
    if !classes.is_empty() {
        return format!("{}.{}", el.tag, classes.join("."));
    }

    if el.tag == "a" {
        if let Some(selector) = href_selector(el.attrs.get("href").map(|h| h.as_str())) {
            return selector;
        }
    }

    el.tag.clone()
}

fn href_selector(href: Option<&str>) -> Option<String> {
    let href = href?.trim();
    if href.is_empty() || href.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }
    if href.len() < 50 {
        return Some(format!("a[href=\"{}\"]", quote_attr(href)));
    }
    // Long hrefs carry volatile query state; match on the last two path
    // segments instead.
    let segments: Vec<&str> = href_path(href)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        return None;
    }
    let tail = if segments.len() >= 2 {
        format!("{}/{}", segments[segments.len() - 2], segments[segments.len() - 1])
    } else {
        segments[segments.len() - 1].to_string()
    };
    Some(format!("a[href*=\"{}\"]", quote_attr(&tail)))
}

/// Path portion of an href: scheme/host stripped, query and fragment cut.
fn href_path(href: &str) -> &str {
    let after_host = match href.find("://") {
        Some(pos) => {
            let rest = &href[pos + 3..];
            match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => "",
            }
        }
        None => href,
    };
    let end = after_host
        .find(['?', '#'])
        .unwrap_or(after_host.len());
    &after_host[..end]
}

fn is_css_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn quote_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
