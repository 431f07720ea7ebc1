use crate::dom::dom_model::{Document, NodeId};
use crate::selector::query;

// ============================================================================
// Style resolution
// ============================================================================
//
// Only the three properties that decide element visibility are modeled.
// Precedence: styles installed by `apply_css` (the injected-stylesheet layer)
// override the element's inline `style` attribute.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    pub display: Option<String>,
    pub visibility: Option<String>,
    pub opacity: Option<f32>,
}

impl InlineStyle {
    /// Overlay `other` on top of self; set fields win.
    pub fn merge(&mut self, other: &InlineStyle) {
        if other.display.is_some() {
            self.display = other.display.clone();
        }
        if other.visibility.is_some() {
            self.visibility = other.visibility.clone();
        }
        if other.opacity.is_some() {
            self.opacity = other.opacity;
        }
    }
}

/// Parse a `style` attribute or declaration block body.
///
/// Unknown properties are ignored; `!important` markers are stripped.
/// Malformed declarations are skipped, never an error.
pub fn parse_declarations(text: &str) -> InlineStyle {
    let mut style = InlineStyle::default();
    for decl in text.split(';') {
        let Some((prop, value)) = decl.split_once(':') else {
            continue;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();
        if value.is_empty() {
            continue;
        }
        match prop.as_str() {
            "display" => style.display = Some(value),
            "visibility" => style.visibility = Some(value),
            "opacity" => {
                if let Ok(opacity) = value.parse::<f32>() {
                    style.opacity = Some(opacity);
                }
            }
            _ => {}
        }
    }
    style
}

/// Effective style of one element: inline `style` attribute with any applied
/// layer merged on top.
pub fn resolved_style(doc: &Document, id: NodeId) -> InlineStyle {
    let mut style = doc
        .attr(id, "style")
        .map(parse_declarations)
        .unwrap_or_default();
    if let Some(applied) = &doc.node(id).applied {
        style.merge(applied);
    }
    style
}

fn display_none_on(doc: &Document, id: NodeId) -> bool {
    if resolved_style(doc, id).display.as_deref() == Some("none") {
        return true;
    }
    // The hidden attribute and hidden inputs resolve to display:none in
    // every user-agent stylesheet.
    if doc.attr(id, "hidden").is_some() {
        return true;
    }
    doc.tag(id) == Some("input")
        && doc
            .attr(id, "type")
            .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
}

/// display:none anywhere on the ancestor-or-self chain.
pub fn display_hidden(doc: &Document, id: NodeId) -> bool {
    if display_none_on(doc, id) {
        return true;
    }
    doc.ancestors(id).iter().any(|a| display_none_on(doc, *a))
}

/// Nearest explicit `visibility` on the ancestor-or-self chain resolves to
/// hidden/collapse. visibility inherits and can be re-set to visible below
/// a hidden ancestor.
pub fn visibility_hidden(doc: &Document, id: NodeId) -> bool {
    if let Some(v) = resolved_style(doc, id).visibility {
        return v == "hidden" || v == "collapse";
    }
    for ancestor in doc.ancestors(id) {
        if let Some(v) = resolved_style(doc, ancestor).visibility {
            return v == "hidden" || v == "collapse";
        }
    }
    false
}

fn transparent(doc: &Document, id: NodeId) -> bool {
    if resolved_style(doc, id).opacity.is_some_and(|o| o <= 0.0) {
        return true;
    }
    doc.ancestors(id)
        .iter()
        .any(|a| resolved_style(doc, *a).opacity.is_some_and(|o| o <= 0.0))
}

/// Hidden as far as rule validation is concerned: the element does not
/// render because of display or visibility. This is what injected
/// `display: none` rules produce.
pub fn is_css_hidden(doc: &Document, id: NodeId) -> bool {
    display_hidden(doc, id) || visibility_hidden(doc, id)
}

/// Hidden as far as serialization is concerned: css-hidden plus full
/// transparency.
pub fn is_render_hidden(doc: &Document, id: NodeId) -> bool {
    is_css_hidden(doc, id) || transparent(doc, id)
}

/// Install a stylesheet's visibility effects onto matching elements.
///
/// Stands in for the collaborator that injects a rule's CSS into the page.
/// Comments are stripped, selector groups honored, and invalid selectors
/// skipped. Installing styles is not a page mutation and emits no records.
/// Returns the number of element applications.
pub fn apply_css(doc: &mut Document, css: &str) -> usize {
    let stripped = strip_comments(css);
    let mut affected = 0;
    for block in stripped.split('}') {
        let Some((selector_part, body)) = block.split_once('{') else {
            continue;
        };
        let style = parse_declarations(body);
        if style == InlineStyle::default() {
            continue;
        }
        let targets = match query::query_all(doc, selector_part.trim()) {
            Ok(ids) => ids,
            Err(_) => continue,
        };
        for id in targets {
            doc.set_applied(id, style.clone());
            affected += 1;
        }
    }
    affected
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start..].find("*/") {
            Some(end) => rest = &rest[start + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}
