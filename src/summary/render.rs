use crate::dom::dom_model::Document;
use crate::summary::serializer::{self, SerializedNode, SerializeOptions};

// ============================================================================
// Textual rendering — indented line-per-node notation
// ============================================================================

/// Whole-page summaries never exceed this many chars.
pub const PAGE_CHAR_BUDGET: usize = 8000;

pub const TRUNCATION_MARKER: &str = "\n... [truncated]";

impl SerializedNode {
    /// One line of the compact notation: a trimmed opening tag with direct
    /// text as a quoted suffix.
    pub fn line(&self) -> String {
        let mut line = format!("<{}", self.tag);
        if let Some(id) = &self.id {
            line.push_str(&format!(" id=\"{}\"", id));
        }
        if !self.classes.is_empty() {
            line.push_str(&format!(" class=\"{}\"", self.classes.join(" ")));
        }
        for (name, value) in &self.data_attrs {
            line.push_str(&format!(" {}=\"{}\"", name, value));
        }
        if let Some(label) = &self.aria_label {
            line.push_str(&format!(" aria-label=\"{}\"", label));
        }
        if let Some(role) = &self.role {
            line.push_str(&format!(" role=\"{}\"", role));
        }
        if let Some(href) = &self.href {
            line.push_str(&format!(" href=\"{}\"", href));
        }
        if let Some(text) = &self.text {
            line.push_str(&format!(" \"{}\"", text));
        }
        line
    }
}

/// Flatten a serialized tree into the indented notation. Deterministic for
/// an unchanged tree.
pub fn render(root: &SerializedNode) -> String {
    let mut lines = Vec::new();
    collect_lines(root, 0, &mut lines);
    lines.join("\n")
}

fn collect_lines(node: &SerializedNode, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!("{}{}", "  ".repeat(depth), node.line()));
    for child in &node.children {
        collect_lines(child, depth + 1, lines);
    }
}

/// Whole-page summary from the body, budget-truncated with a marker.
pub fn summarize_page(doc: &Document) -> String {
    let options = SerializeOptions::default();
    let Some(tree) = serializer::serialize(doc, doc.body(), &options) else {
        return String::new();
    };
    truncate_output(&render(&tree), PAGE_CHAR_BUDGET)
}

/// Enforce the whole-page character budget; appends the truncation marker
/// when anything is cut.
pub fn truncate_output(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let marker_len = TRUNCATION_MARKER.chars().count();
    let kept: String = text.chars().take(budget.saturating_sub(marker_len)).collect();
    format!("{}{}", kept, TRUNCATION_MARKER)
}

/// Stable digest of a rendered summary, for change detection in traces and
/// repeat-run comparisons.
pub fn fingerprint(text: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
