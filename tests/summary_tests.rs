mod common;

use common::pages::{find_by_id, news_page};
use stylewarden::dom::dom_model::Document;
use stylewarden::summary::render::{
    fingerprint, render, summarize_page, truncate_output, PAGE_CHAR_BUDGET, TRUNCATION_MARKER,
};
use stylewarden::summary::serializer::{serialize, SerializeOptions, SerializedNode};

// ============================================================================
// Serialization tests
// ============================================================================

fn serialize_body(doc: &Document, options: &SerializeOptions) -> SerializedNode {
    serialize(doc, doc.body(), options).expect("body always serializes")
}

fn find_tag<'a>(node: &'a SerializedNode, tag: &str) -> Option<&'a SerializedNode> {
    if node.tag == tag {
        return Some(node);
    }
    node.children.iter().find_map(|c| find_tag(c, tag))
}

#[test]
fn test_skip_tags_and_hidden_elements_are_absent() {
    let doc = news_page();
    let tree = serialize_body(&doc, &SerializeOptions::default());
    let text = render(&tree);

    assert!(!text.contains("<script"), "script is machinery, not content");
    assert!(!text.contains("overlay"), "display:none element excluded:\n{}", text);
    assert!(text.contains("id=\"promo\""));
}

#[test]
fn test_include_hidden_option() {
    let doc = news_page();
    let options = SerializeOptions {
        include_hidden: true,
        ..SerializeOptions::default()
    };
    let text = render(&serialize_body(&doc, &options));
    assert!(text.contains("id=\"overlay\""));
}

#[test]
fn test_depth_bound() {
    let doc = news_page();
    let options = SerializeOptions {
        max_depth: 1,
        ..SerializeOptions::default()
    };
    let tree = serialize_body(&doc, &options);

    assert!(!tree.children.is_empty(), "depth 1 keeps body's children");
    for child in &tree.children {
        assert!(child.children.is_empty(), "depth 1 cuts grandchildren");
    }
}

#[test]
fn test_children_bound_takes_the_first() {
    let doc = news_page();
    let options = SerializeOptions {
        max_children: 2,
        ..SerializeOptions::default()
    };
    let tree = serialize_body(&doc, &options);
    let tags: Vec<&str> = tree.children.iter().map(|c| c.tag.as_str()).collect();
    assert_eq!(tags, vec!["header", "main"], "first children win, not the densest");
}

#[test]
fn test_generated_classes_and_volatile_data_attrs_filtered() {
    let doc = news_page();
    let tree = serialize_body(&doc, &SerializeOptions::default());

    let article = find_tag(&tree, "article").expect("article serialized");
    assert_eq!(article.classes, vec!["story"], "css-1a2b3c dropped");
    assert_eq!(
        article.data_attrs.get("data-testid").map(String::as_str),
        Some("story-card")
    );

    let promo = find_tag(&tree, "div").expect("promo div serialized");
    assert_eq!(promo.id.as_deref(), Some("promo"));
    assert!(
        !promo.data_attrs.contains_key("data-promo-id"),
        "numeric-tail data attr treated as volatile"
    );
}

#[test]
fn test_text_snippet_bound() {
    let mut doc = Document::new("https://example.com/", "t");
    let body = doc.body();
    let el = doc.append_element(body, "p", &[]);
    doc.append_text(el, &"word ".repeat(40));

    let options = SerializeOptions::default();
    let tree = serialize_body(&doc, &options);
    let p = find_tag(&tree, "p").unwrap();
    let text = p.text.as_deref().expect("text captured");
    assert!(text.ends_with("..."), "long text gets a marker");
    assert!(text.chars().count() <= options.max_text);
}

#[test]
fn test_href_only_on_anchors() {
    let mut doc = Document::new("https://example.com/", "t");
    let body = doc.body();
    doc.append_element(body, "a", &[("href", "/home")]);
    doc.append_element(body, "link", &[("href", "/style.css")]);
    doc.append_element(body, "div", &[("href", "/bogus")]);

    let tree = serialize_body(&doc, &SerializeOptions::default());
    let a = find_tag(&tree, "a").unwrap();
    assert_eq!(a.href.as_deref(), Some("/home"));
    assert!(find_tag(&tree, "link").is_none(), "link is a skip tag");
    let div = find_tag(&tree, "div").unwrap();
    assert!(div.href.is_none(), "href is an anchor concern");
}

// ============================================================================
// Rendering tests
// ============================================================================

#[test]
fn test_line_notation() {
    let doc = news_page();
    let promo = find_by_id(&doc, "promo");
    let node = serialize(&doc, promo, &SerializeOptions::default()).unwrap();
    assert_eq!(
        node.line(),
        "<div id=\"promo\" class=\"promo-banner sponsored\" \"Sponsored content inside\""
    );
}

#[test]
fn test_render_indents_by_depth() {
    let doc = news_page();
    let tree = serialize_body(&doc, &SerializeOptions::default());
    let text = render(&tree);
    let lines: Vec<&str> = text.lines().collect();

    assert!(lines[0].starts_with("<body"), "root at column zero");
    assert!(lines[1].starts_with("  <header"), "children indented two spaces");
    let nav_line = lines.iter().find(|l| l.contains("<nav")).unwrap();
    assert!(nav_line.starts_with("    "), "grandchildren indented four");
}

#[test]
fn test_summarize_page_is_deterministic_and_bounded() {
    let doc = news_page();
    let first = summarize_page(&doc);
    let second = summarize_page(&doc);
    assert_eq!(first, second);
    assert!(first.chars().count() <= PAGE_CHAR_BUDGET);
    assert!(first.contains("aria-label=\"Main navigation\""));
}

#[test]
fn test_truncate_output() {
    let text = "x".repeat(100);
    let truncated = truncate_output(&text, 50);
    assert!(truncated.ends_with(TRUNCATION_MARKER));
    assert_eq!(truncated.chars().count(), 50, "marker fits inside the budget");

    assert_eq!(truncate_output("short", 50), "short", "under budget passes through");
}

#[test]
fn test_fingerprint_is_stable_sha1_hex() {
    let doc = news_page();
    let summary = summarize_page(&doc);
    let digest = fingerprint(&summary);
    assert_eq!(digest.len(), 40);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(digest, fingerprint(&summary), "same text, same digest");
    assert_ne!(digest, fingerprint("something else"));
}
