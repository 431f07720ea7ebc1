mod common;

use common::pages::{find_by_id, news_page};
use stylewarden::dom::dom_model::{Document, MutationRecord};
use stylewarden::dom::html::parse_html;
use stylewarden::dom::style::{apply_css, is_css_hidden, is_render_hidden, parse_declarations};
use stylewarden::selector::query;

// ============================================================================
// Document model tests
// ============================================================================

#[test]
fn test_empty_document_has_root_and_body() {
    let doc = Document::new("https://example.com/", "Example");
    assert_eq!(doc.tag(doc.root()), Some("html"));
    assert_eq!(doc.tag(doc.body()), Some("body"));
    assert_eq!(doc.url, "https://example.com/");
    assert_eq!(doc.title, "Example");
}

#[test]
fn test_append_element_lowercases_tags() {
    let mut doc = Document::new("https://example.com/", "t");
    let body = doc.body();
    let el = doc.append_element(body, "DIV", &[("class", "Box")]);
    assert_eq!(doc.tag(el), Some("div"));
    assert_eq!(doc.attr(el, "class"), Some("Box"), "attribute values keep their case");
}

#[test]
fn test_direct_text_collapses_whitespace() {
    let mut doc = Document::new("https://example.com/", "t");
    let body = doc.body();
    let el = doc.append_element(body, "p", &[]);
    doc.append_text(el, "  hello \n");
    doc.append_text(el, "\t world  ");
    assert_eq!(doc.direct_text(el), "hello world");
}

#[test]
fn test_path_from_body() {
    let doc = news_page();
    let promo = find_by_id(&doc, "promo");
    assert_eq!(doc.path_from_body(promo), "body>main#content>div#promo");
}

#[test]
fn test_ancestors_are_nearest_first() {
    let doc = news_page();
    let promo = find_by_id(&doc, "promo");
    let chain: Vec<Option<&str>> = doc.ancestors(promo).iter().map(|a| doc.tag(*a)).collect();
    assert_eq!(chain, vec![Some("main"), Some("body"), Some("html")]);
}

// ============================================================================
// Mutation API tests
// ============================================================================

#[test]
fn test_remove_node_detaches_and_reports_the_parent() {
    let mut doc = news_page();
    let promo = find_by_id(&doc, "promo");
    let parent = doc.parent(promo).unwrap();

    let record = doc.remove_node(promo).expect("removable");
    match record {
        MutationRecord::ChildList { target } => assert_eq!(target, parent),
        other => panic!("Expected ChildList record, got {:?}", other),
    }
    assert!(query::query_first(&doc, "#promo").unwrap().is_none());
    assert!(!doc.children(parent).contains(&promo));
}

#[test]
fn test_root_and_body_are_protected() {
    let mut doc = news_page();
    assert!(doc.remove_node(doc.root()).is_none());
    assert!(doc.remove_node(doc.body()).is_none());
}

#[test]
fn test_attribute_mutations() {
    let mut doc = news_page();
    let promo = find_by_id(&doc, "promo");

    let record = doc.set_attribute(promo, "data-state", "collapsed").expect("element");
    match record {
        MutationRecord::Attribute { target, name } => {
            assert_eq!(target, promo);
            assert_eq!(name, "data-state");
        }
        other => panic!("Expected Attribute record, got {:?}", other),
    }
    assert_eq!(doc.attr(promo, "data-state"), Some("collapsed"));

    assert!(doc.remove_attribute(promo, "data-state").is_some());
    assert!(doc.attr(promo, "data-state").is_none());
    assert!(
        doc.remove_attribute(promo, "data-state").is_none(),
        "removing an absent attribute is not a mutation"
    );
}

#[test]
fn test_set_text_replaces_children() {
    let mut doc = news_page();
    let nav = find_by_id(&doc, "main-nav");
    assert_eq!(doc.child_elements(nav).len(), 2);

    let record = doc.set_text(nav, "plain text now").expect("element");
    assert!(matches!(record, MutationRecord::ChildList { .. }));
    assert_eq!(doc.direct_text(nav), "plain text now");
    assert!(doc.child_elements(nav).is_empty(), "the links are gone");
}

#[test]
fn test_edit_text_needs_a_text_child() {
    let mut doc = news_page();
    let promo = find_by_id(&doc, "promo");
    let record = doc.edit_text(promo, "Fresh copy").expect("has a text child");
    assert!(matches!(record, MutationRecord::CharacterData { .. }));
    assert_eq!(doc.direct_text(promo), "Fresh copy");

    let main = find_by_id(&doc, "content");
    assert!(doc.edit_text(main, "nope").is_none(), "element children only, no text");
}

#[test]
fn test_append_child_element() {
    let mut doc = news_page();
    let main = find_by_id(&doc, "content");
    let (node, record) = doc
        .append_child_element(main, "div", &[("class", "injected")], Some("hello"))
        .expect("parent is an element");
    assert!(matches!(record, MutationRecord::ChildList { .. }));
    assert_eq!(doc.direct_text(node), "hello");
    assert_eq!(doc.parent(node), Some(main));
}

// ============================================================================
// HTML ingestion tests
// ============================================================================

const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>  Sample Page </title></head>
<body class="theme-light">
  <DIV id="app">
    <p>First <b>bold</b> tail</p>
    <!-- a comment -->
    <span>   </span>
  </DIV>
</body>
</html>"#;

#[test]
fn test_parse_html_captures_title_and_body_attrs() {
    let doc = parse_html(SAMPLE_HTML, "https://sample.test/");
    assert_eq!(doc.title, "Sample Page", "title text trimmed");
    assert_eq!(doc.url, "https://sample.test/");
    assert_eq!(doc.attr(doc.body(), "class"), Some("theme-light"));
}

#[test]
fn test_parse_html_preserves_structure_and_text_order() {
    let doc = parse_html(SAMPLE_HTML, "https://sample.test/");
    let app = query::query_first(&doc, "#app").unwrap().expect("div#app parsed");
    assert_eq!(doc.tag(app), Some("div"), "tags arrive lowercased");

    let p = query::query_first(&doc, "p").unwrap().unwrap();
    assert_eq!(doc.direct_text(p), "First tail", "direct text skips the nested bold");
    let b = query::query_first(&doc, "b").unwrap().unwrap();
    assert_eq!(doc.direct_text(b), "bold");

    let span = query::query_first(&doc, "span").unwrap().unwrap();
    assert_eq!(doc.direct_text(span), "", "whitespace-only text dropped");
}

#[test]
fn test_parse_html_without_body_yields_empty_document() {
    let doc = parse_html("<p>floating</p>", "https://sample.test/");
    // html5ever synthesizes a body for stray content, so the paragraph lands.
    assert!(query::query_first(&doc, "p").unwrap().is_some());
}

// ============================================================================
// Style resolution tests
// ============================================================================

#[test]
fn test_parse_declarations() {
    let style = parse_declarations("display: NONE !important; opacity: 0.5; color: red");
    assert_eq!(style.display.as_deref(), Some("none"));
    assert_eq!(style.opacity, Some(0.5));
    assert_eq!(style.visibility, None, "unknown properties ignored, known absent ones unset");

    let broken = parse_declarations("display none; : ; opacity: many");
    assert_eq!(broken.display, None, "malformed declarations are skipped");
    assert_eq!(broken.opacity, None);
}

#[test]
fn test_display_none_hides_the_subtree() {
    let doc = news_page();
    let overlay = find_by_id(&doc, "overlay");
    assert!(is_css_hidden(&doc, overlay));

    let mut doc = doc;
    let child = doc.append_element(overlay, "p", &[]);
    assert!(is_css_hidden(&doc, child), "display:none inherits structurally");
}

#[test]
fn test_visibility_nearest_wins() {
    let mut doc = Document::new("https://example.com/", "t");
    let body = doc.body();
    let outer = doc.append_element(body, "div", &[("style", "visibility: hidden")]);
    let inner = doc.append_element(outer, "div", &[("style", "visibility: visible")]);
    let grandchild = doc.append_element(inner, "span", &[]);

    assert!(is_css_hidden(&doc, outer));
    assert!(!is_css_hidden(&doc, inner), "visibility can be restored below a hidden ancestor");
    assert!(!is_css_hidden(&doc, grandchild), "inherits the nearest explicit value");
}

#[test]
fn test_opacity_hides_rendering_but_not_css_state() {
    let mut doc = Document::new("https://example.com/", "t");
    let body = doc.body();
    let ghost = doc.append_element(body, "div", &[("style", "opacity: 0")]);
    assert!(!is_css_hidden(&doc, ghost), "transparent is not display-hidden");
    assert!(is_render_hidden(&doc, ghost), "but it serializes as hidden");
}

#[test]
fn test_hidden_attribute_and_hidden_inputs() {
    let mut doc = Document::new("https://example.com/", "t");
    let body = doc.body();
    let hidden_attr = doc.append_element(body, "div", &[("hidden", "")]);
    let hidden_input = doc.append_element(body, "input", &[("type", "HIDDEN")]);
    assert!(is_css_hidden(&doc, hidden_attr));
    assert!(is_css_hidden(&doc, hidden_input));
}

#[test]
fn test_apply_css_overrides_inline_styles() {
    let mut doc = Document::new("https://example.com/", "t");
    let body = doc.body();
    let el = doc.append_element(body, "div", &[("id", "box"), ("style", "display: none")]);
    assert!(is_css_hidden(&doc, el));

    let affected = apply_css(&mut doc, "#box { display: block }");
    assert_eq!(affected, 1);
    assert!(!is_css_hidden(&doc, el), "the applied layer wins over inline style");
}

#[test]
fn test_apply_css_skips_bad_blocks_and_strips_comments() {
    let mut doc = news_page();
    let css = "/* hide the promo */ #promo { display: none } div:hover { display: none } .widget { visibility: hidden }";
    let affected = apply_css(&mut doc, css);
    assert_eq!(affected, 2, "the unparseable middle block is skipped");
    assert!(is_css_hidden(&doc, find_by_id(&doc, "promo")));
}

#[test]
fn test_apply_css_ignores_declarations_it_does_not_model() {
    let mut doc = news_page();
    let affected = apply_css(&mut doc, "#promo { color: red; border: 1px }");
    assert_eq!(affected, 0, "no visibility effect, nothing installed");
}

#[test]
fn test_clear_applied_restores_the_page() {
    let mut doc = news_page();
    apply_css(&mut doc, "#promo { display: none }");
    assert!(is_css_hidden(&doc, find_by_id(&doc, "promo")));

    doc.clear_applied();
    assert!(!is_css_hidden(&doc, find_by_id(&doc, "promo")));
}
