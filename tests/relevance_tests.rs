mod common;

use common::pages::{news_page, video_page};
use stylewarden::dom::dom_model::Document;
use stylewarden::relevance::matcher::{find_relevant, page_context, serialize_focused, ContextMode};
use stylewarden::relevance::synonyms::{expand_keywords, tokenize_hint};

// ============================================================================
// Synonym expansion tests
// ============================================================================

#[test]
fn test_tokenize_drops_short_tokens_and_lowercases() {
    let tokens = tokenize_hint("Hide THE ad on MY page");
    assert_eq!(tokens, vec!["hide", "the", "page"], "two-char tokens carry no signal");
}

#[test]
fn test_expand_keywords_pulls_in_the_whole_group() {
    let tokens = tokenize_hint("shorts");
    let keywords = expand_keywords(&tokens);
    for expected in ["shorts", "reel", "reels", "clips", "short-video"] {
        assert!(keywords.contains(&expected.to_string()), "missing '{}'", expected);
    }
}

#[test]
fn test_expand_keywords_deduplicates() {
    let tokens = tokenize_hint("ads advert");
    let keywords = expand_keywords(&tokens);
    let sponsored = keywords.iter().filter(|k| *k == "sponsored").count();
    assert_eq!(sponsored, 1, "overlapping groups must not duplicate");
}

#[test]
fn test_unknown_words_pass_through() {
    let keywords = expand_keywords(&tokenize_hint("doohickey"));
    assert_eq!(keywords, vec!["doohickey"]);
}

// ============================================================================
// Relevance matching tests
// ============================================================================

#[test]
fn test_match_via_class_name() {
    let doc = news_page();
    let matches = find_relevant(&doc, "sidebar");
    assert_eq!(matches.len(), 1);
    assert_eq!(doc.attr(matches[0], "id"), Some("sidebar"));
}

#[test]
fn test_match_via_synonym_in_aria_label() {
    // The user says "shorts"; the page says aria-label="Shorts" and
    // data-testid="reel-shelf". Both routes land on the shelf.
    let doc = video_page();
    let matches = find_relevant(&doc, "hide shorts");
    assert_eq!(matches.len(), 1);
    assert_eq!(doc.attr(matches[0], "id"), Some("shorts-shelf"));
}

#[test]
fn test_highest_matching_ancestor_wins() {
    let doc = news_page();
    // "trending" appears in the sidebar widget's text; the aside inherits it
    // through subtree text and, being the ancestor, is the one reported.
    let matches = find_relevant(&doc, "trending");
    assert_eq!(matches.len(), 1);
    assert_eq!(doc.tag(matches[0]), Some("aside"));
}

#[test]
fn test_subtree_text_cap_keeps_matching_local() {
    let mut doc = Document::new("https://example.com/", "t");
    let body = doc.body();
    let wrapper = doc.append_element(body, "div", &[("class", "page-wrap")]);
    let filler = doc.append_element(wrapper, "p", &[]);
    doc.append_text(filler, &"lorem ipsum dolor ".repeat(30));
    let target = doc.append_element(wrapper, "span", &[]);
    doc.append_text(target, "unsubscribe from the newsletter");

    let matches = find_relevant(&doc, "newsletter");
    assert_eq!(matches.len(), 1);
    assert_eq!(
        doc.tag(matches[0]),
        Some("span"),
        "500 chars of filler push the keyword past the wrapper's text cap"
    );
}

#[test]
fn test_no_tokens_no_matches() {
    let doc = news_page();
    assert!(find_relevant(&doc, "").is_empty());
    assert!(find_relevant(&doc, "a an of").is_empty(), "only short tokens");
    assert!(find_relevant(&doc, "zzzqqq").is_empty(), "nothing on the page matches");
}

#[test]
fn test_skip_tags_never_match() {
    let doc = news_page();
    // The script body mentions "tracked"; scripts contribute nothing.
    assert!(find_relevant(&doc, "tracked").is_empty());
}

// ============================================================================
// Context selection tests
// ============================================================================

#[test]
fn test_small_focused_summary_falls_back_to_full_page() {
    let doc = news_page();
    let context = page_context(&doc, "sidebar");
    assert_eq!(context.mode, ContextMode::FullPage, "a two-line block is not worth sending");
    assert!(context.text.contains("<body"));
}

#[test]
fn test_rich_match_produces_focused_context() {
    let mut doc = Document::new("https://example.com/", "t");
    let body = doc.body();
    let main = doc.append_element(body, "main", &[]);
    let rail = doc.append_element(main, "div", &[("id", "rail"), ("class", "sidebar")]);
    for n in 0..18 {
        let item = doc.append_element(rail, "div", &[("class", "rail-item")]);
        let link = doc.append_element(item, "a", &[("href", &format!("/story/{n}"))]);
        doc.append_text(link, &format!("Recommended story number {n}"));
    }

    let focused = serialize_focused(&doc, "sidebar");
    assert!(focused.contains("id=\"rail\""));

    let context = page_context(&doc, "sidebar");
    assert_eq!(context.mode, ContextMode::Focused);
}

#[test]
fn test_no_match_serializes_nothing() {
    let doc = news_page();
    assert_eq!(serialize_focused(&doc, "zeppelin"), "");
}
