// Shared page builders for integration tests.

use stylewarden::dom::dom_model::{Document, NodeId};
use stylewarden::dom::live::LivePage;
use stylewarden::rules::rule_model::Rule;

/// A small news-site page with the features most tests care about:
/// stable ids, generated classes, data attributes, a hidden overlay,
/// and a sponsored block that hide-rules typically target.
pub fn news_page() -> Document {
    let mut doc = Document::new("https://news.example.com/today", "Example News");
    let body = doc.body();

    let header = doc.append_element(body, "header", &[("id", "top"), ("class", "site-header"), ("role", "banner")]);
    let nav = doc.append_element(header, "nav", &[("id", "main-nav"), ("aria-label", "Main navigation")]);
    let home = doc.append_element(nav, "a", &[("href", "/home")]);
    doc.append_text(home, "Home");
    let news = doc.append_element(nav, "a", &[("href", "/news")]);
    doc.append_text(news, "News");

    let main = doc.append_element(body, "main", &[("id", "content")]);
    for n in 1..=2 {
        let article = doc.append_element(
            main,
            "article",
            &[("class", "story css-1a2b3c"), ("data-testid", "story-card")],
        );
        let h2 = doc.append_element(article, "h2", &[]);
        doc.append_text(h2, &format!("Headline {n}"));
        let p = doc.append_element(article, "p", &[]);
        doc.append_text(p, "Body copy for the piece.");
    }
    let promo = doc.append_element(
        main,
        "div",
        &[("id", "promo"), ("class", "promo-banner sponsored"), ("data-promo-id", "12345678")],
    );
    doc.append_text(promo, "Sponsored content inside");

    let sidebar = doc.append_element(body, "aside", &[("id", "sidebar"), ("class", "sidebar")]);
    let widget = doc.append_element(sidebar, "div", &[("class", "widget")]);
    doc.append_text(widget, "Trending now");

    let overlay = doc.append_element(
        body,
        "div",
        &[("id", "overlay"), ("class", "modal-overlay"), ("style", "display: none")],
    );
    doc.append_text(overlay, "Hidden modal");

    let footer = doc.append_element(body, "footer", &[("class", "site-footer")]);
    doc.append_text(footer, "(c) Example");
    let script = doc.append_element(footer, "script", &[]);
    doc.append_text(script, "var tracked = true;");

    doc
}

/// A video-site page used by the relevance tests: the visible labels
/// ("Shorts", comments, ad slot) do not literally repeat the words a
/// user would type, so matching has to go through synonym expansion.
pub fn video_page() -> Document {
    let mut doc = Document::new("https://video.example.com/feed", "Example Video");
    let body = doc.body();

    let nav = doc.append_element(body, "nav", &[("role", "navigation")]);
    let link = doc.append_element(nav, "a", &[("href", "/subscriptions")]);
    doc.append_text(link, "Subscriptions");

    let shelf = doc.append_element(
        body,
        "div",
        &[("id", "shorts-shelf"), ("data-testid", "reel-shelf"), ("aria-label", "Shorts")],
    );
    for n in 1..=3 {
        let item = doc.append_element(shelf, "div", &[("class", "shelf-item")]);
        let a = doc.append_element(item, "a", &[("href", &format!("/watch?v=abc{n}"))]);
        doc.append_text(a, &format!("Clip {n}"));
    }

    let comments = doc.append_element(body, "section", &[("id", "comments"), ("class", "comments-section")]);
    let comment = doc.append_element(comments, "div", &[("class", "comment")]);
    doc.append_text(comment, "First!");

    let ad = doc.append_element(body, "div", &[("class", "ad-slot"), ("data-ad-unit", "div-gpt-ad-123456789")]);
    doc.append_text(ad, "Advertisement");

    doc
}

pub fn live_news_page() -> LivePage {
    LivePage::new(news_page())
}

/// First node matching the id, for tests that need a handle into a fixture.
pub fn find_by_id(doc: &Document, id: &str) -> NodeId {
    doc.elements()
        .into_iter()
        .find(|&n| doc.attr(n, "id").is_some_and(|v| v == id))
        .unwrap_or_else(|| panic!("fixture has no element with id '{id}'"))
}

/// A rule that hides `selector`, the common shape produced by generation.
pub fn hide_rule(request: &str, selector: &str) -> Rule {
    let css = format!("{selector} {{\n  display: none !important;\n}}\n");
    Rule::new(request, &css, vec![selector.to_string()])
}
