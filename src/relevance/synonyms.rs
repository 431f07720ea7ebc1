use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// Synonym table
// ============================================================================
//
// Vocabulary users actually type at a page-customization prompt, mapped to
// the vocabulary sites actually put in class names and labels. Membership is
// symmetric: any member expands to the whole group.

const SYNONYM_GROUPS: &[&[&str]] = &[
    &["shorts", "reel", "reels", "clips", "short-video"],
    &["sidebar", "side-bar", "rail", "aside"],
    &["ad", "ads", "advert", "advertisement", "sponsored", "promo", "promoted"],
    &["comments", "comment", "replies", "discussion"],
    &["video", "player", "media"],
    &["navbar", "navigation", "nav", "menu"],
    &["header", "masthead", "topbar"],
    &["footer", "bottombar"],
    &["popup", "modal", "dialog", "overlay", "lightbox"],
    &["banner", "hero", "jumbotron"],
    &["search", "searchbar", "searchbox", "query"],
    &["login", "signin", "sign-in", "auth"],
    &["subscribe", "subscription", "newsletter"],
    &["trending", "popular", "recommended", "suggestions", "suggested"],
    &["notification", "notifications", "alerts", "badge"],
    &["profile", "account", "avatar"],
    &["chat", "messages", "messaging"],
    &["feed", "timeline", "stream"],
    &["story", "stories"],
    &["thumbnail", "thumb", "preview"],
    &["button", "btn", "cta"],
    &["image", "img", "picture", "photo"],
];

/// Tokens shorter than this carry no signal (and as substrings they match
/// almost anything).
const MIN_TOKEN_LEN: usize = 3;

fn synonym_index() -> &'static HashMap<&'static str, &'static [&'static str]> {
    static INDEX: OnceLock<HashMap<&'static str, &'static [&'static str]>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut index = HashMap::new();
        for group in SYNONYM_GROUPS {
            for word in *group {
                index.insert(*word, *group);
            }
        }
        index
    })
}

/// Lowercased whitespace tokens of useful length.
pub fn tokenize_hint(hint: &str) -> Vec<String> {
    hint.split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .collect()
}

/// Each token plus its full synonym group, deduplicated, short members
/// filtered back out.
pub fn expand_keywords(tokens: &[String]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in tokens {
        push_unique(&mut keywords, token);
        if let Some(group) = synonym_index().get(token.as_str()) {
            for word in *group {
                if word.len() >= MIN_TOKEN_LEN {
                    push_unique(&mut keywords, word);
                }
            }
        }
    }
    keywords
}

fn push_unique(keywords: &mut Vec<String>, word: &str) {
    if !keywords.iter().any(|k| k == word) {
        keywords.push(word.to_string());
    }
}
