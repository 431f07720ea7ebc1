use std::sync::OnceLock;

use regex::Regex;

// ============================================================================
// Generated-artifact detection
// ============================================================================

/// Ordered pattern list for machine-generated class names. Heuristic:
/// false positives on hash-like human names are accepted, false negatives
/// are unavoidable.
const GENERATED_CLASS_PATTERNS: &[&str] = &[
    // CSS-in-JS emitters: library prefix plus hash tail
    r"^(?:css|sc|jss|jsx|svelte|emotion)-[A-Za-z0-9]+$",
    // Angular view-encapsulation tokens
    r"^ng-tns-[A-Za-z0-9-]+$",
    // CSS-module locals with a hashed suffix (requires a digit so BEM
    // block__element names survive)
    r"__[A-Za-z0-9_-]*[0-9][A-Za-z0-9_-]*$",
    // bare hex hashes
    r"^[a-f0-9]{8,}$",
    // minifier tokens: one or two letters and a numeric tail
    r"^[A-Za-z]{1,2}[0-9]{2,}$",
    // long unsegmented alphanumeric runs
    r"^[A-Za-z0-9]{16,}$",
];

/// Data-attribute name fragments that mark per-render or per-session values.
const VOLATILE_ATTR_TOKENS: &[&str] = &[
    "uuid", "guid", "timestamp", "random", "hash", "reactid", "hydrate", "index", "ssr",
];

fn class_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        GENERATED_CLASS_PATTERNS
            .iter()
            .map(|p| Regex::new(p).unwrap())
            .collect()
    })
}

/// Whether a class name looks machine-generated and is therefore useless as
/// a stable selector ingredient.
pub fn is_generated_class(name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() {
        return false;
    }
    class_patterns().iter().any(|p| p.is_match(name))
}

/// Whether a data-attribute name references per-render identity rather than
/// stable semantics. Takes the full attribute name (`data-...`).
pub fn is_volatile_data_attr(name: &str) -> bool {
    let suffix = name.strip_prefix("data-").unwrap_or(name).to_ascii_lowercase();
    if VOLATILE_ATTR_TOKENS.iter().any(|t| suffix.contains(t)) {
        return true;
    }
    // Long numeric tails are render counters in practice
    let trailing_digits = suffix.chars().rev().take_while(|c| c.is_ascii_digit()).count();
    trailing_digits >= 6
}
