use std::fmt;

use crate::dom::dom_model::{Document, NodeId};

// ============================================================================
// Selector engine — the querySelectorAll subset rules actually use
// ============================================================================
//
// Supported: tag, `*`, `#id`, `.class`, `[attr]` with `=`, `*=`, `^=`, `$=`,
// `~=` operators, compound sequences, descendant and child combinators, and
// comma-separated groups. Anything else (pseudo-classes, sibling combinators)
// is a parse error; call sites treat parse errors as zero matches.

#[derive(Debug)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid selector: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq)]
enum SimpleSelector {
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attr { name: String, op: AttrOp },
}

#[derive(Debug, Clone, PartialEq)]
enum AttrOp {
    Exists,
    Equals(String),
    Substring(String),
    Prefix(String),
    Suffix(String),
    Word(String),
}

#[derive(Debug, Clone)]
struct Compound {
    parts: Vec<SimpleSelector>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone)]
struct Complex {
    compounds: Vec<Compound>,
    /// combinators[i] links compounds[i] to compounds[i + 1]
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone)]
pub struct SelectorList {
    complexes: Vec<Complex>,
}

// ---- parsing ----

pub fn parse(input: &str) -> Result<SelectorList, ParseError> {
    let mut complexes = Vec::new();
    for group in split_groups(input)? {
        let group = group.trim();
        if group.is_empty() {
            return Err(ParseError::new("empty selector group"));
        }
        complexes.push(parse_complex(group)?);
    }
    if complexes.is_empty() {
        return Err(ParseError::new("empty selector"));
    }
    Ok(SelectorList { complexes })
}

/// Split on commas outside brackets and quotes.
fn split_groups(input: &str) -> Result<Vec<&str>, ParseError> {
    let mut groups = Vec::new();
    let mut start = 0;
    let mut in_brackets = false;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '[' => in_brackets = true,
                ']' => in_brackets = false,
                ',' if !in_brackets => {
                    groups.push(&input[start..idx]);
                    start = idx + ch.len_utf8();
                }
                _ => {}
            },
        }
    }
    if quote.is_some() {
        return Err(ParseError::new("unterminated quote"));
    }
    groups.push(&input[start..]);
    Ok(groups)
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Scanner {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                out.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }
}

fn parse_complex(input: &str) -> Result<Complex, ParseError> {
    let mut scanner = Scanner::new(input);
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();

    loop {
        let had_space = scanner.skip_whitespace();
        let Some(ch) = scanner.peek() else {
            break;
        };
        if ch == '>' {
            scanner.bump();
            if compounds.is_empty() {
                return Err(ParseError::new("combinator without left-hand side"));
            }
            combinators.push(Combinator::Child);
            scanner.skip_whitespace();
            if scanner.peek().is_none() {
                return Err(ParseError::new("combinator without right-hand side"));
            }
            compounds.push(parse_compound(&mut scanner)?);
        } else {
            if !compounds.is_empty() {
                if !had_space {
                    return Err(ParseError::new("expected combinator"));
                }
                combinators.push(Combinator::Descendant);
            }
            compounds.push(parse_compound(&mut scanner)?);
        }
    }

    if compounds.is_empty() {
        return Err(ParseError::new("empty selector"));
    }
    Ok(Complex {
        compounds,
        combinators,
    })
}

fn parse_compound(scanner: &mut Scanner) -> Result<Compound, ParseError> {
    let mut parts = Vec::new();

    // Leading tag or universal
    match scanner.peek() {
        Some('*') => {
            scanner.bump();
            parts.push(SimpleSelector::Universal);
        }
        Some(ch) if ch.is_alphabetic() => {
            let tag = scanner.ident().to_ascii_lowercase();
            parts.push(SimpleSelector::Tag(tag));
        }
        _ => {}
    }

    loop {
        match scanner.peek() {
            Some('#') => {
                scanner.bump();
                let id = scanner.ident();
                if id.is_empty() {
                    return Err(ParseError::new("empty id selector"));
                }
                parts.push(SimpleSelector::Id(id));
            }
            Some('.') => {
                scanner.bump();
                let class = scanner.ident();
                if class.is_empty() {
                    return Err(ParseError::new("empty class selector"));
                }
                parts.push(SimpleSelector::Class(class));
            }
            Some('[') => {
                scanner.bump();
                parts.push(parse_attr(scanner)?);
            }
            Some(ch) if ch.is_whitespace() || ch == '>' => break,
            None => break,
            Some(ch) => {
                return Err(ParseError::new(format!("unsupported token '{}'", ch)));
            }
        }
    }

    if parts.is_empty() {
        return Err(ParseError::new("empty compound selector"));
    }
    Ok(Compound { parts })
}

fn parse_attr(scanner: &mut Scanner) -> Result<SimpleSelector, ParseError> {
    scanner.skip_whitespace();
    let name = scanner.ident().to_ascii_lowercase();
    if name.is_empty() {
        return Err(ParseError::new("empty attribute name"));
    }
    scanner.skip_whitespace();

    let op_char = match scanner.peek() {
        Some(']') => {
            scanner.bump();
            return Ok(SimpleSelector::Attr {
                name,
                op: AttrOp::Exists,
            });
        }
        Some(ch @ ('=' | '*' | '^' | '$' | '~')) => {
            scanner.bump();
            ch
        }
        _ => return Err(ParseError::new("malformed attribute selector")),
    };
    if op_char != '=' && scanner.bump() != Some('=') {
        return Err(ParseError::new("malformed attribute operator"));
    }

    scanner.skip_whitespace();
    let value = match scanner.peek() {
        Some(q @ ('"' | '\'')) => {
            scanner.bump();
            let mut out = String::new();
            loop {
                match scanner.bump() {
                    Some(ch) if ch == q => break,
                    Some('\\') => match scanner.bump() {
                        Some(escaped) => out.push(escaped),
                        None => return Err(ParseError::new("unterminated attribute value")),
                    },
                    Some(ch) => out.push(ch),
                    None => return Err(ParseError::new("unterminated attribute value")),
                }
            }
            out
        }
        _ => {
            let mut out = String::new();
            while let Some(ch) = scanner.peek() {
                if ch == ']' {
                    break;
                }
                out.push(ch);
                scanner.pos += 1;
            }
            out.trim().to_string()
        }
    };
    scanner.skip_whitespace();
    if scanner.bump() != Some(']') {
        return Err(ParseError::new("unclosed attribute selector"));
    }

    let op = match op_char {
        '=' => AttrOp::Equals(value),
        '*' => AttrOp::Substring(value),
        '^' => AttrOp::Prefix(value),
        '$' => AttrOp::Suffix(value),
        '~' => AttrOp::Word(value),
        _ => unreachable!(),
    };
    Ok(SimpleSelector::Attr { name, op })
}

// ---- matching ----

impl SelectorList {
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.complexes.iter().any(|c| matches_complex(doc, id, c))
    }
}

fn matches_complex(doc: &Document, id: NodeId, complex: &Complex) -> bool {
    matches_at(doc, id, complex, complex.compounds.len() - 1)
}

/// Right-to-left: the element matches compound `ci` and some ancestor chain
/// satisfies everything to the left.
fn matches_at(doc: &Document, id: NodeId, complex: &Complex, ci: usize) -> bool {
    if !matches_compound(doc, id, &complex.compounds[ci]) {
        return false;
    }
    if ci == 0 {
        return true;
    }
    match complex.combinators[ci - 1] {
        Combinator::Child => match doc.parent(id) {
            Some(p) if doc.is_element(p) => matches_at(doc, p, complex, ci - 1),
            _ => false,
        },
        Combinator::Descendant => doc
            .ancestors(id)
            .into_iter()
            .filter(|a| doc.is_element(*a))
            .any(|a| matches_at(doc, a, complex, ci - 1)),
    }
}

fn matches_compound(doc: &Document, id: NodeId, compound: &Compound) -> bool {
    compound.parts.iter().all(|part| match part {
        SimpleSelector::Universal => true,
        SimpleSelector::Tag(tag) => doc.tag(id) == Some(tag.as_str()),
        SimpleSelector::Id(want) => doc.attr(id, "id") == Some(want.as_str()),
        SimpleSelector::Class(want) => doc.classes(id).iter().any(|c| c == want),
        SimpleSelector::Attr { name, op } => {
            let value = doc.attr(id, name);
            match (op, value) {
                (AttrOp::Exists, v) => v.is_some(),
                (AttrOp::Equals(want), Some(v)) => v == want,
                (AttrOp::Substring(want), Some(v)) => !want.is_empty() && v.contains(want),
                (AttrOp::Prefix(want), Some(v)) => !want.is_empty() && v.starts_with(want),
                (AttrOp::Suffix(want), Some(v)) => !want.is_empty() && v.ends_with(want),
                (AttrOp::Word(want), Some(v)) => v.split_whitespace().any(|w| w == want),
                (_, None) => false,
            }
        }
    })
}

/// All matching elements in document order. Parse failures surface as `Err`;
/// validation call sites convert them to zero matches.
pub fn query_all(doc: &Document, selector: &str) -> Result<Vec<NodeId>, ParseError> {
    let list = parse(selector)?;
    Ok(doc
        .elements()
        .into_iter()
        .filter(|id| list.matches(doc, *id))
        .collect())
}

pub fn query_first(doc: &Document, selector: &str) -> Result<Option<NodeId>, ParseError> {
    let list = parse(selector)?;
    Ok(doc.elements().into_iter().find(|id| list.matches(doc, *id)))
}
