use serde::{Deserialize, Serialize};

use crate::dom::dom_model::Document;
use crate::llm::css_model::{CssGeneration, GenerationRequest};
use crate::relevance::matcher::{self, ContextMode};
use crate::selector::builder;

/// A CSS generation strategy. Returns None when the backend produced
/// nothing usable; the caller decides whether to fall back or surface an
/// error to the user.
pub trait CssGenerator {
    fn generate(&self, doc: &Document, request: &GenerationRequest) -> Option<CssGeneration>;
}

// ============================================================================
// Mock generator
// ============================================================================

/// Deterministic offline generator: relevance-match the request, synthesize
/// selectors, hide what matched. Covers the hide family of requests only,
/// which is enough for tests and for running without a model server.
pub struct MockGenerator;

const MAX_PRIMARY_SELECTORS: usize = 3;
const MAX_FALLBACK_SELECTORS: usize = 3;

fn hide_css(selectors: &[String]) -> String {
    format!(
        "{} {{\n  display: none !important;\n}}\n",
        selectors.join(",\n")
    )
}

impl CssGenerator for MockGenerator {
    fn generate(&self, doc: &Document, request: &GenerationRequest) -> Option<CssGeneration> {
        let matched = matcher::find_relevant(doc, &request.request);
        if matched.is_empty() {
            return Some(CssGeneration::failure(format!(
                "No elements on the page matched \"{}\"",
                request.request
            )));
        }

        let mut selectors: Vec<String> = Vec::new();
        for id in &matched {
            let selector = builder::build_selector(doc, *id);
            if !selector.is_empty() && !selectors.contains(&selector) {
                selectors.push(selector);
            }
        }
        if selectors.is_empty() {
            return Some(CssGeneration::failure(
                "Matched elements but could not build selectors for them",
            ));
        }

        let primary: Vec<String> = selectors.iter().take(MAX_PRIMARY_SELECTORS).cloned().collect();
        let fallback: Vec<String> = selectors
            .iter()
            .skip(MAX_PRIMARY_SELECTORS)
            .take(MAX_FALLBACK_SELECTORS)
            .cloned()
            .collect();

        let confidence = if primary.iter().any(|s| s.starts_with('#')) {
            0.9
        } else if primary.iter().any(|s| s.contains('[')) {
            0.75
        } else {
            0.6
        };

        Some(CssGeneration {
            success: true,
            css: hide_css(&primary),
            explanation: format!(
                "Hiding {} matched region(s) for \"{}\"",
                primary.len(),
                request.request
            ),
            selectors: primary,
            confidence,
            fallback_selectors: fallback,
        })
    }
}

// ============================================================================
// Ollama Backend
// ============================================================================

pub struct OllamaBackend {
    pub endpoint: String,
    pub model: String,
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "qwen2.5:1.5b".to_string(),
        }
    }
}

impl OllamaBackend {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    format: &'static str, // "json"
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

fn build_prompt(request: &GenerationRequest) -> String {
    let context_header = match request.context.mode {
        ContextMode::Focused => "RELEVANT PAGE REGIONS (matched to the request):",
        ContextMode::FullPage => "PAGE SUMMARY:",
    };

    format!(
        r#"You are a CSS generator for a browser customization tool. Produce CSS that fulfils the user's request on this page.

USER REQUEST: {request}

PAGE:
- URL: {url}
- Title: {title}

{context_header}
{context}

Selector priority, best first:
1. Stable ids (#sidebar)
2. Data attributes ([data-testid="feed"])
3. Aria labels ([aria-label="Search"])
4. Roles (nav[role="navigation"])
5. Semantic class names (.site-header)
Never use machine-generated class names (css-1a2b3c, jss42, long hashes).
End every declaration with !important so it wins over page styles.

Respond with ONLY valid JSON, no prose:
{{"success": true, "css": "...", "selectors": ["..."], "explanation": "...", "confidence": 0.0, "fallbackSelectors": ["..."]}}

If the request cannot be fulfilled on this page, respond with:
{{"success": false, "explanation": "..."}}"#,
        request = request.request,
        url = request.url,
        title = request.title,
        context_header = context_header,
        context = request.context.text,
    )
}

fn parse_response(response: &str) -> Option<CssGeneration> {
    let parsed: CssGeneration = serde_json::from_str(response).ok()?;
    // A success with no CSS is noise, not a generation.
    if parsed.success && parsed.css.trim().is_empty() {
        return None;
    }
    Some(parsed)
}

impl CssGenerator for OllamaBackend {
    fn generate(&self, _doc: &Document, request: &GenerationRequest) -> Option<CssGeneration> {
        let prompt = build_prompt(request);

        let body = OllamaRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            format: "json",
        };

        let client = reqwest::blocking::Client::new();
        let response = client.post(&self.endpoint).json(&body).send().ok()?;
        let ollama: OllamaResponse = response.json().ok()?;

        parse_response(&ollama.response)
    }
}
