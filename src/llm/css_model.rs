use serde::{Deserialize, Serialize};

use crate::relevance::matcher::PageContext;
use crate::rules::rule_model::{ConversationTurn, Rule};

// ============================================================================
// Generation contract
// ============================================================================

/// Everything the generator needs to produce CSS for one request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The user's words, verbatim.
    pub request: String,
    pub url: String,
    pub title: String,
    pub context: PageContext,
}

fn default_confidence() -> f32 {
    0.5
}

/// Generated CSS plus the selectors it stands on. Field names are camelCase
/// on the wire; that is the schema the prompt asks the model for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssGeneration {
    pub success: bool,

    #[serde(default)]
    pub css: String,

    /// Selectors the CSS targets; these become the rule's tracked set.
    #[serde(default)]
    pub selectors: Vec<String>,

    #[serde(default)]
    pub explanation: String,

    #[serde(default = "default_confidence")]
    pub confidence: f32,

    #[serde(default)]
    pub fallback_selectors: Vec<String>,
}

impl CssGeneration {
    pub fn failure(explanation: impl ToString) -> Self {
        CssGeneration {
            success: false,
            css: String::new(),
            selectors: Vec::new(),
            explanation: explanation.to_string(),
            confidence: 0.0,
            fallback_selectors: Vec::new(),
        }
    }

    /// Promote a successful generation into a stored rule, conversation
    /// included.
    pub fn to_rule(&self, request: &str) -> Rule {
        let mut rule = Rule::new(request, &self.css, self.selectors.clone());
        rule.fallback_selectors = self.fallback_selectors.clone();
        rule.confidence = self.confidence;
        rule.conversation.push(ConversationTurn::user(request));
        if !self.explanation.is_empty() {
            rule.conversation
                .push(ConversationTurn::assistant(&self.explanation));
        }
        rule
    }
}
