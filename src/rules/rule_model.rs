use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Rule model
// ============================================================================

/// Consecutive failed validation passes before a rule is logged as at risk.
pub const WARNING_THRESHOLD: u32 = 2;
/// Consecutive failed validation passes before a rule is marked broken.
pub const BROKEN_THRESHOLD: u32 = 5;

/// Health of a rule's selectors against the live page.
///
/// Older stores carried a separate `warning` tier between active and broken;
/// those entries load as `Active` and the at-risk state lives only in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    #[serde(alias = "warning")]
    Active,
    Broken,
    Disabled,
}

/// One exchange in the conversation that produced or refined a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: &str) -> Self {
        ConversationTurn {
            role: "user".to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        ConversationTurn {
            role: "assistant".to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// A stored customization: the user's request, the CSS that implements it,
/// and the selectors the validator tracks on its behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    /// Natural-language request the rule was generated from.
    pub request: String,
    pub css: String,
    /// Primary selectors; the validator checks these.
    #[serde(default)]
    pub selectors: Vec<String>,
    /// Alternates to try when the primary selectors stop matching.
    #[serde(default)]
    pub fallback_selectors: Vec<String>,
    #[serde(default = "default_status")]
    pub status: RuleStatus,
    /// Status the rule held before it was disabled, restored on enable.
    #[serde(default)]
    pub previous_status: Option<RuleStatus>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub failure_count: u32,
    /// Generator's self-reported confidence in the selectors, 0.0 to 1.0.
    #[serde(default)]
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_validated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub conversation: Vec<ConversationTurn>,
}

fn default_status() -> RuleStatus {
    RuleStatus::Active
}

fn default_true() -> bool {
    true
}

impl Rule {
    pub fn new(request: &str, css: &str, selectors: Vec<String>) -> Self {
        let now = Utc::now();
        Rule {
            id: Uuid::new_v4().to_string(),
            request: request.to_string(),
            css: css.to_string(),
            selectors,
            fallback_selectors: Vec::new(),
            status: RuleStatus::Active,
            previous_status: None,
            enabled: true,
            failure_count: 0,
            confidence: 1.0,
            created_at: now,
            updated_at: now,
            last_validated_at: None,
            conversation: Vec::new(),
        }
    }

    /// Whether the validator should track this rule at all.
    pub fn is_validatable(&self) -> bool {
        self.enabled && self.status != RuleStatus::Disabled
    }

    /// Turn the rule off without forgetting it. The current status is
    /// remembered so a re-enable does not silently resurrect dead selectors
    /// as healthy.
    pub fn disable(&mut self) {
        if self.status == RuleStatus::Disabled {
            return;
        }
        self.previous_status = Some(self.status);
        self.enabled = false;
        self.status = RuleStatus::Disabled;
        self.updated_at = Utc::now();
    }

    pub fn enable(&mut self) {
        if self.status != RuleStatus::Disabled {
            self.enabled = true;
            return;
        }
        self.enabled = true;
        self.status = match self.previous_status.take() {
            Some(prev) => prev,
            // Stores written before the pre-disable status was kept fall
            // back to reconstructing it from the failure streak.
            None => {
                if self.failure_count >= BROKEN_THRESHOLD {
                    RuleStatus::Broken
                } else {
                    RuleStatus::Active
                }
            }
        };
        self.updated_at = Utc::now();
    }

    pub fn toggle(&mut self) {
        if self.enabled {
            self.disable();
        } else {
            self.enable();
        }
    }

    /// Replace the rule's CSS after a regeneration or repair. The failure
    /// streak restarts and a broken rule becomes active again.
    pub fn set_css(&mut self, css: &str, selectors: Vec<String>) {
        self.css = css.to_string();
        self.selectors = selectors;
        self.failure_count = 0;
        if self.status == RuleStatus::Broken {
            self.status = RuleStatus::Active;
        }
        if self.previous_status == Some(RuleStatus::Broken) {
            self.previous_status = Some(RuleStatus::Active);
        }
        self.updated_at = Utc::now();
    }

    pub fn record_turn(&mut self, turn: ConversationTurn) {
        self.conversation.push(turn);
        self.updated_at = Utc::now();
    }
}
