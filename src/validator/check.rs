use std::collections::HashMap;

use serde::Serialize;

use crate::dom::dom_model::Document;
use crate::dom::style;
use crate::rules::rule_model::Rule;
use crate::selector::query;

// ============================================================================
// Validation pass
// ============================================================================

/// What a validation pass was responding to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassTrigger {
    Initial,
    Interval,
    Mutation,
}

/// Health of one selector against the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorStatus {
    /// Matches, and the rule's effect holds on every target.
    Valid,
    /// Matches, but the effect holds on only some targets.
    Partial,
    /// No matches, or the effect holds nowhere.
    Invalid,
}

/// The slice of a rule the validator needs. `expects_hidden` is read off
/// the rule's CSS: hide rules are checked for effect, anything else only
/// for selector reachability.
#[derive(Debug, Clone)]
pub struct TrackedRule {
    pub rule_id: String,
    pub selectors: Vec<String>,
    pub expects_hidden: bool,
}

impl TrackedRule {
    pub fn from_rule(rule: &Rule) -> Self {
        TrackedRule {
            rule_id: rule.id.clone(),
            selectors: rule.selectors.clone(),
            expects_hidden: css_hides(&rule.css),
        }
    }
}

fn css_hides(css: &str) -> bool {
    let normalized: String = css
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    normalized.contains("display:none")
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectorCheck {
    pub selector: String,
    pub matches: usize,
    pub hidden: usize,
    pub status: SelectorStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleCheck {
    pub rule_id: String,
    pub selectors: Vec<SelectorCheck>,
    pub passed: bool,
}

/// A selector that worked on an earlier pass and stopped working.
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub rule_id: String,
    pub selector: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassOutcome {
    pub trigger: PassTrigger,
    pub checks: Vec<RuleCheck>,
    pub failed_rule_ids: Vec<String>,
    pub recovered_rule_ids: Vec<String>,
    pub transitions: Vec<Transition>,
}

impl PassOutcome {
    pub fn rules_checked(&self) -> usize {
        self.checks.len()
    }
}

/// Per-session memory of what worked, keyed finely enough to log the exact
/// selector that regressed.
#[derive(Debug, Default)]
pub struct ValidationHistory {
    selectors: HashMap<(String, String), bool>,
    rules: HashMap<String, bool>,
}

/// Lowest acceptable status for a selector to count as working.
fn selector_holds(status: SelectorStatus) -> bool {
    status != SelectorStatus::Invalid
}

pub fn check_selector(doc: &Document, selector: &str, expects_hidden: bool) -> SelectorCheck {
    // An unparseable selector matches nothing, same as a vanished element.
    let targets = query::query_all(doc, selector).unwrap_or_default();
    let matches = targets.len();
    let hidden = targets
        .iter()
        .filter(|&&id| style::is_css_hidden(doc, id))
        .count();
    let status = if matches == 0 {
        SelectorStatus::Invalid
    } else if !expects_hidden {
        SelectorStatus::Valid
    } else if hidden == matches {
        SelectorStatus::Valid
    } else if hidden > 0 {
        SelectorStatus::Partial
    } else {
        SelectorStatus::Invalid
    };
    SelectorCheck {
        selector: selector.to_string(),
        matches,
        hidden,
        status,
    }
}

/// Check every tracked rule against the document. A rule passes while at
/// least one of its selectors holds; rules without selectors are skipped.
pub fn run_pass(
    doc: &Document,
    rules: &[TrackedRule],
    history: &mut ValidationHistory,
    trigger: PassTrigger,
) -> PassOutcome {
    let mut checks = Vec::new();
    let mut failed_rule_ids = Vec::new();
    let mut recovered_rule_ids = Vec::new();
    let mut transitions = Vec::new();

    for rule in rules {
        if rule.selectors.is_empty() {
            continue;
        }
        let mut selector_checks = Vec::new();
        for selector in &rule.selectors {
            let check = check_selector(doc, selector, rule.expects_hidden);
            let holds = selector_holds(check.status);
            let key = (rule.rule_id.clone(), selector.clone());
            let prev = history.selectors.insert(key, holds);
            if prev == Some(true) && !holds {
                log::warn!(
                    "selector '{}' for rule {} stopped matching",
                    selector,
                    rule.rule_id
                );
                transitions.push(Transition {
                    rule_id: rule.rule_id.clone(),
                    selector: selector.clone(),
                });
            }
            selector_checks.push(check);
        }

        let passed = selector_checks.iter().any(|c| selector_holds(c.status));
        let prev = history.rules.insert(rule.rule_id.clone(), passed);
        if !passed {
            failed_rule_ids.push(rule.rule_id.clone());
        } else if prev == Some(false) {
            recovered_rule_ids.push(rule.rule_id.clone());
        }
        checks.push(RuleCheck {
            rule_id: rule.rule_id.clone(),
            selectors: selector_checks,
            passed,
        });
    }

    PassOutcome {
        trigger,
        checks,
        failed_rule_ids,
        recovered_rule_ids,
        transitions,
    }
}
