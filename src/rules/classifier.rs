use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::rules::rule_model::{Rule, RuleStatus, BROKEN_THRESHOLD, WARNING_THRESHOLD};
use crate::rules::store::{FailureReport, FailureSink, RuleSource, RuleStore};

// ============================================================================
// Failure classification — turning reports into rule status
// ============================================================================

/// A user-facing signal that a rule stopped working.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub rule_id: String,
    pub domain: String,
    pub request: String,
    pub message: String,
}

/// Fold one failure report into the store.
///
/// Failed rules extend their streak; at `WARNING_THRESHOLD` the rule is
/// logged as at risk, at `BROKEN_THRESHOLD` it transitions to broken.
/// Recovered rules reset their streak. Notifications fire once per
/// transition, never on repeat failures of an already-broken rule.
pub fn apply_failure_report(
    store: &mut RuleStore,
    report: &FailureReport,
    notify_enabled: bool,
) -> Vec<Notification> {
    let now = Utc::now();
    let mut notifications = Vec::new();

    for rule_id in &report.failed_rule_ids {
        // A rule can be deleted between the pass and the report.
        let Ok(rule) = store.find_rule_mut(&report.domain, rule_id) else {
            continue;
        };
        rule.failure_count = rule.failure_count.saturating_add(1);
        rule.last_validated_at = Some(now);
        rule.updated_at = now;

        if rule.failure_count >= BROKEN_THRESHOLD {
            if rule.status == RuleStatus::Active {
                rule.status = RuleStatus::Broken;
                log::warn!(
                    "rule {} on {} marked broken after {} consecutive failures",
                    rule.id,
                    report.domain,
                    rule.failure_count
                );
                if notify_enabled {
                    notifications.push(broken_notification(rule, &report.domain));
                }
            }
        } else if rule.failure_count >= WARNING_THRESHOLD {
            log::warn!(
                "rule {} on {} at risk: {} consecutive failed passes",
                rule.id,
                report.domain,
                rule.failure_count
            );
        }
    }

    for rule_id in &report.recovered_rule_ids {
        let Ok(rule) = store.find_rule_mut(&report.domain, rule_id) else {
            continue;
        };
        if rule.failure_count > 0 {
            log::info!(
                "rule {} on {} recovered after {} failed passes",
                rule.id,
                report.domain,
                rule.failure_count
            );
        }
        rule.failure_count = 0;
        rule.last_validated_at = Some(now);
        rule.updated_at = now;
    }

    notifications
}

fn broken_notification(rule: &Rule, domain: &str) -> Notification {
    Notification {
        rule_id: rule.id.clone(),
        domain: domain.to_string(),
        request: rule.request.clone(),
        message: format!(
            "Your customization \"{}\" on {} stopped working. The page layout may have changed.",
            rule.request, domain
        ),
    }
}

// ============================================================================
// Coordinator
// ============================================================================

struct CoordinatorState {
    store: RuleStore,
    reports: Vec<FailureReport>,
    notifications: Vec<Notification>,
}

/// Owns the store while a watch session runs: hands rules to the validator
/// and folds its failure reports back in.
pub struct Coordinator {
    state: Mutex<CoordinatorState>,
    notify_enabled: bool,
}

/// Everything a watch session produced so far.
#[derive(Debug, Clone)]
pub struct CoordinatorOutcome {
    pub store: RuleStore,
    pub reports: Vec<FailureReport>,
    pub notifications: Vec<Notification>,
}

impl Coordinator {
    pub fn new(store: RuleStore, notify_enabled: bool) -> Self {
        Coordinator {
            state: Mutex::new(CoordinatorState {
                store,
                reports: Vec::new(),
                notifications: Vec::new(),
            }),
            notify_enabled,
        }
    }

    /// Snapshot the store and everything classified so far.
    pub fn outcome(&self) -> CoordinatorOutcome {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        CoordinatorOutcome {
            store: state.store.clone(),
            reports: state.reports.clone(),
            notifications: state.notifications.clone(),
        }
    }
}

impl RuleSource for Coordinator {
    fn rules_for_domain(&self, domain: &str) -> Vec<Rule> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.store.rules_for(domain).to_vec()
    }
}

impl FailureSink for Coordinator {
    fn report_failures(&self, report: &FailureReport) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let notifications = apply_failure_report(&mut state.store, report, self.notify_enabled);
        state.notifications.extend(notifications);
        state.reports.push(report.clone());
        Ok(())
    }
}
