use serde::Serialize;

use crate::rules::classifier::{CoordinatorOutcome, Notification};
use crate::rules::rule_model::RuleStatus;
use crate::rules::store::{normalize_domain, FailureReport};
use crate::validator::watcher::WatchStats;

// ============================================================================
// Watch report — aggregates one watch session
// ============================================================================

/// Aggregated report for a watch session against one page.
///
/// Built from the validator's stats and the coordinator's outcome via
/// `from_session()`. Consumed by the console reporter and serialized to
/// JSON when a report path is given.
#[derive(Debug, Clone, Serialize)]
pub struct WatchReport {
    pub domain: String,
    pub url: String,

    /// Rules the validator tracked when the session started
    pub tracked_rules: usize,

    /// Pass counters; None when the validator had nothing to track
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<WatchStats>,

    /// Failure reports dispatched during the session
    pub reports: Vec<FailureReport>,

    /// Notifications raised by rule status transitions
    pub notifications: Vec<Notification>,

    /// Final state of every rule on the domain
    pub rule_states: Vec<RuleStateLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleStateLine {
    pub rule_id: String,
    pub request: String,
    pub status: RuleStatus,
    pub failure_count: u32,
}

impl WatchReport {
    /// Build a session report from the validator's stats and the
    /// coordinator's final state.
    pub fn from_session(
        domain: &str,
        url: &str,
        tracked_rules: usize,
        stats: Option<WatchStats>,
        outcome: &CoordinatorOutcome,
    ) -> Self {
        let key = normalize_domain(domain);
        let rule_states = outcome
            .store
            .rules_for(&key)
            .iter()
            .map(|r| RuleStateLine {
                rule_id: r.id.clone(),
                request: r.request.clone(),
                status: r.status,
                failure_count: r.failure_count,
            })
            .collect();
        Self {
            domain: key,
            url: url.to_string(),
            tracked_rules,
            stats,
            reports: outcome.reports.clone(),
            notifications: outcome.notifications.clone(),
            rule_states,
        }
    }

    /// Whether every rule came out of the session healthy.
    pub fn all_healthy(&self) -> bool {
        self.rule_states
            .iter()
            .all(|r| r.status != RuleStatus::Broken && r.failure_count == 0)
    }
}
