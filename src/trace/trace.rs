use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::validator::check::{PassOutcome, PassTrigger};

#[derive(Debug, Serialize)]
pub struct ValidationEvent {
    pub timestamp_ms: u128,
    pub pass: u64,

    pub trigger: String,

    pub rules_checked: usize,
    pub failed_rule_ids: Vec<String>,
    pub recovered_rule_ids: Vec<String>,

    pub transitions: Vec<String>,
    pub report_dispatched: bool,
}

impl ValidationEvent {
    pub fn now(pass: u64, trigger: PassTrigger) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_millis(),
            pass,
            trigger: format!("{:?}", trigger),
            rules_checked: 0,
            failed_rule_ids: vec![],
            recovered_rule_ids: vec![],
            transitions: vec![],
            report_dispatched: false,
        }
    }

    pub fn with_outcome(mut self, outcome: &PassOutcome) -> Self {
        self.rules_checked = outcome.rules_checked();
        self.failed_rule_ids = outcome.failed_rule_ids.clone();
        self.recovered_rule_ids = outcome.recovered_rule_ids.clone();
        self.transitions = outcome
            .transitions
            .iter()
            .map(|t| format!("{}:{}", t.rule_id, t.selector))
            .collect();
        self
    }

    pub fn with_report(mut self, dispatched: bool) -> Self {
        self.report_dispatched = dispatched;
        self
    }
}
