use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::rules::rule_model::Rule;

// ============================================================================
// Rule store — JSON persistence keyed by domain
// ============================================================================

/// All stored rules, grouped by the site they apply to. Domain keys are
/// normalized so `WWW.Example.com` and `example.com` share one bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleStore {
    #[serde(default)]
    pub domains: BTreeMap<String, Vec<Rule>>,
}

/// Lowercased hostname without a leading `www.`.
pub fn normalize_domain(domain: &str) -> String {
    let lower = domain.trim().to_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => lower,
    }
}

/// Normalized host of a URL: scheme, path, port, and userinfo stripped.
pub fn domain_from_url(url: &str) -> String {
    let rest = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url,
    };
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .rsplit('@')
        .next()
        .unwrap_or("");
    let host = host.split(':').next().unwrap_or(host);
    normalize_domain(host)
}

impl RuleStore {
    /// Load a store from disk. A missing file is an empty store, not an
    /// error; the first save creates it.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            return Ok(RuleStore::default());
        }
        let content = fs::read_to_string(path).map_err(|e| EngineError::StoreRead {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| EngineError::JsonParse {
            context: path.display().to_string(),
            source: e,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| EngineError::JsonSerialize {
                context: path.display().to_string(),
                source: e,
            })?;
        fs::write(path, content).map_err(|e| EngineError::StoreWrite {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn rules_for(&self, domain: &str) -> &[Rule] {
        self.domains
            .get(&normalize_domain(domain))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn add_rule(&mut self, domain: &str, rule: Rule) {
        self.domains
            .entry(normalize_domain(domain))
            .or_default()
            .push(rule);
    }

    pub fn find_rule(&self, domain: &str, rule_id: &str) -> Result<&Rule, EngineError> {
        let key = normalize_domain(domain);
        let rules = self
            .domains
            .get(&key)
            .ok_or_else(|| EngineError::DomainMissing(key.clone()))?;
        rules
            .iter()
            .find(|r| r.id == rule_id)
            .ok_or_else(|| EngineError::RuleNotFound {
                rule: rule_id.to_string(),
                domain: key,
            })
    }

    pub fn find_rule_mut(&mut self, domain: &str, rule_id: &str) -> Result<&mut Rule, EngineError> {
        let key = normalize_domain(domain);
        let rules = self
            .domains
            .get_mut(&key)
            .ok_or_else(|| EngineError::DomainMissing(key.clone()))?;
        rules
            .iter_mut()
            .find(|r| r.id == rule_id)
            .ok_or_else(|| EngineError::RuleNotFound {
                rule: rule_id.to_string(),
                domain: key,
            })
    }

    /// Remove a rule; the domain bucket goes with it when it empties.
    pub fn delete_rule(&mut self, domain: &str, rule_id: &str) -> Result<Rule, EngineError> {
        let key = normalize_domain(domain);
        let rules = self
            .domains
            .get_mut(&key)
            .ok_or_else(|| EngineError::DomainMissing(key.clone()))?;
        let idx = rules.iter().position(|r| r.id == rule_id).ok_or_else(|| {
            EngineError::RuleNotFound {
                rule: rule_id.to_string(),
                domain: key.clone(),
            }
        })?;
        let removed = rules.remove(idx);
        if rules.is_empty() {
            self.domains.remove(&key);
        }
        Ok(removed)
    }

    pub fn rule_count(&self) -> usize {
        self.domains.values().map(Vec::len).sum()
    }
}

// ============================================================================
// Validator-facing traits
// ============================================================================

/// Where the validator gets the rules it should track.
pub trait RuleSource {
    fn rules_for_domain(&self, domain: &str) -> Vec<Rule>;
}

impl RuleSource for RuleStore {
    fn rules_for_domain(&self, domain: &str) -> Vec<Rule> {
        self.rules_for(domain).to_vec()
    }
}

/// A validation pass worth reporting: rules that are failing now, plus
/// rules that were failing earlier in the session and pass again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub domain: String,
    pub url: String,
    pub failed_rule_ids: Vec<String>,
    #[serde(default)]
    pub recovered_rule_ids: Vec<String>,
}

/// Where the validator sends failure reports.
pub trait FailureSink {
    fn report_failures(&self, report: &FailureReport) -> Result<(), EngineError>;
}
