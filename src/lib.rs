use std::sync::Arc;
use std::time::Duration;

use crate::{
    dom::live::LivePage,
    report::report_model::WatchReport,
    rules::classifier::Coordinator,
    rules::store::{FailureSink, RuleStore},
    scenario::driver::ScenarioDriver,
    scenario::scenario_model::ScenarioSpec,
    trace::logger::TraceLogger,
    validator::watcher::{RuleValidator, ValidatorConfig, ValidatorTiming},
};

pub mod cli;
pub mod dom;
pub mod error;
pub mod llm;
pub mod relevance;
pub mod report;
pub mod rules;
pub mod scenario;
pub mod selector;
pub mod summary;
pub mod trace;
pub mod validator;

/// How a watch session should run.
pub struct WatchOptions {
    pub domain: String,
    pub url: String,
    pub timing: ValidatorTiming,

    /// Scenario to replay; None means idle-watch for `idle_duration`.
    pub scenario: Option<ScenarioSpec>,
    pub idle_duration: Duration,

    /// Raise notifications on rule status transitions.
    pub notify: bool,
}

/// One complete watch session against an already-loaded page.
///
/// Installs the CSS of every enabled rule, starts the validator, replays
/// the scenario (or idles for the configured duration), then tears down
/// and classifies what the validator reported. The returned store carries
/// the updated failure counts and statuses; the caller decides whether to
/// persist it.
pub async fn run_watch_session(
    live: &LivePage,
    store: RuleStore,
    options: WatchOptions,
    trace: Arc<TraceLogger>,
) -> (WatchReport, RuleStore) {
    // ---- Install enabled rules ----
    let css_blocks: Vec<String> = store
        .rules_for(&options.domain)
        .iter()
        .filter(|r| r.enabled)
        .map(|r| r.css.clone())
        .collect();
    for css in &css_blocks {
        live.apply_css(css);
    }

    let coordinator = Arc::new(Coordinator::new(store, options.notify));
    let sink: Arc<dyn FailureSink + Send + Sync> = coordinator.clone();

    // ---- Watch ----
    let mut validator = RuleValidator::start(
        live,
        ValidatorConfig {
            domain: options.domain.clone(),
            url: options.url.clone(),
            timing: options.timing,
        },
        coordinator.as_ref(),
        sink,
        trace,
    );
    let tracked = validator.tracked_rules();
    log::info!(
        "watching {} with {} tracked rule(s)",
        options.domain,
        tracked
    );

    match &options.scenario {
        Some(spec) => {
            let result = ScenarioDriver::run(spec, live).await;
            if !result.skipped.is_empty() {
                log::warn!(
                    "scenario '{}': {} step(s) skipped",
                    result.scenario_name,
                    result.skipped.len()
                );
            }
            // Let the last debounce window elapse before tearing down.
            tokio::time::sleep(options.timing.debounce + options.timing.poll * 4).await;
        }
        None => tokio::time::sleep(options.idle_duration).await,
    }

    let stats = validator.stop().await;

    // ---- Classify and report ----
    let outcome = coordinator.outcome();
    let report = WatchReport::from_session(
        &options.domain,
        &options.url,
        tracked,
        stats,
        &outcome,
    );
    (report, outcome.store)
}
