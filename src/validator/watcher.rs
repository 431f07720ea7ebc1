use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::dom::dom_model::{MutationBatch, MutationRecord};
use crate::dom::live::LivePage;
use crate::rules::store::{FailureReport, FailureSink, RuleSource};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::ValidationEvent;
use crate::validator::check::{self, PassOutcome, PassTrigger, TrackedRule, ValidationHistory};

// ============================================================================
// Rule watcher — debounced revalidation against a live page
// ============================================================================

/// Counters for one watch session.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct WatchStats {
    pub passes: u64,
    pub failing_passes: u64,
    pub reports_dispatched: u64,
    pub last_outcome: Option<PassOutcome>,
}

/// Delay before the first pass, so a loading page can settle.
pub const INITIAL_DELAY_MS: u64 = 1000;
/// Period of the unconditional revalidation pass.
pub const VALIDATION_INTERVAL_SECS: u64 = 30;
/// Quiet time required after the last mutation before a triggered pass.
pub const MUTATION_DEBOUNCE_MS: u64 = 1000;
/// How often the loop checks whether the debounce window has elapsed.
pub const DEBOUNCE_POLL_MS: u64 = 100;

#[derive(Debug, Clone, Copy)]
pub struct ValidatorTiming {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub debounce: Duration,
    pub poll: Duration,
}

impl Default for ValidatorTiming {
    fn default() -> Self {
        ValidatorTiming {
            initial_delay: Duration::from_millis(INITIAL_DELAY_MS),
            interval: Duration::from_secs(VALIDATION_INTERVAL_SECS),
            debounce: Duration::from_millis(MUTATION_DEBOUNCE_MS),
            poll: Duration::from_millis(DEBOUNCE_POLL_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub domain: String,
    pub url: String,
    pub timing: ValidatorTiming,
}

struct WatchContext {
    config: ValidatorConfig,
    rules: Vec<TrackedRule>,
    sink: Arc<dyn FailureSink + Send + Sync>,
    trace: Arc<TraceLogger>,
}

/// Handle to a running watch session. Holds the shutdown side of the loop;
/// stopping returns the session's accumulated stats.
pub struct RuleValidator {
    running: Option<(oneshot::Sender<()>, JoinHandle<WatchStats>)>,
    tracked: usize,
}

impl RuleValidator {
    /// Snapshot the domain's validatable rules and start watching the page.
    /// With nothing to track the validator stays idle: no task, no
    /// mutation subscription.
    pub fn start(
        live: &LivePage,
        config: ValidatorConfig,
        source: &dyn RuleSource,
        sink: Arc<dyn FailureSink + Send + Sync>,
        trace: Arc<TraceLogger>,
    ) -> Self {
        let rules: Vec<TrackedRule> = source
            .rules_for_domain(&config.domain)
            .iter()
            .filter(|r| r.is_validatable() && !r.selectors.is_empty())
            .map(TrackedRule::from_rule)
            .collect();

        if rules.is_empty() {
            log::debug!("no validatable rules for {}; validator idle", config.domain);
            return RuleValidator {
                running: None,
                tracked: 0,
            };
        }

        let tracked = rules.len();
        let mutations = live.subscribe();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let ctx = WatchContext {
            config,
            rules,
            sink,
            trace,
        };
        let handle = tokio::spawn(watch_loop(live.clone(), mutations, shutdown_rx, ctx));

        RuleValidator {
            running: Some((shutdown_tx, handle)),
            tracked,
        }
    }

    pub fn is_watching(&self) -> bool {
        self.running.is_some()
    }

    pub fn tracked_rules(&self) -> usize {
        self.tracked
    }

    /// Stop the watch loop and collect its stats. Safe to call twice; the
    /// second call returns None.
    pub async fn stop(&mut self) -> Option<WatchStats> {
        let (shutdown_tx, handle) = self.running.take()?;
        let _ = shutdown_tx.send(());
        handle.await.ok()
    }
}

/// Whether a batch can change what the tracked selectors match or hide.
/// Structure changes and class/style edits can; text edits and other
/// attribute churn cannot.
fn batch_is_relevant(batch: &MutationBatch) -> bool {
    batch.iter().any(|record| match record {
        MutationRecord::ChildList { .. } => true,
        MutationRecord::Attribute { name, .. } => name == "class" || name == "style",
        MutationRecord::CharacterData { .. } => false,
    })
}

async fn watch_loop(
    live: LivePage,
    mut mutations: mpsc::UnboundedReceiver<MutationBatch>,
    mut shutdown: oneshot::Receiver<()>,
    ctx: WatchContext,
) -> WatchStats {
    let timing = ctx.config.timing;
    let mut history = ValidationHistory::default();
    let mut stats = WatchStats::default();
    let mut pass_counter: u64 = 0;

    tokio::select! {
        _ = &mut shutdown => return stats,
        _ = tokio::time::sleep(timing.initial_delay) => {}
    }
    run_and_report(
        &live,
        &ctx,
        &mut history,
        PassTrigger::Initial,
        &mut pass_counter,
        &mut stats,
    );

    // First periodic tick lands one full interval out, not immediately.
    let mut interval = tokio::time::interval_at(Instant::now() + timing.interval, timing.interval);
    let mut debounce_started: Option<Instant> = None;
    let mut pending_relevant = false;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                run_and_report(
                    &live,
                    &ctx,
                    &mut history,
                    PassTrigger::Interval,
                    &mut pass_counter,
                    &mut stats,
                );
            }
            batch = mutations.recv() => {
                match batch {
                    Some(batch) => {
                        // Every batch rearms the quiet window, relevant or
                        // not; a busy page defers validation until it calms.
                        debounce_started = Some(Instant::now());
                        pending_relevant = pending_relevant || batch_is_relevant(&batch);
                    }
                    None => {
                        log::debug!("mutation stream closed; stopping watch loop");
                        break;
                    }
                }
            }
            _ = tokio::time::sleep(timing.poll) => {
                let expired = debounce_started
                    .is_some_and(|started| started.elapsed() >= timing.debounce);
                if expired {
                    debounce_started = None;
                    let relevant = pending_relevant;
                    pending_relevant = false;
                    if relevant {
                        run_and_report(
                            &live,
                            &ctx,
                            &mut history,
                            PassTrigger::Mutation,
                            &mut pass_counter,
                            &mut stats,
                        );
                    }
                }
            }
        }
    }

    stats
}

fn run_and_report(
    live: &LivePage,
    ctx: &WatchContext,
    history: &mut ValidationHistory,
    trigger: PassTrigger,
    pass_counter: &mut u64,
    stats: &mut WatchStats,
) {
    *pass_counter += 1;
    let outcome = live.with(|doc| check::run_pass(doc, &ctx.rules, history, trigger));

    let dispatch =
        !outcome.failed_rule_ids.is_empty() || !outcome.recovered_rule_ids.is_empty();
    let mut dispatched = false;
    if dispatch {
        let report = FailureReport {
            domain: ctx.config.domain.clone(),
            url: ctx.config.url.clone(),
            failed_rule_ids: outcome.failed_rule_ids.clone(),
            recovered_rule_ids: outcome.recovered_rule_ids.clone(),
        };
        match ctx.sink.report_failures(&report) {
            Ok(()) => dispatched = true,
            Err(e) => log::debug!("failure report dropped: {}", e),
        }
    }

    ctx.trace.log(
        &ValidationEvent::now(*pass_counter, trigger)
            .with_outcome(&outcome)
            .with_report(dispatched),
    );

    stats.passes += 1;
    if !outcome.failed_rule_ids.is_empty() {
        stats.failing_passes += 1;
    }
    if dispatched {
        stats.reports_dispatched += 1;
    }
    stats.last_outcome = Some(outcome);
}
