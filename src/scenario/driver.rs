use std::time::Duration;

use serde::Serialize;

use crate::dom::live::LivePage;
use crate::scenario::scenario_model::{ScenarioSpec, ScenarioStep};
use crate::selector::query;

/// Replays a ScenarioSpec against a LivePage, step by step.
pub struct ScenarioDriver;

/// Result of replaying a complete scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Name of the scenario that was replayed
    pub scenario_name: String,

    /// Number of steps that were executed
    pub steps_run: usize,

    /// Steps that could not be applied, with the reason
    pub skipped: Vec<SkippedStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedStep {
    pub step_index: usize,
    pub reason: String,
}

impl ScenarioDriver {
    /// Replay every step in order. Waits yield to the runtime, so a watcher
    /// on the same page observes the mutations with realistic pacing.
    /// Each mutating step is delivered as its own batch.
    pub async fn run(spec: &ScenarioSpec, live: &LivePage) -> ScenarioResult {
        let mut result = ScenarioResult {
            scenario_name: spec.name.clone(),
            steps_run: 0,
            skipped: Vec::new(),
        };

        for (i, step) in spec.steps.iter().enumerate() {
            result.steps_run = i + 1;
            match step {
                ScenarioStep::Wait { duration_ms } => {
                    tokio::time::sleep(Duration::from_millis(*duration_ms)).await;
                }
                mutation => Self::execute_mutation(mutation, i, live, &mut result),
            }
        }

        result
    }

    fn execute_mutation(
        step: &ScenarioStep,
        step_index: usize,
        live: &LivePage,
        result: &mut ScenarioResult,
    ) {
        let selector = match step {
            ScenarioStep::RemoveNode { selector }
            | ScenarioStep::SetAttribute { selector, .. }
            | ScenarioStep::RemoveAttribute { selector, .. }
            | ScenarioStep::AppendChild { selector, .. }
            | ScenarioStep::SetText { selector, .. }
            | ScenarioStep::EditText { selector, .. } => selector.clone(),
            ScenarioStep::Wait { .. } => return,
        };

        let mut skip_reason: Option<String> = None;
        live.mutate(|doc| {
            let target = match query::query_first(doc, &selector) {
                Ok(Some(target)) => target,
                Ok(None) => {
                    skip_reason = Some(format!("Element '{}' not found on page", selector));
                    return Vec::new();
                }
                Err(e) => {
                    skip_reason = Some(format!("{}", e));
                    return Vec::new();
                }
            };

            let record = match step {
                ScenarioStep::RemoveNode { .. } => doc.remove_node(target),
                ScenarioStep::SetAttribute { name, value, .. } => {
                    doc.set_attribute(target, name, value)
                }
                ScenarioStep::RemoveAttribute { name, .. } => doc.remove_attribute(target, name),
                ScenarioStep::AppendChild {
                    tag, attrs, text, ..
                } => {
                    let attr_pairs: Vec<(&str, &str)> = attrs
                        .iter()
                        .map(|(k, v)| (k.as_str(), v.as_str()))
                        .collect();
                    doc.append_child_element(target, tag, &attr_pairs, text.as_deref())
                        .map(|(_, record)| record)
                }
                ScenarioStep::SetText { text, .. } => doc.set_text(target, text),
                ScenarioStep::EditText { text, .. } => doc.edit_text(target, text),
                ScenarioStep::Wait { .. } => None,
            };

            match record {
                Some(record) => vec![record],
                None => {
                    skip_reason = Some(format!(
                        "Step could not be applied to '{}' (wrong node kind or protected node)",
                        selector
                    ));
                    Vec::new()
                }
            }
        });

        if let Some(reason) = skip_reason {
            log::debug!("scenario step {} skipped: {}", step_index, reason);
            result.skipped.push(SkippedStep { step_index, reason });
        }
    }
}
