mod common;

use std::collections::HashMap;

use common::pages::live_news_page;
use stylewarden::scenario::driver::ScenarioDriver;
use stylewarden::scenario::scenario_model::{ScenarioSpec, ScenarioStep};
use stylewarden::selector::query;

// ============================================================================
// Scenario model tests
// ============================================================================

#[test]
fn test_parse_scenario_yaml() {
    let yaml = r#"
name: promo-shuffle
steps:
  - action: wait
    duration_ms: 250
  - action: remove_node
    selector: "#promo"
  - action: set_attribute
    selector: "#sidebar"
    name: class
    value: sidebar collapsed
  - action: remove_attribute
    selector: "#main-nav"
    name: aria-label
  - action: append_child
    selector: main
    tag: div
    attrs:
      class: injected-banner
    text: Breaking news
  - action: set_text
    selector: h2
    text: Replaced headline
  - action: edit_text
    selector: h2
    text: Edited headline
"#;

    let spec: ScenarioSpec = serde_yaml::from_str(yaml).expect("scenario should parse");
    assert_eq!(spec.name, "promo-shuffle");
    assert_eq!(spec.steps.len(), 7);

    match &spec.steps[0] {
        ScenarioStep::Wait { duration_ms } => assert_eq!(*duration_ms, 250),
        other => panic!("Expected Wait step, got {:?}", other),
    }
    match &spec.steps[1] {
        ScenarioStep::RemoveNode { selector } => assert_eq!(selector, "#promo"),
        other => panic!("Expected RemoveNode step, got {:?}", other),
    }
    match &spec.steps[2] {
        ScenarioStep::SetAttribute { selector, name, value } => {
            assert_eq!(selector, "#sidebar");
            assert_eq!(name, "class");
            assert_eq!(value, "sidebar collapsed");
        }
        other => panic!("Expected SetAttribute step, got {:?}", other),
    }
    match &spec.steps[4] {
        ScenarioStep::AppendChild { tag, attrs, text, .. } => {
            assert_eq!(tag, "div");
            assert_eq!(attrs.get("class").map(String::as_str), Some("injected-banner"));
            assert_eq!(text.as_deref(), Some("Breaking news"));
        }
        other => panic!("Expected AppendChild step, got {:?}", other),
    }
}

#[test]
fn test_append_child_attrs_default_to_empty() {
    let yaml = r#"
name: minimal
steps:
  - action: append_child
    selector: body
    tag: p
"#;
    let spec: ScenarioSpec = serde_yaml::from_str(yaml).expect("parse");
    match &spec.steps[0] {
        ScenarioStep::AppendChild { attrs, text, .. } => {
            assert!(attrs.is_empty());
            assert!(text.is_none());
        }
        other => panic!("Expected AppendChild step, got {:?}", other),
    }
}

#[test]
fn test_scenario_roundtrip() {
    let spec = ScenarioSpec {
        name: "roundtrip".to_string(),
        steps: vec![
            ScenarioStep::Wait { duration_ms: 10 },
            ScenarioStep::RemoveNode {
                selector: "#promo".to_string(),
            },
        ],
    };
    let yaml = serde_yaml::to_string(&spec).expect("serialize");
    let back: ScenarioSpec = serde_yaml::from_str(&yaml).expect("reparse");
    assert_eq!(back, spec);
}

#[test]
fn test_unknown_action_is_an_error() {
    let yaml = r#"
name: bad
steps:
  - action: teleport
    selector: "#promo"
"#;
    assert!(serde_yaml::from_str::<ScenarioSpec>(yaml).is_err());
}

// ============================================================================
// Driver tests
// ============================================================================

fn shuffle_spec() -> ScenarioSpec {
    ScenarioSpec {
        name: "shuffle".to_string(),
        steps: vec![
            ScenarioStep::RemoveNode {
                selector: "#promo".to_string(),
            },
            ScenarioStep::Wait { duration_ms: 10 },
            ScenarioStep::SetAttribute {
                selector: "#sidebar".to_string(),
                name: "class".to_string(),
                value: "sidebar collapsed".to_string(),
            },
            ScenarioStep::AppendChild {
                selector: "main".to_string(),
                tag: "div".to_string(),
                attrs: HashMap::from([("class".to_string(), "injected-banner".to_string())]),
                text: Some("Breaking news".to_string()),
            },
            ScenarioStep::SetText {
                selector: "h2".to_string(),
                text: "Replaced headline".to_string(),
            },
        ],
    }
}

#[tokio::test(start_paused = true)]
async fn test_driver_applies_steps_in_order() {
    let live = live_news_page();
    let result = ScenarioDriver::run(&shuffle_spec(), &live).await;

    assert_eq!(result.scenario_name, "shuffle");
    assert_eq!(result.steps_run, 5);
    assert!(result.skipped.is_empty(), "every step should apply: {:?}", result.skipped);

    live.with(|doc| {
        assert!(query::query_first(doc, "#promo").unwrap().is_none(), "promo removed");
        let sidebar = query::query_first(doc, "#sidebar").unwrap().unwrap();
        assert_eq!(doc.attr(sidebar, "class"), Some("sidebar collapsed"));
        assert!(query::query_first(doc, ".injected-banner").unwrap().is_some());
        let headline = query::query_first(doc, "h2").unwrap().unwrap();
        assert_eq!(doc.direct_text(headline), "Replaced headline");
    });
}

#[tokio::test(start_paused = true)]
async fn test_each_mutating_step_is_one_batch() {
    let live = live_news_page();
    let mut mutations = live.subscribe();

    ScenarioDriver::run(&shuffle_spec(), &live).await;

    let mut batches = 0;
    while let Ok(batch) = mutations.try_recv() {
        assert_eq!(batch.len(), 1, "one record per step");
        batches += 1;
    }
    assert_eq!(batches, 4, "four mutating steps, the wait emits nothing");
}

#[tokio::test(start_paused = true)]
async fn test_unapplicable_steps_are_skipped_with_reasons() {
    let live = live_news_page();
    let spec = ScenarioSpec {
        name: "broken".to_string(),
        steps: vec![
            ScenarioStep::RemoveNode {
                selector: "#no-such-element".to_string(),
            },
            ScenarioStep::RemoveNode {
                selector: "div:hover".to_string(),
            },
            ScenarioStep::EditText {
                selector: "#content".to_string(),
                text: "x".to_string(),
            },
            ScenarioStep::RemoveNode {
                selector: "#sidebar".to_string(),
            },
        ],
    };
    let result = ScenarioDriver::run(&spec, &live).await;

    assert_eq!(result.steps_run, 4);
    assert_eq!(result.skipped.len(), 3, "the last step still applies");
    assert_eq!(result.skipped[0].step_index, 0);
    assert!(result.skipped[0].reason.contains("not found"));
    assert!(result.skipped[1].reason.contains("Invalid selector"));
    assert!(
        result.skipped[2].reason.contains("could not be applied"),
        "main has no direct text node to edit: {}",
        result.skipped[2].reason
    );

    live.with(|doc| {
        assert!(query::query_first(doc, "#sidebar").unwrap().is_none());
    });
}

#[tokio::test(start_paused = true)]
async fn test_failed_steps_emit_no_batches() {
    let live = live_news_page();
    let mut mutations = live.subscribe();
    let spec = ScenarioSpec {
        name: "noop".to_string(),
        steps: vec![ScenarioStep::RemoveNode {
            selector: "#no-such-element".to_string(),
        }],
    };
    ScenarioDriver::run(&spec, &live).await;
    assert!(mutations.try_recv().is_err(), "empty batches are never delivered");
}
