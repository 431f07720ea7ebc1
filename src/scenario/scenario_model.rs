use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A scripted page session. Deserialized from YAML (or built in-memory by
/// tests) and replayed against a live page, so rules can be watched under
/// the kind of churn a real site produces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSpec {
    /// Human-readable name for this scenario
    pub name: String,

    /// Ordered list of steps to replay
    pub steps: Vec<ScenarioStep>,
}

/// A single step in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Let the page sit idle
    Wait { duration_ms: u64 },

    /// Detach the first element matching the selector
    RemoveNode { selector: String },

    /// Set an attribute on the first matching element
    SetAttribute {
        selector: String,
        name: String,
        value: String,
    },

    /// Drop an attribute from the first matching element
    RemoveAttribute { selector: String, name: String },

    /// Append a child element under the first matching element
    AppendChild {
        selector: String,
        tag: String,
        #[serde(default)]
        attrs: HashMap<String, String>,
        text: Option<String>,
    },

    /// Replace an element's content with a single text node
    SetText { selector: String, text: String },

    /// Rewrite an element's first text node in place
    EditText { selector: String, text: String },
}

/// Load a scenario from a YAML file.
pub fn load_scenario(path: &Path) -> Result<ScenarioSpec, EngineError> {
    let content = fs::read_to_string(path).map_err(|e| EngineError::ScenarioRead {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_yaml::from_str(&content).map_err(|e| EngineError::YamlParse {
        context: path.display().to_string(),
        source: e,
    })
}
