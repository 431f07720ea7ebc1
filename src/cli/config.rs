use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::validator::watcher::{
    ValidatorTiming, INITIAL_DELAY_MS, MUTATION_DEBOUNCE_MS, VALIDATION_INTERVAL_SECS,
};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "stylewarden",
    version,
    about = "Natural-language page customizations with self-healing CSS rules"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the rule store JSON file
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Ollama API endpoint
    #[arg(long, global = true)]
    pub ollama_endpoint: Option<String>,

    /// Ollama model name
    #[arg(long, global = true)]
    pub ollama_model: Option<String>,

    /// Path to config file (default: stylewarden.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the bounded text summary of a page
    Summarize {
        /// Path to the HTML page
        #[arg(long)]
        page: String,

        /// URL the page stands in for
        #[arg(long, default_value = "https://example.com/")]
        url: String,

        /// Include elements hidden by CSS
        #[arg(long, default_value_t = false)]
        include_hidden: bool,

        /// Maximum tree depth to serialize
        #[arg(long)]
        max_depth: Option<usize>,

        /// Maximum children serialized per element
        #[arg(long)]
        max_children: Option<usize>,
    },

    /// Find elements relevant to a request and print their selectors
    Selectors {
        /// Path to the HTML page
        #[arg(long)]
        page: String,

        /// URL the page stands in for
        #[arg(long, default_value = "https://example.com/")]
        url: String,

        /// Natural-language request to match against
        #[arg(long)]
        request: String,
    },

    /// Generate CSS for a request against a page
    Generate {
        /// Path to the HTML page
        #[arg(long)]
        page: String,

        /// URL the page stands in for
        #[arg(long, default_value = "https://example.com/")]
        url: String,

        /// Natural-language request, e.g. "hide the sidebar"
        #[arg(long)]
        request: String,

        /// Generator backend: mock or llm
        #[arg(long, default_value = "mock")]
        backend: String,

        /// Save the generated rule into the store
        #[arg(long, default_value_t = false)]
        save: bool,
    },

    /// Run one validation pass of the stored rules against a page
    Validate {
        /// Path to the HTML page
        #[arg(long)]
        page: String,

        /// URL the page stands in for
        #[arg(long, default_value = "https://example.com/")]
        url: String,

        /// Domain whose rules to validate (default: derived from the URL)
        #[arg(long)]
        domain: Option<String>,

        /// Print the pass outcome as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Watch a page, replaying an optional scenario, and report rule health
    Watch {
        /// Path to the HTML page
        #[arg(long)]
        page: String,

        /// URL the page stands in for
        #[arg(long, default_value = "https://example.com/")]
        url: String,

        /// Domain whose rules to watch (default: derived from the URL)
        #[arg(long)]
        domain: Option<String>,

        /// YAML scenario to replay against the page while watching
        #[arg(long)]
        scenario: Option<String>,

        /// How long to watch when no scenario is given, in milliseconds
        #[arg(long, default_value_t = 10_000)]
        duration_ms: u64,

        /// Write the watch report as JSON to this path instead of stdout
        #[arg(short, long)]
        report: Option<String>,

        /// Append JSONL validation trace events to this path
        #[arg(long)]
        trace: Option<String>,
    },

    /// Inspect and manage stored rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// List stored rules, optionally for one domain
    List {
        #[arg(long)]
        domain: Option<String>,
    },

    /// Re-enable a disabled rule
    Enable {
        #[arg(long)]
        domain: String,

        /// Rule id
        #[arg(long)]
        id: String,
    },

    /// Disable a rule without deleting it
    Disable {
        #[arg(long)]
        domain: String,

        /// Rule id
        #[arg(long)]
        id: String,
    },

    /// Delete a rule permanently
    Delete {
        #[arg(long)]
        domain: String,

        /// Rule id
        #[arg(long)]
        id: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `stylewarden.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "rules.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_true")]
    pub notify: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: INITIAL_DELAY_MS,
            interval_secs: VALIDATION_INTERVAL_SECS,
            debounce_ms: MUTATION_DEBOUNCE_MS,
            notify: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OllamaConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

// Serde default helpers
fn default_store_path() -> String { "rules.json".to_string() }
fn default_initial_delay_ms() -> u64 { INITIAL_DELAY_MS }
fn default_interval_secs() -> u64 { VALIDATION_INTERVAL_SECS }
fn default_debounce_ms() -> u64 { MUTATION_DEBOUNCE_MS }
fn default_true() -> bool { true }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("stylewarden.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Build a ValidatorTiming from the watch section of the config file.
pub fn build_timing(watch: &WatchConfig) -> ValidatorTiming {
    ValidatorTiming {
        initial_delay: Duration::from_millis(watch.initial_delay_ms),
        interval: Duration::from_secs(watch.interval_secs),
        debounce: Duration::from_millis(watch.debounce_ms),
        ..ValidatorTiming::default()
    }
}
