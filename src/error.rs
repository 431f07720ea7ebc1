use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// Page HTML could not be read from disk
    PageRead { path: String, source: std::io::Error },

    /// Rule store file could not be read
    StoreRead { path: String, source: std::io::Error },

    /// Rule store file could not be written
    StoreWrite { path: String, source: std::io::Error },

    /// JSON parsing failed (rule store or backend response)
    JsonParse { context: String, source: serde_json::Error },

    /// JSON serialization failed (rule store or report output)
    JsonSerialize { context: String, source: serde_json::Error },

    /// YAML parsing failed (config or scenario file)
    YamlParse { context: String, source: serde_yaml::Error },

    /// Scenario file could not be read
    ScenarioRead { path: String, source: std::io::Error },

    /// No rules stored for the requested domain
    DomainMissing(String),

    /// Rule id not present in the domain's collection
    RuleNotFound { rule: String, domain: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::PageRead { path, source } => {
                write!(f, "Failed to read page '{}': {}", path, source)
            }
            EngineError::StoreRead { path, source } => {
                write!(f, "Failed to read rule store '{}': {}", path, source)
            }
            EngineError::StoreWrite { path, source } => {
                write!(f, "Failed to write rule store '{}': {}", path, source)
            }
            EngineError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            EngineError::JsonSerialize { context, source } => {
                write!(f, "JSON serialize error ({}): {}", context, source)
            }
            EngineError::YamlParse { context, source } => {
                write!(f, "YAML parse error ({}): {}", context, source)
            }
            EngineError::ScenarioRead { path, source } => {
                write!(f, "Failed to read scenario '{}': {}", path, source)
            }
            EngineError::DomainMissing(domain) => {
                write!(f, "No rules stored for domain '{}'", domain)
            }
            EngineError::RuleNotFound { rule, domain } => {
                write!(f, "Rule '{}' not found under domain '{}'", rule, domain)
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::PageRead { source, .. } => Some(source),
            EngineError::StoreRead { source, .. } => Some(source),
            EngineError::StoreWrite { source, .. } => Some(source),
            EngineError::JsonParse { source, .. } => Some(source),
            EngineError::JsonSerialize { source, .. } => Some(source),
            EngineError::YamlParse { source, .. } => Some(source),
            EngineError::ScenarioRead { source, .. } => Some(source),
            _ => None,
        }
    }
}
