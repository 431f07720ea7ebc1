use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::dom::html;
use crate::dom::live::LivePage;
use crate::dom::style;
use crate::llm::backend::{CssGenerator, MockGenerator, OllamaBackend};
use crate::llm::css_model::GenerationRequest;
use crate::relevance::matcher;
use crate::report::console::{format_console_report, format_rule_line};
use crate::rules::rule_model::Rule;
use crate::rules::store::{domain_from_url, RuleStore};
use crate::scenario::scenario_model;
use crate::selector::builder;
use crate::summary::render;
use crate::summary::serializer::SerializeOptions;
use crate::trace::logger::TraceLogger;
use crate::validator::check::{self, PassTrigger, TrackedRule, ValidationHistory};
use crate::validator::watcher::ValidatorTiming;
use crate::WatchOptions;

// ============================================================================
// summarize subcommand
// ============================================================================

pub fn cmd_summarize(
    page: &str,
    url: &str,
    include_hidden: bool,
    max_depth: Option<usize>,
    max_children: Option<usize>,
    store_path: &str,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = html::load_page(Path::new(page), url)?;
    apply_enabled_rules(&mut doc, url, store_path)?;

    let mut options = SerializeOptions {
        include_hidden,
        ..SerializeOptions::default()
    };
    if let Some(depth) = max_depth {
        options.max_depth = depth;
    }
    if let Some(children) = max_children {
        options.max_children = children;
    }

    let summary = match crate::summary::serializer::serialize(&doc, doc.body(), &options) {
        Some(tree) => render::truncate_output(&render::render(&tree), render::PAGE_CHAR_BUDGET),
        None => String::new(),
    };
    if verbose > 0 {
        eprintln!("fingerprint: {}", render::fingerprint(&summary));
    }
    println!("{}", summary);
    Ok(())
}

// ============================================================================
// selectors subcommand
// ============================================================================

pub fn cmd_selectors(
    page: &str,
    url: &str,
    request: &str,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = html::load_page(Path::new(page), url)?;
    let matched = matcher::find_relevant(&doc, request);

    if matched.is_empty() {
        println!("No elements matched \"{}\"", request);
        return Ok(());
    }

    if verbose > 0 {
        eprintln!("{} element(s) matched", matched.len());
    }
    for id in matched {
        let selector = builder::build_selector(&doc, id);
        println!("{}  ({})", selector, doc.path_from_body(id));
    }
    Ok(())
}

// ============================================================================
// generate subcommand
// ============================================================================

/// Generate CSS for a request; returns whether the generation succeeded.
pub fn cmd_generate(
    page: &str,
    url: &str,
    request: &str,
    backend_name: &str,
    save: bool,
    store_path: &str,
    verbose: u8,
    ollama_endpoint: Option<&str>,
    ollama_model: Option<&str>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let doc = html::load_page(Path::new(page), url)?;
    let context = matcher::page_context(&doc, request);

    if verbose > 0 {
        eprintln!(
            "Page context: {:?}, {} chars",
            context.mode,
            context.text.chars().count()
        );
    }

    let generation_request = GenerationRequest {
        request: request.to_string(),
        url: url.to_string(),
        title: doc.title.clone(),
        context,
    };
    let generator = build_generator(backend_name, ollama_endpoint, ollama_model);

    let Some(generation) = generator.generate(&doc, &generation_request) else {
        eprintln!("Backend produced no usable generation");
        return Ok(false);
    };

    println!("{}", serde_json::to_string_pretty(&generation)?);

    if !generation.success {
        return Ok(false);
    }

    if save {
        let domain = domain_from_url(url);
        let mut store = RuleStore::load(Path::new(store_path))?;
        let rule = generation.to_rule(request);
        let rule_id = rule.id.clone();
        store.add_rule(&domain, rule);
        store.save(Path::new(store_path))?;
        eprintln!("Saved rule {} for {}", rule_id, domain);
    }

    Ok(true)
}

// ============================================================================
// validate subcommand
// ============================================================================

/// Run one validation pass; returns whether every tracked rule passed.
pub fn cmd_validate(
    page: &str,
    url: &str,
    domain: Option<&str>,
    json: bool,
    store_path: &str,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let domain = domain
        .map(str::to_string)
        .unwrap_or_else(|| domain_from_url(url));
    let mut store = RuleStore::load(Path::new(store_path))?;
    let mut doc = html::load_page(Path::new(page), url)?;

    // The page is checked as the extension would leave it: with every
    // enabled rule's CSS in effect.
    let css_blocks: Vec<String> = store
        .rules_for(&domain)
        .iter()
        .filter(|r| r.enabled)
        .map(|r| r.css.clone())
        .collect();
    for css in &css_blocks {
        style::apply_css(&mut doc, css);
    }

    let tracked: Vec<TrackedRule> = store
        .rules_for(&domain)
        .iter()
        .filter(|r| r.is_validatable() && !r.selectors.is_empty())
        .map(TrackedRule::from_rule)
        .collect();
    if tracked.is_empty() {
        println!("No validatable rules for {}", domain);
        return Ok(true);
    }
    if verbose > 0 {
        eprintln!("Validating {} rule(s) for {}", tracked.len(), domain);
    }

    let mut history = ValidationHistory::default();
    let outcome = check::run_pass(&doc, &tracked, &mut history, PassTrigger::Initial);

    let now = chrono::Utc::now();
    for rule_check in &outcome.checks {
        if let Ok(rule) = store.find_rule_mut(&domain, &rule_check.rule_id) {
            rule.last_validated_at = Some(now);
        }
    }
    store.save(Path::new(store_path))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for rule_check in &outcome.checks {
            let marker = if rule_check.passed { "\u{2713}" } else { "\u{2717}" };
            println!("{} {}", marker, rule_check.rule_id);
            for selector_check in &rule_check.selectors {
                println!(
                    "    {:?}  '{}' ({} matched, {} hidden)",
                    selector_check.status,
                    selector_check.selector,
                    selector_check.matches,
                    selector_check.hidden
                );
            }
        }
    }

    Ok(outcome.failed_rule_ids.is_empty())
}

// ============================================================================
// watch subcommand
// ============================================================================

/// Watch a page for a while, replaying an optional scenario. Returns
/// whether every rule came out healthy.
#[allow(clippy::too_many_arguments)]
pub fn cmd_watch(
    page: &str,
    url: &str,
    domain: Option<&str>,
    scenario_path: Option<&str>,
    duration_ms: u64,
    report_path: Option<&str>,
    trace_path: Option<&str>,
    store_path: &str,
    timing: ValidatorTiming,
    notify: bool,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let domain = domain
        .map(str::to_string)
        .unwrap_or_else(|| domain_from_url(url));
    let store = RuleStore::load(Path::new(store_path))?;
    let doc = html::load_page(Path::new(page), url)?;
    let live = LivePage::new(doc);

    let scenario = scenario_path
        .map(|p| scenario_model::load_scenario(Path::new(p)))
        .transpose()?;

    let trace = Arc::new(match trace_path {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    });

    if verbose > 0 {
        eprintln!("Watching {} as {} for rules on {}", page, url, domain);
    }

    let options = WatchOptions {
        domain: domain.clone(),
        url: url.to_string(),
        timing,
        scenario,
        idle_duration: Duration::from_millis(duration_ms),
        notify,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let (report, store) =
        runtime.block_on(crate::run_watch_session(&live, store, options, trace));

    store.save(Path::new(store_path))?;
    let healthy = report.all_healthy();

    match report_path {
        Some(path) => std::fs::write(path, serde_json::to_string_pretty(&report)?)?,
        None => print!("{}", format_console_report(&report)),
    }

    Ok(healthy)
}

// ============================================================================
// rules subcommand
// ============================================================================

pub fn cmd_rules_list(
    domain: Option<&str>,
    store_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = RuleStore::load(Path::new(store_path))?;
    if store.domains.is_empty() {
        println!("No rules stored");
        return Ok(());
    }
    for (key, rules) in &store.domains {
        if let Some(wanted) = domain {
            if key != &crate::rules::store::normalize_domain(wanted) {
                continue;
            }
        }
        println!("{} ({} rule(s)):", key, rules.len());
        for rule in rules {
            println!("  {}", format_rule_line(rule));
        }
    }
    Ok(())
}

pub fn cmd_rules_toggle(
    domain: &str,
    rule_id: &str,
    enable: bool,
    store_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = RuleStore::load(Path::new(store_path))?;
    let rule = store.find_rule_mut(domain, rule_id)?;
    if enable {
        rule.enable();
    } else {
        rule.disable();
    }
    let line = format_rule_line(rule);
    store.save(Path::new(store_path))?;
    println!("{}", line);
    Ok(())
}

pub fn cmd_rules_delete(
    domain: &str,
    rule_id: &str,
    store_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = RuleStore::load(Path::new(store_path))?;
    let removed: Rule = store.delete_rule(domain, rule_id)?;
    store.save(Path::new(store_path))?;
    println!("Deleted rule {} (\"{}\")", removed.id, removed.request);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Build the appropriate CssGenerator based on name.
fn build_generator(
    name: &str,
    ollama_endpoint: Option<&str>,
    ollama_model: Option<&str>,
) -> Box<dyn CssGenerator> {
    match name {
        "llm" => {
            let endpoint = ollama_endpoint.unwrap_or("http://localhost:11434/api/generate");
            let model = ollama_model.unwrap_or("qwen2.5:1.5b");
            Box::new(OllamaBackend::new(endpoint, model))
        }
        _ => Box::new(MockGenerator),
    }
}

/// Install the CSS of every enabled rule for the page's domain.
fn apply_enabled_rules(
    doc: &mut crate::dom::dom_model::Document,
    url: &str,
    store_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let domain = domain_from_url(url);
    let store = RuleStore::load(Path::new(store_path))?;
    for rule in store.rules_for(&domain) {
        if rule.enabled {
            style::apply_css(doc, &rule.css);
        }
    }
    Ok(())
}
