use crate::report::report_model::WatchReport;
use crate::rules::rule_model::{Rule, RuleStatus};

// ============================================================================
// Console reporter — formatted terminal output
// ============================================================================

/// Format a watch report for terminal output.
///
/// Produces output like:
/// ```text
/// === Watch Report: example.com ===
///
/// 2 rule(s) tracked, 5 passes, 1 failure report(s)
///
/// ✓ OK      "hide the sidebar" (active)
/// ✗ BROKEN  "hide promoted posts" (5 consecutive failures)
///     [NOTIFY] Your customization "hide promoted posts" on example.com stopped working.
///
/// === Results: 1 healthy, 1 broken (2 total) ===
/// ```
pub fn format_console_report(report: &WatchReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Watch Report: {} ===\n\n", report.domain));

    match &report.stats {
        Some(stats) => out.push_str(&format!(
            "{} rule(s) tracked, {} passes, {} failure report(s)\n\n",
            report.tracked_rules, stats.passes, stats.reports_dispatched
        )),
        None => out.push_str("No validatable rules; the page was not watched\n\n"),
    }

    let mut healthy = 0;
    let mut broken = 0;
    for state in &report.rule_states {
        let marker = match state.status {
            RuleStatus::Broken => {
                broken += 1;
                "\u{2717} BROKEN"
            }
            RuleStatus::Disabled => "- OFF   ",
            RuleStatus::Active if state.failure_count > 0 => "! RISK  ",
            RuleStatus::Active => {
                healthy += 1;
                "\u{2713} OK    "
            }
        };
        let detail = if state.failure_count > 0 {
            format!("{} consecutive failures", state.failure_count)
        } else {
            format_status(state.status).to_string()
        };
        out.push_str(&format!(
            "{}  \"{}\" ({})\n",
            marker, state.request, detail
        ));
    }

    for notification in &report.notifications {
        out.push_str(&format!("    [NOTIFY] {}\n", notification.message));
    }

    out.push_str(&format!(
        "\n=== Results: {} healthy, {} broken ({} total) ===\n",
        healthy,
        broken,
        report.rule_states.len()
    ));

    out
}

/// One-line rule summary for `rules list` output.
pub fn format_rule_line(rule: &Rule) -> String {
    let toggle = if rule.enabled { "on " } else { "off" };
    format!(
        "[{}] {}  {:8}  \"{}\"  selectors: {}",
        toggle,
        rule.id,
        format_status(rule.status),
        rule.request,
        rule.selectors.join(", ")
    )
}

/// Format a RuleStatus variant name for display.
fn format_status(status: RuleStatus) -> &'static str {
    match status {
        RuleStatus::Active => "active",
        RuleStatus::Broken => "broken",
        RuleStatus::Disabled => "disabled",
    }
}
