//! Plain-text rendering of controller views for the console.

use std::fmt::Write as _;

use colored::Colorize;
use kb_controllers::{
    AdminAction, AdminView, ChartView, HistoryView, OnboardingFlow, QueryView, ReferenceView, UploadView,
};

const BAR_WIDTH: usize = 40;

pub const HELP: &str = "\
Commands:
  upload <path>                 upload a document
  ask <question>                ask a question about uploaded documents
  refs                          reload the reference list
  chart [bar|line] [filter]     load chart data
  history open|close|toggle <n> browse past questions
  onboarding next|back|finish|skip
  admin open|close|password <text>|login [password]|action <id>|logout
  help                          show this text
  quit                          exit";

pub fn upload(view: &UploadView) -> String {
    let mut out = String::new();
    if let Some(name) = &view.file_name {
        let _ = writeln!(out, "{} {name}", "File:".bold());
    }
    if view.shows_progress() {
        let filled = usize::from(view.progress) * BAR_WIDTH / 100;
        let _ = writeln!(
            out,
            "[{}{}] {}%",
            "#".repeat(filled),
            " ".repeat(BAR_WIDTH - filled),
            view.progress
        );
    }
    if let Some(err) = &view.error {
        let _ = writeln!(out, "{}", err.red());
    } else if let Some(result) = &view.result {
        let _ = writeln!(out, "{}", "Upload Result".green().bold());
        let pretty = serde_json::to_string_pretty(&result.metadata).unwrap_or_default();
        let _ = writeln!(out, "{pretty}");
    }
    out
}

pub fn query(view: &QueryView) -> String {
    let mut out = String::new();
    if view.loading {
        let _ = writeln!(out, "{}", "Searching...".dimmed());
        return out;
    }
    if let Some(err) = &view.error {
        let _ = writeln!(out, "{}", err.red());
        return out;
    }
    let Some(result) = &view.result else {
        return out;
    };

    let _ = writeln!(out, "{}", "Answer:".bold());
    let _ = writeln!(out, "{}", result.answer);
    if !result.references.is_empty() {
        let _ = writeln!(out, "{}", "References:".bold());
        for reference in &result.references {
            let _ = writeln!(out, "  - {reference}");
        }
    }
    if !result.follow_up_questions.is_empty() {
        let _ = writeln!(out, "{}", "Follow up questions:".bold());
        for question in &result.follow_up_questions {
            let _ = writeln!(out, "  - {question}");
        }
    }
    out
}

pub fn references(view: &ReferenceView) -> String {
    let mut out = format!("{}\n", "Knowledge References".bold());
    if view.loading {
        out.push_str("Loading...\n");
    } else if let Some(err) = &view.error {
        let _ = writeln!(out, "{}", err.red());
    } else if view.references.is_empty() {
        out.push_str("No references found.\n");
    } else {
        for reference in &view.references {
            let _ = writeln!(out, "  - {reference}");
        }
    }
    out
}

/// Horizontal bars scaled to the largest value.
pub fn chart(view: &ChartView) -> String {
    let mut out = format!("{} ({})\n", "Chart".bold(), view.kind);
    if let Some(filter) = &view.filter {
        let _ = writeln!(out, "filter: {filter}");
    }
    if view.loading {
        out.push_str("Loading chart...\n");
        return out;
    }
    if let Some(err) = &view.error {
        let _ = writeln!(out, "{}", err.red());
        return out;
    }
    let Some(series) = view.series.as_deref().filter(|s| !s.is_empty()) else {
        out.push_str("No chart data available.\n");
        return out;
    };

    let label_width = series.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
    let max = series.iter().map(|s| s.value).fold(0.0_f64, f64::max);
    for point in series {
        let len = if max > 0.0 {
            ((point.value.max(0.0) / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "{:<label_width$} | {} {}",
            point.label,
            "#".repeat(len).cyan(),
            point.value
        );
    }
    out
}

pub fn history(view: &HistoryView) -> String {
    if !view.open {
        return String::new();
    }
    let mut out = format!("{}\n", "Query History".bold());
    if view.loading {
        out.push_str("Loading...\n");
        return out;
    }
    if let Some(err) = &view.error {
        let _ = writeln!(out, "{}", err.red());
        return out;
    }
    if view.entries.is_empty() {
        out.push_str("No history yet.\n");
        return out;
    }

    for (idx, entry) in view.visible_entries().iter().enumerate() {
        let when = entry
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| entry.raw_timestamp.clone());
        let marker = if view.is_expanded(idx) { "v" } else { ">" };
        let _ = writeln!(out, "{marker} [{idx}] {}  {}", entry.question, when.dimmed());
        if view.is_expanded(idx) {
            let _ = writeln!(out, "      {}", entry.answer);
        }
    }
    out
}

pub fn onboarding(flow: &OnboardingFlow) -> String {
    let Some(step) = flow.current().filter(|_| flow.is_open()) else {
        return String::new();
    };
    let mut out = format!(
        "{}  {}\n",
        step.title.bold(),
        format!("Step {} of {}", flow.index() + 1, flow.step_count()).dimmed()
    );
    for line in step.lines {
        let _ = writeln!(out, "  {line}");
    }

    let mut controls = Vec::new();
    if flow.can_go_back() {
        controls.push("back");
    }
    controls.push(if flow.is_last_step() { "finish" } else { "next" });
    controls.push("skip");
    let _ = writeln!(out, "  ({})", controls.join(" | "));
    out
}

pub fn admin(view: &AdminView, actions: &[AdminAction]) -> String {
    if !view.open {
        return String::new();
    }
    let mut out = format!("{}\n", "Admin Panel".bold());

    if !view.is_authenticated() {
        out.push_str("Enter admin password.\n");
        if let Some(err) = &view.login_error {
            let _ = writeln!(out, "{}", err.red());
        }
        return out;
    }

    if view.dashboard_loading {
        out.push_str("Loading admin data...\n");
    } else if let Some(err) = view.dashboard_error() {
        let _ = writeln!(out, "{}", err.red());
    } else if let Some(data) = &view.dashboard {
        let pretty = serde_json::to_string_pretty(data).unwrap_or_default();
        let _ = writeln!(out, "{pretty}");
    }

    let _ = writeln!(out, "{}", "Quick actions:".bold());
    for action in actions {
        let status = match view.action(&action.action) {
            Some(f) if f.loading => "running...".yellow().to_string(),
            Some(f) if f.error.is_some() => "failed".red().to_string(),
            Some(f) if f.message.is_some() => "done".green().to_string(),
            _ => String::new(),
        };
        let _ = writeln!(out, "  {:<20} {}  {status}", action.action, action.label);
    }
    for (id, feedback) in &view.actions {
        if let Some(err) = &feedback.error {
            let _ = writeln!(out, "[{id}] {}", err.red());
        } else if let Some(message) = &feedback.message {
            let _ = writeln!(out, "[{id}]\n{message}");
        }
    }
    out
}
