//! Human-readable output formatting

use crate::info::ProjectInfo;
use crate::installer::{DependencyOutcome, InstallOutcome};
use crate::manifest::{ApplyReport, ApplyStatus, FetchStatus, Manifest};
use crate::output::formatter::Report;

pub fn format_human(report: &Report<'_>) -> String {
    match report {
        Report::Info(info) => format_info(info),
        Report::Dependencies(manifest) => format_dependencies(manifest),
        Report::Apply(apply) => format_apply(apply),
        Report::Install(outcome) => format_install(outcome),
    }
}

fn format_info(info: &ProjectInfo) -> String {
    let mut output = String::from("Project Information\n-------------------\n");
    output.push_str(&format!("Directory: {}\n", info.project_dir));
    for (key, value) in &info.answers {
        output.push_str(&format!("{:<18} {}\n", format!("{}:", key), value));
    }

    output.push_str("\nArtifacts\n");
    for artifact in &info.artifacts {
        output.push_str(&format!(
            "  {:<22} {}\n",
            artifact.path,
            if artifact.present { "ok" } else { "missing" }
        ));
    }

    output.push_str(&format!("\nDependencies ({})\n", info.dependencies.len()));
    for dep in &info.dependencies {
        output.push_str(&format!(
            "  {:<20} {:<10} {}{}\n",
            truncate(&dep.name, 20),
            dep.rev,
            dep.repo,
            if dep.present { "" } else { "  (not fetched)" }
        ));
    }

    output.push_str("\nAddons path\n");
    if info.addons_path.is_empty() {
        output.push_str("  (not set)\n");
    }
    for path in &info.addons_path {
        output.push_str(&format!("  {}\n", path));
    }
    output
}

fn format_dependencies(manifest: &Manifest) -> String {
    if manifest.is_empty() {
        return "No dependencies declared.".to_string();
    }
    let mut output = format!("{:<24} {:<12} {}\n", "TARGET", "REVISION", "REPOSITORY");
    output.push_str(&"-".repeat(72));
    output.push('\n');
    for entry in &manifest.sources {
        output.push_str(&format!(
            "{:<24} {:<12} {}\n",
            truncate(&entry.name, 24),
            truncate(&entry.rev, 12),
            entry.repo
        ));
    }
    output
}

fn format_apply(report: &ApplyReport) -> String {
    let mut output = String::new();
    for result in &report.fetched {
        match &result.status {
            FetchStatus::Fetched => {
                output.push_str(&format!("  fetched  {} @ {}\n", result.name, result.rev));
            }
            FetchStatus::Failed { cause } => {
                output.push_str(&format!("  FAILED   {} @ {}: {}\n", result.name, result.rev, cause));
            }
        }
    }
    for outcome in &report.installed {
        output.push_str(&format_install(outcome));
    }

    let summary = match report.status() {
        ApplyStatus::Empty => "No dependencies declared.".to_string(),
        ApplyStatus::Complete => format!("All {} dependencies fetched.", report.fetched.len()),
        ApplyStatus::Partial | ApplyStatus::Failed => format!(
            "{} of {} dependencies failed.",
            report.failed_count(),
            report.fetched.len()
        ),
    };
    output.push_str(&summary);
    output
}

fn format_install(outcome: &DependencyOutcome) -> String {
    match &outcome.outcome {
        InstallOutcome::Skipped { reason } => format!("  skipped  {} ({})\n", outcome.name, reason),
        InstallOutcome::Installed { packages } => {
            format!("  installed {} ({} packages)\n", outcome.name, packages)
        }
        InstallOutcome::Failed { status, output, .. } => {
            let mut text = format!("  FAILED   {} ({})\n", outcome.name, status);
            for line in output.lines().rev().take(5).collect::<Vec<_>>().into_iter().rev() {
                text.push_str(&format!("           {}\n", line));
            }
            if let Some(hint) = outcome.outcome.remediation() {
                text.push_str(&format!("           {}\n", hint));
            }
            text
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
