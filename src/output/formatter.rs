//! Output formatting

use crate::info::ProjectInfo;
use crate::installer::DependencyOutcome;
use crate::manifest::{ApplyReport, Manifest};
use crate::output::human::format_human;
use crate::output::json::format_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Anything a command prints as its result
#[derive(Debug, Clone, Copy)]
pub enum Report<'a> {
    Info(&'a ProjectInfo),
    Dependencies(&'a Manifest),
    Apply(&'a ApplyReport),
    Install(&'a DependencyOutcome),
}

pub fn format_output(report: &Report<'_>, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(report),
        OutputFormat::Json => format_json(report),
    }
}
