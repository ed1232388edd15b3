//! JSON output formatting

use crate::output::formatter::Report;
use serde_json::{json, Value};

pub fn format_json(report: &Report<'_>) -> String {
    let data: Value = match report {
        Report::Info(info) => serde_json::to_value(info).unwrap_or(json!(null)),
        Report::Dependencies(manifest) => serde_json::to_value(manifest).unwrap_or(json!(null)),
        Report::Apply(apply) => json!({
            "status": apply.status(),
            "fetched": apply.fetched,
            "installed": apply.installed,
        }),
        Report::Install(outcome) => serde_json::to_value(outcome).unwrap_or(json!(null)),
    };

    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, ManifestEntry};

    #[test]
    fn test_dependencies_json() {
        let mut manifest = Manifest::default();
        manifest
            .sources
            .push(ManifestEntry::new("https://github.com/OCA/web.git", "17.0", "web").unwrap());
        let out = format_json(&Report::Dependencies(&manifest));
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["location"], "external_addons");
        assert_eq!(value["sources"][0]["rev"], "17.0");
        assert_eq!(value["sources"][0]["type"], "git");
    }
}
