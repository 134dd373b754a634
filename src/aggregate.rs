// src/aggregate.rs

use crate::error::Result;
use crate::model::{ProgressReport, TeamAssignments, TeamProgress};
use regex::Regex;
use std::collections::BTreeMap;

const FIXED_GLYPH: &str = "✅";
const PENDING_GLYPH: &str = "❌";
const INDENT: &str = "  ";

/// Turns owner identifiers into short display names.
///
/// The pattern's first capture group extracts the short name from namespaced
/// owners such as `org/group/<short>/members`; display names then map short
/// name prefixes to human readable names, the longest prefix winning.
#[derive(Debug, Clone, Default)]
pub struct TeamLabeler {
    pattern: Option<Regex>,
    display_names: BTreeMap<String, String>,
}

impl TeamLabeler {
    pub fn new(pattern: &str, display_names: BTreeMap<String, String>) -> Result<Self> {
        let pattern = if pattern.is_empty() { None } else { Some(Regex::new(pattern)?) };
        Ok(Self { pattern, display_names })
    }

    pub fn short_name(&self, owner: &str) -> String {
        let short = self
            .pattern
            .as_ref()
            .and_then(|p| p.captures(owner))
            .and_then(|caps| caps.get(1))
            .map_or(owner, |m| m.as_str());

        self.display_names
            .iter()
            .filter(|(prefix, _)| short.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map_or_else(|| short.to_string(), |(_, name)| name.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// List every file under its team
    pub verbose: bool,
    /// Wrap the file list in a collapsible GitLab markdown block
    pub format_for_gitlab: bool,
    pub root_prefix: String,
}

pub fn build_report(
    assignments: &TeamAssignments,
    labeler: &TeamLabeler,
    options: &ReportOptions,
) -> ProgressReport {
    if assignments.is_empty() {
        return ProgressReport::default();
    }

    let mut report = ProgressReport::default();
    let mut lines = Vec::new();

    for (owner, files) in assignments {
        let fixed = files.iter().filter(|f| f.fixed).count();
        let total = files.len();
        let percentage = round_to_tenth(fixed as f64 / total as f64 * 100.0);
        let short = labeler.short_name(owner);

        if options.verbose {
            lines.push(format!("{short} {percentage:.1}% DONE (fixed {fixed} of {total} files)"));
            for file in files {
                let glyph = if file.fixed { FIXED_GLYPH } else { PENDING_GLYPH };
                lines.push(format!("{INDENT}{glyph} {}", file.simple_path(&options.root_prefix)));
            }
        }

        report.teams.push(TeamProgress {
            owner: owner.clone(),
            label: format!("{short} {fixed}/{total}"),
            fixed,
            total,
            percentage,
        });
        report.files.extend(files.iter().cloned());
    }

    let total_fixed = report.files.iter().filter(|f| f.fixed).count();
    report.overall_percentage = match report.files.len() {
        0 => 0.0,
        total => total_fixed as f64 / total as f64 * 100.0,
    };

    report.text = lines.join("\n");
    if options.format_for_gitlab && !report.text.is_empty() {
        report.text = wrap_collapsible(&report.text);
    }

    report
}

fn wrap_collapsible(text: &str) -> String {
    format!(
        "\n<p>\n<details>\n<summary>Click for detailed file list</summary>\n<pre>\n{text}\n</pre>\n</details>\n</p>\n"
    )
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
