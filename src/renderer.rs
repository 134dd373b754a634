// src/renderer.rs

use crate::model::*;
use colored::Colorize;

const CHART_WIDTH: usize = 75;
const BAR_WIDTH: usize = 60;
const BAR_CELL: &str = "▇";

/// Whether rendered text carries ANSI colours
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub color: bool,
}

impl Palette {
    pub const PLAIN: Palette = Palette { color: false };

    pub fn for_terminal() -> Self {
        Self { color: colored::control::SHOULD_COLORIZE.should_colorize() }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn bar(&self, text: &str) -> String {
        if self.color {
            text.blue().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Horizontal bar chart of every team's completion
pub fn render_status_chart(project_name: &str, report: &ProgressReport, palette: Palette) -> String {
    let title = format!(
        " OVERALL REFACTORING STATUS OF {} {:.2}% ",
        project_name.to_uppercase(),
        report.overall_percentage
    );
    let rule = "─".repeat(CHART_WIDTH.saturating_sub(title.chars().count()) / 2);

    let mut lines = vec![palette.bold(&format!("{rule}{title}{rule}"))];

    let label_width = report.teams.iter().map(|t| t.label.chars().count()).max().unwrap_or(0);
    for team in &report.teams {
        let cells = (team.percentage / 100.0 * BAR_WIDTH as f64).round() as usize;
        lines.push(format!(
            "{} {} {}",
            palette.bold(&format!("{:<label_width$}", team.label)),
            palette.bar(&BAR_CELL.repeat(cells)),
            palette.bold(&format!("{:.2}", team.percentage)),
        ));
    }

    lines.join("\n")
}

/// Refactor commits, newest first
pub fn render_commits(commits: &[RefactorCommit]) -> String {
    if commits.is_empty() {
        return "No refactor commits found".to_string();
    }

    let mut sorted: Vec<&RefactorCommit> = commits.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut lines = vec![format!("{:<10}  {:<8}  {:<24}  {:>9}  {:>9}  {}", "DATE", "COMMIT", "AUTHOR", "REFACTORS", "REMAINING", "SUMMARY")];
    for commit in sorted {
        lines.push(format!(
            "{:<10}  {:<8}  {:<24}  {:>9}  {:>9}  {}",
            commit.date.format("%Y-%m-%d"),
            commit.hash.get(..8).unwrap_or(&commit.hash),
            truncate(&commit.author.name, 24),
            commit.refactor_count,
            commit.remaining_files_count,
            commit.summary,
        ));
    }
    lines.join("\n")
}

pub fn render_leaderboard(board: &[LeaderboardEntry]) -> String {
    if board.is_empty() {
        return "Nobody has refactored anything yet".to_string();
    }

    let mut lines = vec![format!("{:>3}  {:<32}  {:>7}  {:>9}", "#", "AUTHOR", "COMMITS", "REFACTORS")];
    for (rank, entry) in board.iter().enumerate() {
        lines.push(format!(
            "{:>3}  {:<32}  {:>7}  {:>9}",
            rank + 1,
            truncate(&entry.author.name, 32),
            entry.commits,
            entry.refactors,
        ));
    }
    lines.join("\n")
}

/// Remaining files over time, one bar per observed day
pub fn render_remaining_series(series: &RemainingByDate, palette: Palette) -> String {
    let max = series.values().copied().max().unwrap_or(0).max(1);

    let mut lines = vec![palette.bold("REFACTORS LEFT OVER TIME")];
    for (date, remaining) in series {
        let cells = remaining * BAR_WIDTH / max;
        lines.push(format!("{date}  {remaining:>5} {}", palette.bar(&BAR_CELL.repeat(cells))));
    }
    lines.join("\n")
}

pub fn render_estimate(estimate: &ConclusionEstimate) -> String {
    let mut lines = vec![
        format!("Observed from {} to {}", estimate.start_date, estimate.end_date),
        format!("Files refactored: {}", estimate.files_refactored),
        format!("Files remaining: {}", estimate.files_remaining),
        format!("Business days elapsed: {}", estimate.business_days_elapsed),
        format!("Velocity: {:.2} files per business day", estimate.velocity),
    ];
    match (estimate.days_left, estimate.projected_completion) {
        (Some(days), Some(date)) => {
            lines.push(format!("Business days left: {days}"));
            lines.push(format!("Estimated completion: {date}"));
        }
        _ => lines.push("No progress observed, cannot estimate a completion date".to_string()),
    }
    lines.join("\n")
}

/// Text copied to the clipboard: the uncoloured chart followed by the report
pub fn clipboard_payload(plain_chart: &str, report_text: &str, format_for_gitlab: bool) -> String {
    if format_for_gitlab {
        format!("<pre>{plain_chart}</pre>{report_text}")
    } else {
        format!("{plain_chart}\n{report_text}")
    }
}

pub fn copy_to_clipboard(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn team(label: &str, percentage: f64) -> TeamProgress {
        TeamProgress { owner: label.to_string(), label: label.to_string(), fixed: 0, total: 0, percentage }
    }

    #[test]
    fn chart_has_title_and_one_row_per_team() {
        let report = ProgressReport {
            teams: vec![team("ATeam 1/2", 50.0), team("B 2/2", 100.0)],
            overall_percentage: 75.0,
            ..ProgressReport::default()
        };
        let chart = render_status_chart("project name", &report, Palette::PLAIN);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(" OVERALL REFACTORING STATUS OF PROJECT NAME 75.00% "));
        assert!(lines[0].starts_with('─'));
        assert_eq!(lines[1], format!("ATeam 1/2 {} 50.00", BAR_CELL.repeat(30)));
        assert_eq!(lines[2], format!("B 2/2     {} 100.00", BAR_CELL.repeat(60)));
    }

    #[test]
    fn commits_are_listed_newest_first() {
        let commit = |hash: &str, day: u32| RefactorCommit {
            hash: hash.to_string(),
            date: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
            summary: format!("refactor {hash}"),
            author: Author { name: "Ana".to_string(), email: "ana@example.com".to_string() },
            refactor_count: 1,
            remaining_files_count: 3,
        };
        let text = render_commits(&[commit("aaaaaaaaaa", 4), commit("bbbbbbbbbb", 5)]);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[1].starts_with("2024-03-05  bbbbbbbb"));
        assert!(lines[2].starts_with("2024-03-04  aaaaaaaa"));
        assert!(lines[2].ends_with("refactor aaaaaaaaaa"));
    }

    #[test]
    fn empty_sections_say_so() {
        assert_eq!(render_commits(&[]), "No refactor commits found");
        assert_eq!(render_leaderboard(&[]), "Nobody has refactored anything yet");
    }

    #[test]
    fn estimate_without_velocity() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let estimate = ConclusionEstimate {
            start_date: day,
            end_date: day,
            files_remaining: 4,
            files_refactored: 0,
            business_days_elapsed: 3,
            velocity: 0.0,
            days_left: None,
            projected_completion: None,
        };
        assert!(render_estimate(&estimate).ends_with("No progress observed, cannot estimate a completion date"));
    }

    #[test]
    fn gitlab_clipboard_wraps_chart_in_pre() {
        assert_eq!(clipboard_payload("chart", "report", true), "<pre>chart</pre>report");
        assert_eq!(clipboard_payload("chart", "report", false), "chart\nreport");
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("Maria", 10), "Maria");
        assert_eq!(truncate("Maria Albertina", 6), "Maria…");
    }
}
