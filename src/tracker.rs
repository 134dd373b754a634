// src/tracker.rs

use crate::model::*;
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;

/// Walks `commits` (oldest first) and keeps the ones that removed pattern
/// matches from tracked files.
///
/// `baseline_files` seeds the set of files still carrying the pattern. A file
/// leaves that set the first time a commit takes its match count to zero, and
/// every kept commit records the size of the set after it.
pub fn track_refactors(
    commits: &[CommitDiff],
    pattern: &Regex,
    baseline_files: &[String],
    tracked_extensions: &[String],
) -> Vec<RefactorCommit> {
    let mut open_files = baseline_files.to_vec();

    commits
        .iter()
        .filter_map(|commit| inspect_commit(commit, pattern, tracked_extensions, &mut open_files))
        .collect()
}

fn inspect_commit(
    commit: &CommitDiff,
    pattern: &Regex,
    tracked_extensions: &[String],
    open_files: &mut Vec<String>,
) -> Option<RefactorCommit> {
    let mut refactor_count = 0;

    for change in &commit.changes {
        if let (ChangeKind::Renamed, Some(previous)) = (change.kind, &change.previous_path) {
            follow_rename(open_files, previous, &change.path);
            continue;
        }
        if !matches!(change.kind, ChangeKind::Modified | ChangeKind::Deleted) {
            continue;
        }
        if !has_tracked_extension(&change.path, tracked_extensions) {
            continue;
        }

        let before = count_matches(pattern, change.before.as_deref());
        let after = match change.kind {
            ChangeKind::Deleted => 0,
            _ => count_matches(pattern, change.after.as_deref()),
        };

        refactor_count += before.saturating_sub(after);

        if before > 0 && after == 0 {
            if let Some(position) = open_files.iter().position(|p| *p == change.path) {
                open_files.remove(position);
                tracing::debug!(commit = %commit.meta.hash, path = %change.path, remaining = open_files.len(), "file fully refactored");
            }
        }
    }

    if refactor_count == 0 {
        return None;
    }

    Some(RefactorCommit {
        hash: commit.meta.hash.clone(),
        date: commit.meta.date,
        summary: commit.meta.summary.clone(),
        author: commit.meta.author.clone(),
        refactor_count,
        remaining_files_count: open_files.len(),
    })
}

// A moved file keeps its place in the open set under the new path
fn follow_rename(open_files: &mut [String], previous: &str, path: &str) {
    if let Some(entry) = open_files.iter_mut().find(|p| p.as_str() == previous) {
        tracing::debug!(from = previous, to = path, "open file renamed");
        *entry = path.to_string();
    }
}

/// Missing or undecodable content has no matches
pub fn count_matches(pattern: &Regex, content: Option<&str>) -> usize {
    content.map_or(0, |text| pattern.find_iter(text).count())
}

fn has_tracked_extension(path: &str, tracked_extensions: &[String]) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| tracked_extensions.iter().any(|t| t == ext))
}

/// Refactor totals per author, most refactors first
pub fn build_leaderboard(commits: &[RefactorCommit]) -> Vec<LeaderboardEntry> {
    let mut by_author: HashMap<&Author, LeaderboardEntry> = HashMap::new();
    for commit in commits {
        let entry = by_author.entry(&commit.author).or_insert_with(|| LeaderboardEntry {
            author: commit.author.clone(),
            commits: 0,
            refactors: 0,
        });
        entry.commits += 1;
        entry.refactors += commit.refactor_count;
    }

    let mut board: Vec<LeaderboardEntry> = by_author.into_values().collect();
    board.sort_by(|a, b| b.refactors.cmp(&a.refactors).then_with(|| a.author.cmp(&b.author)));
    board
}

/// Remaining files per day, seeded with the baseline observation. When a day
/// has several commits the last one wins.
pub fn build_chart_data(baseline: Option<(NaiveDate, usize)>, commits: &[RefactorCommit]) -> RemainingByDate {
    let mut series = RemainingByDate::new();
    if let Some((date, count)) = baseline {
        series.insert(date, count);
    }
    for commit in commits {
        series.insert(commit.date.date_naive(), commit.remaining_files_count);
    }
    series
}
