// src/model.rs

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Sentinel team for files nobody owns
pub const ORPHANED_FILES: &str = "Orphaned files";

/// One source file's refactor status between the baseline and the current snapshot
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct File {
    pub path: String,
    pub fixed: bool,
    pub is_new: bool,
}

impl File {
    pub fn pending(path: impl Into<String>) -> Self {
        Self { path: path.into(), fixed: false, is_new: false }
    }

    pub fn fixed(path: impl Into<String>) -> Self {
        Self { path: path.into(), fixed: true, is_new: false }
    }

    pub fn new_occurrence(path: impl Into<String>) -> Self {
        Self { path: path.into(), fixed: false, is_new: true }
    }

    /// Last path segment, the identity key across snapshots
    pub fn name(&self) -> &str {
        file_name(&self.path)
    }

    /// The path with `root_prefix` stripped, for display
    pub fn simple_path(&self, root_prefix: &str) -> &str {
        if root_prefix.is_empty() {
            return &self.path;
        }
        self.path.strip_prefix(root_prefix).unwrap_or(&self.path)
    }
}

pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Files grouped per owning team, keys in ascending order
pub type TeamAssignments = BTreeMap<String, Vec<File>>;

/// An inspected commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMeta {
    pub hash: String,
    pub author: Author,
    pub date: DateTime<Utc>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Other,
}

/// A file touched by a commit. Content that is missing on one side, or that
/// cannot be decoded as text, is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    /// Path before a rename
    pub previous_path: Option<String>,
    pub kind: ChangeKind,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// A commit together with its changes against the first parent
#[derive(Debug, Clone)]
pub struct CommitDiff {
    pub meta: CommitMeta,
    pub changes: Vec<FileChange>,
}

/// A commit that removed pattern occurrences
#[derive(Debug, Clone, PartialEq)]
pub struct RefactorCommit {
    pub hash: String,
    pub date: DateTime<Utc>,
    pub summary: String,
    pub author: Author,
    /// Matches removed across every file touched by the commit
    pub refactor_count: usize,
    /// Baseline files still carrying the pattern after this commit
    pub remaining_files_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub author: Author,
    pub commits: usize,
    pub refactors: usize,
}

/// Remaining baseline files observed per day
pub type RemainingByDate = BTreeMap<NaiveDate, usize>;

#[derive(Debug, Clone, PartialEq)]
pub struct ConclusionEstimate {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub files_remaining: usize,
    pub files_refactored: i64,
    pub business_days_elapsed: i64,
    /// Files per business day
    pub velocity: f64,
    pub days_left: Option<i64>,
    pub projected_completion: Option<NaiveDate>,
}

/// Per-team figures of a progress report
#[derive(Debug, Clone, PartialEq)]
pub struct TeamProgress {
    pub owner: String,
    pub label: String,
    pub fixed: usize,
    pub total: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressReport {
    pub text: String,
    /// Every file of every team, once per appearance
    pub files: Vec<File>,
    pub teams: Vec<TeamProgress>,
    pub overall_percentage: f64,
}

impl ProgressReport {
    pub fn team_labels(&self) -> Vec<&str> {
        self.teams.iter().map(|t| t.label.as_str()).collect()
    }

    pub fn percentages(&self) -> Vec<f64> {
        self.teams.iter().map(|t| t.percentage).collect()
    }

    /// No teams, so there is nothing to render
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}
