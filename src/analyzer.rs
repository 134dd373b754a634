// src/analyzer.rs

use crate::error::{Result, StatsError};
use crate::model::*;
use chrono::{DateTime, TimeZone, Utc};
use git2::build::RepoBuilder;
use git2::{
    Commit, Cred, CredentialType, Delta, DiffFile, DiffFindOptions, FetchOptions, ObjectType, Oid, RemoteCallbacks, Repository,
    ResetType, Sort, TreeWalkMode, TreeWalkResult,
};
use indicatif::ProgressBar;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Read access to a repository's snapshots and history
pub struct RepoScanner {
    repo: Repository,
}

impl RepoScanner {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path).map_err(|e| {
            tracing::debug!(error = %e, "cannot open repository");
            StatsError::InvalidRepository { path: path.to_path_buf() }
        })?;
        Ok(Self { repo })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Working directory, or the git directory for bare repositories
    pub fn root(&self) -> &Path {
        self.repo.workdir().unwrap_or_else(|| self.repo.path())
    }

    pub fn find_commit(&self, revision: &str) -> Result<Commit<'_>> {
        self.repo
            .revparse_single(revision)
            .and_then(|object| object.peel_to_commit())
            .map_err(|_| StatsError::UnknownRevision { revision: revision.to_string() })
    }

    pub fn commit_date(&self, revision: &str) -> Result<DateTime<Utc>> {
        Ok(commit_time(&self.find_commit(revision)?))
    }

    /// Paths at `revision` whose content matches `pattern`, sorted
    pub fn files_matching_pattern(&self, revision: &str, pattern: &Regex, excluded: &[String]) -> Result<Vec<String>> {
        let tree = self.find_commit(revision)?.tree()?;
        let mut paths = Vec::new();

        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() != Some(ObjectType::Blob) {
                return TreeWalkResult::Ok;
            }
            let Some(name) = entry.name() else { return TreeWalkResult::Ok };
            let path = format!("{root}{name}");
            if is_excluded(&path, excluded) {
                return TreeWalkResult::Ok;
            }
            let content = self.repo.find_blob(entry.id()).ok().and_then(|blob| decode(blob.content()));
            if content.is_some_and(|text| pattern.is_match(&text)) {
                paths.push(path);
            }
            TreeWalkResult::Ok
        })?;

        paths.sort();
        tracing::info!(revision, files = paths.len(), "scanned snapshot");
        Ok(paths)
    }

    /// Same as [`Self::files_matching_pattern`] for the files on disk. Every
    /// indexed path is read from the working directory, so uncommitted edits count.
    pub fn working_files_matching(&self, pattern: &Regex, excluded: &[String]) -> Result<Vec<String>> {
        let Some(workdir) = self.repo.workdir() else {
            return self.files_matching_pattern("HEAD", pattern, excluded);
        };

        let index = self.repo.index()?;
        let mut paths: Vec<String> = index
            .iter()
            .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
            .filter(|path| !is_excluded(path, excluded))
            .filter(|path| {
                std::fs::read(workdir.join(path))
                    .ok()
                    .and_then(|bytes| decode(&bytes))
                    .is_some_and(|text| pattern.is_match(&text))
            })
            .collect();

        paths.sort();
        paths.dedup();
        tracing::info!(files = paths.len(), "scanned working copy");
        Ok(paths)
    }

    /// Commits reachable from `to` but not from `from`, oldest first
    pub fn commits_between(&self, from: &str, to: &str) -> Result<Vec<CommitMeta>> {
        let from = self.find_commit(from)?.id();
        let to = self.find_commit(to)?.id();

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(to)?;
        revwalk.hide(from)?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(commit_meta(&commit));
        }
        Ok(commits)
    }

    /// Changes introduced by `hash` against its parent. Merge commits report
    /// no changes; their work is attributed to the commits being merged.
    pub fn diff_of(&self, hash: &str) -> Result<Vec<FileChange>> {
        let commit = self.repo.find_commit(Oid::from_str(hash)?)?;
        if commit.parent_count() > 1 {
            return Ok(Vec::new());
        }

        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };
        let current_tree = commit.tree()?;
        let mut diff = self.repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&current_tree), None)?;
        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;

        let changes = diff
            .deltas()
            .filter_map(|delta| {
                let path = delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .and_then(|p| p.to_str())
                    .map(String::from)?;
                let previous_path = match delta.status() {
                    Delta::Renamed => delta.old_file().path().and_then(|p| p.to_str()).map(String::from),
                    _ => None,
                };
                Some(FileChange {
                    path,
                    previous_path,
                    kind: change_kind(delta.status()),
                    before: self.read_side(&delta.old_file()),
                    after: self.read_side(&delta.new_file()),
                })
            })
            .collect();
        Ok(changes)
    }

    /// Every commit after `baseline` up to `head`, with its changes
    pub fn history_since(&self, baseline: &str, head: &str) -> Result<Vec<CommitDiff>> {
        let commits = self.commits_between(baseline, head)?;

        let bar = ProgressBar::new(commits.len() as u64);
        bar.set_message("Inspecting commits");

        let mut history = Vec::with_capacity(commits.len());
        for meta in commits {
            let changes = self.diff_of(&meta.hash)?;
            history.push(CommitDiff { meta, changes });
            bar.inc(1);
        }
        bar.finish_and_clear();

        tracing::info!(commits = history.len(), "walked history");
        Ok(history)
    }

    fn read_side(&self, file: &DiffFile<'_>) -> Option<String> {
        if !file.exists() {
            return None;
        }
        let blob = self.repo.find_blob(file.id()).ok()?;
        if blob.is_binary() {
            return None;
        }
        decode(blob.content())
    }
}

fn decode(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(String::from)
}

fn is_excluded(path: &str, excluded: &[String]) -> bool {
    excluded.iter().any(|suffix| path.ends_with(suffix.as_str()))
}

fn change_kind(status: Delta) -> ChangeKind {
    match status {
        Delta::Added => ChangeKind::Added,
        Delta::Modified => ChangeKind::Modified,
        Delta::Deleted => ChangeKind::Deleted,
        Delta::Renamed => ChangeKind::Renamed,
        _ => ChangeKind::Other,
    }
}

fn commit_time(commit: &Commit<'_>) -> DateTime<Utc> {
    Utc.timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn commit_meta(commit: &Commit<'_>) -> CommitMeta {
    let author = commit.author();
    CommitMeta {
        hash: commit.id().to_string(),
        author: Author {
            name: author.name().unwrap_or("Unknown").to_string(),
            email: author.email().unwrap_or("").to_string(),
        },
        date: commit_time(commit),
        summary: commit.summary().unwrap_or("").to_string(),
    }
}

/// A private clone of the source repository's `origin`, kept under the user
/// cache directory so history can be read without touching the caller's
/// working copy.
///
/// Checking out resets the clone hard; only one process may use it at a time.
pub struct RepoCache {
    path: PathBuf,
}

impl RepoCache {
    pub fn for_source(source: &RepoScanner) -> Self {
        Self { path: cache_location(source.repository().path()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the clone, cloning `origin` first if needed. `None` when the
    /// source has no `origin` remote.
    pub fn open_or_clone(&self, source: &RepoScanner) -> Result<Option<RepoScanner>> {
        let url = match source.repository().find_remote("origin") {
            Ok(remote) => remote.url().map(String::from),
            Err(_) => None,
        };
        let Some(url) = url else {
            tracing::warn!("repository has no origin remote, reading history from it directly");
            return Ok(None);
        };

        if let Ok(repo) = Repository::open(&self.path) {
            tracing::debug!(path = %self.path.display(), "using cached clone");
            return Ok(Some(RepoScanner { repo }));
        }

        std::fs::create_dir_all(&self.path)?;
        let spinner = spinner("Cloning the repository");
        let repo = RepoBuilder::new().fetch_options(fetch_options()).clone(&url, &self.path);
        spinner.finish_and_clear();

        tracing::info!(%url, path = %self.path.display(), "cloned repository");
        Ok(Some(RepoScanner { repo: repo? }))
    }

    /// Updates the clone's remote-tracking refs. HEAD and the working tree are
    /// left alone, which is enough to read any fetched revision.
    pub fn fetch(clone: &RepoScanner) -> Result<()> {
        let spinner = spinner("Fetching commits");
        let fetched = clone
            .repository()
            .find_remote("origin")
            .and_then(|mut remote| remote.fetch(&[] as &[&str], Some(&mut fetch_options()), None));
        spinner.finish_and_clear();
        fetched?;

        tracing::info!("fetched origin into cached clone");
        Ok(())
    }

    /// Moves the clone's HEAD onto `origin/<branch>` and resets hard
    pub fn checkout(clone: &RepoScanner, branch: &str) -> Result<()> {
        let repo = clone.repository();
        let target = repo
            .find_reference(&format!("refs/remotes/origin/{branch}"))
            .and_then(|reference| reference.peel_to_commit())
            .map_err(|_| StatsError::UnknownRevision { revision: format!("origin/{branch}") })?;

        repo.set_head_detached(target.id())?;
        repo.reset(target.as_object(), ResetType::Hard, None)?;
        tracing::info!(branch, commit = %target.id(), "checked out cached clone");
        Ok(())
    }
}

/// `<cache dir>/refactor-stats/<16 hex digits of sha256(git dir)>`
pub fn cache_location(git_dir: &Path) -> PathBuf {
    let git_dir = git_dir.canonicalize().unwrap_or_else(|_| git_dir.to_path_buf());
    let digest = Sha256::digest(git_dir.to_string_lossy().as_bytes());
    let hash = format!("{digest:x}");

    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("refactor-stats")
        .join(&hash[..16])
}

fn fetch_options<'a>() -> FetchOptions<'a> {
    let mut attempts = 0;
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username, allowed| {
        attempts += 1;
        if attempts > 3 {
            return Err(git2::Error::from_str("authentication failed"));
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            Cred::ssh_key_from_agent(username.unwrap_or("git"))
        } else if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            Cred::credential_helper(&git2::Config::open_default()?, url, username)
        } else {
            Cred::default()
        }
    });

    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner().with_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
