// src/attribution.rs

use crate::codeowners::OwnershipSource;
use crate::model::{File, TeamAssignments, ORPHANED_FILES};

/// Resolves the teams responsible for each file
pub struct Attributor<'a> {
    source: &'a dyn OwnershipSource,
    root_prefix: String,
    fallback_owners: Vec<String>,
}

impl<'a> Attributor<'a> {
    pub fn new(source: &'a dyn OwnershipSource) -> Self {
        Self { source, root_prefix: String::new(), fallback_owners: Vec::new() }
    }

    pub fn with_root_prefix(mut self, root_prefix: impl Into<String>) -> Self {
        self.root_prefix = root_prefix.into();
        self
    }

    /// Owners listed here are people rather than teams; their files go to a
    /// team named after the file's top-level folder instead.
    pub fn with_fallback_owners(mut self, owners: &[String]) -> Self {
        self.fallback_owners = owners.iter().map(|o| strip_marker(o).to_string()).collect();
        self
    }

    pub fn file_owners(&self, path: &str) -> Vec<String> {
        let raw = self.source.owners_of(path);
        if raw.is_empty() {
            return vec![ORPHANED_FILES.to_string()];
        }

        let mut owners: Vec<String> = Vec::with_capacity(raw.len());
        for owner in &raw {
            let owner = strip_marker(owner);
            let team = if self.fallback_owners.iter().any(|f| f == owner) {
                self.top_level_folder(path).unwrap_or(ORPHANED_FILES)
            } else {
                owner
            };
            if !owners.iter().any(|o| o == team) {
                owners.push(team.to_string());
            }
        }
        owners
    }

    /// Groups files per owner. A file with several owners shows up under each.
    pub fn group_by_owner(&self, files: &[File]) -> TeamAssignments {
        let mut assignments = TeamAssignments::new();
        for file in files {
            for team in self.file_owners(&file.path) {
                assignments.entry(team).or_default().push(file.clone());
            }
        }
        for files in assignments.values_mut() {
            files.sort_by(|a, b| a.path.cmp(&b.path));
        }
        tracing::debug!(teams = assignments.len(), files = files.len(), "grouped files by owner");
        assignments
    }

    fn top_level_folder<'p>(&self, path: &'p str) -> Option<&'p str> {
        let relative = path.strip_prefix(self.root_prefix.as_str()).unwrap_or(path);
        relative.split_once('/').map(|(folder, _)| folder).filter(|f| !f.is_empty())
    }
}

fn strip_marker(owner: &str) -> &str {
    owner.strip_prefix('@').unwrap_or(owner)
}
