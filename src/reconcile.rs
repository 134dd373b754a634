// src/reconcile.rs

use crate::index::index_files;
use crate::model::{file_name, File};
use std::collections::HashSet;

/// Classifies every file of the two snapshots as fixed, pending or new.
///
/// Files are matched by name only, so a file that moved between the snapshots
/// stays pending under its current path. Records come out in first-seen order,
/// baseline names first.
pub fn build_file_status_list<S: AsRef<str>>(baseline: &[S], current: &[S]) -> Vec<File> {
    let baseline_index = index_files(baseline);
    let current_index = index_files(current);

    let mut seen = HashSet::new();
    let mut files = Vec::with_capacity(baseline_index.len().max(current_index.len()));

    let names = baseline.iter().chain(current).map(|p| file_name(p.as_ref()));
    for name in names {
        if !seen.insert(name) {
            continue;
        }
        let file = match (baseline_index.get(name), current_index.get(name)) {
            (Some(old), None) => File::fixed(*old),
            (None, Some(new)) => File::new_occurrence(*new),
            (Some(_), Some(new)) => File::pending(*new),
            (None, None) => continue,
        };
        files.push(file);
    }

    files
}
