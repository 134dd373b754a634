// src/index.rs

use crate::model::file_name;
use std::collections::HashMap;

/// Maps every file name to its full path. When two paths share a file name
/// the later one wins.
pub fn index_files<S: AsRef<str>>(paths: &[S]) -> HashMap<&str, &str> {
    paths
        .iter()
        .map(|path| {
            let path: &str = path.as_ref();
            (file_name(path), path)
        })
        .collect()
}
