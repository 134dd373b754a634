#![allow(dead_code)]

use git2::{Commit, Oid, Repository, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Monday 4 March 2024, 10:00 UTC
pub const MONDAY: i64 = 1_709_546_400;
pub const DAY: i64 = 86_400;

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self { dir, repo }
    }

    /// A clone whose `origin` points at `upstream`
    pub fn clone_of(upstream: &TestRepo) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::clone(upstream.path().to_str().unwrap(), dir.path()).unwrap();
        Self { dir, repo }
    }

    pub fn head(&self) -> Oid {
        self.repo.head().unwrap().peel_to_commit().unwrap().id()
    }

    pub fn branch(&self) -> String {
        self.repo.head().unwrap().shorthand().unwrap().to_string()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, path: &str, content: &[u8]) {
        let full = self.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    /// Commits the given files; `None` deletes the file
    pub fn commit(&self, author: &str, when: i64, message: &str, files: &[(&str, Option<&str>)]) -> Oid {
        let mut index = self.repo.index().unwrap();
        for (path, content) in files {
            match content {
                Some(text) => {
                    self.write(path, text.as_bytes());
                    index.add_path(Path::new(path)).unwrap();
                }
                None => {
                    fs::remove_file(self.path().join(path)).unwrap();
                    index.remove_path(Path::new(path)).unwrap();
                }
            }
        }
        self.commit_index(&mut index, author, when, message)
    }

    pub fn commit_bytes(&self, author: &str, when: i64, message: &str, path: &str, content: &[u8]) -> Oid {
        let mut index = self.repo.index().unwrap();
        self.write(path, content);
        index.add_path(Path::new(path)).unwrap();
        self.commit_index(&mut index, author, when, message)
    }

    fn commit_index(&self, index: &mut git2::Index, author: &str, when: i64, message: &str) -> Oid {
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();
        let email = format!("{}@example.com", author.to_lowercase());
        let signature = Signature::new(author, &email, &Time::new(when, 0)).unwrap();

        let parents: Vec<Commit> = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parents: Vec<&Commit> = parents.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap()
    }
}
