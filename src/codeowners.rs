// src/codeowners.rs

use crate::error::{Result, StatsError};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::path::Path;

/// Anything that can tell who owns a repository path
pub trait OwnershipSource {
    /// Raw owner identifiers for `path`, as written in the mapping
    fn owners_of(&self, path: &str) -> Vec<String>;
}

#[derive(Debug)]
struct Rule {
    pattern: String,
    matcher: GlobSet,
    owners: Vec<String>,
}

#[derive(Debug)]
struct Section {
    name: String,
    default_owners: Vec<String>,
    rules: Vec<Rule>,
}

/// A parsed GitLab-flavoured CODEOWNERS file.
///
/// Within a section the last matching rule wins; owners from every section
/// are combined.
#[derive(Debug)]
pub struct CodeOwners {
    sections: Vec<Section>,
}

impl CodeOwners {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StatsError::MissingCodeowners { path: path.to_path_buf() },
            _ => StatsError::Io(e),
        })?;
        let owners = Self::parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            sections = ?owners.section_names().collect::<Vec<_>>(),
            "loaded CODEOWNERS"
        );
        Ok(owners)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let header = Regex::new(r"^\^?\[([^\]]+)\](?:\[\d+\])?(.*)$")?;
        let mut sections = vec![Section { name: String::new(), default_owners: Vec::new(), rules: Vec::new() }];

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(caps) = header.captures(line) {
                sections.push(Section {
                    name: caps[1].to_string(),
                    default_owners: caps[2].split_whitespace().map(String::from).collect(),
                    rules: Vec::new(),
                });
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(pattern) = tokens.next() else { continue };
            let matcher = compile_pattern(pattern).map_err(|e| StatsError::Ownership {
                line: number + 1,
                message: e.to_string(),
            })?;
            let owners = tokens.take_while(|t| !t.starts_with('#')).map(String::from).collect();

            if let Some(section) = sections.last_mut() {
                section.rules.push(Rule { pattern: pattern.to_string(), matcher, owners });
            }
        }

        Ok(Self { sections })
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str()).filter(|n| !n.is_empty())
    }
}

impl OwnershipSource for CodeOwners {
    fn owners_of(&self, path: &str) -> Vec<String> {
        let path = path.trim_start_matches('/');
        let mut owners: Vec<String> = Vec::new();

        for section in &self.sections {
            let Some(rule) = section.rules.iter().rev().find(|r| r.matcher.is_match(path)) else {
                continue;
            };
            tracing::trace!(path, pattern = %rule.pattern, section = %section.name, "ownership rule matched");

            let matched = if rule.owners.is_empty() { &section.default_owners } else { &rule.owners };
            for owner in matched {
                if !owners.contains(owner) {
                    owners.push(owner.clone());
                }
            }
        }

        owners
    }
}

// gitignore anchoring: a leading or inner slash pins the pattern to the root,
// a trailing slash restricts it to directories.
fn compile_pattern(pattern: &str) -> std::result::Result<GlobSet, globset::Error> {
    let dir_only = pattern.ends_with('/');
    let trimmed = pattern.trim_end_matches('/');
    let anchored = trimmed.starts_with('/') || trimmed.contains('/');
    let trimmed = trimmed.trim_start_matches('/');

    let base = match (trimmed.is_empty(), anchored) {
        (true, _) => "**".to_string(),
        (false, true) => trimmed.to_string(),
        (false, false) => format!("**/{trimmed}"),
    };

    let mut builder = GlobSetBuilder::new();
    if !dir_only {
        builder.add(GlobBuilder::new(&base).literal_separator(true).build()?);
    }
    builder.add(GlobBuilder::new(&format!("{base}/**")).literal_separator(true).build()?);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn owners(text: &str, path: &str) -> Vec<String> {
        CodeOwners::parse(text).unwrap().owners_of(path)
    }

    #[test]
    fn unanchored_pattern_matches_directory_contents() {
        assert_eq!(owners("^[Domain]\npath @Team", "path/fileA"), vec!["@Team"]);
        assert_eq!(owners("^[Domain]\npath @Team", "path"), vec!["@Team"]);
        assert_eq!(owners("^[Domain]\npath @Team", "deep/path/fileA"), vec!["@Team"]);
    }

    #[test]
    fn rule_without_owners_matches_nobody() {
        assert!(owners("^[Domain]\npath", "path/fileA").is_empty());
    }

    #[test]
    fn inner_slash_anchors_at_root() {
        let text = "^[Domain]\nsome/path/to/ @Team";
        assert_eq!(owners(text, "some/path/to/fileA"), vec!["@Team"]);
        assert!(owners(text, "some/other/path/to/fileA").is_empty());
    }

    #[test]
    fn trailing_slash_only_matches_directories() {
        let text = "pathA/ @TeamA";
        assert_eq!(owners(text, "pathA/fileA"), vec!["@TeamA"]);
        assert!(owners(text, "pathA").is_empty());
    }

    #[test]
    fn last_matching_rule_wins_within_a_section() {
        let text = indoc! {"
            # generic first
            src/ @Frontend
            src/payments/ @Payments
        "};
        assert_eq!(owners(text, "src/payments/Pay.vue"), vec!["@Payments"]);
        assert_eq!(owners(text, "src/views/Home.vue"), vec!["@Frontend"]);
    }

    #[test]
    fn sections_combine_and_inherit_defaults() {
        let text = indoc! {"
            [Frontend] @web
            src/
            [Docs][2] @writers
            *.md @docs-team
            src/ @reviewers
        "};
        let codeowners = CodeOwners::parse(text).unwrap();
        assert_eq!(codeowners.section_names().collect::<Vec<_>>(), vec!["Frontend", "Docs"]);
        assert_eq!(codeowners.owners_of("src/README.md"), vec!["@web", "@reviewers"]);
        assert_eq!(codeowners.owners_of("README.md"), vec!["@docs-team"]);
    }

    #[test]
    fn several_owners_keep_their_order() {
        assert_eq!(owners("^[Domain]\npath @TeamA @TeamB", "path"), vec!["@TeamA", "@TeamB"]);
    }

    #[test]
    fn wildcards_do_not_cross_directories() {
        let text = "/src/*.ts @Root";
        assert_eq!(owners(text, "src/main.ts"), vec!["@Root"]);
        assert!(owners(text, "src/views/main.ts").is_empty());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CODEOWNERS");
        std::fs::write(&path, "[Frontend] @web\nsrc/\n").unwrap();

        let codeowners = CodeOwners::load(&path).unwrap();
        assert_eq!(codeowners.section_names().collect::<Vec<_>>(), vec!["Frontend"]);
        assert_eq!(codeowners.owners_of("src/main.ts"), vec!["@web"]);
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CODEOWNERS");
        assert!(matches!(
            CodeOwners::load(&path),
            Err(StatsError::MissingCodeowners { .. })
        ));
    }
}
