// src/config.rs

use crate::error::{Result, StatsError};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".refactor-stats.toml";

/// Statistics presets selectable from the command line
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsType {
    /// Old-style `expanded:` declarations
    Expands,
    /// Class based components still using `@Component`
    ClassBased,
}

impl StatsType {
    pub fn key(self) -> &'static str {
        match self {
            StatsType::Expands => "expands",
            StatsType::ClassBased => "class-based",
        }
    }
}

/// What to look for and where counting starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub project_name: String,
    pub baseline: String,
    pub pattern: String,
}

impl Preset {
    pub fn builtin(stats_type: StatsType) -> Self {
        let (project_name, baseline, pattern) = match stats_type {
            StatsType::Expands => (
                "Old Expands",
                "a4c5abe006e7b55ecdab72bf6e997118cc6e60e6",
                r"expanded: [',\[].*",
            ),
            StatsType::ClassBased => (
                "Class Based to Options API",
                "74d716e70263ffb017171a39a5a0e724c02356b3",
                "@Component",
            ),
        };
        Self {
            project_name: project_name.to_string(),
            baseline: baseline.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PresetOverride {
    pub project_name: Option<String>,
    pub baseline: Option<String>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HolidayRegion {
    #[default]
    Pt,
    /// Weekends only
    #[serde(rename = "none")]
    Weekends,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StatsConfig {
    pub root_prefix: String,
    /// Personal owners whose files fall back to a folder-named team
    pub fallback_owners: Vec<String>,
    pub excluded_suffixes: Vec<String>,
    /// Extensions inspected when walking commit history
    pub tracked_extensions: Vec<String>,
    pub branch: String,
    pub team_pattern: String,
    pub team_display_names: BTreeMap<String, String>,
    pub holiday_region: HolidayRegion,
    pub extra_holidays: Vec<NaiveDate>,
    pub codeowners_path: PathBuf,
    pub presets: BTreeMap<String, PresetOverride>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            root_prefix: "src/".to_string(),
            fallback_owners: Vec::new(),
            excluded_suffixes: ["spec.ts", "stories.ts", "md"].map(String::from).to_vec(),
            tracked_extensions: ["ts", "vue"].map(String::from).to_vec(),
            branch: "develop".to_string(),
            team_pattern: r"^[^/]+/.+/([^/]+)/[^/]+$".to_string(),
            team_display_names: BTreeMap::new(),
            holiday_region: HolidayRegion::default(),
            extra_holidays: Vec::new(),
            codeowners_path: PathBuf::from("CODEOWNERS"),
            presets: BTreeMap::new(),
        }
    }
}

impl StatsConfig {
    pub fn parse(contents: &str, origin: &Path) -> Result<Self> {
        toml::from_str(contents).map_err(|e| StatsError::Config {
            path: origin.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| StatsError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::parse(&contents, path)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// An explicit path must exist; otherwise the repository root and then the
    /// current directory are searched, falling back to defaults.
    pub fn load(explicit: Option<&Path>, repo_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidates = [Some(repo_root.to_path_buf()), std::env::current_dir().ok()];
        match candidates
            .into_iter()
            .flatten()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|path| path.is_file())
        {
            Some(path) => Self::from_file(&path),
            None => {
                tracing::debug!("no {} found, using defaults", CONFIG_FILE_NAME);
                Ok(Self::default())
            }
        }
    }

    pub fn preset(&self, stats_type: StatsType) -> Preset {
        let mut preset = Preset::builtin(stats_type);
        if let Some(overrides) = self.presets.get(stats_type.key()) {
            if let Some(name) = &overrides.project_name {
                preset.project_name = name.clone();
            }
            if let Some(baseline) = &overrides.baseline {
                preset.baseline = baseline.clone();
            }
            if let Some(pattern) = &overrides.pattern {
                preset.pattern = pattern.clone();
            }
        }
        preset
    }

    pub fn codeowners_file(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.codeowners_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let config = StatsConfig::parse("", Path::new("x.toml")).unwrap();
        assert_eq!(config, StatsConfig::default());
    }

    #[test]
    fn parses_every_section() {
        let text = indoc! {r#"
            root_prefix = "app/"
            fallback_owners = ["pedromcosta"]
            branch = "main"
            holiday_region = "none"
            extra_holidays = ["2024-12-24"]

            [team_display_names]
            cp = "Customer Portal"

            [presets.expands]
            baseline = "abc123"
        "#};
        let config = StatsConfig::parse(text, Path::new("x.toml")).unwrap();

        assert_eq!(config.root_prefix, "app/");
        assert_eq!(config.fallback_owners, vec!["pedromcosta"]);
        assert_eq!(config.branch, "main");
        assert_eq!(config.holiday_region, HolidayRegion::Weekends);
        assert_eq!(config.extra_holidays, vec![NaiveDate::from_ymd_opt(2024, 12, 24).unwrap()]);
        assert_eq!(config.team_display_names["cp"], "Customer Portal");
        assert_eq!(config.excluded_suffixes, StatsConfig::default().excluded_suffixes);

        let preset = config.preset(StatsType::Expands);
        assert_eq!(preset.baseline, "abc123");
        assert_eq!(preset.project_name, "Old Expands");
        assert_eq!(preset.pattern, Preset::builtin(StatsType::Expands).pattern);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = StatsConfig::parse("colour = true", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, StatsError::Config { .. }));
    }

    #[test]
    fn builtin_patterns_compile() {
        for stats_type in [StatsType::Expands, StatsType::ClassBased] {
            assert!(regex::Regex::new(&Preset::builtin(stats_type).pattern).is_ok());
        }
    }
}
