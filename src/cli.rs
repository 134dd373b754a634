// src/cli.rs

use crate::config::StatsType;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the repository being refactored
    pub repository_path: PathBuf,

    /// Display the file list of every team
    #[arg(short = 'l', long)]
    pub file_list: bool,

    /// Copy the output to the clipboard
    #[arg(short, long)]
    pub copy: bool,

    /// Format the output as GitLab flavoured markdown
    #[arg(short, long)]
    pub gitlab: bool,

    /// Display a leaderboard of refactor authors
    #[arg(long)]
    pub leaderboard: bool,

    /// Display the commits that removed occurrences
    #[arg(long)]
    pub list_commits: bool,

    /// Display remaining refactors over time and a completion estimate
    #[arg(long)]
    pub stats: bool,

    /// Type of statistics to generate
    #[arg(short = 't', long = "type", value_enum, default_value_t = StatsType::Expands, ignore_case = true)]
    pub stats_type: StatsType,

    /// Configuration file (defaults to .refactor-stats.toml in the repository)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Use the cached clone as is, without fetching
    #[arg(long)]
    pub no_fetch: bool,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// The history walk backs the leaderboard, the commit list and the estimate
    pub fn needs_history(&self) -> bool {
        self.leaderboard || self.list_commits
    }
}
