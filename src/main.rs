// src/main.rs

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use refactor_stats::aggregate::{build_report, ReportOptions, TeamLabeler};
use refactor_stats::analyzer::{RepoCache, RepoScanner};
use refactor_stats::attribution::Attributor;
use refactor_stats::calendar::HolidayCalendar;
use refactor_stats::cli::Args;
use refactor_stats::codeowners::CodeOwners;
use refactor_stats::config::{Preset, StatsConfig};
use refactor_stats::oracle::BasicOracle;
use refactor_stats::reconcile::build_file_status_list;
use refactor_stats::renderer::*;
use refactor_stats::tracker::{build_chart_data, build_leaderboard, track_refactors};
use refactor_stats::StatsError;
use regex::Regex;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "refactor_stats=warn",
        1 => "refactor_stats=info",
        _ => "refactor_stats=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let start_time = Instant::now();

    if !args.repository_path.exists() {
        return Err(StatsError::InvalidRepository { path: args.repository_path.clone() }.into());
    }
    let scanner = RepoScanner::open(&args.repository_path)?;
    let repo_root = scanner.root().to_path_buf();

    let config = StatsConfig::load(args.config.as_deref(), &repo_root)?;
    let preset = config.preset(args.stats_type);
    let pattern = Regex::new(&preset.pattern).map_err(StatsError::from)?;
    let palette = Palette::for_terminal();

    println!("{}", palette.success(&format!("Generating statistics for {}", preset.project_name)));

    let codeowners = CodeOwners::load(&config.codeowners_file(&repo_root))?;

    // 1. Current and baseline snapshots
    let current_files = scanner.working_files_matching(&pattern, &config.excluded_suffixes)?;

    let cache = RepoCache::for_source(&scanner);
    let clone = cache
        .open_or_clone(&scanner)
        .with_context(|| format!("cannot prepare the cached clone at {}", cache.path().display()))?;
    if let (Some(clone), false) = (&clone, args.no_fetch) {
        RepoCache::fetch(clone)?;
    }
    let history = clone.as_ref().unwrap_or(&scanner);

    let baseline_files = history.files_matching_pattern(&preset.baseline, &pattern, &config.excluded_suffixes)?;
    let status_files = build_file_status_list(&baseline_files, &current_files);
    tracing::info!(baseline = baseline_files.len(), current = current_files.len(), "reconciled snapshots");

    // 2. Commit history
    if args.needs_history() {
        if let Some(clone) = &clone {
            RepoCache::checkout(clone, &config.branch)?;
        }
        show_history(args, &config, &preset, &pattern, history, &baseline_files, palette)?;
    }

    // 3. Progress per team
    let attributor = Attributor::new(&codeowners)
        .with_root_prefix(config.root_prefix.clone())
        .with_fallback_owners(&config.fallback_owners);
    let assignments = attributor.group_by_owner(&status_files);

    let labeler = TeamLabeler::new(&config.team_pattern, config.team_display_names.clone())?;
    let options = ReportOptions {
        verbose: args.file_list,
        format_for_gitlab: args.gitlab,
        root_prefix: config.root_prefix.clone(),
    };
    let report = build_report(&assignments, &labeler, &options);

    if report.is_empty() {
        println!("No stats to display");
        return Ok(());
    }

    println!("{}", render_status_chart(&preset.project_name, &report, palette));
    println!();
    println!("{}", report.text);

    if args.copy {
        let plain_chart = render_status_chart(&preset.project_name, &report, Palette::PLAIN);
        match copy_to_clipboard(&clipboard_payload(&plain_chart, &report.text, args.gitlab)) {
            Ok(()) => tracing::info!("copied report to clipboard"),
            Err(e) => tracing::warn!(error = %e, "clipboard not available, nothing copied"),
        }
    }

    tracing::debug!(elapsed = ?start_time.elapsed(), "finished");
    Ok(())
}

fn show_history(
    args: &Args,
    config: &StatsConfig,
    preset: &Preset,
    pattern: &Regex,
    history: &RepoScanner,
    baseline_files: &[String],
    palette: Palette,
) -> anyhow::Result<()> {
    let diffs = history.history_since(&preset.baseline, "HEAD")?;
    let commits = track_refactors(&diffs, pattern, baseline_files, &config.tracked_extensions);

    if args.list_commits {
        println!("{}", render_commits(&commits));
        println!();
    }

    if args.leaderboard {
        println!("{}", render_leaderboard(&build_leaderboard(&commits)));
        println!();
    }

    if args.stats {
        let baseline_date = history.commit_date(&preset.baseline)?.date_naive();
        let series = build_chart_data(Some((baseline_date, baseline_files.len())), &commits);
        println!("{}", render_remaining_series(&series, palette));
        println!();

        let calendar = HolidayCalendar::new(config.holiday_region)
            .with_extra_holidays(config.extra_holidays.iter().copied());
        let estimate = BasicOracle::new(&calendar).predict(&series, Utc::now().date_naive())?;
        println!("{}", render_estimate(&estimate));
        println!();
    }

    Ok(())
}
