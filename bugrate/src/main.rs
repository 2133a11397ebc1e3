use anyhow::{Context, Result};
use bugrate::charts;
use bugrate::error;
use bugrate::filter;
use bugrate::forge::github::GitHubClient;
use bugrate::settings::{Overrides, Settings};
use bugrate::sink::{self, ChartSink, JsonChartWriter};
use bugrate::storage::{self, json::JsonCache, Store};
use bugrate::types::Snapshot;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bugrate")]
#[command(about = "Issue and bug-fix statistics for a forge repository", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: bugrate.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User whose fixes are charted
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Only count fixes on or after this date (d/m/yyyy)
    #[arg(short, long, global = true)]
    since: Option<String>,

    /// Suppress progress reporting
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Ignore the cache and fetch live data
    #[arg(long, global = true)]
    no_cache: bool,

    /// Directory charts are written to
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Also chart issues carrying this label
    #[arg(long, global = true)]
    label: Option<String>,

    /// Users to compare against each other
    #[arg(long, global = true, value_delimiter = ',')]
    compare: Option<Vec<String>>,

    /// Minimum fixes for a user to appear in the fixer comparison
    #[arg(long, global = true, allow_negative_numbers = true)]
    min_fixes: Option<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print summary counts and write every chart (default)
    Report,

    /// Refresh the cache from the live source and exit
    Fetch,

    /// Print summary counts only
    Summary,

    /// Export issues resolved per date by the user as CSV
    Export {
        /// Output file path
        #[arg(short = 'f', long, default_value = "issues.csv")]
        file: PathBuf,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            username: self.username.clone(),
            since: self.since.clone(),
            quiet: self.quiet.then_some(true),
            use_cache: self.no_cache.then_some(false),
            output_dir: self.output.clone(),
            compare_users: self.compare.clone(),
            min_fixes: self.min_fixes,
            label: self.label.clone(),
        }
    }
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

/// Prints the scalar counts. An unparseable `since` only drops the
/// fixed-since lines; the error is returned after everything else is printed.
fn print_summary(settings: &Settings, snapshot: &Snapshot) -> error::Result<()> {
    let user = settings.username.as_str();
    let since = settings.since();
    let summary = filter::summarize(snapshot, user, since.as_ref().ok().copied());

    if !settings.quiet {
        println!("{}", "Repository".bold());
        println!("Owner:                          {}", settings.owner);
        println!("Repo:                           {}", settings.repo);
        println!("User:                           {}\n", user);
    }
    println!("{}", "Counts".bold());
    println!("Number of open issues:          {}", summary.open_issues);
    println!("Number of closed issues:        {}", summary.closed_issues);
    println!("Number of open pull requests:   {}", summary.open_pulls);
    println!("Number of closed pull requests: {}", summary.closed_pulls);
    println!("Issues opened by {}: {}", user, summary.opened_by_user);
    match summary.fixed_since {
        Some(fixed) => {
            println!("Issues fixed since {}: {}", settings.since, fixed.issues);
            println!("Bugs fixed since {}: {}", settings.since, fixed.bugs);
        }
        None => {
            if let Err(e) = &since {
                log::error!("Skipping fixed-since counts: {}", e);
            }
        }
    }
    println!("{} has resolved {} issues.\n", user, summary.resolved_by_user);
    since.map(|_| ())
}

/// Renders the charts; returns how many failed
fn render_charts(settings: &Settings, snapshot: &Snapshot) -> usize {
    let sink = JsonChartWriter::new(&settings.output_dir);
    let mut failures = 0;
    for chart in charts::build_all(snapshot, settings) {
        match chart.and_then(|c| sink.render(&c)) {
            Ok(path) => {
                if !settings.quiet {
                    println!("Generated graph '{}'", path.display());
                }
            }
            Err(e) => {
                log::error!("Chart skipped: {}", e);
                failures += 1;
            }
        }
    }
    failures
}

/// Summary and charts. Every part runs even when an earlier one failed.
fn run_report(settings: &Settings, snapshot: &Snapshot) -> Result<()> {
    let summary = print_summary(settings, snapshot);
    let failures = render_charts(settings, snapshot);
    summary.context("Summary incomplete")?;
    if failures > 0 {
        anyhow::bail!("{} chart(s) could not be generated", failures);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.overrides()).context("Failed to load configuration")?;
    init_logging(settings.quiet);

    let store = JsonCache::new(settings.issues_cache.clone(), settings.pulls_cache.clone());
    let forge = GitHubClient::new(
        &settings.api_url,
        &settings.owner,
        &settings.repo,
        settings.token.as_deref(),
    )?;

    match cli.command.unwrap_or(Commands::Report) {
        Commands::Fetch => {
            let (issues, pulls) = storage::refresh(&store, &forge).await?;
            println!("Cached {} issues and {} pull requests in {}", issues, pulls, store.describe());
            Ok(())
        }
        Commands::Summary => {
            let snapshot = storage::load_snapshot(&settings, &store, &forge).await?;
            Ok(print_summary(&settings, &snapshot)?)
        }
        Commands::Export { file } => {
            let snapshot = storage::load_snapshot(&settings, &store, &forge).await?;
            let pulls = filter::pulls_by_user(&settings.username, &snapshot.pulls);
            let rows = sink::export_resolved_csv(&file, pulls)
                .with_context(|| format!("Failed to write {:?}", file))?;
            println!("Wrote {} rows to {}", rows, file.display());
            Ok(())
        }
        Commands::Report => {
            let snapshot = storage::load_snapshot(&settings, &store, &forge).await?;
            run_report(&settings, &snapshot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_in(dir: &TempDir, since: &str) -> Settings {
        let overrides = Overrides {
            since: Some(since.to_string()),
            quiet: Some(true),
            output_dir: Some(dir.path().join("out").to_string_lossy().into_owned()),
            ..Overrides::default()
        };
        Settings::load(&overrides).unwrap()
    }

    #[test]
    fn test_report_writes_charts_despite_bad_since() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir, "2019-12-31");

        assert!(run_report(&settings, &Snapshot::default()).is_err());
        assert!(dir.path().join("out/openIssues.json").exists());
        assert!(dir.path().join("out/bugs.json").exists());
    }

    #[test]
    fn test_report_succeeds_with_valid_since() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir, "31/12/2019");

        run_report(&settings, &Snapshot::default()).unwrap();
        assert!(dir.path().join("out/fixersComparison.json").exists());
    }
}
