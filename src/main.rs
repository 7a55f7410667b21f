mod config;
mod importer;
mod issue;
mod logging;
mod records;
mod report;
mod tracker;

use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};

use config::{CliOverrides, Config, RunContext, TOKEN_ENV_VAR};
use importer::{ImportOptions, Importer};
use tracker::{GitHubClient, IssueTracker, SimulatedTracker};

/// Bug Importer: reads bug tickets from a JSON file and opens one GitHub
/// issue per ticket, with severity and priority labels and a formatted body.
#[derive(Parser, Debug)]
#[command(
    name = "bug-importer",
    version,
    about,
    after_help = "Examples:\n  bug-importer --repo myuser/myrepo --token ghp_xxxx\n  bug-importer --repo myuser/myrepo --token ghp_xxxx --dry-run\n  bug-importer --config config.json --bugs-file custom_bugs.json"
)]
struct Cli {
    /// GitHub repository in format owner/repo
    #[arg(long)]
    repo: Option<String>,

    /// GitHub personal access token (falls back to config file, then GITHUB_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Path to bug tickets JSON file [default: bug_tickets.json]
    #[arg(long)]
    bugs_file: Option<PathBuf>,

    /// Path to configuration file (JSON, or TOML with a .toml extension)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulate import without creating actual issues
    #[arg(long)]
    dry_run: bool,

    /// Create standard labels in repository
    #[arg(long)]
    create_labels: bool,

    /// Directory the results file is written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Also append log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("{}", err);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether at least one ticket was imported.
async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let config = match cli.config.as_deref() {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            Config::load_from(path)?
        }
        None => Config::default(),
    };

    let overrides = CliOverrides {
        repository: cli.repo,
        token: cli.token,
        bugs_file: cli.bugs_file,
        dry_run: cli.dry_run,
        create_labels: cli.create_labels,
        output_dir: cli.output_dir,
    };
    let ctx = RunContext::resolve(overrides, config, std::env::var(TOKEN_ENV_VAR).ok())?;
    debug!(?ctx, "resolved run context");

    let client = GitHubClient::new(&ctx.api_url, ctx.timeout)?;
    let tracker: Box<dyn IssueTracker> = if ctx.dry_run {
        info!("dry run: no issues or labels will be created");
        Box::new(SimulatedTracker::new(client))
    } else {
        Box::new(client)
    };

    let mut importer = Importer::new(
        tracker,
        ImportOptions {
            token: ctx.token.clone(),
            repo: ctx.repo.clone(),
            bugs_file: ctx.bugs_file.clone(),
            request_delay: ctx.request_delay,
            bootstrap_labels: ctx.create_labels,
        },
    );
    let outcome = importer.run().await;

    if !outcome.is_success() {
        error!("No issues were imported successfully.");
        return Ok(false);
    }

    report::log_results(&outcome);
    let now = Local::now();
    let manifest = report::build(&outcome, &ctx.repo, &now);
    report::write_manifest(&manifest, &ctx.output_dir, &now)?;
    report::print_summary(&outcome, &ctx.repo);

    Ok(true)
}
