//! next-affected command line.
//!
//! ## Usage
//!
//! ```bash
//! next-affected init
//! next-affected run src/components/Button.tsx
//! next-affected run --base main
//! next-affected run --base commit1 --head commit2 --depth 5
//! next-affected run --uncommitted
//! next-affected run --base main --graph graph.json --json
//! ```
//!
//! ## Environment
//!
//! - `RUST_LOG`: log filter (default: `next_affected=info`, `debug` with `--verbose`)
//! - `LOG_FORMAT`: `json` for structured logs, anything else for plain text
//!
//! Logs and progress go to stderr; the affected routes go to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use next_affected::{
    init_config, run_next_affected, AffectedPagesReport, AnalysisProgress, GitChangeSet, GraphSource,
    InitOutcome, JsonGraphSource, MadgeGraphSource, RunError, RunOptions,
};

const EXAMPLES: &str = "\
Examples:
  $ next-affected run src/components/Button.tsx
  $ next-affected run --base main
  $ next-affected run --base commit1 --head commit2
  $ next-affected run --uncommitted
  $ next-affected run --only-uncommitted";

#[derive(Parser)]
#[command(name = "next-affected")]
#[command(about = "List Next.js pages affected by changes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize next-affected configuration
    Init,

    /// List Next.js pages affected by changes
    #[command(after_help = EXAMPLES)]
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Component whose impact should be analyzed
    component_path: Option<String>,

    /// Path to the Next.js project
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Base commit or branch
    #[arg(short, long)]
    base: Option<String>,

    /// Head commit or branch
    #[arg(long, default_value = "HEAD")]
    head: String,

    /// Max depth for dependency traversal
    #[arg(short, long)]
    depth: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Include uncommitted changes
    #[arg(short, long)]
    uncommitted: bool,

    /// Only include uncommitted changes
    #[arg(short = 'o', long)]
    only_uncommitted: bool,

    /// Prebuilt dependency graph (madge --json layout) instead of running madge
    #[arg(short, long, env = "NEXT_AFFECTED_GRAPH")]
    graph: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn to_options(&self) -> RunOptions {
        RunOptions {
            project: self.project.clone(),
            component: self.component_path.clone(),
            base: self.base.clone(),
            head: self.head.clone(),
            max_depth: self.depth,
            uncommitted: self.uncommitted,
            only_uncommitted: self.only_uncommitted,
            verbose: self.verbose,
        }
    }
}

/// Initialize the tracing subscriber with JSON or plain format
fn init_tracing(verbose: bool) {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    let default_filter = if verbose { "next_affected=debug" } else { "next_affected=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .flatten_event(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .without_time(),
            )
            .init();
    }
}

fn progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .context("Invalid progress template")?
        .progress_chars("█▉▊▋▌▍▎▏ "))
}

/// Move `bar` to `event`: modules of the graph in component mode, files in batch mode.
fn update_progress(bar: &ProgressBar, event: AnalysisProgress) {
    match event {
        AnalysisProgress::Modules { processed, total } => {
            bar.set_length(total as u64);
            bar.set_position(processed as u64);
            bar.set_message("modules processed");
        }
        AnalysisProgress::File { position, total } => {
            bar.set_length(total as u64);
            bar.set_position(position as u64);
            bar.set_message("files processed");
        }
    }
}

fn print_report(report: &AffectedPagesReport, json: bool) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(report).context("Failed to render report")?;
        println!("{rendered}");
    } else if report.has_affected_pages() {
        println!("\nAffected Pages:");
        for route in &report.routes {
            println!("{route}");
        }
    } else {
        println!("\nNo affected pages found.");
    }
    Ok(())
}

async fn run(args: &RunArgs) -> Result<()> {
    let options = args.to_options();
    let graph_source: Box<dyn GraphSource> = match &args.graph {
        Some(path) => Box::new(JsonGraphSource::new(path.clone())),
        None => Box::new(MadgeGraphSource::new()),
    };

    // Verbose runs log progress instead of drawing a bar.
    let style = progress_style()?;
    let mut bar: Option<ProgressBar> = None;
    let result = run_next_affected(&options, &*graph_source, &GitChangeSet::new(), |event| {
        if !args.verbose {
            let bar = bar.get_or_insert_with(|| ProgressBar::new(0).with_style(style.clone()));
            update_progress(bar, event);
        }
    })
    .await;
    if let Some(bar) = bar.take() {
        bar.finish();
    }

    let report = result?;
    info!(
        affected_pages = report.routes.len(),
        processed_modules = report.processed_modules,
        total_modules = report.total_modules,
        "Analysis complete"
    );
    print_report(&report, args.json)
}

fn init() -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    match init_config(&cwd)? {
        InitOutcome::Created(path) | InitOutcome::AlreadyExists(path) => {
            info!(path = %path.display(), "Config ready");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Commands::Run(args) if args.verbose);
    init_tracing(verbose);

    let result = match &cli.command {
        Commands::Init => init(),
        Commands::Run(args) => run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<RunError>() {
                Some(RunError::MissingTarget) => error!("Error: {e}"),
                _ => error!(error = ?e, "Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
