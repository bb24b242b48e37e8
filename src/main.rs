//! fsreport - Filtered file system snapshots analysed into one merged report.
//!
//! Usage:
//!   fsreport --output report.json                     Analyse / with the default analysers
//!   fsreport -p PATH -o OUT -a filecount              Run selected analysers
//!   fsreport -p PATH -o OUT -t rs,toml -i target      Filter the tree first
//!   fsreport --help                                   Show help

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Context, Result};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fsreport_core::DEFAULT_MAX_DEPTH;
use fsreport_engine::{
    EngineConfig, ReportFormat, RunConfig, RunReport, TreeOptions, parse_analyser_list, run_report,
};

#[derive(Parser)]
#[command(
    name = "fsreport",
    version,
    about = "Build a filtered file system tree and analyse it into one report",
    long_about = "fsreport walks a directory tree once, applying depth, ignore and type \
                  filters, then runs every requested analyser concurrently over that \
                  snapshot and merges their output into a single report."
)]
struct Cli {
    /// Directory to analyse (defaults to the file system root)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Levels below the root to traverse
    #[arg(short = 'd', long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: u32,

    /// Names, globs or path fragments to leave out, with their subtrees
    #[arg(short, long, value_delimiter = ',')]
    ignore: Vec<String>,

    /// Only include files with these extensions (e.g. "rs,toml")
    #[arg(short = 't', long = "type-filter", value_delimiter = ',')]
    type_filters: Vec<String>,

    /// Where to write the merged report (a directory gets report.<format>)
    #[arg(short, long)]
    output: PathBuf,

    /// Analysers to run, in report order
    #[arg(short, long, default_value = "filecount,filetypecount")]
    analysers: String,

    /// Report format (json or text)
    #[arg(short, long, default_value = "json")]
    format: ReportFormat,

    /// Give up on an analyser after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum analysers running at once (0 = all)
    #[arg(long, default_value_t = 0)]
    max_concurrency: usize,

    /// Descend into symlinked directories
    #[arg(long)]
    follow_symlinks: bool,

    /// Drop directories left without files after filtering
    #[arg(long)]
    prune_empty_dirs: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = run_config(cli)?;
    debug!(?config, "run configuration");

    match config.tree.root.as_deref() {
        Some(root) => eprintln!("Analysing {}...", root.display()),
        None => eprintln!("Analysing file system root..."),
    }

    let report = match run_report(&config).await {
        Ok(report) => report,
        Err(err) => {
            for diagnostic in err.diagnostics() {
                eprintln!(" {diagnostic}");
            }
            return Err(err).context("Run failed");
        }
    };

    print_summary(&report);
    println!("report ready at {}", report.output().display());

    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Map command-line arguments into the engine's run configuration.
fn run_config(cli: Cli) -> Result<RunConfig> {
    let mut tree = TreeOptions::builder();
    tree.max_depth(cli.max_depth)
        .ignore(cli.ignore)
        .type_filters(cli.type_filters)
        .follow_symlinks(cli.follow_symlinks)
        .prune_empty_dirs(cli.prune_empty_dirs);
    if let Some(path) = cli.path {
        tree.root(path);
    }
    let tree = tree.build().context("Invalid tree options")?;

    let mut engine = EngineConfig::builder();
    engine.max_concurrency(cli.max_concurrency);
    if let Some(secs) = cli.timeout {
        engine.timeout(Duration::from_secs(secs));
    }
    let engine = engine.build().context("Invalid engine options")?;

    let output = if cli.output.is_dir() {
        cli.output.join(format!("report.{}", cli.format.extension()))
    } else {
        cli.output
    };

    RunConfig::builder()
        .tree(tree)
        .analysers(parse_analyser_list(&cli.analysers))
        .output(output)
        .format(cli.format)
        .engine(engine)
        .build()
        .context("Invalid run options")
}

fn print_summary(report: &RunReport) {
    let succeeded = report.outcomes.iter().filter(|o| o.succeeded()).count();

    eprintln!();
    eprintln!("{}", "─".repeat(60));
    eprintln!(
        " {} - {}",
        report.root_path.display(),
        format_size(report.stats.total_size)
    );
    eprintln!(
        " {} files, {} directories",
        report.stats.total_files, report.stats.total_dirs
    );
    eprintln!(" Built in {:.2}s", report.build_duration.as_secs_f64());
    eprintln!(
        " {} of {} analysers succeeded, {} sections written",
        succeeded,
        report.outcomes.len(),
        report.merge.sections
    );
    eprintln!("{}", "─".repeat(60));

    if report.has_diagnostics() {
        eprintln!();
        eprintln!("{} warning(s):", report.diagnostics.len());
        for diagnostic in &report.diagnostics {
            eprintln!(" {diagnostic}");
        }
    }
    eprintln!();
}

fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
