use std::path::PathBuf;

use clap::{Parser, Subcommand};
use price_audit::sync;
use price_audit::{ReconcileConfig, Reconciler, Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Reconcile(args) => execute_reconcile(args),
    }
}

fn execute_reconcile(args: ReconcileArgs) -> Result<()> {
    for input in [&args.markup, &args.descriptions] {
        if !input.exists() {
            return Err(ToolError::MissingInput(input.clone()));
        }
    }

    let config = args.resolve_config()?;
    let reconciler = Reconciler::new(config)?;
    let result =
        sync::reconcile_files(&reconciler, &args.markup, &args.descriptions, &args.output)?;

    println!(
        "{} matched, {} unmatched, {} failed -> {}",
        result.matched,
        result.unmatched,
        result.failed,
        args.output.display()
    );
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Compare catalogue markup with marketplace descriptions and extract prices."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Join the two files by product identifier and write a comparison table.
    Reconcile(ReconcileArgs),
}

#[derive(clap::Args)]
struct ReconcileArgs {
    /// File whose first two columns hold the product identifier and markup.
    #[arg(long)]
    markup: PathBuf,

    /// File whose second and fourth columns hold the product identifier and
    /// plain-text description.
    #[arg(long)]
    descriptions: PathBuf,

    /// Output path; `.csv` or `.xlsx`.
    #[arg(long, default_value = "comparison_results.csv")]
    output: PathBuf,

    /// JSON file with run settings. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rows processed per batch.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Worker threads.
    #[arg(long)]
    workers: Option<usize>,

    /// Cache entries per table; 0 disables caching.
    #[arg(long)]
    cache_capacity: Option<usize>,

    /// Omit the word-level Differences column.
    #[arg(long)]
    no_diff: bool,
}

impl ReconcileArgs {
    fn resolve_config(&self) -> Result<ReconcileConfig> {
        let mut config = match &self.config {
            Some(path) => ReconcileConfig::from_json_file(path)?,
            None => ReconcileConfig::default(),
        };
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(cache_capacity) = self.cache_capacity {
            config.cache_capacity = cache_capacity;
        }
        if self.no_diff {
            config.include_diff = false;
        }
        config.validate()?;
        Ok(config)
    }
}
