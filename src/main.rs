// Command-line entry point for feature-graph.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use feature_graph::application::{ConvertUsecase, ExtractUsecase};
use feature_graph::infrastructure::concurrency::init_thread_pool;
use feature_graph::infrastructure::config::{ExportConfig, OutputFormat};
use feature_graph::infrastructure::rust_extractor::SynFeatureExtractor;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build feature graphs from Rust source files
    Extract {
        /// Input source file path (can specify multiple)
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Output directory, one graph per input
        #[arg(short, long)]
        output: PathBuf,

        /// Prune leaf AST nodes before export
        #[arg(long)]
        prune: bool,

        #[command(flatten)]
        export: ExportArgs,
    },
    /// Re-encode a stored JSON or bincode graph record
    Convert {
        /// Graph record (.json is read as JSON, anything else as bincode)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        export: ExportArgs,
    },
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Label DOT nodes with id, kind and line
    #[arg(long)]
    verbose_dot: bool,

    /// TOML export configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ExportArgs {
    fn resolve(&self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::load(path)?,
            None => ExportConfig::default(),
        };
        if let Some(format) = self.format {
            config.format = format;
        }
        config.verbose |= self.verbose_dot;
        Ok(config)
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    // RUST_LOG wins over --verbose
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn run_extract(input: &[PathBuf], output: &Path, prune: bool, export: &ExportArgs) -> Result<()> {
    let mut config = export.resolve()?;
    config.prune |= prune;
    init_thread_pool(config.threads)?;

    fs::create_dir_all(output)
        .with_context(|| format!("Cannot create output directory {}", output.display()))?;

    let extractor = SynFeatureExtractor::new(config.prune);
    let exporter = config.exporter();
    let usecase = ExtractUsecase {
        extractor: &extractor,
        exporter: exporter.as_ref(),
    };

    let results: Vec<Result<PathBuf>> = input
        .par_iter()
        .map(|path| usecase.run_file(path, output))
        .collect();

    let mut failed = 0;
    for result in results {
        match result {
            Ok(path) => info!(path = %path.display(), "graph written"),
            Err(e) => {
                error!("{:#}", e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{} of {} inputs failed", failed, input.len());
    }
    Ok(())
}

fn run_convert(input: &Path, output: &Path, export: &ExportArgs) -> Result<()> {
    let config = export.resolve()?;
    let exporter = config.exporter();
    let usecase = ConvertUsecase {
        exporter: exporter.as_ref(),
    };
    let graph = usecase.run(input, output)?;
    info!(
        output = %output.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "conversion completed"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match &cli.command {
        Command::Extract {
            input,
            output,
            prune,
            export,
        } => run_extract(input, output, *prune, export),
        Command::Convert {
            input,
            output,
            export,
        } => run_convert(input, output, export),
    }
}
