//! finsent CLI binary.
//!
//! Runs the collection, preparation, fine-tuning and evaluation stages.

mod pipeline;

use clap::{Parser, Subcommand};
use finsent::{Config, DEFAULT_CONFIG_PATH};
use finsent_data::cache::CacheSource;
use pipeline::cache_manager::{ResponseCache, open_cache, print_cache_info};
use pipeline::collect::{Phases, run_collection};
use pipeline::model::{run_analyze, run_evaluate, run_infer, run_train};
use pipeline::prepare::run_prepare;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "finsent")]
#[command(about = "finsent: financial sentiment fine-tuning on SEC filings and FRED data", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Data root, overriding paths.data_dir
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download SEC filings, FRED indicators and policy uncertainty data
    Collect {
        /// Collect SEC EDGAR filings
        #[arg(long)]
        sec: bool,

        /// Collect FRED economic indicators
        #[arg(long)]
        fred: bool,

        /// Collect Economic Policy Uncertainty series
        #[arg(long)]
        policy: bool,

        /// Disable caching (always fetch fresh data)
        #[arg(long)]
        no_cache: bool,

        /// Ignore cached responses but store new ones
        #[arg(long)]
        refresh: bool,
    },

    /// Build the labeled training corpus from collected data
    Prepare,

    /// Fine-tune the sentiment classifier on the prepared corpus
    Train,

    /// Evaluate the fine-tuned model
    Evaluate {
        /// Labeled CSV with `text` and `label` columns
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Predict sentiment for texts (built-in examples when none are given)
    Infer {
        /// Texts to classify
        text: Vec<String>,
    },

    /// Show label distribution and samples per source
    Analyze,

    /// Inspect or clear the response cache
    Cache {
        /// Show cache statistics (the default when nothing is cleared)
        #[arg(long)]
        stats: bool,

        /// Clear the cache: all, edgar, fred or policy
        #[arg(long, value_name = "SOURCE", num_args = 0..=1, default_missing_value = "all")]
        clear: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(dir) = &cli.data_dir {
        config.paths.data_dir = dir.clone();
    }
    Ok(config)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Collect {
            sec,
            fred,
            policy,
            no_cache,
            refresh,
        } => {
            let cache_path = config.paths.cache_path();
            let cache = if no_cache {
                ResponseCache::disabled()
            } else {
                ResponseCache::open(&cache_path, refresh)
            };
            let phases = Phases::from_flags(sec, fred, policy);
            let summary = run_collection(&config, phases, &cache).await;
            println!("{}", summary.to_ascii_table());
        }
        Commands::Prepare => {
            run_prepare(&config.layout())?;
        }
        Commands::Train => {
            run_train(&config)?;
        }
        Commands::Evaluate { dataset } => {
            run_evaluate(&config, dataset.as_deref())?;
        }
        Commands::Infer { text } => {
            run_infer(&config, &text)?;
        }
        Commands::Analyze => {
            run_analyze(&config)?;
        }
        Commands::Cache { stats, clear } => {
            let cache_path = config.paths.cache_path();
            let actions = CacheActions::from_flags(stats, clear);
            if let Some(source) = &actions.clear {
                clear_cache(&cache_path, source)?;
            }
            if actions.show_stats {
                print_cache_info(&cache_path);
            }
        }
    }

    Ok(())
}

/// What `finsent cache` should do.
#[derive(Debug, PartialEq, Eq)]
struct CacheActions {
    clear: Option<String>,
    show_stats: bool,
}

impl CacheActions {
    /// Stats are shown when asked for or when nothing is cleared.
    fn from_flags(stats: bool, clear: Option<String>) -> Self {
        Self {
            show_stats: stats || clear.is_none(),
            clear,
        }
    }
}

fn clear_cache(path: &std::path::Path, source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let cache = open_cache(path)?;
    if source.eq_ignore_ascii_case("all") {
        cache.clear_all()?;
        println!("Cleared all cached data");
    } else {
        let source = CacheSource::from_db_str(&source.to_lowercase())?;
        let removed = cache.clear_source(source)?;
        println!("Cleared {} cached {} responses", removed, source.to_db_str());
    }
    Ok(())
}
