//! kwscout - Generate keyword variants and look up their SEO metrics
//!
//! Expands a seed keyword through WordNet (or a JSON lexicon), then queries
//! SerpApi for the first few variants and prints the results.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use kwscout::cli::{Cli, RunConfig};
use kwscout::config::{self, Settings};
use kwscout::expander::KeywordExpander;
use kwscout::lexicon::{self, Lexicon};
use kwscout::metrics::MetricsFetcher;
use kwscout::pipeline::{self, Progress};
use kwscout::report;

/// Sets up env_logger, honouring RUST_LOG when present
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "kwscout=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Prints lookup progress to stderr so stdout only carries the report
fn print_progress(progress: Progress<'_>) {
    eprintln!(
        "Analyzing: {} ({}/{})",
        progress.keyword, progress.current, progress.total
    );
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match cli.config.clone().or_else(config::default_settings_path) {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };
    let config = RunConfig::from_cli(&cli, &settings)?;

    let lexicon: Arc<dyn Lexicon> = Arc::from(lexicon::open(&config.lexicon_path)?);
    let expander = KeywordExpander::new(lexicon);
    let fetcher = MetricsFetcher::new(config.fetcher.clone());

    let analysis = pipeline::analyze(
        &expander,
        &fetcher,
        &config.seed,
        config.credential.as_ref(),
        config.options,
        print_progress,
    )
    .await;

    let mut stdout = io::stdout().lock();
    report::render(&mut stdout, &analysis, config.format)?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
