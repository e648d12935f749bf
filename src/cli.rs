//! Command-line interface parsing for kwscout
//!
//! This module handles parsing of CLI arguments using clap and merges them
//! with the settings file into the configuration a run needs.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::{self, Settings};
use crate::metrics::{ApiCredential, FetcherConfig};
use crate::pipeline::{AnalysisOptions, DEFAULT_DELAY, DEFAULT_LIMIT};
use crate::report::OutputFormat;

/// Smallest number of keywords that can be analyzed in one run
pub const MIN_LIMIT: usize = 1;

/// Largest number of keywords that can be analyzed in one run
pub const MAX_LIMIT: usize = 20;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The seed keyword is empty or whitespace
    #[error("Invalid seed keyword: the seed must not be empty")]
    EmptySeed,

    /// The keyword limit is outside the supported range
    #[error("Invalid limit: {0}. The limit must be between 1 and 20")]
    InvalidLimit(usize),

    /// No lexicon path was given and no default location exists
    #[error("No lexicon configured: pass --lexicon or set lexicon_path in the settings file")]
    NoLexicon,
}

/// kwscout - Generate keyword variants and look up their search metrics
#[derive(Parser, Debug)]
#[command(name = "kwscout")]
#[command(about = "Keyword variant generation and SEO metrics lookup")]
#[command(version)]
pub struct Cli {
    /// Seed keyword to expand, e.g. "digital marketing"
    pub seed: String,

    /// SerpApi key; analysis is skipped when none is given
    #[arg(long, env = "SERPAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Number of keywords to analyze (1-20)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=20))]
    pub limit: Option<u8>,

    /// Pause between metric lookups in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// WordNet dict/ directory or JSON lexicon file
    #[arg(long, value_name = "PATH")]
    pub lexicon: Option<PathBuf>,

    /// Metrics API endpoint
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// How long failed lookups stay cached, in seconds (defaults to the 1 hour success TTL)
    #[arg(long, value_name = "SECS")]
    pub failure_ttl_secs: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration for a single run, resolved from CLI arguments and settings
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub seed: String,
    /// `None` when no non-empty key was supplied
    pub credential: Option<ApiCredential>,
    pub options: AnalysisOptions,
    pub fetcher: FetcherConfig,
    pub lexicon_path: PathBuf,
    pub format: OutputFormat,
}

impl RunConfig {
    /// Creates a RunConfig from parsed CLI arguments and loaded settings.
    ///
    /// CLI flags win over settings; settings win over built-in defaults.
    ///
    /// # Returns
    /// * `Ok(RunConfig)` with every value resolved
    /// * `Err(CliError)` if the seed is empty, the limit is out of range,
    ///   or no lexicon location is known
    pub fn from_cli(cli: &Cli, settings: &Settings) -> Result<Self, CliError> {
        Self::resolve(cli, settings, config::default_lexicon_path())
    }

    fn resolve(
        cli: &Cli,
        settings: &Settings,
        default_lexicon: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        if cli.seed.trim().is_empty() {
            return Err(CliError::EmptySeed);
        }

        let limit = cli
            .limit
            .map(usize::from)
            .or(settings.limit)
            .unwrap_or(DEFAULT_LIMIT);
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(CliError::InvalidLimit(limit));
        }

        let delay = cli
            .delay_ms
            .or(settings.delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DELAY);

        let lexicon_path = cli
            .lexicon
            .clone()
            .or_else(|| settings.lexicon_path.clone())
            .or(default_lexicon)
            .ok_or(CliError::NoLexicon)?;

        let mut fetcher = FetcherConfig::default();
        if let Some(endpoint) = cli.endpoint.clone().or_else(|| settings.endpoint.clone()) {
            fetcher = fetcher.with_endpoint(endpoint);
        }
        if let Some(secs) = cli.failure_ttl_secs.or(settings.failure_ttl_secs) {
            fetcher = fetcher.with_failure_ttl(Duration::from_secs(secs));
        }

        let credential = cli
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(ApiCredential::new);

        Ok(RunConfig {
            seed: cli.seed.clone(),
            credential,
            options: AnalysisOptions { limit, delay },
            fetcher,
            lexicon_path,
            format: cli.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(args: &[&str], settings: &Settings) -> Result<RunConfig, CliError> {
        let cli = Cli::parse_from(args);
        RunConfig::resolve(&cli, settings, Some(PathBuf::from("/default/wordnet")))
    }

    #[test]
    fn test_cli_parse_seed_only() {
        let cli = Cli::parse_from(["kwscout", "bank"]);
        assert_eq!(cli.seed, "bank");
        assert!(cli.limit.is_none());
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_all_flags() {
        let cli = Cli::parse_from([
            "kwscout",
            "digital marketing",
            "--api-key",
            "k",
            "--limit",
            "7",
            "--delay-ms",
            "0",
            "--lexicon",
            "/tmp/lex.json",
            "--endpoint",
            "http://localhost/search.json",
            "--failure-ttl-secs",
            "30",
            "--format",
            "json",
            "--config",
            "/tmp/settings.json",
            "-v",
        ]);
        assert_eq!(cli.seed, "digital marketing");
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert_eq!(cli.limit, Some(7));
        assert_eq!(cli.delay_ms, Some(0));
        assert_eq!(cli.lexicon, Some(PathBuf::from("/tmp/lex.json")));
        assert_eq!(cli.failure_ttl_secs, Some(30));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_rejects_limit_out_of_range() {
        assert!(Cli::try_parse_from(["kwscout", "bank", "--limit", "0"]).is_err());
        assert!(Cli::try_parse_from(["kwscout", "bank", "--limit", "21"]).is_err());
        assert!(Cli::try_parse_from(["kwscout", "bank", "--limit", "20"]).is_ok());
    }

    #[test]
    fn test_cli_requires_seed() {
        assert!(Cli::try_parse_from(["kwscout"]).is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let config = resolve(&["kwscout", "bank"], &Settings::default()).unwrap();
        assert_eq!(config.seed, "bank");
        assert_eq!(config.options, AnalysisOptions::default());
        assert_eq!(config.fetcher, FetcherConfig::default());
        assert_eq!(config.lexicon_path, PathBuf::from("/default/wordnet"));
        assert_eq!(config.format, OutputFormat::Text);
    }

    #[test]
    fn test_resolve_settings_fill_in_missing_flags() {
        let settings = Settings {
            lexicon_path: Some(PathBuf::from("/settings/lexicon.json")),
            endpoint: Some("http://settings/search.json".to_string()),
            limit: Some(9),
            delay_ms: Some(1000),
            failure_ttl_secs: Some(45),
        };

        let config = resolve(&["kwscout", "bank"], &settings).unwrap();

        assert_eq!(config.options.limit, 9);
        assert_eq!(config.options.delay, Duration::from_millis(1000));
        assert_eq!(config.lexicon_path, PathBuf::from("/settings/lexicon.json"));
        assert_eq!(config.fetcher.endpoint, "http://settings/search.json");
        assert_eq!(config.fetcher.failure_ttl, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_resolve_flags_override_settings() {
        let settings = Settings {
            lexicon_path: Some(PathBuf::from("/settings/lexicon.json")),
            limit: Some(9),
            delay_ms: Some(1000),
            ..Default::default()
        };

        let config = resolve(
            &["kwscout", "bank", "--limit", "3", "--delay-ms", "10", "--lexicon", "/cli/dict"],
            &settings,
        )
        .unwrap();

        assert_eq!(config.options.limit, 3);
        assert_eq!(config.options.delay, Duration::from_millis(10));
        assert_eq!(config.lexicon_path, PathBuf::from("/cli/dict"));
    }

    #[test]
    fn test_resolve_rejects_settings_limit_out_of_range() {
        let settings = Settings {
            limit: Some(50),
            ..Default::default()
        };

        let result = resolve(&["kwscout", "bank"], &settings);

        let err = result.unwrap_err();
        assert!(matches!(err, CliError::InvalidLimit(50)));
        assert!(err.to_string().contains("Invalid limit"));
    }

    #[test]
    fn test_resolve_rejects_blank_seed() {
        let result = resolve(&["kwscout", "   "], &Settings::default());
        assert!(matches!(result, Err(CliError::EmptySeed)));
    }

    #[test]
    fn test_resolve_without_any_lexicon_location() {
        let cli = Cli::parse_from(["kwscout", "bank"]);
        let result = RunConfig::resolve(&cli, &Settings::default(), None);
        assert!(matches!(result, Err(CliError::NoLexicon)));
    }

    #[test]
    fn test_blank_api_key_means_no_credential() {
        let settings = Settings::default();

        let config = resolve(&["kwscout", "bank", "--api-key", "  "], &settings).unwrap();
        assert!(config.credential.is_none());

        let config = resolve(&["kwscout", "bank", "--api-key", "abc"], &settings).unwrap();
        assert_eq!(
            config.credential.map(|c| c.expose().to_string()),
            Some("abc".to_string())
        );
    }
}
