//! Rendering of analysis results
//!
//! Text output mirrors what a user sees in an interactive session: the
//! generated keywords first, then one block per analyzed keyword. JSON output
//! is the serialized `Analysis`.

use clap::ValueEnum;
use std::io::{self, Write};

use crate::metrics::{MetricsOutcome, MetricsResult};
use crate::pipeline::Analysis;

/// Number of generated keywords listed before analysis
pub const PREVIEW_LIMIT: usize = 15;

/// Output formats supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Writes `analysis` in the requested format
pub fn render<W: Write>(out: &mut W, analysis: &Analysis, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => render_text(out, analysis),
        OutputFormat::Json => render_json(out, analysis),
    }
}

fn render_json<W: Write>(out: &mut W, analysis: &Analysis) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, analysis)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(out)
}

fn render_text<W: Write>(out: &mut W, analysis: &Analysis) -> io::Result<()> {
    if analysis.keywords.is_empty() {
        writeln!(
            out,
            "No keyword variations found for '{}'. Try a different seed keyword.",
            analysis.seed
        )?;
        return Ok(());
    }

    writeln!(
        out,
        "Generated Keywords ({} found)",
        analysis.keywords.len()
    )?;
    writeln!(
        out,
        "Top suggestions: {}",
        analysis.keywords.first(PREVIEW_LIMIT).join(", ")
    )?;

    if !analysis.analyzed() {
        writeln!(out)?;
        writeln!(
            out,
            "Provide a SerpApi key (--api-key or SERPAPI_KEY) to enable SEO analysis."
        )?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "SEO Analysis ({} keywords)", analysis.results.len())?;
    for result in &analysis.results {
        render_result(out, result)?;
    }

    Ok(())
}

fn render_result<W: Write>(out: &mut W, result: &MetricsResult) -> io::Result<()> {
    writeln!(out, "  {}", result.keyword)?;
    match &result.outcome {
        MetricsOutcome::Success {
            search_volume,
            keyword_difficulty,
        } => {
            writeln!(out, "    Estimated Search Volume: {}", search_volume)?;
            writeln!(out, "    Keyword Difficulty:      {}", keyword_difficulty)?;
        }
        MetricsOutcome::Failure { error } => {
            writeln!(out, "    Failed to analyze: {}", error)?;
        }
    }
    Ok(())
}
