//! Keyword analysis pipeline
//!
//! Expands a seed, keeps the first `limit` variants and looks each one up in
//! turn, pausing for a fixed delay between lookups to stay clear of upstream
//! rate limits. Results keep the order in which keywords were looked up.

use serde::Serialize;
use std::time::Duration;

use crate::expander::{KeywordExpander, KeywordSet};
use crate::metrics::{ApiCredential, MetricsFetcher, MetricsResult};

/// Default number of keywords looked up per analysis
pub const DEFAULT_LIMIT: usize = 5;

/// Default pause between consecutive lookups
pub const DEFAULT_DELAY: Duration = Duration::from_millis(200);

/// Options for a single analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Maximum number of keywords to look up
    pub limit: usize,
    /// Pause between consecutive lookups
    pub delay: Duration,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            delay: DEFAULT_DELAY,
        }
    }
}

/// Emitted before each lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress<'a> {
    /// 1-based position of the keyword being looked up
    pub current: usize,
    /// Number of lookups in this run
    pub total: usize,
    pub keyword: &'a str,
}

/// Output of an analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub seed: String,
    /// Every variant the seed expanded to
    pub keywords: KeywordSet,
    /// Metrics for the analyzed keywords, in lookup order; empty without a credential
    pub results: Vec<MetricsResult>,
}

impl Analysis {
    /// Whether metrics were looked up for this run
    pub fn analyzed(&self) -> bool {
        !self.results.is_empty()
    }
}

/// Expands `seed` and looks up metrics for the first `options.limit` variants
///
/// Without a credential the run stops after expansion. Lookups run one at a
/// time with `options.delay` between them, regardless of how the previous
/// lookup went. A failed lookup only affects its own result.
pub async fn analyze<F>(
    expander: &KeywordExpander,
    fetcher: &MetricsFetcher,
    seed: &str,
    credential: Option<&ApiCredential>,
    options: AnalysisOptions,
    mut on_progress: F,
) -> Analysis
where
    F: FnMut(Progress<'_>),
{
    let keywords = expander.expand(seed);

    let results = match credential {
        Some(credential) if !keywords.is_empty() => {
            let selected = keywords.first(options.limit);
            log::info!(
                "Analyzing {} of {} keyword(s) for '{}'",
                selected.len(),
                keywords.len(),
                seed
            );
            fetch_all(fetcher, selected, credential, options.delay, &mut on_progress).await
        }
        _ => Vec::new(),
    };

    Analysis {
        seed: seed.to_string(),
        keywords,
        results,
    }
}

/// Looks up each keyword in order, sleeping `delay` between lookups
pub async fn fetch_all<F>(
    fetcher: &MetricsFetcher,
    keywords: &[String],
    credential: &ApiCredential,
    delay: Duration,
    on_progress: &mut F,
) -> Vec<MetricsResult>
where
    F: FnMut(Progress<'_>),
{
    let total = keywords.len();
    let mut results = Vec::with_capacity(total);

    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        on_progress(Progress {
            current: i + 1,
            total,
            keyword,
        });
        results.push(fetcher.fetch(keyword, credential).await);
    }

    results
}
