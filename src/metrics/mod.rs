//! Search metrics for keywords
//!
//! This module contains the result types returned by the metrics fetcher and
//! the credential wrapper used to authenticate against the metrics API.

pub mod client;

pub use client::{FetcherConfig, MetricsError, MetricsFetcher};

use serde::ser::Serializer;
use serde::Serialize;
use serde_json::{Number, Value};
use std::fmt;

/// Text shown in place of a metric the API did not provide
pub const NOT_AVAILABLE: &str = "N/A";

/// Secret used to authenticate against the metrics API
///
/// The value is never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for building requests only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(****)")
    }
}

/// A metric value, or the `"N/A"` sentinel when the API did not supply one
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Number(Number),
    NotAvailable,
}

impl MetricValue {
    /// Reads a metric from an optional JSON field
    ///
    /// Numbers are kept, numeric strings are parsed, anything else is `NotAvailable`.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => MetricValue::Number(n.clone()),
            Some(Value::String(s)) => parse_numeric_string(s)
                .map(MetricValue::Number)
                .unwrap_or(MetricValue::NotAvailable),
            _ => MetricValue::NotAvailable,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => n.as_f64(),
            MetricValue::NotAvailable => None,
        }
    }
}

impl From<u64> for MetricValue {
    fn from(n: u64) -> Self {
        MetricValue::Number(n.into())
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{}", n),
            MetricValue::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricValue::Number(n) => n.serialize(serializer),
            MetricValue::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// Parses strings like "1200", "1,200" or "35.5" into a JSON number
fn parse_numeric_string(s: &str) -> Option<Number> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    if let Ok(n) = cleaned.parse::<u64>() {
        return Some(n.into());
    }
    cleaned.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Outcome of a metrics lookup
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsOutcome {
    Success {
        search_volume: MetricValue,
        keyword_difficulty: MetricValue,
    },
    Failure {
        error: String,
    },
}

/// Metrics for a single keyword
///
/// Serializes as `{keyword, success, search_volume, keyword_difficulty}` on
/// success and `{keyword, success, error}` on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsResult {
    pub keyword: String,
    pub outcome: MetricsOutcome,
}

impl MetricsResult {
    pub fn success(
        keyword: impl Into<String>,
        search_volume: MetricValue,
        keyword_difficulty: MetricValue,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            outcome: MetricsOutcome::Success {
                search_volume,
                keyword_difficulty,
            },
        }
    }

    pub fn failure(keyword: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            outcome: MetricsOutcome::Failure {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, MetricsOutcome::Success { .. })
    }

    /// The failure description, if the lookup failed
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            MetricsOutcome::Failure { error } => Some(error),
            MetricsOutcome::Success { .. } => None,
        }
    }
}

/// Flat shape written out for a `MetricsResult`
#[derive(Serialize)]
struct MetricsRecord<'a> {
    keyword: &'a str,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_volume: Option<&'a MetricValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword_difficulty: Option<&'a MetricValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for MetricsResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = match &self.outcome {
            MetricsOutcome::Success {
                search_volume,
                keyword_difficulty,
            } => MetricsRecord {
                keyword: &self.keyword,
                success: true,
                search_volume: Some(search_volume),
                keyword_difficulty: Some(keyword_difficulty),
                error: None,
            },
            MetricsOutcome::Failure { error } => MetricsRecord {
                keyword: &self.keyword,
                success: false,
                search_volume: None,
                keyword_difficulty: None,
                error: Some(error),
            },
        };
        record.serialize(serializer)
    }
}
