//! kwscout library
//!
//! Expands a seed keyword into related terms through a lexical database and
//! annotates each term with search metrics from SerpApi. Both steps are cached;
//! the `pipeline` module ties them together the way the CLI uses them.

pub mod cache;
pub mod cli;
pub mod config;
pub mod expander;
pub mod lexicon;
pub mod metrics;
pub mod pipeline;
pub mod report;
