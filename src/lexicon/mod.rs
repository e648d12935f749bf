//! Lexical database access
//!
//! A lexicon maps a term to the senses it belongs to, each sense being a group
//! of lemmas that share a meaning. Lemmas are stored the way the backing
//! database stores them, words joined by the lexicon's separator.

pub mod wordnet;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use wordnet::WordNetLexicon;

/// Separator WordNet uses between the words of a multi-word lemma
pub const DEFAULT_SEPARATOR: char = '_';

/// A group of lemmas sharing one meaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    /// Identifier of the sense within the lexicon (e.g. "bank.n.01")
    pub name: String,
    /// Member terms, in the lexicon's own spelling
    pub lemmas: Vec<String>,
}

impl Sense {
    pub fn new(
        name: impl Into<String>,
        lemmas: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            lemmas: lemmas.into_iter().map(Into::into).collect(),
        }
    }
}

/// Errors that can occur when opening a lexicon
#[derive(Debug, Error)]
pub enum LexiconError {
    /// The lexicon path does not exist
    #[error("Lexicon not found at {0}")]
    NotFound(PathBuf),

    /// Reading a lexicon file failed
    #[error("Failed to read lexicon file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON lexicon could not be parsed
    #[error("Failed to parse JSON lexicon: {0}")]
    Json(#[from] serde_json::Error),

    /// A WordNet directory has no usable index/data file pairs
    #[error("No WordNet index/data files found in {0}")]
    NoWordNetFiles(PathBuf),

    /// A WordNet file line could not be parsed
    #[error("Malformed WordNet entry in {file}: {reason}")]
    MalformedEntry { file: String, reason: String },
}

/// Read-only lookup from a term to its senses
pub trait Lexicon: Send + Sync {
    /// Returns every sense the term belongs to, in the lexicon's preferred order.
    /// Unknown terms yield an empty list.
    fn senses(&self, term: &str) -> Vec<Sense>;

    /// Character the lexicon places between the words of a multi-word lemma
    fn separator(&self) -> char {
        DEFAULT_SEPARATOR
    }
}

/// Lexicon held entirely in memory
///
/// Terms are matched exactly as given; no case folding is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryLexicon {
    entries: HashMap<String, Vec<Sense>>,
}

impl InMemoryLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sense for `term`, builder style
    pub fn with_sense(mut self, term: impl Into<String>, sense: Sense) -> Self {
        self.add_sense(term, sense);
        self
    }

    pub fn add_sense(&mut self, term: impl Into<String>, sense: Sense) {
        self.entries.entry(term.into()).or_default().push(sense);
    }

    /// Parses a lexicon of the form `{"term": [{"name": "...", "lemmas": [...]}]}`
    pub fn from_json_str(json: &str) -> Result<Self, LexiconError> {
        let entries: HashMap<String, Vec<Sense>> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    /// Loads a JSON lexicon file
    pub fn from_json_file(path: &Path) -> Result<Self, LexiconError> {
        let content = fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lexicon for InMemoryLexicon {
    fn senses(&self, term: &str) -> Vec<Sense> {
        self.entries.get(term).cloned().unwrap_or_default()
    }
}

/// Opens a lexicon from disk
///
/// A directory is read as a WordNet `dict/` directory, a file as a JSON lexicon.
pub fn open(path: &Path) -> Result<Box<dyn Lexicon>, LexiconError> {
    if path.is_dir() {
        let lexicon = WordNetLexicon::open(path)?;
        log::info!(
            "Loaded WordNet lexicon from {} ({} index entries)",
            path.display(),
            lexicon.index_len()
        );
        Ok(Box::new(lexicon))
    } else if path.is_file() {
        let lexicon = InMemoryLexicon::from_json_file(path)?;
        log::info!(
            "Loaded JSON lexicon from {} ({} terms)",
            path.display(),
            lexicon.len()
        );
        Ok(Box::new(lexicon))
    } else {
        Err(LexiconError::NotFound(path.to_path_buf()))
    }
}
