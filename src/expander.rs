//! Keyword expansion
//!
//! Turns a seed keyword into the set of lemmas that share a sense with it,
//! memoizing results per seed for the lifetime of the expander.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cache::TtlCache;
use crate::lexicon::Lexicon;

/// Deduplicated keyword variants in first-seen order
///
/// Iteration follows the lexicon's sense order, then lemma order within a
/// sense, so truncating the set keeps the variants of the seed's first senses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a keyword unless an identical one is already present
    pub fn insert(&mut self, keyword: String) -> bool {
        if self.contains(&keyword) {
            return false;
        }
        self.keywords.push(keyword);
        true
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.keywords.iter()
    }

    /// The first `limit` keywords, in set order
    pub fn first(&self, limit: usize) -> &[String] {
        &self.keywords[..limit.min(self.keywords.len())]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }
}

impl FromIterator<String> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let keywords = iter
            .into_iter()
            .filter(|keyword| seen.insert(keyword.clone()))
            .collect();
        Self { keywords }
    }
}

impl<'a> IntoIterator for &'a KeywordSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.keywords.iter()
    }
}

/// Expands seed keywords through a lexicon, caching by seed
pub struct KeywordExpander {
    lexicon: Arc<dyn Lexicon>,
    cache: Mutex<TtlCache<String, KeywordSet>>,
}

impl KeywordExpander {
    /// Creates an expander with an empty, never-expiring cache
    pub fn new(lexicon: Arc<dyn Lexicon>) -> Self {
        Self::with_cache(lexicon, TtlCache::unbounded())
    }

    /// Creates an expander using the given cache
    pub fn with_cache(lexicon: Arc<dyn Lexicon>, cache: TtlCache<String, KeywordSet>) -> Self {
        Self {
            lexicon,
            cache: Mutex::new(cache),
        }
    }

    /// Returns every lemma sharing a sense with `seed`, separators replaced by spaces
    ///
    /// A seed unknown to the lexicon yields an empty set. Repeated calls with the
    /// same seed are served from the cache without touching the lexicon.
    pub fn expand(&self, seed: &str) -> KeywordSet {
        if let Some(cached) = self.cache().get(&seed.to_string()) {
            log::debug!("Expansion cache hit for '{}'", seed);
            return cached.data;
        }

        let separator = self.lexicon.separator();
        let keywords: KeywordSet = self
            .lexicon
            .senses(seed)
            .into_iter()
            .flat_map(|sense| sense.lemmas)
            .map(|lemma| lemma.replace(separator, " "))
            .collect();

        log::debug!("Expanded '{}' into {} keyword(s)", seed, keywords.len());
        self.cache().insert(seed.to_string(), keywords.clone());
        keywords
    }

    /// Drops every memoized expansion
    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    /// Number of memoized seeds
    pub fn cached_len(&self) -> usize {
        self.cache().len()
    }

    fn cache(&self) -> MutexGuard<'_, TtlCache<String, KeywordSet>> {
        // The cache holds plain data, so a poisoned lock is still usable
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
