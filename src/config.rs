//! Settings file support
//!
//! Optional defaults are read from a JSON file in the platform config
//! directory (`~/.config/kwscout/settings.json` on Linux). Command-line flags
//! take precedence over anything set here.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the settings file inside the config directory
const SETTINGS_FILE: &str = "settings.json";

/// Name of the WordNet directory inside the data directory
const LEXICON_DIR: &str = "wordnet";

/// Errors that can occur when loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file exists but could not be read
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid JSON for `Settings`
    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Defaults read from the settings file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// WordNet `dict/` directory or JSON lexicon file
    pub lexicon_path: Option<PathBuf>,
    /// Metrics API endpoint
    pub endpoint: Option<String>,
    /// Number of keywords to analyze
    pub limit: Option<usize>,
    /// Pause between lookups in milliseconds
    pub delay_ms: Option<u64>,
    /// How long failed lookups stay cached, in seconds
    pub failure_ttl_secs: Option<u64>,
}

impl Settings {
    /// Loads settings from `path`
    ///
    /// A missing file yields the defaults; an unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No settings file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let settings = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "kwscout")
}

/// Default settings file location
///
/// Returns `None` if the config directory cannot be determined (e.g., no home directory).
pub fn default_settings_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

/// Default lexicon location, a WordNet directory under the platform data directory
pub fn default_lexicon_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join(LEXICON_DIR))
}
