//! Configuration: XDG path resolution and the TOML config file.
//!
//! `AppPaths` locates `$XDG_CONFIG_HOME/knowgen/` and `$XDG_DATA_HOME/knowgen/`.
//! `KnowgenConfig` is read from `config.toml` in the config directory; every
//! field has a default, and a missing file means all defaults.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::traverse::{DEFAULT_ROOT, SUBTOPIC_PREDICATE};
use crate::llm::OpenAiConfig;
use crate::navigator::{DEFAULT_START_CONCEPT, SessionSettings};

/// Application directory name under the XDG base directories.
pub const APP_DIR: &str = "knowgen";
/// Config file name inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";
/// Default file the subtopic tree is written to.
pub const DEFAULT_TREE_OUTPUT: &str = "subtopic_tree.txt";

/// Errors from configuration loading.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(knowgen::config::no_home),
        help("Set the HOME environment variable, or pass --data-dir and --config explicitly.")
    )]
    NoHome,

    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(knowgen::config::read),
        help("Ensure the config file is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(knowgen::config::parse),
        help("Check the TOML syntax and field types in the config file.")
    )]
    Parse { path: String, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// XDG-compliant directories for knowgen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// `$XDG_CONFIG_HOME/knowgen/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/knowgen/`
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Resolve directories from the environment with the standard fallbacks.
    pub fn resolve() -> ConfigResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolve directories using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = |xdg: &str, fallback: &str| -> ConfigResult<PathBuf> {
            match lookup(xdg).filter(|v| !v.is_empty()) {
                Some(dir) => Ok(PathBuf::from(dir)),
                None => lookup("HOME")
                    .map(|home| PathBuf::from(home).join(fallback))
                    .ok_or(ConfigError::NoHome),
            }
        };

        Ok(Self {
            config_dir: base("XDG_CONFIG_HOME", ".config")?.join(APP_DIR),
            data_dir: base("XDG_DATA_HOME", ".local/share")?.join(APP_DIR),
        })
    }

    /// Path to the config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }
}

/// Top-level configuration, persisted as TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowgenConfig {
    /// Directory holding the database; the XDG data directory when unset.
    pub data_dir: Option<PathBuf>,
    /// Concept the navigator starts on.
    pub start_concept: String,
    /// Seed sent with every completion request.
    pub seed: u64,
    pub llm: LlmSection,
    pub export: ExportSection,
}

impl Default for KnowgenConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            start_concept: DEFAULT_START_CONCEPT.into(),
            seed: 0,
            llm: LlmSection::default(),
            export: ExportSection::default(),
        }
    }
}

/// `[llm]`: the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        let defaults = OpenAiConfig::default();
        Self {
            base_url: defaults.base_url,
            model: defaults.model,
            api_key_env: defaults.api_key_env,
            timeout_secs: defaults.timeout_secs,
        }
    }
}

impl From<&LlmSection> for OpenAiConfig {
    fn from(section: &LlmSection) -> Self {
        Self {
            base_url: section.base_url.clone(),
            model: section.model.clone(),
            api_key_env: section.api_key_env.clone(),
            timeout_secs: section.timeout_secs,
        }
    }
}

/// `[export]`: the subtopic tree dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub root: String,
    pub predicate: String,
    pub output: PathBuf,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.into(),
            predicate: SUBTOPIC_PREDICATE.into(),
            output: PathBuf::from(DEFAULT_TREE_OUTPUT),
        }
    }
}

impl KnowgenConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        Self::parse(&text).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// The configured data directory, or the XDG one.
    pub fn data_dir_or(&self, paths: &AppPaths) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| paths.data_dir.clone())
    }

    /// Navigator settings derived from this config.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            start_concept: self.start_concept.clone(),
            seed: self.seed,
        }
    }
}
