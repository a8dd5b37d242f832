//! # Configuration
//!
//! Indice reads a small JSON file. The outline format, the region markers and
//! the index tag are fixed; configuration only covers which files form the
//! vault and how traversal and watching behave.
//!
//! ## Storage Hierarchy
//!
//! Resolved in priority order:
//! 1. **Vault Config**: `<vault>/.indice/config.json`
//! 2. **User Config**: `config.json` in the OS config directory (via `directories`)
//! 3. **Compiled Defaults**
//!
//! The first file found wins as a whole; files are not merged key by key.
//! Missing keys inside a file fall back to their defaults.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `extensions` | `["md"]` | File extensions treated as documents |
//! | `max-depth` | `6` | Deepest folder level included in an outline |
//! | `ignore` | `[]` | Folder or file names to skip (hidden names are always skipped) |
//! | `debounce-ms` | `200` | Window for coalescing repeated watch events |

use crate::error::{IndiceError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = ".indice";
const CONFIG_FILENAME: &str = "config.json";

/// Deepest folder level an outline descends to. Guards against cyclic or
/// pathological folder graphs.
pub const DEFAULT_MAX_DEPTH: usize = 6;
const DEFAULT_DEBOUNCE_MS: u64 = 200;

fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct IndiceConfig {
    /// File extensions treated as documents, with or without a leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default)]
    pub ignore: Vec<String>,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for IndiceConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            max_depth: DEFAULT_MAX_DEPTH,
            ignore: Vec::new(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl IndiceConfig {
    pub const KEYS: [&'static str; 4] = ["extensions", "max-depth", "ignore", "debounce-ms"];

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(IndiceError::Io)?;
        let config: IndiceConfig =
            serde_json::from_str(&content).map_err(IndiceError::Serialization)?;
        Ok(config)
    }

    /// Resolve the effective config for a vault: vault file, then user file,
    /// then defaults.
    pub fn resolve(vault_root: &Path) -> Result<Self> {
        ConfigPaths::for_vault(vault_root).resolve()
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(IndiceError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(IndiceError::Serialization)?;
        fs::write(config_path, content).map_err(IndiceError::Io)?;
        Ok(())
    }

    /// Extensions normalized to lowercase without a leading dot.
    pub fn extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "extensions" => Some(self.extensions.join(",")),
            "max-depth" => Some(self.max_depth.to_string()),
            "ignore" => Some(self.ignore.join(",")),
            "debounce-ms" => Some(self.debounce_ms.to_string()),
            _ => None,
        }
    }

    /// Set a key from its textual form. Lists are comma-separated.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "extensions" => {
                let extensions = split_list(value);
                if extensions.is_empty() {
                    return Err(IndiceError::Config(
                        "extensions cannot be empty".to_string(),
                    ));
                }
                self.extensions = extensions;
            }
            "max-depth" => {
                self.max_depth = value.trim().parse().map_err(|_| {
                    IndiceError::Config(format!("max-depth must be a number, got '{}'", value))
                })?;
            }
            "ignore" => self.ignore = split_list(value),
            "debounce-ms" => {
                self.debounce_ms = value.trim().parse().map_err(|_| {
                    IndiceError::Config(format!("debounce-ms must be a number, got '{}'", value))
                })?;
            }
            other => {
                return Err(IndiceError::Config(format!(
                    "Unknown config key: {}",
                    other
                )))
            }
        }
        Ok(())
    }
}

/// Directory holding the vault-level config file.
pub fn vault_config_dir(vault_root: &Path) -> PathBuf {
    vault_root.join(CONFIG_DIR)
}

/// User-level config directory, if the platform has one.
pub fn user_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "indice", "indice").map(|dirs| dirs.config_dir().to_path_buf())
}

/// The config directories consulted for one vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub vault_dir: PathBuf,
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    pub fn for_vault(vault_root: &Path) -> Self {
        Self {
            vault_dir: vault_config_dir(vault_root),
            user_dir: user_config_dir(),
        }
    }

    pub fn has_vault_file(&self) -> bool {
        self.vault_dir.join(CONFIG_FILENAME).exists()
    }

    /// The config in effect: the vault file if present, else the user file,
    /// else defaults.
    pub fn resolve(&self) -> Result<IndiceConfig> {
        if self.has_vault_file() {
            return IndiceConfig::load(&self.vault_dir);
        }
        match &self.user_dir {
            Some(dir) => IndiceConfig::load(dir),
            None => Ok(IndiceConfig::default()),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
