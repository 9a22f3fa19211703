//! Persisted configuration
//!
//! Stored as TOML under the platform config directory. The effective base
//! URL is resolved once at startup (flag > environment > config file >
//! default) and injected into the client wrappers; nothing reads the
//! environment at request time.

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// Default backend origin, matching a locally run service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable consulted when no `--base-url` flag is given.
pub const BASE_URL_ENV: &str = "RAGBOOK_BASE_URL";

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Backend origin, e.g. "https://api.example.org"
    pub base_url: Option<String>,
    /// User identity sent with preference and query requests
    pub user: Option<String>,
    /// Textbook opened when no `--textbook` flag is given
    pub default_textbook: Option<String>,
    /// Embedding model requested for index creation
    pub embedding_model: Option<String>,
}

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path.display(), source)
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn StdError>> {
        Self::load_from_path(&Self::get_config_path())
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn StdError>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                path: config_path.clone(),
                source,
            })?;
            let config: Config =
                toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: config_path.clone(),
                    source,
                })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn StdError>> {
        self.save_to_path(&Self::get_config_path())
    }

    pub(crate) fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn StdError>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };

        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file
            .persist(config_path)
            .map_err(|err| -> Box<dyn StdError> { Box::new(err) })?;
        Ok(())
    }

    pub(crate) fn get_config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "ragbook")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }

    /// Resolve the effective base URL: flag > environment > config > default.
    pub fn resolve_base_url(&self, flag: Option<&str>) -> String {
        if let Some(url) = flag {
            return url.to_string();
        }
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.is_empty() {
                return url;
            }
        }
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Resolve the effective user identity: flag > config. May be absent;
    /// saving preferences then prompts for login instead of calling out.
    pub fn resolve_user(&self, flag: Option<&str>) -> Option<String> {
        flag.map(str::to_string).or_else(|| self.user.clone())
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        println!(
            "  base-url: {}",
            self.base_url.as_deref().unwrap_or("(unset)")
        );
        println!("  user: {}", self.user.as_deref().unwrap_or("(unset)"));
        println!(
            "  default-textbook: {}",
            self.default_textbook.as_deref().unwrap_or("(unset)")
        );
        println!(
            "  embedding-model: {}",
            self.embedding_model.as_deref().unwrap_or("(unset)")
        );
    }
}
