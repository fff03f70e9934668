//! Configuration loading and management
//!
//! Handles parsing of `.ticksync.toml` configuration files. Credentials are
//! never read from the file; they come from flags or the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::apply::Throttle;
use crate::board::trello::TRELLO_API_URL;
use crate::normalize::{NormalizeOptions, DEFAULT_SEPARATOR};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = ".ticksync.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Board configuration
    #[serde(default)]
    pub board: BoardConfig,

    /// Sync behaviour
    #[serde(default)]
    pub sync: SyncConfig,

    /// Request pacing
    #[serde(default)]
    pub throttle: ThrottleConfig,
}

/// Board-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Board identifier (may be overridden by `TRELLO_BOARD_ID`)
    #[serde(default)]
    pub id: String,

    /// API root
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    TRELLO_API_URL.to_string()
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            api_url: default_api_url(),
        }
    }
}

/// Sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Turn top-level tasks into labels for their descendants
    #[serde(default)]
    pub group_by_top_level: bool,

    /// String placed between nested titles
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Label colours to cycle through; empty uses the board's palette
    #[serde(default)]
    pub palette: Vec<String>,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            group_by_top_level: false,
            separator: default_separator(),
            palette: Vec::new(),
        }
    }
}

/// Throttle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Lower bound of the delay before each card creation
    #[serde(default = "default_create_delay_min_ms")]
    pub create_delay_min_ms: u64,

    /// Upper bound of the delay before each card creation
    #[serde(default = "default_create_delay_max_ms")]
    pub create_delay_max_ms: u64,
}

fn default_create_delay_min_ms() -> u64 {
    10
}

fn default_create_delay_max_ms() -> u64 {
    9910
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            create_delay_min_ms: default_create_delay_min_ms(),
            create_delay_max_ms: default_create_delay_max_ms(),
        }
    }
}

impl ThrottleConfig {
    pub fn throttle(&self) -> Throttle {
        Throttle::new(self.create_delay_min_ms, self.create_delay_max_ms)
    }
}

impl SyncConfig {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            group_by_top_level: self.group_by_top_level,
            separator: self.separator.clone(),
        }
    }
}

impl Config {
    /// Load configuration from a `.ticksync.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.ticksync.toml` from a directory, or return defaults if absent
    pub fn load_from_dir(dir: &Path) -> crate::error::Result<Self> {
        let config_path = Self::path_in(dir);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.sync.separator.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "sync.separator cannot be empty".to_string(),
            ));
        }
        if self.sync.palette.iter().any(|color| color.trim().is_empty()) {
            return Err(crate::error::Error::InvalidConfig(
                "sync.palette cannot include empty entries".to_string(),
            ));
        }
        if self.board.api_url.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "board.api_url cannot be empty".to_string(),
            ));
        }
        if self.throttle.create_delay_min_ms > self.throttle.create_delay_max_ms {
            return Err(crate::error::Error::InvalidConfig(format!(
                "throttle.create_delay_min_ms ({}) must be <= throttle.create_delay_max_ms ({})",
                self.throttle.create_delay_min_ms, self.throttle.create_delay_max_ms
            )));
        }
        Ok(())
    }
}
