//! Core configuration

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Config schema version written by this build
const CURRENT_VERSION: u32 = 1;

/// File name of the config inside the data directory
const CONFIG_FILE: &str = "snapvault.json";

/// Default data directory for the current platform
pub fn default_data_dir() -> Result<PathBuf> {
    Ok(dirs::data_dir()
        .ok_or_else(|| anyhow!("no platform data directory available"))?
        .join("snapvault"))
}

/// Process-wide configuration, persisted as JSON in the data directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Config schema version
    pub version: u32,

    /// Data directory path
    pub data_dir: PathBuf,

    /// Writer tag recorded on every locally authored change log row. Replay
    /// skips rows carrying this tag.
    pub author_tag: String,

    /// Account identity of the local user, used for share ownership
    pub identity: String,

    /// Logging level
    pub log_level: String,
}

impl CoreConfig {
    /// Load the configuration from a data directory, creating a default one
    /// when none exists yet
    pub fn load_or_create(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);

        if config_path.exists() {
            info!("Loading config from {:?}", config_path);
            let json = fs::read_to_string(&config_path)?;
            let config: CoreConfig = serde_json::from_str(&json)?;
            if config.version > CURRENT_VERSION {
                warn!(
                    "Config version {} is newer than this build understands ({})",
                    config.version, CURRENT_VERSION
                );
            }
            Ok(config)
        } else {
            info!("No config found, creating default at {:?}", config_path);
            let config = Self::default_with_dir(data_dir.to_path_buf());
            config.save()?;
            Ok(config)
        }
    }

    /// Create default configuration with specific data directory
    pub fn default_with_dir(data_dir: PathBuf) -> Self {
        Self {
            version: CURRENT_VERSION,
            data_dir,
            author_tag: "app".to_string(),
            identity: whoami::username(),
            log_level: "info".to_string(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;

        let config_path = self.data_dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, json)?;
        Ok(())
    }

    /// Directory holding the two partition databases
    pub fn partitions_dir(&self) -> PathBuf {
        self.data_dir.join("partitions")
    }

    /// Path of the durable replay checkpoint file
    pub fn checkpoint_path(&self) -> PathBuf {
        self.data_dir.join("checkpoints.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(self.partitions_dir())?;
        Ok(())
    }
}
