//! Server configuration loaded from TOML.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Env var naming the config file
pub const CONFIG_ENV_VAR: &str = "SHOP_SERVER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "shop-server.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub max_connections: u32,
    /// Holds `items/` and `presets/` seed files
    pub data_dir: PathBuf,
    pub preset_guard_timeout_secs: u64,
    pub guard_sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 2567)),
            database_url: "sqlite:shops.db?mode=rwc".to_string(),
            max_connections: 5,
            data_dir: PathBuf::from("data"),
            preset_guard_timeout_secs: 60,
            guard_sweep_interval_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Load from `$SHOP_SERVER_CONFIG`, falling back to `shop-server.toml`
    pub fn load() -> Result<Self, String> {
        let path = std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from_file(&path)
    }

    /// Parse a config file; a missing file gives the defaults
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
        let config: ServerConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse {:?}: {}", path, e))?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn preset_guard_timeout(&self) -> Duration {
        Duration::from_secs(self.preset_guard_timeout_secs)
    }

    pub fn guard_sweep_interval(&self) -> Duration {
        // tokio intervals panic on a zero period
        Duration::from_secs(self.guard_sweep_interval_secs.max(1))
    }
}
