// Configuration file (fundme.toml)

use crate::oracle::{DEFAULT_DECIMALS, DEFAULT_INITIAL_ANSWER};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Chain id of the local development network
pub const DEVELOPMENT_CHAIN_ID: u64 = 31337;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "fundme.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where ledger, feed and keystore live
    pub data_dir: PathBuf,
    /// Minimum contribution in whole reference units
    pub minimum_usd: u64,
    pub oracle: OracleConfig,
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Precision of the mock feed
    pub decimals: u8,
    /// First answer of the mock feed, scaled by 10^decimals
    pub initial_answer: i64,
    /// Time budget for one feed read
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            minimum_usd: 50,
            oracle: OracleConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
            initial_answer: DEFAULT_INITIAL_ANSWER as i64,
            timeout_ms: 5_000,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "hardhat".to_string(),
            chain_id: DEVELOPMENT_CHAIN_ID,
        }
    }
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl NetworkConfig {
    /// Development networks get a mock price feed deployed with the ledger
    pub fn is_development(&self) -> bool {
        self.chain_id == DEVELOPMENT_CHAIN_ID
    }
}

impl Config {
    /// Parse a config from TOML text
    pub fn from_toml(text: &str) -> Result<Self, String> {
        let config: Config = toml::from_str(text)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or the default file if present, or built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                return Err(format!("Config file not found: {}", path.display()));
            }
            log::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        log::info!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_toml(&text)
    }

    fn validate(&self) -> Result<(), String> {
        if self.oracle.initial_answer <= 0 {
            return Err(format!("oracle.initial_answer must be positive, got {}", self.oracle.initial_answer));
        }
        if self.oracle.decimals > 38 {
            return Err(format!("oracle.decimals too large: {}", self.oracle.decimals));
        }
        if self.oracle.timeout_ms == 0 {
            return Err("oracle.timeout_ms must be non-zero".to_string());
        }
        Ok(())
    }
}
