use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use alloy_primitives::Address;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::address::parse_address;
use crate::infrastructure::runtime::{BatchPolicy, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE};

pub const DEFAULT_NETWORK: &str = "polygon-mainnet";
pub const DEFAULT_ENS_RPC: &str = "https://eth.llamarpc.com";
pub const DEFAULT_COLLECTION_PAGE_SIZE: usize = 10;
pub const DEFAULT_LEADERBOARD_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagingConfig {
    #[serde(default = "default_collection_page_size")]
    pub collection_page_size: usize,
    #[serde(default = "default_leaderboard_page_size")]
    pub leaderboard_page_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            collection_page_size: default_collection_page_size(),
            leaderboard_page_size: default_leaderboard_page_size(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,
    pub network: Option<String>,
    pub contract: Option<String>,
    pub base_url: Option<String>,
    pub ens_rpc: Option<String>,

    #[serde(default)]
    pub resolution: ResolutionConfig,

    #[serde(default)]
    pub paging: PagingConfig,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no Alchemy API key (set api_key or ALCHEMY_API_KEY)")]
    MissingApiKey,
    #[error("no contract address (set contract or CONTRACT_ADDRESS)")]
    MissingContract,
    #[error("invalid contract address: {0}")]
    InvalidContract(String),
    #[error("{0} must be greater than zero")]
    ZeroPageSize(&'static str),
}

/// Validated runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub network: String,
    pub contract: Address,
    pub base_url: Option<String>,
    pub ens_rpc: String,
    pub batch: BatchPolicy,
    pub collection_page_size: usize,
    pub leaderboard_page_size: usize,
}

impl Config {
    /// Overlay the environment variables onto the file values
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overlay values from `lookup`; blank values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(value) = get("ALCHEMY_API_KEY") {
            self.api_key = Some(value);
        }
        if let Some(value) = get("NETWORK") {
            self.network = Some(value);
        }
        if let Some(value) = get("CONTRACT_ADDRESS") {
            self.contract = Some(value);
        }
        if let Some(value) = get("ENS_RPC_URL") {
            self.ens_rpc = Some(value);
        }
    }

    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let api_key = non_blank(&self.api_key).ok_or(ConfigError::MissingApiKey)?;
        let contract_text = non_blank(&self.contract).ok_or(ConfigError::MissingContract)?;
        let contract = parse_address(&contract_text)
            .ok_or_else(|| ConfigError::InvalidContract(contract_text.clone()))?;

        if self.paging.collection_page_size == 0 {
            return Err(ConfigError::ZeroPageSize("paging.collection_page_size"));
        }
        if self.paging.leaderboard_page_size == 0 {
            return Err(ConfigError::ZeroPageSize("paging.leaderboard_page_size"));
        }

        Ok(Settings {
            api_key,
            network: non_blank(&self.network).unwrap_or_else(|| DEFAULT_NETWORK.to_string()),
            contract,
            base_url: non_blank(&self.base_url),
            ens_rpc: non_blank(&self.ens_rpc).unwrap_or_else(|| DEFAULT_ENS_RPC.to_string()),
            batch: BatchPolicy::new(
                self.resolution.batch_size,
                Duration::from_millis(self.resolution.batch_delay_ms),
            ),
            collection_page_size: self.paging.collection_page_size,
            leaderboard_page_size: self.paging.leaderboard_page_size,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_batch_delay_ms() -> u64 {
    DEFAULT_BATCH_DELAY.as_millis() as u64
}

fn default_collection_page_size() -> usize {
    DEFAULT_COLLECTION_PAGE_SIZE
}

fn default_leaderboard_page_size() -> usize {
    DEFAULT_LEADERBOARD_PAGE_SIZE
}

/// Parse a config file body
pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(content)
}

/// Load the config file; a missing or unreadable file yields defaults
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match parse(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("MINTSCOPE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("mintscope").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("mintscope").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "mintscope", "mintscope")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("mintscope"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("mintscope"));
    }
    directories::ProjectDirs::from("io", "mintscope", "mintscope")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn session_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("session.sqlite3"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const CONTRACT: &str = "0xFB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    #[test]
    fn test_defaults() {
        let config = Config {
            api_key: Some("key".into()),
            contract: Some(CONTRACT.into()),
            ..Config::default()
        };
        let settings = config.validate().unwrap();
        assert_eq!(settings.network, DEFAULT_NETWORK);
        assert_eq!(settings.ens_rpc, DEFAULT_ENS_RPC);
        assert_eq!(settings.batch, BatchPolicy::default());
        assert_eq!(settings.collection_page_size, 10);
        assert_eq!(settings.leaderboard_page_size, 20);
        assert_eq!(settings.base_url, None);
    }

    #[test]
    fn test_parse_file() {
        let config = parse(
            r#"
            api_key = "abc"
            contract = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359"
            network = "polygon-amoy"

            [resolution]
            batch_size = 3

            [paging]
            leaderboard_page_size = 50
            "#,
        )
        .unwrap();
        let settings = config.validate().unwrap();
        assert_eq!(settings.network, "polygon-amoy");
        assert_eq!(settings.batch.batch_size, 3);
        assert_eq!(settings.batch.delay, Duration::from_millis(1000));
        assert_eq!(settings.collection_page_size, 10);
        assert_eq!(settings.leaderboard_page_size, 50);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ALCHEMY_API_KEY", "from-env"),
            ("CONTRACT_ADDRESS", CONTRACT),
            ("NETWORK", "  "),
        ]);
        let mut config = Config {
            api_key: Some("from-file".into()),
            network: Some("eth-mainnet".into()),
            ..Config::default()
        };
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        let settings = config.validate().unwrap();
        assert_eq!(settings.api_key, "from-env");
        assert_eq!(settings.network, "eth-mainnet");
        assert_eq!(settings.contract, parse_address(CONTRACT).unwrap());
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(Config::default().validate().unwrap_err(), ConfigError::MissingApiKey);

        let mut config = Config {
            api_key: Some("k".into()),
            ..Config::default()
        };
        assert_eq!(config.validate().unwrap_err(), ConfigError::MissingContract);

        config.contract = Some("0x1234".into());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidContract(_))));

        config.contract = Some(CONTRACT.into());
        config.paging.collection_page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroPageSize(_))));
    }
}
