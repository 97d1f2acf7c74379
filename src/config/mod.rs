use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::controller::{ControllerConfig, ReceiptPolicy};
use crate::infrastructure::explorer::ExplorerConfig;
use crate::infrastructure::wallet::WalletConfig;

pub const DEFAULT_CONTRACT: &str = "0x56A831B5936072CF0290C1029EbdA1F9eFDfDc2e";
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;
pub const DEFAULT_NETWORK: &str = "Sepolia";
pub const DEFAULT_EXPLORER_API: &str = "https://api.etherscan.io/v2/api";
pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.etherscan.io";
pub const DEFAULT_WALLET_RPC: &str = "http://127.0.0.1:1248";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExplorerSection {
    pub api_url: String,
    pub api_key: String,
    /// Explorer used for links when the wallet's chain is unknown
    pub default_url: String,
}

impl Default for ExplorerSection {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_EXPLORER_API.to_string(),
            api_key: String::new(),
            default_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalletSection {
    pub rpc: String,
    pub event_poll_ms: u64,
    pub receipt_poll_ms: u64,
    /// Unset means wait for the receipt indefinitely
    pub receipt_timeout_secs: Option<u64>,
}

impl Default for WalletSection {
    fn default() -> Self {
        Self {
            rpc: DEFAULT_WALLET_RPC.to_string(),
            event_poll_ms: 1_000,
            receipt_poll_ms: 2_000,
            receipt_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub contract_address: String,
    pub default_chain_id: u64,
    pub default_network: String,
    pub explorer: ExplorerSection,
    pub wallet: WalletSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT.to_string(),
            default_chain_id: DEFAULT_CHAIN_ID,
            default_network: DEFAULT_NETWORK.to_string(),
            explorer: ExplorerSection::default(),
            wallet: WalletSection::default(),
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid config file")
    }

    pub fn contract(&self) -> Result<Address> {
        self.contract_address
            .trim()
            .parse()
            .with_context(|| format!("invalid contract address {}", self.contract_address))
    }

    pub fn controller_config(&self) -> Result<ControllerConfig> {
        Ok(ControllerConfig {
            contract: self.contract()?,
            default_chain_id: self.default_chain_id,
            default_network: self.default_network.clone(),
            default_explorer_url: self.explorer.default_url.clone(),
            receipt_policy: ReceiptPolicy {
                interval: Duration::from_millis(self.wallet.receipt_poll_ms.max(100)),
                timeout: self.wallet.receipt_timeout_secs.map(Duration::from_secs),
            },
        })
    }

    pub fn wallet_config(&self) -> WalletConfig {
        WalletConfig {
            rpc: normalize_http_endpoint(&self.wallet.rpc),
            event_poll: Duration::from_millis(self.wallet.event_poll_ms.max(100)),
        }
    }

    pub fn explorer_config(&self) -> ExplorerConfig {
        ExplorerConfig {
            api_url: self.explorer.api_url.clone(),
            api_key: self.explorer.api_key.clone(),
        }
    }
}

/// Missing file means defaults; a file that does not parse is an error
pub fn load() -> Result<Config> {
    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Ok(Config::default()),
    };
    Config::parse(&content).with_context(|| format!("reading {}", path.display()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("STOREKEEP_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("storekeep").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("storekeep").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "storekeep", "storekeep")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("storekeep"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("storekeep"));
    }
    directories::ProjectDirs::from("io", "storekeep", "storekeep")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("storekeep.log"))
}

pub fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
