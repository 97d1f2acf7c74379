//! Static registry of supported chains

use serde_json::{json, Value};

/// Native currency descriptor as wallets expect it in `wallet_addEthereumChain`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// A chain the app knows how to talk about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    /// Short identifier used by commands (e.g. "sepolia")
    pub key: &'static str,
    /// Hex chain id as returned by `eth_chainId`
    pub chain_id: &'static str,
    pub chain_id_decimal: u64,
    pub chain_name: &'static str,
    pub native_currency: NativeCurrency,
    pub rpc_urls: &'static [&'static str],
    pub block_explorer_urls: &'static [&'static str],
}

impl Network {
    /// First explorer URL, used for transaction links
    pub fn explorer_url(&self) -> &'static str {
        self.block_explorer_urls.first().copied().unwrap_or_default()
    }

    /// Chain definition in the shape `wallet_addEthereumChain` takes
    pub fn add_chain_params(&self) -> Value {
        json!([{
            "chainId": self.chain_id,
            "chainName": self.chain_name,
            "nativeCurrency": {
                "name": self.native_currency.name,
                "symbol": self.native_currency.symbol,
                "decimals": self.native_currency.decimals,
            },
            "rpcUrls": self.rpc_urls,
            "blockExplorerUrls": self.block_explorer_urls,
        }])
    }
}

pub static NETWORKS: &[Network] = &[
    Network {
        key: "ethereum",
        chain_id: "0x1",
        chain_id_decimal: 1,
        chain_name: "Ethereum Mainnet",
        native_currency: NativeCurrency {
            name: "Ether",
            symbol: "ETH",
            decimals: 18,
        },
        rpc_urls: &["https://mainnet.infura.io/v3/"],
        block_explorer_urls: &["https://etherscan.io"],
    },
    Network {
        key: "sepolia",
        chain_id: "0xaa36a7",
        chain_id_decimal: 11_155_111,
        chain_name: "Sepolia Testnet",
        native_currency: NativeCurrency {
            name: "SepoliaETH",
            symbol: "ETH",
            decimals: 18,
        },
        rpc_urls: &["https://sepolia.infura.io/v3/"],
        block_explorer_urls: &["https://sepolia.etherscan.io"],
    },
];

/// Find a network by its hex chain id (case-insensitive)
pub fn lookup(chain_id: &str) -> Option<&'static Network> {
    let chain_id = chain_id.trim();
    NETWORKS
        .iter()
        .find(|network| network.chain_id.eq_ignore_ascii_case(chain_id))
}

/// Find a network by its short key
pub fn by_key(key: &str) -> Option<&'static Network> {
    let key = key.trim();
    NETWORKS
        .iter()
        .find(|network| network.key.eq_ignore_ascii_case(key))
}

/// Networks offered in the picker, in registry order
pub fn available_networks() -> &'static [Network] {
    NETWORKS
}

/// The chain the wallet currently reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveChain {
    Known(&'static Network),
    /// Chain id not present in the registry, kept verbatim for display
    Unknown(String),
}

impl ActiveChain {
    pub fn from_chain_id(chain_id: &str) -> Self {
        match lookup(chain_id) {
            Some(network) => ActiveChain::Known(network),
            None => ActiveChain::Unknown(chain_id.trim().to_string()),
        }
    }

    pub fn network(&self) -> Option<&'static Network> {
        match self {
            ActiveChain::Known(network) => Some(network),
            ActiveChain::Unknown(_) => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            ActiveChain::Known(network) => network.chain_name.to_string(),
            ActiveChain::Unknown(chain_id) => format!("Unknown ({chain_id})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_every_registry_entry() {
        for network in NETWORKS {
            assert_eq!(lookup(network.chain_id), Some(network));
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("0xAA36A7").map(|n| n.key), Some("sepolia"));
    }

    #[test]
    fn test_lookup_unknown_chain() {
        assert!(lookup("0x89").is_none());
        assert!(lookup("").is_none());
        assert_eq!(
            ActiveChain::from_chain_id("0x89").label(),
            "Unknown (0x89)"
        );
    }

    #[test]
    fn test_by_key() {
        assert_eq!(by_key("ethereum").map(|n| n.chain_id_decimal), Some(1));
        assert!(by_key("polygon").is_none());
    }

    #[test]
    fn test_add_chain_params_shape() {
        let params = by_key("sepolia").unwrap().add_chain_params();
        assert_eq!(params[0]["chainId"], "0xaa36a7");
        assert_eq!(params[0]["nativeCurrency"]["decimals"], 18);
        assert_eq!(params[0]["blockExplorerUrls"][0], "https://sepolia.etherscan.io");
    }
}
