//! Wallet infrastructure - EIP-1193 style provider over alloy HTTP

mod provider;
mod types;

pub use provider::{create_wallet, RpcWallet, WalletConfig, WalletProvider};
pub use types::{ProviderError, ReceiptStatus, WalletEvent, UNRECOGNIZED_CHAIN, USER_REJECTED};
