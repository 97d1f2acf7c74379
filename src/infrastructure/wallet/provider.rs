//! Wallet provider abstraction and the alloy-backed implementation
//!
//! The wallet is addressed the way a browser dapp addresses an injected
//! EIP-1193 object: raw `request(method, params)` calls plus account /
//! chain change notifications. Any endpoint that speaks that surface over
//! HTTP JSON-RPC (a desktop wallet's RPC port, a dev node with unlocked
//! accounts) can back it.

use std::sync::Arc;
use std::time::Duration;

use alloy::network::Ethereum;
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::domain::network::Network;
use crate::infrastructure::wallet::types::{
    parse_accounts, parse_quantity, parse_receipt, parse_string, ProviderError, ReceiptStatus,
    WalletEvent,
};

/// Abstract wallet trait
///
/// Only `request`, `subscribe` and `endpoint_name` need implementing; the
/// typed helpers are layered on top of `request`.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Forward a raw JSON-RPC request
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Start delivering account / chain change events
    fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let value = self.request("eth_requestAccounts", json!([])).await?;
        parse_accounts("eth_requestAccounts", value)
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        let value = self.request("eth_chainId", json!([])).await?;
        parse_string("eth_chainId", value)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ProviderError> {
        let value = self
            .request("eth_getBalance", json!([address.to_string(), "latest"]))
            .await?;
        parse_quantity("eth_getBalance", value)
    }

    /// `eth_call` against `to`, returning the raw hex result
    async fn call(&self, to: Address, data: &str) -> Result<String, ProviderError> {
        let value = self
            .request("eth_call", json!([{ "to": to.to_string(), "data": data }, "latest"]))
            .await?;
        parse_string("eth_call", value)
    }

    /// Returns the transaction hash
    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: &str,
    ) -> Result<String, ProviderError> {
        let value = self
            .request(
                "eth_sendTransaction",
                json!([{ "from": from.to_string(), "to": to.to_string(), "data": data }]),
            )
            .await?;
        parse_string("eth_sendTransaction", value)
    }

    async fn transaction_receipt(&self, hash: &str) -> Result<Option<ReceiptStatus>, ProviderError> {
        let value = self
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?;
        Ok(parse_receipt(value))
    }

    async fn switch_chain(&self, chain_id: &str) -> Result<(), ProviderError> {
        self.request("wallet_switchEthereumChain", json!([{ "chainId": chain_id }]))
            .await?;
        Ok(())
    }

    async fn add_chain(&self, network: &Network) -> Result<(), ProviderError> {
        self.request("wallet_addEthereumChain", network.add_chain_params())
            .await?;
        Ok(())
    }
}

/// Wallet endpoint configuration
#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// HTTP JSON-RPC endpoint
    pub rpc: String,
    /// How often the watcher polls for account / chain changes
    pub event_poll: Duration,
}

type HttpFillProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Wallet reached over HTTP JSON-RPC
#[derive(Clone)]
pub struct RpcWallet {
    provider: Arc<HttpFillProvider>,
    endpoint: String,
    event_poll: Duration,
}

/// Create a wallet from configuration
pub fn create_wallet(config: &WalletConfig) -> Result<Arc<dyn WalletProvider>> {
    let rpc_url = config.rpc.parse().context("Invalid HTTP URL")?;
    let provider = ProviderBuilder::new().connect_http(rpc_url);
    Ok(Arc::new(RpcWallet {
        provider: Arc::new(provider),
        endpoint: config.rpc.clone(),
        event_poll: config.event_poll,
    }))
}

#[async_trait::async_trait]
impl WalletProvider for RpcWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        log::debug!("wallet request {method} {params}");
        let result: Result<Value, ProviderError> = self
            .provider
            .raw_request(method.to_string().into(), params)
            .await
            .map_err(ProviderError::from);
        if let Err(err) = &result {
            log::warn!("wallet request {method} failed: {err}");
        }
        result
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let wallet = self.clone();
        tokio::spawn(async move { watch_wallet(wallet, tx).await });
        rx
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}

/// HTTP has no push channel, so changes are detected by polling
/// `eth_accounts` / `eth_chainId` and emitted only when they differ.
async fn watch_wallet(wallet: RpcWallet, tx: mpsc::UnboundedSender<WalletEvent>) {
    let mut ticker = tokio::time::interval(wallet.event_poll);
    let mut last_accounts: Option<Vec<Address>> = None;
    let mut last_chain: Option<String> = None;

    loop {
        ticker.tick().await;
        if tx.is_closed() {
            log::debug!("wallet watcher stopped: no subscriber");
            return;
        }

        match wallet.request("eth_accounts", json!([])).await {
            Ok(value) => match parse_accounts("eth_accounts", value) {
                Ok(accounts) => {
                    if let Some(prev) = last_accounts.as_ref() {
                        if *prev != accounts
                            && tx.send(WalletEvent::AccountsChanged(accounts.clone())).is_err()
                        {
                            return;
                        }
                    }
                    last_accounts = Some(accounts);
                }
                Err(err) => log::debug!("wallet watcher: {err}"),
            },
            Err(err) => log::debug!("wallet watcher: eth_accounts failed: {err}"),
        }

        match wallet.chain_id().await {
            Ok(chain_id) => {
                let chain_id = chain_id.to_lowercase();
                if let Some(prev) = last_chain.as_ref() {
                    if *prev != chain_id
                        && tx.send(WalletEvent::ChainChanged(chain_id.clone())).is_err()
                    {
                        return;
                    }
                }
                last_chain = Some(chain_id);
            }
            Err(err) => log::debug!("wallet watcher: eth_chainId failed: {err}"),
        }
    }
}
