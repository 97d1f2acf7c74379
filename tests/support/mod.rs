//! Scripted wallet and explorer doubles shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::Address;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use storekeep::controller::{Controller, ControllerConfig, ReceiptPolicy};
use storekeep::domain::history::TxRecord;
use storekeep::infrastructure::explorer::{Envelope, ExplorerApi, ExplorerError, ExplorerResult};
use storekeep::infrastructure::wallet::{ProviderError, WalletEvent, WalletProvider};

pub const CONTRACT: &str = "0x56A831B5936072CF0290C1029EbdA1F9eFDfDc2e";
pub const ALICE: &str = "0x1111111111111111111111111111111111111111";
pub const BOB: &str = "0x2222222222222222222222222222222222222222";
pub const TX_HASH: &str = "0xabababababababababababababababababababababababababababababababab";

pub fn addr(value: &str) -> Address {
    value.parse().unwrap()
}

/// Wallet that answers from per-method scripts and records every request
#[derive(Default)]
pub struct FakeWallet {
    queued: Mutex<HashMap<String, VecDeque<Result<Value, ProviderError>>>>,
    fixed: Mutex<HashMap<String, Result<Value, ProviderError>>>,
    calls: Mutex<Vec<(String, Value)>>,
    events: Mutex<Option<mpsc::UnboundedSender<WalletEvent>>>,
    subscriptions: Mutex<usize>,
}

impl FakeWallet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Wallet with one account on Sepolia holding 1.5 ETH, contract value 7
    pub fn sepolia(account: &str) -> Arc<Self> {
        let wallet = Self::new();
        wallet.respond("eth_requestAccounts", Ok(json!([account])));
        wallet.respond("eth_accounts", Ok(json!([account])));
        wallet.respond("eth_chainId", Ok(json!("0xaa36a7")));
        wallet.respond("eth_getBalance", Ok(json!("0x14d1120d7b160000")));
        wallet.respond("eth_call", Ok(json!(word(7))));
        wallet
    }

    /// Answer every call to `method` with `result`
    pub fn respond(&self, method: &str, result: Result<Value, ProviderError>) {
        self.fixed.lock().unwrap().insert(method.to_string(), result);
    }

    /// Answer the next call to `method` with `result`, ahead of `respond`
    pub fn respond_once(&self, method: &str, result: Result<Value, ProviderError>) {
        self.queued
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
    }

    pub fn subscriptions(&self) -> usize {
        *self.subscriptions.lock().unwrap()
    }

    pub fn emit(&self, event: WalletEvent) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }
}

#[async_trait::async_trait]
impl WalletProvider for FakeWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        if let Some(result) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return result;
        }
        self.fixed
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or_else(|| {
                Err(ProviderError::Rpc {
                    code: -32601,
                    message: format!("method {method} not scripted"),
                })
            })
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.events.lock().unwrap() = Some(tx);
        *self.subscriptions.lock().unwrap() += 1;
        rx
    }

    fn endpoint_name(&self) -> String {
        "fake".to_string()
    }
}

/// Explorer returning a fixed envelope (or HTTP failure)
pub struct FakeExplorer {
    envelope: Mutex<Option<Envelope>>,
    requests: Mutex<Vec<(u64, Address)>>,
}

impl FakeExplorer {
    pub fn with(envelope: Envelope) -> Arc<Self> {
        Arc::new(Self {
            envelope: Mutex::new(Some(envelope)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn transactions(txs: Vec<TxRecord>) -> Arc<Self> {
        Self::with(Envelope {
            status: "1".into(),
            message: "OK".into(),
            result: ExplorerResult::Transactions(txs),
        })
    }

    /// Every request fails with HTTP 500
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            envelope: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set(&self, envelope: Envelope) {
        *self.envelope.lock().unwrap() = Some(envelope);
    }

    pub fn requests(&self) -> Vec<(u64, Address)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ExplorerApi for FakeExplorer {
    async fn transactions(
        &self,
        chain_id: u64,
        address: Address,
    ) -> Result<Envelope, ExplorerError> {
        self.requests.lock().unwrap().push((chain_id, address));
        self.envelope
            .lock()
            .unwrap()
            .clone()
            .ok_or(ExplorerError::Status(500))
    }
}

pub fn config() -> ControllerConfig {
    ControllerConfig {
        contract: addr(CONTRACT),
        default_chain_id: 11_155_111,
        default_network: "Sepolia".into(),
        default_explorer_url: "https://sepolia.etherscan.io".into(),
        receipt_policy: ReceiptPolicy {
            interval: Duration::from_millis(5),
            timeout: None,
        },
    }
}

pub fn controller(wallet: Arc<FakeWallet>, explorer: Arc<FakeExplorer>) -> Controller {
    Controller::new(wallet, explorer, config())
}

/// ABI word for `value`, 0x-prefixed
pub fn word(value: u64) -> String {
    format!("0x{value:064x}")
}

pub fn store_tx(hash: &str, from: &str, value: u64, failed: bool, time_stamp: u64) -> TxRecord {
    TxRecord {
        hash: hash.to_string(),
        from: from.to_string(),
        to: CONTRACT.to_lowercase(),
        input: format!("0x6057361d{value:064x}"),
        is_error: if failed { "1" } else { "0" }.to_string(),
        time_stamp: time_stamp.to_string(),
    }
}

pub fn other_tx(hash: &str, from: &str) -> TxRecord {
    TxRecord {
        hash: hash.to_string(),
        from: from.to_string(),
        to: CONTRACT.to_lowercase(),
        input: "0x2e64cec1".to_string(),
        is_error: "0".to_string(),
        time_stamp: "1700000000".to_string(),
    }
}

pub fn rejected() -> ProviderError {
    ProviderError::Rpc {
        code: 4001,
        message: "User rejected the request.".into(),
    }
}
