//! Block explorer client (Etherscan v2 compatible `txlist`)

use std::time::Duration;

use alloy_primitives::Address;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::history::TxRecord;

/// Message the explorer uses for an address with no history
const NO_TRANSACTIONS: &str = "No transactions found";

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// `{status, message, result}` envelope returned by every explorer call
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: ExplorerResult,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExplorerResult {
    Transactions(Vec<TxRecord>),
    Message(String),
    Other(serde_json::Value),
}

impl Default for ExplorerResult {
    fn default() -> Self {
        ExplorerResult::Other(serde_json::Value::Null)
    }
}

/// What a `txlist` envelope means for the history view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxListOutcome {
    Transactions(Vec<TxRecord>),
    /// The explorer knows the address but it has no transactions
    NoTransactions,
    /// Rate limit, bad key, ...; carries the explorer's own message
    ApiError(String),
    /// Success envelope with nothing usable in it
    Empty,
}

impl Envelope {
    pub fn into_outcome(self) -> TxListOutcome {
        if self.message == "NOTOK" || self.status == "0" {
            let result_text = match &self.result {
                ExplorerResult::Message(text) => Some(text.clone()),
                _ => None,
            };
            if self.message == NO_TRANSACTIONS || result_text.as_deref() == Some(NO_TRANSACTIONS) {
                return TxListOutcome::NoTransactions;
            }
            return TxListOutcome::ApiError(
                result_text
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| "API Error".to_string()),
            );
        }

        match self.result {
            ExplorerResult::Transactions(txs) if self.status == "1" && !txs.is_empty() => {
                TxListOutcome::Transactions(txs)
            }
            _ => TxListOutcome::Empty,
        }
    }
}

#[async_trait::async_trait]
pub trait ExplorerApi: Send + Sync + 'static {
    /// Transaction list for `address` on `chain_id`, newest first
    async fn transactions(&self, chain_id: u64, address: Address)
        -> Result<Envelope, ExplorerError>;
}

#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub api_url: String,
    pub api_key: String,
}

pub struct EtherscanClient {
    http: reqwest::Client,
    config: ExplorerConfig,
}

impl EtherscanClient {
    pub fn new(config: ExplorerConfig) -> Result<Self, ExplorerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http, config })
    }
}

#[async_trait::async_trait]
impl ExplorerApi for EtherscanClient {
    async fn transactions(
        &self,
        chain_id: u64,
        address: Address,
    ) -> Result<Envelope, ExplorerError> {
        log::info!(
            "fetching history for {address} on chain {chain_id} from {}",
            self.config.api_url
        );
        let chain_id = chain_id.to_string();
        let address = address.to_string();
        let response = self
            .http
            .get(&self.config.api_url)
            .query(&[
                ("chainid", chain_id.as_str()),
                ("module", "account"),
                ("action", "txlist"),
                ("address", address.as_str()),
                ("startblock", "0"),
                ("endblock", "99999999"),
                ("page", "1"),
                ("offset", "100"),
                ("sort", "desc"),
                ("apikey", self.config.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ExplorerError::Status(response.status().as_u16()));
        }

        let envelope: Envelope = response.json().await?;
        log::debug!(
            "explorer answered status={} message={}",
            envelope.status,
            envelope.message
        );
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> TxListOutcome {
        serde_json::from_str::<Envelope>(json).unwrap().into_outcome()
    }

    #[test]
    fn test_no_transactions_envelope() {
        assert_eq!(
            parse(r#"{"status":"0","message":"No transactions found","result":[]}"#),
            TxListOutcome::NoTransactions
        );
        assert_eq!(
            parse(r#"{"status":"0","message":"NOTOK","result":"No transactions found"}"#),
            TxListOutcome::NoTransactions
        );
        assert_eq!(
            parse(r#"{"status":"0","message":"No transactions found"}"#),
            TxListOutcome::NoTransactions
        );
    }

    #[test]
    fn test_api_error_keeps_raw_message() {
        assert_eq!(
            parse(r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#),
            TxListOutcome::ApiError("Max rate limit reached".into())
        );
        assert_eq!(
            parse(r#"{"status":"0","message":"NOTOK","result":null}"#),
            TxListOutcome::ApiError("API Error".into())
        );
    }

    #[test]
    fn test_transaction_list() {
        let outcome = parse(
            r#"{"status":"1","message":"OK","result":[
                {"hash":"0x01","from":"0xaa","to":"0xbb","input":"0x6057361d","isError":"0","timeStamp":"1"}
            ]}"#,
        );
        match outcome {
            TxListOutcome::Transactions(txs) => assert_eq!(txs[0].hash, "0x01"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_success_without_rows_is_empty() {
        assert_eq!(
            parse(r#"{"status":"1","message":"OK","result":[]}"#),
            TxListOutcome::Empty
        );
        assert_eq!(
            parse(r#"{"status":"1","message":"OK","result":"weird"}"#),
            TxListOutcome::Empty
        );
    }
}
