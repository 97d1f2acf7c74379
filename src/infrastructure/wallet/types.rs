//! Wire-level types for the wallet JSON-RPC surface

use alloy::transports::{RpcError, TransportError};
use alloy_primitives::{Address, U256};
use serde_json::Value;
use thiserror::Error;

/// EIP-1193: the user rejected the request
pub const USER_REJECTED: i64 = 4001;
/// EIP-3326: the requested chain has not been added to the wallet
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response to {method}: {detail}")]
    Decode { method: String, detail: String },
}

impl ProviderError {
    pub fn code(&self) -> Option<i64> {
        match self {
            ProviderError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code() == Some(USER_REJECTED)
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code() == Some(UNRECOGNIZED_CHAIN)
    }

    pub fn decode(method: &str, detail: impl Into<String>) -> Self {
        ProviderError::Decode {
            method: method.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<TransportError> for ProviderError {
    fn from(err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => ProviderError::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
            },
            other => ProviderError::Transport(other.to_string()),
        }
    }
}

/// Account / chain notifications pushed by the wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Failed,
}

pub(crate) fn parse_accounts(method: &str, value: Value) -> Result<Vec<Address>, ProviderError> {
    let raw: Vec<String> =
        serde_json::from_value(value).map_err(|err| ProviderError::decode(method, err.to_string()))?;
    raw.iter()
        .map(|account| {
            account
                .trim()
                .parse::<Address>()
                .map_err(|err| ProviderError::decode(method, format!("{account}: {err}")))
        })
        .collect()
}

pub(crate) fn parse_string(method: &str, value: Value) -> Result<String, ProviderError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(ProviderError::decode(method, format!("expected string, got {other}"))),
    }
}

/// Hex quantity (`0x…`) to U256
pub(crate) fn parse_quantity(method: &str, value: Value) -> Result<U256, ProviderError> {
    let raw = parse_string(method, value)?;
    let payload = raw.strip_prefix("0x").unwrap_or(&raw);
    if payload.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(payload, 16)
        .map_err(|err| ProviderError::decode(method, format!("{raw}: {err}")))
}

/// `null` while pending; otherwise the `status` field decides
pub(crate) fn parse_receipt(value: Value) -> Option<ReceiptStatus> {
    if value.is_null() {
        return None;
    }
    let status = value.get("status").and_then(Value::as_str).unwrap_or_default();
    if status.eq_ignore_ascii_case("0x1") {
        Some(ReceiptStatus::Success)
    } else {
        Some(ReceiptStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_codes() {
        let rejected = ProviderError::Rpc {
            code: USER_REJECTED,
            message: "User rejected the request.".into(),
        };
        assert!(rejected.is_user_rejection());
        assert!(!rejected.is_unrecognized_chain());
        assert!(!ProviderError::Transport("down".into()).is_user_rejection());
    }

    #[test]
    fn test_parse_accounts() {
        let accounts = parse_accounts(
            "eth_accounts",
            json!(["0x56a831b5936072cf0290c1029ebda1f9efdfdc2e"]),
        )
        .unwrap();
        assert_eq!(accounts.len(), 1);
        assert!(parse_accounts("eth_accounts", json!(["nope"])).is_err());
        assert!(parse_accounts("eth_accounts", json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(
            parse_quantity("eth_getBalance", json!("0xde0b6b3a7640000")).unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(parse_quantity("eth_getBalance", json!("0x")).unwrap(), U256::ZERO);
        assert!(parse_quantity("eth_getBalance", json!(12)).is_err());
    }

    #[test]
    fn test_parse_receipt() {
        assert_eq!(parse_receipt(Value::Null), None);
        assert_eq!(
            parse_receipt(json!({"status": "0x1"})),
            Some(ReceiptStatus::Success)
        );
        assert_eq!(
            parse_receipt(json!({"status": "0x0"})),
            Some(ReceiptStatus::Failed)
        );
    }
}
