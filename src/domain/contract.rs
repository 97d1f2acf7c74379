//! Calldata for the storage contract: `store(uint256)` and `retrieve()`

use alloy_primitives::U256;
use alloy_sol_types::{sol, SolCall};

use crate::domain::error::AppError;

sol! {
    function store(uint256 num) external;
    function retrieve() external view returns (uint256);
}

pub const STORE_SELECTOR: &str = "0x6057361d";
pub const RETRIEVE_SELECTOR: &str = "0x2e64cec1";

/// `0x`-prefixed calldata for `retrieve()`
pub fn retrieve_calldata() -> String {
    format!("0x{}", hex::encode(retrieveCall {}.abi_encode()))
}

/// `0x`-prefixed calldata for `store(value)`: selector followed by one 32-byte word
pub fn store_calldata(value: U256) -> String {
    format!("0x{}", hex::encode(storeCall { num: value }.abi_encode()))
}

/// Validate the raw text from the input box as a uint256
pub fn parse_store_input(input: &str) -> Result<U256, AppError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AppError::Validation("Enter a number".into()));
    }
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Validation("Invalid number".into()));
    }
    U256::from_str_radix(input, 10).map_err(|_| AppError::Validation("Invalid number".into()))
}

/// Decode a big-endian hex word (`0x…`) as an unsigned integer
pub fn decode_word(data: &str) -> Option<U256> {
    let data = data.trim();
    let payload = data
        .strip_prefix("0x")
        .or_else(|| data.strip_prefix("0X"))
        .unwrap_or(data);
    if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    U256::from_str_radix(payload, 16).ok()
}

/// Whether transaction input targets `store(uint256)`
pub fn is_store_call(input: &str) -> bool {
    input
        .get(..STORE_SELECTOR.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(STORE_SELECTOR))
}

/// Best-effort decode of the stored value from `store` calldata
pub fn decode_store_input(input: &str) -> Option<U256> {
    if !is_store_call(input) {
        return None;
    }
    decode_word(&input[STORE_SELECTOR.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors_match_signatures() {
        assert_eq!(format!("0x{}", hex::encode(storeCall::SELECTOR)), STORE_SELECTOR);
        assert_eq!(
            format!("0x{}", hex::encode(retrieveCall::SELECTOR)),
            RETRIEVE_SELECTOR
        );
        assert_eq!(retrieve_calldata(), RETRIEVE_SELECTOR);
    }

    #[test]
    fn test_store_calldata_layout() {
        let data = store_calldata(U256::from(42u64));
        assert_eq!(data.len(), 2 + 8 + 64);
        assert!(data.starts_with(STORE_SELECTOR));
        assert!(data.ends_with("2a"));
    }

    #[test]
    fn test_encode_then_decode_boundaries() {
        let values = [
            U256::ZERO,
            U256::from(1u64),
            U256::from(1u64 << 32),
            U256::from(u64::MAX),
        ];
        for value in values {
            assert_eq!(decode_store_input(&store_calldata(value)), Some(value));
        }
    }

    #[test]
    fn test_parse_store_input_rejects_bad_input() {
        for bad in ["", "   ", "abc", "-5", "1.5", "12abc"] {
            assert!(
                matches!(parse_store_input(bad), Err(AppError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
        let too_big = format!("{}0", U256::MAX);
        assert!(parse_store_input(&too_big).is_err());
    }

    #[test]
    fn test_parse_store_input_accepts_non_negative() {
        assert_eq!(parse_store_input("0").unwrap(), U256::ZERO);
        assert_eq!(parse_store_input(" 42 ").unwrap(), U256::from(42u64));
    }

    #[test]
    fn test_decode_store_input_best_effort() {
        let input = format!("0x6057361d{}7", "0".repeat(63));
        assert_eq!(decode_store_input(&input), Some(U256::from(7u64)));
        assert_eq!(decode_store_input("0x6057361D"), None);
        assert_eq!(decode_store_input("0x6057361dzz"), None);
        assert_eq!(decode_store_input("0x2e64cec1"), None);
    }

    #[test]
    fn test_decode_word() {
        assert_eq!(decode_word("0x2a"), Some(U256::from(42u64)));
        assert_eq!(decode_word("0x"), None);
        assert_eq!(decode_word(&format!("0x{}", "0".repeat(64))), Some(U256::ZERO));
    }
}
