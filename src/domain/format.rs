//! Display formatting helpers

use alloy_primitives::U256;

const BALANCE_DIGITS: u32 = 4;

/// Relative time between two unix timestamps (seconds)
pub fn time_ago(now: u64, then: u64) -> String {
    let seconds = now.saturating_sub(then);
    if seconds < 60 {
        "Just now".to_string()
    } else if seconds < 3_600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3_600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}

/// `0x1234...abcd` style truncation
pub fn short_address(address: &str) -> String {
    let address = address.trim();
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// Smallest-unit amount rendered in the major unit with 4 fractional digits
pub fn format_balance(amount: U256, decimals: u8, symbol: &str) -> String {
    let unit = U256::from(10u64).pow(U256::from(decimals));
    let scale = U256::from(10u64.pow(BALANCE_DIGITS));
    // Round half up at the fourth digit
    let scaled = (amount.saturating_mul(scale).saturating_add(unit / U256::from(2u64))) / unit;
    let whole = scaled / scale;
    let frac = scaled % scale;
    format!(
        "{whole}.{frac:0>width$} {symbol}",
        frac = frac.to_string(),
        width = BALANCE_DIGITS as usize
    )
}
