//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Wallet access over alloy's HTTP JSON-RPC transport
//! - The Etherscan-style explorer client for transaction history
//! - Tokio runtime bridge for async operations

pub mod explorer;
pub mod runtime;
pub mod wallet;
