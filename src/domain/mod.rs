//! Domain layer - chain registry, contract calldata, history engine
//!
//! Nothing in here performs I/O; the controller feeds it data fetched
//! through the infrastructure layer.

pub mod contract;
pub mod error;
pub mod format;
pub mod history;
pub mod network;

pub use error::AppError;
pub use history::{HistoryFilter, HistoryPage, HistoryState, PageItem, TxRecord, TxRow};
pub use network::{ActiveChain, Network};
