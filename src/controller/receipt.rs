//! Receipt polling with an optional timeout and a cancellation hook

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::domain::error::AppError;
use crate::infrastructure::wallet::{ReceiptStatus, WalletProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptPolicy {
    pub interval: Duration,
    /// `None` polls until the chain reports an outcome
    pub timeout: Option<Duration>,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: None,
        }
    }
}

/// Cancels the paired [`CancelToken`]
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

#[derive(Debug)]
pub struct CancelToken(watch::Receiver<bool>);

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(Arc::new(tx)), CancelToken(rx))
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

impl CancelToken {
    async fn cancelled(mut self) {
        loop {
            if *self.0.borrow() {
                return;
            }
            if self.0.changed().await.is_err() {
                // Handle dropped without cancelling
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Poll `eth_getTransactionReceipt` until the transaction resolves
pub async fn wait_for_receipt(
    wallet: &dyn WalletProvider,
    hash: &str,
    policy: &ReceiptPolicy,
    cancel: Option<CancelToken>,
) -> Result<(), AppError> {
    let bounded = async {
        match policy.timeout {
            Some(limit) => tokio::time::timeout(limit, poll_receipt(wallet, hash, policy.interval))
                .await
                .unwrap_or_else(|_| Err(AppError::ReceiptTimeout(hash.to_string()))),
            None => poll_receipt(wallet, hash, policy.interval).await,
        }
    };
    let cancelled = async {
        match cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        outcome = bounded => outcome,
        _ = cancelled => {
            log::info!("stopped waiting for {hash}");
            Err(AppError::Cancelled)
        }
    }
}

async fn poll_receipt(
    wallet: &dyn WalletProvider,
    hash: &str,
    interval: Duration,
) -> Result<(), AppError> {
    loop {
        match wallet.transaction_receipt(hash).await? {
            Some(ReceiptStatus::Success) => {
                log::info!("transaction {hash} confirmed");
                return Ok(());
            }
            Some(ReceiptStatus::Failed) => {
                log::warn!("transaction {hash} reverted");
                return Err(AppError::TransactionFailed(hash.to_string()));
            }
            None => tokio::time::sleep(interval).await,
        }
    }
}
