//! Error taxonomy shared by the controller and the UI

use thiserror::Error;

use crate::infrastructure::explorer::ExplorerError;
use crate::infrastructure::wallet::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    /// The wallet reported that the user declined a prompt
    #[error("request rejected by user")]
    UserRejected,

    #[error("wallet returned no accounts")]
    NoAccount,

    #[error("no wallet connected")]
    NotConnected,

    /// Bad user input, caught before any network call
    #[error("{0}")]
    Validation(String),

    #[error("wallet request failed: {0}")]
    Provider(ProviderError),

    /// Receipt came back with a failure status
    #[error("transaction {0} failed")]
    TransactionFailed(String),

    #[error("timed out waiting for receipt of {0}")]
    ReceiptTimeout(String),

    #[error("receipt wait cancelled")]
    Cancelled,

    /// Explorer answered with a non-success envelope
    #[error("explorer API error: {0}")]
    Api(String),

    #[error("explorer request failed: {0}")]
    Explorer(#[from] ExplorerError),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        if err.is_user_rejection() {
            AppError::UserRejected
        } else {
            AppError::Provider(err)
        }
    }
}

impl AppError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, AppError::UserRejected)
    }
}
