//! Contract client: `retrieve()` reads and the `store(uint256)` flow

use super::display::{StatusLevel, ERROR_SENTINEL, PENDING_SENTINEL};
use super::receipt::wait_for_receipt;
use super::Controller;
use crate::domain::contract::{decode_word, parse_store_input, retrieve_calldata, store_calldata};
use crate::domain::error::AppError;
use crate::infrastructure::wallet::ProviderError;

impl Controller {
    pub async fn retrieve(&mut self) -> Result<(), AppError> {
        self.display.stored_value = PENDING_SENTINEL.to_string();

        let result = self
            .wallet
            .call(self.config.contract, &retrieve_calldata())
            .await
            .map_err(AppError::from)
            .and_then(|raw| {
                decode_word(&raw).ok_or_else(|| {
                    AppError::Provider(ProviderError::decode(
                        "eth_call",
                        format!("not a uint256 word: {raw}"),
                    ))
                })
            });

        match result {
            Ok(value) => {
                self.display.stored_value = value.to_string();
                Ok(())
            }
            Err(err) => {
                log::warn!("retrieve failed: {err}");
                self.display.stored_value = ERROR_SENTINEL.to_string();
                Err(err)
            }
        }
    }

    /// Full store flow: validate, submit, wait for the receipt, refresh
    pub async fn store(&mut self, input: &str) -> Result<(), AppError> {
        let hash = self.submit_store(input).await?;
        let outcome = wait_for_receipt(
            self.wallet.as_ref(),
            &hash,
            &self.config.receipt_policy,
            None,
        )
        .await;
        self.finish_store(outcome).await
    }

    /// Validate and send the transaction; returns its hash
    ///
    /// The store control stays disabled until [`Controller::finish_store`].
    pub async fn submit_store(&mut self, input: &str) -> Result<String, AppError> {
        let value = match parse_store_input(input) {
            Ok(value) => value,
            Err(err) => {
                self.display.set_status(err.to_string(), StatusLevel::Error);
                return Err(err);
            }
        };
        let Some(from) = self.session.account().copied() else {
            self.display
                .set_status("Connect a wallet first", StatusLevel::Error);
            return Err(AppError::NotConnected);
        };

        self.display.store_pending = true;
        self.display
            .set_status("Confirm in wallet...", StatusLevel::Info);

        let data = store_calldata(value);
        match self
            .wallet
            .send_transaction(from, self.config.contract, &data)
            .await
        {
            Ok(hash) => {
                log::info!("store({value}) submitted as {hash}");
                self.display
                    .set_status("Waiting for confirmation...", StatusLevel::Info);
                self.display.pending_tx = Some(hash.clone());
                Ok(hash)
            }
            Err(err) => Err(self.store_failed(err.into())),
        }
    }

    /// Apply the receipt outcome of a submitted store
    pub async fn finish_store(&mut self, outcome: Result<(), AppError>) -> Result<(), AppError> {
        self.display.pending_tx = None;
        if let Err(err) = outcome {
            return Err(self.store_failed(err));
        }

        self.display
            .set_status("Stored successfully!", StatusLevel::Success);
        self.display.clear_input_seq += 1;

        // Disconnected while the receipt was pending: nothing to refresh
        if self.session.connected {
            if let Err(err) = self.retrieve().await {
                log::warn!("retrieve after store failed: {err}");
            }
            if let Err(err) = self.refresh_balance().await {
                log::warn!("balance refresh after store failed: {err}");
            }
            if let Err(err) = self.load_history().await {
                log::warn!("history reload after store failed: {err}");
            }
        }
        self.display.store_pending = false;
        Ok(())
    }

    fn store_failed(&mut self, err: AppError) -> AppError {
        log::warn!("store failed: {err}");
        let message = if err.is_user_rejection() {
            "Rejected"
        } else {
            "Failed"
        };
        self.display.set_status(message, StatusLevel::Error);
        self.display.store_pending = false;
        err
    }
}
