//! Wallet session: connect / disconnect, chain switching, balance

use alloy_primitives::Address;

use super::display::{HistoryView, StatusLevel, ERROR_SENTINEL};
use super::Controller;
use crate::domain::error::AppError;
use crate::domain::format::format_balance;
use crate::domain::network::{self, ActiveChain};

/// Currency used when the active chain is not in the registry
const FALLBACK_DECIMALS: u8 = 18;
const FALLBACK_SYMBOL: &str = "ETH";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub address: Option<Address>,
    pub connected: bool,
    pub network: Option<ActiveChain>,
}

impl Session {
    /// Address of the connected account, if any
    pub fn account(&self) -> Option<&Address> {
        self.address.as_ref().filter(|_| self.connected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched,
    /// Wallet did not know the chain; it was added first
    Added,
}

impl Controller {
    pub async fn connect(&mut self) -> Result<(), AppError> {
        self.display.set_status("Opening wallet...", StatusLevel::Info);

        let accounts = match self.wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => return Err(self.connect_failed(err.into())),
        };
        let Some(address) = accounts.first().copied() else {
            return Err(self.connect_failed(AppError::NoAccount));
        };

        log::info!("connected {address} via {}", self.wallet.endpoint_name());
        self.session.address = Some(address);
        self.session.connected = true;
        self.detect_network().await;

        self.display.connected = true;
        self.display.address = Some(address.to_string());
        self.display.clear_status();

        self.ensure_subscribed();

        if let Err(err) = self.refresh_balance().await {
            log::warn!("balance refresh after connect failed: {err}");
        }
        if let Err(err) = self.retrieve().await {
            log::warn!("retrieve after connect failed: {err}");
        }
        if let Err(err) = self.load_history().await {
            log::warn!("history load after connect failed: {err}");
        }
        Ok(())
    }

    fn connect_failed(&mut self, err: AppError) -> AppError {
        log::warn!("connect failed: {err}");
        let message = if err.is_user_rejection() {
            "Connection rejected"
        } else {
            "Failed to connect"
        };
        self.display.set_status(message, StatusLevel::Error);
        err
    }

    /// Resets local state only; wallet permissions are left as they are
    pub fn disconnect(&mut self) {
        log::info!("disconnected");
        self.session.address = None;
        self.session.connected = false;
        self.history.clear();

        self.display.connected = false;
        self.display.address = None;
        self.display.balance.clear();
        self.display.stored_value.clear();
        self.display.history = HistoryView::Hidden;
        self.display.show_filters = false;
        if self.display.pending_tx.is_none() {
            self.display.store_pending = false;
        }
        self.display.clear_status();
    }

    async fn detect_network(&mut self) {
        match self.wallet.chain_id().await {
            Ok(chain_id) => {
                let chain = ActiveChain::from_chain_id(&chain_id);
                log::info!("current network: {}", chain.label());
                self.set_chain(Some(chain));
            }
            Err(err) => {
                log::warn!("could not detect network: {err}");
                self.set_chain(None);
            }
        }
    }

    fn set_chain(&mut self, chain: Option<ActiveChain>) {
        self.display.network = chain
            .as_ref()
            .map(ActiveChain::label)
            .unwrap_or_else(|| self.config.default_network.clone());
        self.display.network_key = chain
            .as_ref()
            .and_then(ActiveChain::network)
            .map(|network| network.key);
        self.session.network = chain;
    }

    pub async fn on_accounts_changed(&mut self, accounts: Vec<Address>) {
        let Some(address) = accounts.first().copied() else {
            self.disconnect();
            return;
        };
        if !self.session.connected {
            log::debug!("ignoring account change to {address} while disconnected");
            return;
        }

        log::info!("account changed to {address}");
        self.session.address = Some(address);
        self.display.address = Some(address.to_string());
        if let Err(err) = self.refresh_balance().await {
            log::warn!("balance refresh after account change failed: {err}");
        }
    }

    pub async fn on_chain_changed(&mut self, chain_id: &str) {
        log::info!("network changed to {chain_id}");
        let chain = ActiveChain::from_chain_id(chain_id);
        let message = match &chain {
            ActiveChain::Known(network) => format!("Switched to {}", network.chain_name),
            ActiveChain::Unknown(_) => "Switched to unknown network".to_string(),
        };
        self.set_chain(Some(chain));
        self.display.set_status(message, StatusLevel::Info);

        if self.session.connected {
            if let Err(err) = self.refresh_balance().await {
                log::warn!("balance refresh after chain change failed: {err}");
            }
        }
    }

    pub async fn switch_network(&mut self, key: &str) -> Result<SwitchOutcome, AppError> {
        let Some(network) = network::by_key(key) else {
            self.display.set_status("Network not found", StatusLevel::Error);
            return Err(AppError::UnknownNetwork(key.to_string()));
        };

        self.display.set_status(
            format!("Switching to {}...", network.chain_name),
            StatusLevel::Info,
        );

        match self.wallet.switch_chain(network.chain_id).await {
            Ok(()) => {
                self.display
                    .set_status(format!("Switched to {}", network.chain_name), StatusLevel::Info);
                Ok(SwitchOutcome::Switched)
            }
            Err(err) if err.is_unrecognized_chain() => {
                self.display.set_status(
                    format!("Adding {} to wallet...", network.chain_name),
                    StatusLevel::Info,
                );
                match self.wallet.add_chain(network).await {
                    Ok(()) => {
                        self.display.set_status(
                            format!("Added and switched to {}", network.chain_name),
                            StatusLevel::Info,
                        );
                        Ok(SwitchOutcome::Added)
                    }
                    Err(err) => {
                        log::warn!("adding {} failed: {err}", network.chain_name);
                        self.display.set_status(
                            format!("Failed to add {}", network.chain_name),
                            StatusLevel::Error,
                        );
                        Err(err.into())
                    }
                }
            }
            Err(err) if err.is_user_rejection() => {
                self.display
                    .set_status("Network switch rejected by user", StatusLevel::Error);
                Err(AppError::UserRejected)
            }
            Err(err) => {
                log::warn!("switching to {} failed: {err}", network.chain_name);
                self.display
                    .set_status("Failed to switch network", StatusLevel::Error);
                Err(AppError::Provider(err))
            }
        }
    }

    pub async fn refresh_balance(&mut self) -> Result<(), AppError> {
        let Some(address) = self.session.address else {
            return Err(AppError::NotConnected);
        };

        match self.wallet.get_balance(address).await {
            Ok(amount) => {
                let (decimals, symbol) = self
                    .active_network()
                    .map(|network| (network.native_currency.decimals, network.native_currency.symbol))
                    .unwrap_or((FALLBACK_DECIMALS, FALLBACK_SYMBOL));
                self.display.balance = format_balance(amount, decimals, symbol);
                Ok(())
            }
            Err(err) => {
                self.display.balance = ERROR_SENTINEL.to_string();
                Err(err.into())
            }
        }
    }
}
