//! Controller - the single owner of session, history and display state
//!
//! Every operation catches its own failures: it updates [`DisplayState`]
//! first and then returns the error so the caller can log it. Nothing
//! here panics on a failed request.

mod contract;
mod display;
mod history;
mod receipt;
mod session;

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::mpsc;

use crate::domain::history::HistoryState;
use crate::domain::network::Network;
use crate::infrastructure::explorer::ExplorerApi;
use crate::infrastructure::wallet::{WalletEvent, WalletProvider};

pub use display::{
    DisplayState, HistoryView, StatusLevel, StatusMessage, ERROR_SENTINEL, MSG_HISTORY_FAILED,
    MSG_NO_CONTRACT_TXS, MSG_NO_MATCH, MSG_NO_STORE_TXS, MSG_NO_TXS, PENDING_SENTINEL,
};
pub use receipt::{cancel_pair, wait_for_receipt, CancelHandle, CancelToken, ReceiptPolicy};
pub use session::{Session, SwitchOutcome};

/// Fixed settings the controller needs from configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub contract: Address,
    /// Chain used for history when the wallet's chain is unknown
    pub default_chain_id: u64,
    /// Network label shown before a chain is detected
    pub default_network: String,
    /// Explorer used for links when the wallet's chain is unknown
    pub default_explorer_url: String,
    pub receipt_policy: ReceiptPolicy,
}

pub struct Controller {
    wallet: Arc<dyn WalletProvider>,
    explorer: Arc<dyn ExplorerApi>,
    config: ControllerConfig,
    session: Session,
    history: HistoryState,
    display: DisplayState,
    events: Option<mpsc::UnboundedReceiver<WalletEvent>>,
    subscribed: bool,
}

impl Controller {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        explorer: Arc<dyn ExplorerApi>,
        config: ControllerConfig,
    ) -> Self {
        let display = DisplayState::new(config.default_network.clone());
        Self {
            wallet,
            explorer,
            config,
            session: Session::default(),
            history: HistoryState::new(),
            display,
            events: None,
            subscribed: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &HistoryState {
        &self.history
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn wallet(&self) -> Arc<dyn WalletProvider> {
        Arc::clone(&self.wallet)
    }

    /// Hand the wallet event stream to whoever drives the event loop
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<WalletEvent>> {
        self.events.take()
    }

    /// Route a wallet notification to its handler
    pub async fn handle_event(&mut self, event: WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) => self.on_accounts_changed(accounts).await,
            WalletEvent::ChainChanged(chain_id) => self.on_chain_changed(&chain_id).await,
        }
    }

    fn ensure_subscribed(&mut self) {
        if !self.subscribed {
            self.events = Some(self.wallet.subscribe());
            self.subscribed = true;
        }
    }

    fn active_network(&self) -> Option<&'static Network> {
        self.session.network.as_ref().and_then(|chain| chain.network())
    }

    fn explorer_url(&self) -> String {
        self.active_network()
            .map(|network| network.explorer_url().to_string())
            .unwrap_or_else(|| self.config.default_explorer_url.clone())
    }

    fn active_chain_id(&self) -> u64 {
        self.active_network()
            .map(|network| network.chain_id_decimal)
            .unwrap_or(self.config.default_chain_id)
    }
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}
