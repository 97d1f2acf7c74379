//! History engine orchestration: fetch, filter, paginate, render

use super::display::{HistoryView, MSG_NO_CONTRACT_TXS, MSG_NO_STORE_TXS, MSG_NO_TXS};
use super::{unix_now, Controller};
use crate::domain::error::AppError;
use crate::domain::history::{keep_store_calls, sort_own_first, HistoryFilter};
use crate::infrastructure::explorer::TxListOutcome;

impl Controller {
    pub async fn load_history(&mut self) -> Result<(), AppError> {
        self.display.history = HistoryView::Loading;
        self.display.show_filters = false;

        let chain_id = self.active_chain_id();
        let envelope = match self
            .explorer
            .transactions(chain_id, self.config.contract)
            .await
        {
            Ok(envelope) => envelope,
            Err(err) => {
                log::warn!("history request failed: {err}");
                self.history.clear();
                self.display.history = HistoryView::Failed {
                    detail: err.to_string(),
                };
                return Err(err.into());
            }
        };

        match envelope.into_outcome() {
            TxListOutcome::Transactions(txs) => {
                let fetched = txs.len();
                let mut txs = keep_store_calls(txs);
                log::info!("history: {} store calls out of {fetched}", txs.len());
                if let Some(address) = self.session.account() {
                    sort_own_first(&mut txs, address);
                }
                if txs.is_empty() {
                    self.history.clear();
                    self.display.history = HistoryView::Empty(MSG_NO_STORE_TXS.to_string());
                    return Ok(());
                }
                let address = self.session.account().copied();
                self.history.replace(txs, address.as_ref());
                self.display.show_filters = true;
                self.display.filter = self.history.filter;
                self.render_history();
                Ok(())
            }
            TxListOutcome::NoTransactions => {
                self.history.clear();
                self.display.history = HistoryView::Empty(MSG_NO_CONTRACT_TXS.to_string());
                Ok(())
            }
            TxListOutcome::ApiError(message) => {
                log::warn!("explorer API error: {message}");
                self.history.clear();
                self.display.history = HistoryView::ApiError(message.clone());
                Err(AppError::Api(message))
            }
            TxListOutcome::Empty => {
                self.history.clear();
                self.display.history = HistoryView::Empty(MSG_NO_TXS.to_string());
                Ok(())
            }
        }
    }

    pub fn apply_filter(&mut self, filter: HistoryFilter) {
        let address = self.session.account().copied();
        self.history.apply_filter(filter, address.as_ref());
        self.display.filter = filter;
        if !self.history.all.is_empty() {
            self.render_history();
        }
    }

    /// No-op (returns false) outside `[1, total_pages]`
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if !self.history.go_to_page(page) {
            return false;
        }
        self.render_history();
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.history.page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.history.page > 1 && self.go_to_page(self.history.page - 1)
    }

    fn render_history(&mut self) {
        let explorer_url = self.explorer_url();
        let address = self.session.account().copied();
        self.display.history = match self.history.render(address.as_ref(), &explorer_url, unix_now())
        {
            Some(page) => HistoryView::Page(page),
            None => HistoryView::NoMatch,
        };
    }
}
