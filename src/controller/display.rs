//! Display state: everything the UI renders, and nothing else
//!
//! The controller writes here; the UI only reads snapshots of it.

use std::time::Duration;

use crate::domain::history::{HistoryFilter, HistoryPage};

/// How long success / error messages stay on screen
const TRANSIENT_STATUS: Duration = Duration::from_secs(4);

pub const MSG_NO_CONTRACT_TXS: &str = "No transactions found for this contract";
pub const MSG_NO_STORE_TXS: &str = "No store() transactions found";
pub const MSG_NO_TXS: &str = "No transactions found";
pub const MSG_NO_MATCH: &str = "No transactions match this filter";
pub const MSG_HISTORY_FAILED: &str = "Failed to load history";

/// Sentinel shown in a value field when its request failed
pub const ERROR_SENTINEL: &str = "Error";
/// Shown in a value field while its request is in flight
pub const PENDING_SENTINEL: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

impl StatusMessage {
    /// Info messages stay until replaced; the rest clear themselves
    pub fn expires_after(&self) -> Option<Duration> {
        match self.level {
            StatusLevel::Info => None,
            StatusLevel::Success | StatusLevel::Error => Some(TRANSIENT_STATUS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryView {
    /// Not connected yet
    #[default]
    Hidden,
    Loading,
    /// Nothing to show, with the reason
    Empty(String),
    /// Explorer error message, verbatim
    ApiError(String),
    /// Request never produced an envelope
    Failed { detail: String },
    /// History exists but the active filter matches nothing
    NoMatch,
    Page(HistoryPage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub connected: bool,
    pub address: Option<String>,
    pub network: String,
    /// Registry key of the active network, for the picker
    pub network_key: Option<&'static str>,
    pub balance: String,
    pub stored_value: String,
    pub status: Option<StatusMessage>,
    /// Bumped on every status change so identical texts still re-arm the timer
    pub status_seq: u64,
    /// Store control is disabled while set
    pub store_pending: bool,
    pub pending_tx: Option<String>,
    /// Bumped when the input box should be emptied
    pub clear_input_seq: u64,
    pub history: HistoryView,
    pub show_filters: bool,
    pub filter: HistoryFilter,
}

impl DisplayState {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            connected: false,
            address: None,
            network: network.into(),
            network_key: None,
            balance: String::new(),
            stored_value: String::new(),
            status: None,
            status_seq: 0,
            store_pending: false,
            pending_tx: None,
            clear_input_seq: 0,
            history: HistoryView::Hidden,
            show_filters: false,
            filter: HistoryFilter::All,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
        });
        self.status_seq += 1;
    }

    pub fn clear_status(&mut self) {
        self.status = None;
        self.status_seq += 1;
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_expiry() {
        let mut display = DisplayState::new("Sepolia");
        display.set_status("Opening wallet...", StatusLevel::Info);
        assert_eq!(display.status.as_ref().unwrap().expires_after(), None);
        display.set_status("Failed", StatusLevel::Error);
        assert_eq!(
            display.status.as_ref().unwrap().expires_after(),
            Some(Duration::from_secs(4))
        );
        assert_eq!(display.status_seq, 2);
        display.clear_status();
        assert!(display.status_text().is_none());
    }
}
