use std::time::{Duration, Instant};

use crate::controller::{DisplayState, HistoryView, StatusLevel, StatusMessage};
use crate::core::{parse_command, Command};
use crate::domain::history::{HistoryFilter, TxRow};
use crate::domain::network::{self, Network};
use crate::infrastructure::runtime::RuntimeCommand;

/// Messages raised by the TUI itself (copy, bad command) use this lifetime
const LOCAL_STATUS: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing the value for `store`
    Editing,
    Command,
}

#[derive(Debug, Clone, Default)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusLine {
    pub message: StatusMessage,
    pub since: Instant,
    pub ttl: Option<Duration>,
}

#[derive(Debug)]
pub struct App {
    /// Latest snapshot from the worker
    pub display: DisplayState,
    pub input_mode: InputMode,
    /// Value box for `store`
    pub value_input: String,
    pub command: CommandBar,
    pub status: Option<StatusLine>,
    pub selected_row: usize,
    /// Open network picker, with the highlighted index
    pub network_picker: Option<usize>,
    pub wallet_endpoint: String,
    pub contract: String,
    pub help_open: bool,
    pub should_quit: bool,
    last_status_seq: u64,
    last_clear_seq: u64,
    outbox: Vec<RuntimeCommand>,
}

impl App {
    pub fn new(display: DisplayState, wallet_endpoint: String, contract: String) -> Self {
        Self {
            last_status_seq: display.status_seq,
            last_clear_seq: display.clear_input_seq,
            display,
            input_mode: InputMode::Normal,
            value_input: String::new(),
            command: CommandBar::default(),
            status: None,
            selected_row: 0,
            network_picker: None,
            wallet_endpoint,
            contract,
            help_open: false,
            should_quit: false,
            outbox: Vec::new(),
        }
    }

    /// Adopt a new snapshot; status and input clearing key off sequence numbers
    pub fn apply_display(&mut self, display: DisplayState) {
        if display.status_seq != self.last_status_seq {
            self.last_status_seq = display.status_seq;
            self.status = display.status.clone().map(|message| StatusLine {
                ttl: message.expires_after(),
                message,
                since: Instant::now(),
            });
        }
        if display.clear_input_seq != self.last_clear_seq {
            self.last_clear_seq = display.clear_input_seq;
            self.value_input.clear();
        }
        self.display = display;

        let rows = self.rows().len();
        if self.selected_row >= rows {
            self.selected_row = rows.saturating_sub(1);
        }
    }

    pub fn apply_worker_error(&mut self, message: String) {
        log::error!("{message}");
        self.set_status(message, StatusLevel::Error);
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusLine {
            message: StatusMessage {
                text: text.into(),
                level,
            },
            since: Instant::now(),
            ttl: Some(LOCAL_STATUS),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.message.text.as_str(), status.message.level))
    }

    pub fn on_tick(&mut self) {
        let expired = self
            .status
            .as_ref()
            .and_then(|status| status.ttl.map(|ttl| status.since.elapsed() >= ttl))
            .unwrap_or(false);
        if expired {
            self.status = None;
        }
    }

    pub fn request(&mut self, cmd: RuntimeCommand) {
        self.outbox.push(cmd);
    }

    pub fn take_requests(&mut self) -> Vec<RuntimeCommand> {
        std::mem::take(&mut self.outbox)
    }

    pub fn rows(&self) -> &[TxRow] {
        match &self.display.history {
            HistoryView::Page(page) => &page.rows,
            _ => &[],
        }
    }

    pub fn selected_tx(&self) -> Option<&TxRow> {
        self.rows().get(self.selected_row)
    }

    pub fn select_next(&mut self) {
        let len = self.rows().len();
        if len > 0 {
            self.selected_row = (self.selected_row + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    pub fn cycle_filter(&mut self) {
        if !self.display.show_filters {
            return;
        }
        self.select_filter(self.display.filter.next());
    }

    pub fn select_filter(&mut self, filter: HistoryFilter) {
        self.selected_row = 0;
        self.request(RuntimeCommand::ApplyFilter { filter });
    }

    pub fn next_page(&mut self) {
        self.selected_row = 0;
        self.request(RuntimeCommand::NextPage);
    }

    pub fn prev_page(&mut self) {
        self.selected_row = 0;
        self.request(RuntimeCommand::PrevPage);
    }

    pub fn enter_edit(&mut self) {
        if !self.display.connected {
            self.set_status("Connect a wallet first", StatusLevel::Error);
            return;
        }
        if self.display.store_pending {
            return;
        }
        self.input_mode = InputMode::Editing;
    }

    pub fn exit_edit(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn submit_value(&mut self) {
        self.input_mode = InputMode::Normal;
        if self.display.store_pending {
            return;
        }
        let input = self.value_input.clone();
        self.request(RuntimeCommand::Store { input });
    }

    pub fn open_network_picker(&mut self) {
        let current = self
            .display
            .network_key
            .and_then(|key| network::available_networks().iter().position(|n| n.key == key))
            .unwrap_or(0);
        self.network_picker = Some(current);
    }

    pub fn move_picker(&mut self, delta: isize) {
        let len = network::available_networks().len();
        if let Some(index) = self.network_picker.as_mut() {
            *index = (*index as isize + delta).rem_euclid(len as isize) as usize;
        }
    }

    pub fn picked_network(&self) -> Option<&'static Network> {
        self.network_picker
            .and_then(|index| network::available_networks().get(index))
    }

    pub fn confirm_network(&mut self) {
        if let Some(network) = self.picked_network() {
            self.request(RuntimeCommand::SwitchNetwork {
                key: network.key.to_string(),
            });
        }
        self.network_picker = None;
    }

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        if input.is_empty() {
            self.exit_command();
            return;
        }
        self.command.last = Some(input.clone());
        self.exit_command();

        match parse_command(&input) {
            Command::Connect => self.request(RuntimeCommand::Connect),
            Command::Disconnect => self.request(RuntimeCommand::Disconnect),
            Command::Network(key) => self.request(RuntimeCommand::SwitchNetwork { key }),
            Command::Store(value) => {
                self.value_input = value.clone();
                self.request(RuntimeCommand::Store { input: value });
            }
            Command::Retrieve => self.request(RuntimeCommand::Retrieve),
            Command::Cancel => self.request(RuntimeCommand::CancelReceipt),
            Command::Reload => self.request(RuntimeCommand::LoadHistory),
            Command::Filter(filter) => self.select_filter(filter),
            Command::Page(page) => {
                self.selected_row = 0;
                self.request(RuntimeCommand::GoToPage { page });
            }
            Command::Next => self.next_page(),
            Command::Prev => self.prev_page(),
            Command::Help => self.help_open = true,
            Command::Quit => self.should_quit = true,
            Command::Unknown(raw) => {
                self.set_status(format!("Unknown command: {raw}"), StatusLevel::Error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(
            DisplayState::new("Sepolia"),
            "http://127.0.0.1:1248".into(),
            "0x56A8...Dc2e".into(),
        )
    }

    #[test]
    fn test_status_follows_sequence() {
        let mut app = app();
        let mut display = app.display.clone();
        display.set_status("Stored successfully!", StatusLevel::Success);
        app.apply_display(display.clone());
        assert_eq!(
            app.status_text(),
            Some(("Stored successfully!", StatusLevel::Success))
        );

        // Same snapshot again must not re-arm or drop anything
        app.status = None;
        app.apply_display(display);
        assert!(app.status_text().is_none());
    }

    #[test]
    fn test_clear_input_seq() {
        let mut app = app();
        app.value_input = "42".into();
        let mut display = app.display.clone();
        display.clear_input_seq += 1;
        app.apply_display(display);
        assert!(app.value_input.is_empty());
    }

    #[test]
    fn test_command_dispatch() {
        let mut app = app();
        app.enter_command();
        app.command.input = "store 7".into();
        app.apply_command();
        assert_eq!(
            app.take_requests(),
            vec![RuntimeCommand::Store { input: "7".into() }]
        );
        assert_eq!(app.input_mode, InputMode::Normal);

        app.command.input = "bogus".into();
        app.apply_command();
        assert!(app.take_requests().is_empty());
        assert_eq!(app.status_text().unwrap().1, StatusLevel::Error);
    }

    #[test]
    fn test_edit_requires_connection() {
        let mut app = app();
        app.enter_edit();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.status_text().unwrap().0, "Connect a wallet first");

        let mut display = app.display.clone();
        display.connected = true;
        app.apply_display(display);
        app.enter_edit();
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_network_picker_wraps() {
        let mut app = app();
        app.open_network_picker();
        let len = network::available_networks().len();
        app.move_picker(-1);
        assert_eq!(app.network_picker, Some(len - 1));
        app.move_picker(1);
        assert_eq!(app.network_picker, Some(0));
        app.confirm_network();
        assert!(app.network_picker.is_none());
        assert_eq!(app.take_requests().len(), 1);
    }
}
