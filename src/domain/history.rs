//! Contract transaction history: filtering, ordering and pagination
//!
//! Everything here is pure. `HistoryState::filtered` is only ever assigned
//! from [`filter_transactions`], so it always stays a subset of `all`.

use alloy_primitives::{Address, U256};
use serde::Deserialize;

use crate::domain::contract::{decode_store_input, is_store_call};
use crate::domain::format::{short_address, time_ago};

pub const PAGE_SIZE: usize = 5;

/// Pages shown in full before the strip collapses into a window
const MAX_VISIBLE_PAGES: usize = 5;

/// Transaction record as returned by the explorer `txlist` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRecord {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub input: String,
    #[serde(default = "default_is_error")]
    pub is_error: String,
    #[serde(default)]
    pub time_stamp: String,
}

fn default_is_error() -> String {
    "0".to_string()
}

impl TxRecord {
    pub fn is_success(&self) -> bool {
        self.is_error == "0"
    }

    pub fn is_failed(&self) -> bool {
        self.is_error == "1"
    }

    pub fn is_from(&self, address: &Address) -> bool {
        self.from.trim().eq_ignore_ascii_case(&address.to_string())
    }

    pub fn timestamp(&self) -> Option<u64> {
        self.time_stamp.trim().parse().ok()
    }

    pub fn stored_value(&self) -> Option<U256> {
        decode_store_input(&self.input)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Mine,
    Success,
    Failed,
}

impl HistoryFilter {
    pub const ALL: [HistoryFilter; 4] = [
        HistoryFilter::All,
        HistoryFilter::Mine,
        HistoryFilter::Success,
        HistoryFilter::Failed,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            HistoryFilter::All => "All",
            HistoryFilter::Mine => "Mine",
            HistoryFilter::Success => "Success",
            HistoryFilter::Failed => "Failed",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "all" => Some(HistoryFilter::All),
            "mine" | "me" | "own" => Some(HistoryFilter::Mine),
            "success" | "ok" => Some(HistoryFilter::Success),
            "failed" | "fail" | "error" => Some(HistoryFilter::Failed),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn matches(&self, tx: &TxRecord, address: Option<&Address>) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Mine => address.is_some_and(|addr| tx.is_from(addr)),
            HistoryFilter::Success => tx.is_success(),
            HistoryFilter::Failed => tx.is_failed(),
        }
    }
}

/// Keep only `store(uint256)` calls, in fetch order
pub fn keep_store_calls(txs: Vec<TxRecord>) -> Vec<TxRecord> {
    txs.into_iter().filter(|tx| is_store_call(&tx.input)).collect()
}

/// Stable ordering that puts the connected account's transactions first
pub fn sort_own_first(txs: &mut [TxRecord], address: &Address) {
    txs.sort_by_key(|tx| !tx.is_from(address));
}

pub fn filter_transactions(
    all: &[TxRecord],
    filter: HistoryFilter,
    address: Option<&Address>,
) -> Vec<TxRecord> {
    all.iter()
        .filter(|tx| filter.matches(tx, address))
        .cloned()
        .collect()
}

pub fn total_pages(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// Slice `[(page-1)*PAGE_SIZE, page*PAGE_SIZE)`, clipped to the list
pub fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE).min(items.len());
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Number(usize),
    Ellipsis,
}

/// Compact page-number strip around `current`
pub fn page_strip(current: usize, total: usize) -> Vec<PageItem> {
    use PageItem::{Ellipsis, Number};

    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).map(Number).collect();
    }
    if current <= 3 {
        vec![Number(1), Number(2), Number(3), Number(4), Ellipsis, Number(total)]
    } else if current >= total - 2 {
        vec![
            Number(1),
            Ellipsis,
            Number(total - 3),
            Number(total - 2),
            Number(total - 1),
            Number(total),
        ]
    } else {
        vec![
            Number(1),
            Ellipsis,
            Number(current - 1),
            Number(current),
            Number(current + 1),
            Ellipsis,
            Number(total),
        ]
    }
}

/// One rendered history line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRow {
    pub hash: String,
    pub success: bool,
    pub value: Option<U256>,
    pub from_short: String,
    pub time_ago: String,
    pub own: bool,
    pub explorer_link: String,
}

impl TxRow {
    pub fn from_record(
        tx: &TxRecord,
        address: Option<&Address>,
        explorer_url: &str,
        now: u64,
    ) -> Self {
        Self {
            hash: tx.hash.clone(),
            success: tx.is_success(),
            value: tx.stored_value(),
            from_short: short_address(&tx.from),
            time_ago: tx
                .timestamp()
                .map(|ts| time_ago(now, ts))
                .unwrap_or_else(|| "--".to_string()),
            own: address.is_some_and(|addr| tx.is_from(addr)),
            explorer_link: format!("{}/tx/{}", explorer_url.trim_end_matches('/'), tx.hash),
        }
    }

    pub fn label(&self) -> String {
        match self.value {
            Some(value) => format!("Store: {value}"),
            None => "Store".to_string(),
        }
    }
}

/// One page worth of rows plus pagination controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPage {
    pub rows: Vec<TxRow>,
    pub page: usize,
    pub total_pages: usize,
    /// Empty when everything fits on one page
    pub strip: Vec<PageItem>,
}

impl HistoryPage {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryState {
    pub all: Vec<TxRecord>,
    pub filtered: Vec<TxRecord>,
    pub filter: HistoryFilter,
    pub page: usize,
}

impl HistoryState {
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Self::default()
        }
    }

    /// Install a freshly fetched list; the active filter is kept
    pub fn replace(&mut self, all: Vec<TxRecord>, address: Option<&Address>) {
        self.all = all;
        self.apply_filter(self.filter, address);
    }

    pub fn clear(&mut self) {
        self.all.clear();
        self.filtered.clear();
        self.page = 1;
    }

    pub fn apply_filter(&mut self, filter: HistoryFilter, address: Option<&Address>) {
        self.filter = filter;
        self.filtered = filter_transactions(&self.all, filter, address);
        self.page = 1;
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len())
    }

    /// Returns false and leaves the page untouched when `page` is out of range
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.page > 1 && self.go_to_page(self.page - 1)
    }

    pub fn current_items(&self) -> &[TxRecord] {
        page_slice(&self.filtered, self.page)
    }

    /// `None` when the filter leaves nothing to show
    pub fn render(
        &self,
        address: Option<&Address>,
        explorer_url: &str,
        now: u64,
    ) -> Option<HistoryPage> {
        let items = self.current_items();
        if items.is_empty() {
            return None;
        }
        let total_pages = self.total_pages();
        let strip = if total_pages > 1 {
            page_strip(self.page, total_pages)
        } else {
            Vec::new()
        };
        Some(HistoryPage {
            rows: items
                .iter()
                .map(|tx| TxRow::from_record(tx, address, explorer_url, now))
                .collect(),
            page: self.page,
            total_pages,
            strip,
        })
    }
}
