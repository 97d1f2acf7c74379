//! Runtime worker: commands in, display snapshots out, receipt waits in the background

mod support;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde_json::json;

use storekeep::controller::{DisplayState, HistoryView};
use storekeep::infrastructure::runtime::{run_async_worker, RuntimeCommand, RuntimeEvent};
use storekeep::infrastructure::wallet::WalletEvent;

use support::*;

const WAIT: Duration = Duration::from_secs(3);

/// Worker on its own thread and runtime, wired up the way the bridge does it
struct Worker {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    fn start(wallet: Arc<FakeWallet>, explorer: Arc<FakeExplorer>) -> Self {
        let controller = controller(wallet, explorer);
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(run_async_worker(controller, cmd_rx, evt_tx))
                .unwrap();
        });
        Self {
            cmd_tx,
            evt_rx,
            handle: Some(handle),
        }
    }

    fn send(&self, cmd: RuntimeCommand) {
        self.cmd_tx.send(cmd).unwrap();
    }

    /// First published snapshot matching `pred`
    fn wait_for(&self, what: &str, pred: impl Fn(&DisplayState) -> bool) -> DisplayState {
        let deadline = Instant::now() + WAIT;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.evt_rx.recv_timeout(left) {
                Ok(RuntimeEvent::Display(display)) if pred(&display) => return *display,
                Ok(_) => {}
                Err(_) => panic!("timed out waiting for {what}"),
            }
        }
    }

    fn connect(&self) -> DisplayState {
        self.send(RuntimeCommand::Connect);
        self.wait_for("connect", |d| d.connected)
    }

    fn store(&self, input: &str) -> DisplayState {
        self.send(RuntimeCommand::Store {
            input: input.into(),
        });
        self.wait_for("pending store", |d| d.pending_tx.is_some())
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + WAIT;
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(5));
    }
}

/// Wallet whose receipts stay pending until scripted otherwise
fn pending_wallet() -> Arc<FakeWallet> {
    let wallet = FakeWallet::sepolia(ALICE);
    wallet.respond("eth_sendTransaction", Ok(json!(TX_HASH)));
    wallet.respond("eth_getTransactionReceipt", Ok(json!(null)));
    wallet
}

fn confirm(wallet: &FakeWallet) {
    wallet.respond("eth_getTransactionReceipt", Ok(json!({ "status": "0x1" })));
}

#[test]
fn test_store_resolves_in_background() {
    let wallet = pending_wallet();
    let worker = Worker::start(wallet.clone(), FakeExplorer::transactions(vec![]));
    worker.connect();

    let pending = worker.store("5");
    assert!(pending.store_pending);
    assert_eq!(pending.pending_tx.as_deref(), Some(TX_HASH));
    assert_eq!(pending.status_text(), Some("Waiting for confirmation..."));

    confirm(&wallet);
    let done = worker.wait_for("store to finish", |d| !d.store_pending);
    assert_eq!(done.status_text(), Some("Stored successfully!"));
    assert_eq!(done.pending_tx, None);
    assert_eq!(done.clear_input_seq, 1);
}

#[test]
fn test_second_store_ignored_while_pending() {
    let wallet = pending_wallet();
    let worker = Worker::start(wallet.clone(), FakeExplorer::transactions(vec![]));
    worker.connect();
    worker.store("5");

    let calls = wallet.count("eth_call");
    worker.send(RuntimeCommand::Store { input: "6".into() });
    // Commands run in order, so the retrieve marks the store as handled
    worker.send(RuntimeCommand::Retrieve);
    wait_until("retrieve", || wallet.count("eth_call") > calls);

    assert_eq!(wallet.count("eth_sendTransaction"), 1);
}

#[test]
fn test_cancel_receipt_reports_failed() {
    let wallet = pending_wallet();
    let worker = Worker::start(wallet.clone(), FakeExplorer::transactions(vec![]));
    worker.connect();
    worker.store("5");

    worker.send(RuntimeCommand::CancelReceipt);
    let done = worker.wait_for("cancelled store", |d| !d.store_pending);
    assert_eq!(done.status_text(), Some("Failed"));
    assert_eq!(done.pending_tx, None);
}

#[test]
fn test_disconnect_keeps_receipt_wait() {
    let wallet = pending_wallet();
    let worker = Worker::start(wallet.clone(), FakeExplorer::transactions(vec![]));
    worker.connect();
    worker.store("5");

    worker.send(RuntimeCommand::Disconnect);
    let disconnected = worker.wait_for("disconnect", |d| !d.connected);
    assert!(disconnected.store_pending);
    assert_eq!(disconnected.pending_tx.as_deref(), Some(TX_HASH));

    let polls = wallet.count("eth_getTransactionReceipt");
    wait_until("polling to continue", || {
        wallet.count("eth_getTransactionReceipt") > polls + 2
    });

    confirm(&wallet);
    let done = worker.wait_for("store to finish", |d| !d.store_pending);
    assert_eq!(done.status_text(), Some("Stored successfully!"));
    assert!(!done.connected);
    assert_eq!(done.history, HistoryView::Hidden);

    worker.connect();
    worker.store("6");
    assert_eq!(wallet.count("eth_sendTransaction"), 2);
}

#[test]
fn test_wallet_events_are_published() {
    let wallet = FakeWallet::sepolia(ALICE);
    let worker = Worker::start(wallet.clone(), FakeExplorer::transactions(vec![]));
    worker.connect();

    wallet.emit(WalletEvent::ChainChanged("0x1".into()));
    let switched = worker.wait_for("chain change", |d| d.network_key == Some("ethereum"));
    assert!(switched.connected);

    wallet.emit(WalletEvent::AccountsChanged(vec![]));
    let display = worker.wait_for("disconnect", |d| !d.connected);
    assert_eq!(display.address, None);
}
