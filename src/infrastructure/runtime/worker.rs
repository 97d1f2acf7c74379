//! Async worker - owns the controller and serializes every operation on it

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc as tokio_mpsc;
use tokio::time::interval;

use crate::controller::{cancel_pair, wait_for_receipt, CancelHandle, Controller};
use crate::domain::error::AppError;
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent};
use crate::infrastructure::wallet::WalletEvent;

const TICK: Duration = Duration::from_millis(50);

/// Receipt wait running off the command loop
struct PendingReceipt {
    cancel: CancelHandle,
    outcome: tokio_mpsc::UnboundedReceiver<Result<(), AppError>>,
}

/// Run the async worker loop
pub async fn run_async_worker(
    mut controller: Controller,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let mut wallet_events: Option<tokio_mpsc::UnboundedReceiver<WalletEvent>> = None;
    let mut pending: Option<PendingReceipt> = None;
    let mut tick = interval(TICK);

    publish(&controller, &evt_tx);

    loop {
        tick.tick().await;
        let mut changed = false;

        // Process commands (non-blocking)
        loop {
            let cmd = match cmd_rx.try_recv() {
                Ok(cmd) => cmd,
                Err(TryRecvError::Empty) => break,
                // UI gone
                Err(TryRecvError::Disconnected) => return Ok(()),
            };
            if cmd == RuntimeCommand::Shutdown {
                if let Some(pending) = pending.take() {
                    pending.cancel.cancel();
                }
                return Ok(());
            }
            handle_command(&mut controller, cmd, &mut pending).await;
            publish(&controller, &evt_tx);
            changed = false;
        }

        if wallet_events.is_none() {
            wallet_events = controller.take_events();
        }
        if let Some(events) = wallet_events.as_mut() {
            loop {
                match events.try_recv() {
                    Ok(event) => {
                        controller.handle_event(event).await;
                        changed = true;
                    }
                    Err(tokio_mpsc::error::TryRecvError::Empty) => break,
                    Err(tokio_mpsc::error::TryRecvError::Disconnected) => {
                        log::warn!("wallet event stream closed");
                        wallet_events = None;
                        break;
                    }
                }
            }
        }

        if let Some(outcome) = pending.as_mut().and_then(|p| p.outcome.try_recv().ok()) {
            pending = None;
            if let Err(err) = controller.finish_store(outcome).await {
                log::warn!("store did not complete: {err}");
            }
            changed = true;
        }

        if changed {
            publish(&controller, &evt_tx);
        }
    }
}

async fn handle_command(
    controller: &mut Controller,
    cmd: RuntimeCommand,
    pending: &mut Option<PendingReceipt>,
) {
    let result = match cmd {
        RuntimeCommand::Connect => controller.connect().await,
        // A submitted store keeps polling; its outcome re-enables the control
        RuntimeCommand::Disconnect => {
            controller.disconnect();
            Ok(())
        }
        RuntimeCommand::Retrieve => controller.retrieve().await,
        RuntimeCommand::Store { input } => {
            if pending.is_some() || controller.display().store_pending {
                log::debug!("store ignored while another is pending");
                return;
            }
            match controller.submit_store(&input).await {
                Ok(hash) => {
                    *pending = Some(spawn_receipt_wait(controller, hash));
                    Ok(())
                }
                Err(err) => Err(err),
            }
        }
        RuntimeCommand::SwitchNetwork { key } => controller.switch_network(&key).await.map(|_| ()),
        RuntimeCommand::LoadHistory => controller.load_history().await,
        RuntimeCommand::ApplyFilter { filter } => {
            controller.apply_filter(filter);
            Ok(())
        }
        RuntimeCommand::GoToPage { page } => {
            controller.go_to_page(page);
            Ok(())
        }
        RuntimeCommand::NextPage => {
            controller.next_page();
            Ok(())
        }
        RuntimeCommand::PrevPage => {
            controller.prev_page();
            Ok(())
        }
        RuntimeCommand::CancelReceipt => {
            match pending.as_ref() {
                Some(pending) => pending.cancel.cancel(),
                None => log::debug!("no receipt wait to cancel"),
            }
            Ok(())
        }
        RuntimeCommand::Shutdown => Ok(()),
    };

    if let Err(err) = result {
        log::warn!("command failed: {err}");
    }
}

fn spawn_receipt_wait(controller: &Controller, hash: String) -> PendingReceipt {
    let (cancel, token) = cancel_pair();
    let (tx, outcome) = tokio_mpsc::unbounded_channel();
    let wallet = controller.wallet();
    let policy = controller.config().receipt_policy.clone();

    tokio::spawn(async move {
        let result = wait_for_receipt(wallet.as_ref(), &hash, &policy, Some(token)).await;
        let _ = tx.send(result);
    });

    PendingReceipt { cancel, outcome }
}

fn publish(controller: &Controller, evt_tx: &Sender<RuntimeEvent>) {
    let _ = evt_tx.send(RuntimeEvent::Display(Box::new(controller.display().clone())));
}
