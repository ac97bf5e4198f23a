//! Backend worker: owns the tokio runtime and the HTTP transport, and turns
//! queued commands into UI events.

use std::{sync::Arc, thread};

use anyhow::anyhow;
use client_core::{GameTransport, HttpGameTransport};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(server_url: String, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                refuse_commands(
                    cmd_rx,
                    ui_tx,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                );
                return;
            }
        };

        let transport = match HttpGameTransport::new(&server_url) {
            Ok(transport) => Arc::new(transport),
            Err(err) => {
                tracing::error!(%server_url, "failed to build game transport: {err:#}");
                refuse_commands(
                    cmd_rx,
                    ui_tx,
                    format!("backend worker startup failure: {err:#}"),
                );
                return;
            }
        };
        tracing::info!(server_url = transport.server_url(), "backend worker ready");

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend received command");
                let transport = Arc::clone(&transport);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let event = execute(transport.as_ref(), cmd).await;
                    if ui_tx.send(event).is_err() {
                        tracing::debug!("ui closed before backend result was delivered");
                    }
                });
            }
            tracing::info!("ui command queue closed; backend worker exiting");
        });
    });
}

pub async fn execute<T: GameTransport>(transport: &T, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::NewGame => UiEvent::NewGameLoaded(transport.create_game().await),
        BackendCommand::MakeMove(mv) => UiEvent::MoveApplied(transport.make_move(mv).await),
        BackendCommand::RefreshTally => UiEvent::TallyLoaded(transport.win_record().await),
    }
}

/// Keeps answering the UI after a failed startup so no request stays
/// outstanding forever.
fn refuse_commands(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, reason: String) {
    let _ = ui_tx.send(UiEvent::BackendUnavailable(UiError::from_message(
        UiErrorContext::BackendStartup,
        reason.clone(),
    )));
    while let Ok(cmd) = cmd_rx.recv() {
        if ui_tx
            .send(UiEvent::failed(cmd, anyhow!(reason.clone())))
            .is_err()
        {
            break;
        }
    }
}
