//! Command orchestration from controller commands to the backend queue.

use anyhow::anyhow;
use client_core::Command;
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Queues a controller command for the backend worker. A command that
/// cannot be queued comes back as the failed event it would have produced,
/// so the caller can settle the controller's in-flight state.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    command: Command,
) -> Result<(), UiEvent> {
    let cmd = BackendCommand::from(command);
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(cmd)) => {
            tracing::warn!(command = cmd_name, "ui command queue is full");
            Err(UiEvent::failed(
                cmd,
                anyhow!("UI command queue is full; please retry"),
            ))
        }
        Err(TrySendError::Disconnected(cmd)) => {
            tracing::error!(command = cmd_name, "backend command processor disconnected");
            Err(UiEvent::failed(
                cmd,
                anyhow!("Backend command processor disconnected (possible startup/runtime failure)"),
            ))
        }
    }
}
