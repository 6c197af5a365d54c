//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` for the worker. Returns false, with the reason in `status`,
/// when the queue cannot take it.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "Antrean perintah penuh; silakan coba lagi".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Proses latar belakang terputus; mulai ulang aplikasi".to_string();
            false
        }
    }
}
