//! Arbiter worker that owns the only write path to actor documents.
//!
//! Participants without write authority send requests through an
//! [`ArbiterHandle`](crate::ArbiterHandle); the worker runs them one at a
//! time through the [`ConfirmController`] and replies with the status.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use tactics_core::RecordId;

use crate::api::Result;
use crate::confirm::{CommitStatus, ConfirmController};

/// Requests the arbiter accepts.
pub enum Command {
    /// Confirm a record, or reverse a confirmed one.
    Confirm {
        record: RecordId,
        reverse: bool,
        reply: oneshot::Sender<Result<CommitStatus>>,
    },
    /// Counter a record.
    Negate {
        record: RecordId,
        reply: oneshot::Sender<Result<CommitStatus>>,
    },
}

/// Background task that applies confirm requests in arrival order.
pub struct ArbiterWorker {
    controller: ConfirmController,
    command_rx: mpsc::Receiver<Command>,
}

impl ArbiterWorker {
    pub fn new(controller: ConfirmController, command_rx: mpsc::Receiver<Command>) -> Self {
        Self {
            controller,
            command_rx,
        }
    }

    /// Main worker loop. Ends once every handle is dropped.
    pub async fn run(mut self) {
        info!(target: "runtime::arbiter", "arbiter started");
        while let Some(command) = self.command_rx.recv().await {
            self.handle_command(command).await;
        }
        info!(target: "runtime::arbiter", "arbiter stopped");
    }

    async fn handle_command(&self, command: Command) {
        match command {
            Command::Confirm {
                record,
                reverse,
                reply,
            } => {
                debug!(target: "runtime::arbiter", %record, reverse, "confirm requested");
                let result = self.controller.confirm(&record, reverse).await;
                if let Err(err) = &result {
                    warn!(target: "runtime::arbiter", %record, error = %err, "confirm failed");
                }
                if reply.send(result).is_err() {
                    debug!(target: "runtime::arbiter", "Confirm reply channel closed (caller dropped)");
                }
            }
            Command::Negate { record, reply } => {
                debug!(target: "runtime::arbiter", %record, "negate requested");
                let result = self.controller.negate(&record).await;
                if let Err(err) = &result {
                    warn!(target: "runtime::arbiter", %record, error = %err, "negate failed");
                }
                if reply.send(result).is_err() {
                    debug!(target: "runtime::arbiter", "Negate reply channel closed (caller dropped)");
                }
            }
        }
    }
}
