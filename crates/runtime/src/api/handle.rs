//! Cloneable façade for relaying requests to the arbiter.
//!
//! [`ArbiterHandle`] hides the channel plumbing so participants can request
//! a confirm as if they held write authority themselves.
use tokio::sync::{mpsc, oneshot};

use tactics_core::RecordId;

use super::errors::{Result, RuntimeError};
use crate::confirm::CommitStatus;
use crate::workers::Command;

/// Client-facing handle to the arbiter worker.
#[derive(Clone, Debug)]
pub struct ArbiterHandle {
    command_tx: mpsc::Sender<Command>,
}

impl ArbiterHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>) -> Self {
        Self { command_tx }
    }

    /// Ask the arbiter to confirm (or reverse) a record.
    pub async fn request_confirm(&self, record: RecordId, reverse: bool) -> Result<CommitStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Confirm {
                record,
                reverse,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Ask the arbiter to counter a record.
    pub async fn request_negate(&self, record: RecordId) -> Result<CommitStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Negate {
                record,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// The worker has shut down.
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }
}
