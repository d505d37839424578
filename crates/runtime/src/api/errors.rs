//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the lifecycle executor, the document store, and the
//! arbiter relay so clients can bubble them up with consistent context.
//! Commit conflicts are deliberately absent: they are reported as a
//! [`crate::CommitStatus`], never as an error.
use thiserror::Error;
use tokio::sync::oneshot;

use tactics_core::{ActionError, ActorId, ErrorSeverity, GameError, RecordId};

pub use crate::repository::StoreError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error("actor {0} has no snapshot")]
    UnknownActor(ActorId),

    #[error("record {0} not found")]
    RecordNotFound(RecordId),

    #[error("actor {0} already has an action in flight")]
    ActorBusy(ActorId),

    #[error("only the arbiter may confirm records; request it through the relay")]
    NotArbiter,

    #[error("failed to load content")]
    Content(#[source] anyhow::Error),

    #[error("arbiter command channel closed")]
    CommandChannelClosed,

    #[error("arbiter reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("arbiter worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("failed to render record: {0}")]
    Render(#[source] serde_json::Error),
}

impl RuntimeError {
    /// Precondition failures are shown to the user; everything else is logged.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Action(err) if err.is_precondition())
    }
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Action(err) => err.severity(),
            Self::UnknownAction(_) | Self::UnknownActor(_) | Self::RecordNotFound(_) => {
                ErrorSeverity::Validation
            }
            Self::NotArbiter | Self::ActorBusy(_) => ErrorSeverity::Recoverable,
            Self::Content(_) | Self::Render(_) => ErrorSeverity::Internal,
            Self::Store(_)
            | Self::CommandChannelClosed
            | Self::ReplyChannelClosed(_)
            | Self::WorkerJoin(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Action(err) => err.error_code(),
            Self::Store(_) => "RUNTIME_STORE",
            Self::UnknownAction(_) => "RUNTIME_UNKNOWN_ACTION",
            Self::UnknownActor(_) => "RUNTIME_UNKNOWN_ACTOR",
            Self::RecordNotFound(_) => "RUNTIME_RECORD_NOT_FOUND",
            Self::NotArbiter => "RUNTIME_NOT_ARBITER",
            Self::ActorBusy(_) => "RUNTIME_ACTOR_BUSY",
            Self::Content(_) => "RUNTIME_CONTENT",
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::Render(_) => "RUNTIME_RENDER",
        }
    }
}
