//! Error types raised by document store implementations.

use thiserror::Error;

use tactics_core::{ActorId, RecordId};

/// Errors surfaced by document store implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document store lock was poisoned")]
    LockPoisoned,

    #[error("record {0} not found")]
    RecordNotFound(RecordId),

    #[error("record {0} already exists")]
    RecordExists(RecordId),

    #[error("actor {0} has no document")]
    ActorNotFound(ActorId),

    /// The stored commit flag changed between read and write.
    #[error("record {record} commit flag is already {confirmed}")]
    Conflict { record: RecordId, confirmed: bool },

    #[error("update to {actor} rejected: {reason}")]
    Rejected { actor: ActorId, reason: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
