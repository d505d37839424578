//! Errors raised while resolving an action instance.

use crate::actor::ActorId;
use crate::dice::POOL_SIZE;
use crate::error::{ErrorSeverity, GameError};
use crate::tag::{Phase, RegistryError};

/// Failure of one action invocation.
///
/// Only [`ActionError::Precondition`] is expected during normal play; it is
/// surfaced verbatim to the initiating user. Everything else indicates broken
/// content, a misbehaving collaborator, or an engine bug.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// A `canUse` or `preActivate` callback refused the action.
    #[error("{source_name}: {reason}")]
    Precondition { source_name: String, reason: String },

    /// A content bug detected at first use.
    #[error("data integrity violation in `{source_name}`: {reason}")]
    DataIntegrity { source_name: String, reason: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("target {0} is not part of this invocation")]
    TargetNotFound(ActorId),

    #[error("rolled faces {rolled:?} do not fit pool {formula}")]
    InvalidRoll {
        rolled: [u8; POOL_SIZE],
        formula: String,
    },

    #[error("phase {phase} cannot run after {completed}")]
    OutOfOrder { phase: Phase, completed: Phase },

    #[error("dice roller failed: {0}")]
    Roller(String),

    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl ActionError {
    pub fn precondition(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Precondition {
            source_name: source.into(),
            reason: reason.into(),
        }
    }

    pub fn data_integrity(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataIntegrity {
            source_name: source.into(),
            reason: reason.into(),
        }
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }

    /// Whether the failure ends the invocation no matter who raised it.
    ///
    /// Refusals, broken content and failed collaborators always reach the
    /// caller. Only rule-level misfires (a bad roll shape, an unknown target)
    /// may be tolerated by an optional talent.
    pub fn always_aborts(&self) -> bool {
        matches!(
            self,
            Self::Precondition { .. }
                | Self::DataIntegrity { .. }
                | Self::Registry(_)
                | Self::OutOfOrder { .. }
                | Self::Roller(_)
                | Self::Prompt(_)
        )
    }
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Precondition { .. } => ErrorSeverity::Recoverable,
            Self::TargetNotFound(_) => ErrorSeverity::Validation,
            Self::DataIntegrity { .. }
            | Self::Registry(_)
            | Self::InvalidRoll { .. }
            | Self::OutOfOrder { .. } => ErrorSeverity::Internal,
            Self::Roller(_) | Self::Prompt(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Precondition { .. } => "ACTION_PRECONDITION",
            Self::DataIntegrity { .. } => "ACTION_DATA_INTEGRITY",
            Self::Registry(inner) => inner.error_code(),
            Self::TargetNotFound(_) => "ACTION_TARGET_NOT_FOUND",
            Self::InvalidRoll { .. } => "ACTION_INVALID_ROLL",
            Self::OutOfOrder { .. } => "ACTION_OUT_OF_ORDER",
            Self::Roller(_) => "ACTION_ROLLER_FAILED",
            Self::Prompt(_) => "ACTION_PROMPT_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_reason_is_shown_verbatim() {
        let err = ActionError::precondition("melee", "no melee weapon equipped");
        assert_eq!(err.to_string(), "melee: no melee weapon equipped");
        assert!(err.severity().is_recoverable());
    }

    #[test]
    fn registry_errors_keep_their_code() {
        let err = ActionError::from(RegistryError::DuplicateAction("strike".into()));
        assert_eq!(err.error_code(), "REGISTRY_DUPLICATE_ACTION");
        assert!(err.severity().is_internal());
    }

    #[test]
    fn collaborator_and_content_failures_always_abort() {
        assert!(ActionError::precondition("melee", "no weapon").always_aborts());
        assert!(ActionError::data_integrity("strike", "no damage").always_aborts());
        assert!(ActionError::Roller("relay down".into()).always_aborts());
        assert!(ActionError::Prompt("closed".into()).always_aborts());
        assert!(!ActionError::TargetNotFound(ActorId(7)).always_aborts());
    }
}
