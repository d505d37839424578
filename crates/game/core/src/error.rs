//! Common error infrastructure for tactics-core.
//!
//! Domain errors live next to the code that raises them (`ActionError` in
//! [`crate::action`], `RegistryError` in [`crate::tag`]). This module provides
//! the shared classification every one of them implements.
//!
//! # Taxonomy
//!
//! - **Precondition** failures come from `canUse`/`preActivate` and always carry
//!   a human-readable reason. They abort the invocation before anything is paid.
//! - **Data-integrity** failures are content bugs (bad catalog, a harmful roll
//!   phase that produced nothing). They fail loudly at load or first use.
//! - **External** failures come from collaborators (document store, relay) and
//!   are propagated to the caller without internal retry.
//!
//! Commit conflicts are not errors at all; see `CommitStatus` in the runtime.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Shown to the initiating user; the same request may succeed later.
    ///
    /// Examples: weapon not equipped, reaction already spent
    Recoverable,

    /// Invalid input that should be rejected without retry.
    ///
    /// Examples: unknown action, target missing from the snapshot set
    Validation,

    /// Content or programming error that needs investigation.
    ///
    /// Examples: propagation cycle, harmful roll phase with no rolls
    Internal,

    /// Collaborator failure or corrupted persisted state.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a content or engine bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all tactics-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
