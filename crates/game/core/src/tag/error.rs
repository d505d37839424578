//! Content-integrity errors raised while loading tags and actions.

use crate::error::{ErrorSeverity, GameError};

use super::TagId;

/// Malformed tag catalog or action definition.
///
/// These are content bugs: they are raised at load time (or on first use of an
/// action) and are never worked around at runtime.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegistryError {
    #[error("tag `{0}` is registered twice")]
    DuplicateTag(TagId),

    #[error("unknown tag `{0}`")]
    UnknownTag(TagId),

    #[error("tag `{tag}` propagates unknown tag `{target}`")]
    UnknownPropagation { tag: TagId, target: TagId },

    #[error("propagation cycle: {}", format_path(.path))]
    PropagationCycle { path: Vec<TagId> },

    #[error("propagation from `{tag}` did not converge within {depth} expansions")]
    PropagationDidNotConverge { tag: TagId, depth: usize },

    #[error("tags `{first}` and `{second}` both claim the always-last priority")]
    MultipleLastTags { first: TagId, second: TagId },

    #[error("action `{action}` declares internal tag `{tag}`")]
    InternalTagDeclared { action: String, tag: TagId },

    #[error("action `{action}` declares unknown tag `{tag}`")]
    UnknownActionTag { action: String, tag: TagId },

    #[error("action `{0}` is defined twice")]
    DuplicateAction(String),
}

fn format_path(path: &[TagId]) -> String {
    path.iter()
        .map(TagId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl GameError for RegistryError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        use RegistryError::*;
        match self {
            DuplicateTag(_) => "REGISTRY_DUPLICATE_TAG",
            UnknownTag(_) => "REGISTRY_UNKNOWN_TAG",
            UnknownPropagation { .. } => "REGISTRY_UNKNOWN_PROPAGATION",
            PropagationCycle { .. } => "REGISTRY_PROPAGATION_CYCLE",
            PropagationDidNotConverge { .. } => "REGISTRY_PROPAGATION_DIVERGED",
            MultipleLastTags { .. } => "REGISTRY_MULTIPLE_LAST_TAGS",
            InternalTagDeclared { .. } => "REGISTRY_INTERNAL_TAG_DECLARED",
            UnknownActionTag { .. } => "REGISTRY_UNKNOWN_ACTION_TAG",
            DuplicateAction(_) => "REGISTRY_DUPLICATE_ACTION",
        }
    }
}
