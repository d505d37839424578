//! Talent hooks: per-actor phase callbacks on top of the tag set.
//!
//! Talents are owned by actors, not by actions. An actor's talents subscribe
//! to named extension points ([`HookName`]) and run after every tag of the
//! matching phase, on every action that actor uses. A talent is any
//! [`TagBehavior`](crate::behavior::TagBehavior), so it reads and writes the
//! same usage channels tags do.
//!
//! # Failure handling
//!
//! Precondition failures always abort the invocation, whatever the talent's
//! criticality. Other failures are handled by [`HookCriticality`].
mod registry;

pub use registry::{HookRegistry, Talent};

use tactics_core::Phase;

/// Well-known extension points, one per lifecycle phase.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "camelCase")]
pub enum HookName {
    InitializeAction,
    PrepareAction,
    CanUseAction,
    ConfigureAction,
    PreActivateAction,
    RollAction,
    PostActivateAction,
    ConfirmAction,
}

impl HookName {
    pub const fn phase(&self) -> Phase {
        match self {
            Self::InitializeAction => Phase::Initialize,
            Self::PrepareAction => Phase::Prepare,
            Self::CanUseAction => Phase::CanUse,
            Self::ConfigureAction => Phase::Configure,
            Self::PreActivateAction => Phase::PreActivate,
            Self::RollAction => Phase::Roll,
            Self::PostActivateAction => Phase::PostActivate,
            Self::ConfirmAction => Phase::Confirm,
        }
    }
}

impl From<Phase> for HookName {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Initialize => Self::InitializeAction,
            Phase::Prepare => Self::PrepareAction,
            Phase::CanUse => Self::CanUseAction,
            Phase::Configure => Self::ConfigureAction,
            Phase::PreActivate => Self::PreActivateAction,
            Phase::Roll => Self::RollAction,
            Phase::PostActivate => Self::PostActivateAction,
            Phase::Confirm => Self::ConfirmAction,
        }
    }
}

/// How a talent failure affects the invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HookCriticality {
    /// Failure aborts the invocation.
    Critical,

    /// Failure is logged as an error; the invocation continues.
    #[default]
    Important,

    /// Failure is logged at debug level; the invocation continues.
    Optional,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn hook_names_round_trip_through_phases() {
        for hook in HookName::iter() {
            assert_eq!(HookName::from(hook.phase()), hook);
        }
    }

    #[test]
    fn hook_names_are_camel_case() {
        assert_eq!(HookName::PreActivateAction.to_string(), "preActivateAction");
        assert_eq!(
            "canUseAction".parse::<HookName>().unwrap(),
            HookName::CanUseAction
        );
    }
}
