//! Lifecycle phases and the per-tag capability table.

use bitflags::bitflags;

/// One named step of the action lifecycle, in execution order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Initialize,
    Prepare,
    CanUse,
    Configure,
    PreActivate,
    Roll,
    PostActivate,
    /// Deferred; only run by the confirm controller.
    Confirm,
}

impl Phase {
    /// Phases whose callbacks are expected to await external input.
    pub const fn may_suspend(&self) -> bool {
        matches!(
            self,
            Self::PreActivate | Self::Roll | Self::PostActivate | Self::Confirm
        )
    }

    /// Phases allowed to abort the invocation with a precondition failure.
    pub const fn may_abort(&self) -> bool {
        matches!(self, Self::CanUse | Self::PreActivate)
    }

    /// The phase that must complete before this one.
    pub const fn previous(&self) -> Option<Self> {
        match self {
            Self::Initialize => None,
            Self::Prepare => Some(Self::Initialize),
            Self::CanUse => Some(Self::Prepare),
            Self::Configure => Some(Self::CanUse),
            Self::PreActivate => Some(Self::Configure),
            Self::Roll => Some(Self::PreActivate),
            Self::PostActivate => Some(Self::Roll),
            Self::Confirm => Some(Self::PostActivate),
        }
    }

    pub const fn flag(&self) -> PhaseSet {
        match self {
            Self::Initialize => PhaseSet::INITIALIZE,
            Self::Prepare => PhaseSet::PREPARE,
            Self::CanUse => PhaseSet::CAN_USE,
            Self::Configure => PhaseSet::CONFIGURE,
            Self::PreActivate => PhaseSet::PRE_ACTIVATE,
            Self::Roll => PhaseSet::ROLL,
            Self::PostActivate => PhaseSet::POST_ACTIVATE,
            Self::Confirm => PhaseSet::CONFIRM,
        }
    }
}

bitflags! {
    /// Which phases a tag (or talent) implements.
    ///
    /// Checked before dispatch, so a tag without a slot for a phase is never called.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PhaseSet: u8 {
        const INITIALIZE    = 1 << 0;
        const PREPARE       = 1 << 1;
        const CAN_USE       = 1 << 2;
        const CONFIGURE     = 1 << 3;
        const PRE_ACTIVATE  = 1 << 4;
        const ROLL          = 1 << 5;
        const POST_ACTIVATE = 1 << 6;
        const CONFIRM       = 1 << 7;
    }
}

impl PhaseSet {
    pub fn implements(&self, phase: Phase) -> bool {
        self.contains(phase.flag())
    }
}

impl From<Phase> for PhaseSet {
    fn from(phase: Phase) -> Self {
        phase.flag()
    }
}
