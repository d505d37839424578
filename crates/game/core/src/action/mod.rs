//! Action definitions and per-invocation instances.
//!
//! An [`ActionDefinition`] is an immutable template loaded from content. Each
//! use creates an [`ActionInstance`] that owns the resolved tag set and a
//! typed [`ActionUsage`] context the tag phases read and write.

pub mod definition;
pub mod error;
pub mod instance;
pub mod usage;

pub use definition::{
    ActionCost, ActionDefinition, ActionId, ActionRange, EffectRecipient, EffectTemplate,
    RangeSpec, TargetKind, TargetScope, TargetSpec,
};
pub use error::ActionError;
pub use instance::ActionInstance;
pub use usage::{
    ActionUsage, Consumption, DamageUsage, ModifierLedger, RollAgainst, TargetUsage, UsageFlags,
};
