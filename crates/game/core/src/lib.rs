//! Deterministic action-resolution rules shared by the runtime and content tools.
//!
//! `tactics-core` defines the canonical data of the action engine: the dice
//! pool and roll resolution, the tag registry with its precomputed closure
//! table, action definitions and per-invocation instances, and the outcomes
//! an invocation produces. Nothing here suspends or performs I/O; the
//! asynchronous lifecycle lives in `tactics-runtime`.
pub mod action;
pub mod actor;
pub mod config;
pub mod dice;
pub mod error;
pub mod outcome;
pub mod rng;
pub mod tag;

pub use action::{
    ActionCost, ActionDefinition, ActionError, ActionId, ActionInstance, ActionRange,
    ActionUsage, Consumption, DamageUsage, EffectRecipient, EffectTemplate, ModifierLedger,
    RangeSpec, RollAgainst, TargetKind, TargetScope, TargetSpec, TargetUsage, UsageFlags,
};
pub use actor::{
    Ability, ActorId, ActorSnapshot, DamageType, EquippedWeapons, InventoryStack, ItemId,
    ResourceKind, WeaponKind, WeaponSummary,
};
pub use config::{BonusBounds, RulesConfig};
pub use dice::{
    Degree, DefenseHit, DefenseTable, DefenseTier, DicePool, POOL_SIZE, RollBonuses, RollResult,
    TierEffect,
};
pub use error::{ErrorSeverity, GameError};
pub use outcome::{
    ActionRecord, ActorUpdate, AppliedEffect, Outcome, RecordId, ResourceDeltas, StatusText,
    StatusTone,
};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use tag::{
    Phase, PhaseSet, Priority, RegistryError, ResolvedTags, TagDescriptor, TagId, TagRegistry,
};
