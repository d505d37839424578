//! Per-target outcomes and the persisted action record.
//!
//! Outcomes are frozen once the executor hands them out. They carry enough
//! data to re-render the roll breakdown and to be committed or undone later
//! without re-running any tag phase.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::action::{ActionId, ActionUsage, EffectTemplate};
use crate::actor::{ActorId, ItemId, ResourceKind};
use crate::dice::{Degree, RollResult};
use crate::tag::ResolvedTags;

/// Signed changes to resource pools.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ResourceDeltas(BTreeMap<ResourceKind, i32>);

impl ResourceDeltas {
    /// Adds to the running delta of a resource. Zero sums are dropped.
    pub fn add(&mut self, resource: ResourceKind, delta: i32) {
        let total = self.get(resource) + delta;
        if total == 0 {
            self.0.remove(&resource);
        } else {
            self.0.insert(resource, total);
        }
    }

    pub fn get(&self, resource: ResourceKind) -> i32 {
        self.0.get(&resource).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, i32)> + '_ {
        self.0.iter().map(|(kind, delta)| (*kind, *delta))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn negated(&self) -> Self {
        Self(self.0.iter().map(|(kind, delta)| (*kind, -delta)).collect())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatusTone {
    Damage,
    Healing,
    #[default]
    Neutral,
}

/// Floating text shown over a token, e.g. `"-7 Health"` or `"Glanced"`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusText {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusText {
    pub fn new(text: impl Into<String>, tone: StatusTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// Instruction for the document collaborator beyond plain resource deltas.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum ActorUpdate {
    ConsumeItem { item: ItemId, quantity: u32 },
    RestoreItem { item: ItemId, quantity: u32 },
    DropWeapon { item: ItemId },
    EquipWeapon { item: ItemId },
    AddStatus { status: String },
    RemoveStatus { status: String },
}

impl ActorUpdate {
    /// The update that undoes this one.
    #[must_use]
    pub fn inverted(&self) -> Self {
        match self {
            Self::ConsumeItem { item, quantity } => Self::RestoreItem {
                item: *item,
                quantity: *quantity,
            },
            Self::RestoreItem { item, quantity } => Self::ConsumeItem {
                item: *item,
                quantity: *quantity,
            },
            Self::DropWeapon { item } => Self::EquipWeapon { item: *item },
            Self::EquipWeapon { item } => Self::DropWeapon { item: *item },
            Self::AddStatus { status } => Self::RemoveStatus {
                status: status.clone(),
            },
            Self::RemoveStatus { status } => Self::AddStatus {
                status: status.clone(),
            },
        }
    }
}

/// Result of resolving an action against one target.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    pub target: ActorId,
    /// Target is the acting actor.
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    pub is_self: bool,
    pub rolls: Vec<RollResult>,
    pub resources: ResourceDeltas,
    pub effects: Vec<EffectTemplate>,
    pub status_text: Vec<StatusText>,
    pub updates: Vec<ActorUpdate>,
}

impl Outcome {
    pub fn new(target: ActorId, is_self: bool) -> Self {
        Self {
            target,
            is_self,
            rolls: Vec::new(),
            resources: ResourceDeltas::default(),
            effects: Vec::new(),
            status_text: Vec::new(),
            updates: Vec::new(),
        }
    }

    /// Any roll landed, fully or partially.
    pub fn is_hit(&self) -> bool {
        self.rolls.iter().any(|roll| roll.degree.is_hit())
    }

    pub fn best_degree(&self) -> Option<Degree> {
        self.rolls.iter().map(|roll| roll.degree).max()
    }

    pub fn push_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.status_text.push(StatusText::new(text, tone));
    }

    /// Nothing to display or commit.
    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
            && self.resources.is_empty()
            && self.effects.is_empty()
            && self.updates.is_empty()
    }
}

/// Stable identifier of a persisted action record.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RecordId(String);

impl RecordId {
    const LEN: usize = 12;

    /// Derives the id from what makes an invocation unique.
    pub fn derive(action: &ActionId, actor: ActorId, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(action.as_str().as_bytes());
        hasher.update(actor.0.to_le_bytes());
        hasher.update(nonce.to_le_bytes());
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..Self::LEN]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Effect instance created by a confirm, kept so a reverse can remove it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedEffect {
    pub actor: ActorId,
    pub effect: u64,
    pub template: String,
}

/// Displayable, persisted result of one action invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRecord {
    pub id: RecordId,
    pub action: ActionId,
    pub actor: ActorId,
    pub nonce: u64,
    /// Resolved tags in execution order; confirm callbacks run in this order.
    pub tags: ResolvedTags,
    pub usage: ActionUsage,
    pub outcomes: Vec<Outcome>,
    pub confirmed: bool,
    /// Countered before it was confirmed; confirm is a no-op.
    #[cfg_attr(feature = "serde", serde(default))]
    pub negated: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub applied_effects: Vec<AppliedEffect>,
}

impl ActionRecord {
    pub fn outcome_for(&self, target: ActorId) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.target == target && !outcome.is_self)
    }

    pub fn self_outcome(&self) -> Option<&Outcome> {
        self.outcomes.iter().find(|outcome| outcome.is_self)
    }

    /// Net resource deltas per actor across every outcome.
    pub fn net_deltas(&self) -> BTreeMap<ActorId, ResourceDeltas> {
        let mut net: BTreeMap<ActorId, ResourceDeltas> = BTreeMap::new();
        for outcome in &self.outcomes {
            let entry = net.entry(outcome.target).or_default();
            for (resource, delta) in outcome.resources.iter() {
                entry.add(resource, delta);
            }
        }
        net.retain(|_, deltas| !deltas.is_empty());
        net
    }
}
