//! Persisted actor state touched by confirm and reverse.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tactics_core::{ActorId, ActorUpdate, ItemId, RecordId, ResourceKind};

/// Active effect created by a confirmed record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub id: u64,
    pub template: String,
    pub name: String,
    pub duration: Option<u32>,
    pub statuses: Vec<String>,
    pub source: RecordId,
}

/// The slice of an actor document the engine writes.
///
/// Resource values are stored unclamped so that a reverse restores exactly
/// what a confirm changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorDocument {
    pub id: ActorId,
    pub resources: BTreeMap<ResourceKind, i32>,
    pub items: BTreeMap<ItemId, u32>,
    pub equipped: BTreeSet<ItemId>,
    pub statuses: BTreeSet<String>,
    pub effects: BTreeMap<u64, ActiveEffect>,
}

impl ActorDocument {
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_resource(mut self, resource: ResourceKind, value: i32) -> Self {
        self.resources.insert(resource, value);
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: ItemId, quantity: u32) -> Self {
        self.items.insert(item, quantity);
        self
    }

    #[must_use]
    pub fn with_equipped(mut self, item: ItemId) -> Self {
        self.items.entry(item).or_insert(1);
        self.equipped.insert(item);
        self
    }

    pub fn resource(&self, resource: ResourceKind) -> i32 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }

    pub fn quantity(&self, item: ItemId) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    /// Own statuses plus those granted by active effects.
    pub fn has_status(&self, status: &str) -> bool {
        self.statuses.contains(status)
            || self
                .effects
                .values()
                .any(|effect| effect.statuses.iter().any(|s| s == status))
    }

    pub fn apply(&mut self, update: &ActorUpdate) -> Result<(), String> {
        match update {
            ActorUpdate::ConsumeItem { item, quantity } => {
                let held = self.quantity(*item);
                let left = held
                    .checked_sub(*quantity)
                    .ok_or_else(|| format!("needs {quantity} of item {}, holds {held}", item.0))?;
                self.items.insert(*item, left);
            }
            ActorUpdate::RestoreItem { item, quantity } => {
                *self.items.entry(*item).or_insert(0) += quantity;
            }
            ActorUpdate::DropWeapon { item } => {
                if !self.equipped.remove(item) {
                    return Err(format!("item {} is not equipped", item.0));
                }
            }
            ActorUpdate::EquipWeapon { item } => {
                self.equipped.insert(*item);
            }
            ActorUpdate::AddStatus { status } => {
                self.statuses.insert(status.clone());
            }
            ActorUpdate::RemoveStatus { status } => {
                self.statuses.remove(status);
            }
        }
        Ok(())
    }
}
