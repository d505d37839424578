//! Read-only actor inputs consumed by the action engine.
//!
//! Persistence of actors and their derived statistics belongs to an external
//! collaborator. The engine only ever sees an [`ActorSnapshot`] taken before
//! the action starts; resource pools are never written from here.

use std::collections::{BTreeMap, BTreeSet};

/// Unique identifier of an actor at the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActorId(pub u32);

impl core::fmt::Display for ActorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Identifier of an owned item (weapon, ammunition stack, consumable).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(pub u32);

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
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Ability {
    Strength,
    Dexterity,
    Toughness,
    Intellect,
    Presence,
    Wisdom,
}

/// Resource pools an outcome can move.
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
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ResourceKind {
    Health,
    Morale,
    Action,
    Focus,
}

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
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DamageType {
    Bludgeoning,
    Piercing,
    Slashing,
    Fire,
    Cold,
    Lightning,
    Psychic,
}

impl DamageType {
    /// Physical damage is absorbed by the defense tier table; elemental damage is not.
    pub const fn is_physical(&self) -> bool {
        matches!(self, Self::Bludgeoning | Self::Piercing | Self::Slashing)
    }

    /// Resource a damage type depletes.
    pub const fn resource(&self) -> ResourceKind {
        match self {
            Self::Psychic => ResourceKind::Morale,
            _ => ResourceKind::Health,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeaponKind {
    Melee,
    Ranged,
}

/// Summary of an equipped weapon, as derived by the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponSummary {
    pub item: ItemId,
    pub name: String,
    pub kind: WeaponKind,
    /// Flat damage added to a successful hit.
    pub damage: i32,
    pub damage_type: DamageType,
    /// Action points a strike with this weapon costs.
    pub action_cost: i32,
    /// Reach for melee weapons, maximum range for ranged ones.
    pub range: u32,
    pub scaling: Vec<Ability>,
    pub enchantment: i32,
    /// Ammunition kind this weapon loads, if any.
    pub ammunition: Option<String>,
    pub two_handed: bool,
}

/// Equipped weapons in each hand.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquippedWeapons {
    pub main_hand: Option<WeaponSummary>,
    pub off_hand: Option<WeaponSummary>,
}

impl EquippedWeapons {
    /// Returns the first equipped weapon of the given kind, main hand first.
    pub fn first_of(&self, kind: WeaponKind) -> Option<&WeaponSummary> {
        self.main_hand
            .iter()
            .chain(self.off_hand.iter())
            .find(|weapon| weapon.kind == kind)
    }

    /// Number of hands currently free.
    pub fn free_hands(&self) -> u8 {
        match (&self.main_hand, &self.off_hand) {
            (Some(main), _) if main.two_handed => 0,
            (Some(_), Some(_)) => 0,
            (Some(_), None) | (None, Some(_)) => 1,
            (None, None) => 2,
        }
    }
}

/// A stack of identical inventory items (arrows, potions).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryStack {
    pub item: ItemId,
    pub name: String,
    /// Category used for matching, e.g. the ammunition kind a bow loads.
    pub category: String,
    pub quantity: u32,
}

/// Read-only view of an actor at the moment an action is used.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub name: String,
    pub abilities: BTreeMap<Ability, i32>,
    pub skills: BTreeMap<String, i32>,
    pub resources: BTreeMap<ResourceKind, i32>,
    /// Defense scores keyed by component ("armor", "dodge", "will", ...).
    pub defenses: BTreeMap<String, i32>,
    pub resistances: BTreeMap<DamageType, i32>,
    pub weapons: EquippedWeapons,
    pub inventory: Vec<InventoryStack>,
    /// Names of active status effects.
    pub statuses: BTreeSet<String>,
    /// Number of enemies engaging this actor, supplied by the engagement subsystem.
    pub flanked_by: u8,
}

impl ActorSnapshot {
    pub fn new(id: ActorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn ability(&self, ability: Ability) -> i32 {
        self.abilities.get(&ability).copied().unwrap_or(0)
    }

    pub fn skill(&self, skill: &str) -> i32 {
        self.skills.get(skill).copied().unwrap_or(0)
    }

    pub fn resource(&self, resource: ResourceKind) -> i32 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }

    pub fn defense(&self, component: &str) -> i32 {
        self.defenses.get(component).copied().unwrap_or(0)
    }

    pub fn resistance(&self, damage_type: DamageType) -> i32 {
        self.resistances.get(&damage_type).copied().unwrap_or(0)
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.statuses.contains(status)
    }

    pub fn is_flanked(&self) -> bool {
        self.flanked_by > 1
    }

    /// Inventory stacks of a category that still hold at least one item.
    pub fn stacks_of<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a InventoryStack> {
        self.inventory
            .iter()
            .filter(move |stack| stack.category == category && stack.quantity > 0)
    }

    // ===== builder helpers (fixtures, content tools) =====

    #[must_use]
    pub fn with_ability(mut self, ability: Ability, score: i32) -> Self {
        self.abilities.insert(ability, score);
        self
    }

    #[must_use]
    pub fn with_skill(mut self, skill: impl Into<String>, rank: i32) -> Self {
        self.skills.insert(skill.into(), rank);
        self
    }

    #[must_use]
    pub fn with_resource(mut self, resource: ResourceKind, value: i32) -> Self {
        self.resources.insert(resource, value);
        self
    }

    #[must_use]
    pub fn with_defense(mut self, component: impl Into<String>, value: i32) -> Self {
        self.defenses.insert(component.into(), value);
        self
    }

    #[must_use]
    pub fn with_main_hand(mut self, weapon: WeaponSummary) -> Self {
        self.weapons.main_hand = Some(weapon);
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: InventoryStack) -> Self {
        self.inventory.push(stack);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.statuses.insert(status.into());
        self
    }
}
