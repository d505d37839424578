//! Typed scratch space shared by the tags of one action instance.
//!
//! Each field is a named channel one tag writes and later tags read. The
//! executor guarantees ordering, so a tag may rely on every lower-priority
//! tag having already written its channels for the current phase.

use std::collections::BTreeMap;

use bitflags::bitflags;

use crate::actor::{ActorId, DamageType, ItemId, WeaponSummary};
use crate::dice::{RollBonuses, RollResult};

bitflags! {
    /// Attack-mode flags raised by tags during `prepare`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct UsageFlags: u16 {
        const MELEE    = 1 << 0;
        const RANGED   = 1 << 1;
        const REACTION = 1 << 2;
        /// Deals damage; the roll phase must produce at least one roll per target.
        const HARMFUL  = 1 << 3;
        const SPELL    = 1 << 4;
        const CONSUMES = 1 << 5;
    }
}

/// Boon or bane counts keyed by the source that granted them.
///
/// Setting a source replaces its previous count, so a `prepare` that runs
/// twice never double counts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ModifierLedger(BTreeMap<String, u8>);

impl ModifierLedger {
    pub fn set(&mut self, source: impl Into<String>, count: u8) {
        let source = source.into();
        if count == 0 {
            self.0.remove(&source);
        } else {
            self.0.insert(source, count);
        }
    }

    pub fn get(&self, source: &str) -> u8 {
        self.0.get(source).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u8 {
        self.0.values().fold(0u8, |sum, count| sum.saturating_add(*count))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(source, count)| (source.as_str(), *count))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Modifiers that only apply against one target, written during `configure`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetUsage {
    pub boons: ModifierLedger,
    pub banes: ModifierLedger,
    pub bonus_damage: i32,
}

/// Damage parameters, finalized by the strike tag and read by damage-type tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageUsage {
    pub base: i32,
    pub multiplier: i32,
    pub bonus: i32,
    pub damage_type: Option<DamageType>,
}

impl Default for DamageUsage {
    fn default() -> Self {
        Self {
            base: 0,
            multiplier: 1,
            bonus: 0,
            damage_type: None,
        }
    }
}

impl DamageUsage {
    /// Damage dealt by one roll after resistance.
    ///
    /// Every point of margin above the DC adds `multiplier`. A partial hit
    /// deals its tier's share, rounded down but never below one.
    pub fn dealt_by(&self, roll: &RollResult, resistance: i32) -> i32 {
        let percent = i32::from(roll.damage_percent());
        if percent == 0 {
            return 0;
        }
        let raw = self.base + self.bonus + self.multiplier * roll.margin().max(0);
        let full = (raw - resistance).max(1);
        (full * percent / 100).max(1)
    }
}

/// Defense an action rolls against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RollAgainst {
    /// The tiered physical defense table.
    #[default]
    Physical,
    /// A single named defense score, e.g. `"will"`.
    Defense(String),
}

/// Item set aside in `preActivate`, consumed on confirm.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Consumption {
    pub item: ItemId,
    pub name: String,
    pub quantity: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActionUsage {
    pub flags: UsageFlags,
    /// Weapon selected by a weapon-mode tag.
    pub weapon: Option<WeaponSummary>,
    /// One roll per entry per target.
    pub strikes: Vec<WeaponSummary>,
    pub boons: ModifierLedger,
    pub banes: ModifierLedger,
    pub targets: BTreeMap<ActorId, TargetUsage>,
    /// Skill and enchantment bonuses; the ability bonus comes from scaling.
    pub bonuses: RollBonuses,
    pub damage: DamageUsage,
    pub against: RollAgainst,
    /// Skill rank added to checks, e.g. `"arcana"`.
    pub skill: Option<String>,
    pub consumed: Option<Consumption>,
}

impl ActionUsage {
    pub fn target(&self, target: ActorId) -> Option<&TargetUsage> {
        self.targets.get(&target)
    }

    pub fn target_mut(&mut self, target: ActorId) -> &mut TargetUsage {
        self.targets.entry(target).or_default()
    }

    /// Global plus target-specific boons.
    pub fn boons_against(&self, target: ActorId) -> u8 {
        let local = self.target(target).map_or(0, |usage| usage.boons.total());
        self.boons.total().saturating_add(local)
    }

    /// Global plus target-specific banes.
    pub fn banes_against(&self, target: ActorId) -> u8 {
        let local = self.target(target).map_or(0, |usage| usage.banes.total());
        self.banes.total().saturating_add(local)
    }

    pub fn is_harmful(&self) -> bool {
        self.flags.contains(UsageFlags::HARMFUL)
    }
}
