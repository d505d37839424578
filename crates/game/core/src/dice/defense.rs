//! Data-driven physical defense tiers for attack rolls.
//!
//! An attack roll is compared against the sum of the target's physical defense
//! components. When it falls short, the shortfall is walked through the tier
//! table from the innermost tier outward: the first tier whose cumulative score
//! covers the shortfall is the one that turned the attack. Tiers either stop the
//! attack outright or let a partial hit through. The number of tiers and what
//! each one does come entirely from content.

use crate::actor::ActorSnapshot;

/// What happens when an attack is turned by a tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum TierEffect {
    /// The attack is avoided entirely.
    Avoid,
    /// The attack lands for a fraction of its damage.
    Partial { damage_percent: u8 },
}

/// One layer of physical defense.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefenseTier {
    /// Stable identifier, e.g. `"glance"`.
    pub id: String,
    /// Text shown on the roll breakdown, e.g. `"Glance"`.
    pub label: String,
    /// Defense component on the target that backs this tier, e.g. `"armor"`.
    pub component: String,
    pub effect: TierEffect,
}

/// Tier that turned an attack, recorded on the roll for display.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefenseHit {
    pub tier: String,
    pub label: String,
    pub effect: TierEffect,
    /// Rank among tiers, innermost tier highest. Orders partial degrees.
    pub rank: u8,
}

/// Ordered physical defense tiers, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DefenseTable {
    tiers: Vec<DefenseTier>,
}

impl DefenseTable {
    pub fn new(tiers: Vec<DefenseTier>) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &[DefenseTier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Physical DC of a target: the sum of every tier component (negatives count as zero).
    pub fn physical_dc(&self, target: &ActorSnapshot) -> i32 {
        self.tiers
            .iter()
            .map(|tier| target.defense(&tier.component).max(0))
            .sum()
    }

    /// Finds the tier that absorbs `shortfall` points (`shortfall > 0`).
    ///
    /// A shortfall larger than every tier combined is credited to the outermost tier.
    pub fn turned_by(&self, shortfall: i32, target: &ActorSnapshot) -> Option<DefenseHit> {
        let count = self.tiers.len();
        let mut covered = 0;
        for (index, tier) in self.tiers.iter().enumerate() {
            covered += target.defense(&tier.component).max(0);
            if covered >= shortfall || index + 1 == count {
                return Some(DefenseHit {
                    tier: tier.id.clone(),
                    label: tier.label.clone(),
                    effect: tier.effect,
                    rank: u8::try_from(count - index).unwrap_or(u8::MAX),
                });
            }
        }
        None
    }
}
