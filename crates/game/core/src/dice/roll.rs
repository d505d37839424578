//! Roll totals and degree resolution.

use crate::actor::ActorSnapshot;
use crate::config::RulesConfig;

use super::defense::{DefenseHit, DefenseTable, TierEffect};
use super::pool::{DicePool, POOL_SIZE};

/// Flat bonuses added to the dice, each bounded by [`RulesConfig`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollBonuses {
    pub ability: i32,
    pub skill: i32,
    pub enchantment: i32,
}

impl RollBonuses {
    /// Clamps each component to its configured bounds.
    pub fn bounded(self, rules: &RulesConfig) -> Self {
        Self {
            ability: rules.ability_bonus.clamp(self.ability),
            skill: rules.skill_bonus.clamp(self.skill),
            enchantment: rules.enchantment_bonus.clamp(self.enchantment),
        }
    }

    pub fn total(&self) -> i32 {
        self.ability + self.skill + self.enchantment
    }
}

/// Ordered result degree.
///
/// `Partial` sits between failure and success; its rank comes from the defense
/// tier that turned the attack, so any number of partial tiers orders correctly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Degree {
    CriticalFailure,
    Failure,
    Partial { rank: u8 },
    Success,
    CriticalSuccess,
}

impl Degree {
    /// Degree of a plain check: critical when the total is `margin` or more away from the DC.
    pub fn of(total: i32, dc: i32, margin: i32) -> Self {
        if total >= dc + margin {
            Self::CriticalSuccess
        } else if total >= dc {
            Self::Success
        } else if total <= dc - margin {
            Self::CriticalFailure
        } else {
            Self::Failure
        }
    }

    /// Full or partial hits.
    pub const fn is_hit(&self) -> bool {
        matches!(
            self,
            Self::Partial { .. } | Self::Success | Self::CriticalSuccess
        )
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::CriticalSuccess)
    }

    pub const fn is_critical(&self) -> bool {
        matches!(self, Self::CriticalSuccess | Self::CriticalFailure)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::CriticalFailure => "Critical Failure",
            Self::Failure => "Failure",
            Self::Partial { .. } => "Partial",
            Self::Success => "Success",
            Self::CriticalSuccess => "Critical Success",
        }
    }
}

/// An evaluated roll. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollResult {
    pub pool: DicePool,
    pub dice: [u8; POOL_SIZE],
    pub bonuses: RollBonuses,
    pub dc: i32,
    pub total: i32,
    pub degree: Degree,
    /// Defense tier that turned an attack roll, if any.
    pub defense: Option<DefenseHit>,
}

impl RollResult {
    /// Evaluates a plain check against a DC.
    pub fn check(
        pool: DicePool,
        dice: [u8; POOL_SIZE],
        bonuses: RollBonuses,
        dc: i32,
        rules: &RulesConfig,
    ) -> Self {
        let bonuses = bonuses.bounded(rules);
        let total = Self::sum(&dice) + bonuses.total();
        Self {
            pool,
            dice,
            bonuses,
            dc,
            total,
            degree: Degree::of(total, dc, rules.critical_margin),
            defense: None,
        }
    }

    /// Evaluates an attack roll against the target's physical defense tiers.
    ///
    /// A total at or above the physical DC is a success (critical past the margin).
    /// Below it, the shortfall picks a tier: a partial tier yields
    /// [`Degree::Partial`], an avoiding tier yields a failure (critical past the margin).
    pub fn attack(
        pool: DicePool,
        dice: [u8; POOL_SIZE],
        bonuses: RollBonuses,
        target: &ActorSnapshot,
        table: &DefenseTable,
        rules: &RulesConfig,
    ) -> Self {
        let bonuses = bonuses.bounded(rules);
        let total = Self::sum(&dice) + bonuses.total();
        let dc = table.physical_dc(target);

        if total >= dc {
            return Self {
                pool,
                dice,
                bonuses,
                dc,
                total,
                degree: Degree::of(total, dc, rules.critical_margin),
                defense: None,
            };
        }

        let defense = table.turned_by(dc - total, target);
        let degree = match &defense {
            Some(hit) => match hit.effect {
                TierEffect::Partial { .. } => Degree::Partial { rank: hit.rank },
                TierEffect::Avoid => Degree::of(total, dc, rules.critical_margin),
            },
            None => Degree::of(total, dc, rules.critical_margin),
        };

        Self {
            pool,
            dice,
            bonuses,
            dc,
            total,
            degree,
            defense,
        }
    }

    fn sum(dice: &[u8; POOL_SIZE]) -> i32 {
        dice.iter().map(|d| i32::from(*d)).sum()
    }

    /// Signed distance from the DC.
    pub fn margin(&self) -> i32 {
        self.total - self.dc
    }

    /// Percentage of damage that gets through, given the degree.
    pub fn damage_percent(&self) -> u8 {
        match (&self.degree, &self.defense) {
            (Degree::Success | Degree::CriticalSuccess, _) => 100,
            (Degree::Partial { .. }, Some(hit)) => match hit.effect {
                TierEffect::Partial { damage_percent } => damage_percent,
                TierEffect::Avoid => 0,
            },
            _ => 0,
        }
    }
}
