//! Dice pool engine.
//!
//! - `pool`: three-die pool reshaped by boons and banes
//! - `roll`: bounded bonuses, totals and ordered degrees
//! - `defense`: data-driven physical defense tiers for attack rolls

pub mod defense;
pub mod pool;
pub mod roll;

pub use defense::{DefenseHit, DefenseTable, DefenseTier, TierEffect};
pub use pool::{DicePool, POOL_SIZE};
pub use roll::{Degree, RollBonuses, RollResult};
