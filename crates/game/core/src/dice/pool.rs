//! Three-die pool shaped by boons and banes.

use crate::config::RulesConfig;

/// Number of dice in every pool.
pub const POOL_SIZE: usize = 3;

/// Face counts of the three dice, left to right, plus the counts that shaped them.
///
/// Boons walk left to right: each one raises the current die by one step until
/// it reaches the maximum face count, then the next die becomes the target.
/// Banes walk right to left toward the minimum face count. Both counts are
/// clamped before shaping, so the triple is a pure function of (boons, banes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DicePool {
    faces: [u8; POOL_SIZE],
    boons: u8,
    banes: u8,
}

impl DicePool {
    /// Builds a pool from raw boon and bane counts.
    pub fn new(boons: u8, banes: u8, rules: &RulesConfig) -> Self {
        let boons = boons.min(rules.max_boons);
        let banes = banes.min(rules.max_boons);
        let mut faces = [rules.starting_faces; POOL_SIZE];

        let mut target = 0;
        for _ in 0..boons {
            while target < POOL_SIZE && faces[target] >= rules.max_faces {
                target += 1;
            }
            let Some(face) = faces.get_mut(target) else {
                break;
            };
            *face = face.saturating_add(rules.face_step).min(rules.max_faces);
        }

        let mut target = POOL_SIZE;
        for _ in 0..banes {
            while target > 0 && faces[target - 1] <= rules.min_faces {
                target -= 1;
            }
            if target == 0 {
                break;
            }
            let face = &mut faces[target - 1];
            *face = face.saturating_sub(rules.face_step).max(rules.min_faces);
        }

        Self {
            faces,
            boons,
            banes,
        }
    }

    /// Unmodified pool (no boons, no banes).
    pub fn standard(rules: &RulesConfig) -> Self {
        Self::new(0, 0, rules)
    }

    pub fn faces(&self) -> [u8; POOL_SIZE] {
        self.faces
    }

    /// Boons actually applied (after clamping).
    pub fn boons(&self) -> u8 {
        self.boons
    }

    /// Banes actually applied (after clamping).
    pub fn banes(&self) -> u8 {
        self.banes
    }

    /// Returns true if every rolled face fits the die it was rolled on.
    pub fn accepts(&self, rolled: &[u8; POOL_SIZE]) -> bool {
        rolled
            .iter()
            .zip(self.faces.iter())
            .all(|(value, faces)| (1..=*faces).contains(value))
    }

    /// Highest total the dice alone can produce.
    pub fn max_total(&self) -> i32 {
        self.faces.iter().map(|f| i32::from(*f)).sum()
    }

    /// Display formula, e.g. `1d12 + 1d10 + 1d8`.
    pub fn formula(&self) -> String {
        self.faces
            .iter()
            .map(|faces| format!("1d{faces}"))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}
