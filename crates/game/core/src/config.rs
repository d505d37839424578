/// Rules constants and tunable parameters for dice and roll resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RulesConfig {
    /// Face count every die in the pool starts with.
    pub starting_faces: u8,
    /// Largest face count a boon can raise a die to.
    pub max_faces: u8,
    /// Smallest face count a bane can lower a die to.
    pub min_faces: u8,
    /// Faces added (boon) or removed (bane) per step.
    pub face_step: u8,
    /// Boons and banes are each clamped to this count before shaping the pool.
    pub max_boons: u8,
    /// Distance from the DC at which a result becomes critical.
    pub critical_margin: i32,
    pub ability_bonus: BonusBounds,
    pub skill_bonus: BonusBounds,
    pub enchantment_bonus: BonusBounds,
    /// Iteration guard for propagation closure over malformed catalogs.
    pub max_propagation_depth: usize,
}

/// Inclusive bounds for one roll bonus component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BonusBounds {
    pub min: i32,
    pub max: i32,
}

impl BonusBounds {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

impl RulesConfig {
    // ===== dice pool =====
    pub const DEFAULT_STARTING_FACES: u8 = 8;
    pub const DEFAULT_MAX_FACES: u8 = 12;
    pub const DEFAULT_MIN_FACES: u8 = 4;
    pub const DEFAULT_FACE_STEP: u8 = 2;
    pub const DEFAULT_MAX_BOONS: u8 = 6;

    // ===== resolution =====
    pub const DEFAULT_CRITICAL_MARGIN: i32 = 5;
    pub const DEFAULT_ABILITY_BONUS: BonusBounds = BonusBounds::new(0, 12);
    pub const DEFAULT_SKILL_BONUS: BonusBounds = BonusBounds::new(-4, 12);
    pub const DEFAULT_ENCHANTMENT_BONUS: BonusBounds = BonusBounds::new(0, 6);

    // ===== content =====
    pub const DEFAULT_MAX_PROPAGATION_DEPTH: usize = 32;

    pub fn new() -> Self {
        Self {
            starting_faces: Self::DEFAULT_STARTING_FACES,
            max_faces: Self::DEFAULT_MAX_FACES,
            min_faces: Self::DEFAULT_MIN_FACES,
            face_step: Self::DEFAULT_FACE_STEP,
            max_boons: Self::DEFAULT_MAX_BOONS,
            critical_margin: Self::DEFAULT_CRITICAL_MARGIN,
            ability_bonus: Self::DEFAULT_ABILITY_BONUS,
            skill_bonus: Self::DEFAULT_SKILL_BONUS,
            enchantment_bonus: Self::DEFAULT_ENCHANTMENT_BONUS,
            max_propagation_depth: Self::DEFAULT_MAX_PROPAGATION_DEPTH,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::new()
    }
}
