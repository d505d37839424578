//! Per-invocation working object built from an action definition.

use std::sync::Arc;

use crate::actor::{Ability, ActorId, ActorSnapshot};
use crate::config::RulesConfig;
use crate::dice::{DicePool, RollBonuses};
use crate::tag::{Phase, RegistryError, ResolvedTags, TagRegistry};

use super::definition::{
    ActionCost, ActionDefinition, ActionId, ActionRange, EffectTemplate, TargetSpec,
};
use super::error::ActionError;
use super::usage::ActionUsage;

/// One use of an action by one actor.
///
/// The resolved tag set is fixed at construction. Everything else (cost,
/// range, target shape, scaling, usage, effects) starts from the definition
/// and is rewritten by tag phases; [`ActionInstance::reset`] restores it.
#[derive(Clone, Debug)]
pub struct ActionInstance {
    definition: Arc<ActionDefinition>,
    tags: ResolvedTags,
    actor: ActorId,
    nonce: u64,
    targets: Vec<ActorId>,
    completed: Option<Phase>,

    pub cost: ActionCost,
    pub range: ActionRange,
    pub target: TargetSpec,
    pub scaling: Vec<Ability>,
    pub effects: Vec<EffectTemplate>,
    pub usage: ActionUsage,
}

impl ActionInstance {
    pub fn new(
        definition: Arc<ActionDefinition>,
        registry: &TagRegistry,
        actor: ActorId,
        nonce: u64,
    ) -> Result<Self, RegistryError> {
        definition.validate(registry)?;
        let tags = registry.resolve(&definition.tags)?;
        let mut instance = Self {
            cost: definition.cost,
            range: definition.range.into(),
            target: definition.target,
            scaling: definition.scaling.clone(),
            effects: definition.effects.clone(),
            usage: ActionUsage::default(),
            definition,
            tags,
            actor,
            nonce,
            targets: Vec::new(),
            completed: None,
        };
        instance.reset();
        Ok(instance)
    }

    /// Restores every mutable field to the definition's values.
    pub fn reset(&mut self) {
        self.cost = self.definition.cost;
        self.range = self.definition.range.into();
        self.target = self.definition.target;
        self.scaling.clone_from(&self.definition.scaling);
        self.effects.clone_from(&self.definition.effects);
        self.usage = ActionUsage::default();
        self.usage.damage.base = self.definition.damage;
    }

    /// Marks `phase` as entered.
    ///
    /// `initialize` may run again any time before `canUse`, which is how a
    /// display refresh re-runs `prepare`. Every other phase must directly
    /// follow the one before it.
    pub fn advance(&mut self, phase: Phase) -> Result<(), ActionError> {
        let allowed = match phase {
            Phase::Initialize => self.completed.is_none_or(|done| done <= Phase::Prepare),
            Phase::Confirm => false,
            _ => self.completed == phase.previous(),
        };
        if !allowed {
            return Err(ActionError::OutOfOrder {
                phase,
                completed: self.completed.unwrap_or(Phase::Initialize),
            });
        }
        self.completed = Some(phase);
        Ok(())
    }

    /// Last phase entered.
    pub fn completed(&self) -> Option<Phase> {
        self.completed
    }

    pub fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    pub fn id(&self) -> &ActionId {
        &self.definition.id
    }

    /// Resolved tags in execution order.
    pub fn tags(&self) -> &ResolvedTags {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn targets(&self) -> &[ActorId] {
        &self.targets
    }

    pub fn set_targets(&mut self, targets: impl IntoIterator<Item = ActorId>) {
        self.targets.clear();
        for target in targets {
            if !self.targets.contains(&target) {
                self.targets.push(target);
            }
        }
    }

    /// Dice pool against one target, from global and target-specific ledgers.
    pub fn pool_against(&self, target: ActorId, rules: &RulesConfig) -> DicePool {
        DicePool::new(
            self.usage.boons_against(target),
            self.usage.banes_against(target),
            rules,
        )
    }

    /// Ability bonus: the mean of the scaling abilities, rounded up.
    pub fn ability_bonus(&self, actor: &ActorSnapshot) -> i32 {
        if self.scaling.is_empty() {
            return 0;
        }
        let count = self.scaling.len() as i32;
        let sum: i32 = self.scaling.iter().map(|a| actor.ability(*a)).sum();
        sum.div_euclid(count) + i32::from(sum.rem_euclid(count) != 0)
    }

    /// Unbounded bonuses for a roll; bounds are applied when the roll is evaluated.
    pub fn roll_bonuses(&self, actor: &ActorSnapshot) -> RollBonuses {
        let skill = self
            .usage
            .skill
            .as_deref()
            .map_or(0, |skill| actor.skill(skill));
        RollBonuses {
            ability: self.ability_bonus(actor) + self.usage.bonuses.ability,
            skill: skill + self.usage.bonuses.skill,
            enchantment: self.usage.bonuses.enchantment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::definition::RangeSpec;
    use crate::tag::{Priority, TagDescriptor};

    fn registry() -> TagRegistry {
        TagRegistry::new([
            TagDescriptor::new("melee"),
            TagDescriptor::new("strike").with_priority(Priority::LAST),
        ])
        .unwrap()
    }

    fn strike() -> Arc<ActionDefinition> {
        Arc::new(
            ActionDefinition::new("strike", "Strike")
                .with_tags(["strike", "melee"])
                .with_range(RangeSpec::Weapon)
                .with_scaling([Ability::Strength, Ability::Dexterity]),
        )
    }

    #[test]
    fn tags_resolve_in_priority_order() {
        let instance = ActionInstance::new(strike(), &registry(), ActorId(1), 0).unwrap();
        let order: Vec<_> = instance.tags().iter().map(|t| t.as_str()).collect();
        assert_eq!(order, ["melee", "strike"]);
    }

    #[test]
    fn reset_discards_tag_writes() {
        let mut instance = ActionInstance::new(strike(), &registry(), ActorId(1), 0).unwrap();
        instance.cost.action = 3;
        instance.usage.boons.set("aim", 2);
        instance.scaling.clear();

        instance.reset();

        assert_eq!(instance.cost, ActionCost::default());
        assert!(instance.usage.boons.is_empty());
        assert_eq!(instance.scaling.len(), 2);
    }

    #[test]
    fn ability_bonus_rounds_the_mean_up() {
        let instance = ActionInstance::new(strike(), &registry(), ActorId(1), 0).unwrap();
        let actor = ActorSnapshot::new(ActorId(1), "Rook")
            .with_ability(Ability::Strength, 5)
            .with_ability(Ability::Dexterity, 2);
        assert_eq!(instance.ability_bonus(&actor), 4);
    }

    #[test]
    fn phases_only_advance_in_order() {
        let mut instance = ActionInstance::new(strike(), &registry(), ActorId(1), 0).unwrap();
        assert!(instance.advance(Phase::Prepare).is_err());

        instance.advance(Phase::Initialize).unwrap();
        instance.advance(Phase::Prepare).unwrap();
        // refreshing the display re-runs the first two phases
        instance.advance(Phase::Initialize).unwrap();
        instance.advance(Phase::Prepare).unwrap();
        instance.advance(Phase::CanUse).unwrap();

        assert!(instance.advance(Phase::Initialize).is_err());
        assert!(matches!(
            instance.advance(Phase::Roll),
            Err(ActionError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn targets_are_deduplicated_in_order() {
        let mut instance = ActionInstance::new(strike(), &registry(), ActorId(1), 0).unwrap();
        instance.set_targets([ActorId(3), ActorId(2), ActorId(3)]);
        assert_eq!(instance.targets(), [ActorId(3), ActorId(2)]);
    }

    #[test]
    fn pool_reads_target_specific_boons() {
        let rules = RulesConfig::default();
        let mut instance = ActionInstance::new(strike(), &registry(), ActorId(1), 0).unwrap();
        instance.usage.target_mut(ActorId(2)).boons.set("flanking", 1);

        assert_eq!(instance.pool_against(ActorId(2), &rules).faces(), [10, 8, 8]);
        assert_eq!(instance.pool_against(ActorId(3), &rules).faces(), [8, 8, 8]);
    }
}
