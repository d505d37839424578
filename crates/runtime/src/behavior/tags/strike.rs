//! Weapon strike. Registered with the always-last priority.
//!
//! Weapon-mode tags pick the weapon during `prepare`; strike then derives
//! cost, range, scaling and damage from it. Each entry in `usage.strikes`
//! rolls once per target against the physical defense tiers.

use async_trait::async_trait;
use tactics_core::{
    ActionError, ActionRange, ActorSnapshot, Outcome, PhaseSet, RangeSpec, StatusTone,
    UsageFlags,
};

use crate::behavior::{ActionContext, TagBehavior};

#[derive(Debug, Clone, Copy)]
pub struct StrikeTag;

#[async_trait]
impl TagBehavior for StrikeTag {
    fn name(&self) -> &'static str {
        "strike"
    }

    fn phases(&self) -> PhaseSet {
        PhaseSet::PREPARE | PhaseSet::CAN_USE | PhaseSet::ROLL | PhaseSet::POST_ACTIVATE
    }

    async fn prepare(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let Some(weapon) = cx.action.usage.weapon.clone() else {
            return Ok(());
        };
        let base_cost = cx.action.definition().cost.action;
        let weapon_range = matches!(cx.action.definition().range, RangeSpec::Weapon);
        let action = &mut *cx.action;

        // reactions are free; their tag zeroed the cost earlier in this phase
        if !action.usage.flags.contains(UsageFlags::REACTION) {
            action.cost.action = base_cost + weapon.action_cost;
        }
        if weapon_range {
            action.range = ActionRange {
                minimum: 0,
                maximum: weapon.range,
            };
        }
        if !weapon.scaling.is_empty() {
            action.scaling.clone_from(&weapon.scaling);
        }

        let usage = &mut action.usage;
        usage.flags |= UsageFlags::HARMFUL;
        usage.damage.base += weapon.damage;
        usage.damage.damage_type.get_or_insert(weapon.damage_type);
        usage.bonuses.enchantment = weapon.enchantment;
        usage.strikes = vec![weapon];
        Ok(())
    }

    async fn can_use(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        if cx.action.usage.strikes.is_empty() {
            return Err(ActionError::precondition(
                self.name(),
                "nothing to strike with",
            ));
        }
        Ok(())
    }

    async fn roll(
        &self,
        cx: &mut ActionContext<'_>,
        target: &ActorSnapshot,
        outcome: &mut Outcome,
    ) -> Result<(), ActionError> {
        let enchantments: Vec<i32> = cx
            .action
            .usage
            .strikes
            .iter()
            .map(|weapon| weapon.enchantment)
            .collect();
        for enchantment in enchantments {
            let roll = cx.attack(target, enchantment).await?;
            outcome.rolls.push(roll);
        }
        Ok(())
    }

    async fn post_activate(
        &self,
        cx: &mut ActionContext<'_>,
        target: &ActorSnapshot,
        outcome: &mut Outcome,
    ) -> Result<(), ActionError> {
        let usage = &cx.action.usage;
        let Some(damage_type) = usage.damage.damage_type else {
            return Err(ActionError::data_integrity(
                self.name(),
                "strike prepared without a damage type",
            ));
        };

        let mut damage = usage.damage;
        damage.bonus += usage.target(target.id).map_or(0, |t| t.bonus_damage);
        let resistance = target.resistance(damage_type);

        let mut dealt = 0;
        let mut turned = Vec::new();
        for roll in &outcome.rolls {
            dealt += damage.dealt_by(roll, resistance);
            match &roll.defense {
                Some(hit) => turned.push(hit.label.clone()),
                None if !roll.degree.is_hit() => turned.push(roll.degree.label().to_owned()),
                None => {}
            }
        }

        for label in turned {
            outcome.push_status(label, StatusTone::Neutral);
        }
        if dealt > 0 {
            let resource = damage_type.resource();
            outcome.resources.add(resource, -dealt);
            outcome.push_status(format!("-{dealt} {resource}"), StatusTone::Damage);
        }
        Ok(())
    }
}
