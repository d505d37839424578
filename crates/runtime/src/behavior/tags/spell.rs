//! Spells roll an arcana check against the target's will.

use async_trait::async_trait;
use tactics_core::{
    ActionError, ActorSnapshot, DamageType, Outcome, PhaseSet, RollAgainst, StatusTone,
    UsageFlags,
};

use crate::behavior::{ActionContext, TagBehavior};

#[derive(Debug, Clone, Copy)]
pub struct SpellTag;

impl SpellTag {
    pub const SKILL: &'static str = "arcana";
    pub const DEFENSE: &'static str = "will";
    /// Damage type when no damage-type tag names one.
    pub const DAMAGE_TYPE: DamageType = DamageType::Psychic;
}

#[async_trait]
impl TagBehavior for SpellTag {
    fn name(&self) -> &'static str {
        "spell"
    }

    fn phases(&self) -> PhaseSet {
        PhaseSet::PREPARE | PhaseSet::ROLL | PhaseSet::POST_ACTIVATE
    }

    async fn prepare(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let usage = &mut cx.action.usage;
        usage.flags |= UsageFlags::SPELL;
        usage.skill = Some(Self::SKILL.to_owned());
        usage.against = RollAgainst::Defense(Self::DEFENSE.to_owned());
        if usage.damage.base > 0 {
            usage.flags |= UsageFlags::HARMFUL;
        }
        Ok(())
    }

    async fn roll(
        &self,
        cx: &mut ActionContext<'_>,
        target: &ActorSnapshot,
        outcome: &mut Outcome,
    ) -> Result<(), ActionError> {
        let roll = cx.roll_against(target).await?;
        outcome.rolls.push(roll);
        Ok(())
    }

    async fn post_activate(
        &self,
        cx: &mut ActionContext<'_>,
        target: &ActorSnapshot,
        outcome: &mut Outcome,
    ) -> Result<(), ActionError> {
        if !outcome.is_hit() {
            outcome.push_status("Resisted", StatusTone::Neutral);
            return Ok(());
        }
        let usage = &cx.action.usage;
        if usage.damage.base <= 0 {
            return Ok(());
        }

        let damage_type = usage.damage.damage_type.unwrap_or(Self::DAMAGE_TYPE);
        let mut damage = usage.damage;
        damage.bonus += usage.target(target.id).map_or(0, |t| t.bonus_damage);
        let resistance = target.resistance(damage_type);
        let dealt: i32 = outcome
            .rolls
            .iter()
            .map(|roll| damage.dealt_by(roll, resistance))
            .sum();

        if dealt > 0 {
            let resource = damage_type.resource();
            outcome.resources.add(resource, -dealt);
            outcome.push_status(format!("-{dealt} {resource}"), StatusTone::Damage);
        }
        Ok(())
    }
}
