//! Ammunition loading for weapons that fire it.
//!
//! Internal tag, pulled in by `ranged`. The stack is chosen in `preActivate`
//! (prompting when several match) and only consumed on confirm, so a reverse
//! puts the same quantity back.

use async_trait::async_trait;
use tactics_core::{ActionError, ActorUpdate, Consumption, PhaseSet, UsageFlags};

use crate::behavior::{ActionContext, ConfirmContext, TagBehavior};

#[derive(Debug, Clone, Copy)]
pub struct AmmunitionTag;

impl AmmunitionTag {
    /// Items spent per shot.
    pub const PER_SHOT: u32 = 1;
}

#[async_trait]
impl TagBehavior for AmmunitionTag {
    fn name(&self) -> &'static str {
        "ammunition"
    }

    fn phases(&self) -> PhaseSet {
        PhaseSet::PREPARE | PhaseSet::CAN_USE | PhaseSet::PRE_ACTIVATE | PhaseSet::CONFIRM
    }

    async fn prepare(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let usage = &mut cx.action.usage;
        if usage
            .weapon
            .as_ref()
            .is_some_and(|weapon| weapon.ammunition.is_some())
        {
            usage.flags |= UsageFlags::CONSUMES;
        }
        Ok(())
    }

    async fn can_use(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let Some(kind) = ammunition_kind(cx) else {
            return Ok(());
        };
        if cx.actor.stacks_of(&kind).next().is_none() {
            return Err(ActionError::precondition(
                self.name(),
                format!("out of {kind}"),
            ));
        }
        Ok(())
    }

    async fn pre_activate(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let Some(kind) = ammunition_kind(cx) else {
            return Ok(());
        };
        let stacks: Vec<_> = cx.actor.stacks_of(&kind).cloned().collect();

        let chosen = match stacks.as_slice() {
            [] => {
                return Err(ActionError::precondition(
                    self.name(),
                    format!("out of {kind}"),
                ));
            }
            [only] => only,
            many => {
                let options = many
                    .iter()
                    .map(|stack| format!("{} ({})", stack.name, stack.quantity))
                    .collect();
                match cx.choose("Choose ammunition", options).await? {
                    Some(index) => &many[index],
                    None => {
                        return Err(ActionError::precondition(
                            self.name(),
                            "no ammunition chosen",
                        ));
                    }
                }
            }
        };

        cx.action.usage.consumed = Some(Consumption {
            item: chosen.item,
            name: chosen.name.clone(),
            quantity: Self::PER_SHOT,
        });
        Ok(())
    }

    async fn confirm(&self, cx: &mut ConfirmContext<'_>) -> Result<(), ActionError> {
        let record = cx.record;
        if let Some(consumed) = &record.usage.consumed {
            let update = ActorUpdate::ConsumeItem {
                item: consumed.item,
                quantity: consumed.quantity,
            };
            cx.apply(record.actor, update);
        }
        Ok(())
    }
}

fn ammunition_kind(cx: &ActionContext<'_>) -> Option<String> {
    if !cx.action.usage.flags.contains(UsageFlags::CONSUMES) {
        return None;
    }
    cx.action
        .usage
        .weapon
        .as_ref()
        .and_then(|weapon| weapon.ammunition.clone())
}
