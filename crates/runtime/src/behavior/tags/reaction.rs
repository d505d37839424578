//! Out-of-turn actions: free to use, once per round.

use async_trait::async_trait;
use tactics_core::{ActionError, ActorUpdate, PhaseSet, UsageFlags};

use crate::behavior::{ActionContext, ConfirmContext, TagBehavior};

/// Status marking an actor that has spent its reaction this round.
pub const REACTION_USED: &str = "reaction-used";

#[derive(Debug, Clone, Copy)]
pub struct ReactionTag;

#[async_trait]
impl TagBehavior for ReactionTag {
    fn name(&self) -> &'static str {
        "reaction"
    }

    fn phases(&self) -> PhaseSet {
        PhaseSet::PREPARE | PhaseSet::CAN_USE | PhaseSet::CONFIRM
    }

    async fn prepare(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        cx.action.usage.flags |= UsageFlags::REACTION;
        cx.action.cost.action = 0;
        Ok(())
    }

    async fn can_use(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        if cx.actor.has_status(REACTION_USED) {
            return Err(ActionError::precondition(
                self.name(),
                "reaction already used this round",
            ));
        }
        Ok(())
    }

    async fn confirm(&self, cx: &mut ConfirmContext<'_>) -> Result<(), ActionError> {
        let update = ActorUpdate::AddStatus {
            status: REACTION_USED.to_owned(),
        };
        let actor = cx.record.actor;
        cx.apply(actor, update);
        Ok(())
    }
}
