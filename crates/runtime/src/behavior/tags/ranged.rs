//! Ranged weapon mode. Propagates `ammunition` through the catalog.

use async_trait::async_trait;
use tactics_core::{ActionError, PhaseSet, UsageFlags, WeaponKind};

use crate::behavior::{ActionContext, TagBehavior};

#[derive(Debug, Clone, Copy)]
pub struct RangedTag;

#[async_trait]
impl TagBehavior for RangedTag {
    fn name(&self) -> &'static str {
        "ranged"
    }

    fn phases(&self) -> PhaseSet {
        PhaseSet::PREPARE | PhaseSet::CAN_USE
    }

    async fn prepare(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let usage = &mut cx.action.usage;
        usage.flags |= UsageFlags::RANGED;
        usage.weapon = cx.actor.weapons.first_of(WeaponKind::Ranged).cloned();
        Ok(())
    }

    async fn can_use(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        if cx.action.usage.weapon.is_none() {
            return Err(ActionError::precondition(
                self.name(),
                "no ranged weapon equipped",
            ));
        }
        Ok(())
    }
}
