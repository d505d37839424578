use async_trait::async_trait;
use tactics_core::{ActionError, DamageType, PhaseSet};

use crate::behavior::{ActionContext, TagBehavior};

/// Forces the damage type of the action, overriding the weapon's.
#[derive(Debug, Clone, Copy)]
pub struct DamageTypeTag(pub DamageType);

#[async_trait]
impl TagBehavior for DamageTypeTag {
    fn name(&self) -> &'static str {
        self.0.into()
    }

    fn phases(&self) -> PhaseSet {
        PhaseSet::PREPARE
    }

    async fn prepare(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        cx.action.usage.damage.damage_type = Some(self.0);
        Ok(())
    }
}
