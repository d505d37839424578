//! One boon against a target engaged by more than one enemy.

use async_trait::async_trait;
use tactics_core::{ActionError, ActorSnapshot, PhaseSet};

use crate::behavior::{ActionContext, TagBehavior};

#[derive(Debug, Clone, Copy)]
pub struct FlankingTag;

impl FlankingTag {
    pub const BOONS: u8 = 1;
}

#[async_trait]
impl TagBehavior for FlankingTag {
    fn name(&self) -> &'static str {
        "flanking"
    }

    fn phases(&self) -> PhaseSet {
        PhaseSet::CONFIGURE
    }

    async fn configure(
        &self,
        cx: &mut ActionContext<'_>,
        target: &ActorSnapshot,
    ) -> Result<(), ActionError> {
        let boons = if target.is_flanked() { Self::BOONS } else { 0 };
        cx.action
            .usage
            .target_mut(target.id)
            .boons
            .set(self.name(), boons);
        Ok(())
    }
}
