//! Context objects handed to tag and talent callbacks.
//!
//! [`ActionContext`] bundles the instance being resolved with the read-only
//! inputs and the asynchronous collaborators a phase may need, so behavior
//! signatures stay small and adding a collaborator does not ripple through
//! every tag. [`ConfirmContext`] is its deferred counterpart: it exposes the
//! frozen record and the batch the confirm controller is about to commit.
use tactics_core::{
    ActionError, ActionInstance, ActionRecord, ActorId, ActorSnapshot, ActorUpdate, DefenseTable,
    DicePool, POOL_SIZE, RollAgainst, RollResult, RulesConfig,
};

use crate::api::{DiceRoller, PromptRequest, Prompter, RollRequest};
use crate::repository::CommitBatch;

/// Everything a lifecycle phase can see and touch.
pub struct ActionContext<'a> {
    /// The instance being resolved. Tags write their channels here.
    pub action: &'a mut ActionInstance,
    pub actor: &'a ActorSnapshot,
    pub targets: &'a [ActorSnapshot],
    pub rules: &'a RulesConfig,
    pub defenses: &'a DefenseTable,
    dice: &'a dyn DiceRoller,
    prompter: &'a dyn Prompter,
    sequence: u32,
}

impl<'a> ActionContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        action: &'a mut ActionInstance,
        actor: &'a ActorSnapshot,
        targets: &'a [ActorSnapshot],
        rules: &'a RulesConfig,
        defenses: &'a DefenseTable,
        dice: &'a dyn DiceRoller,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            action,
            actor,
            targets,
            rules,
            defenses,
            dice,
            prompter,
            sequence: 0,
        }
    }

    pub fn target(&self, id: ActorId) -> Option<&'a ActorSnapshot> {
        self.targets.iter().find(|target| target.id == id)
    }

    /// Number of pools rolled so far in this invocation.
    pub fn rolls_made(&self) -> u32 {
        self.sequence
    }

    /// Rolls the pool for `target` and checks the faces against it.
    pub async fn roll_pool(
        &mut self,
        target: ActorId,
    ) -> Result<(DicePool, [u8; POOL_SIZE]), ActionError> {
        let pool = self.action.pool_against(target, self.rules);
        let request = RollRequest {
            actor: self.actor.id,
            nonce: self.action.nonce(),
            sequence: self.sequence,
            pool,
        };
        self.sequence += 1;

        let rolled = self
            .dice
            .roll(&request)
            .await
            .map_err(ActionError::Roller)?;
        if !pool.accepts(&rolled) {
            return Err(ActionError::InvalidRoll {
                rolled,
                formula: pool.formula(),
            });
        }

        tracing::trace!(
            target: "runtime::executor",
            actor = %self.actor.id,
            target = %target,
            formula = %pool.formula(),
            ?rolled,
            "rolled pool"
        );
        Ok((pool, rolled))
    }

    /// Attack roll against the target's physical defense tiers.
    ///
    /// `enchantment` overrides the usage bonus so each strike can carry its
    /// own weapon's enchantment.
    pub async fn attack(
        &mut self,
        target: &ActorSnapshot,
        enchantment: i32,
    ) -> Result<RollResult, ActionError> {
        let (pool, rolled) = self.roll_pool(target.id).await?;
        let mut bonuses = self.action.roll_bonuses(self.actor);
        bonuses.enchantment = enchantment;
        Ok(RollResult::attack(
            pool,
            rolled,
            bonuses,
            target,
            self.defenses,
            self.rules,
        ))
    }

    /// Check against one of the target's named defense scores.
    pub async fn check(
        &mut self,
        target: &ActorSnapshot,
        defense: &str,
    ) -> Result<RollResult, ActionError> {
        let (pool, rolled) = self.roll_pool(target.id).await?;
        let bonuses = self.action.roll_bonuses(self.actor);
        Ok(RollResult::check(
            pool,
            rolled,
            bonuses,
            target.defense(defense),
            self.rules,
        ))
    }

    /// Rolls against whatever defense the usage context names.
    pub async fn roll_against(&mut self, target: &ActorSnapshot) -> Result<RollResult, ActionError> {
        match self.action.usage.against.clone() {
            RollAgainst::Physical => {
                let enchantment = self.action.usage.bonuses.enchantment;
                self.attack(target, enchantment).await
            }
            RollAgainst::Defense(defense) => self.check(target, &defense).await,
        }
    }

    /// Puts a choice to the acting player. `Ok(None)` means cancelled.
    pub async fn choose(
        &self,
        title: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Option<usize>, ActionError> {
        let request = PromptRequest {
            actor: self.actor.id,
            title: title.into(),
            options,
        };
        let choice = self
            .prompter
            .choose(&request)
            .await
            .map_err(ActionError::Prompt)?;
        match choice {
            Some(index) if index >= request.options.len() => Err(ActionError::Prompt(format!(
                "choice {index} out of {} options",
                request.options.len()
            ))),
            choice => Ok(choice),
        }
    }
}

/// State visible to confirm callbacks.
pub struct ConfirmContext<'a> {
    pub record: &'a ActionRecord,
    /// Undoing a previous confirm rather than applying.
    pub reverse: bool,
    batch: &'a mut CommitBatch,
}

impl<'a> ConfirmContext<'a> {
    pub fn new(record: &'a ActionRecord, reverse: bool, batch: &'a mut CommitBatch) -> Self {
        Self {
            record,
            reverse,
            batch,
        }
    }

    /// Queues the forward form of an update; it is inverted when reversing.
    pub fn apply(&mut self, actor: ActorId, update: ActorUpdate) {
        let update = if self.reverse {
            update.inverted()
        } else {
            update
        };
        self.batch.push_update(actor, update);
    }

    pub fn batch(&self) -> &CommitBatch {
        self.batch
    }
}
