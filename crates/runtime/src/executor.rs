//! Lifecycle executor: drives one action instance through its phases.
//!
//! Phases run strictly in order. Within a phase the instance's resolved tags
//! run sequentially in priority order, each awaited before the next starts,
//! and the acting actor's talents run after the tags. Per-target phases loop
//! over the targets in the order they were chosen.
//!
//! ```text
//! initialize -> prepare -> canUse -> configure* -> preActivate -> roll* -> postActivate*
//! ```
//!
//! `*` runs once per target. `confirm` is deferred to the confirm controller.
use std::sync::Arc;

use tactics_core::{
    ActionError, ActionInstance, ActionRecord, ActorSnapshot, DefenseTable, EffectRecipient,
    GameError, Outcome, Phase, RecordId, ResourceKind, RulesConfig, TargetKind,
};
use tracing::{debug, error, instrument, trace};

use crate::api::{DiceRoller, Prompter};
use crate::behavior::{self, ActionContext, BehaviorTable};
use crate::hooks::{HookName, HookRegistry};

/// Runs the pre-confirm lifecycle and aggregates the outcomes.
#[derive(Clone)]
pub struct LifecycleExecutor {
    behaviors: Arc<BehaviorTable>,
    talents: Arc<HookRegistry>,
    rules: Arc<RulesConfig>,
    defenses: Arc<DefenseTable>,
    dice: Arc<dyn DiceRoller>,
    prompter: Arc<dyn Prompter>,
}

impl LifecycleExecutor {
    pub fn new(
        behaviors: Arc<BehaviorTable>,
        talents: Arc<HookRegistry>,
        rules: Arc<RulesConfig>,
        defenses: Arc<DefenseTable>,
        dice: Arc<dyn DiceRoller>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            behaviors,
            talents,
            rules,
            defenses,
            dice,
            prompter,
        }
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    fn context<'a>(
        &'a self,
        action: &'a mut ActionInstance,
        actor: &'a ActorSnapshot,
        targets: &'a [ActorSnapshot],
    ) -> ActionContext<'a> {
        ActionContext::new(
            action,
            actor,
            targets,
            &self.rules,
            &self.defenses,
            self.dice.as_ref(),
            self.prompter.as_ref(),
        )
    }

    /// Runs `initialize` and `prepare` only, e.g. to show cost and range.
    ///
    /// Safe to call repeatedly until the instance is executed.
    pub async fn prepare(
        &self,
        action: &mut ActionInstance,
        actor: &ActorSnapshot,
    ) -> Result<(), ActionError> {
        let mut cx = self.context(action, actor, &[]);
        self.setup(&mut cx).await
    }

    /// Runs every pre-confirm phase and returns the unconfirmed record.
    ///
    /// Precondition failures abort before any roll is made. The actor's
    /// snapshot must belong to the instance's actor. When the instance is
    /// self-only after `prepare`, the chosen targets are ignored and the actor
    /// is the only target.
    #[instrument(
        name = "execute",
        skip_all,
        fields(action = %action.id(), actor = %actor.id, nonce = action.nonce())
    )]
    pub async fn execute(
        &self,
        action: &mut ActionInstance,
        actor: &ActorSnapshot,
        targets: &[ActorSnapshot],
    ) -> Result<ActionRecord, ActionError> {
        if action.actor() != actor.id {
            return Err(ActionError::data_integrity(
                "executor",
                format!(
                    "instance belongs to actor {}, snapshot is {}",
                    action.actor(),
                    actor.id
                ),
            ));
        }

        let result = self.run(action, actor, targets).await;
        match &result {
            Ok(record) => debug!(
                target: "runtime::executor",
                record = %record.id,
                outcomes = record.outcomes.len(),
                "action resolved"
            ),
            Err(err) if err.is_precondition() => debug!(
                target: "runtime::executor",
                reason = %err,
                "action aborted"
            ),
            Err(err) => error!(
                target: "runtime::executor",
                error = %err,
                code = err.error_code(),
                severity = err.severity().as_str(),
                "action failed"
            ),
        }
        result
    }

    async fn run(
        &self,
        action: &mut ActionInstance,
        actor: &ActorSnapshot,
        targets: &[ActorSnapshot],
    ) -> Result<ActionRecord, ActionError> {
        let mut cx = self.context(action, actor, targets);
        self.setup(&mut cx).await?;

        // prepare may have retargeted the instance
        let targets = if cx.action.target.kind == TargetKind::SelfOnly {
            std::slice::from_ref(actor)
        } else {
            targets
        };
        cx.targets = targets;

        cx.action.advance(Phase::CanUse)?;
        cx.action
            .target
            .check_count(targets.len())
            .map_err(|reason| ActionError::precondition("targeting", reason))?;
        cx.action.set_targets(targets.iter().map(|target| target.id));
        self.run_phase(&mut cx, Phase::CanUse, None, None).await?;

        cx.action.advance(Phase::Configure)?;
        for target in targets {
            self.run_phase(&mut cx, Phase::Configure, Some(target), None)
                .await?;
        }

        cx.action.advance(Phase::PreActivate)?;
        self.run_phase(&mut cx, Phase::PreActivate, None, None)
            .await?;

        cx.action.advance(Phase::Roll)?;
        let mut outcomes = Vec::with_capacity(targets.len() + 1);
        for target in targets {
            let mut outcome = Outcome::new(target.id, target.id == actor.id);
            self.run_phase(&mut cx, Phase::Roll, Some(target), Some(&mut outcome))
                .await?;
            if cx.action.usage.is_harmful() && !outcome.is_self && outcome.rolls.is_empty() {
                return Err(ActionError::data_integrity(
                    "executor",
                    format!("harmful action produced no roll against {}", target.id),
                ));
            }
            outcomes.push(outcome);
        }

        cx.action.advance(Phase::PostActivate)?;
        for (target, outcome) in targets.iter().zip(outcomes.iter_mut()) {
            self.run_phase(&mut cx, Phase::PostActivate, Some(target), Some(outcome))
                .await?;
        }

        Ok(Self::aggregate(cx.action, outcomes))
    }

    async fn setup(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        cx.action.advance(Phase::Initialize)?;
        cx.action.reset();
        self.run_phase(cx, Phase::Initialize, None, None).await?;

        cx.action.advance(Phase::Prepare)?;
        self.run_phase(cx, Phase::Prepare, None, None).await
    }

    /// Dispatches one phase to every tag that implements it, then to talents.
    async fn run_phase(
        &self,
        cx: &mut ActionContext<'_>,
        phase: Phase,
        target: Option<&ActorSnapshot>,
        mut outcome: Option<&mut Outcome>,
    ) -> Result<(), ActionError> {
        let tags = cx.action.tags().clone();
        for tag in tags.iter() {
            let Some(behavior) = self.behaviors.get(tag.as_str()) else {
                trace!(target: "runtime::executor", %tag, "tag has no behavior");
                continue;
            };
            if !behavior.phases().implements(phase) {
                continue;
            }
            trace!(target: "runtime::executor", %tag, %phase, "dispatch");
            behavior::invoke(behavior.as_ref(), phase, cx, target, outcome.as_deref_mut())
                .await?;
        }

        let hook = HookName::from(phase);
        for talent in self.talents.subscribers(cx.actor.id, hook) {
            if !talent.behavior.phases().implements(phase) {
                continue;
            }
            trace!(target: "runtime::executor", talent = %talent.name, %hook, "dispatch");
            let result = behavior::invoke(
                talent.behavior.as_ref(),
                phase,
                cx,
                target,
                outcome.as_deref_mut(),
            )
            .await;
            if let Err(err) = result {
                talent.handle_error(hook, err)?;
            }
        }
        Ok(())
    }

    /// Freezes the instance into a record.
    ///
    /// The self outcome carries the cost and any effects aimed at the actor;
    /// target effects marked `on_hit` go only to targets that were hit (or
    /// that had nothing to miss).
    fn aggregate(action: &ActionInstance, mut outcomes: Vec<Outcome>) -> ActionRecord {
        let actor = action.actor();

        for outcome in &mut outcomes {
            for effect in &action.effects {
                let landed = !effect.on_hit || outcome.rolls.is_empty() || outcome.is_hit();
                if effect.recipient == EffectRecipient::Target && landed {
                    outcome.effects.push(effect.clone());
                }
            }
        }

        let index = match outcomes.iter().position(|outcome| outcome.is_self) {
            Some(index) => index,
            None => {
                outcomes.push(Outcome::new(actor, true));
                outcomes.len() - 1
            }
        };
        let own = &mut outcomes[index];
        own.resources.add(ResourceKind::Action, -action.cost.action);
        own.resources.add(ResourceKind::Focus, -action.cost.focus);
        own.effects.extend(
            action
                .effects
                .iter()
                .filter(|effect| effect.recipient == EffectRecipient::Actor)
                .cloned(),
        );

        ActionRecord {
            id: RecordId::derive(action.id(), actor, action.nonce()),
            action: action.id().clone(),
            actor,
            nonce: action.nonce(),
            tags: action.tags().clone(),
            usage: action.usage.clone(),
            outcomes,
            confirmed: false,
            negated: false,
            applied_effects: Vec::new(),
        }
    }
}

impl std::fmt::Debug for LifecycleExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleExecutor")
            .field("behaviors", &self.behaviors)
            .field("talents", &self.talents.len())
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
