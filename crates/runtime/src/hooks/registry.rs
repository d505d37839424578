//! Per-actor talent subscriptions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tactics_core::{ActionError, ActorId};
use tracing::{debug, error};

use super::{HookCriticality, HookName};
use crate::behavior::TagBehavior;

/// A named behavior subscribed on behalf of an actor.
#[derive(Clone)]
pub struct Talent {
    pub name: String,
    pub criticality: HookCriticality,
    pub behavior: Arc<dyn TagBehavior>,
}

impl Talent {
    pub fn new(name: impl Into<String>, behavior: Arc<dyn TagBehavior>) -> Self {
        Self {
            name: name.into(),
            criticality: HookCriticality::default(),
            behavior,
        }
    }

    #[must_use]
    pub fn with_criticality(mut self, criticality: HookCriticality) -> Self {
        self.criticality = criticality;
        self
    }

    /// Decides whether a failure aborts the invocation.
    ///
    /// Refusals, content errors and collaborator failures always come back.
    /// Other failures come back from critical talents and are logged and
    /// swallowed otherwise.
    pub(crate) fn handle_error(&self, hook: HookName, err: ActionError) -> Result<(), ActionError> {
        if err.always_aborts() {
            return Err(err);
        }
        match self.criticality {
            HookCriticality::Critical => {
                error!(
                    target: "runtime::hooks",
                    talent = %self.name,
                    %hook,
                    criticality = "critical",
                    error = %err,
                    "Critical talent failed, aborting action"
                );
                Err(err)
            }
            HookCriticality::Important => {
                error!(
                    target: "runtime::hooks",
                    talent = %self.name,
                    %hook,
                    criticality = "important",
                    error = %err,
                    "Talent failed, continuing"
                );
                Ok(())
            }
            HookCriticality::Optional => {
                debug!(
                    target: "runtime::hooks",
                    talent = %self.name,
                    %hook,
                    criticality = "optional",
                    error = %err,
                    "Optional talent failed"
                );
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Talent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Talent")
            .field("name", &self.name)
            .field("criticality", &self.criticality)
            .field("behavior", &self.behavior.name())
            .finish()
    }
}

/// Talent subscriptions keyed by actor and hook.
///
/// Subscribers of one hook run in subscription order.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    subscriptions: HashMap<(ActorId, HookName), Vec<Talent>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a talent to one hook.
    pub fn subscribe(&mut self, actor: ActorId, hook: HookName, talent: Talent) {
        if !talent.behavior.phases().implements(hook.phase()) {
            debug!(
                target: "runtime::hooks",
                talent = %talent.name,
                %hook,
                "talent subscribed to a hook its behavior does not implement"
            );
        }
        self.subscriptions
            .entry((actor, hook))
            .or_default()
            .push(talent);
    }

    /// Subscribes a talent to every hook its behavior implements.
    pub fn register(&mut self, actor: ActorId, talent: Talent) {
        use strum::IntoEnumIterator;

        let phases = talent.behavior.phases();
        for hook in HookName::iter().filter(|hook| phases.implements(hook.phase())) {
            self.subscribe(actor, hook, talent.clone());
        }
    }

    pub fn subscribers(&self, actor: ActorId, hook: HookName) -> &[Talent] {
        self.subscriptions
            .get(&(actor, hook))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Drops every subscription of an actor, e.g. when it leaves the scene.
    pub fn remove_actor(&mut self, actor: ActorId) {
        self.subscriptions.retain(|(owner, _), _| *owner != actor);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tactics_core::PhaseSet;

    struct Keen;

    #[async_trait]
    impl TagBehavior for Keen {
        fn name(&self) -> &'static str {
            "keen"
        }

        fn phases(&self) -> PhaseSet {
            PhaseSet::CONFIGURE | PhaseSet::POST_ACTIVATE
        }
    }

    #[test]
    fn register_subscribes_to_implemented_hooks_only() {
        let mut registry = HookRegistry::new();
        registry.register(ActorId(1), Talent::new("keen edge", Arc::new(Keen)));

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.subscribers(ActorId(1), HookName::ConfigureAction).len(),
            1
        );
        assert!(registry.subscribers(ActorId(1), HookName::RollAction).is_empty());
        assert!(registry.subscribers(ActorId(2), HookName::ConfigureAction).is_empty());

        registry.remove_actor(ActorId(1));
        assert!(registry.is_empty());
    }

    #[test]
    fn preconditions_abort_regardless_of_criticality() {
        let talent = Talent::new("keen edge", Arc::new(Keen))
            .with_criticality(HookCriticality::Optional);

        let precondition = ActionError::precondition("keen edge", "blade is dull");
        assert!(talent
            .handle_error(HookName::CanUseAction, precondition)
            .is_err());

        let broken = ActionError::data_integrity("keen edge", "missing weapon");
        assert!(talent.handle_error(HookName::RollAction, broken).is_err());

        let relay = ActionError::Roller("relay closed".into());
        assert!(talent.handle_error(HookName::RollAction, relay).is_err());
    }

    #[test]
    fn criticality_decides_for_rule_misfires() {
        let optional = Talent::new("keen edge", Arc::new(Keen))
            .with_criticality(HookCriticality::Optional);
        let stray = ActionError::TargetNotFound(ActorId(9));
        assert!(optional.handle_error(HookName::ConfigureAction, stray).is_ok());

        let critical = optional.with_criticality(HookCriticality::Critical);
        let stray = ActionError::TargetNotFound(ActorId(9));
        assert!(critical.handle_error(HookName::ConfigureAction, stray).is_err());
    }
}
