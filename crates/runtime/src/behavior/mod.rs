//! Tag behaviors: the code bound to each content tag.
//!
//! Content only names tags and their priorities. What a tag actually does in
//! each lifecycle phase lives here, behind [`TagBehavior`]. The executor looks
//! the behavior up in a [`BehaviorTable`] and dispatches a phase only when
//! [`TagBehavior::phases`] says the tag implements it.
//!
//! # Ordering
//!
//! Within a phase, tags run in resolved order (priority, then registration).
//! A tag may read any usage channel written by an earlier tag in the same
//! phase or by any tag in an earlier phase. Talents subscribed through
//! [`crate::hooks::HookRegistry`] run after every tag of the phase.
mod context;
pub mod tags;

pub use context::{ActionContext, ConfirmContext};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tactics_core::{
    ActionError, ActorSnapshot, Outcome, Phase, PhaseSet, RegistryError, TagId, TagRegistry,
};

/// Phase callbacks for one tag or talent.
///
/// Every callback defaults to a no-op; implement only the ones listed in
/// [`TagBehavior::phases`]. Callbacks may await the roller or the prompter.
#[async_trait]
pub trait TagBehavior: Send + Sync {
    /// Name used in logs and precondition messages.
    fn name(&self) -> &'static str;

    /// Phases this behavior implements.
    fn phases(&self) -> PhaseSet;

    async fn initialize(&self, _cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        Ok(())
    }

    /// Derive cost, range, target shape and usage channels. May run repeatedly.
    async fn prepare(&self, _cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        Ok(())
    }

    /// Veto the invocation with [`ActionError::Precondition`].
    async fn can_use(&self, _cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        Ok(())
    }

    /// Per-target modifiers, called once for each target.
    async fn configure(
        &self,
        _cx: &mut ActionContext<'_>,
        _target: &ActorSnapshot,
    ) -> Result<(), ActionError> {
        Ok(())
    }

    async fn pre_activate(&self, _cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        Ok(())
    }

    async fn roll(
        &self,
        _cx: &mut ActionContext<'_>,
        _target: &ActorSnapshot,
        _outcome: &mut Outcome,
    ) -> Result<(), ActionError> {
        Ok(())
    }

    async fn post_activate(
        &self,
        _cx: &mut ActionContext<'_>,
        _target: &ActorSnapshot,
        _outcome: &mut Outcome,
    ) -> Result<(), ActionError> {
        Ok(())
    }

    /// Queue updates for a confirm; `cx.reverse` is set when undoing one.
    async fn confirm(&self, _cx: &mut ConfirmContext<'_>) -> Result<(), ActionError> {
        Ok(())
    }
}

/// Dispatches one lifecycle phase to a behavior.
///
/// Per-target phases need both the target and its outcome; a missing
/// argument is a wiring bug and surfaces as a data-integrity error.
pub(crate) async fn invoke(
    behavior: &dyn TagBehavior,
    phase: Phase,
    cx: &mut ActionContext<'_>,
    target: Option<&ActorSnapshot>,
    outcome: Option<&mut Outcome>,
) -> Result<(), ActionError> {
    match (phase, target, outcome) {
        (Phase::Initialize, ..) => behavior.initialize(cx).await,
        (Phase::Prepare, ..) => behavior.prepare(cx).await,
        (Phase::CanUse, ..) => behavior.can_use(cx).await,
        (Phase::Configure, Some(target), _) => behavior.configure(cx, target).await,
        (Phase::PreActivate, ..) => behavior.pre_activate(cx).await,
        (Phase::Roll, Some(target), Some(outcome)) => behavior.roll(cx, target, outcome).await,
        (Phase::PostActivate, Some(target), Some(outcome)) => {
            behavior.post_activate(cx, target, outcome).await
        }
        (phase, ..) => Err(ActionError::data_integrity(
            behavior.name(),
            format!("phase {phase} dispatched without its arguments"),
        )),
    }
}

/// Behaviors bound to tag ids.
#[derive(Clone, Default)]
pub struct BehaviorTable {
    behaviors: HashMap<TagId, Arc<dyn TagBehavior>>,
}

impl BehaviorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the stock behaviors bound to the stock tag ids.
    pub fn standard() -> Self {
        use tags::{
            AmmunitionTag, DamageTypeTag, FlankingTag, MeleeTag, RangedTag, ReactionTag, SpellTag,
            StrikeTag,
        };
        use tactics_core::DamageType;

        let mut table = Self::new();
        table.bind("reaction", Arc::new(ReactionTag));
        table.bind("melee", Arc::new(MeleeTag));
        table.bind("ranged", Arc::new(RangedTag));
        table.bind("ammunition", Arc::new(AmmunitionTag));
        table.bind("flanking", Arc::new(FlankingTag));
        table.bind("spell", Arc::new(SpellTag));
        table.bind("strike", Arc::new(StrikeTag));
        for damage_type in [
            DamageType::Slashing,
            DamageType::Piercing,
            DamageType::Bludgeoning,
            DamageType::Fire,
            DamageType::Cold,
            DamageType::Lightning,
        ] {
            table.bind(damage_type.as_ref(), Arc::new(DamageTypeTag(damage_type)));
        }
        table
    }

    /// Binds a behavior, returning the one it replaced.
    pub fn bind(
        &mut self,
        tag: impl Into<TagId>,
        behavior: Arc<dyn TagBehavior>,
    ) -> Option<Arc<dyn TagBehavior>> {
        self.behaviors.insert(tag.into(), behavior)
    }

    pub fn get(&self, tag: &str) -> Option<&Arc<dyn TagBehavior>> {
        self.behaviors.get(tag)
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Fails if a behavior is bound to a tag the registry does not know.
    ///
    /// The reverse is allowed: a registered tag without a behavior is a
    /// marker that other tags may test for.
    pub fn check_against(&self, registry: &TagRegistry) -> Result<(), RegistryError> {
        let mut bound: Vec<_> = self.behaviors.keys().collect();
        bound.sort();
        match bound.into_iter().find(|tag| !registry.contains(tag.as_str())) {
            Some(tag) => Err(RegistryError::UnknownTag(tag.clone())),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for BehaviorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self
            .behaviors
            .iter()
            .map(|(tag, behavior)| (tag.as_str(), behavior.name()))
            .collect();
        names.sort();
        f.debug_map().entries(names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::{Priority, TagDescriptor};

    #[test]
    fn standard_table_matches_the_standard_catalog() {
        let content = tactics_content::ContentFactory::standard().unwrap();
        let table = BehaviorTable::standard();
        table.check_against(&content.tags).unwrap();
        assert_eq!(table.get("strike").unwrap().name(), "strike");
        assert_eq!(table.get("fire").unwrap().name(), "fire");
    }

    #[test]
    fn unknown_bound_tag_is_rejected() {
        let registry = TagRegistry::new([TagDescriptor::new("strike").with_priority(Priority::LAST)])
            .unwrap();
        let err = BehaviorTable::standard()
            .check_against(&registry)
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownTag(_)));
    }
}
