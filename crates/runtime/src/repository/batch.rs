//! Atomic write applied by a confirm or reverse.

use tactics_core::{ActorId, ActorUpdate, AppliedEffect, EffectTemplate, RecordId, ResourceDeltas};

/// Everything one confirm (or reverse) writes, applied all-or-nothing together
/// with the record's new commit flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitBatch {
    pub record: RecordId,
    /// Commit flag the stored record must carry for the batch to apply.
    pub expect_confirmed: bool,
    /// Commit flag after the batch applies.
    pub confirmed: bool,
    /// Marks the record countered.
    pub negated: bool,
    pub deltas: Vec<(ActorId, ResourceDeltas)>,
    pub create_effects: Vec<(ActorId, EffectTemplate)>,
    pub remove_effects: Vec<AppliedEffect>,
    pub updates: Vec<(ActorId, ActorUpdate)>,
}

impl CommitBatch {
    pub fn new(record: RecordId, expect_confirmed: bool, confirmed: bool) -> Self {
        Self {
            record,
            expect_confirmed,
            confirmed,
            negated: false,
            deltas: Vec::new(),
            create_effects: Vec::new(),
            remove_effects: Vec::new(),
            updates: Vec::new(),
        }
    }

    pub fn push_update(&mut self, actor: ActorId, update: ActorUpdate) {
        self.updates.push((actor, update));
    }

    /// Only flips flags.
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
            && self.create_effects.is_empty()
            && self.remove_effects.is_empty()
            && self.updates.is_empty()
    }
}
