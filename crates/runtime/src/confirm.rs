//! Confirm/reverse controller.
//!
//! A record produced by the executor changes nothing until it is confirmed.
//! Confirming applies the aggregated deltas, creates effects and runs every
//! tag's confirm callback; reversing undoes exactly that. The commit flag
//! on the record flips in the same atomic write as the changes, so repeated
//! or racing calls resolve to a no-op status instead of double-applying.
use std::sync::Arc;

use tactics_core::{ActionRecord, ActorUpdate, RecordId};
use tracing::{debug, info, warn};

use crate::api::{Result, RuntimeError};
use crate::behavior::{BehaviorTable, ConfirmContext};
use crate::hooks::{HookName, HookRegistry};
use crate::repository::{CommitBatch, DocumentStore, StoreError};

/// Which participant may confirm records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// Holds write access to every actor document.
    Arbiter,
    /// Must relay confirm requests to the arbiter.
    Participant,
}

/// Result of a confirm, reverse or negate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CommitStatus {
    /// Changes applied; the record is now confirmed.
    Applied,
    /// Changes undone; the record is unconfirmed again.
    Reversed,
    /// Confirm on a record that is already confirmed. Nothing changed.
    AlreadyConfirmed,
    /// Reverse on a record that was never confirmed. Nothing changed.
    NotConfirmed,
    /// The record is countered; nothing will ever apply.
    Negated,
}

impl CommitStatus {
    /// Nothing was written.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::AlreadyConfirmed | Self::NotConfirmed)
    }
}

/// Builds and commits confirm batches.
#[derive(Clone)]
pub struct ConfirmController {
    store: Arc<dyn DocumentStore>,
    behaviors: Arc<BehaviorTable>,
    talents: Arc<HookRegistry>,
}

impl ConfirmController {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        behaviors: Arc<BehaviorTable>,
        talents: Arc<HookRegistry>,
    ) -> Self {
        Self {
            store,
            behaviors,
            talents,
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    async fn load(&self, id: &RecordId) -> Result<ActionRecord> {
        self.store
            .load_record(id)
            .await?
            .ok_or_else(|| RuntimeError::RecordNotFound(id.clone()))
    }

    /// Applies (`reverse = false`) or undoes (`reverse = true`) a record.
    pub async fn confirm(&self, id: &RecordId, reverse: bool) -> Result<CommitStatus> {
        let record = self.load(id).await?;

        if record.negated {
            info!(target: "runtime::confirm", record = %id, "record is negated, nothing to confirm");
            return Ok(CommitStatus::Negated);
        }
        if record.confirmed != reverse {
            let status = noop_status(record.confirmed);
            info!(target: "runtime::confirm", record = %id, %status, "commit flag already set");
            return Ok(status);
        }

        let batch = self.build_batch(&record, reverse).await?;
        match self.store.commit(batch).await {
            Ok(_) => {
                let status = if reverse {
                    CommitStatus::Reversed
                } else {
                    CommitStatus::Applied
                };
                debug!(target: "runtime::confirm", record = %id, %status, "committed");
                Ok(status)
            }
            Err(StoreError::Conflict { .. }) => {
                let current = self.load(id).await?;
                let status = if current.negated {
                    CommitStatus::Negated
                } else {
                    noop_status(current.confirmed)
                };
                info!(target: "runtime::confirm", record = %id, %status, "lost commit race");
                Ok(status)
            }
            Err(err) => {
                warn!(target: "runtime::confirm", record = %id, error = %err, "commit rejected");
                Err(err.into())
            }
        }
    }

    /// Counters a record.
    ///
    /// A confirmed record is reversed and marked in the same write; an
    /// unconfirmed one is only marked, so later confirms become no-ops.
    pub async fn negate(&self, id: &RecordId) -> Result<CommitStatus> {
        // one retry covers a confirm racing in between load and commit
        for _ in 0..2 {
            let record = self.load(id).await?;
            if record.negated {
                return Ok(CommitStatus::Negated);
            }

            let mut batch = if record.confirmed {
                self.build_batch(&record, true).await?
            } else {
                CommitBatch::new(id.clone(), false, false)
            };
            batch.negated = true;

            match self.store.commit(batch).await {
                Ok(_) => {
                    info!(
                        target: "runtime::confirm",
                        record = %id,
                        reversed = record.confirmed,
                        "record negated"
                    );
                    return Ok(CommitStatus::Negated);
                }
                Err(StoreError::Conflict { .. }) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(StoreError::Conflict {
            record: id.clone(),
            confirmed: true,
        }
        .into())
    }

    /// Collects every write of a confirm (or its reverse) into one batch.
    async fn build_batch(&self, record: &ActionRecord, reverse: bool) -> Result<CommitBatch> {
        let mut batch = CommitBatch::new(record.id.clone(), reverse, !reverse);

        for (actor, deltas) in record.net_deltas() {
            let deltas = if reverse { deltas.negated() } else { deltas };
            batch.deltas.push((actor, deltas));
        }

        if reverse {
            batch.remove_effects.clone_from(&record.applied_effects);
        } else {
            for outcome in &record.outcomes {
                for effect in &outcome.effects {
                    batch.create_effects.push((outcome.target, effect.clone()));
                }
            }
        }

        let updates: Vec<_> = record
            .outcomes
            .iter()
            .flat_map(|outcome| outcome.updates.iter().map(|u| (outcome.target, u)))
            .collect();
        if reverse {
            for (actor, update) in updates.into_iter().rev() {
                batch.push_update(actor, ActorUpdate::inverted(update));
            }
        } else {
            for (actor, update) in updates {
                batch.push_update(actor, update.clone());
            }
        }

        let mut cx = ConfirmContext::new(record, reverse, &mut batch);
        for tag in record.tags.iter() {
            let Some(behavior) = self.behaviors.get(tag.as_str()) else {
                continue;
            };
            if behavior.phases().implements(tactics_core::Phase::Confirm) {
                behavior.confirm(&mut cx).await?;
            }
        }
        for talent in self
            .talents
            .subscribers(record.actor, HookName::ConfirmAction)
        {
            if let Err(err) = talent.behavior.confirm(&mut cx).await {
                talent.handle_error(HookName::ConfirmAction, err)?;
            }
        }

        Ok(batch)
    }
}

fn noop_status(confirmed: bool) -> CommitStatus {
    if confirmed {
        CommitStatus::AlreadyConfirmed
    } else {
        CommitStatus::NotConfirmed
    }
}

impl std::fmt::Debug for ConfirmController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmController")
            .field("behaviors", &self.behaviors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{ActorDocument, InMemoryDocumentStore};
    use tactics_core::{ActionId, ActorId, Outcome, ResolvedTags, ResourceKind};

    fn record(nonce: u64) -> ActionRecord {
        let action = ActionId::new("slap");
        let mut target = Outcome::new(ActorId(2), false);
        target.resources.add(ResourceKind::Health, -3);
        let mut own = Outcome::new(ActorId(1), true);
        own.resources.add(ResourceKind::Action, -1);

        ActionRecord {
            id: RecordId::derive(&action, ActorId(1), nonce),
            action,
            actor: ActorId(1),
            nonce,
            tags: ResolvedTags::default(),
            usage: Default::default(),
            outcomes: vec![target, own],
            confirmed: false,
            negated: false,
            applied_effects: Vec::new(),
        }
    }

    async fn controller(record: &ActionRecord) -> ConfirmController {
        let store = InMemoryDocumentStore::with_actors([
            ActorDocument::new(ActorId(1))
                .with_resource(ResourceKind::Action, 3),
            ActorDocument::new(ActorId(2))
                .with_resource(ResourceKind::Health, 10),
        ]);
        store.save_record(record).await.unwrap();
        ConfirmController::new(
            Arc::new(store),
            Arc::new(BehaviorTable::new()),
            Arc::new(HookRegistry::new()),
        )
    }

    async fn health(controller: &ConfirmController) -> i32 {
        controller
            .store()
            .load_actor(ActorId(2))
            .await
            .unwrap()
            .unwrap()
            .resource(ResourceKind::Health)
    }

    #[tokio::test]
    async fn confirm_applies_once() {
        let record = record(0);
        let controller = controller(&record).await;

        assert_eq!(
            controller.confirm(&record.id, false).await.unwrap(),
            CommitStatus::Applied
        );
        assert_eq!(
            controller.confirm(&record.id, false).await.unwrap(),
            CommitStatus::AlreadyConfirmed
        );
        assert_eq!(health(&controller).await, 7);
    }

    #[tokio::test]
    async fn reverse_restores_and_reopens() {
        let record = record(0);
        let controller = controller(&record).await;

        assert_eq!(
            controller.confirm(&record.id, true).await.unwrap(),
            CommitStatus::NotConfirmed
        );
        controller.confirm(&record.id, false).await.unwrap();
        assert_eq!(
            controller.confirm(&record.id, true).await.unwrap(),
            CommitStatus::Reversed
        );
        assert_eq!(health(&controller).await, 10);
        assert_eq!(
            controller.confirm(&record.id, false).await.unwrap(),
            CommitStatus::Applied
        );
        assert_eq!(health(&controller).await, 7);
    }

    #[tokio::test]
    async fn negated_record_never_applies() {
        let record = record(0);
        let controller = controller(&record).await;

        controller.negate(&record.id).await.unwrap();
        assert_eq!(
            controller.confirm(&record.id, false).await.unwrap(),
            CommitStatus::Negated
        );
        assert_eq!(health(&controller).await, 10);
    }

    #[tokio::test]
    async fn unknown_record_is_an_error() {
        let record = record(0);
        let controller = controller(&record).await;
        let missing = RecordId::from("missing");

        let err = controller.confirm(&missing, false).await.unwrap_err();
        assert!(matches!(err, RuntimeError::RecordNotFound(_)));
    }
}
