//! In-memory DocumentStore implementation for tests and local runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use tactics_core::{ActionRecord, ActorId, AppliedEffect, RecordId};

use super::batch::CommitBatch;
use super::document::{ActiveEffect, ActorDocument};
use super::error::{Result, StoreError};
use super::traits::DocumentStore;

#[derive(Default)]
struct Documents {
    actors: BTreeMap<ActorId, ActorDocument>,
    records: HashMap<RecordId, ActionRecord>,
    next_effect: u64,
}

/// In-memory implementation of [`DocumentStore`].
///
/// A single lock guards actors and records together, so a commit is applied
/// to a working copy and swapped in only when every change succeeded.
pub struct InMemoryDocumentStore {
    documents: RwLock<Documents>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Documents::default()),
        }
    }

    /// Create with initial actor documents.
    pub fn with_actors(actors: impl IntoIterator<Item = ActorDocument>) -> Self {
        let documents = Documents {
            actors: actors.into_iter().map(|doc| (doc.id, doc)).collect(),
            ..Documents::default()
        };
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Insert or replace an actor document.
    pub fn put_actor(&self, actor: ActorDocument) -> Result<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        documents.actors.insert(actor.id, actor);
        Ok(())
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save_record(&self, record: &ActionRecord) -> Result<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        if documents.records.contains_key(&record.id) {
            return Err(StoreError::RecordExists(record.id.clone()));
        }
        documents.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn load_record(&self, id: &RecordId) -> Result<Option<ActionRecord>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(documents.records.get(id).cloned())
    }

    async fn load_actor(&self, id: ActorId) -> Result<Option<ActorDocument>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(documents.actors.get(&id).cloned())
    }

    async fn commit(&self, batch: CommitBatch) -> Result<ActionRecord> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;

        let mut record = documents
            .records
            .get(&batch.record)
            .cloned()
            .ok_or_else(|| StoreError::RecordNotFound(batch.record.clone()))?;
        if record.confirmed != batch.expect_confirmed || (record.negated && !batch.negated) {
            return Err(StoreError::Conflict {
                record: batch.record,
                confirmed: record.confirmed,
            });
        }

        let mut actors = documents.actors.clone();
        let mut next_effect = documents.next_effect;
        let mut applied = Vec::with_capacity(batch.create_effects.len());

        for (actor, deltas) in &batch.deltas {
            let doc = actors
                .get_mut(actor)
                .ok_or(StoreError::ActorNotFound(*actor))?;
            for (resource, delta) in deltas.iter() {
                *doc.resources.entry(resource).or_insert(0) += delta;
            }
        }

        for effect in &batch.remove_effects {
            let doc = actors
                .get_mut(&effect.actor)
                .ok_or(StoreError::ActorNotFound(effect.actor))?;
            doc.effects.remove(&effect.effect);
        }

        for (actor, template) in &batch.create_effects {
            let doc = actors
                .get_mut(actor)
                .ok_or(StoreError::ActorNotFound(*actor))?;
            let id = next_effect;
            next_effect += 1;
            doc.effects.insert(
                id,
                ActiveEffect {
                    id,
                    template: template.id.clone(),
                    name: template.name.clone(),
                    duration: template.duration,
                    statuses: template.statuses.clone(),
                    source: batch.record.clone(),
                },
            );
            applied.push(AppliedEffect {
                actor: *actor,
                effect: id,
                template: template.id.clone(),
            });
        }

        for (actor, update) in &batch.updates {
            let doc = actors
                .get_mut(actor)
                .ok_or(StoreError::ActorNotFound(*actor))?;
            doc.apply(update).map_err(|reason| StoreError::Rejected {
                actor: *actor,
                reason,
            })?;
        }

        record.confirmed = batch.confirmed;
        record.negated |= batch.negated;
        record.applied_effects = if batch.confirmed { applied } else { Vec::new() };

        documents.actors = actors;
        documents.next_effect = next_effect;
        documents.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list_records(&self) -> Result<Vec<RecordId>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        let mut ids: Vec<RecordId> = documents.records.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
