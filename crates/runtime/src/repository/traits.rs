//! Document store contract used by the confirm controller.

use async_trait::async_trait;

use tactics_core::{ActionRecord, ActorId, RecordId};

use super::batch::CommitBatch;
use super::document::ActorDocument;
use super::error::Result;

/// Persistence collaborator for action records and actor documents.
///
/// Every mutation of actor state goes through [`DocumentStore::commit`], which
/// must apply the whole batch and the new commit flag atomically: a rejected
/// batch leaves both the documents and the flag untouched.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a freshly produced record. Records are written once.
    async fn save_record(&self, record: &ActionRecord) -> Result<()>;

    async fn load_record(&self, id: &RecordId) -> Result<Option<ActionRecord>>;

    async fn load_actor(&self, id: ActorId) -> Result<Option<ActorDocument>>;

    /// Apply a batch and return the record as stored afterwards.
    ///
    /// Fails with [`super::StoreError::Conflict`] when the stored flag does
    /// not match `batch.expect_confirmed`, or when the record was negated
    /// and the batch is not itself a negation.
    async fn commit(&self, batch: CommitBatch) -> Result<ActionRecord>;

    /// List stored record ids.
    async fn list_records(&self) -> Result<Vec<RecordId>> {
        Ok(vec![])
    }
}
