//! Document store for action records and the actor state they commit to.
//!
//! - `traits`: the [`DocumentStore`] contract
//! - `batch`: the all-or-nothing [`CommitBatch`]
//! - `document`: persisted actor slice ([`ActorDocument`], [`ActiveEffect`])
//! - `in_memory`: [`InMemoryDocumentStore`] for tests and local runs

mod batch;
mod document;
mod error;
mod in_memory;
mod traits;

pub use batch::CommitBatch;
pub use document::{ActiveEffect, ActorDocument};
pub use error::{Result, StoreError};
pub use in_memory::InMemoryDocumentStore;
pub use traits::DocumentStore;
