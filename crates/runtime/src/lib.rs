//! Asynchronous action lifecycle for the tactics rules engine.
//!
//! This crate wires the deterministic rules in `tactics-core` to the
//! asynchronous collaborators an action needs at the table: dice rollers,
//! operator prompts, a document store, and an arbiter that owns every write.
//! Consumers embed [`Runtime`] to use actions and confirm their records.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`behavior`] binds code to content tags
//! - [`hooks`] lets actor talents subscribe to lifecycle phases
//! - [`executor`] and [`confirm`] run the two halves of the lifecycle
//! - [`repository`] provides the document store contract and an in-memory store
//! - `workers` keeps the arbiter task internal to the crate
pub mod api;
pub mod behavior;
pub mod confirm;
pub mod executor;
pub mod hooks;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{
    ArbiterHandle, DiceRoller, FirstChoicePrompter, PromptRequest, Prompter, Result, RollRequest,
    RuntimeError, ScriptedRoller, SeededRoller, parse_record, render_record, render_record_pretty,
};
pub use behavior::{ActionContext, BehaviorTable, ConfirmContext, TagBehavior};
pub use confirm::{Authority, CommitStatus, ConfirmController};
pub use executor::LifecycleExecutor;
pub use hooks::{HookCriticality, HookName, HookRegistry, Talent};
pub use repository::{
    ActiveEffect, ActorDocument, CommitBatch, DocumentStore, InMemoryDocumentStore, StoreError,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
