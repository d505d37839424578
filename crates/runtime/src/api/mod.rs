//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration, workers, or infrastructure.

pub mod errors;
pub mod handle;
pub mod providers;
pub mod render;

pub use errors::{Result, RuntimeError};
pub use handle::ArbiterHandle;
pub use providers::{
    DiceRoller, FirstChoicePrompter, PromptRequest, Prompter, RollRequest, ScriptedRoller,
    SeededRoller,
};
pub use render::{parse_record, render_record, render_record_pretty};
