//! Worker tasks that back the runtime orchestration.
//!
//! The arbiter worker serializes every confirm, reverse and negate request
//! for a table, so commits against one store never interleave.

mod arbiter;

pub use arbiter::{ArbiterWorker, Command};
