//! Capability tags.
//!
//! A tag is an independently authored capability attached to an action
//! (`melee`, `ranged`, `strike`, ...). Tags never reference each other's
//! behavior; they communicate only through the typed usage context of the
//! action instance, and their relative order is fixed by the registry.
//!
//! - `descriptor`: tag id, priority and propagation data
//! - `phase`: lifecycle phases and the per-tag capability table
//! - `registry`: validated catalog and precomputed closure table
//! - `error`: content-integrity errors

pub mod descriptor;
pub mod error;
pub mod phase;
pub mod registry;

pub use descriptor::{Priority, TagDescriptor, TagId};
pub use error::RegistryError;
pub use phase::{Phase, PhaseSet};
pub use registry::{ResolvedTags, TagRegistry};
