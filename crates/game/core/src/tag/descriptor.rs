//! Tag identity, priority and propagation data.

use std::borrow::Borrow;

/// Identifier of a capability tag, e.g. `"melee"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TagId(String);

impl TagId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TagId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TagId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TagId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for TagId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Ordering key within a phase. Lower runs earlier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Priority(pub i32);

impl Priority {
    pub const DEFAULT: Self = Self(0);
    /// Reserved for the single tag that must run after every other tag.
    pub const LAST: Self = Self(i32::MAX);

    pub const fn is_last(&self) -> bool {
        self.0 == i32::MAX
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Static catalog entry for one tag.
///
/// Behavior (the phase callbacks) is bound separately by id; this record only
/// carries the data the registry needs to resolve and order tag sets.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagDescriptor {
    pub id: TagId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Priority,
    /// Tags implied whenever this one is present.
    #[cfg_attr(feature = "serde", serde(default))]
    pub propagate: Vec<TagId>,
    /// Not player-selectable; only reachable through propagation.
    #[cfg_attr(feature = "serde", serde(default))]
    pub internal: bool,
}

impl TagDescriptor {
    pub fn new(id: impl Into<TagId>) -> Self {
        Self {
            id: id.into(),
            priority: Priority::DEFAULT,
            propagate: Vec::new(),
            internal: false,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn propagates(mut self, tags: impl IntoIterator<Item = impl Into<TagId>>) -> Self {
        self.propagate.extend(tags.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }
}
