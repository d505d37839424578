//! Immutable action templates loaded from content.

use crate::actor::Ability;
use crate::tag::{RegistryError, TagId, TagRegistry};

/// Identifier of an action definition, e.g. `"strike"` or `"counterspell"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ActionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl core::borrow::Borrow<str> for ActionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Price of using an action. Paid only when its outcomes are confirmed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActionCost {
    /// Action points.
    pub action: i32,
    /// Focus points.
    pub focus: i32,
    /// Free hands required.
    pub hands: u8,
    /// Requires an equipped weapon.
    pub weapon: bool,
}

/// Declared range of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RangeSpec {
    Fixed { minimum: u32, maximum: u32 },
    /// Filled in by the tag that selects a weapon.
    Weapon,
}

impl Default for RangeSpec {
    fn default() -> Self {
        Self::Fixed {
            minimum: 0,
            maximum: 1,
        }
    }
}

/// Concrete range of an action instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRange {
    pub minimum: u32,
    pub maximum: u32,
}

impl From<RangeSpec> for ActionRange {
    fn from(spec: RangeSpec) -> Self {
        match spec {
            RangeSpec::Fixed { minimum, maximum } => Self { minimum, maximum },
            RangeSpec::Weapon => Self::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetKind {
    /// Only the acting actor.
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    SelfOnly,
    #[default]
    Single,
    Multiple,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetScope {
    Allies,
    #[default]
    Enemies,
    All,
}

/// Target shape and scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetSpec {
    pub kind: TargetKind,
    pub scope: TargetScope,
    /// Maximum number of targets for `Multiple`.
    pub limit: u8,
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self {
            kind: TargetKind::Single,
            scope: TargetScope::Enemies,
            limit: 1,
        }
    }
}

impl TargetSpec {
    /// Checks a chosen target count, returning the reason when it does not fit.
    pub fn check_count(&self, count: usize) -> Result<(), String> {
        match self.kind {
            TargetKind::SelfOnly => Ok(()),
            TargetKind::Single if count == 1 => Ok(()),
            TargetKind::Single => Err(format!("requires exactly one target, {count} chosen")),
            TargetKind::Multiple if (1..=usize::from(self.limit)).contains(&count) => Ok(()),
            TargetKind::Multiple => Err(format!(
                "requires between 1 and {} targets, {count} chosen",
                self.limit
            )),
        }
    }
}

/// Who receives an effect template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectRecipient {
    #[default]
    Target,
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    Actor,
}

/// Active effect created on confirm, removed on reverse.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectTemplate {
    pub id: String,
    pub name: String,
    /// Rounds; `None` lasts until removed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<u32>,
    /// Status names the effect grants while active.
    #[cfg_attr(feature = "serde", serde(default))]
    pub statuses: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub recipient: EffectRecipient,
    /// Only applied to targets that were hit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub on_hit: bool,
}

/// Immutable template for one named action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionDefinition {
    pub id: ActionId,
    pub name: String,
    pub tags: Vec<TagId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: ActionCost,
    #[cfg_attr(feature = "serde", serde(default))]
    pub range: RangeSpec,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: TargetSpec,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scaling: Vec<Ability>,
    /// Base damage of actions that do not strike with a weapon.
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<EffectTemplate>,
}

impl ActionDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ActionId::new(id),
            name: name.into(),
            tags: Vec::new(),
            cost: ActionCost::default(),
            range: RangeSpec::default(),
            target: TargetSpec::default(),
            scaling: Vec::new(),
            damage: 0,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<TagId>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: ActionCost) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_range(mut self, range: RangeSpec) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_scaling(mut self, scaling: impl IntoIterator<Item = Ability>) -> Self {
        self.scaling.extend(scaling);
        self
    }

    #[must_use]
    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: EffectTemplate) -> Self {
        self.effects.push(effect);
        self
    }

    /// Validates declared tags against the registry.
    pub fn validate(&self, registry: &TagRegistry) -> Result<(), RegistryError> {
        registry.validate_declared(self.id.as_str(), &self.tags)
    }
}
