//! Tag registry with a precomputed propagation closure table.
//!
//! The registry is built once when content loads. Building validates the catalog
//! (duplicates, unknown propagation targets, cycles, the single always-last tag)
//! and computes, per tag, the fixed point of its propagation edges. Resolving a
//! requested tag set at runtime is then a union of table rows followed by a sort
//! on `(priority, registration order)`, so the same request always yields the
//! same execution sequence.

use std::collections::{BTreeSet, HashMap};

use crate::config::RulesConfig;

use super::descriptor::{TagDescriptor, TagId};
use super::error::RegistryError;

/// Static catalog of tags, keyed by id, in registration order.
#[derive(Clone, Debug)]
pub struct TagRegistry {
    tags: Vec<TagDescriptor>,
    index: HashMap<TagId, usize>,
    /// Per tag: registration indices of the tag itself and everything it implies.
    closure: Vec<BTreeSet<usize>>,
}

impl TagRegistry {
    /// Builds a registry, using the default propagation guard.
    pub fn new(
        descriptors: impl IntoIterator<Item = TagDescriptor>,
    ) -> Result<Self, RegistryError> {
        Self::with_depth(descriptors, RulesConfig::DEFAULT_MAX_PROPAGATION_DEPTH)
    }

    /// Builds a registry with an explicit bound on propagation expansions.
    pub fn with_depth(
        descriptors: impl IntoIterator<Item = TagDescriptor>,
        max_depth: usize,
    ) -> Result<Self, RegistryError> {
        let tags: Vec<TagDescriptor> = descriptors.into_iter().collect();

        let mut index = HashMap::with_capacity(tags.len());
        for (position, tag) in tags.iter().enumerate() {
            if index.insert(tag.id.clone(), position).is_some() {
                return Err(RegistryError::DuplicateTag(tag.id.clone()));
            }
        }

        let mut edges = Vec::with_capacity(tags.len());
        let mut last: Option<&TagId> = None;
        for tag in &tags {
            let targets = tag
                .propagate
                .iter()
                .map(|target| {
                    index
                        .get(target)
                        .copied()
                        .ok_or_else(|| RegistryError::UnknownPropagation {
                            tag: tag.id.clone(),
                            target: target.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            edges.push(targets);

            if tag.priority.is_last() {
                if let Some(first) = last {
                    return Err(RegistryError::MultipleLastTags {
                        first: first.clone(),
                        second: tag.id.clone(),
                    });
                }
                last = Some(&tag.id);
            }
        }

        detect_cycle(&tags, &edges)?;

        let closure = (0..tags.len())
            .map(|root| {
                close_over(root, &edges, max_depth).ok_or_else(|| {
                    RegistryError::PropagationDidNotConverge {
                        tag: tags[root].id.clone(),
                        depth: max_depth,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            tags,
            index,
            closure,
        })
    }

    pub fn get(&self, id: &str) -> Option<&TagDescriptor> {
        self.index.get(id).map(|&position| &self.tags[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TagDescriptor> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The tag itself plus every tag it transitively implies, in registration order.
    pub fn closure_of(&self, id: &str) -> Option<impl Iterator<Item = &TagId>> {
        let position = *self.index.get(id)?;
        Some(self.closure[position].iter().map(|&i| &self.tags[i].id))
    }

    /// Resolves a requested tag set into its closure, sorted for execution.
    ///
    /// Duplicates collapse to a single instance whether they were requested
    /// directly or reached through propagation.
    pub fn resolve<'a>(
        &self,
        requested: impl IntoIterator<Item = &'a TagId>,
    ) -> Result<ResolvedTags, RegistryError> {
        let mut members = BTreeSet::new();
        for id in requested {
            let position = self
                .index
                .get(id)
                .copied()
                .ok_or_else(|| RegistryError::UnknownTag(id.clone()))?;
            members.extend(self.closure[position].iter().copied());
        }

        let mut ordered: Vec<usize> = members.into_iter().collect();
        ordered.sort_by_key(|&position| (self.tags[position].priority, position));

        Ok(ResolvedTags(
            ordered
                .into_iter()
                .map(|position| self.tags[position].id.clone())
                .collect(),
        ))
    }

    /// Checks the tags an action declares: all known, none internal.
    pub fn validate_declared(&self, action: &str, declared: &[TagId]) -> Result<(), RegistryError> {
        for tag in declared {
            match self.get(tag.as_str()) {
                None => {
                    return Err(RegistryError::UnknownActionTag {
                        action: action.to_owned(),
                        tag: tag.clone(),
                    });
                }
                Some(descriptor) if descriptor.internal => {
                    return Err(RegistryError::InternalTagDeclared {
                        action: action.to_owned(),
                        tag: tag.clone(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Fixed point of set union over propagation edges, bounded by `max_depth` expansions.
fn close_over(root: usize, edges: &[Vec<usize>], max_depth: usize) -> Option<BTreeSet<usize>> {
    let mut closed = BTreeSet::from([root]);
    for _ in 0..=max_depth {
        let mut next = closed.clone();
        for &member in &closed {
            next.extend(edges[member].iter().copied());
        }
        if next.len() == closed.len() {
            return Some(closed);
        }
        closed = next;
    }
    None
}

fn detect_cycle(tags: &[TagDescriptor], edges: &[Vec<usize>]) -> Result<(), RegistryError> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        Active,
        Done,
    }

    fn visit(
        node: usize,
        edges: &[Vec<usize>],
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
    ) -> Option<Vec<usize>> {
        marks[node] = Mark::Active;
        stack.push(node);
        for &next in &edges[node] {
            match marks[next] {
                Mark::Active => {
                    let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                Mark::Unvisited => {
                    if let Some(cycle) = visit(next, edges, marks, stack) {
                        return Some(cycle);
                    }
                }
                Mark::Done => {}
            }
        }
        stack.pop();
        marks[node] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::Unvisited; tags.len()];
    let mut stack = Vec::new();
    for root in 0..tags.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        if let Some(cycle) = visit(root, edges, &mut marks, &mut stack) {
            return Err(RegistryError::PropagationCycle {
                path: cycle.into_iter().map(|i| tags[i].id.clone()).collect(),
            });
        }
    }
    Ok(())
}

/// A deduplicated, execution-ordered tag set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ResolvedTags(Vec<TagId>);

impl ResolvedTags {
    pub fn iter(&self) -> impl Iterator<Item = &TagId> {
        self.0.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|tag| tag.as_str() == id)
    }

    pub fn as_slice(&self) -> &[TagId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResolvedTags {
    type Item = &'a TagId;
    type IntoIter = core::slice::Iter<'a, TagId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
