//! Galois sub-hierarchy construction
//!
//! Collects the object concept of every entity and the attribute concept of
//! every attribute, then links each concept to the minimal concepts above it.
//! Concepts are numbered in canonical (extent, intent) order so the resulting
//! graph does not depend on hashing.

use super::concept::Concept;
use super::context::{EntityId, FormalContext};
use std::collections::BTreeSet;

/// Concepts plus their covering edges, parents having the larger extents
#[derive(Debug, Clone, Default)]
pub struct GaloisSubHierarchy {
    concepts: Vec<Concept>,
    parents: Vec<BTreeSet<usize>>,
    children: Vec<BTreeSet<usize>>,
}

impl GaloisSubHierarchy {
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn concept(&self, index: usize) -> Option<&Concept> {
        self.concepts.get(index)
    }

    pub fn parents(&self, index: usize) -> Option<&BTreeSet<usize>> {
        self.parents.get(index)
    }

    pub fn children(&self, index: usize) -> Option<&BTreeSet<usize>> {
        self.children.get(index)
    }

    /// Entities of the concept not already present in one of its children
    pub fn simplified_extent(&self, index: usize) -> BTreeSet<EntityId> {
        let Some(concept) = self.concepts.get(index) else {
            return BTreeSet::new();
        };
        let mut extent = concept.extent.clone();
        for &child in self.children.get(index).into_iter().flatten() {
            if let Some(child) = self.concepts.get(child) {
                extent.retain(|e| !child.extent.contains(e));
            }
        }
        extent
    }

    fn link(&mut self, child: usize, parent: usize) {
        self.parents[child].insert(parent);
        self.children[parent].insert(child);
    }
}

/// Compute the Galois sub-hierarchy of a context
pub fn compute(context: &FormalContext) -> GaloisSubHierarchy {
    let candidates: BTreeSet<Concept> = context
        .entity_ids()
        .map(|entity| Concept::of_entity(context, entity))
        .chain(
            context
                .attribute_ids()
                .map(|attribute| Concept::of_attribute(context, attribute)),
        )
        .collect();

    let concepts: Vec<Concept> = candidates.into_iter().collect();
    let count = concepts.len();
    let mut hierarchy = GaloisSubHierarchy {
        concepts,
        parents: vec![BTreeSet::new(); count],
        children: vec![BTreeSet::new(); count],
    };

    let mut inserted = vec![false; count];
    for index in 0..count {
        insert(&mut hierarchy, index, &mut inserted);
    }

    tracing::debug!(
        concepts = hierarchy.len(),
        edges = hierarchy.parents.iter().map(BTreeSet::len).sum::<usize>(),
        "computed galois sub-hierarchy"
    );
    hierarchy
}

/// Insert a concept after every greater concept, then attach it below the
/// minimal ones. Runs on an explicit stack: chains can be as long as the
/// number of concepts.
fn insert(hierarchy: &mut GaloisSubHierarchy, start: usize, inserted: &mut [bool]) {
    let mut stack = vec![start];
    while let Some(&index) = stack.last() {
        if inserted[index] {
            stack.pop();
            continue;
        }

        let greaters = greater_concepts(&hierarchy.concepts, index);
        let pending: Vec<usize> = greaters.iter().copied().filter(|&g| !inserted[g]).collect();
        if !pending.is_empty() {
            stack.extend(pending);
            continue;
        }

        stack.pop();
        inserted[index] = true;
        for parent in minimal(&hierarchy.concepts, &greaters) {
            hierarchy.link(index, parent);
        }
    }
}

/// Concepts whose extent is a strict superset of the concept's extent
fn greater_concepts(concepts: &[Concept], index: usize) -> Vec<usize> {
    let concept = &concepts[index];
    concepts
        .iter()
        .enumerate()
        .filter(|&(candidate, other)| candidate != index && other.is_greater_than(concept))
        .map(|(candidate, _)| candidate)
        .collect()
}

/// Elements of `candidates` not above another element of `candidates`
fn minimal(concepts: &[Concept], candidates: &[usize]) -> Vec<usize> {
    candidates
        .iter()
        .copied()
        .filter(|&candidate| {
            !candidates.iter().any(|&other| {
                other != candidate && concepts[other].is_smaller_than(&concepts[candidate])
            })
        })
        .collect()
}
