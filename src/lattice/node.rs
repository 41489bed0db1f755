//! Lattice nodes

use crate::model::{Declaration, Selector};
use std::collections::BTreeSet;

/// Stable arena index of a node
pub type NodeId = usize;

/// One concept of the sub-hierarchy, materialized for rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeNode {
    pub id: NodeId,
    /// Selectors owned by this node and none of its children
    pub selectors: BTreeSet<Selector>,
    /// Every selector of the concept
    pub extent: BTreeSet<Selector>,
    /// Concrete declarations plus one abstract declaration per property
    /// that is set everywhere in the extent with differing values
    pub declarations: BTreeSet<Declaration>,
    pub(crate) parents: BTreeSet<NodeId>,
    pub(crate) children: BTreeSet<NodeId>,
}

impl LatticeNode {
    pub fn new(
        id: NodeId,
        selectors: BTreeSet<Selector>,
        extent: BTreeSet<Selector>,
        declarations: BTreeSet<Declaration>,
    ) -> Self {
        Self {
            id,
            selectors,
            extent,
            declarations,
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }

    pub fn parents(&self) -> &BTreeSet<NodeId> {
        &self.parents
    }

    pub fn children(&self) -> &BTreeSet<NodeId> {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn has_selectors(&self) -> bool {
        !self.selectors.is_empty()
    }

    /// Concrete declarations
    pub fn concrete_declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(|d| d.is_concrete())
    }

    /// Abstract (parameter) declarations
    pub fn abstract_declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(|d| d.is_abstract())
    }

    /// Drop every abstract declaration whose property also has a concrete value here
    pub(crate) fn prune_abstract_declarations(&mut self) -> usize {
        let concrete: BTreeSet<_> = self
            .concrete_declarations()
            .map(|d| d.property.clone())
            .collect();
        let before = self.declarations.len();
        self.declarations
            .retain(|d| d.is_concrete() || !concrete.contains(&d.property));
        before - self.declarations.len()
    }
}
