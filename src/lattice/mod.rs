//! Mutable concept lattice
//!
//! Nodes live in an arena addressed by [`NodeId`]; parent and child links are
//! index sets, so diamond-shaped fan-in needs no shared ownership. Every
//! closure walks with an explicit visited set.
//!
//! Removing a node leaves an empty slot: ids stay stable for the whole run.

mod node;

pub use node::{LatticeNode, NodeId};

use crate::error::{Error, Result};
use crate::fca::{Attribute, FormalContext, GaloisSubHierarchy};
use crate::model::{Declaration, Selector};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Concept lattice as a DAG of [`LatticeNode`]s
#[derive(Debug, Clone, Default)]
pub struct Lattice {
    nodes: Vec<Option<LatticeNode>>,
}

impl Lattice {
    /// Materialize one node per concept, mirroring the concept edges
    ///
    /// Bare-property attributes become abstract declarations, which are then
    /// dropped wherever a concrete declaration for the same property exists.
    pub fn from_hierarchy(hierarchy: &GaloisSubHierarchy, context: &FormalContext) -> Self {
        let selectors_of = |entities: &BTreeSet<usize>| -> BTreeSet<Selector> {
            entities
                .iter()
                .filter_map(|&e| context.entity(e))
                .cloned()
                .collect()
        };

        let mut nodes: Vec<Option<LatticeNode>> = hierarchy
            .concepts()
            .iter()
            .enumerate()
            .map(|(id, concept)| {
                let declarations = concept
                    .intent
                    .iter()
                    .filter_map(|&a| context.attribute(a))
                    .map(|attribute| match attribute {
                        Attribute::Declaration(declaration) => declaration.clone(),
                        Attribute::Property(property) => Declaration::parameter(property.clone()),
                    })
                    .collect();
                Some(LatticeNode::new(
                    id,
                    selectors_of(&hierarchy.simplified_extent(id)),
                    selectors_of(&concept.extent),
                    declarations,
                ))
            })
            .collect();

        for (id, slot) in nodes.iter_mut().enumerate() {
            if let Some(node) = slot {
                node.parents = hierarchy.parents(id).cloned().unwrap_or_default();
                node.children = hierarchy.children(id).cloned().unwrap_or_default();
            }
        }

        let mut lattice = Self { nodes };
        let pruned = lattice.prune_abstract_declarations();
        tracing::debug!(
            nodes = lattice.len(),
            pruned_parameters = pruned,
            "materialized lattice"
        );
        lattice
    }

    fn prune_abstract_declarations(&mut self) -> usize {
        self.nodes
            .iter_mut()
            .flatten()
            .map(LatticeNode::prune_abstract_declarations)
            .sum()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&LatticeNode> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    /// Node lookup that treats a dangling id as a broken invariant
    pub fn get(&self, id: NodeId) -> Result<&LatticeNode> {
        self.node(id)
            .ok_or_else(|| Error::invariant(format!("lattice node {} does not exist", id)))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut LatticeNode> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::invariant(format!("lattice node {} does not exist", id)))
    }

    /// Live nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &LatticeNode> {
        self.nodes.iter().flatten()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes().map(|n| n.id).collect()
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes().filter(|n| n.is_root()).map(|n| n.id).collect()
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes().filter(|n| n.is_leaf()).map(|n| n.id).collect()
    }

    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if parent == child {
            return Err(Error::invariant(format!(
                "refusing self edge on lattice node {}",
                parent
            )));
        }
        self.get(child)?;
        self.get_mut(parent)?.children.insert(child);
        self.get_mut(child)?.parents.insert(parent);
        Ok(())
    }

    pub fn remove_edge(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get_mut(parent)?.children.remove(&child);
        self.get_mut(child)?.parents.remove(&parent);
        Ok(())
    }

    /// Detach a node from all neighbours and free its slot
    pub fn remove_node(&mut self, id: NodeId) -> Result<LatticeNode> {
        let node = self
            .nodes
            .get_mut(id)
            .and_then(Option::take)
            .ok_or_else(|| Error::invariant(format!("lattice node {} does not exist", id)))?;
        for parent in &node.parents {
            if let Ok(parent) = self.get_mut(*parent) {
                parent.children.remove(&id);
            }
        }
        for child in &node.children {
            if let Ok(child) = self.get_mut(*child) {
                child.parents.remove(&id);
            }
        }
        Ok(node)
    }

    /// Drop every child edge of a node
    pub fn clear_children(&mut self, id: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.get_mut(id)?.children);
        for child in children {
            self.get_mut(child)?.parents.remove(&id);
        }
        Ok(())
    }

    fn closure(&self, start: NodeId, direction: Direction) -> BTreeSet<NodeId> {
        let mut visited = BTreeSet::new();
        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(node) = self.node(id) {
                let next = match direction {
                    Direction::Up => &node.parents,
                    Direction::Down => &node.children,
                };
                pending.extend(next.iter().filter(|n| !visited.contains(*n)));
            }
        }
        visited
    }

    /// Transitive parents, excluding the node itself
    pub fn ancestors(&self, id: NodeId) -> BTreeSet<NodeId> {
        let mut ancestors = self.ancestors_inclusive(id);
        ancestors.remove(&id);
        ancestors
    }

    /// Transitive parents plus the node itself
    pub fn ancestors_inclusive(&self, id: NodeId) -> BTreeSet<NodeId> {
        self.closure(id, Direction::Up)
    }

    /// Transitive children, excluding the node itself
    pub fn descendants(&self, id: NodeId) -> BTreeSet<NodeId> {
        let mut descendants = self.descendants_inclusive(id);
        descendants.remove(&id);
        descendants
    }

    /// Transitive children plus the node itself
    pub fn descendants_inclusive(&self, id: NodeId) -> BTreeSet<NodeId> {
        self.closure(id, Direction::Down)
    }

    /// Declarations of the node not carried verbatim by any direct parent
    pub fn simplified_declarations(&self, id: NodeId) -> BTreeSet<Declaration> {
        let Some(node) = self.node(id) else {
            return BTreeSet::new();
        };
        node.declarations
            .iter()
            .filter(|declaration| {
                !node
                    .parents
                    .iter()
                    .filter_map(|&p| self.node(p))
                    .any(|parent| parent.declarations.contains(declaration))
            })
            .cloned()
            .collect()
    }

    /// Ancestors before descendants
    ///
    /// Depth-first from every node in id order, visiting parents first. Each
    /// node is entered once, so a cyclic lattice still yields every node.
    pub fn topological_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.len());
        let mut entered = BTreeSet::new();

        for start in self.node_ids() {
            let mut stack = vec![(start, false)];
            while let Some((id, expanded)) = stack.pop() {
                if expanded {
                    order.push(id);
                    continue;
                }
                if !entered.insert(id) {
                    continue;
                }
                stack.push((id, true));
                if let Some(node) = self.node(id) {
                    stack.extend(
                        node.parents
                            .iter()
                            .rev()
                            .filter(|p| !entered.contains(*p))
                            .map(|&p| (p, false)),
                    );
                }
            }
        }
        order
    }

    /// Fail if any node reaches itself through its parents
    pub fn check_acyclic(&self) -> Result<()> {
        for node in self.nodes() {
            let reachable = node
                .parents
                .iter()
                .any(|&parent| self.ancestors_inclusive(parent).contains(&node.id));
            if reachable {
                return Err(Error::invariant(format!(
                    "lattice node {} is its own ancestor",
                    node.id
                )));
            }
        }
        Ok(())
    }
}
