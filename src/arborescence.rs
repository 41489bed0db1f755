//! Spanning arborescence reduction
//!
//! Nodes reached through several parents inherit the same declarations along
//! several lines. This pass keeps one parent per such node (within each root's
//! reach), then deletes the nodes left with neither children nor selectors.
//! Declarations that were inherited through a severed edge become the
//! node's own again.

use crate::error::Result;
use crate::lattice::{Lattice, NodeId};
use std::collections::BTreeSet;

/// Strategy choosing the parent a multi-parent node keeps
pub trait ParentSelection {
    fn select(&self, lattice: &Lattice, parents: &BTreeSet<NodeId>) -> Option<NodeId>;
}

/// Keep the parent whose lineage carries the most declarations
///
/// The score of a parent is the sum of simplified-declaration counts over
/// the parent and all its ancestors. Ties go to the lowest node id.
#[derive(Debug, Clone, Copy, Default)]
pub struct RichestLineage;

impl ParentSelection for RichestLineage {
    fn select(&self, lattice: &Lattice, parents: &BTreeSet<NodeId>) -> Option<NodeId> {
        let mut best: Option<(NodeId, usize)> = None;
        for &parent in parents {
            let score: usize = lattice
                .ancestors_inclusive(parent)
                .into_iter()
                .map(|ancestor| lattice.simplified_declarations(ancestor).len())
                .sum();
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((parent, score));
            }
        }
        best.map(|(parent, _)| parent)
    }
}

/// What a reduction removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reduction {
    pub severed_edges: usize,
    pub removed_nodes: usize,
}

/// Reduce with the default [`RichestLineage`] strategy
pub fn reduce(lattice: &mut Lattice) -> Result<Reduction> {
    reduce_with(lattice, &RichestLineage)
}

pub fn reduce_with(lattice: &mut Lattice, strategy: &dyn ParentSelection) -> Result<Reduction> {
    let mut reduction = Reduction::default();

    for root in lattice.roots() {
        let direct: BTreeSet<NodeId> = lattice.get(root)?.children().clone();
        let great_children: Vec<NodeId> = lattice
            .descendants(root)
            .into_iter()
            .filter(|n| !direct.contains(n))
            .collect();

        for node in great_children {
            let parents = lattice.get(node)?.parents().clone();
            if parents.len() < 2 {
                continue;
            }
            let Some(selected) = strategy.select(lattice, &parents) else {
                continue;
            };
            for other in parents {
                if other != selected && lattice.ancestors_inclusive(other).contains(&root) {
                    lattice.remove_edge(other, node)?;
                    reduction.severed_edges += 1;
                }
            }
        }
    }

    let mut order = lattice.topological_order();
    order.reverse();
    for id in order {
        let node = lattice.get(id)?;
        if node.is_leaf() && !node.has_selectors() {
            lattice.remove_node(id)?;
            reduction.removed_nodes += 1;
        }
    }

    tracing::debug!(
        severed_edges = reduction.severed_edges,
        removed_nodes = reduction.removed_nodes,
        remaining = lattice.len(),
        "reduced lattice to spanning arborescence"
    );
    Ok(reduction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::tests::{lattice, node_with_selector};

    fn diamond() -> Lattice {
        // .d sits under .b and .c, both under .a
        lattice(&[
            (".a", &[("color", "red")]),
            (".b", &[("color", "red"), ("margin", "0"), ("padding", "0")]),
            (".c", &[("color", "red"), ("border", "0")]),
            (
                ".d",
                &[("color", "red"), ("margin", "0"), ("padding", "0"), ("border", "0")],
            ),
        ])
    }

    #[test]
    fn test_richest_lineage_wins() {
        let lattice = diamond();
        let b = node_with_selector(&lattice, ".b");
        let c = node_with_selector(&lattice, ".c");

        let selected = RichestLineage.select(&lattice, &BTreeSet::from([b, c]));
        assert_eq!(selected, Some(b));
    }

    #[test]
    fn test_reduce_diamond() {
        let mut lattice = diamond();
        let b = node_with_selector(&lattice, ".b");
        let d = node_with_selector(&lattice, ".d");

        let reduction = reduce(&mut lattice).unwrap();

        assert_eq!(reduction.severed_edges, 1);
        assert_eq!(reduction.removed_nodes, 0);
        assert_eq!(lattice.get(d).unwrap().parents(), &BTreeSet::from([b]));
        assert!(lattice.nodes().all(|n| n.parents().len() <= 1));
    }

    #[test]
    fn test_dead_chain_is_collapsed() {
        // {.a,.b} shares margin but owns no selector; .a and .b also sit
        // under the nodes owning .e and .f
        let mut lattice = lattice(&[
            (".a", &[("color", "red"), ("margin", "0"), ("padding", "0")]),
            (".b", &[("color", "red"), ("margin", "0"), ("border", "0")]),
            (".e", &[("color", "red"), ("padding", "0")]),
            (".f", &[("color", "red"), ("border", "0")]),
            (".r", &[("color", "red")]),
        ]);
        let shared = lattice
            .nodes()
            .find(|n| !n.has_selectors())
            .map(|n| n.id)
            .unwrap();

        struct PreferOwners;
        impl ParentSelection for PreferOwners {
            fn select(&self, lattice: &Lattice, parents: &BTreeSet<NodeId>) -> Option<NodeId> {
                parents
                    .iter()
                    .copied()
                    .find(|&p| lattice.node(p).is_some_and(|n| n.has_selectors()))
            }
        }

        let reduction = reduce_with(&mut lattice, &PreferOwners).unwrap();
        assert_eq!(reduction.severed_edges, 2);
        assert_eq!(reduction.removed_nodes, 1);
        assert!(!lattice.contains(shared));
        assert_eq!(lattice.len(), 5);
        assert!(lattice.check_acyclic().is_ok());
    }
}
