//! Property-group filter

use super::properties::belong_to_same_group;
use super::NodeFilter;
use crate::lattice::{Lattice, NodeId};

/// Rejects nodes whose declarations mix CSS property groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyGroupFilter;

impl NodeFilter for PropertyGroupFilter {
    fn name(&self) -> &'static str {
        "property-groups"
    }

    fn is_valid(&self, lattice: &Lattice, id: NodeId) -> bool {
        lattice.node(id).is_none_or(|node| {
            belong_to_same_group(node.declarations.iter().map(|d| d.property.name()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::tests::{lattice, node_with_selector};

    #[test]
    fn test_mixed_groups_rejected() {
        let lattice = lattice(&[
            (".a", &[("margin", "0"), ("padding", "0"), ("color", "red")]),
            (".b", &[("margin", "0"), ("padding", "0")]),
        ]);
        let a = node_with_selector(&lattice, ".a");
        let b = node_with_selector(&lattice, ".b");

        assert!(PropertyGroupFilter.is_valid(&lattice, b));
        assert!(!PropertyGroupFilter.is_valid(&lattice, a));
    }
}
