//! Node filtering
//!
//! A filter is a predicate over lattice nodes. Nodes it rejects are spliced
//! out: their parents adopt their children, so no descendant loses an
//! ancestor. A rejected node that owns selectors stays behind as a leaf
//! (it still has to produce a ruleset); one without selectors is deleted.
//!
//! Filters run in a fixed order, each over the topological order of the
//! lattice as left by the previous one.

mod groups;
mod properties;
mod thresholds;

pub use groups::PropertyGroupFilter;
pub use properties::{belong_to_same_group, group_of, PropertyGroup};
pub use thresholds::ThresholdFilter;

use crate::config::FactorizeConfig;
use crate::error::Result;
use crate::lattice::{Lattice, NodeId};

/// Node predicate used to prune the lattice
pub trait NodeFilter {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether `node` should stay in the lattice as it is
    fn is_valid(&self, lattice: &Lattice, node: NodeId) -> bool;
}

/// Filters enabled by a configuration, in application order
pub fn filters_for(config: &FactorizeConfig) -> Vec<Box<dyn NodeFilter>> {
    let mut filters: Vec<Box<dyn NodeFilter>> = Vec::new();
    if config.groups_filter {
        filters.push(Box::new(PropertyGroupFilter));
    }
    filters.push(Box::new(ThresholdFilter::from_config(config)));
    filters
}

/// Apply filters in order; returns the number of spliced nodes
pub fn apply_filters(lattice: &mut Lattice, filters: &[Box<dyn NodeFilter>]) -> Result<usize> {
    let mut spliced = 0;
    for filter in filters {
        spliced += apply_filter(lattice, filter.as_ref())?;
    }
    Ok(spliced)
}

/// Apply one filter over the current topological order
pub fn apply_filter(lattice: &mut Lattice, filter: &dyn NodeFilter) -> Result<usize> {
    let mut spliced = 0;
    for id in lattice.topological_order() {
        // deleted while splicing an earlier node
        if !lattice.contains(id) {
            continue;
        }
        if !filter.is_valid(lattice, id) {
            splice(lattice, id)?;
            spliced += 1;
        }
    }
    tracing::debug!(
        filter = filter.name(),
        spliced,
        remaining = lattice.len(),
        "filtered lattice"
    );
    Ok(spliced)
}

/// Remove a node from the inheritance chain
///
/// Every parent gains an edge to every child unless the child is already
/// reachable from it. Parents are ancestors and children descendants of the
/// node, so the new edges cannot close a cycle.
pub fn splice(lattice: &mut Lattice, id: NodeId) -> Result<()> {
    let node = lattice.get(id)?;
    let parents: Vec<NodeId> = node.parents().iter().copied().collect();
    let children: Vec<NodeId> = node.children().iter().copied().collect();

    if node.has_selectors() {
        lattice.clear_children(id)?;
    } else {
        lattice.remove_node(id)?;
    }

    for &parent in &parents {
        for &child in &children {
            if !lattice.descendants_inclusive(parent).contains(&child) {
                lattice.add_edge(parent, child)?;
            }
        }
    }
    Ok(())
}
