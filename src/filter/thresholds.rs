//! Threshold filter

use super::NodeFilter;
use crate::config::FactorizeConfig;
use crate::lattice::{Lattice, NodeId};

/// Rejects nodes that would make poor mixins
///
/// A node is rejected when it has children but too few uses, when it owns
/// too few concrete declarations, or when it needs too many parameters.
/// Uses are the children plus the node's own ruleset if it owns selectors.
/// Declaration counts are taken over the simplified view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdFilter {
    pub min_children: usize,
    pub min_declarations: usize,
    pub max_parameters: usize,
}

impl ThresholdFilter {
    pub fn from_config(config: &FactorizeConfig) -> Self {
        Self {
            min_children: config.min_children,
            min_declarations: config.min_declarations,
            max_parameters: config.max_parameters,
        }
    }
}

impl NodeFilter for ThresholdFilter {
    fn name(&self) -> &'static str {
        "thresholds"
    }

    fn is_valid(&self, lattice: &Lattice, id: NodeId) -> bool {
        let Some(node) = lattice.node(id) else {
            return true;
        };

        let children = node.children().len();
        let uses = children + usize::from(node.has_selectors());
        let simplified = lattice.simplified_declarations(id);
        let concrete = simplified.iter().filter(|d| d.is_concrete()).count();
        let parameters = simplified.len() - concrete;

        let too_few_uses = children > 0 && uses < self.min_children;
        !(too_few_uses || concrete < self.min_declarations || parameters > self.max_parameters)
    }
}
