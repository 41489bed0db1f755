//! Formal concepts

use super::context::{AttributeId, EntityId, FormalContext};
use std::collections::BTreeSet;

/// A Galois-closed (extent, intent) pair
///
/// Ordering is by extent then intent, which is the canonical order used to
/// number concepts in the sub-hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Concept {
    pub extent: BTreeSet<EntityId>,
    pub intent: BTreeSet<AttributeId>,
}

impl Concept {
    /// Object concept of `entity`: its attributes and every entity sharing them all
    pub fn of_entity(context: &FormalContext, entity: EntityId) -> Self {
        let intent = context.attributes_of(entity);
        let extent = context.common_entities(&intent);
        Self { extent, intent }
    }

    /// Attribute concept of `attribute`: its entities and every attribute they share
    pub fn of_attribute(context: &FormalContext, attribute: AttributeId) -> Self {
        let extent = context.entities_of(attribute);
        let intent = context.common_attributes(&extent);
        Self { extent, intent }
    }

    /// Extent inclusion: `self` covers every entity of `other`
    pub fn is_greater_than(&self, other: &Concept) -> bool {
        self.extent.is_superset(&other.extent)
    }

    pub fn is_smaller_than(&self, other: &Concept) -> bool {
        other.extent.is_superset(&self.extent)
    }

    /// Both halves are exactly the closure of the other
    pub fn is_closed(&self, context: &FormalContext) -> bool {
        context.common_attributes(&self.extent) == self.intent
            && context.common_entities(&self.intent) == self.extent
    }
}
