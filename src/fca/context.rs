//! Formal context: selectors related to declarations and property names

use crate::model::{CssRule, Declaration, Property, Selector, SelectorIdentity, SelectorKey};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Index of an entity (selector) in its context
pub type EntityId = usize;
/// Index of an attribute in its context
pub type AttributeId = usize;

/// Attribute of the formal context
///
/// A selector carries each of its concrete declarations and, separately, the
/// bare name of each property it sets. The second kind lets a concept state
/// "this property is always set here" whatever the value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    Declaration(Declaration),
    Property(Property),
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Declaration(declaration) => write!(f, "{}", declaration.identifier()),
            Attribute::Property(property) => write!(f, "{}", property),
        }
    }
}

/// Bipartite entity/attribute relation
///
/// Entities and attributes are numbered in first-seen order, which fixes
/// every later iteration order.
#[derive(Debug, Clone, Default)]
pub struct FormalContext {
    entities: Vec<Selector>,
    entity_index: HashMap<SelectorKey, EntityId>,
    attributes: Vec<Attribute>,
    attribute_index: HashMap<Attribute, AttributeId>,
    entity_attributes: Vec<BTreeSet<AttributeId>>,
    attribute_entities: Vec<BTreeSet<EntityId>>,
}

impl FormalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the context for a rule sequence
    ///
    /// Rules whose selectors share a key under `identity` become one entity,
    /// represented by the first selector seen.
    pub fn from_rules(rules: &[CssRule], identity: SelectorIdentity) -> Self {
        let mut context = Self::new();
        for rule in rules {
            let entity = context.add_entity(&rule.selector, identity);
            for declaration in &rule.declarations {
                let attribute = context.add_attribute(Attribute::Declaration(declaration.clone()));
                context.add_relation(entity, attribute);
                let attribute =
                    context.add_attribute(Attribute::Property(declaration.property.clone()));
                context.add_relation(entity, attribute);
            }
        }
        tracing::debug!(
            entities = context.entity_count(),
            attributes = context.attribute_count(),
            "built formal context"
        );
        context
    }

    pub fn add_entity(&mut self, selector: &Selector, identity: SelectorIdentity) -> EntityId {
        let key = selector.key(identity);
        if let Some(&id) = self.entity_index.get(&key) {
            return id;
        }
        let id = self.entities.len();
        self.entities.push(selector.clone());
        self.entity_attributes.push(BTreeSet::new());
        self.entity_index.insert(key, id);
        id
    }

    pub fn add_attribute(&mut self, attribute: Attribute) -> AttributeId {
        if let Some(&id) = self.attribute_index.get(&attribute) {
            return id;
        }
        let id = self.attributes.len();
        self.attributes.push(attribute.clone());
        self.attribute_entities.push(BTreeSet::new());
        self.attribute_index.insert(attribute, id);
        id
    }

    /// Relate an entity and an attribute. Both ids must come from this context.
    pub fn add_relation(&mut self, entity: EntityId, attribute: AttributeId) {
        if let Some(attributes) = self.entity_attributes.get_mut(entity) {
            attributes.insert(attribute);
        }
        if let Some(entities) = self.attribute_entities.get_mut(attribute) {
            entities.insert(entity);
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Selector> {
        self.entities.get(id)
    }

    pub fn attribute(&self, id: AttributeId) -> Option<&Attribute> {
        self.attributes.get(id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> {
        0..self.entities.len()
    }

    pub fn attribute_ids(&self) -> impl Iterator<Item = AttributeId> {
        0..self.attributes.len()
    }

    /// Attributes related to `entity`
    pub fn attributes_of(&self, entity: EntityId) -> BTreeSet<AttributeId> {
        self.entity_attributes
            .get(entity)
            .cloned()
            .unwrap_or_default()
    }

    /// Entities related to `attribute`
    pub fn entities_of(&self, attribute: AttributeId) -> BTreeSet<EntityId> {
        self.attribute_entities
            .get(attribute)
            .cloned()
            .unwrap_or_default()
    }

    /// Attributes shared by every entity in `extent` (all attributes when empty)
    pub fn common_attributes(&self, extent: &BTreeSet<EntityId>) -> BTreeSet<AttributeId> {
        let mut common: BTreeSet<AttributeId> = self.attribute_ids().collect();
        for &entity in extent {
            let attributes = self.attributes_of(entity);
            common.retain(|a| attributes.contains(a));
        }
        common
    }

    /// Entities carrying every attribute in `intent` (all entities when empty)
    pub fn common_entities(&self, intent: &BTreeSet<AttributeId>) -> BTreeSet<EntityId> {
        let mut common: BTreeSet<EntityId> = self.entity_ids().collect();
        for &attribute in intent {
            let entities = self.entities_of(attribute);
            common.retain(|e| entities.contains(e));
        }
        common
    }
}
