//! Formal concept analysis
//!
//! Builds the selector/attribute relation from parsed rules and computes its
//! Galois sub-hierarchy: the object and attribute concepts ordered by extent
//! inclusion, with covering edges only.
//!
//! ```text
//! CssRule[] ──► FormalContext ──► gsh::compute ──► GaloisSubHierarchy
//! ```

mod concept;
mod context;
mod gsh;

pub use concept::Concept;
pub use context::{Attribute, AttributeId, EntityId, FormalContext};
pub use gsh::{compute, GaloisSubHierarchy};
