//! Statement generation
//!
//! Walks the lattice ancestors first. A node with children becomes a mixin
//! that includes the mixins of its parents; a leaf becomes a ruleset. When a
//! parent mixin takes parameters, the node passes its own concrete value for
//! each one, or forwards the parameter by taking it as a parameter itself.

use crate::error::{Error, Result};
use crate::lattice::{Lattice, NodeId};
use crate::model::{Declaration, Property};
use crate::statement::{Mixin, MixinCall, MixinNamer, MixinOrigin, Ruleset, Statement};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Emit statements for every node, in topological order
pub fn generate(lattice: &Lattice, namer: &mut MixinNamer) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();
    let mut mixin_of: HashMap<NodeId, usize> = HashMap::new();

    for id in lattice.topological_order() {
        let node = lattice.get(id)?;
        let simplified = lattice.simplified_declarations(id);

        let mut parameters: Vec<Property> = simplified
            .iter()
            .filter(|d| d.is_abstract())
            .map(|d| d.property.clone())
            .collect();
        let mut remaining: BTreeSet<Declaration> =
            simplified.iter().filter(|d| d.is_concrete()).cloned().collect();
        let concrete_by_property: BTreeMap<&Property, &Declaration> = node
            .concrete_declarations()
            .map(|d| (&d.property, d))
            .collect();

        let mut calls = Vec::with_capacity(node.parents().len());
        for parent in node.parents() {
            let target = mixin_of
                .get(parent)
                .and_then(|&index| match statements.get(index) {
                    Some(Statement::Mixin(mixin)) => Some(mixin),
                    _ => None,
                })
                .ok_or_else(|| {
                    Error::invariant(format!(
                        "node {} inherits from node {}, which produced no mixin",
                        id, parent
                    ))
                })?;

            let mut arguments = Vec::with_capacity(target.parameters.len());
            for parameter in &target.parameters {
                match concrete_by_property.get(parameter) {
                    Some(&declaration) => {
                        remaining.remove(declaration);
                        arguments.push(declaration.clone());
                    }
                    None => {
                        arguments.push(Declaration::parameter(parameter.clone()));
                        if !parameters.contains(parameter) {
                            parameters.push(parameter.clone());
                        }
                    }
                }
            }
            calls.push(MixinCall::new(target, arguments)?);
        }

        let mut declarations: Vec<Declaration> = remaining.into_iter().collect();
        declarations.extend(simplified.into_iter().filter(|d| d.is_abstract()));

        if node.is_leaf() {
            if !parameters.is_empty() {
                let names: Vec<&str> = parameters.iter().map(Property::name).collect();
                let selectors: Vec<&str> = node.selectors.iter().map(|s| s.text.as_str()).collect();
                return Err(Error::invariant(format!(
                    "leaf node {} ({}) has unresolved parameters: {}",
                    id,
                    selectors.join(", "),
                    names.join(", ")
                )));
            }
            if !node.has_selectors() {
                tracing::debug!(node = id, "skipping leaf without selectors");
                continue;
            }
            statements.push(Statement::Ruleset(Ruleset {
                selectors: node.selectors.clone(),
                declarations,
                calls,
            }));
            continue;
        }

        let mixin = Mixin {
            name: namer.next(MixinOrigin::Factoring),
            origin: MixinOrigin::Factoring,
            parameters,
            declarations,
            calls,
            selectors: node.extent.clone(),
        };
        tracing::debug!(
            node = id,
            mixin = %mixin.name,
            parameters = mixin.parameters.len(),
            declarations = mixin.declarations.len(),
            "generated mixin"
        );

        let own_ruleset = if node.has_selectors() {
            let arguments = mixin
                .parameters
                .iter()
                .map(|parameter| {
                    concrete_by_property
                        .get(parameter)
                        .map(|&d| d.clone())
                        .ok_or_else(|| {
                            Error::invariant(format!(
                                "node {} owns selectors but leaves parameter {} of mixin {} unbound",
                                id, parameter, mixin.name
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            Some(Ruleset::including(
                node.selectors.clone(),
                MixinCall::new(&mixin, arguments)?,
            ))
        } else {
            None
        };

        mixin_of.insert(id, statements.len());
        statements.push(Statement::Mixin(mixin));
        if let Some(ruleset) = own_ruleset {
            statements.push(Statement::Ruleset(ruleset));
        }
    }

    Ok(statements)
}
