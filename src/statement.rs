//! Output statements: mixins, rulesets and the calls between them

use crate::error::{Error, Result};
use crate::model::{Declaration, Position, Property, Selector};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Why a mixin was created; decides its name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MixinOrigin {
    /// Factors a lattice node (`m` prefix)
    Factoring,
    /// Shares a ruleset body between split selectors (`s` prefix)
    Ordering,
}

impl MixinOrigin {
    pub fn prefix(self) -> &'static str {
        match self {
            MixinOrigin::Factoring => "m",
            MixinOrigin::Ordering => "s",
        }
    }
}

/// Mixin name generator
///
/// One counter for both prefixes, so names are unique across origins.
/// Threaded through generation and repair; a fresh namer per run keeps
/// runs reproducible.
#[derive(Debug, Clone, Default)]
pub struct MixinNamer {
    issued: usize,
}

impl MixinNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, origin: MixinOrigin) -> String {
        self.issued += 1;
        format!("{}{}", origin.prefix(), self.issued)
    }

    /// Names issued so far
    pub fn issued(&self) -> usize {
        self.issued
    }
}

/// Named, optionally parameterized declaration block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mixin {
    pub name: String,
    pub origin: MixinOrigin,
    /// Ordered parameters; every call passes one argument per entry
    pub parameters: Vec<Property>,
    pub declarations: Vec<Declaration>,
    pub calls: Vec<MixinCall>,
    /// Selectors whose declarations this mixin factors
    pub selectors: BTreeSet<Selector>,
}

impl Mixin {
    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }
}

/// Invocation of a mixin with positional arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixinCall {
    pub mixin: String,
    /// One declaration per target parameter, same property, same order
    pub arguments: Vec<Declaration>,
}

impl MixinCall {
    /// Build a call, checking arity and argument properties against the target
    pub fn new(target: &Mixin, arguments: Vec<Declaration>) -> Result<Self> {
        if arguments.len() != target.parameters.len() {
            return Err(Error::invariant(format!(
                "call to mixin {} passes {} arguments for {} parameters",
                target.name,
                arguments.len(),
                target.parameters.len()
            )));
        }
        for (index, (argument, parameter)) in arguments.iter().zip(&target.parameters).enumerate() {
            if &argument.property != parameter {
                return Err(Error::invariant(format!(
                    "call to mixin {} passes {} as argument {} (parameter {})",
                    target.name, argument.property, index, parameter
                )));
            }
        }
        Ok(Self {
            mixin: target.name.clone(),
            arguments,
        })
    }
}

/// Selectors with their declarations and included mixins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    pub selectors: BTreeSet<Selector>,
    pub declarations: Vec<Declaration>,
    pub calls: Vec<MixinCall>,
}

impl Ruleset {
    /// Ruleset whose only content is a call
    pub fn including(selectors: BTreeSet<Selector>, call: MixinCall) -> Self {
        Self {
            selectors,
            declarations: Vec::new(),
            calls: vec![call],
        }
    }

    /// Position of the earliest selector
    pub fn position(&self) -> Option<Position> {
        self.selectors.first().map(|s| s.position)
    }

    pub fn concrete_count(&self) -> usize {
        self.declarations.iter().filter(|d| d.is_concrete()).count()
    }

    pub fn abstract_count(&self) -> usize {
        self.declarations.iter().filter(|d| d.is_abstract()).count()
    }

    /// Same declarations and calls, selectors aside
    pub fn same_body(&self, other: &Ruleset) -> bool {
        self.declarations == other.declarations && self.calls == other.calls
    }
}

/// Generated statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    Mixin(Mixin),
    Ruleset(Ruleset),
}

impl fmt::Display for MixinCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.mixin)?;
        for (index, argument) in self.arguments.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            match argument.concrete_value() {
                Some(value) => f.write_str(value)?,
                None => write!(f, "${}", argument.property)?,
            }
        }
        f.write_str(")")
    }
}
