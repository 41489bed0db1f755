//! Equivalence checking: does the factorized output mean the same as the input?
//!
//! Expands every mixin inline (binding arguments to parameters), flattens the
//! result per selector, and compares it with the normalized input rules.
//! Under order-preserving modes it also checks that rulesets follow source
//! order.

use crate::config::FactorizeConfig;
use crate::error::{Error, Result};
use crate::model::{CssRule, Declaration, Position, Property, SelectorIdentity, SelectorKey};
use crate::pipeline::Factorized;
use crate::statement::{Mixin, MixinCall, Ruleset};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Check factorized output against the normalized rules it came from
pub fn check_equivalence(
    rules: &[CssRule],
    factorized: &Factorized,
    config: &FactorizeConfig,
) -> Result<EquivalenceReport> {
    EquivalenceChecker::new(CheckerConfig::for_factorize(config)).check(rules, factorized)
}

/// Equivalence checker
pub struct EquivalenceChecker {
    config: CheckerConfig,
}

/// Checker configuration
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// How input selectors are matched with output selectors
    pub identity: SelectorIdentity,
    /// Require rulesets to appear in source order
    pub check_order: bool,
}

impl CheckerConfig {
    pub fn for_factorize(config: &FactorizeConfig) -> Self {
        Self {
            identity: config.selector_identity(),
            check_order: config.semantics.preserves_order(),
        }
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self::for_factorize(&FactorizeConfig::default())
    }
}

/// Result of an equivalence check
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EquivalenceReport {
    /// Whether output and input agree
    pub passed: bool,
    /// Distinct selectors compared
    pub selectors_checked: usize,
    pub mismatches: Vec<Mismatch>,
    pub order_violations: Vec<OrderViolation>,
}

/// Per-selector difference between input and expanded output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    MissingSelector {
        selector: String,
    },
    ExtraSelector {
        selector: String,
    },
    MissingDeclaration {
        selector: String,
        property: String,
        expected: String,
    },
    ExtraDeclaration {
        selector: String,
        property: String,
        actual: String,
    },
    DifferentValue {
        selector: String,
        property: String,
        expected: String,
        actual: String,
    },
}

/// Ruleset emitted before one that precedes it in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OrderViolation {
    pub selector: String,
    pub position: Position,
    /// Position of the ruleset emitted just before it
    pub after: Position,
}

type Flattened = BTreeMap<SelectorKey, BTreeMap<Property, String>>;

impl EquivalenceChecker {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn check(&self, rules: &[CssRule], factorized: &Factorized) -> Result<EquivalenceReport> {
        let expected = self.flatten_rules(rules);
        let actual = self.flatten_output(factorized)?;

        let mut mismatches = Vec::new();
        for (key, expected_declarations) in &expected {
            let Some(actual_declarations) = actual.get(key) else {
                mismatches.push(Mismatch::MissingSelector {
                    selector: key.to_string(),
                });
                continue;
            };
            compare_declarations(key, expected_declarations, actual_declarations, &mut mismatches);
        }
        for key in actual.keys().filter(|k| !expected.contains_key(*k)) {
            mismatches.push(Mismatch::ExtraSelector {
                selector: key.to_string(),
            });
        }

        let order_violations = if self.config.check_order {
            order_violations(&factorized.rulesets)
        } else {
            Vec::new()
        };

        Ok(EquivalenceReport {
            passed: mismatches.is_empty() && order_violations.is_empty(),
            selectors_checked: expected.len(),
            mismatches,
            order_violations,
        })
    }

    fn flatten_rules(&self, rules: &[CssRule]) -> Flattened {
        let mut flattened = Flattened::new();
        for rule in rules {
            let entry = flattened.entry(rule.selector.key(self.config.identity)).or_default();
            for declaration in &rule.declarations {
                if let Some(value) = declaration.concrete_value() {
                    entry.insert(declaration.property.clone(), value.to_string());
                }
            }
        }
        flattened
    }

    fn flatten_output(&self, factorized: &Factorized) -> Result<Flattened> {
        let expander = Expander::new(&factorized.mixins);
        let mut flattened = Flattened::new();
        for ruleset in &factorized.rulesets {
            let expanded = expander.expand_ruleset(ruleset)?;
            for selector in &ruleset.selectors {
                let entry = flattened.entry(selector.key(self.config.identity)).or_default();
                for (property, value) in &expanded {
                    entry.insert(property.clone(), value.clone());
                }
            }
        }
        Ok(flattened)
    }
}

fn compare_declarations(
    key: &SelectorKey,
    expected: &BTreeMap<Property, String>,
    actual: &BTreeMap<Property, String>,
    mismatches: &mut Vec<Mismatch>,
) {
    for (property, expected_value) in expected {
        match actual.get(property) {
            None => mismatches.push(Mismatch::MissingDeclaration {
                selector: key.to_string(),
                property: property.to_string(),
                expected: expected_value.clone(),
            }),
            Some(actual_value) if actual_value != expected_value => {
                mismatches.push(Mismatch::DifferentValue {
                    selector: key.to_string(),
                    property: property.to_string(),
                    expected: expected_value.clone(),
                    actual: actual_value.clone(),
                })
            }
            Some(_) => {}
        }
    }
    for (property, actual_value) in actual.iter().filter(|(p, _)| !expected.contains_key(*p)) {
        mismatches.push(Mismatch::ExtraDeclaration {
            selector: key.to_string(),
            property: property.to_string(),
            actual: actual_value.clone(),
        });
    }
}

fn order_violations(rulesets: &[Ruleset]) -> Vec<OrderViolation> {
    let mut violations = Vec::new();
    let mut previous: Option<Position> = None;
    for ruleset in rulesets {
        let Some(position) = ruleset.position() else {
            continue;
        };
        if let Some(after) = previous.filter(|after| position < *after) {
            violations.push(OrderViolation {
                selector: ruleset
                    .selectors
                    .first()
                    .map(|s| s.text.clone())
                    .unwrap_or_default(),
                position,
                after,
            });
        }
        previous = Some(position);
    }
    violations
}

/// Inlines mixin calls
struct Expander<'a> {
    mixins: HashMap<&'a str, &'a Mixin>,
}

impl<'a> Expander<'a> {
    fn new(mixins: &'a [Mixin]) -> Self {
        Self {
            mixins: mixins.iter().map(|m| (m.name.as_str(), m)).collect(),
        }
    }

    /// Declarations a ruleset ends up with, in application order
    fn expand_ruleset(&self, ruleset: &'a Ruleset) -> Result<Vec<(Property, String)>> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        self.expand_body(
            &ruleset.declarations,
            &ruleset.calls,
            &HashMap::new(),
            &mut stack,
            &mut out,
        )?;
        Ok(out)
    }

    fn expand_body(
        &self,
        declarations: &'a [Declaration],
        calls: &'a [MixinCall],
        bindings: &HashMap<Property, String>,
        stack: &mut Vec<&'a str>,
        out: &mut Vec<(Property, String)>,
    ) -> Result<()> {
        for call in calls {
            self.expand_call(call, bindings, stack, out)?;
        }
        for declaration in declarations {
            out.push((declaration.property.clone(), resolve(declaration, bindings)?));
        }
        Ok(())
    }

    fn expand_call(
        &self,
        call: &'a MixinCall,
        bindings: &HashMap<Property, String>,
        stack: &mut Vec<&'a str>,
        out: &mut Vec<(Property, String)>,
    ) -> Result<()> {
        let mixin = *self
            .mixins
            .get(call.mixin.as_str())
            .ok_or_else(|| Error::invariant(format!("call to undefined mixin {}", call.mixin)))?;
        if stack.contains(&mixin.name.as_str()) {
            return Err(Error::invariant(format!(
                "mixin {} includes itself through {}",
                mixin.name,
                stack.join(" -> ")
            )));
        }
        if call.arguments.len() != mixin.parameters.len() {
            return Err(Error::invariant(format!(
                "call to mixin {} passes {} arguments for {} parameters",
                mixin.name,
                call.arguments.len(),
                mixin.parameters.len()
            )));
        }

        let inner = mixin
            .parameters
            .iter()
            .zip(&call.arguments)
            .map(|(parameter, argument)| Ok((parameter.clone(), resolve(argument, bindings)?)))
            .collect::<Result<HashMap<_, _>>>()?;

        stack.push(&mixin.name);
        self.expand_body(&mixin.declarations, &mixin.calls, &inner, stack, out)?;
        stack.pop();
        Ok(())
    }
}

fn resolve(declaration: &Declaration, bindings: &HashMap<Property, String>) -> Result<String> {
    match declaration.concrete_value() {
        Some(value) => Ok(value.to_string()),
        None => bindings.get(&declaration.property).cloned().ok_or_else(|| {
            Error::invariant(format!("parameter ${} is not bound", declaration.property))
        }),
    }
}

impl EquivalenceReport {
    /// Generate human-readable report
    pub fn to_report(&self) -> String {
        let mut out = String::new();

        let status = if self.passed {
            "✓ PASSED"
        } else {
            "✗ FAILED"
        };
        out.push_str(&format!("Equivalence: {}\n", status));
        out.push_str(&format!("Selectors checked: {}\n", self.selectors_checked));

        if !self.mismatches.is_empty() {
            out.push_str("\nMismatches:\n");
            for mismatch in &self.mismatches {
                let line = match mismatch {
                    Mismatch::MissingSelector { selector } => {
                        format!("  {} [MISSING SELECTOR]", selector)
                    }
                    Mismatch::ExtraSelector { selector } => {
                        format!("  {} [EXTRA SELECTOR]", selector)
                    }
                    Mismatch::MissingDeclaration {
                        selector,
                        property,
                        expected,
                    } => format!("  {} [MISSING]: {}: {}", selector, property, expected),
                    Mismatch::ExtraDeclaration {
                        selector,
                        property,
                        actual,
                    } => format!("  {} [EXTRA]: {}: {}", selector, property, actual),
                    Mismatch::DifferentValue {
                        selector,
                        property,
                        expected,
                        actual,
                    } => format!(
                        "  {} [VALUE]: {}: {} → {}",
                        selector, property, expected, actual
                    ),
                };
                out.push_str(&line);
                out.push('\n');
            }
        }

        if !self.order_violations.is_empty() {
            out.push_str("\nOrder violations:\n");
            for violation in &self.order_violations {
                out.push_str(&format!(
                    "  {} ({}) emitted after a rule from {}\n",
                    violation.selector, violation.position, violation.after
                ));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Selector;
    use crate::statement::MixinOrigin;
    use std::collections::BTreeSet;

    fn rule(selector: &str, line: usize, declarations: &[(&str, &str)]) -> CssRule {
        CssRule::new(
            Selector::new(selector, Position::new(line, 1)),
            declarations
                .iter()
                .map(|(p, v)| Declaration::concrete(*p, *v))
                .collect(),
            Position::new(line, 1),
        )
    }

    fn color_mixin() -> Mixin {
        Mixin {
            name: "m1".into(),
            origin: MixinOrigin::Factoring,
            parameters: vec![Property::new("color")],
            declarations: vec![
                Declaration::parameter(Property::new("color")),
                Declaration::concrete("margin", "0"),
            ],
            calls: Vec::new(),
            selectors: BTreeSet::new(),
        }
    }

    fn including(selector: &str, line: usize, color: &str) -> Ruleset {
        Ruleset::including(
            BTreeSet::from([Selector::new(selector, Position::new(line, 1))]),
            MixinCall::new(&color_mixin(), vec![Declaration::concrete("color", color)]).unwrap(),
        )
    }

    fn textual() -> CheckerConfig {
        CheckerConfig {
            identity: SelectorIdentity::Textual,
            check_order: true,
        }
    }

    #[test]
    fn test_expanded_output_matches() {
        let rules = vec![
            rule(".a", 1, &[("color", "red"), ("margin", "0")]),
            rule(".b", 2, &[("color", "blue"), ("margin", "0")]),
        ];
        let factorized = Factorized {
            mixins: vec![color_mixin()],
            rulesets: vec![including(".a", 1, "red"), including(".b", 2, "blue")],
        };

        let report = EquivalenceChecker::new(textual())
            .check(&rules, &factorized)
            .unwrap();
        assert!(report.passed, "{}", report.to_report());
        assert_eq!(report.selectors_checked, 2);
    }

    #[test]
    fn test_wrong_argument_is_reported() {
        let rules = vec![rule(".a", 1, &[("color", "red"), ("margin", "0")])];
        let factorized = Factorized {
            mixins: vec![color_mixin()],
            rulesets: vec![including(".a", 1, "blue")],
        };

        let report = EquivalenceChecker::new(textual())
            .check(&rules, &factorized)
            .unwrap();
        assert!(!report.passed);
        assert_eq!(
            report.mismatches,
            vec![Mismatch::DifferentValue {
                selector: ".a".into(),
                property: "color".into(),
                expected: "red".into(),
                actual: "blue".into(),
            }]
        );
        assert!(report.to_report().contains("✗ FAILED"));
    }

    #[test]
    fn test_order_violation_is_reported() {
        let rules = vec![
            rule(".a", 1, &[("color", "red"), ("margin", "0")]),
            rule(".b", 2, &[("color", "blue"), ("margin", "0")]),
        ];
        let factorized = Factorized {
            mixins: vec![color_mixin()],
            rulesets: vec![including(".b", 2, "blue"), including(".a", 1, "red")],
        };

        let report = EquivalenceChecker::new(textual())
            .check(&rules, &factorized)
            .unwrap();
        assert!(report.mismatches.is_empty());
        assert_eq!(report.order_violations.len(), 1);
        assert_eq!(report.order_violations[0].selector, ".a");
    }

    #[test]
    fn test_unbound_parameter_is_an_invariant_error() {
        let rules = vec![rule(".a", 1, &[("margin", "0")])];
        let factorized = Factorized {
            mixins: vec![color_mixin()],
            rulesets: vec![Ruleset {
                selectors: BTreeSet::from([Selector::new(".a", Position::new(1, 1))]),
                declarations: Vec::new(),
                calls: vec![MixinCall {
                    mixin: "m1".into(),
                    arguments: vec![Declaration::parameter(Property::new("color"))],
                }],
            }],
        };

        let result = EquivalenceChecker::new(textual()).check(&rules, &factorized);
        assert!(matches!(result, Err(Error::Invariant(_))));
    }
}
