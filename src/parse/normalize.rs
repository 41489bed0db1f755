//! Duplicate declaration removal
//!
//! Applies the cascade ahead of factorization: inside a rule the last
//! declaration of a property wins, and across rules with the same selector
//! key the later rule wins. Rules left without declarations are dropped.

use crate::model::{CssRule, Declaration, Property, SelectorIdentity, SelectorKey};
use std::collections::{HashMap, HashSet};

/// Remove overridden declarations. Idempotent.
pub fn normalize(rules: &[CssRule], identity: SelectorIdentity) -> Vec<CssRule> {
    let mut normalized: Vec<CssRule> = rules
        .iter()
        .map(|rule| CssRule {
            declarations: last_per_property(&rule.declarations),
            ..rule.clone()
        })
        .collect();

    // Latest rule first, so whatever a later rule sets is already claimed.
    let mut order: Vec<usize> = (0..normalized.len()).collect();
    order.sort_by(|&a, &b| {
        (normalized[b].position, b).cmp(&(normalized[a].position, a))
    });

    let mut claimed: HashMap<SelectorKey, HashSet<Property>> = HashMap::new();
    for index in order {
        let rule = &mut normalized[index];
        let seen = claimed.entry(rule.selector.key(identity)).or_default();
        let properties: Vec<Property> = rule
            .declarations
            .iter()
            .map(|d| d.property.clone())
            .collect();
        rule.declarations.retain(|d| !seen.contains(&d.property));
        seen.extend(properties);
    }

    let before = normalized.len();
    normalized.retain(|rule| !rule.declarations.is_empty());
    if normalized.len() != before {
        tracing::debug!(
            dropped = before - normalized.len(),
            "rules emptied by duplicate removal"
        );
    }
    normalized
}

fn last_per_property(declarations: &[Declaration]) -> Vec<Declaration> {
    let mut seen = HashSet::new();
    let mut kept: Vec<Declaration> = declarations
        .iter()
        .rev()
        .filter(|d| seen.insert(d.property.clone()))
        .cloned()
        .collect();
    kept.reverse();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Position, Selector};
    use pretty_assertions::assert_eq;

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

    #[test]
    fn test_last_declaration_in_rule_wins() {
        let rules = vec![rule(
            ".a",
            1,
            &[("color", "red"), ("margin", "0"), ("color", "blue")],
        )];
        let normalized = normalize(&rules, SelectorIdentity::Textual);

        assert_eq!(
            normalized[0].declarations,
            vec![
                Declaration::concrete("margin", "0"),
                Declaration::concrete("color", "blue"),
            ]
        );
    }

    #[test]
    fn test_later_rule_wins_textual() {
        let rules = vec![
            rule(".a", 1, &[("color", "red"), ("margin", "0")]),
            rule(".a", 5, &[("color", "blue")]),
        ];
        let normalized = normalize(&rules, SelectorIdentity::Textual);

        assert_eq!(normalized.len(), 2);
        assert_eq!(
            normalized[0].declarations,
            vec![Declaration::concrete("margin", "0")]
        );
        assert_eq!(
            normalized[1].declarations,
            vec![Declaration::concrete("color", "blue")]
        );
    }

    #[test]
    fn test_positional_identity_keeps_rules_apart() {
        let rules = vec![
            rule(".a", 1, &[("color", "red")]),
            rule(".a", 5, &[("color", "blue")]),
        ];
        let normalized = normalize(&rules, SelectorIdentity::Positional);
        assert_eq!(normalized, rules);
    }

    #[test]
    fn test_emptied_rule_is_dropped() {
        let rules = vec![
            rule(".a", 1, &[("color", "red")]),
            rule(".b", 2, &[("color", "red")]),
            rule(".a", 3, &[("color", "blue")]),
        ];
        let normalized = normalize(&rules, SelectorIdentity::Textual);

        let selectors: Vec<&str> = normalized
            .iter()
            .map(|r| r.selector.text.as_str())
            .collect();
        assert_eq!(selectors, vec![".b", ".a"]);
    }

    #[test]
    fn test_idempotent() {
        let rules = vec![
            rule(".a", 1, &[("color", "red"), ("color", "green")]),
            rule(".b", 2, &[("color", "red")]),
            rule(".a", 3, &[("margin", "0"), ("color", "blue")]),
        ];
        let once = normalize(&rules, SelectorIdentity::Textual);
        let twice = normalize(&once, SelectorIdentity::Textual);
        assert_eq!(once, twice);
    }
}
