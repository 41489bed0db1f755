//! Cascade-order repair
//!
//! Generated rulesets group selectors by shared declarations, which loses
//! the source order the cascade depends on. Repair splits multi-selector
//! rulesets, re-merges neighbours that came from the same source line, and
//! sorts the result by source position.

use crate::config::FactorizeConfig;
use crate::error::Result;
use crate::statement::{Mixin, MixinCall, MixinNamer, MixinOrigin, Ruleset};
use std::collections::BTreeSet;

/// Split, sort and merge rulesets; new `s` mixins are appended to `mixins`
pub fn repair(
    mixins: &mut Vec<Mixin>,
    rulesets: Vec<Ruleset>,
    config: &FactorizeConfig,
    namer: &mut MixinNamer,
) -> Result<Vec<Ruleset>> {
    let mut split = Vec::with_capacity(rulesets.len());
    for ruleset in rulesets {
        split.extend(split_selectors(ruleset, mixins, config, namer)?);
    }

    split.sort_by_key(Ruleset::position);
    let merged = merge_same_line(split);
    tracing::debug!(rulesets = merged.len(), mixins = mixins.len(), "repaired rule order");
    Ok(merged)
}

/// One ruleset per selector
///
/// Bodies that are a lone include, or too small to be worth a mixin, are
/// copied to every selector. Otherwise, when the mode allows it, the body
/// moves into a new `s` mixin that each selector includes.
fn split_selectors(
    ruleset: Ruleset,
    mixins: &mut Vec<Mixin>,
    config: &FactorizeConfig,
    namer: &mut MixinNamer,
) -> Result<Vec<Ruleset>> {
    if ruleset.selectors.len() <= 1 {
        return Ok(vec![ruleset]);
    }

    let forwarding = ruleset.declarations.is_empty() && ruleset.calls.len() == 1;
    let too_small = ruleset.concrete_count() < config.min_declarations
        || ruleset.abstract_count() > config.max_parameters;

    if forwarding || too_small || !config.semantics.allows_new_mixins() {
        return Ok(ruleset
            .selectors
            .iter()
            .map(|selector| Ruleset {
                selectors: BTreeSet::from([selector.clone()]),
                declarations: ruleset.declarations.clone(),
                calls: ruleset.calls.clone(),
            })
            .collect());
    }

    let mixin = Mixin {
        name: namer.next(MixinOrigin::Ordering),
        origin: MixinOrigin::Ordering,
        parameters: Vec::new(),
        declarations: ruleset.declarations,
        calls: ruleset.calls,
        selectors: ruleset.selectors.clone(),
    };
    let call = MixinCall::new(&mixin, Vec::new())?;
    let split = ruleset
        .selectors
        .into_iter()
        .map(|selector| Ruleset::including(BTreeSet::from([selector]), call.clone()))
        .collect();
    mixins.push(mixin);
    Ok(split)
}

/// Merge neighbours on the same source line that have the same body
fn merge_same_line(rulesets: Vec<Ruleset>) -> Vec<Ruleset> {
    let mut merged: Vec<Ruleset> = Vec::with_capacity(rulesets.len());
    for ruleset in rulesets {
        if let Some(previous) = merged.last_mut() {
            let same_line = previous.position().map(|p| p.line) == ruleset.position().map(|p| p.line);
            if same_line && previous.same_body(&ruleset) {
                previous.selectors.extend(ruleset.selectors);
                continue;
            }
        }
        merged.push(ruleset);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SemanticMode;
    use crate::model::{Declaration, Position, Selector};
    use pretty_assertions::assert_eq;

    fn selector(text: &str, line: usize, column: usize) -> Selector {
        Selector::new(text, Position::new(line, column))
    }

    fn include(name: &str) -> MixinCall {
        MixinCall {
            mixin: name.into(),
            arguments: Vec::new(),
        }
    }

    fn ruleset(selectors: &[Selector], declarations: &[(&str, &str)], calls: &[&str]) -> Ruleset {
        Ruleset {
            selectors: selectors.iter().cloned().collect(),
            declarations: declarations
                .iter()
                .map(|(p, v)| Declaration::concrete(*p, *v))
                .collect(),
            calls: calls.iter().map(|c| include(c)).collect(),
        }
    }

    fn texts(ruleset: &Ruleset) -> Vec<&str> {
        ruleset.selectors.iter().map(|s| s.text.as_str()).collect()
    }

    fn config(semantics: SemanticMode, min_declarations: usize) -> FactorizeConfig {
        FactorizeConfig {
            min_declarations,
            ..FactorizeConfig::for_mode(semantics)
        }
    }

    #[test]
    fn test_forwarding_ruleset_is_split_without_mixin() {
        let mut mixins = Vec::new();
        let input = vec![ruleset(
            &[selector(".a", 1, 1), selector(".b", 5, 1)],
            &[],
            &["m1"],
        )];

        let output = repair(
            &mut mixins,
            input,
            &config(SemanticMode::Full, 1),
            &mut MixinNamer::new(),
        )
        .unwrap();

        assert!(mixins.is_empty());
        assert_eq!(output.len(), 2);
        assert_eq!(output[0].calls, vec![include("m1")]);
        assert_eq!(output[1].calls, vec![include("m1")]);
    }

    #[test]
    fn test_large_body_moves_into_ordering_mixin() {
        let mut mixins = Vec::new();
        let mut namer = MixinNamer::new();
        namer.next(MixinOrigin::Factoring);
        let input = vec![ruleset(
            &[selector(".a", 1, 1), selector(".b", 5, 1)],
            &[("color", "red"), ("margin", "0")],
            &["m1"],
        )];

        let output = repair(&mut mixins, input, &config(SemanticMode::Full, 2), &mut namer).unwrap();

        assert_eq!(mixins.len(), 1);
        assert_eq!(mixins[0].name, "s2");
        assert_eq!(mixins[0].calls, vec![include("m1")]);
        assert_eq!(output.len(), 2);
        for ruleset in &output {
            assert_eq!(ruleset.calls, vec![include("s2")]);
            assert!(ruleset.declarations.is_empty());
        }
    }

    #[test]
    fn test_slight_mode_never_adds_mixins() {
        let mut mixins = Vec::new();
        let input = vec![ruleset(
            &[selector(".a", 1, 1), selector(".b", 5, 1)],
            &[("color", "red"), ("margin", "0")],
            &["m1"],
        )];

        let output = repair(
            &mut mixins,
            input,
            &config(SemanticMode::Slight, 1),
            &mut MixinNamer::new(),
        )
        .unwrap();

        assert!(mixins.is_empty());
        assert_eq!(output.len(), 2);
        assert_eq!(output[1].declarations.len(), 2);
    }

    #[test]
    fn test_rulesets_sorted_by_source_position() {
        let mut mixins = Vec::new();
        let input = vec![
            ruleset(&[selector(".late", 9, 1)], &[("color", "red")], &[]),
            ruleset(
                &[selector(".early", 2, 1), selector(".middle", 4, 1)],
                &[],
                &["m1"],
            ),
        ];

        let output = repair(
            &mut mixins,
            input,
            &config(SemanticMode::Full, 3),
            &mut MixinNamer::new(),
        )
        .unwrap();

        let order: Vec<Vec<&str>> = output.iter().map(texts).collect();
        assert_eq!(order, vec![vec![".early"], vec![".middle"], vec![".late"]]);
    }

    #[test]
    fn test_same_line_same_body_is_merged() {
        let mut mixins = Vec::new();
        let input = vec![
            ruleset(
                &[selector(".a", 3, 1), selector(".b", 3, 5)],
                &[("color", "red")],
                &["m1"],
            ),
            ruleset(&[selector(".c", 3, 9)], &[("color", "blue")], &[]),
        ];

        let output = repair(
            &mut mixins,
            input,
            &config(SemanticMode::Full, 3),
            &mut MixinNamer::new(),
        )
        .unwrap();

        let order: Vec<Vec<&str>> = output.iter().map(texts).collect();
        assert_eq!(order, vec![vec![".a", ".b"], vec![".c"]]);
    }
}
