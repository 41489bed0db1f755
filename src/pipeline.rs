//! Factorization pipeline
//!
//! ```text
//! rules ─► FormalContext ─► GSH ─► Lattice ─► filters ─► [arborescence]
//!       ─► statements ─► [repair] ─► Factorized
//! ```
//!
//! [`factorize`] expects normalized rules (see [`crate::parse::normalize`]);
//! [`factorize_source`] parses and normalizes first.

use crate::arborescence;
use crate::config::FactorizeConfig;
use crate::error::Result;
use crate::fca::{self, FormalContext};
use crate::filter;
use crate::generate;
use crate::lattice::Lattice;
use crate::model::CssRule;
use crate::parse::{self, ParsedStylesheet};
use crate::repair;
use crate::statement::{Mixin, MixinNamer, MixinOrigin, Ruleset, Statement};
use serde::{Deserialize, Serialize};

/// Pipeline output: mixin definitions and the rulesets that use them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factorized {
    pub mixins: Vec<Mixin>,
    pub rulesets: Vec<Ruleset>,
}

impl Factorized {
    pub fn mixin(&self, name: &str) -> Option<&Mixin> {
        self.mixins.iter().find(|m| m.name == name)
    }

    pub fn count_by_origin(&self, origin: MixinOrigin) -> usize {
        self.mixins.iter().filter(|m| m.origin == origin).count()
    }

    /// Call sites of a mixin across mixins and rulesets
    pub fn uses(&self, name: &str) -> usize {
        let in_mixins = self.mixins.iter().flat_map(|m| &m.calls);
        let in_rulesets = self.rulesets.iter().flat_map(|r| &r.calls);
        in_mixins
            .chain(in_rulesets)
            .filter(|call| call.mixin == name)
            .count()
    }
}

/// A stylesheet taken from source text to factorized statements
#[derive(Debug, Clone)]
pub struct Factorization {
    pub stylesheet: ParsedStylesheet,
    /// Normalized rules the factorization was computed from
    pub rules: Vec<CssRule>,
    pub factorized: Factorized,
    pub config: FactorizeConfig,
}

/// Parse, normalize and factorize CSS source
pub fn factorize_source(source: &str, config: &FactorizeConfig) -> Result<Factorization> {
    let stylesheet = {
        let _span = tracing::debug_span!("parse").entered();
        parse::parse_css(source)?
    };
    let rules = parse::normalize(&stylesheet.rules, config.selector_identity());
    tracing::debug!(
        parsed = stylesheet.rules.len(),
        normalized = rules.len(),
        unhandled = stylesheet.unhandled.len(),
        "parsed stylesheet"
    );

    let factorized = factorize(&rules, config)?;
    Ok(Factorization {
        stylesheet,
        rules,
        factorized,
        config: config.clone(),
    })
}

/// Run the whole pipeline over normalized rules
pub fn factorize(rules: &[CssRule], config: &FactorizeConfig) -> Result<Factorized> {
    let mut namer = MixinNamer::new();

    let context = {
        let _span = tracing::debug_span!("context").entered();
        FormalContext::from_rules(rules, config.selector_identity())
    };

    let mut lattice = {
        let _span = tracing::debug_span!("lattice").entered();
        let hierarchy = fca::compute(&context);
        Lattice::from_hierarchy(&hierarchy, &context)
    };

    {
        let _span = tracing::debug_span!("filter").entered();
        filter::apply_filters(&mut lattice, &filter::filters_for(config))?;
    }

    if config.spanning_arborescence {
        let _span = tracing::debug_span!("arborescence").entered();
        arborescence::reduce(&mut lattice)?;
    }

    lattice.check_acyclic()?;

    let statements = {
        let _span = tracing::debug_span!("generate").entered();
        generate::generate(&lattice, &mut namer)?
    };

    let mut factorized = Factorized::default();
    for statement in statements {
        match statement {
            Statement::Mixin(mixin) => factorized.mixins.push(mixin),
            Statement::Ruleset(ruleset) => factorized.rulesets.push(ruleset),
        }
    }

    if config.semantics.preserves_order() {
        let _span = tracing::debug_span!("repair").entered();
        let rulesets = std::mem::take(&mut factorized.rulesets);
        factorized.rulesets = repair::repair(&mut factorized.mixins, rulesets, config, &mut namer)?;
    }

    tracing::debug!(
        mixins = factorized.mixins.len(),
        rulesets = factorized.rulesets.len(),
        "factorized stylesheet"
    );
    Ok(factorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SemanticMode;
    use crate::lattice::tests::rules;
    use crate::model::Declaration;

    #[test]
    fn test_empty_input() {
        let factorized = factorize(&[], &FactorizeConfig::default()).unwrap();
        assert!(factorized.mixins.is_empty());
        assert!(factorized.rulesets.is_empty());
    }

    #[test]
    fn test_shared_block_becomes_mixin() {
        let config = FactorizeConfig {
            min_children: 2,
            min_declarations: 1,
            max_parameters: 0,
            ..FactorizeConfig::for_mode(SemanticMode::None)
        };
        let factorized = factorize(
            &rules(&[
                (".a", &[("color", "red"), ("margin", "0")]),
                (".b", &[("color", "red"), ("margin", "0")]),
                (".c", &[("color", "red")]),
            ]),
            &config,
        )
        .unwrap();

        assert_eq!(factorized.mixins.len(), 1);
        let mixin = &factorized.mixins[0];
        assert_eq!(mixin.declarations, vec![Declaration::concrete("color", "red")]);
        assert_eq!(factorized.uses(&mixin.name), 2);
    }

    #[test]
    fn test_factorize_source_keeps_unhandled() {
        let factorization = factorize_source(
            ".a { color: red; }\n@media print { .a { color: black; } }\n",
            &FactorizeConfig::default(),
        )
        .unwrap();

        assert_eq!(factorization.rules.len(), 1);
        assert_eq!(factorization.stylesheet.unhandled.len(), 1);
        assert_eq!(factorization.factorized.rulesets.len(), 1);
    }

    #[test]
    fn test_high_thresholds_leave_plain_rulesets() {
        let factorized = factorize(
            &rules(&[
                (".a", &[("color", "red")]),
                (".b", &[("color", "red")]),
            ]),
            &FactorizeConfig::for_mode(SemanticMode::None),
        )
        .unwrap();

        assert!(factorized.mixins.is_empty());
        assert_eq!(factorized.rulesets.len(), 1);
        assert_eq!(factorized.rulesets[0].selectors.len(), 2);
    }
}
