//! Run summary
//!
//! What a factorization produced: input statistics, mixin counts by origin,
//! and per-mixin parameters, declarations and uses.

use crate::config::FactorizeConfig;
use crate::parse::ParseStats;
use crate::pipeline::{Factorization, Factorized};
use crate::statement::{Mixin, MixinOrigin};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Summary of one factorization run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    pub version: String,
    pub source_hash: String,
    pub config: FactorizeConfig,
    pub input: ParseStats,
    /// Rules left after normalization
    pub normalized_rules: usize,
    /// `m` mixins
    pub factoring_mixins: usize,
    /// `s` mixins
    pub ordering_mixins: usize,
    pub rulesets: usize,
    /// Constructs passed through verbatim
    pub unhandled: usize,
    pub mixins: Vec<MixinSummary>,
}

/// One mixin in a [`RunReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MixinSummary {
    pub name: String,
    pub origin: MixinOrigin,
    pub parameters: Vec<String>,
    pub declarations: usize,
    /// Mixins this one includes
    pub includes: usize,
    /// Call sites across mixins and rulesets
    pub uses: usize,
    /// Selectors the mixin was factored from
    pub selectors: usize,
}

impl RunReport {
    pub fn from_factorization(factorization: &Factorization) -> Self {
        let factorized = &factorization.factorized;
        Self {
            version: crate::VERSION.to_string(),
            source_hash: factorization.stylesheet.source_hash.clone(),
            config: factorization.config.clone(),
            input: factorization.stylesheet.stats,
            normalized_rules: factorization.rules.len(),
            factoring_mixins: factorized.count_by_origin(MixinOrigin::Factoring),
            ordering_mixins: factorized.count_by_origin(MixinOrigin::Ordering),
            rulesets: factorized.rulesets.len(),
            unhandled: factorization.stylesheet.unhandled.len(),
            mixins: factorized
                .mixins
                .iter()
                .map(|mixin| MixinSummary::new(mixin, factorized))
                .collect(),
        }
    }

    pub fn total_mixins(&self) -> usize {
        self.factoring_mixins + self.ordering_mixins
    }

    /// Generate human-readable report
    pub fn to_report(&self) -> String {
        let mut out = String::new();

        out.push_str("FACTORIZATION REPORT\n");
        out.push_str("═══════════════════════════════════════════════════════════════\n\n");

        out.push_str(&format!("Source: {}\n", self.source_hash));
        out.push_str(&format!("Semantics: {}\n\n", self.config.semantics));

        out.push_str("Input:\n");
        out.push_str(&format!("  Rule sets: {}\n", self.input.rules));
        out.push_str(&format!("  Selectors: {}\n", self.input.selectors));
        out.push_str(&format!("  Declarations: {}\n", self.input.declarations));
        out.push_str(&format!("  Normalized rules: {}\n", self.normalized_rules));
        out.push_str(&format!("  Unhandled: {}\n\n", self.unhandled));

        out.push_str("Output:\n");
        out.push_str(&format!("  Factoring mixins (m): {}\n", self.factoring_mixins));
        out.push_str(&format!("  Ordering mixins (s): {}\n", self.ordering_mixins));
        out.push_str(&format!("  Rulesets: {}\n", self.rulesets));

        if !self.mixins.is_empty() {
            out.push_str("\nMixins:\n");
            for mixin in &self.mixins {
                let signature = if mixin.parameters.is_empty() {
                    mixin.name.clone()
                } else {
                    let parameters: Vec<String> =
                        mixin.parameters.iter().map(|p| format!("${}", p)).collect();
                    format!("{}({})", mixin.name, parameters.join(", "))
                };
                out.push_str(&format!(
                    "  {}: {} declarations, {} includes, {} uses\n",
                    signature, mixin.declarations, mixin.includes, mixin.uses
                ));
            }
        }

        out
    }
}

impl MixinSummary {
    fn new(mixin: &Mixin, factorized: &Factorized) -> Self {
        Self {
            name: mixin.name.clone(),
            origin: mixin.origin,
            parameters: mixin.parameters.iter().map(|p| p.to_string()).collect(),
            declarations: mixin.declarations.len(),
            includes: mixin.calls.len(),
            uses: factorized.uses(&mixin.name),
            selectors: mixin.selectors.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SemanticMode;
    use crate::pipeline::factorize_source;

    const SHARED: &str = "
.a { color: red; margin: 0; padding: 0; border: none; display: block; }
.b { color: blue; margin: 0; padding: 0; border: none; display: block; }
.c { color: green; margin: 0; padding: 0; border: none; display: block; }
";

    #[test]
    fn test_counts_by_origin() {
        let factorization = factorize_source(SHARED, &FactorizeConfig::default()).unwrap();
        let report = RunReport::from_factorization(&factorization);

        assert_eq!(report.input.rules, 3);
        assert_eq!(report.normalized_rules, 3);
        assert_eq!(report.total_mixins(), report.mixins.len());
        assert_eq!(
            report.factoring_mixins,
            report
                .mixins
                .iter()
                .filter(|m| m.origin == MixinOrigin::Factoring)
                .count()
        );
    }

    #[test]
    fn test_mixin_uses_reported() {
        let config = FactorizeConfig::for_mode(SemanticMode::None);
        let factorization = factorize_source(SHARED, &config).unwrap();
        let report = RunReport::from_factorization(&factorization);

        assert_eq!(report.factoring_mixins, 1);
        let mixin = &report.mixins[0];
        assert_eq!(mixin.parameters, vec!["color".to_string()]);
        assert_eq!(mixin.uses, 3);
        assert!(report.to_report().contains("m1($color): 5 declarations, 0 includes, 3 uses"));
    }

    #[test]
    fn test_report_serializes() {
        let factorization = factorize_source(SHARED, &FactorizeConfig::default()).unwrap();
        let report = RunReport::from_factorization(&factorization);
        let json = serde_json::to_string(&report).unwrap();
        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mixins, report.mixins);
    }
}
