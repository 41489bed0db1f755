//! Property-based tests over random stylesheets and configurations
//!
//! Whatever the configuration, the factorized output must expand back to the
//! normalized input, reference only existing mixins with the right arity,
//! and keep the lattice acyclic.

use mixfold::fca::{self, FormalContext};
use mixfold::filter;
use mixfold::lattice::Lattice;
use mixfold::*;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

const SELECTORS: &[&str] = &[".a", ".b", ".c", "#main", "p", "ul li"];
const PROPERTIES: &[&str] = &["color", "margin", "padding", "display", "border", "font-family"];
const VALUES: &[&str] = &["0", "red", "1px solid", "none", "Arial, sans-serif", "blue !important"];

fn any_rule() -> impl Strategy<Value = String> {
    let selectors = prop::collection::btree_set(prop::sample::select(SELECTORS), 1..3);
    let declarations = prop::collection::vec(
        (prop::sample::select(PROPERTIES), prop::sample::select(VALUES)),
        1..5,
    );
    (selectors, declarations).prop_map(|(selectors, declarations)| {
        let selectors: Vec<&str> = selectors.into_iter().collect();
        let body: Vec<String> = declarations
            .iter()
            .map(|(property, value)| format!("{}: {};", property, value))
            .collect();
        format!("{} {{ {} }}", selectors.join(", "), body.join(" "))
    })
}

fn any_stylesheet() -> impl Strategy<Value = String> {
    prop::collection::vec(any_rule(), 1..8).prop_map(|rules| rules.join("\n"))
}

fn any_config() -> impl Strategy<Value = FactorizeConfig> {
    (
        prop::sample::select(vec![SemanticMode::None, SemanticMode::Slight, SemanticMode::Full]),
        any::<bool>(),
        any::<bool>(),
        0usize..4,
        0usize..5,
        0usize..4,
    )
        .prop_map(
            |(semantics, groups_filter, spanning_arborescence, min_children, min_declarations, max_parameters)| {
                FactorizeConfig {
                    semantics,
                    groups_filter,
                    spanning_arborescence,
                    min_children,
                    min_declarations,
                    max_parameters,
                }
            },
        )
}

fn check_calls(
    factorized: &Factorized,
    calls: &[MixinCall],
) -> std::result::Result<(), TestCaseError> {
    for call in calls {
        let target = factorized.mixin(&call.mixin);
        prop_assert!(target.is_some(), "undefined mixin {}", call.mixin);
        let target = target.unwrap();
        prop_assert_eq!(call.arguments.len(), target.parameters.len());
        for (argument, parameter) in call.arguments.iter().zip(&target.parameters) {
            prop_assert_eq!(&argument.property, parameter);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_output_expands_to_input(source in any_stylesheet(), config in any_config()) {
        let factorization = factorize_source(&source, &config).unwrap();
        let report = check_equivalence(
            &factorization.rules,
            &factorization.factorized,
            &config,
        ).unwrap();
        prop_assert!(report.passed, "{}\n{}", source, report.to_report());
    }

    #[test]
    fn test_calls_match_targets(source in any_stylesheet(), config in any_config()) {
        let factorized = factorize_source(&source, &config).unwrap().factorized;

        for mixin in &factorized.mixins {
            check_calls(&factorized, &mixin.calls)?;
        }
        for ruleset in &factorized.rulesets {
            check_calls(&factorized, &ruleset.calls)?;
            // rulesets are emitted for leaves only once every parameter is bound
            prop_assert!(ruleset.declarations.iter().all(Declaration::is_concrete));
            for call in &ruleset.calls {
                prop_assert!(call.arguments.iter().all(Declaration::is_concrete));
            }
        }
    }

    #[test]
    fn test_mixin_names_unique(source in any_stylesheet(), config in any_config()) {
        let factorized = factorize_source(&source, &config).unwrap().factorized;

        let names: HashSet<&str> = factorized.mixins.iter().map(|m| m.name.as_str()).collect();
        prop_assert_eq!(names.len(), factorized.mixins.len());
        prop_assert_eq!(
            factorized.count_by_origin(MixinOrigin::Factoring)
                + factorized.count_by_origin(MixinOrigin::Ordering),
            factorized.mixins.len()
        );
        for mixin in &factorized.mixins {
            prop_assert!(mixin.name.starts_with(mixin.origin.prefix()));
        }
    }

    #[test]
    fn test_filtered_lattice_is_acyclic(source in any_stylesheet(), config in any_config()) {
        let stylesheet = parse_css(&source).unwrap();
        let rules = normalize(&stylesheet.rules, config.selector_identity());
        let context = FormalContext::from_rules(&rules, config.selector_identity());
        let hierarchy = fca::compute(&context);
        let mut lattice = Lattice::from_hierarchy(&hierarchy, &context);

        filter::apply_filters(&mut lattice, &filter::filters_for(&config)).unwrap();
        if config.spanning_arborescence {
            mixfold::arborescence::reduce(&mut lattice).unwrap();
        }

        prop_assert!(lattice.check_acyclic().is_ok());
        for id in lattice.node_ids() {
            prop_assert!(!lattice.ancestors(id).contains(&id));
            prop_assert!(!lattice.descendants(id).contains(&id));
        }
    }

    #[test]
    fn test_concepts_closed(source in any_stylesheet()) {
        let stylesheet = parse_css(&source).unwrap();
        let rules = normalize(&stylesheet.rules, SelectorIdentity::Positional);
        let context = FormalContext::from_rules(&rules, SelectorIdentity::Positional);
        let hierarchy = fca::compute(&context);

        let mut seen = BTreeSet::new();
        for concept in hierarchy.concepts() {
            prop_assert!(concept.is_closed(&context));
            prop_assert!(seen.insert(concept.clone()));
        }
    }

    #[test]
    fn test_normalize_idempotent(source in any_stylesheet()) {
        let stylesheet = parse_css(&source).unwrap();
        for identity in [SelectorIdentity::Textual, SelectorIdentity::Positional] {
            let once = normalize(&stylesheet.rules, identity);
            prop_assert_eq!(normalize(&once, identity), once);
        }
    }
}
