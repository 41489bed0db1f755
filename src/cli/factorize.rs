//! Stylesheet commands: factorize, check, stats

use super::util::{default_output_path, load_config, parse_options, read_input, write_output};
use mixfold::*;
use std::collections::BTreeMap;

const FACTORIZE_USAGE: &str = "Usage: mixfold factorize <input.css> [-o out.scss] [options]";
const CHECK_USAGE: &str = "Usage: mixfold check <input.css> [options]";
const STATS_USAGE: &str = "Usage: mixfold stats <input.css> [--json]";

pub fn cmd_factorize(args: &[String]) -> Result<()> {
    let options = parse_options(args, FACTORIZE_USAGE)?;
    let config = load_config(&options)?;
    let source = read_input(&options.input)?;

    let factorization = factorize_source(&source, &config)?;
    let scss = render_scss(&factorization)?;

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&options.input));
    write_output(&output, &scss, options.force)?;

    let report = RunReport::from_factorization(&factorization);
    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.to_report());
    }
    Ok(())
}

pub fn cmd_check(args: &[String]) -> Result<()> {
    let options = parse_options(args, CHECK_USAGE)?;
    let config = load_config(&options)?;
    let source = read_input(&options.input)?;

    let factorization = factorize_source(&source, &config)?;
    let result = check_equivalence(&factorization.rules, &factorization.factorized, &config)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.to_report());
    }

    if result.passed {
        Ok(())
    } else {
        Err("Equivalence check failed".into())
    }
}

pub fn cmd_stats(args: &[String]) -> Result<()> {
    let options = parse_options(args, STATS_USAGE)?;
    let source = read_input(&options.input)?;

    let stylesheet = parse_css(&source)?;
    let normalized = normalize(&stylesheet.rules, SelectorIdentity::Positional);

    let mut unhandled: BTreeMap<String, usize> = BTreeMap::new();
    for rule in &stylesheet.unhandled {
        let kind = serde_json::to_value(rule.kind)?
            .as_str()
            .unwrap_or("unknown")
            .to_string();
        *unhandled.entry(kind).or_default() += 1;
    }

    if options.json {
        let output = serde_json::json!({
            "source_hash": stylesheet.source_hash,
            "rules": stylesheet.stats.rules,
            "selectors": stylesheet.stats.selectors,
            "declarations": stylesheet.stats.declarations,
            "normalized_rules": normalized.len(),
            "unhandled": unhandled,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Source: {}", stylesheet.source_hash);
    println!("  Rule sets: {}", stylesheet.stats.rules);
    println!("  Selectors: {}", stylesheet.stats.selectors);
    println!("  Declarations: {}", stylesheet.stats.declarations);
    println!("  Normalized rules: {}", normalized.len());
    if !unhandled.is_empty() {
        println!("  Unhandled:");
        for (kind, count) in &unhandled {
            println!("    {}: {}", kind, count);
        }
    }
    Ok(())
}
