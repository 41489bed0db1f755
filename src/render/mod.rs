//! SCSS output
//!
//! Statements are flattened into a view, one pre-formatted line per include
//! or declaration, and rendered through an embedded MiniJinja template.

use crate::error::{Error, Result};
use crate::model::{Declaration, UnhandledRule};
use crate::pipeline::{Factorization, Factorized};
use crate::statement::{Mixin, MixinCall, Ruleset};
use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::sync::OnceLock;

// Embedded templates (compiled into binary)
mod embedded {
    pub const SCSS: &str = include_str!("../../templates/scss.jinja");
}

const SCSS_TEMPLATE: &str = "scss.jinja";

/// Template engine singleton
static ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

fn init_engine() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);

    // A broken embedded template surfaces as a render error on first use
    if let Err(e) = env.add_template(SCSS_TEMPLATE, embedded::SCSS) {
        tracing::error!(template = SCSS_TEMPLATE, error = %e, "failed to load template");
    }
    env
}

/// Get the global template engine
pub fn engine() -> &'static Environment<'static> {
    ENGINE.get_or_init(init_engine)
}

/// Render a factorization as SCSS
pub fn render_scss(factorization: &Factorization) -> Result<String> {
    render_statements(
        &factorization.factorized,
        &factorization.stylesheet.unhandled,
        &factorization.stylesheet.source_hash,
    )
}

/// Render mixins, rulesets and pass-through content as SCSS
pub fn render_statements(
    factorized: &Factorized,
    unhandled: &[UnhandledRule],
    source_hash: &str,
) -> Result<String> {
    let template = engine()
        .get_template(SCSS_TEMPLATE)
        .map_err(|e| Error::Render(format!("Template not found: {}", e)))?;

    let view = StylesheetView::new(factorized, unhandled, source_hash);
    template
        .render(&view)
        .map_err(|e| Error::Render(e.to_string()))
}

#[derive(Serialize)]
struct StylesheetView<'a> {
    version: &'static str,
    source_hash: &'a str,
    mixins: Vec<MixinView<'a>>,
    rulesets: Vec<RulesetView>,
    unhandled: Vec<&'a str>,
}

#[derive(Serialize)]
struct MixinView<'a> {
    signature: String,
    sources: Vec<SourceView<'a>>,
    body: Vec<String>,
}

#[derive(Serialize)]
struct SourceView<'a> {
    selector: &'a str,
    line: usize,
}

#[derive(Serialize)]
struct RulesetView {
    selectors: String,
    body: Vec<String>,
}

impl<'a> StylesheetView<'a> {
    fn new(factorized: &'a Factorized, unhandled: &'a [UnhandledRule], source_hash: &'a str) -> Self {
        let mut unhandled: Vec<&UnhandledRule> = unhandled.iter().collect();
        unhandled.sort_by_key(|rule| rule.position);

        Self {
            version: crate::VERSION,
            source_hash,
            mixins: factorized.mixins.iter().map(MixinView::new).collect(),
            rulesets: factorized.rulesets.iter().map(RulesetView::new).collect(),
            unhandled: unhandled.into_iter().map(|rule| rule.content.as_str()).collect(),
        }
    }
}

impl<'a> MixinView<'a> {
    fn new(mixin: &'a Mixin) -> Self {
        let signature = if mixin.has_parameters() {
            let parameters: Vec<String> = mixin
                .parameters
                .iter()
                .map(|p| format!("${}", p))
                .collect();
            format!("{}({})", mixin.name, parameters.join(", "))
        } else {
            mixin.name.clone()
        };

        Self {
            signature,
            sources: mixin
                .selectors
                .iter()
                .map(|s| SourceView {
                    selector: &s.text,
                    line: s.line(),
                })
                .collect(),
            body: body_lines(&mixin.calls, &mixin.declarations),
        }
    }
}

impl RulesetView {
    fn new(ruleset: &Ruleset) -> Self {
        let selectors: Vec<&str> = ruleset.selectors.iter().map(|s| s.text.as_str()).collect();
        Self {
            selectors: selectors.join(", "),
            body: body_lines(&ruleset.calls, &ruleset.declarations),
        }
    }
}

/// Includes first, then declarations
fn body_lines(calls: &[MixinCall], declarations: &[Declaration]) -> Vec<String> {
    calls
        .iter()
        .map(include_line)
        .chain(declarations.iter().map(declaration_line))
        .collect()
}

fn include_line(call: &MixinCall) -> String {
    if call.arguments.is_empty() {
        return format!("@include {};", call.mixin);
    }
    let arguments: Vec<String> = call.arguments.iter().map(argument).collect();
    format!("@include {}({});", call.mixin, arguments.join(", "))
}

fn declaration_line(declaration: &Declaration) -> String {
    format!("{}: {};", declaration.property, value(declaration))
}

fn value(declaration: &Declaration) -> String {
    match declaration.concrete_value() {
        Some(text) => text.to_string(),
        None => format!("${}", declaration.property),
    }
}

/// Concrete arguments that would split or end the argument list are interpolated
fn argument(declaration: &Declaration) -> String {
    match declaration.concrete_value() {
        Some(text) if text.contains(',') || text.contains('!') => {
            format!("#{{'{}'}}", text.replace('\'', "\\'"))
        }
        _ => value(declaration),
    }
}
