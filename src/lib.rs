// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # mixfold - CSS mixin factorization
//!
//! Finds declaration blocks repeated across CSS rules and factors them into
//! reusable, optionally parameterized SCSS mixins. The output expands back
//! to the same declarations for every selector.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mixfold::{factorize_source, render_scss, FactorizeConfig, RunReport};
//!
//! let config = FactorizeConfig::default();
//! let factorization = factorize_source(".a { color: red } .b { color: red }", &config)?;
//!
//! let scss = render_scss(&factorization)?;
//! let report = RunReport::from_factorization(&factorization);
//! println!("{} mixins", report.total_mixins());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! CSS source
//!     │
//!     ├──► parse_css ──► CssRule per selector + UnhandledRule
//!     ├──► normalize ──► last declaration wins per (selector, property)
//!     │
//!     ├──► FormalContext (selectors × declarations/properties)
//!     ├──► GaloisSubHierarchy ──► Lattice
//!     ├──► filters (property groups, thresholds)
//!     ├──► arborescence (optional: one parent per node)
//!     ├──► generate ──► Mixin / Ruleset statements
//!     ├──► repair (order-preserving modes)
//!     │
//!     ├──► render_scss ──► SCSS text
//!     └──► check_equivalence ──► EquivalenceReport
//! ```
//!
//! ## Semantic Modes
//!
//! | Mode | Selector identity | Cascade order | New `s` mixins |
//! |------|-------------------|---------------|----------------|
//! | `none` | text | not preserved | no |
//! | `slight` | text + position | preserved | no |
//! | `full` | text + position | preserved | yes |

// Data model and ambient
pub mod config;
pub mod error;
pub mod model;

// Input
pub mod parse;

// Factorization core
pub mod arborescence;
pub mod fca;
pub mod filter;
pub mod generate;
pub mod lattice;
pub mod pipeline;
pub mod repair;
pub mod statement;

// Output and checks
pub mod render;
pub mod report;
pub mod verify;

pub use config::{ConfigFile, FactorizeConfig, SemanticMode, Settings};
pub use error::{Error, Result};
pub use model::{
    CssRule, Declaration, Position, Property, Selector, SelectorIdentity, UnhandledKind,
    UnhandledRule, Value,
};
pub use parse::{normalize, parse_css, ParseStats, ParsedStylesheet};
pub use pipeline::{factorize, factorize_source, Factorization, Factorized};
pub use render::render_scss;
pub use report::{MixinSummary, RunReport};
pub use statement::{Mixin, MixinCall, MixinNamer, MixinOrigin, Ruleset, Statement};
pub use verify::{check_equivalence, EquivalenceReport, Mismatch, OrderViolation};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
