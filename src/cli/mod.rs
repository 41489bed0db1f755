//! CLI command implementations
//!
//! - `factorize`: factorize, check and stats commands
//! - `config`: schema command
//! - `util`: argument parsing, config loading, output writing

pub mod config;
pub mod factorize;
pub mod util;

pub use config::cmd_schema;
pub use factorize::{cmd_check, cmd_factorize, cmd_stats};
