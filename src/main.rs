//! mixfold CLI - Command-line interface
//!
//! Commands:
//!   factorize - Factor repeated declarations into SCSS mixins
//!   check     - Factorize and verify the output expands back to the input
//!   stats     - Summarize a stylesheet
//!   schema    - Print JSON schema for an output type

mod cli;

use mixfold::VERSION;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter
const LOG_ENV: &str = "MIXFOLD_LOG";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    init_logging(args.iter().any(|a| a == "--debug"));

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "factorize" => cli::cmd_factorize(&args[2..]),
        "check" => cli::cmd_check(&args[2..]),
        "stats" => cli::cmd_stats(&args[2..]),
        "schema" => cli::cmd_schema(&args[2..]),
        "version" | "--version" | "-v" => {
            println!("mixfold {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Log to stderr; `MIXFOLD_LOG` sets the filter, `--debug` forces `debug`
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_usage() {
    println!(
        r#"
mixfold - CSS mixin factorization

USAGE:
    mixfold <COMMAND> [OPTIONS]

COMMANDS:
    factorize <input.css>            Write an SCSS stylesheet with factored mixins
    check <input.css>                Factorize and verify the result is equivalent
    stats <input.css>                Show input statistics
    schema [config|report|check]     Print JSON schema for an output type
    version                          Print version
    help                             Print this message

OPTIONS:
    -o, --output <file>              Output file (default: input with .scss extension)
    --config <file>                  Config file (default: mixfold.yaml next to the input)
    --keep-semantic <full|slight|none>
                                     How much of the cascade to preserve (default: full)
    --groups-filter                  Only factor declarations of related properties
    --no-duplicates-into-rule        Keep one parent per node (spanning arborescence)
    --min-children <n>               Minimum uses for a mixin
    --min-declarations <n>           Minimum concrete declarations in a mixin
    --max-parameters <n>             Maximum parameters of a mixin
    --force                          Overwrite an existing output file
    --json                           JSON output format (factorize, check, stats)
    --debug                          Debug logging (default filter from MIXFOLD_LOG)

EXAMPLES:
    mixfold factorize site.css
    mixfold factorize site.css -o site.scss --keep-semantic none --force
    mixfold check site.css --min-declarations 2
    mixfold stats site.css --json
"#
    );
}
