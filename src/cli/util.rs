//! CLI utility helpers

use mixfold::config::{self, ConfigFile};
use mixfold::{Error, FactorizeConfig, Result, Settings};
use std::fs;
use std::path::{Path, PathBuf};

/// Options shared by the stylesheet commands
#[derive(Debug, Default)]
pub struct Options {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub settings: Settings,
    pub force: bool,
    pub json: bool,
}

/// Parse `<input.css>` followed by options
pub fn parse_options(args: &[String], usage: &str) -> Result<Options> {
    let mut options = Options::default();
    let mut input = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-o" | "--output" => options.output = Some(PathBuf::from(flag_value(&mut iter, arg)?)),
            "--config" => options.config = Some(PathBuf::from(flag_value(&mut iter, arg)?)),
            "--keep-semantic" => {
                options.settings.semantics = Some(flag_value(&mut iter, arg)?.parse()?)
            }
            "--groups-filter" => options.settings.groups_filter = Some(true),
            "--no-duplicates-into-rule" => options.settings.spanning_arborescence = Some(true),
            "--min-children" => options.settings.min_children = Some(count(&mut iter, arg)?),
            "--min-declarations" => {
                options.settings.min_declarations = Some(count(&mut iter, arg)?)
            }
            "--max-parameters" => options.settings.max_parameters = Some(count(&mut iter, arg)?),
            "--force" => options.force = true,
            "--json" => options.json = true,
            // Handled before dispatch
            "--debug" => {}
            flag if flag.starts_with('-') => {
                return Err(format!("Unknown option: {}\n{}", flag, usage).into())
            }
            path => {
                if input.is_some() {
                    return Err(format!("Unexpected argument: {}\n{}", path, usage).into());
                }
                input = Some(PathBuf::from(path));
            }
        }
    }

    options.input = input.ok_or_else(|| Error::Other(usage.to_string()))?;
    Ok(options)
}

fn flag_value<'a>(iter: &mut std::slice::Iter<'a, String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", flag).into())
}

fn count(iter: &mut std::slice::Iter<'_, String>, flag: &str) -> Result<usize> {
    let value = flag_value(iter, flag)?;
    value
        .parse()
        .map_err(|_| Error::Config(format!("{} expects a non-negative integer, got {}", flag, value)))
}

/// Resolve the configuration: command line, then config file, then mode defaults
pub fn load_config(options: &Options) -> Result<FactorizeConfig> {
    let file = match &options.config {
        Some(path) => Some(ConfigFile::load(path)?),
        None => ConfigFile::load_from_dir(input_dir(&options.input))?,
    };
    if file.is_some() {
        tracing::debug!("using configuration file");
    }

    let config = config::resolve(file.as_ref(), &options.settings);
    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

fn input_dir(input: &Path) -> &Path {
    input
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Input path with an `.scss` extension
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("scss")
}

pub fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(Error::Io)
}

/// Write content to a file, refusing to replace an existing one unless forced
pub fn write_output(path: &Path, content: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Output(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    fs::write(path, content)
        .map_err(|e| Error::Output(format!("Failed to write {}: {}", path.display(), e)))?;
    eprintln!("Written to: {}", path.display());
    Ok(())
}
