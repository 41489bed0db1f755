//! mixfold configuration
//!
//! Handles loading of `mixfold.yaml` (next to the input stylesheet, or given
//! explicitly) and merging it with command-line overrides. Precedence is
//! command line, then file, then the defaults of the selected semantic mode.

use crate::error::{Error, Result};
use crate::model::SelectorIdentity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default config file name looked up next to the input
pub const CONFIG_FILE_NAME: &str = "mixfold.yaml";

/// How much of the cascade the output must preserve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SemanticMode {
    /// Rule order is ignored; selectors are identified by text alone
    None,
    /// Rule order is preserved without introducing extra mixins
    Slight,
    /// Rule order is preserved; extra mixins avoid re-duplicating declarations
    #[default]
    Full,
}

impl SemanticMode {
    pub fn preserves_order(self) -> bool {
        !matches!(self, SemanticMode::None)
    }

    pub fn allows_new_mixins(self) -> bool {
        matches!(self, SemanticMode::Full)
    }

    /// Selector identity used to build the formal context
    pub fn selector_identity(self) -> SelectorIdentity {
        if self.preserves_order() {
            SelectorIdentity::Positional
        } else {
            SelectorIdentity::Textual
        }
    }
}

impl fmt::Display for SemanticMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticMode::None => "none",
            SemanticMode::Slight => "slight",
            SemanticMode::Full => "full",
        };
        f.write_str(name)
    }
}

impl FromStr for SemanticMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(SemanticMode::None),
            "slight" => Ok(SemanticMode::Slight),
            "full" => Ok(SemanticMode::Full),
            other => Err(Error::Config(format!(
                "Unknown semantic mode: {} (expected full, slight or none)",
                other
            ))),
        }
    }
}

/// Final configuration consumed by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FactorizeConfig {
    pub semantics: SemanticMode,

    /// Reject nodes whose declarations span several CSS property groups
    pub groups_filter: bool,

    /// Reduce multi-parent nodes to a single inheritance line
    pub spanning_arborescence: bool,

    /// Minimum number of children for a node with children
    pub min_children: usize,

    /// Minimum number of own concrete declarations
    pub min_declarations: usize,

    /// Maximum number of own parameters
    pub max_parameters: usize,
}

impl FactorizeConfig {
    /// Defaults for a semantic mode
    pub fn for_mode(semantics: SemanticMode) -> Self {
        let (min_declarations, max_parameters) = if semantics.preserves_order() {
            (3, 1)
        } else {
            (4, 6)
        };
        Self {
            semantics,
            groups_filter: false,
            spanning_arborescence: false,
            min_children: 2,
            min_declarations,
            max_parameters,
        }
    }

    pub fn selector_identity(&self) -> SelectorIdentity {
        self.semantics.selector_identity()
    }
}

impl Default for FactorizeConfig {
    fn default() -> Self {
        Self::for_mode(SemanticMode::default())
    }
}

/// Optional settings, shared by the config file and the command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantics: Option<SemanticMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups_filter: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spanning_arborescence: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_children: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_declarations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parameters: Option<usize>,
}

impl Settings {
    /// Layer `self` over `lower`; values set in `self` win
    pub fn merge(&self, lower: &Settings) -> Settings {
        Settings {
            semantics: self.semantics.or(lower.semantics),
            groups_filter: self.groups_filter.or(lower.groups_filter),
            spanning_arborescence: self.spanning_arborescence.or(lower.spanning_arborescence),
            min_children: self.min_children.or(lower.min_children),
            min_declarations: self.min_declarations.or(lower.min_declarations),
            max_parameters: self.max_parameters.or(lower.max_parameters),
        }
    }

    /// Fill unset values from the defaults of the selected mode
    pub fn resolve(&self) -> FactorizeConfig {
        let defaults = FactorizeConfig::for_mode(self.semantics.unwrap_or_default());
        FactorizeConfig {
            semantics: defaults.semantics,
            groups_filter: self.groups_filter.unwrap_or(defaults.groups_filter),
            spanning_arborescence: self
                .spanning_arborescence
                .unwrap_or(defaults.spanning_arborescence),
            min_children: self.min_children.unwrap_or(defaults.min_children),
            min_declarations: self.min_declarations.unwrap_or(defaults.min_declarations),
            max_parameters: self.max_parameters.unwrap_or(defaults.max_parameters),
        }
    }
}

/// Configuration file (`mixfold.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConfigFile {
    /// Schema version for migrations
    pub version: u32,

    #[serde(flatten)]
    pub settings: Settings,
}

impl ConfigFile {
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ConfigFile = serde_norway::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e)))?;

        if file.version != 1 {
            return Err(Error::Config(format!(
                "Unsupported {} version: {}",
                CONFIG_FILE_NAME, file.version
            )));
        }

        Ok(file)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::from_yaml(&content)
    }

    /// Load `mixfold.yaml` from a directory, if present
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_file = dir.join(CONFIG_FILE_NAME);
        if !config_file.exists() {
            return Ok(None);
        }
        Self::load(&config_file).map(Some)
    }
}

/// Merge command-line settings over an optional file into the final config
pub fn resolve(file: Option<&ConfigFile>, cli: &Settings) -> FactorizeConfig {
    match file {
        Some(file) => cli.merge(&file.settings).resolve(),
        None => cli.resolve(),
    }
}
