//! Stylesheet data model
//!
//! Properties, values, declarations and selectors as the factorization
//! pipeline sees them, plus the rule records handed over by the parser.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Source position (1-based line and column)
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A CSS property name. Identity is the name.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Property(String);

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value of a declaration
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Value {
    /// Literal source text
    Concrete(String),
    /// Placeholder bound to the declaration's property; becomes a mixin parameter
    Abstract,
}

/// A (property, value) pair
///
/// Two declarations are the same attribute when property and value agree;
/// source positions are carried by the enclosing [`CssRule`].
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Declaration {
    pub property: Property,
    pub value: Value,
}

impl Declaration {
    /// Declaration with a literal value
    pub fn concrete(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: Property::new(property),
            value: Value::Concrete(value.into()),
        }
    }

    /// Placeholder declaration for `property`
    pub fn parameter(property: Property) -> Self {
        Self {
            property,
            value: Value::Abstract,
        }
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self.value, Value::Concrete(_))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.value, Value::Abstract)
    }

    /// Literal value, if any
    pub fn concrete_value(&self) -> Option<&str> {
        match &self.value {
            Value::Concrete(text) => Some(text),
            Value::Abstract => None,
        }
    }

    /// `property:value` identity string
    pub fn identifier(&self) -> String {
        match &self.value {
            Value::Concrete(text) => format!("{}:{}", self.property, text),
            Value::Abstract => format!("{}:${}", self.property, self.property),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Concrete(text) => write!(f, "{}: {}", self.property, text),
            Value::Abstract => write!(f, "{}: ${}", self.property, self.property),
        }
    }
}

/// How selectors are identified when building the formal context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SelectorIdentity {
    /// Same text means same selector, wherever it appears
    Textual,
    /// Text plus source position; identical selectors in different rules stay apart
    Positional,
}

/// Identity key of a selector under a [`SelectorIdentity`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SelectorKey {
    pub text: String,
    pub position: Option<Position>,
}

impl fmt::Display for SelectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "{} ({})", self.text, position),
            None => f.write_str(&self.text),
        }
    }
}

/// A selector with the position it was read from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Selector {
    pub text: String,
    pub position: Position,
}

impl Selector {
    pub fn new(text: impl Into<String>, position: Position) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn key(&self, identity: SelectorIdentity) -> SelectorKey {
        SelectorKey {
            text: self.text.clone(),
            position: match identity {
                SelectorIdentity::Textual => None,
                SelectorIdentity::Positional => Some(self.position),
            },
        }
    }
}

// Source order first so selector sets print in the order they were written.
impl Ord for Selector {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for Selector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One selector paired with the declarations of the rule set it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CssRule {
    pub selector: Selector,
    /// Concrete declarations in source order
    pub declarations: Vec<Declaration>,
    /// Position of the enclosing rule set
    pub position: Position,
}

impl CssRule {
    pub fn new(selector: Selector, declarations: Vec<Declaration>, position: Position) -> Self {
        Self {
            selector,
            declarations,
            position,
        }
    }
}

/// Kind of construct the pipeline passes through untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnhandledKind {
    Media,
    Keyframes,
    FontFace,
    Page,
    Supports,
    Viewport,
    Import,
    Namespace,
    Charset,
    /// Rule set containing nested rules
    NestedRule,
    Unknown,
}

impl UnhandledKind {
    /// Classify an at-rule by its keyword (with or without the leading `@`)
    pub fn from_at_keyword(keyword: &str) -> Self {
        let keyword = keyword.trim_start_matches('@').to_ascii_lowercase();
        match keyword.as_str() {
            "media" => UnhandledKind::Media,
            "font-face" => UnhandledKind::FontFace,
            "page" => UnhandledKind::Page,
            "supports" => UnhandledKind::Supports,
            "viewport" | "-ms-viewport" => UnhandledKind::Viewport,
            "import" => UnhandledKind::Import,
            "namespace" => UnhandledKind::Namespace,
            "charset" => UnhandledKind::Charset,
            k if k.ends_with("keyframes") => UnhandledKind::Keyframes,
            _ => UnhandledKind::Unknown,
        }
    }
}

/// Verbatim construct carried from input to output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UnhandledRule {
    pub kind: UnhandledKind,
    pub content: String,
    pub position: Position,
}
