//! Stylesheet parsing via tree-sitter
//!
//! Reads CSS source into the rule records the factorization pipeline
//! consumes. Every selector of a rule set becomes its own [`CssRule`]
//! sharing the rule set's declarations. At-rules and rule sets with nested
//! rules are kept verbatim as [`UnhandledRule`]s and written back untouched.

mod normalize;

pub use normalize::normalize;

use crate::error::{Error, Result};
use crate::model::{CssRule, Declaration, Position, Selector, UnhandledKind, UnhandledRule};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tree_sitter::{Node, Parser};

/// Parser output
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ParsedStylesheet {
    /// One record per selector, in source order
    pub rules: Vec<CssRule>,
    /// Constructs passed through untouched, in source order
    pub unhandled: Vec<UnhandledRule>,
    pub stats: ParseStats,
    /// `sha256:` prefix plus the first 8 bytes of the source digest
    pub source_hash: String,
}

/// Counts gathered while parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParseStats {
    /// Rule sets carrying at least one declaration
    pub rules: usize,
    pub selectors: usize,
    pub declarations: usize,
}

fn css_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_css::LANGUAGE.into())
        .map_err(|e| Error::Parse(format!("Failed to set language: {}", e)))?;
    Ok(parser)
}

/// Parse CSS source
pub fn parse_css(source: &str) -> Result<ParsedStylesheet> {
    let tree = css_parser()?
        .parse(source, None)
        .ok_or_else(|| Error::Parse("Failed to parse source".into()))?;

    let root = tree.root_node();
    if root.has_error() {
        let position = first_error(root)
            .map(node_position)
            .unwrap_or_default();
        return Err(Error::Parse(format!("syntax error at {}", position)));
    }

    let mut parsed = ParsedStylesheet {
        rules: Vec::new(),
        unhandled: Vec::new(),
        stats: ParseStats::default(),
        source_hash: source_hash(source),
    };

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "comment" => {}
            "rule_set" => {
                if has_nested_rules(child) {
                    parsed.unhandled.push(unhandled(child, UnhandledKind::NestedRule, source));
                } else {
                    parse_rule_set(child, source, &mut parsed);
                }
            }
            "media_statement" => parsed.unhandled.push(unhandled(child, UnhandledKind::Media, source)),
            "keyframes_statement" => {
                parsed.unhandled.push(unhandled(child, UnhandledKind::Keyframes, source))
            }
            "supports_statement" => {
                parsed.unhandled.push(unhandled(child, UnhandledKind::Supports, source))
            }
            "import_statement" => parsed.unhandled.push(unhandled(child, UnhandledKind::Import, source)),
            "namespace_statement" => {
                parsed.unhandled.push(unhandled(child, UnhandledKind::Namespace, source))
            }
            "charset_statement" => {
                parsed.unhandled.push(unhandled(child, UnhandledKind::Charset, source))
            }
            "at_rule" => {
                let kind = child
                    .named_child(0)
                    .filter(|keyword| keyword.kind() == "at_keyword")
                    .map(|keyword| UnhandledKind::from_at_keyword(node_text(keyword, source)))
                    .unwrap_or(UnhandledKind::Unknown);
                parsed.unhandled.push(unhandled(child, kind, source));
            }
            _ => parsed.unhandled.push(unhandled(child, UnhandledKind::Unknown, source)),
        }
    }

    Ok(parsed)
}

fn parse_rule_set(node: Node, source: &str, parsed: &mut ParsedStylesheet) {
    let mut selectors = Vec::new();
    let mut declarations = Vec::new();

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "selectors" => selectors = parse_selectors(child, source),
            "block" => declarations = parse_block(child, source),
            _ => {}
        }
    }

    if declarations.is_empty() {
        return;
    }
    parsed.stats.rules += 1;
    parsed.stats.selectors += selectors.len();
    parsed.stats.declarations += declarations.len();

    let position = node_position(node);
    for selector in selectors {
        parsed
            .rules
            .push(CssRule::new(selector, declarations.clone(), position));
    }
}

fn parse_selectors(node: Node, source: &str) -> Vec<Selector> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .map(|child| {
            Selector::new(
                collapse_whitespace(node_text(child, source)),
                node_position(child),
            )
        })
        .filter(|selector| !selector.text.is_empty())
        .collect()
}

fn parse_block(node: Node, source: &str) -> Vec<Declaration> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() == "declaration")
        .filter_map(|child| parse_declaration(child, source))
        .collect()
}

fn parse_declaration(node: Node, source: &str) -> Option<Declaration> {
    let mut property = None;
    let mut value_start = None;
    let mut value_end = None;
    let mut important = false;
    let mut after_colon = false;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "property_name" if !after_colon => {
                property = Some(node_text(child, source).trim().to_string());
            }
            ":" if !after_colon => after_colon = true,
            "important" => important = true,
            ";" | "comment" => {}
            _ if after_colon => {
                value_start.get_or_insert(child.start_byte());
                value_end = Some(child.end_byte());
            }
            _ => {}
        }
    }

    let property = property.filter(|p| !p.is_empty())?;
    let raw = source.get(value_start?..value_end?)?;
    let mut value = double_quote_strings(&collapse_whitespace(raw));
    if value.is_empty() {
        return None;
    }
    if important {
        value.push_str(" !important");
    }

    Some(Declaration::concrete(property, value))
}

/// Rewrite single-quoted strings with double quotes; double-quoted strings are kept as written
fn double_quote_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (_, '\\') => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            (None, '\'' | '"') => {
                quote = Some(c);
                out.push('"');
            }
            (Some('\''), '\'') | (Some('"'), '"') => {
                quote = None;
                out.push('"');
            }
            (Some('\''), '"') => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

fn has_nested_rules(node: Node) -> bool {
    let mut cursor = node.walk();
    let nested = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "block")
        .any(|block| {
            let mut block_cursor = block.walk();
            let found = block
                .named_children(&mut block_cursor)
                .any(|item| item.kind() != "declaration" && item.kind() != "comment");
            found
        });
    nested
}

fn unhandled(node: Node, kind: UnhandledKind, source: &str) -> UnhandledRule {
    UnhandledRule {
        kind,
        content: node_text(node, source).to_string(),
        position: node_position(node),
    }
}

/// Depth-first search for the first ERROR or MISSING node
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

pub(crate) fn node_position(node: Node) -> Position {
    let point = node.start_position();
    Position::new(point.row + 1, point.column + 1)
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn source_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("sha256:{}", hex::encode(&hasher.finalize()[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule_per_selector() {
        let parsed = parse_css(".a, .b {\n  color: red;\n  margin: 0 auto;\n}\n").unwrap();

        assert_eq!(parsed.rules.len(), 2);
        assert_eq!(parsed.rules[0].selector.text, ".a");
        assert_eq!(parsed.rules[1].selector.text, ".b");
        assert_eq!(
            parsed.rules[0].declarations,
            vec![
                Declaration::concrete("color", "red"),
                Declaration::concrete("margin", "0 auto"),
            ]
        );
        assert_eq!(parsed.rules[0].position, Position::new(1, 1));
        assert_eq!(
            parsed.stats,
            ParseStats {
                rules: 1,
                selectors: 2,
                declarations: 2
            }
        );
    }

    #[test]
    fn test_parse_important_and_quotes() {
        let parsed = parse_css("p { font-family: 'Open Sans', serif !important; }").unwrap();
        let declaration = &parsed.rules[0].declarations[0];

        assert_eq!(declaration.property.name(), "font-family");
        assert_eq!(
            declaration.concrete_value(),
            Some("\"Open Sans\", serif !important")
        );
    }

    #[test]
    fn test_apostrophes_in_double_quoted_strings_survive() {
        let parsed = parse_css(
            "p { content: \"it's\"; quotes: 'say \"hi\"' '!'; }",
        )
        .unwrap();
        let values: Vec<Option<&str>> = parsed.rules[0]
            .declarations
            .iter()
            .map(|d| d.concrete_value())
            .collect();

        assert_eq!(
            values,
            vec![Some("\"it's\""), Some("\"say \\\"hi\\\"\" \"!\"")]
        );
    }

    #[test]
    fn test_parse_last_declaration_without_semicolon() {
        let parsed = parse_css("a{color:red;margin:0}").unwrap();
        assert_eq!(parsed.rules[0].declarations.len(), 2);
    }

    #[test]
    fn test_empty_rule_skipped() {
        let parsed = parse_css(".empty {}\n.full { color: red; }").unwrap();
        assert_eq!(parsed.rules.len(), 1);
        assert_eq!(parsed.rules[0].selector.text, ".full");
        assert_eq!(parsed.stats.rules, 1);
    }

    #[test]
    fn test_at_rules_are_unhandled() {
        let source = "@import url(\"x.css\");\n\
                      .a { color: red; }\n\
                      @media screen { .a { color: blue; } }\n\
                      @font-face { font-family: X; src: url(x.woff); }\n";
        let parsed = parse_css(source).unwrap();

        assert_eq!(parsed.rules.len(), 1);
        let kinds: Vec<UnhandledKind> = parsed.unhandled.iter().map(|u| u.kind).collect();
        assert_eq!(
            kinds,
            vec![
                UnhandledKind::Import,
                UnhandledKind::Media,
                UnhandledKind::FontFace
            ]
        );
        assert!(parsed.unhandled[1].content.starts_with("@media"));
        assert_eq!(parsed.unhandled[1].position.line, 3);
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let result = parse_css(".a { color: red; ");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_source_hash_is_stable() {
        let a = parse_css("a { color: red; }").unwrap();
        let b = parse_css("a { color: red; }").unwrap();
        assert_eq!(a.source_hash, b.source_hash);
        assert!(a.source_hash.starts_with("sha256:"));
    }
}
