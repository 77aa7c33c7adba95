//! CSS selector subset used by document queries.
//!
//! Supported: type (`rect`), universal (`*`), `#id`, `.class`,
//! `[attr]`, `[attr=value]`, descendant (whitespace) and child (`>`)
//! combinators, and comma-separated selector lists.

use regex::Regex;
use tracing::instrument;

use crate::domain::document::{Document, NodeId};
use crate::domain::{DomainError, DomainResult};

const ATTRIBUTE_PATTERN: &str =
    r#"^\s*([A-Za-z_][\w:.-]*)\s*(?:=\s*(?:"([^"]*)"|'([^']*)'|([^\s"']+)))?\s*$"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeTest {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeTest>,
}

/// One selector of a list: compounds joined by combinators.
/// The combinator stored with part `k` links it to part `k - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    #[instrument(level = "trace")]
    pub fn parse(source: &str) -> DomainResult<Self> {
        let alternatives = source
            .split(',')
            .map(|text| parse_complex(source, text.trim()))
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `node` is an element matched by any selector of the list.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches_from(doc, complex.parts.len() - 1, node))
    }
}

impl Complex {
    fn matches_from(&self, doc: &Document, k: usize, node: NodeId) -> bool {
        let (combinator, compound) = &self.parts[k];
        if !compound.matches(doc, node) {
            return false;
        }
        if k == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|parent| self.matches_from(doc, k - 1, parent)),
            Combinator::Descendant => {
                let mut ancestor = doc.parent(node);
                while let Some(current) = ancestor {
                    if self.matches_from(doc, k - 1, current) {
                        return true;
                    }
                    ancestor = doc.parent(current);
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(element) = doc.node(node) else {
            return false;
        };
        let Some(name) = element.element_name() else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if tag != "*" && tag != name {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = element.attribute("class").unwrap_or_default();
            let present: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }
        self.attributes.iter().all(|test| match element.attribute(&test.name) {
            None => false,
            Some(actual) => test.value.as_deref().map_or(true, |v| v == actual),
        })
    }
}

fn invalid(source: &str, reason: impl Into<String>) -> DomainError {
    DomainError::InvalidSelector {
        selector: source.to_string(),
        reason: reason.into(),
    }
}

fn parse_complex(source: &str, text: &str) -> DomainResult<Complex> {
    if text.is_empty() {
        return Err(invalid(source, "empty selector"));
    }

    let mut parts: Vec<(Combinator, Compound)> = Vec::new();
    let mut pending: Option<Combinator> = None;
    let mut current = String::new();
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for c in text.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' if in_brackets => {
                quote = Some(c);
                current.push(c);
            }
            '[' => {
                in_brackets = true;
                current.push(c);
            }
            ']' => {
                in_brackets = false;
                current.push(c);
            }
            _ if in_brackets => current.push(c),
            '>' => {
                push_compound(source, &mut parts, &mut pending, &mut current)?;
                if parts.is_empty() {
                    return Err(invalid(source, "selector starts with a combinator"));
                }
                pending = Some(Combinator::Child);
            }
            _ if c.is_whitespace() => {
                push_compound(source, &mut parts, &mut pending, &mut current)?;
                if !parts.is_empty() && pending.is_none() {
                    pending = Some(Combinator::Descendant);
                }
            }
            _ => current.push(c),
        }
    }

    if in_brackets || quote.is_some() {
        return Err(invalid(source, "unterminated attribute selector"));
    }
    push_compound(source, &mut parts, &mut pending, &mut current)?;
    if pending.is_some() {
        return Err(invalid(source, "selector ends with a combinator"));
    }
    Ok(Complex { parts })
}

fn push_compound(
    source: &str,
    parts: &mut Vec<(Combinator, Compound)>,
    pending: &mut Option<Combinator>,
    current: &mut String,
) -> DomainResult<()> {
    if current.is_empty() {
        return Ok(());
    }
    let compound = parse_compound(source, current)?;
    let combinator = pending.take().unwrap_or(Combinator::Descendant);
    parts.push((combinator, compound));
    current.clear();
    Ok(())
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(source: &str, chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> DomainResult<String> {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    if ident.is_empty() {
        return Err(invalid(source, "expected a name"));
    }
    Ok(ident)
}

fn parse_compound(source: &str, text: &str) -> DomainResult<Compound> {
    let mut compound = Compound::default();
    let mut chars = text.chars().peekable();

    if chars.peek() == Some(&'*') {
        chars.next();
        compound.tag = Some("*".to_string());
    } else if chars.peek().is_some_and(|&c| is_ident_char(c)) {
        compound.tag = Some(take_ident(source, &mut chars)?);
    }

    while let Some(c) = chars.next() {
        match c {
            '#' => compound.id = Some(take_ident(source, &mut chars)?),
            '.' => compound.classes.push(take_ident(source, &mut chars)?),
            '[' => {
                let mut inner = String::new();
                let mut quote: Option<char> = None;
                let mut closed = false;
                for c in chars.by_ref() {
                    match (quote, c) {
                        (None, ']') => {
                            closed = true;
                            break;
                        }
                        (None, '"' | '\'') => quote = Some(c),
                        (Some(q), _) if q == c => quote = None,
                        _ => {}
                    }
                    inner.push(c);
                }
                if !closed {
                    return Err(invalid(source, "unterminated attribute selector"));
                }
                compound.attributes.push(parse_attribute(source, &inner)?);
            }
            other => {
                return Err(invalid(source, format!("unexpected character '{}'", other)));
            }
        }
    }
    Ok(compound)
}

fn parse_attribute(source: &str, inner: &str) -> DomainResult<AttributeTest> {
    let re = Regex::new(ATTRIBUTE_PATTERN).map_err(|e| invalid(source, e.to_string()))?;
    let caps = re
        .captures(inner)
        .ok_or_else(|| invalid(source, format!("bad attribute test '[{}]'", inner)))?;
    let value = caps
        .get(2)
        .or_else(|| caps.get(3))
        .or_else(|| caps.get(4))
        .map(|m| m.as_str().to_string());
    Ok(AttributeTest {
        name: caps[1].to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound_parts() {
        let selector = Selector::parse("rect.bar.wide#first[data-k='a b']").unwrap();
        let compound = &selector.alternatives[0].parts[0].1;
        assert_eq!(compound.tag.as_deref(), Some("rect"));
        assert_eq!(compound.id.as_deref(), Some("first"));
        assert_eq!(compound.classes, vec!["bar", "wide"]);
        assert_eq!(compound.attributes[0].name, "data-k");
        assert_eq!(compound.attributes[0].value.as_deref(), Some("a b"));
    }

    #[test]
    fn test_parse_combinators_and_lists() {
        let selector = Selector::parse("svg > g text, rect").unwrap();
        assert_eq!(selector.alternatives.len(), 2);
        let combinators: Vec<_> = selector.alternatives[0]
            .parts
            .iter()
            .map(|(c, _)| *c)
            .collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::Descendant
            ]
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "> rect", "rect >", "rect[x", "rect!", "a,,b"] {
            assert!(Selector::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }
}
