//! A small CSS selector engine for [`Document::query_selector`].
//!
//! Supports type, universal, `#id`, `.class`, `[attr]` and `[attr=value]`
//! simple selectors, descendant and child combinators, and selector lists.
//!
//! [`Document::query_selector`]: crate::dom::Document::query_selector

use thiserror::Error;

use crate::dom::{DocumentInner, NodeId};

/// Errors produced while parsing a selector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character {ch:?} at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("expected a name at position {pos}")]
    MissingName { pos: usize },
    #[error("unterminated attribute selector starting at position {pos}")]
    UnterminatedAttribute { pos: usize },
    #[error("combinator at position {pos} is not followed by a selector")]
    DanglingCombinator { pos: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeSelector {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
}

/// Compounds joined by combinators. The combinator stored with a compound
/// relates it to the compound before it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex(Vec<(Combinator, Compound)>);

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<Complex>);

impl SelectorList {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        if source.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        Parser {
            chars: source.chars().collect(),
            pos: 0,
        }
        .parse_list()
    }

    pub(crate) fn matches(&self, doc: &DocumentInner, node: NodeId) -> bool {
        doc.element(node).is_some()
            && self
                .0
                .iter()
                .any(|complex| match_from(doc, node, &complex.0, complex.0.len() - 1))
    }
}

fn match_from(
    doc: &DocumentInner,
    node: NodeId,
    parts: &[(Combinator, Compound)],
    index: usize,
) -> bool {
    let (combinator, compound) = &parts[index];
    if !matches_compound(doc, node, compound) {
        return false;
    }
    if index == 0 {
        return true;
    }
    match combinator {
        Combinator::Child => doc
            .parent_element(node)
            .is_some_and(|parent| match_from(doc, parent, parts, index - 1)),
        Combinator::Descendant => {
            let mut current = doc.parent_element(node);
            while let Some(ancestor) = current {
                if match_from(doc, ancestor, parts, index - 1) {
                    return true;
                }
                current = doc.parent_element(ancestor);
            }
            false
        }
    }
}

fn matches_compound(doc: &DocumentInner, node: NodeId, compound: &Compound) -> bool {
    let Some(el) = doc.element(node) else {
        return false;
    };
    if compound
        .tag
        .as_ref()
        .is_some_and(|tag| !tag.eq_ignore_ascii_case(&el.tag))
    {
        return false;
    }
    if let Some(id) = &compound.id {
        if el.attribute("id").as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    if !compound.classes.iter().all(|c| el.classes.contains(c)) {
        return false;
    }
    compound.attributes.iter().all(|attr| match el.attribute(&attr.name) {
        None => false,
        Some(actual) => attr.value.as_ref().is_none_or(|expected| *expected == actual),
    })
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn parse_list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut list = Vec::new();
        loop {
            self.skip_whitespace();
            list.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => self.pos += 1,
                Some(ch) => return Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            }
        }
        Ok(SelectorList(list))
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        loop {
            let compound = self.parse_compound()?;
            parts.push((combinator, compound));
            let had_space = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    let pos = self.pos;
                    self.pos += 1;
                    self.skip_whitespace();
                    if matches!(self.peek(), None | Some(',') | Some('>')) {
                        return Err(SelectorError::DanglingCombinator { pos });
                    }
                    combinator = Combinator::Child;
                }
                Some(_) if had_space => combinator = Combinator::Descendant,
                Some(ch) => return Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            }
        }
        Ok(Complex(parts))
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let mut compound = Compound::default();
        let mut universal = false;
        loop {
            match self.peek() {
                Some('*') if self.pos == start => {
                    self.pos += 1;
                    universal = true;
                }
                Some(ch) if self.pos == start && is_name_char(ch) => {
                    compound.tag = Some(self.parse_name()?.to_ascii_lowercase());
                }
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.parse_name()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_name()?);
                }
                Some('[') => compound.attributes.push(self.parse_attribute()?),
                _ => break,
            }
        }
        if self.pos == start && !universal {
            return match self.peek() {
                None => Err(SelectorError::MissingName { pos: self.pos }),
                Some(ch) => Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            };
        }
        Ok(compound)
    }

    fn parse_name(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(SelectorError::MissingName { pos: start });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        let open = self.pos;
        self.pos += 1;
        self.skip_whitespace();
        let name = self.parse_name()?.to_ascii_lowercase();
        self.skip_whitespace();
        let value = match self.peek() {
            Some('=') => {
                self.pos += 1;
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.pos += 1;
                        let start = self.pos;
                        while self.peek().is_some_and(|c| c != quote) {
                            self.pos += 1;
                        }
                        if self.peek().is_none() {
                            return Err(SelectorError::UnterminatedAttribute { pos: open });
                        }
                        let value: String = self.chars[start..self.pos].iter().collect();
                        self.pos += 1;
                        value
                    }
                    _ => self.parse_name()?,
                };
                self.skip_whitespace();
                Some(value)
            }
            _ => None,
        };
        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(AttributeSelector { name, value })
            }
            None => Err(SelectorError::UnterminatedAttribute { pos: open }),
            Some(ch) => Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
        }
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn page() -> (Document, NodeId, NodeId, NodeId) {
        let doc = Document::new();
        let app = doc.h("div", [("id", "app"), ("data-role", "host")], None);
        let track = doc.h("div", [("class", "ks-slide-track")], None);
        let block = doc.h("div", [("class", "ks-slide-block ks-slide-success")], None);
        doc.append_child(doc.body(), app).unwrap();
        doc.append_child(app, track).unwrap();
        doc.append_child(track, block).unwrap();
        (doc, app, track, block)
    }

    #[test]
    fn test_simple_selectors() {
        let (doc, app, track, block) = page();
        assert_eq!(doc.query_selector("#app"), Some(app));
        assert_eq!(doc.query_selector("div.ks-slide-track"), Some(track));
        assert_eq!(doc.query_selector(".ks-slide-block.ks-slide-success"), Some(block));
        assert_eq!(doc.query_selector("[data-role]"), Some(app));
        assert_eq!(doc.query_selector("[data-role=\"host\"]"), Some(app));
        assert_eq!(doc.query_selector("[data-role=guest]"), None);
        assert_eq!(doc.query_selector("*"), Some(doc.body()));
    }

    #[test]
    fn test_combinators() {
        let (doc, _app, track, block) = page();
        assert_eq!(doc.query_selector("#app .ks-slide-block"), Some(block));
        assert_eq!(doc.query_selector("#app > .ks-slide-block"), None);
        assert_eq!(doc.query_selector("#app > div"), Some(track));
        assert_eq!(doc.query_selector("body #app>div > div"), Some(block));
    }

    #[test]
    fn test_selector_list() {
        let (doc, app, _track, block) = page();
        assert_eq!(
            doc.query_selector_all(".ks-slide-block, #app"),
            vec![app, block]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(SelectorList::parse("  "), Err(SelectorError::Empty));
        assert_eq!(
            SelectorList::parse("div >"),
            Err(SelectorError::DanglingCombinator { pos: 4 })
        );
        assert_eq!(
            SelectorList::parse("[title"),
            Err(SelectorError::UnterminatedAttribute { pos: 0 })
        );
        assert_eq!(
            SelectorList::parse("div,"),
            Err(SelectorError::MissingName { pos: 4 })
        );
        assert_eq!(SelectorList::parse("#"), Err(SelectorError::MissingName { pos: 1 }));
        assert!(matches!(
            SelectorList::parse("div + p"),
            Err(SelectorError::UnexpectedChar { ch: '+', .. })
        ));
    }
}
