//! The CSS selector subset product templates rely on.
//!
//! Supported: type (`form`), universal (`*`), id (`#main`), class
//! (`.spinner`), attribute presence (`[data-product-sku]`), attribute
//! equality (`[data-product-price-wrapper="with-tax"]`), compounds of those,
//! the descendant combinator and comma-separated groups.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{Document, Element, NodeId};

/// Errors raised while parsing a selector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// Nothing to match (empty input or an empty group).
    #[error("Empty selector: {0:?}")]
    Empty(String),

    /// A character outside the supported grammar.
    #[error("Unexpected '{found}' at offset {offset} in selector {selector:?}")]
    Unexpected {
        selector: String,
        found: char,
        offset: usize,
    },

    /// `[` without a matching `]` or an unclosed quote.
    #[error("Unterminated attribute selector in {0:?}")]
    UnterminatedAttribute(String),
}

/// One simple selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

impl SimpleSelector {
    fn matches(&self, el: &Element) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => el.tag() == tag,
            Self::Id(id) => el.attr("id") == Some(id.as_str()),
            Self::Class(class) => el.has_class(class),
            Self::Attribute { name, value: None } => el.has_attr(name),
            Self::Attribute {
                name,
                value: Some(expected),
            } => el.attr(name) == Some(expected.as_str()),
        }
    }
}

/// Simple selectors that must all match the same element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    parts: Vec<SimpleSelector>,
}

impl Compound {
    fn matches(&self, el: &Element) -> bool {
        self.parts.iter().all(|p| p.matches(el))
    }
}

/// Compounds joined by descendant combinators, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
}

impl Complex {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_at(doc, id, n - 1),
        }
    }

    fn matches_at(&self, doc: &Document, id: NodeId, idx: usize) -> bool {
        if doc.is_document_node(id) {
            return false;
        }
        let Some(el) = doc.get(id) else {
            return false;
        };
        if !self.compounds[idx].matches(el) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        doc.ancestors(id).any(|a| self.matches_at(doc, a, idx - 1))
    }
}

/// A parsed selector group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    /// Parse a selector.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse()
    }

    /// Whether the element matches any alternative.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, id))
    }

    /// The source text.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Selector, SelectorError> {
        let mut alternatives = Vec::new();
        let mut compounds = Vec::new();
        let mut current = Compound::default();

        while let Some(c) = self.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.pos += 1;
                    if !current.parts.is_empty() {
                        compounds.push(std::mem::take(&mut current));
                    }
                }
                ',' => {
                    self.pos += 1;
                    if !current.parts.is_empty() {
                        compounds.push(std::mem::take(&mut current));
                    }
                    if compounds.is_empty() {
                        return Err(SelectorError::Empty(self.source.to_string()));
                    }
                    alternatives.push(Complex {
                        compounds: std::mem::take(&mut compounds),
                    });
                }
                '*' => {
                    self.pos += 1;
                    current.parts.push(SimpleSelector::Universal);
                }
                '.' => {
                    self.pos += 1;
                    let name = self.ident()?;
                    current.parts.push(SimpleSelector::Class(name));
                }
                '#' => {
                    self.pos += 1;
                    let name = self.ident()?;
                    current.parts.push(SimpleSelector::Id(name));
                }
                '[' => {
                    self.pos += 1;
                    let attribute = self.attribute()?;
                    current.parts.push(attribute);
                }
                c if is_ident_char(c) => {
                    let name = self.ident()?;
                    current.parts.push(SimpleSelector::Tag(name.to_ascii_lowercase()));
                }
                other => return Err(self.unexpected(other)),
            }
        }

        if !current.parts.is_empty() {
            compounds.push(current);
        }
        if compounds.is_empty() {
            return Err(SelectorError::Empty(self.source.to_string()));
        }
        alternatives.push(Complex { compounds });

        Ok(Selector {
            source: self.source.trim().to_string(),
            alternatives,
        })
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.source.to_string(),
            found,
            offset: self.pos,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => SelectorError::Empty(self.source.to_string()),
            });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attribute(&mut self) -> Result<SimpleSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();

        let value = match self.peek() {
            Some(']') => None,
            Some('=') => {
                self.pos += 1;
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => self.quoted(quote)?,
                    Some(_) => self.ident()?,
                    None => {
                        return Err(SelectorError::UnterminatedAttribute(
                            self.source.to_string(),
                        ))
                    }
                };
                self.skip_whitespace();
                Some(value)
            }
            Some(other) => return Err(self.unexpected(other)),
            None => {
                return Err(SelectorError::UnterminatedAttribute(
                    self.source.to_string(),
                ))
            }
        };

        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(SimpleSelector::Attribute { name, value })
            }
            Some(other) => Err(self.unexpected(other)),
            None => Err(SelectorError::UnterminatedAttribute(
                self.source.to_string(),
            )),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(value);
            }
            self.pos += 1;
        }
        Err(SelectorError::UnterminatedAttribute(self.source.to_string()))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
