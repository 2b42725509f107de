//! The pattern combinator algebra.
//!
//! Patterns are immutable descriptions of grammar fragments. Matching a
//! pattern against a token window yields `Ok(Some(Match))` with the consumed
//! length and resulting value, `Ok(None)` for an ordinary failure the caller
//! may recover from, or `Err` for a fatal parse error raised by a `Required`
//! or `Assert` fragment.
//!
//! Named captures accumulate in a [`MatchOut`] bag that is threaded by
//! mutable reference through every sub-match of a composite pattern. The
//! sharing is deliberate and part of the engine's contract: captures written
//! by an earlier successful sub-pattern persist even when a later sibling in
//! the same alternative fails, and `Or` does not reset the bag between
//! attempts. The element rule depends on this to let its closing-tag
//! assertion read the opening identifier captured earlier in the sequence.
//! The one exception is `Transform`, which matches its inner pattern against
//! a fresh bag.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::lexer::token::{Token, TokenKind};
use crate::parser::ast::{NodeKind, SyntaxNode};
use crate::parser::grammar;

/// A pure mapping applied to a successful match's value.
pub type TransformFn = fn(MatchValue) -> MatchValue;

/// A semantic check run after a successful match; an `Err` is fatal.
pub type AssertFn = fn(&Match, &MatchOut) -> Result<()>;

/// The value produced by a successful match.
#[derive(Debug, Clone)]
pub enum MatchValue {
    /// Optional pattern that matched nothing.
    None,
    Token(Token),
    /// Token text after a transform.
    Text(String),
    Node(SyntaxNode),
    /// Values of a sequence's or repetition's sub-matches, in order.
    List(Vec<MatchValue>),
}

impl MatchValue {
    pub fn into_node(self) -> Option<SyntaxNode> {
        match self {
            MatchValue::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            MatchValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            MatchValue::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<MatchValue>> {
        match self {
            MatchValue::List(values) => Some(values),
            _ => None,
        }
    }
}

/// Named-capture bag accumulated across a composite pattern's sub-matches.
#[derive(Debug, Default)]
pub struct MatchOut {
    inner: HashMap<&'static str, MatchValue>,
}

impl MatchOut {
    pub fn new() -> MatchOut {
        MatchOut::default()
    }

    pub fn add(&mut self, name: &'static str, value: MatchValue) {
        self.inner.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&MatchValue> {
        self.inner.get(name)
    }

    pub fn take(&mut self, name: &str) -> Option<MatchValue> {
        self.inner.remove(name)
    }
}

/// A successful match: consumed token count plus resulting value.
#[derive(Debug)]
pub struct Match {
    pub value: MatchValue,
    pub length: usize,
}

/// Immutable grammar fragment.
pub enum Pattern {
    /// Sub-patterns in order; fails as a unit.
    Seq(Vec<Pattern>),
    /// First success wins; the capture bag is not reset between attempts.
    Or(Vec<Pattern>),
    /// Always succeeds; zero length on inner failure.
    Opt(Box<Pattern>),
    /// Greedy repetition; stops on inner failure or zero-length success.
    Many(Box<Pattern>),
    /// Writes the inner value into the capture bag on success.
    Named(Box<Pattern>, &'static str),
    /// Promotes inner failure to a fatal parse error.
    Required(Box<Pattern>),
    /// Exactly one token by kind, optionally by exact text too.
    Token(TokenKind, Option<&'static str>),
    /// Delegates to the registered parser for a node kind.
    Node(NodeKind),
    /// Applies a pure mapping to the inner value. Matches against a fresh
    /// capture bag.
    Transform(Box<Pattern>, TransformFn),
    /// Inner must match; the check may then raise a fatal error.
    Assert(Box<Pattern>, AssertFn),
}

impl Pattern {
    pub fn seq(patterns: Vec<Pattern>) -> Pattern {
        Pattern::Seq(patterns)
    }

    pub fn or(patterns: Vec<Pattern>) -> Pattern {
        Pattern::Or(patterns)
    }

    pub fn token(kind: TokenKind) -> Pattern {
        Pattern::Token(kind, None)
    }

    pub fn token_text(kind: TokenKind, text: &'static str) -> Pattern {
        Pattern::Token(kind, Some(text))
    }

    pub fn node(kind: NodeKind) -> Pattern {
        Pattern::Node(kind)
    }

    pub fn opt(self) -> Pattern {
        Pattern::Opt(Box::new(self))
    }

    pub fn many(self) -> Pattern {
        Pattern::Many(Box::new(self))
    }

    pub fn named(self, name: &'static str) -> Pattern {
        Pattern::Named(Box::new(self), name)
    }

    pub fn required(self) -> Pattern {
        Pattern::Required(Box::new(self))
    }

    pub fn transform(self, f: TransformFn) -> Pattern {
        Pattern::Transform(Box::new(self), f)
    }

    pub fn assert(self, f: AssertFn) -> Pattern {
        Pattern::Assert(Box::new(self), f)
    }

    /// Match this pattern against the front of `tokens`.
    pub fn match_at(&self, tokens: &[Token], out: &mut MatchOut) -> Result<Option<Match>> {
        match self {
            Pattern::Seq(patterns) => {
                let mut values = Vec::with_capacity(patterns.len());
                let mut length = 0;

                for pattern in patterns {
                    match pattern.match_at(&tokens[length..], out)? {
                        None => return Ok(None),
                        Some(m) => {
                            length += m.length;
                            values.push(m.value);
                        }
                    }
                }

                Ok(Some(Match {
                    value: MatchValue::List(values),
                    length,
                }))
            }

            Pattern::Or(patterns) => {
                for pattern in patterns {
                    if let Some(m) = pattern.match_at(tokens, out)? {
                        return Ok(Some(m));
                    }
                }

                Ok(None)
            }

            Pattern::Opt(pattern) => match pattern.match_at(tokens, out)? {
                None => Ok(Some(Match {
                    value: MatchValue::None,
                    length: 0,
                })),
                some => Ok(some),
            },

            Pattern::Many(pattern) => {
                let mut values = Vec::new();
                let mut length = 0;

                loop {
                    match pattern.match_at(&tokens[length..], out)? {
                        Some(m) if m.length > 0 => {
                            length += m.length;
                            values.push(m.value);
                        }
                        // a zero-length success would loop forever
                        _ => break,
                    }
                }

                Ok(Some(Match {
                    value: MatchValue::List(values),
                    length,
                }))
            }

            Pattern::Named(pattern, name) => match pattern.match_at(tokens, out)? {
                None => Ok(None),
                Some(m) => {
                    out.add(name, m.value.clone());
                    Ok(Some(m))
                }
            },

            Pattern::Required(pattern) => match pattern.match_at(tokens, out)? {
                None => Err(Error::RequiredNoMatch {
                    pattern: pattern.to_string(),
                }),
                some => Ok(some),
            },

            Pattern::Token(kind, text) => {
                let Some(token) = tokens.first() else {
                    return Ok(None);
                };

                if token.kind != *kind {
                    return Ok(None);
                }
                if let Some(text) = text {
                    if token.text != *text {
                        return Ok(None);
                    }
                }

                Ok(Some(Match {
                    value: MatchValue::Token(token.clone()),
                    length: 1,
                }))
            }

            Pattern::Node(kind) => match grammar::parse_node(*kind, tokens)? {
                None => Ok(None),
                Some(node) => Ok(Some(Match {
                    length: node.len(),
                    value: MatchValue::Node(node),
                })),
            },

            Pattern::Transform(pattern, f) => {
                let mut inner_out = MatchOut::new();
                match pattern.match_at(tokens, &mut inner_out)? {
                    None => Ok(None),
                    Some(m) => Ok(Some(Match {
                        value: f(m.value),
                        length: m.length,
                    })),
                }
            }

            Pattern::Assert(pattern, f) => match pattern.match_at(tokens, out)? {
                None => Ok(None),
                Some(m) => {
                    f(&m, out)?;
                    Ok(Some(m))
                }
            },
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Seq(patterns) => {
                write!(f, "Patterns[")?;
                display_list(f, patterns)?;
                write!(f, "]")
            }
            Pattern::Or(patterns) => {
                write!(f, "Or[")?;
                display_list(f, patterns)?;
                write!(f, "]")
            }
            Pattern::Opt(pattern) => write!(f, "Opt({})", pattern),
            Pattern::Many(pattern) => write!(f, "Many({})", pattern),
            Pattern::Named(pattern, name) => write!(f, "Named({}, '{}')", pattern, name),
            Pattern::Required(pattern) => write!(f, "Required({})", pattern),
            Pattern::Token(kind, text) => {
                write!(f, "Token(kind = {:?}, text = {})", kind, text.unwrap_or("*"))
            }
            Pattern::Node(kind) => write!(f, "Node({:?})", kind),
            Pattern::Transform(pattern, _) => pattern.fmt(f),
            Pattern::Assert(pattern, _) => pattern.fmt(f),
        }
    }
}

fn display_list(f: &mut fmt::Formatter<'_>, patterns: &[Pattern]) -> fmt::Result {
    for (i, pattern) in patterns.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", pattern)?;
    }
    Ok(())
}

/// Extract a token's text. The usual first transform of leaf rules.
pub fn token_text(value: MatchValue) -> MatchValue {
    match value {
        MatchValue::Token(token) => MatchValue::Text(token.text),
        other => other,
    }
}

/// Strip the first and last character: unquotes a lexed string literal.
pub fn unquote(value: MatchValue) -> MatchValue {
    match value {
        MatchValue::Text(text) => {
            let mut chars = text.chars();
            chars.next();
            chars.next_back();
            MatchValue::Text(chars.as_str().to_string())
        }
        other => other,
    }
}
