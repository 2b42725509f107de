//! Token definitions for the htmy lexer.
//!
//! A token is an immutable pair of a kind tag and its exact source text.
//! Tokens are produced once by the lexer, never mutated, and consumed
//! strictly in order by the parser. The kind set covers HTML punctuation and
//! content, the template keywords, the expression-context markers that wrap
//! spliced expression regions, and the expression-language tokens produced by
//! the sub-lexer.

use std::fmt;

/// The closed set of token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TokenKind {
    /// `<`
    ArrowLeft,
    /// `>`
    ArrowRight,
    /// `</`
    TagCloseLeft,
    /// `/>`
    TagCloseRight,

    /// A run of literal markup text.
    HtmlText,
    /// A tag or property name inside a tag context.
    HtmlIdentifier,
    /// A quoted string inside a tag context, quotes included.
    HtmlString,

    /// A template keyword: `@for`, `@if`, `@end`, or `if` inside an
    /// expression region.
    Keyword,
    /// Marker opening a spliced expression region.
    OpenContext,
    /// Marker closing a spliced expression region.
    CloseContext,

    /// `{` inside an expression region.
    OpenBraces,
    /// `}` inside an expression region.
    CloseBraces,
    /// `(` outside a tag context, or inside an expression region.
    OpenParens,
    /// `)` outside a tag context, or inside an expression region.
    CloseParens,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `+`
    Plus,
    /// `=`
    Assign,

    /// An expression-language identifier.
    ExprIdentifier,
    /// An unsigned integer literal.
    ExprNumber,
    /// `==`
    ExprEquals,
    /// `!=`
    ExprNotEquals,
    /// `null`
    ExprNull,
    /// `true` or `false`
    ExprBool,
}

/// One lexed token: a kind and the exact text it was matched from.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Token {
        Token {
            kind,
            text: text.into(),
        }
    }

    /// Whether this token opens a tag context.
    pub fn opens_tag_context(&self) -> bool {
        matches!(self.kind, TokenKind::ArrowLeft | TokenKind::TagCloseLeft)
    }

    /// Whether this token closes a tag context.
    pub fn closes_tag_context(&self) -> bool {
        matches!(self.kind, TokenKind::ArrowRight | TokenKind::TagCloseRight)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {:?})", self.kind, self.text)
    }
}
