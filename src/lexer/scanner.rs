//! Context-sensitive markup scanner.
//!
//! The scanner walks the source once, trying a fixed matcher list at every
//! position. The list order is significant: two-character punctuation is
//! tried before one-character punctuation sharing a prefix, keywords before
//! `=`, and the context-dependent matchers (strings and identifiers inside a
//! tag, text runs while collecting) come last. A position where no matcher
//! applies is skipped one character at a time.
//!
//! Expression regions are not tokenized here. When `{` is seen anywhere, or
//! `(` while `@for`/`@if` is pending, the region is sliced out by counting
//! delimiter nesting, lexed by the expression sub-lexer, and spliced into the
//! stream between [`TokenKind::OpenContext`] and [`TokenKind::CloseContext`]
//! markers.

use crate::error::{Error, Result};
use crate::lexer::expression::tokenize_expression;
use crate::lexer::token::{Token, TokenKind};

/// Characters that terminate a markup text run.
const TEXT_END: [char; 5] = ['<', '{', '@', '\r', '\n'];

/// Fixed punctuation and keyword matchers, longest-applicable-first.
const LITERAL_MATCHERS: [(&str, TokenKind); 12] = [
    ("</", TokenKind::TagCloseLeft),
    ("/>", TokenKind::TagCloseRight),
    ("<", TokenKind::ArrowLeft),
    (">", TokenKind::ArrowRight),
    ("{", TokenKind::OpenBraces),
    ("}", TokenKind::CloseBraces),
    ("(", TokenKind::OpenParens),
    (")", TokenKind::CloseParens),
    ("@for", TokenKind::Keyword),
    ("@if", TokenKind::Keyword),
    ("@end", TokenKind::Keyword),
    ("=", TokenKind::Assign),
];

/// Tokenize htmy template source.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Scanner::new(source).run()
}

struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    tag_context: bool,
    /// Set while `@for`/`@if` awaits its parenthesized expression context.
    pending_keyword: bool,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source,
            pos: 0,
            tag_context: false,
            pending_keyword: false,
            tokens: Vec::new(),
        }
    }

    fn collecting_text(&self) -> bool {
        !self.tag_context && !self.pending_keyword
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while self.pos < self.source.len() {
            let rest = &self.source[self.pos..];

            let Some(token) = self.match_token(rest) else {
                self.skip_char(rest);
                continue;
            };

            if token.opens_tag_context() {
                self.tag_context = true;
            } else if token.closes_tag_context() {
                self.tag_context = false;
            }

            match token.kind {
                TokenKind::OpenBraces => {
                    self.splice_context(rest, '{', '}')?;
                    continue;
                }
                TokenKind::OpenParens if self.pending_keyword => {
                    self.splice_context(rest, '(', ')')?;
                    self.pending_keyword = false;
                    continue;
                }
                TokenKind::Keyword => {
                    self.pending_keyword = token.text == "@for" || token.text == "@if";
                }
                _ => {}
            }

            self.pos += token.text.len();
            self.tokens.push(token);
        }

        Ok(self.tokens)
    }

    /// Advance past one character when no matcher applies.
    fn skip_char(&mut self, rest: &str) {
        let width = rest.chars().next().map(char::len_utf8).unwrap_or(1);
        self.pos += width;
    }

    /// Slice the delimited expression region starting at `rest`, tokenize it
    /// in expression mode and splice the result between context markers.
    fn splice_context(&mut self, rest: &str, open: char, close: char) -> Result<()> {
        let inner = slice_expression_context(rest, open, close)?;

        self.tokens
            .push(Token::new(TokenKind::OpenContext, open.to_string()));
        self.tokens.extend(tokenize_expression(inner));
        self.tokens
            .push(Token::new(TokenKind::CloseContext, close.to_string()));

        self.pos += inner.len() + open.len_utf8() + close.len_utf8();
        Ok(())
    }

    fn match_token(&self, rest: &str) -> Option<Token> {
        for (literal, kind) in LITERAL_MATCHERS {
            if rest.starts_with(literal) {
                return Some(Token::new(kind, literal));
            }
        }

        if self.tag_context {
            if let Some(text) = match_string(rest) {
                return Some(Token::new(TokenKind::HtmlString, text));
            }
            if let Some(text) = match_identifier(rest) {
                return Some(Token::new(TokenKind::HtmlIdentifier, text));
            }
        }

        if self.collecting_text() {
            if let Some(text) = match_text(rest) {
                return Some(Token::new(TokenKind::HtmlText, text));
            }
        }

        None
    }
}

/// A text run reaches up to the next structural character. A run that never
/// hits one (trailing text at end of input) is not a match; neither is a
/// zero-length run.
fn match_text(rest: &str) -> Option<&str> {
    let end = rest.find(&TEXT_END[..])?;
    if end == 0 {
        return None;
    }
    Some(&rest[..end])
}

/// Quoted string, either quote character. Unterminated-safe: without a
/// closing quote the match runs to end of input.
fn match_string(rest: &str) -> Option<&str> {
    let quote = match rest.chars().next() {
        Some(c @ ('"' | '\'')) => c,
        _ => return None,
    };

    match rest[1..].find(quote) {
        Some(i) => Some(&rest[..i + 2]),
        None => Some(rest),
    }
}

fn match_identifier(rest: &str) -> Option<&str> {
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return None,
    }

    let end = chars
        .find(|(_, c)| !c.is_ascii_alphanumeric() && *c != '_')
        .map(|(i, _)| i)
        .unwrap_or(rest.len());

    Some(&rest[..end])
}

/// Slice the substring delimited by `open`/`close` starting at the first
/// character of `rest`, excluding the delimiters themselves.
///
/// The designated delimiter's nesting is counted, and `(`/`)` and `{`/`}`
/// balance is tracked independently; if the designated nesting returns to
/// zero while the other bracket kind is still open, the region is malformed.
fn slice_expression_context(rest: &str, open: char, close: char) -> Result<&str> {
    let mut braces_open = 0i32;
    let mut parens_open = 0i32;
    let mut context_level = 0i32;
    let mut end = None;

    for (i, c) in rest.char_indices() {
        if c == open {
            context_level += 1;
        }
        if c == close {
            context_level -= 1;
        }

        match c {
            '(' => parens_open += 1,
            ')' => parens_open -= 1,
            '{' => braces_open += 1,
            '}' => braces_open -= 1,
            _ => {}
        }

        if context_level == 0 {
            end = Some(i);
            break;
        }
    }

    let Some(end) = end else {
        // ran off the end with the designated delimiter still open
        return match open {
            '{' => Err(Error::UnclosedBraces),
            _ => Err(Error::UnclosedParens),
        };
    };

    if braces_open > 0 {
        return Err(Error::UnclosedBraces);
    }
    if parens_open > 0 {
        return Err(Error::UnclosedParens);
    }

    Ok(&rest[open.len_utf8()..end])
}
