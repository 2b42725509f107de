//! Expression-mode sub-lexer.
//!
//! Sliced expression regions are tokenized independently of the surrounding
//! markup with a plain logos lexer. Scanning is deliberately lenient: any
//! character the lexer does not recognize is skipped one at a time, so a
//! malformed expression degrades into fewer tokens rather than a hard error.
//! Structural validation (balanced delimiters) happens before this lexer
//! runs, when the region is sliced out of the markup.

use logos::Logos;

use crate::lexer::token::{Token, TokenKind};

/// Raw expression-language tokens.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum ExprToken {
    #[token("(")]
    OpenParens,
    #[token(")")]
    CloseParens,
    #[token("{")]
    OpenBraces,
    #[token("}")]
    CloseBraces,
    #[token(".")]
    Dot,
    #[token("+")]
    Plus,
    #[token(",")]
    Comma,
    #[token("==")]
    Equals,
    #[token("!=")]
    NotEquals,
    #[token("=")]
    Assign,

    #[token("if")]
    If,

    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    #[regex(r"[0-9]+")]
    Number,
}

impl ExprToken {
    fn kind(self) -> TokenKind {
        match self {
            ExprToken::OpenParens => TokenKind::OpenParens,
            ExprToken::CloseParens => TokenKind::CloseParens,
            ExprToken::OpenBraces => TokenKind::OpenBraces,
            ExprToken::CloseBraces => TokenKind::CloseBraces,
            ExprToken::Dot => TokenKind::Dot,
            ExprToken::Plus => TokenKind::Plus,
            ExprToken::Comma => TokenKind::Comma,
            ExprToken::Equals => TokenKind::ExprEquals,
            ExprToken::NotEquals => TokenKind::ExprNotEquals,
            ExprToken::Assign => TokenKind::Assign,
            ExprToken::If => TokenKind::Keyword,
            ExprToken::Null => TokenKind::ExprNull,
            ExprToken::True | ExprToken::False => TokenKind::ExprBool,
            ExprToken::Identifier => TokenKind::ExprIdentifier,
            ExprToken::Number => TokenKind::ExprNumber,
        }
    }
}

/// Tokenize one expression region. Unrecognized input is dropped.
pub fn tokenize_expression(source: &str) -> Vec<Token> {
    let mut lexer = ExprToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        if let Ok(token) = result {
            tokens.push(Token::new(token.kind(), lexer.slice()));
        }
    }

    tokens
}
