//! Lexer for htmy template source.
//!
//! Tokenization is a single left-to-right scan with three cooperating modes
//! tracked as scanner state:
//!
//! - **tag context** is active between an opening angle bracket and the
//!   `>`/`/>` that closes it; only there are HTML identifiers and quoted
//!   strings recognized.
//! - **pending keyword** is active between `@for`/`@if` and the consumption
//!   of the parenthesized expression context that follows it.
//! - **text collecting** holds when neither of the above does; runs of
//!   characters up to the next structural character become single text
//!   tokens.
//!
//! On `{` anywhere, or on `(` while a keyword is pending, the scanner slices
//! out a delimited expression region, hands it to the expression-mode
//! sub-lexer and splices the result between open/close context markers. See
//! [`scanner`] for the mode machinery and [`expression`] for the sub-lexer.

pub mod expression;
pub mod scanner;
pub mod token;

pub use scanner::tokenize;
pub use token::{Token, TokenKind};
