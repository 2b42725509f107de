//! # htmy
//!
//! A small template language that turns HTML-like source text with embedded
//! expressions and control statements into a syntax tree, then renders that
//! tree to an HTML string against a data scope.
//!
//! The pipeline runs strictly forward:
//!
//!     text -> tokens -> syntax tree -> rendered string
//!
//! - [`lexer`] tokenizes markup with a context-sensitive scanner and hands
//!   embedded expression regions to a nested expression-mode lexer.
//! - [`parser`] matches the token stream against a combinator grammar and
//!   produces a [`parser::SyntaxNode`] tree; binary operators are rebalanced
//!   after parsing so that fixed priorities win over token order.
//! - [`eval`] walks the tree with two cooperating interpreters: a synchronous
//!   expression evaluator over chained scopes and an asynchronous template
//!   evaluator that resolves components, binds properties and serializes
//!   HTML.
//! - [`importer`] and [`renderer`] tie the stages together: sources are
//!   loaded from `<name>.htmy` files, parsed at most once per path through an
//!   explicitly threaded cache, and rendered against a caller supplied scope.
//!
//! ## Example
//!
//! Given `views/test1.htmy`:
//!
//! ```htmy
//! <h1>Hello {user.name}!</h1>
//! ```
//!
//! rendering `test1` with a scope binding `user` to a record produces
//! `<h1>Hello Andrey!</h1>`.

pub mod error;
pub mod eval;
pub mod importer;
pub mod lexer;
pub mod parser;
pub mod renderer;

pub use error::{Error, Result};
pub use eval::{ExpressionEvaluator, Scope, TemplateEvaluator, Value};
pub use importer::{ImportCache, Importer};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse, BinaryOperator, NodeKind, SyntaxNode};
pub use renderer::Renderer;
