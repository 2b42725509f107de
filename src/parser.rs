//! Parser for the htmy token stream.
//!
//! The parser is a combinator engine over a token window plus a registry
//! associating syntax node kinds with either a declarative pattern or a
//! hand-written parser. Declarative rules live in [`grammar`]. Binary
//! expression chaining and its precedence rebalancing mutate already-built
//! nodes, which the algebra cannot express, so those two are hand-written
//! in [`operation`].
//!
//! Matching is backtracking-free: a pattern either consumes a prefix of the
//! window or fails, and failures of `Required`/`Assert` fragments are fatal
//! for the whole parse.

pub mod ast;
pub mod grammar;
pub mod operation;
pub mod pattern;

pub use ast::{BinaryOperator, NodeKind, SyntaxNode};
pub use grammar::parse;
