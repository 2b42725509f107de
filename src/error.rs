//! Error types for the htmy pipeline.
//!
//! All stages report through one [`Error`] enum. Lexical, syntax, resolution
//! and tree-shape errors abort the in-flight parse or render; the only
//! recoverable failure in the whole pipeline is an attribute bound to a value
//! of an unsupported runtime type, which renders a sentinel string instead of
//! an error (see the template evaluator).

use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort tokenizing, parsing, importing or rendering.
#[derive(Debug)]
pub enum Error {
    /// An expression context closed its designated delimiter while a braced
    /// group inside it was still open.
    UnclosedBraces,
    /// An expression context closed its designated delimiter while a
    /// parenthesized group inside it was still open.
    UnclosedParens,
    /// A required grammar fragment did not match.
    RequiredNoMatch { pattern: String },
    /// An element was closed with a different tag name than it was opened
    /// with.
    TagMismatch { open: String, close: String },
    /// A grammar rule matched but its captures did not carry what the node
    /// builder needs. Indicates a broken rule, not broken input.
    MalformedMatch { node: &'static str },
    /// An identifier was not found anywhere in the scope chain.
    NotDefined { name: String },
    /// An operator needed an identifier operand but got another node kind.
    ExpectedIdentifier { found: &'static str },
    /// An operator was applied to runtime values it has no meaning for.
    InvalidOperands { operator: &'static str },
    /// An evaluator was handed a node kind it has no case for.
    Unevaluatable { node: &'static str },
    /// A template source parsed to a tree with no content.
    EmptyTree { path: PathBuf },
    /// A template or component source could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A caller supplied data value with no htmy runtime representation.
    UnsupportedData { found: &'static str },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnclosedBraces => write!(f, "expected the close of braces"),
            Error::UnclosedParens => write!(f, "expected the close of parens"),
            Error::RequiredNoMatch { pattern } => {
                write!(f, "required pattern {} did not match", pattern)
            }
            Error::TagMismatch { open, close } => {
                write!(f, "can't close tag <{}> with </{}>", open, close)
            }
            Error::MalformedMatch { node } => {
                write!(f, "match for {} node is missing a capture", node)
            }
            Error::NotDefined { name } => write!(f, "'{}' is not defined", name),
            Error::ExpectedIdentifier { found } => {
                write!(f, "expected an identifier, received a {} node", found)
            }
            Error::InvalidOperands { operator } => {
                write!(f, "invalid operands for operator '{}'", operator)
            }
            Error::Unevaluatable { node } => write!(f, "can't evaluate node {}", node),
            Error::EmptyTree { path } => {
                write!(f, "empty syntax tree in {}", path.display())
            }
            Error::Io { path, source } => {
                write!(f, "can't read {}: {}", path.display(), source)
            }
            Error::UnsupportedData { found } => {
                write!(f, "unsupported data value of type {}", found)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
