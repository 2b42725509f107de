//! Tree-walking evaluation.
//!
//! Two interpreters cooperate here. The expression evaluator is synchronous
//! and handles the embedded expression language against a chained scope. The
//! template evaluator is asynchronous because rendering an element may import
//! a component source from disk; it walks the markup nodes and produces the
//! final HTML string.

pub mod expression;
pub mod template;
pub mod value;

pub use expression::{ExpressionEvaluator, Scope};
pub use template::TemplateEvaluator;
pub use value::Value;
