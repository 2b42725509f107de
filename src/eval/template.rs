//! The asynchronous template interpreter.
//!
//! Walks markup nodes and produces HTML. Evaluation suspends only at
//! component import boundaries; children of a children node are launched
//! together and their results joined in source order, so import I/O overlaps
//! without ever reordering output.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::{try_join_all, BoxFuture, FutureExt};

use crate::error::{Error, Result};
use crate::eval::expression::{ExpressionEvaluator, Scope};
use crate::eval::value::Value;
use crate::importer::Importer;
use crate::parser::ast::{ChildrenNode, ElementNode, PropertiesNode, PropertyNode, SyntaxNode};

/// Renders a syntax tree to HTML against a scope and a set of known
/// component paths.
pub struct TemplateEvaluator {
    expression: ExpressionEvaluator,
    components: Arc<HashSet<PathBuf>>,
    importer: Importer,
}

impl TemplateEvaluator {
    pub fn new(
        scope: Arc<Scope>,
        components: Arc<HashSet<PathBuf>>,
        importer: Importer,
    ) -> TemplateEvaluator {
        TemplateEvaluator {
            expression: ExpressionEvaluator::new(scope),
            components,
            importer,
        }
    }

    /// Recursion is boxed: a component's tree is evaluated through a fresh
    /// evaluator inside this future.
    pub fn evaluate<'a>(&'a self, node: &'a SyntaxNode) -> BoxFuture<'a, Result<String>> {
        async move {
            match node {
                SyntaxNode::Element(element) => self.evaluate_element(element).await,

                SyntaxNode::Children(children) => self.evaluate_children(children).await,

                SyntaxNode::Text(text) => Ok(text.text.clone()),

                SyntaxNode::Context(context) => {
                    Ok(self.expression.evaluate_context(context)?.to_string())
                }

                SyntaxNode::IfStatement(statement) => {
                    // the condition runs in a block scope so its
                    // assignments cannot leak into the children
                    let condition = self
                        .expression
                        .scoped()
                        .evaluate_context(&statement.condition)?;

                    if !condition.is_truthy() {
                        return Ok(String::new());
                    }

                    self.evaluate_children(&statement.children).await
                }

                other => Err(Error::Unevaluatable {
                    node: other.kind_name(),
                }),
            }
        }
        .boxed()
    }

    /// Launches every child's evaluation before awaiting any of them, then
    /// joins the results in source order.
    async fn evaluate_children(&self, children: &ChildrenNode) -> Result<String> {
        let parts = try_join_all(children.nodes.iter().map(|node| self.evaluate(node))).await?;

        Ok(parts.concat())
    }

    async fn evaluate_element(&self, element: &ElementNode) -> Result<String> {
        if let Some(component) = self.resolve_component(&element.name) {
            let tree = self.importer.import(&component).await?;

            let record = self.expression.evaluate_properties(&element.properties)?;
            let evaluator = self.for_component(Scope::with_values(record));

            // a component swallows the call site's children
            return evaluator.evaluate(&tree).await;
        }

        let body = match &element.children {
            Some(children) => {
                let content = self.evaluate_children(children).await?;
                format!(">{content}</{}>", element.name)
            }
            None => "/>".to_string(),
        };

        let properties = self.render_properties(&element.properties)?;
        let properties = if properties.is_empty() {
            properties
        } else {
            format!(" {properties}")
        };

        Ok(format!("<{}{properties}{body}", element.name))
    }

    /// An element names a component when its resolved path under the
    /// `components` root was preloaded.
    fn resolve_component(&self, name: &str) -> Option<PathBuf> {
        let path = self
            .importer
            .relative_to("components")
            .resolve_path(Path::new(name));

        self.components.contains(&path).then_some(path)
    }

    /// Component scopes are unchained: the component sees exactly its
    /// evaluated property bindings and nothing of the caller's scope.
    fn for_component(&self, scope: Arc<Scope>) -> TemplateEvaluator {
        TemplateEvaluator {
            expression: ExpressionEvaluator::new(scope),
            components: Arc::clone(&self.components),
            importer: self.importer.clone(),
        }
    }

    fn render_properties(&self, node: &PropertiesNode) -> Result<String> {
        let mut parts = Vec::with_capacity(node.nodes.len());

        for property in &node.nodes {
            let rendered = self.render_property(property)?;
            if !rendered.is_empty() {
                parts.push(rendered);
            }
        }

        Ok(parts.join(" "))
    }

    fn render_property(&self, property: &PropertyNode) -> Result<String> {
        let name = &property.name;

        match property.value.as_deref() {
            None => Ok(name.clone()),

            Some(SyntaxNode::StringLiteral(literal)) => {
                Ok(format!("{name}=\"{}\"", literal.value))
            }

            Some(node @ SyntaxNode::Context(_)) => {
                match self.expression.evaluate(node)? {
                    Value::String(value) => Ok(format!("{name}=\"{value}\"")),
                    Value::Bool(true) => Ok(name.clone()),
                    Value::Bool(false) => Ok(String::new()),
                    value @ Value::Number(_) => Ok(format!("{name}={value}")),
                    // the only swallowed evaluation error: a sentinel
                    // instead of failing the whole render
                    _ => Ok(format!("{name}=\"Invalid Value Error\"")),
                }
            }

            Some(other) => Err(Error::Unevaluatable {
                node: other.kind_name(),
            }),
        }
    }
}
