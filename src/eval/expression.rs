//! The synchronous expression interpreter and its scope chain.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{Error, Result};
use crate::eval::value::Value;
use crate::parser::ast::{
    BinaryOperationNode, BinaryOperator, ContextNode, PropertiesNode, SyntaxNode,
};

/// A variable scope, chained to an optional parent.
///
/// Lookups walk the chain outward; assignment always writes into the local
/// map. The map is guarded because sibling subtrees of a children node are
/// evaluated concurrently and may share one scope.
#[derive(Debug, Default)]
pub struct Scope {
    values: Mutex<BTreeMap<String, Value>>,
    parent: Option<Arc<Scope>>,
}

impl Scope {
    pub fn new() -> Arc<Scope> {
        Arc::new(Scope::default())
    }

    pub fn with_values(values: BTreeMap<String, Value>) -> Arc<Scope> {
        Arc::new(Scope {
            values: Mutex::new(values),
            parent: None,
        })
    }

    /// A fresh empty scope whose reads fall through to `self`.
    pub fn child(self: &Arc<Scope>) -> Arc<Scope> {
        Arc::new(Scope {
            values: Mutex::new(BTreeMap::new()),
            parent: Some(Arc::clone(self)),
        })
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.lock().get(name) {
            return Some(value.clone());
        }

        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    pub fn set(&self, name: &str, value: Value) {
        self.lock().insert(name.to_string(), value);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Evaluates expression nodes against a scope.
#[derive(Debug, Clone)]
pub struct ExpressionEvaluator {
    scope: Arc<Scope>,
}

impl ExpressionEvaluator {
    pub fn new(scope: Arc<Scope>) -> ExpressionEvaluator {
        ExpressionEvaluator { scope }
    }

    /// An evaluator over a fresh scope chained to this one's, for blocks
    /// whose assignments must not leak outward.
    pub fn scoped(&self) -> ExpressionEvaluator {
        ExpressionEvaluator {
            scope: self.scope.child(),
        }
    }

    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }

    pub fn evaluate(&self, node: &SyntaxNode) -> Result<Value> {
        match node {
            SyntaxNode::Context(context) => self.evaluate_context(context),

            SyntaxNode::Identifier(identifier) => self
                .scope
                .get(&identifier.name)
                .ok_or_else(|| Error::NotDefined {
                    name: identifier.name.clone(),
                }),

            SyntaxNode::NullLiteral(_) => Ok(Value::Null),
            SyntaxNode::BoolLiteral(literal) => Ok(Value::Bool(literal.value)),
            SyntaxNode::NumberLiteral(literal) => Ok(Value::Number(literal.value)),
            SyntaxNode::StringLiteral(literal) => Ok(Value::String(literal.value.clone())),
            SyntaxNode::Group(group) => self.evaluate(&group.inner),
            SyntaxNode::BinaryOperation(operation) => self.evaluate_operation(operation),

            other => Err(Error::Unevaluatable {
                node: other.kind_name(),
            }),
        }
    }

    /// Evaluates a context's expressions in order; the last one's value is
    /// the context's value. An empty context yields null.
    pub fn evaluate_context(&self, context: &ContextNode) -> Result<Value> {
        let mut value = Value::Null;

        for node in &context.nodes {
            value = self.evaluate(node)?;
        }

        Ok(value)
    }

    /// Evaluates an element's properties into the record that becomes a
    /// component's scope. A property without a value binds null.
    pub fn evaluate_properties(&self, node: &PropertiesNode) -> Result<BTreeMap<String, Value>> {
        let mut record = BTreeMap::new();

        for property in &node.nodes {
            let value = match property.value.as_deref() {
                Some(node) => self.evaluate(node)?,
                None => Value::Null,
            };

            record.insert(property.name.clone(), value);
        }

        Ok(record)
    }

    fn evaluate_operation(&self, node: &BinaryOperationNode) -> Result<Value> {
        match node.operator {
            BinaryOperator::Dot => {
                let record = self.evaluate(&node.left)?;

                let SyntaxNode::Identifier(field) = node.right.as_ref() else {
                    return Err(Error::ExpectedIdentifier {
                        found: node.right.kind_name(),
                    });
                };

                match record {
                    Value::Record(mut fields) => {
                        Ok(fields.remove(&field.name).unwrap_or(Value::Null))
                    }
                    _ => Err(Error::InvalidOperands { operator: "." }),
                }
            }

            BinaryOperator::Assign => {
                let SyntaxNode::Identifier(target) = node.left.as_ref() else {
                    return Err(Error::ExpectedIdentifier {
                        found: node.left.kind_name(),
                    });
                };

                let value = self.evaluate(&node.right)?;
                self.scope.set(&target.name, value.clone());

                Ok(value)
            }

            // equals evaluates as addition, reproducing the original engine
            BinaryOperator::Add | BinaryOperator::Equals => {
                self.add(&node.left, &node.right, node.operator.symbol())
            }

            BinaryOperator::Subtract => {
                let (left, right) = self.numeric_operands(node)?;
                Ok(Value::Number(left - right))
            }

            BinaryOperator::Multiply => {
                let (left, right) = self.numeric_operands(node)?;
                Ok(Value::Number(left * right))
            }

            BinaryOperator::NotEquals => {
                let left = self.evaluate(&node.left)?;
                let right = self.evaluate(&node.right)?;
                Ok(Value::Bool(left != right))
            }
        }
    }

    /// Numeric sum, or string concatenation when either side is a string.
    fn add(&self, left: &SyntaxNode, right: &SyntaxNode, operator: &'static str) -> Result<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match (left, right) {
            (Value::Number(left), Value::Number(right)) => Ok(Value::Number(left + right)),
            (left @ Value::String(_), right) | (left, right @ Value::String(_)) => {
                Ok(Value::String(format!("{left}{right}")))
            }
            _ => Err(Error::InvalidOperands { operator }),
        }
    }

    fn numeric_operands(&self, node: &BinaryOperationNode) -> Result<(f64, f64)> {
        let left = self.evaluate(&node.left)?;
        let right = self.evaluate(&node.right)?;

        match (left, right) {
            (Value::Number(left), Value::Number(right)) => Ok((left, right)),
            _ => Err(Error::InvalidOperands {
                operator: node.operator.symbol(),
            }),
        }
    }
}
