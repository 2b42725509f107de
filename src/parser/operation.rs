//! Hand-written expression parsing and binary operation rebalancing.
//!
//! Expressions cannot be parsed by the declarative patterns alone: a binary
//! operation needs the already-parsed left operand as input, and the flat
//! left-to-right parse builds right-leaning trees that ignore precedence.
//! This module parses an atom, folds a trailing operator into an operation
//! node, and then rotates the tree until every parent out-prioritizes its
//! right child.

use crate::error::{Error, Result};
use crate::lexer::token::{Token, TokenKind};
use crate::parser::ast::{BinaryOperationNode, BinaryOperator, GroupNode, NodeKind, SyntaxNode};
use crate::parser::grammar::parse_node;

/// Parse a full expression at the start of `tokens`, operators included.
pub(crate) fn parse_expression(tokens: &[Token]) -> Result<Option<SyntaxNode>> {
    let Some(atom) = parse_atom(tokens)? else {
        return Ok(None);
    };

    parse_operation(tokens, atom).map(Some)
}

/// Parse a single operand: a literal, an identifier, or a bracketed group.
fn parse_atom(tokens: &[Token]) -> Result<Option<SyntaxNode>> {
    for kind in [
        NodeKind::Identifier,
        NodeKind::NullLiteral,
        NodeKind::BoolLiteral,
        NodeKind::NumberLiteral,
    ] {
        if let Some(node) = parse_node(kind, tokens)? {
            return Ok(Some(node));
        }
    }

    parse_group(tokens)
}

/// Parse `{expr}` or `(expr)` into a group node covering the delimiters.
fn parse_group(tokens: &[Token]) -> Result<Option<SyntaxNode>> {
    let close = match tokens.first().map(|token| token.kind) {
        Some(TokenKind::OpenBraces) => TokenKind::CloseBraces,
        Some(TokenKind::OpenParens) => TokenKind::CloseParens,
        _ => return Ok(None),
    };

    let Some(inner) = parse_expression(&tokens[1..])? else {
        return Ok(None);
    };

    match tokens.get(1 + inner.len()) {
        Some(token) if token.kind == close => Ok(Some(SyntaxNode::Group(GroupNode {
            length: inner.len() + 2,
            inner: Box::new(inner),
        }))),
        _ => Ok(None),
    }
}

/// Fold the operator trailing `previous` (if any) into a binary operation.
///
/// The right operand is parsed as a full expression, so a chain of operators
/// first comes out as a right-leaning tree. `balance` then rotates it into
/// precedence order.
fn parse_operation(tokens: &[Token], previous: SyntaxNode) -> Result<SyntaxNode> {
    let Some(operator) = tokens.get(previous.len()).and_then(operator_of) else {
        return Ok(previous);
    };

    let rest = &tokens[previous.len() + 1..];
    let Some(right) = parse_expression(rest)? else {
        return Err(Error::RequiredNoMatch {
            pattern: format!("operand after '{}'", operator.symbol()),
        });
    };

    let operation = BinaryOperationNode {
        length: previous.len() + 1 + right.len(),
        operator,
        left: Box::new(previous),
        right: Box::new(right),
    };

    Ok(SyntaxNode::BinaryOperation(balance(operation)))
}

fn operator_of(token: &Token) -> Option<BinaryOperator> {
    match token.kind {
        TokenKind::Dot => Some(BinaryOperator::Dot),
        TokenKind::Plus => Some(BinaryOperator::Add),
        TokenKind::ExprEquals => Some(BinaryOperator::Equals),
        TokenKind::ExprNotEquals => Some(BinaryOperator::NotEquals),
        TokenKind::Assign => Some(BinaryOperator::Assign),
        _ => None,
    }
}

/// Rotate `parent` left while its right child is an operation of strictly
/// lower priority, so the lower-priority operator ends up on top.
///
/// `a . b + c` parses as `a . (b + c)`; one rotation turns it into
/// `(a . b) + c`. The rotated-out left side can itself now be unbalanced, so
/// the new left child is rebalanced before re-checking the parent.
fn balance(parent: BinaryOperationNode) -> BinaryOperationNode {
    match *parent.right {
        SyntaxNode::BinaryOperation(right)
            if right.operator.priority() < parent.operator.priority() =>
        {
            let left = balance(BinaryOperationNode {
                length: parent.left.len() + 1 + right.left.len(),
                operator: parent.operator,
                left: parent.left,
                right: right.left,
            });

            balance(BinaryOperationNode {
                length: left.length + 1 + right.right.len(),
                operator: right.operator,
                left: Box::new(SyntaxNode::BinaryOperation(left)),
                right: right.right,
            })
        }
        right => BinaryOperationNode {
            right: Box::new(right),
            ..parent
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::expression::tokenize_expression;

    fn expression(source: &str) -> SyntaxNode {
        let tokens = tokenize_expression(source);
        parse_expression(&tokens)
            .expect("parse failed")
            .expect("no expression")
    }

    fn operation(node: &SyntaxNode) -> &BinaryOperationNode {
        match node {
            SyntaxNode::BinaryOperation(operation) => operation,
            other => panic!("expected operation, got {}", other.kind_name()),
        }
    }

    fn identifier_name(node: &SyntaxNode) -> &str {
        match node {
            SyntaxNode::Identifier(identifier) => &identifier.name,
            other => panic!("expected identifier, got {}", other.kind_name()),
        }
    }

    #[test]
    fn lone_atom_has_no_operation() {
        assert!(matches!(expression("visible"), SyntaxNode::Identifier(_)));
        assert!(matches!(expression("null"), SyntaxNode::NullLiteral(_)));
    }

    #[test]
    fn single_operation_parses_flat() {
        let node = expression("a + b");
        let root = operation(&node);

        assert_eq!(root.operator, BinaryOperator::Add);
        assert_eq!(identifier_name(&root.left), "a");
        assert_eq!(identifier_name(&root.right), "b");
        assert_eq!(root.length, 3);
    }

    #[test]
    fn dot_rotates_out_from_under_add() {
        // a.b + c first parses as a.(b + c), balance flips it
        let node = expression("a.b + c");
        let root = operation(&node);

        assert_eq!(root.operator, BinaryOperator::Add);
        assert_eq!(identifier_name(&root.right), "c");

        let left = operation(&root.left);
        assert_eq!(left.operator, BinaryOperator::Dot);
        assert_eq!(identifier_name(&left.left), "a");
        assert_eq!(identifier_name(&left.right), "b");
        assert_eq!(root.length, 5);
    }

    #[test]
    fn higher_priority_right_stays_put() {
        let node = expression("a + b.c");
        let root = operation(&node);

        assert_eq!(root.operator, BinaryOperator::Add);
        assert_eq!(identifier_name(&root.left), "a");
        assert_eq!(operation(&root.right).operator, BinaryOperator::Dot);
    }

    #[test]
    fn equal_priority_chain_stays_right_leaning() {
        // rotation needs a strictly lower priority on the right, so a dot
        // chain keeps its token-order shape: a.(b.c)
        let node = expression("a.b.c");
        let root = operation(&node);

        assert_eq!(root.operator, BinaryOperator::Dot);
        assert_eq!(identifier_name(&root.left), "a");

        let right = operation(&root.right);
        assert_eq!(right.operator, BinaryOperator::Dot);
        assert_eq!(identifier_name(&right.left), "b");
        assert_eq!(identifier_name(&right.right), "c");
        assert_eq!(root.length, 5);
    }

    #[test]
    fn assign_keeps_full_right_expression() {
        let node = expression("total = a + b");
        let root = operation(&node);

        assert_eq!(root.operator, BinaryOperator::Assign);
        assert_eq!(identifier_name(&root.left), "total");
        assert_eq!(operation(&root.right).operator, BinaryOperator::Add);
    }

    #[test]
    fn comparison_against_member_access() {
        let node = expression("user.name == expected");
        let root = operation(&node);

        assert_eq!(root.operator, BinaryOperator::Equals);
        assert_eq!(operation(&root.left).operator, BinaryOperator::Dot);
        assert_eq!(identifier_name(&root.right), "expected");
    }

    #[test]
    fn group_resets_precedence() {
        let node = expression("{a + b}.c");
        let root = operation(&node);

        assert_eq!(root.operator, BinaryOperator::Dot);
        assert!(matches!(root.left.as_ref(), SyntaxNode::Group(_)));
        assert_eq!(root.length, 7);
    }

    #[test]
    fn trailing_operator_without_operand_is_fatal() {
        let tokens = tokenize_expression("a +");
        assert!(matches!(
            parse_expression(&tokens),
            Err(Error::RequiredNoMatch { .. })
        ));
    }
}
