//! Grammar rules and the node-kind registry.
//!
//! Every node kind resolves to either a declarative pattern plus a builder
//! that assembles the node from the pattern's named captures, or to a
//! hand-written parser (expressions and binary operations, which need tree
//! surgery the algebra cannot express). `parse_node` is the single dispatch
//! point the engine's `Node` pattern delegates to.

use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::lexer::token::{Token, TokenKind};
use crate::parser::ast::{
    BoolLiteralNode, ChildrenNode, ContextNode, ElementNode, IdentifierNode, IfStatementNode,
    NodeKind, NullLiteralNode, NumberLiteralNode, PropertiesNode, PropertyNode, StringLiteralNode,
    SyntaxNode, TextNode,
};
use crate::parser::operation;
use crate::parser::pattern::{token_text, unquote, Match, MatchOut, MatchValue, Pattern};

/// Parse a token stream into its root children node.
pub fn parse(tokens: &[Token]) -> Result<SyntaxNode> {
    match parse_node(NodeKind::Children, tokens)? {
        Some(node) => Ok(node),
        None => Ok(SyntaxNode::Children(ChildrenNode {
            nodes: Vec::new(),
            length: 0,
        })),
    }
}

/// Dispatch to the registered parser for `kind`.
pub(crate) fn parse_node(kind: NodeKind, tokens: &[Token]) -> Result<Option<SyntaxNode>> {
    if kind == NodeKind::Expression {
        return operation::parse_expression(tokens);
    }

    let mut out = MatchOut::new();
    match pattern_of(kind).match_at(tokens, &mut out)? {
        None => Ok(None),
        Some(m) => build_node(kind, m.length, out).map(Some),
    }
}

static ELEMENT: Lazy<Pattern> = Lazy::new(|| {
    Pattern::seq(vec![
        Pattern::token(TokenKind::ArrowLeft),
        Pattern::token(TokenKind::HtmlIdentifier)
            .transform(token_text)
            .named("identifier"),
        Pattern::node(NodeKind::Properties).named("properties").opt(),
        Pattern::or(vec![
            Pattern::seq(vec![
                Pattern::token(TokenKind::ArrowRight),
                Pattern::node(NodeKind::Children).named("children"),
                Pattern::seq(vec![
                    Pattern::token(TokenKind::TagCloseLeft),
                    Pattern::token(TokenKind::HtmlIdentifier).assert(close_matches_open),
                    Pattern::token(TokenKind::ArrowRight),
                ]),
            ]),
            Pattern::token(TokenKind::TagCloseRight),
        ])
        .required(),
    ])
});

static CHILDREN: Lazy<Pattern> = Lazy::new(|| {
    Pattern::or(vec![
        Pattern::node(NodeKind::Element),
        Pattern::node(NodeKind::Text),
        Pattern::node(NodeKind::Context),
        Pattern::node(NodeKind::IfStatement),
    ])
    .many()
    .named("nodes")
});

static TEXT: Lazy<Pattern> = Lazy::new(|| {
    Pattern::token(TokenKind::HtmlText)
        .transform(token_text)
        .named("text")
});

static PROPERTIES: Lazy<Pattern> =
    Lazy::new(|| Pattern::node(NodeKind::Property).many().named("nodes"));

static PROPERTY: Lazy<Pattern> = Lazy::new(|| {
    Pattern::seq(vec![
        Pattern::token(TokenKind::HtmlIdentifier)
            .transform(token_text)
            .named("name"),
        Pattern::seq(vec![
            Pattern::token(TokenKind::Assign),
            Pattern::or(vec![
                Pattern::node(NodeKind::StringLiteral),
                Pattern::node(NodeKind::Context),
            ])
            .required()
            .named("value"),
        ])
        .opt(),
    ])
});

static STRING_LITERAL: Lazy<Pattern> = Lazy::new(|| {
    Pattern::token(TokenKind::HtmlString)
        .transform(token_text)
        .transform(unquote)
        .named("value")
});

static IF_STATEMENT: Lazy<Pattern> = Lazy::new(|| {
    Pattern::seq(vec![
        Pattern::token_text(TokenKind::Keyword, "@if"),
        Pattern::node(NodeKind::Context).named("condition"),
        Pattern::node(NodeKind::Children).named("children"),
        Pattern::token_text(TokenKind::Keyword, "@end").required(),
    ])
});

static CONTEXT: Lazy<Pattern> = Lazy::new(|| {
    Pattern::seq(vec![
        Pattern::token(TokenKind::OpenContext),
        Pattern::node(NodeKind::Expression).many().named("nodes"),
        Pattern::token(TokenKind::CloseContext),
    ])
});

static IDENTIFIER: Lazy<Pattern> = Lazy::new(|| {
    Pattern::token(TokenKind::ExprIdentifier)
        .transform(token_text)
        .named("name")
});

static NULL_LITERAL: Lazy<Pattern> = Lazy::new(|| Pattern::token(TokenKind::ExprNull));

static BOOL_LITERAL: Lazy<Pattern> = Lazy::new(|| {
    Pattern::token(TokenKind::ExprBool)
        .transform(token_text)
        .named("value")
});

static NUMBER_LITERAL: Lazy<Pattern> = Lazy::new(|| {
    Pattern::token(TokenKind::ExprNumber)
        .transform(token_text)
        .named("value")
});

fn pattern_of(kind: NodeKind) -> &'static Pattern {
    match kind {
        NodeKind::Element => &ELEMENT,
        NodeKind::Children => &CHILDREN,
        NodeKind::Text => &TEXT,
        NodeKind::Properties => &PROPERTIES,
        NodeKind::Property => &PROPERTY,
        NodeKind::StringLiteral => &STRING_LITERAL,
        NodeKind::IfStatement => &IF_STATEMENT,
        NodeKind::Context => &CONTEXT,
        NodeKind::Identifier => &IDENTIFIER,
        NodeKind::NullLiteral => &NULL_LITERAL,
        NodeKind::BoolLiteral => &BOOL_LITERAL,
        NodeKind::NumberLiteral => &NUMBER_LITERAL,
        NodeKind::Expression => unreachable!("expression parsing is hand-written"),
    }
}

/// Verifies an element's closing tag identifier against the opening one
/// captured earlier in the same sequence.
fn close_matches_open(m: &Match, out: &MatchOut) -> Result<()> {
    let Some(token) = m.value.as_token() else {
        return Ok(());
    };
    let Some(MatchValue::Text(open)) = out.get("identifier") else {
        return Ok(());
    };

    if *open != token.text {
        return Err(Error::TagMismatch {
            open: open.clone(),
            close: token.text.clone(),
        });
    }

    Ok(())
}

/// Assemble a node of `kind` from its pattern's captures.
fn build_node(kind: NodeKind, length: usize, mut out: MatchOut) -> Result<SyntaxNode> {
    let node = match kind {
        NodeKind::Element => {
            let name = take_text(&mut out, "identifier", "element")?;
            let properties = match out.take("properties").and_then(MatchValue::into_node) {
                Some(SyntaxNode::Properties(properties)) => properties,
                _ => PropertiesNode::empty(),
            };
            let children = match out.take("children").and_then(MatchValue::into_node) {
                Some(SyntaxNode::Children(children)) => Some(children),
                _ => None,
            };

            SyntaxNode::Element(ElementNode {
                name,
                properties,
                children,
                length,
            })
        }

        NodeKind::Children => SyntaxNode::Children(ChildrenNode {
            nodes: take_nodes(&mut out, "nodes"),
            length,
        }),

        NodeKind::Text => SyntaxNode::Text(TextNode {
            text: take_text(&mut out, "text", "text")?,
            length,
        }),

        NodeKind::Properties => {
            let nodes = take_nodes(&mut out, "nodes")
                .into_iter()
                .filter_map(|node| match node {
                    SyntaxNode::Property(property) => Some(property),
                    _ => None,
                })
                .collect();

            SyntaxNode::Properties(PropertiesNode { nodes, length })
        }

        NodeKind::Property => SyntaxNode::Property(PropertyNode {
            name: take_text(&mut out, "name", "property")?,
            value: out
                .take("value")
                .and_then(MatchValue::into_node)
                .map(Box::new),
            length,
        }),

        NodeKind::StringLiteral => SyntaxNode::StringLiteral(StringLiteralNode {
            value: take_text(&mut out, "value", "string literal")?,
            length,
        }),

        NodeKind::IfStatement => {
            let condition = match out.take("condition").and_then(MatchValue::into_node) {
                Some(SyntaxNode::Context(context)) => context,
                _ => return Err(Error::MalformedMatch { node: "if statement" }),
            };
            let children = match out.take("children").and_then(MatchValue::into_node) {
                Some(SyntaxNode::Children(children)) => children,
                _ => return Err(Error::MalformedMatch { node: "if statement" }),
            };

            SyntaxNode::IfStatement(IfStatementNode {
                condition,
                children,
                length,
            })
        }

        NodeKind::Context => SyntaxNode::Context(ContextNode {
            nodes: take_nodes(&mut out, "nodes"),
            length,
        }),

        NodeKind::Identifier => SyntaxNode::Identifier(IdentifierNode {
            name: take_text(&mut out, "name", "identifier")?,
            length,
        }),

        NodeKind::NullLiteral => SyntaxNode::NullLiteral(NullLiteralNode { length }),

        NodeKind::BoolLiteral => SyntaxNode::BoolLiteral(BoolLiteralNode {
            value: take_text(&mut out, "value", "bool literal")? == "true",
            length,
        }),

        NodeKind::NumberLiteral => {
            let text = take_text(&mut out, "value", "number literal")?;
            let value = text
                .parse()
                .map_err(|_| Error::MalformedMatch { node: "number literal" })?;

            SyntaxNode::NumberLiteral(NumberLiteralNode { value, length })
        }

        NodeKind::Expression => return Err(Error::MalformedMatch { node: "expression" }),
    };

    Ok(node)
}

fn take_text(out: &mut MatchOut, name: &str, node: &'static str) -> Result<String> {
    out.take(name)
        .and_then(MatchValue::into_text)
        .ok_or(Error::MalformedMatch { node })
}

fn take_nodes(out: &mut MatchOut, name: &str) -> Vec<SyntaxNode> {
    out.take(name)
        .and_then(MatchValue::into_list)
        .unwrap_or_default()
        .into_iter()
        .filter_map(MatchValue::into_node)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::ast::BinaryOperator;

    fn parse_source(source: &str) -> SyntaxNode {
        let tokens = tokenize(source).expect("tokenize failed");
        parse(&tokens).expect("parse failed")
    }

    fn root_nodes(node: SyntaxNode) -> Vec<SyntaxNode> {
        match node {
            SyntaxNode::Children(children) => children.nodes,
            other => panic!("expected children root, got {}", other.kind_name()),
        }
    }

    #[test]
    fn self_closing_element_has_no_children_and_empty_properties() {
        let nodes = root_nodes(parse_source("<br/>"));
        assert_eq!(nodes.len(), 1);

        match &nodes[0] {
            SyntaxNode::Element(element) => {
                assert_eq!(element.name, "br");
                assert!(element.properties.nodes.is_empty());
                assert!(element.children.is_none());
                assert_eq!(element.length, 3);
            }
            other => panic!("expected element, got {}", other.kind_name()),
        }
    }

    #[test]
    fn open_close_element_keeps_children() {
        let nodes = root_nodes(parse_source("<p>hi</p>"));

        match &nodes[0] {
            SyntaxNode::Element(element) => {
                let children = element.children.as_ref().expect("children");
                assert_eq!(children.nodes.len(), 1);
                assert!(matches!(&children.nodes[0], SyntaxNode::Text(t) if t.text == "hi"));
            }
            other => panic!("expected element, got {}", other.kind_name()),
        }
    }

    #[test]
    fn mismatched_close_tag_is_fatal() {
        let tokens = tokenize("<a>text</b>").unwrap();
        assert!(matches!(
            parse(&tokens),
            Err(Error::TagMismatch { open, close }) if open == "a" && close == "b"
        ));
    }

    #[test]
    fn missing_close_tag_is_fatal() {
        let tokens = tokenize("<a>text").unwrap();
        assert!(matches!(parse(&tokens), Err(Error::RequiredNoMatch { .. })));
    }

    #[test]
    fn missing_end_keyword_is_fatal() {
        let tokens = tokenize("@if (x)<p/>").unwrap();
        assert!(matches!(parse(&tokens), Err(Error::RequiredNoMatch { .. })));
    }

    #[test]
    fn property_forms() {
        let nodes = root_nodes(parse_source("<a bare text=\"t\" bound={x}/>"));

        let SyntaxNode::Element(element) = &nodes[0] else {
            panic!("expected element");
        };
        let properties = &element.properties.nodes;
        assert_eq!(properties.len(), 3);

        assert_eq!(properties[0].name, "bare");
        assert!(properties[0].value.is_none());

        assert_eq!(properties[1].name, "text");
        assert!(matches!(
            properties[1].value.as_deref(),
            Some(SyntaxNode::StringLiteral(s)) if s.value == "t"
        ));

        assert_eq!(properties[2].name, "bound");
        assert!(matches!(
            properties[2].value.as_deref(),
            Some(SyntaxNode::Context(_))
        ));
    }

    #[test]
    fn if_statement_wraps_condition_and_children() {
        let nodes = root_nodes(parse_source("@if (visible)<p/>@end "));

        match &nodes[0] {
            SyntaxNode::IfStatement(statement) => {
                assert_eq!(statement.condition.nodes.len(), 1);
                assert_eq!(statement.children.nodes.len(), 1);
            }
            other => panic!("expected if statement, got {}", other.kind_name()),
        }
    }

    #[test]
    fn context_evaluates_expressions_in_order() {
        let nodes = root_nodes(parse_source("{a b}<i/>"));

        match &nodes[0] {
            SyntaxNode::Context(context) => {
                assert_eq!(context.nodes.len(), 2);
            }
            other => panic!("expected context, got {}", other.kind_name()),
        }
    }

    #[test]
    fn dot_binds_tighter_than_add() {
        let nodes = root_nodes(parse_source("{a + b.c}<i/>"));

        let SyntaxNode::Context(context) = &nodes[0] else {
            panic!("expected context");
        };
        let SyntaxNode::BinaryOperation(root) = &context.nodes[0] else {
            panic!("expected binary operation");
        };

        assert_eq!(root.operator, BinaryOperator::Add);
        assert!(matches!(root.left.as_ref(), SyntaxNode::Identifier(i) if i.name == "a"));

        let SyntaxNode::BinaryOperation(right) = root.right.as_ref() else {
            panic!("expected dot on the right");
        };
        assert_eq!(right.operator, BinaryOperator::Dot);
        assert_eq!(root.length, 5);
    }

    #[test]
    fn literal_expressions_parse() {
        let nodes = root_nodes(parse_source("{null}{true}{42}<i/>"));

        assert!(matches!(
            &nodes[0],
            SyntaxNode::Context(c) if matches!(c.nodes[0], SyntaxNode::NullLiteral(_))
        ));
        assert!(matches!(
            &nodes[1],
            SyntaxNode::Context(c) if matches!(&c.nodes[0], SyntaxNode::BoolLiteral(b) if b.value)
        ));
        assert!(matches!(
            &nodes[2],
            SyntaxNode::Context(c) if matches!(&c.nodes[0], SyntaxNode::NumberLiteral(n) if n.value == 42.0)
        ));
    }

    #[test]
    fn braced_group_inside_keyword_parens() {
        let nodes = root_nodes(parse_source("@if ({true})<p/>@end "));

        let SyntaxNode::IfStatement(statement) = &nodes[0] else {
            panic!("expected if statement");
        };
        assert!(matches!(
            &statement.condition.nodes[0],
            SyntaxNode::Group(g) if matches!(g.inner.as_ref(), SyntaxNode::BoolLiteral(_))
        ));
    }

    #[test]
    fn empty_input_parses_to_empty_children() {
        let nodes = root_nodes(parse_source(""));
        assert!(nodes.is_empty());
    }
}
