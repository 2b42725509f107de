//! Syntax tree node definitions.
//!
//! Nodes form a closed variant set and own their children exclusively; the
//! tree never shares subtrees. Every node records how many tokens it
//! consumed, which the combinator engine uses to advance its window and the
//! operator rebalancer uses to recompute lengths after rotating subtrees.

/// Discriminants for the parser registry. `Expression` is a dispatch-only
/// kind: its parser yields one of the expression node variants rather than a
/// node of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Children,
    Text,
    Properties,
    Property,
    StringLiteral,
    IfStatement,
    Context,
    Expression,
    Identifier,
    NullLiteral,
    BoolLiteral,
    NumberLiteral,
}

/// Binary operator tags. Subtract, multiply and assign are modeled and
/// evaluated but currently have no grammar production that emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Dot,
    Add,
    Subtract,
    Multiply,
    Equals,
    NotEquals,
    Assign,
}

impl BinaryOperator {
    /// Fixed priority, higher binds tighter.
    pub fn priority(self) -> u32 {
        match self {
            BinaryOperator::Dot => 0x0001_0000,
            BinaryOperator::Multiply => 0x0000_0200,
            BinaryOperator::Add | BinaryOperator::Subtract => 0x0000_0100,
            BinaryOperator::Equals | BinaryOperator::NotEquals | BinaryOperator::Assign => {
                0x0000_0001
            }
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Dot => ".",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Assign => "=",
        }
    }
}

/// An element: tag identifier, properties, optional children. `children` is
/// `None` for self-closing elements; an empty children node means an open
/// and close tag with nothing between them.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub name: String,
    pub properties: PropertiesNode,
    pub children: Option<ChildrenNode>,
    pub length: usize,
}

/// An ordered run of mixed element/text/context/if-statement nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildrenNode {
    pub nodes: Vec<SyntaxNode>,
    pub length: usize,
}

/// A literal markup text run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertiesNode {
    pub nodes: Vec<PropertyNode>,
    pub length: usize,
}

impl PropertiesNode {
    pub fn empty() -> PropertiesNode {
        PropertiesNode {
            nodes: Vec::new(),
            length: 0,
        }
    }
}

/// A property: name plus optional value, where the value is either a string
/// literal or an expression context.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    pub name: String,
    pub value: Option<Box<SyntaxNode>>,
    pub length: usize,
}

/// A quoted string, stored without its quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteralNode {
    pub value: String,
    pub length: usize,
}

/// `@if (<condition>) <children> @end`. There is no else branch.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatementNode {
    pub condition: ContextNode,
    pub children: ChildrenNode,
    pub length: usize,
}

/// A spliced expression region. Expressions evaluate in order and the
/// context's value is the value of the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextNode {
    pub nodes: Vec<SyntaxNode>,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierNode {
    pub name: String,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullLiteralNode {
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoolLiteralNode {
    pub value: bool,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteralNode {
    pub value: f64,
    pub length: usize,
}

/// A bracketed subexpression in expression-token space, `{expr}` or
/// `(expr)`. Exists so the delimiters' two tokens stay accounted for in the
/// consumed length.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub inner: Box<SyntaxNode>,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperationNode {
    pub operator: BinaryOperator,
    pub left: Box<SyntaxNode>,
    pub right: Box<SyntaxNode>,
    pub length: usize,
}

/// The closed set of syntax tree nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    Element(ElementNode),
    Children(ChildrenNode),
    Text(TextNode),
    Properties(PropertiesNode),
    Property(PropertyNode),
    StringLiteral(StringLiteralNode),
    IfStatement(IfStatementNode),
    Context(ContextNode),
    Identifier(IdentifierNode),
    NullLiteral(NullLiteralNode),
    BoolLiteral(BoolLiteralNode),
    NumberLiteral(NumberLiteralNode),
    Group(GroupNode),
    BinaryOperation(BinaryOperationNode),
}

impl SyntaxNode {
    /// Number of tokens this node consumed.
    pub fn len(&self) -> usize {
        match self {
            SyntaxNode::Element(n) => n.length,
            SyntaxNode::Children(n) => n.length,
            SyntaxNode::Text(n) => n.length,
            SyntaxNode::Properties(n) => n.length,
            SyntaxNode::Property(n) => n.length,
            SyntaxNode::StringLiteral(n) => n.length,
            SyntaxNode::IfStatement(n) => n.length,
            SyntaxNode::Context(n) => n.length,
            SyntaxNode::Identifier(n) => n.length,
            SyntaxNode::NullLiteral(n) => n.length,
            SyntaxNode::BoolLiteral(n) => n.length,
            SyntaxNode::NumberLiteral(n) => n.length,
            SyntaxNode::Group(n) => n.length,
            SyntaxNode::BinaryOperation(n) => n.length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SyntaxNode::Element(_) => "element",
            SyntaxNode::Children(_) => "children",
            SyntaxNode::Text(_) => "text",
            SyntaxNode::Properties(_) => "properties",
            SyntaxNode::Property(_) => "property",
            SyntaxNode::StringLiteral(_) => "string literal",
            SyntaxNode::IfStatement(_) => "if statement",
            SyntaxNode::Context(_) => "context",
            SyntaxNode::Identifier(_) => "identifier",
            SyntaxNode::NullLiteral(_) => "null literal",
            SyntaxNode::BoolLiteral(_) => "bool literal",
            SyntaxNode::NumberLiteral(_) => "number literal",
            SyntaxNode::Group(_) => "group",
            SyntaxNode::BinaryOperation(_) => "binary operation",
        }
    }
}
