//! AST node types for the Jiki language.
//!
//! Every node carries a [`Location`] for frames and error reporting.
//! Nodes are immutable once parsed. [`Node`] gives a uniform borrowed view
//! over expressions and statements, used for generic traversal through
//! [`Node::children`].

use crate::Location;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Node kinds
// ══════════════════════════════════════════════════════════════════════════════

/// Tag for every AST node variant.
///
/// Host applications name these in `LanguageFeatures` include/exclude lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    LiteralExpression,
    BinaryExpression,
    LogicalExpression,
    UnaryExpression,
    GroupingExpression,
    IdentifierExpression,
    CallExpression,
    MemberExpression,
    SubscriptExpression,
    ListExpression,
    VariableDeclaration,
    AssignmentStatement,
    ExpressionStatement,
    BlockStatement,
    IfStatement,
    WhileStatement,
    ForStatement,
    FunctionDeclaration,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::LiteralExpression => "LiteralExpression",
            NodeKind::BinaryExpression => "BinaryExpression",
            NodeKind::LogicalExpression => "LogicalExpression",
            NodeKind::UnaryExpression => "UnaryExpression",
            NodeKind::GroupingExpression => "GroupingExpression",
            NodeKind::IdentifierExpression => "IdentifierExpression",
            NodeKind::CallExpression => "CallExpression",
            NodeKind::MemberExpression => "MemberExpression",
            NodeKind::SubscriptExpression => "SubscriptExpression",
            NodeKind::ListExpression => "ListExpression",
            NodeKind::VariableDeclaration => "VariableDeclaration",
            NodeKind::AssignmentStatement => "AssignmentStatement",
            NodeKind::ExpressionStatement => "ExpressionStatement",
            NodeKind::BlockStatement => "BlockStatement",
            NodeKind::IfStatement => "IfStatement",
            NodeKind::WhileStatement => "WhileStatement",
            NodeKind::ForStatement => "ForStatement",
            NodeKind::FunctionDeclaration => "FunctionDeclaration",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::BreakStatement => "BreakStatement",
            NodeKind::ContinueStatement => "ContinueStatement",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers & literals
// ══════════════════════════════════════════════════════════════════════════════

/// A located identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub location: Location,
}

impl Ident {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// A literal value, as carried by tokens and literal expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Modulo,
    #[serde(rename = "**")]
    Power,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "===")]
    StrictEqual,
    #[serde(rename = "!==")]
    StrictNotEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEqual,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "**",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
        }
    }

    /// `==`, `!=`, `===` and `!==`.
    pub fn is_equality(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::StrictEqual
                | BinaryOperator::StrictNotEqual
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => f.write_str("&&"),
            LogicalOperator::Or => f.write_str("||"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "-")]
    Negate,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Not => f.write_str("!"),
            UnaryOperator::Negate => f.write_str("-"),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub location: Location,
}

impl Expression {
    pub fn new(kind: ExpressionKind, location: Location) -> Self {
        Self { kind, location }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    /// `42`, `"hi"`, `true`, `null`
    Literal(LiteralValue),
    /// `a + b`
    Binary {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
    /// `a && b` (short-circuiting)
    Logical {
        left: Box<Expression>,
        operator: LogicalOperator,
        right: Box<Expression>,
    },
    /// `!a`, `-a`
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    /// `(a)`
    Grouping(Box<Expression>),
    /// `name`
    Identifier(String),
    /// `callee(arguments...)`
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// `object.property`
    Member {
        object: Box<Expression>,
        property: Ident,
    },
    /// `object[index]`
    Subscript {
        object: Box<Expression>,
        index: Box<Expression>,
    },
    /// `[a, b, c]`
    List(Vec<Expression>),
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub location: Location,
}

impl Statement {
    pub fn new(kind: StatementKind, location: Location) -> Self {
        Self { kind, location }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `let name = value;` or `const name = value;`
    VariableDeclaration {
        name: Ident,
        constant: bool,
        initializer: Option<Expression>,
    },
    /// `target = value;`
    Assignment {
        target: AssignmentTarget,
        value: Expression,
    },
    /// `expression;`
    Expression(Expression),
    /// `{ statements... }`
    Block(Vec<Statement>),
    /// `if (condition) then_branch [else else_branch]`
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    /// `while (condition) body`
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    /// `for (initializer; condition; update) body`
    For {
        initializer: Option<Box<Statement>>,
        condition: Option<Expression>,
        update: Option<Box<Statement>>,
        body: Box<Statement>,
    },
    /// `function name(parameters) { body }`
    ///
    /// Shared so that runtime callables can hold on to the body.
    FunctionDeclaration(Rc<FunctionDeclaration>),
    /// `return [value];`
    Return(Option<Expression>),
    /// `break;`
    Break,
    /// `continue;`
    Continue,
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentTarget {
    Variable(Ident),
    Subscript { object: Expression, index: Expression },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: Ident,
    pub parameters: Vec<Ident>,
    pub body: Vec<Statement>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Generic traversal
// ══════════════════════════════════════════════════════════════════════════════

/// A borrowed view over any AST node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Expression(&'a Expression),
    Statement(&'a Statement),
}

impl<'a> Node<'a> {
    pub fn location(self) -> Location {
        match self {
            Node::Expression(e) => e.location,
            Node::Statement(s) => s.location,
        }
    }

    pub fn node_kind(self) -> NodeKind {
        match self {
            Node::Expression(e) => e.node_kind(),
            Node::Statement(s) => s.node_kind(),
        }
    }

    pub fn children(self) -> Vec<Node<'a>> {
        match self {
            Node::Expression(e) => e.children(),
            Node::Statement(s) => s.children(),
        }
    }

    /// Visit this node and all of its descendants in pre-order, stopping at
    /// the first error returned by `visitor`.
    pub fn walk<E>(self, visitor: &mut impl FnMut(Node<'a>) -> Result<(), E>) -> Result<(), E> {
        visitor(self)?;
        for child in self.children() {
            child.walk(visitor)?;
        }
        Ok(())
    }
}

impl Expression {
    pub fn node_kind(&self) -> NodeKind {
        match &self.kind {
            ExpressionKind::Literal(_) => NodeKind::LiteralExpression,
            ExpressionKind::Binary { .. } => NodeKind::BinaryExpression,
            ExpressionKind::Logical { .. } => NodeKind::LogicalExpression,
            ExpressionKind::Unary { .. } => NodeKind::UnaryExpression,
            ExpressionKind::Grouping(_) => NodeKind::GroupingExpression,
            ExpressionKind::Identifier(_) => NodeKind::IdentifierExpression,
            ExpressionKind::Call { .. } => NodeKind::CallExpression,
            ExpressionKind::Member { .. } => NodeKind::MemberExpression,
            ExpressionKind::Subscript { .. } => NodeKind::SubscriptExpression,
            ExpressionKind::List(_) => NodeKind::ListExpression,
        }
    }

    pub fn children(&self) -> Vec<Node<'_>> {
        match &self.kind {
            ExpressionKind::Literal(_) | ExpressionKind::Identifier(_) => Vec::new(),
            ExpressionKind::Binary { left, right, .. }
            | ExpressionKind::Logical { left, right, .. } => {
                vec![Node::Expression(left), Node::Expression(right)]
            }
            ExpressionKind::Unary { operand, .. } => vec![Node::Expression(operand)],
            ExpressionKind::Grouping(inner) => vec![Node::Expression(inner)],
            ExpressionKind::Call { callee, arguments } => std::iter::once(Node::Expression(&**callee))
                .chain(arguments.iter().map(Node::Expression))
                .collect(),
            ExpressionKind::Member { object, .. } => vec![Node::Expression(object)],
            ExpressionKind::Subscript { object, index } => {
                vec![Node::Expression(object), Node::Expression(index)]
            }
            ExpressionKind::List(elements) => elements.iter().map(Node::Expression).collect(),
        }
    }
}

impl Statement {
    pub fn node_kind(&self) -> NodeKind {
        match &self.kind {
            StatementKind::VariableDeclaration { .. } => NodeKind::VariableDeclaration,
            StatementKind::Assignment { .. } => NodeKind::AssignmentStatement,
            StatementKind::Expression(_) => NodeKind::ExpressionStatement,
            StatementKind::Block(_) => NodeKind::BlockStatement,
            StatementKind::If { .. } => NodeKind::IfStatement,
            StatementKind::While { .. } => NodeKind::WhileStatement,
            StatementKind::For { .. } => NodeKind::ForStatement,
            StatementKind::FunctionDeclaration(_) => NodeKind::FunctionDeclaration,
            StatementKind::Return(_) => NodeKind::ReturnStatement,
            StatementKind::Break => NodeKind::BreakStatement,
            StatementKind::Continue => NodeKind::ContinueStatement,
        }
    }

    pub fn children(&self) -> Vec<Node<'_>> {
        match &self.kind {
            StatementKind::VariableDeclaration { initializer, .. } => {
                initializer.iter().map(Node::Expression).collect()
            }
            StatementKind::Assignment { target, value } => match target {
                AssignmentTarget::Variable(_) => vec![Node::Expression(value)],
                AssignmentTarget::Subscript { object, index } => vec![
                    Node::Expression(object),
                    Node::Expression(index),
                    Node::Expression(value),
                ],
            },
            StatementKind::Expression(expression) => vec![Node::Expression(expression)],
            StatementKind::Block(statements) => statements.iter().map(Node::Statement).collect(),
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut children = vec![Node::Expression(condition), Node::Statement(then_branch)];
                if let Some(else_branch) = else_branch {
                    children.push(Node::Statement(else_branch));
                }
                children
            }
            StatementKind::While { condition, body } => {
                vec![Node::Expression(condition), Node::Statement(body)]
            }
            StatementKind::For {
                initializer,
                condition,
                update,
                body,
            } => {
                let mut children = Vec::new();
                if let Some(initializer) = initializer {
                    children.push(Node::Statement(initializer));
                }
                if let Some(condition) = condition {
                    children.push(Node::Expression(condition));
                }
                if let Some(update) = update {
                    children.push(Node::Statement(update));
                }
                children.push(Node::Statement(body));
                children
            }
            StatementKind::FunctionDeclaration(function) => {
                function.body.iter().map(Node::Statement).collect()
            }
            StatementKind::Return(value) => value.iter().map(Node::Expression).collect(),
            StatementKind::Break | StatementKind::Continue => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(begin: usize, end: usize) -> Location {
        Location::new(
            1,
            crate::OffsetRange::new(begin, end),
            crate::OffsetRange::new(begin + 1, end + 1),
        )
    }

    fn number(n: f64, begin: usize, end: usize) -> Expression {
        Expression::new(ExpressionKind::Literal(LiteralValue::Number(n)), at(begin, end))
    }

    #[test]
    fn test_binary_children_in_source_order() {
        let expr = Expression::new(
            ExpressionKind::Binary {
                left: Box::new(number(1.0, 0, 1)),
                operator: BinaryOperator::Add,
                right: Box::new(number(2.0, 4, 5)),
            },
            at(0, 5),
        );
        let children = expr.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].location(), at(0, 1));
        assert_eq!(children[1].location(), at(4, 5));
        assert_eq!(expr.node_kind(), NodeKind::BinaryExpression);
    }

    #[test]
    fn test_walk_visits_every_node() {
        let stmt = Statement::new(
            StatementKind::If {
                condition: Expression::new(
                    ExpressionKind::Literal(LiteralValue::Boolean(true)),
                    at(4, 8),
                ),
                then_branch: Box::new(Statement::new(
                    StatementKind::Block(vec![Statement::new(
                        StatementKind::Expression(number(1.0, 12, 13)),
                        at(12, 14),
                    )]),
                    at(10, 16),
                )),
                else_branch: None,
            },
            at(0, 16),
        );
        let mut kinds = Vec::new();
        Node::Statement(&stmt)
            .walk(&mut |node| {
                kinds.push(node.node_kind());
                Ok::<(), ()>(())
            })
            .unwrap();
        assert_eq!(
            kinds,
            vec![
                NodeKind::IfStatement,
                NodeKind::LiteralExpression,
                NodeKind::BlockStatement,
                NodeKind::ExpressionStatement,
                NodeKind::LiteralExpression,
            ]
        );
    }

    #[test]
    fn test_walk_stops_at_first_error() {
        let list = Expression::new(
            ExpressionKind::List(vec![number(1.0, 1, 2), number(2.0, 4, 5)]),
            at(0, 6),
        );
        let mut seen = 0;
        let result = Node::Expression(&list).walk(&mut |node| {
            seen += 1;
            if node.node_kind() == NodeKind::LiteralExpression {
                Err(node.location())
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err(at(1, 2)));
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_node_kind_serde_names() {
        let json = serde_json::to_string(&NodeKind::WhileStatement).unwrap();
        assert_eq!(json, "\"WhileStatement\"");
        let kind: NodeKind = serde_json::from_str("\"ForStatement\"").unwrap();
        assert_eq!(kind, NodeKind::ForStatement);
        assert_eq!(NodeKind::ForStatement.to_string(), "ForStatement");
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(BinaryOperator::Power.to_string(), "**");
        assert_eq!(BinaryOperator::StrictNotEqual.to_string(), "!==");
        assert!(BinaryOperator::StrictEqual.is_equality());
        assert!(!BinaryOperator::Less.is_equality());
        assert_eq!(
            serde_json::to_string(&LogicalOperator::Or).unwrap(),
            "\"||\""
        );
    }
}
