//! Evaluation results: one immutable record per evaluated node.
//!
//! Every `value` field holds a snapshot, so a result describes the program
//! exactly as it was when the node ran.

use jiki_types::ast::{BinaryOperator, LogicalOperator, UnaryOperator};
use serde::Serialize;

use crate::object::RuntimeObject;

/// Outcome of evaluating an expression: the live value for further
/// computation and the frozen result for frames.
#[derive(Debug, Clone)]
pub struct Evaluated {
    pub value: RuntimeObject,
    pub result: EvaluationResult,
}

impl Evaluated {
    pub fn new(value: RuntimeObject, result: EvaluationResult) -> Self {
        Self { value, result }
    }
}

/// Which construct a condition frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionConstruct {
    If,
    While,
    For,
}

impl ConditionConstruct {
    pub fn keyword(self) -> &'static str {
        match self {
            ConditionConstruct::If => "if",
            ConditionConstruct::While => "while",
            ConditionConstruct::For => "for",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum EvaluationResult {
    // ── Expressions ──
    Literal {
        value: RuntimeObject,
    },
    Identifier {
        name: String,
        value: RuntimeObject,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<EvaluationResult>,
        right: Box<EvaluationResult>,
        value: RuntimeObject,
    },
    /// `right` is absent when the left side decided the outcome.
    Logical {
        operator: LogicalOperator,
        left: Box<EvaluationResult>,
        right: Option<Box<EvaluationResult>>,
        value: RuntimeObject,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<EvaluationResult>,
        value: RuntimeObject,
    },
    Grouping {
        inner: Box<EvaluationResult>,
        value: RuntimeObject,
    },
    Call {
        function: String,
        arguments: Vec<EvaluationResult>,
        value: RuntimeObject,
    },
    Member {
        object: Box<EvaluationResult>,
        property: String,
        value: RuntimeObject,
    },
    Subscript {
        object: Box<EvaluationResult>,
        index: Box<EvaluationResult>,
        value: RuntimeObject,
    },
    List {
        elements: Vec<EvaluationResult>,
        value: RuntimeObject,
    },

    // ── Statements ──
    VariableDeclaration {
        name: String,
        constant: bool,
        initializer: Option<Box<EvaluationResult>>,
        value: RuntimeObject,
    },
    Assignment {
        name: String,
        previous: RuntimeObject,
        expression: Box<EvaluationResult>,
        value: RuntimeObject,
    },
    SubscriptAssignment {
        object: Box<EvaluationResult>,
        index: Box<EvaluationResult>,
        expression: Box<EvaluationResult>,
        previous: RuntimeObject,
        value: RuntimeObject,
        /// The whole list after the element was replaced.
        list: RuntimeObject,
    },
    Expression {
        expression: Box<EvaluationResult>,
        value: RuntimeObject,
    },
    FunctionDeclaration {
        name: String,
        parameters: Vec<String>,
    },
    Return {
        expression: Option<Box<EvaluationResult>>,
        value: RuntimeObject,
    },
    Break,
    Continue,
    Condition {
        construct: ConditionConstruct,
        /// Absent for a `for` loop without a condition.
        condition: Option<Box<EvaluationResult>>,
        value: RuntimeObject,
    },
    BlockExit {
        dropped: Vec<String>,
    },
}

impl EvaluationResult {
    /// The value this node produced, if it produces one.
    pub fn value(&self) -> Option<&RuntimeObject> {
        match self {
            EvaluationResult::Literal { value }
            | EvaluationResult::Identifier { value, .. }
            | EvaluationResult::Binary { value, .. }
            | EvaluationResult::Logical { value, .. }
            | EvaluationResult::Unary { value, .. }
            | EvaluationResult::Grouping { value, .. }
            | EvaluationResult::Call { value, .. }
            | EvaluationResult::Member { value, .. }
            | EvaluationResult::Subscript { value, .. }
            | EvaluationResult::List { value, .. }
            | EvaluationResult::VariableDeclaration { value, .. }
            | EvaluationResult::Assignment { value, .. }
            | EvaluationResult::SubscriptAssignment { value, .. }
            | EvaluationResult::Expression { value, .. }
            | EvaluationResult::Return { value, .. }
            | EvaluationResult::Condition { value, .. } => Some(value),
            EvaluationResult::FunctionDeclaration { .. }
            | EvaluationResult::Break
            | EvaluationResult::Continue
            | EvaluationResult::BlockExit { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_tag_and_camel_case() {
        let result = EvaluationResult::Condition {
            construct: ConditionConstruct::While,
            condition: Some(Box::new(EvaluationResult::Literal {
                value: RuntimeObject::Boolean(true),
            })),
            value: RuntimeObject::Boolean(true),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "Condition");
        assert_eq!(json["construct"], "while");
        assert_eq!(json["condition"]["type"], "Literal");
        assert_eq!(json["value"], true);
    }

    #[test]
    fn test_binary_operator_symbol_in_json() {
        let result = EvaluationResult::Binary {
            operator: BinaryOperator::Add,
            left: Box::new(EvaluationResult::Literal {
                value: RuntimeObject::Number(1.0),
            }),
            right: Box::new(EvaluationResult::Literal {
                value: RuntimeObject::Number(2.0),
            }),
            value: RuntimeObject::Number(3.0),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["operator"], "+");
        assert_eq!(json["value"], 3);
    }

    #[test]
    fn test_unit_variant_json() {
        let json = serde_json::to_string(&EvaluationResult::Break).unwrap();
        assert_eq!(json, r#"{"type":"Break"}"#);
    }

    #[test]
    fn test_value_accessor() {
        let result = EvaluationResult::BlockExit {
            dropped: vec!["y".into()],
        };
        assert!(result.value().is_none());
    }
}
