//! Error taxonomy.
//!
//! Two disjoint channels: [`SyntaxError`] from the scanner and parser,
//! [`RuntimeError`] from the executor. Both serialize as
//! `{ "type": <tag>, "context": {...}, "location": {...} }`; consumers branch on
//! `type` and interpolate `context` into localized messages. The `Display`
//! output is the English default.

use crate::ast::NodeKind;
use crate::Location;
use serde::Serialize;
use thiserror::Error;

// ══════════════════════════════════════════════════════════════════════════════
// Syntax errors
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "type", content = "context", rename_all_fields = "camelCase")]
pub enum SyntaxErrorKind {
    // ── Scanner ──
    #[error("Unknown character '{character}'")]
    UnknownCharacter { character: String },
    #[error("Missing closing double quote for string {string}")]
    MissingDoubleQuoteToTerminateString { string: String },
    #[error("Invalid escape sequence '{sequence}'")]
    InvalidEscapeSequence { sequence: String },
    #[error("Block comment is missing its closing '*/'")]
    MissingCommentTerminator,
    #[error("Invalid number '{lexeme}'")]
    InvalidNumericLiteral { lexeme: String },

    // ── Parser ──
    #[error("'{token}' is not supported yet")]
    UnimplementedToken { token: String },
    #[error("Expected an expression, found '{found}'")]
    MissingExpression { found: String },
    #[error("Missing ')' after expression")]
    MissingRightParenthesisAfterExpression,
    #[error("Missing '(' after '{keyword}'")]
    MissingLeftParenthesisAfterKeyword { keyword: String },
    #[error("Missing ')' after the '{keyword}' condition")]
    MissingRightParenthesisAfterCondition { keyword: String },
    #[error("Missing ')' after function arguments")]
    MissingRightParenthesisAfterArguments,
    #[error("Missing ')' after function parameters")]
    MissingRightParenthesisAfterParameters,
    #[error("Missing ']' at the end of the list")]
    MissingRightBracketInList,
    #[error("Missing ']' after index")]
    MissingRightBracketAfterIndex,
    #[error("Missing '{{' before the body of function '{name}'")]
    MissingLeftBraceBeforeFunctionBody { name: String },
    #[error("Missing '}}' to close the block")]
    MissingRightBraceToTerminateBlock,
    #[error("Missing ';', found '{found}'")]
    MissingSemicolon { found: String },
    #[error("Missing variable name after '{keyword}'")]
    MissingVariableName { keyword: String },
    #[error("Missing function name after 'function'")]
    MissingFunctionName,
    #[error("Missing parameter name in function '{function}'")]
    MissingParameterName { function: String },
    #[error("Parameter '{parameter}' appears twice in function '{function}'")]
    DuplicateParameterName { function: String, parameter: String },
    #[error("Missing property name after '.'")]
    MissingPropertyName,
    #[error("Constant '{name}' must be given a value")]
    MissingInitializerInConstDeclaration { name: String },
    #[error("Only variables and list elements can be assigned to")]
    InvalidAssignmentTarget,
    #[error("'return' can only be used inside a function")]
    ReturnOutsideFunction,
    #[error("'break' can only be used inside a loop")]
    BreakOutsideLoop,
    #[error("'continue' can only be used inside a loop")]
    ContinueOutsideLoop,
    #[error("Code is nested more than {max} levels deep")]
    MaximumNestingDepthExceeded { max: usize },
    #[error("{node} is not allowed here")]
    NodeNotAllowed { node: NodeKind },
}

/// A located scanning or parsing failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{kind}")]
pub struct SyntaxError {
    #[serde(flatten)]
    pub kind: SyntaxErrorKind,
    pub location: Location,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, location: Location) -> Self {
        Self { kind, location }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Runtime errors
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "type", content = "context", rename_all_fields = "camelCase")]
pub enum RuntimeErrorKind {
    // ── Scope ──
    #[error("Variable '{name}' has not been declared")]
    VariableNotDeclared { name: String },
    #[error("Variable '{name}' has already been declared")]
    VariableAlreadyDeclared { name: String },
    #[error("Variable '{name}' already exists in an outer scope")]
    ShadowingDisabled { name: String },
    #[error("Constant '{name}' cannot be changed")]
    ConstantReassignment { name: String },

    // ── Operators ──
    #[error("'{operator}' expects {expected}, but got {found}")]
    TypeError {
        operator: String,
        expected: String,
        found: String,
    },
    #[error("Lists cannot be compared with '{operator}'")]
    ListsCannotBeCompared { operator: String },
    #[error("Expected a boolean, but got {value} ({found})")]
    TruthinessDisabled { value: String, found: String },
    #[error("Cannot use '{operator}' with zero on the right")]
    DivisionByZero { operator: String },

    // ── Lists, strings & members ──
    #[error("Index {index} is out of range for a length of {length}")]
    IndexOutOfRange { index: i64, length: usize },
    #[error("Index {index} is not a whole number")]
    InvalidIndex { index: String },
    #[error("Cannot index into {found}")]
    NotSubscriptable { found: String },
    #[error("{found} has no property '{property}'")]
    PropertyNotFound { property: String, found: String },
    #[error("A list cannot be stored inside itself")]
    CircularList,

    // ── Calls ──
    #[error("'{name}' is {found}, which cannot be called")]
    NotCallable { name: String, found: String },
    #[error("'{name}' expects {expected} arguments, but got {received}")]
    InvalidNumberOfArguments {
        name: String,
        expected: String,
        received: usize,
    },
    #[error("{function}: {message}")]
    LogicError { function: String, message: String },

    // ── Runaway protection ──
    #[error("Loops ran more than {max} times in total")]
    MaxIterationsReached { max: u64 },
    #[error("The program ran for more than {max}ms")]
    MaxTotalExecutionTimeReached { max: u64 },
    #[error("Functions called each other more than {max} levels deep")]
    MaxCallDepthExceeded { max: usize },
}

/// A located execution failure. Becomes the `error` of an ERROR frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{kind}")]
pub struct RuntimeError {
    #[serde(flatten)]
    pub kind: RuntimeErrorKind,
    pub location: Location,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, location: Location) -> Self {
        Self { kind, location }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OffsetRange;

    fn here() -> Location {
        Location::new(2, OffsetRange::new(14, 15), OffsetRange::new(1, 2))
    }

    #[test]
    fn test_syntax_error_json_shape() {
        let err = SyntaxError::new(
            SyntaxErrorKind::UnknownCharacter {
                character: "#".into(),
            },
            here(),
        );
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "UnknownCharacter");
        assert_eq!(json["context"]["character"], "#");
        assert_eq!(json["location"]["line"], 2);
    }

    #[test]
    fn test_unit_variant_has_type_only() {
        let err = SyntaxError::new(SyntaxErrorKind::MissingRightParenthesisAfterExpression, here());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "MissingRightParenthesisAfterExpression");
        assert!(json.get("context").is_none());
    }

    #[test]
    fn test_runtime_error_json_shape() {
        let err = RuntimeError::new(
            RuntimeErrorKind::InvalidNumberOfArguments {
                name: "move".into(),
                expected: "0".into(),
                received: 1,
            },
            here(),
        );
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "InvalidNumberOfArguments");
        assert_eq!(json["context"]["name"], "move");
        assert_eq!(json["context"]["received"], 1);
    }

    #[test]
    fn test_node_not_allowed_context() {
        let err = SyntaxError::new(
            SyntaxErrorKind::NodeNotAllowed {
                node: NodeKind::WhileStatement,
            },
            here(),
        );
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["context"]["node"], "WhileStatement");
        assert_eq!(err.to_string(), "WhileStatement is not allowed here");
    }

    #[test]
    fn test_display_messages() {
        let err = RuntimeError::new(
            RuntimeErrorKind::VariableNotDeclared { name: "y".into() },
            here(),
        );
        assert_eq!(err.to_string(), "Variable 'y' has not been declared");
        let err = RuntimeError::new(
            RuntimeErrorKind::IndexOutOfRange {
                index: 5,
                length: 3,
            },
            here(),
        );
        assert_eq!(err.to_string(), "Index 5 is out of range for a length of 3");
    }

    #[test]
    fn test_error_determinism_100_iterations() {
        let make = || {
            RuntimeError::new(
                RuntimeErrorKind::TypeError {
                    operator: "-".into(),
                    expected: "numbers".into(),
                    found: "a string".into(),
                },
                here(),
            )
        };
        let first = serde_json::to_string(&make()).unwrap();
        for i in 0..100 {
            let json = serde_json::to_string(&make()).unwrap();
            assert_eq!(first, json, "Determinism failure at iteration {i}");
        }
    }
}
