//! Operator semantics on runtime values.
//!
//! Everything here is pure: errors are returned as bare
//! [`RuntimeErrorKind`]s and the executor attaches the location.

use jiki_types::ast::{BinaryOperator, UnaryOperator};
use jiki_types::{LanguageFeatures, RuntimeErrorKind};

use crate::object::RuntimeObject;

/// Arithmetic results are rounded to this many steps per unit.
pub const ROUNDING_SCALE: f64 = 100_000.0;

pub type OpResult = Result<RuntimeObject, RuntimeErrorKind>;

/// Round to five decimal places, so `0.1 + 0.2` is exactly `0.3`.
pub fn round(n: f64) -> f64 {
    let scaled = n * ROUNDING_SCALE;
    if !scaled.is_finite() {
        return n;
    }
    scaled.round() / ROUNDING_SCALE
}

/// Truthiness when booleans are not required.
pub fn is_truthy(value: &RuntimeObject) -> bool {
    match value {
        RuntimeObject::Boolean(b) => *b,
        RuntimeObject::Number(n) => *n != 0.0 && !n.is_nan(),
        RuntimeObject::String(s) => !s.is_empty(),
        RuntimeObject::List(_) | RuntimeObject::Callable(_) => true,
        RuntimeObject::None => false,
    }
}

/// Interpret a value used as a condition or logical operand.
pub fn truthiness(value: &RuntimeObject, features: &LanguageFeatures) -> Result<bool, RuntimeErrorKind> {
    match value {
        RuntimeObject::Boolean(b) => Ok(*b),
        other if features.allow_truthiness => Ok(is_truthy(other)),
        other => Err(RuntimeErrorKind::TruthinessDisabled {
            value: other.to_string(),
            found: other.type_name().to_string(),
        }),
    }
}

/// Numeric view used by type coercion. Unconvertible values become `NaN`.
fn to_number(value: &RuntimeObject) -> f64 {
    match value {
        RuntimeObject::Number(n) => *n,
        RuntimeObject::Boolean(true) => 1.0,
        RuntimeObject::Boolean(false) | RuntimeObject::None => 0.0,
        RuntimeObject::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        RuntimeObject::List(_) | RuntimeObject::Callable(_) => f64::NAN,
    }
}

fn strict_equals(left: &RuntimeObject, right: &RuntimeObject) -> bool {
    left == right
}

fn loose_equals(left: &RuntimeObject, right: &RuntimeObject) -> bool {
    if std::mem::discriminant(left) == std::mem::discriminant(right) {
        return strict_equals(left, right);
    }
    match (left, right) {
        (RuntimeObject::None, _) | (_, RuntimeObject::None) => false,
        (RuntimeObject::List(_) | RuntimeObject::Callable(_), _)
        | (_, RuntimeObject::List(_) | RuntimeObject::Callable(_)) => false,
        _ => to_number(left) == to_number(right),
    }
}

/// Both operands as numbers, coercing when allowed.
fn numbers(
    operator: BinaryOperator,
    left: &RuntimeObject,
    right: &RuntimeObject,
    features: &LanguageFeatures,
) -> Result<(f64, f64), RuntimeErrorKind> {
    match (left, right) {
        (RuntimeObject::Number(a), RuntimeObject::Number(b)) => Ok((*a, *b)),
        _ if features.allow_type_coercion => Ok((to_number(left), to_number(right))),
        _ => Err(type_error(operator.symbol(), "numbers", left, right)),
    }
}

fn type_error(operator: &str, expected: &str, left: &RuntimeObject, right: &RuntimeObject) -> RuntimeErrorKind {
    RuntimeErrorKind::TypeError {
        operator: operator.to_string(),
        expected: expected.to_string(),
        found: format!("{} and {}", left.type_name(), right.type_name()),
    }
}

pub fn binary(
    operator: BinaryOperator,
    left: &RuntimeObject,
    right: &RuntimeObject,
    features: &LanguageFeatures,
) -> OpResult {
    use BinaryOperator as Op;

    if operator.is_equality()
        && matches!(left, RuntimeObject::List(_))
        && matches!(right, RuntimeObject::List(_))
    {
        return Err(RuntimeErrorKind::ListsCannotBeCompared {
            operator: operator.symbol().to_string(),
        });
    }

    let loose = features.allow_type_coercion;
    match operator {
        Op::StrictEqual => Ok(strict_equals(left, right).into()),
        Op::StrictNotEqual => Ok((!strict_equals(left, right)).into()),
        Op::Equal if loose => Ok(loose_equals(left, right).into()),
        Op::NotEqual if loose => Ok((!loose_equals(left, right)).into()),
        Op::Equal => Ok(strict_equals(left, right).into()),
        Op::NotEqual => Ok((!strict_equals(left, right)).into()),

        Op::Add => add(left, right, features),
        Op::Subtract => arithmetic(operator, left, right, features, |a, b| a - b),
        Op::Multiply => arithmetic(operator, left, right, features, |a, b| a * b),
        Op::Power => arithmetic(operator, left, right, features, f64::powf),
        Op::Divide | Op::Modulo => {
            let (a, b) = numbers(operator, left, right, features)?;
            if b == 0.0 {
                return Err(RuntimeErrorKind::DivisionByZero {
                    operator: operator.symbol().to_string(),
                });
            }
            let n = if operator == Op::Divide { a / b } else { a % b };
            Ok(RuntimeObject::Number(round(n)))
        }

        Op::Less => comparison(operator, left, right, features, |a, b| a < b),
        Op::LessEqual => comparison(operator, left, right, features, |a, b| a <= b),
        Op::Greater => comparison(operator, left, right, features, |a, b| a > b),
        Op::GreaterEqual => comparison(operator, left, right, features, |a, b| a >= b),
    }
}

fn add(left: &RuntimeObject, right: &RuntimeObject, features: &LanguageFeatures) -> OpResult {
    match (left, right) {
        (RuntimeObject::Number(a), RuntimeObject::Number(b)) => Ok(RuntimeObject::Number(round(a + b))),
        (RuntimeObject::String(a), RuntimeObject::String(b)) => Ok(RuntimeObject::String(format!("{a}{b}"))),
        (RuntimeObject::String(_), _) | (_, RuntimeObject::String(_)) if features.allow_type_coercion => Ok(
            RuntimeObject::String(format!("{}{}", left.to_plain_string(), right.to_plain_string())),
        ),
        _ if features.allow_type_coercion => {
            Ok(RuntimeObject::Number(round(to_number(left) + to_number(right))))
        }
        _ => Err(type_error("+", "two numbers or two strings", left, right)),
    }
}

fn arithmetic(
    operator: BinaryOperator,
    left: &RuntimeObject,
    right: &RuntimeObject,
    features: &LanguageFeatures,
    op: fn(f64, f64) -> f64,
) -> OpResult {
    let (a, b) = numbers(operator, left, right, features)?;
    Ok(RuntimeObject::Number(round(op(a, b))))
}

fn comparison(
    operator: BinaryOperator,
    left: &RuntimeObject,
    right: &RuntimeObject,
    features: &LanguageFeatures,
    op: fn(f64, f64) -> bool,
) -> OpResult {
    let (a, b) = numbers(operator, left, right, features)?;
    Ok(RuntimeObject::Boolean(op(a, b)))
}

pub fn unary(operator: UnaryOperator, operand: &RuntimeObject, features: &LanguageFeatures) -> OpResult {
    match operator {
        UnaryOperator::Not => Ok(RuntimeObject::Boolean(!truthiness(operand, features)?)),
        UnaryOperator::Negate => match operand {
            RuntimeObject::Number(n) => Ok(RuntimeObject::Number(-n)),
            other if features.allow_type_coercion => Ok(RuntimeObject::Number(-to_number(other))),
            other => Err(RuntimeErrorKind::TypeError {
                operator: "-".to_string(),
                expected: "a number".to_string(),
                found: other.type_name().to_string(),
            }),
        },
    }
}
