//! Runtime values.
//!
//! `Clone` on a [`RuntimeObject`] copies the handle: two clones of a list
//! observe each other's mutations, as aliases do in the language. Frames
//! store [`RuntimeObject::snapshot`] copies instead, which never change.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use jiki_types::ast::FunctionDeclaration;
use serde::{Serialize, Serializer};

use crate::env::Environment;
use crate::external::ExternalFunction;
use crate::stack::ensure_sufficient_stack;

/// Shared, mutable list storage.
pub type ListHandle = Rc<RefCell<Vec<RuntimeObject>>>;

#[derive(Clone)]
pub enum RuntimeObject {
    Number(f64),
    String(String),
    Boolean(bool),
    List(ListHandle),
    /// `null`
    None,
    Callable(Rc<Callable>),
}

/// Something that can be called.
pub enum Callable {
    /// A function declared in the program, with the environment it was
    /// declared in.
    User {
        declaration: Rc<FunctionDeclaration>,
        closure: Environment,
    },
    /// A host function supplied through the interpreter options.
    External(Rc<ExternalFunction>),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::User { declaration, .. } => &declaration.name.name,
            Callable::External(function) => &function.name,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::User { declaration, .. } => f
                .debug_struct("User")
                .field("name", &declaration.name.name)
                .field("arity", &declaration.parameters.len())
                .finish_non_exhaustive(),
            Callable::External(function) => f.debug_tuple("External").field(&function.name).finish(),
        }
    }
}

impl RuntimeObject {
    pub fn list(elements: Vec<RuntimeObject>) -> Self {
        RuntimeObject::List(Rc::new(RefCell::new(elements)))
    }

    pub fn string(s: impl Into<String>) -> Self {
        RuntimeObject::String(s.into())
    }

    /// Lower-case type name used in error contexts.
    pub fn type_name(&self) -> &'static str {
        match self {
            RuntimeObject::Number(_) => "number",
            RuntimeObject::String(_) => "string",
            RuntimeObject::Boolean(_) => "boolean",
            RuntimeObject::List(_) => "list",
            RuntimeObject::None => "null",
            RuntimeObject::Callable(_) => "function",
        }
    }

    /// A copy that later mutation of `self` cannot reach.
    ///
    /// Lists are copied deeply; every other variant is immutable, so the
    /// copy is just another handle.
    pub fn snapshot(&self) -> RuntimeObject {
        match self {
            RuntimeObject::List(elements) => ensure_sufficient_stack(|| {
                RuntimeObject::list(elements.borrow().iter().map(Self::snapshot).collect())
            }),
            other => other.clone(),
        }
    }

    /// Whether `list` is this value or is reachable through its elements.
    ///
    /// Storing such a value into `list` would make the list contain itself.
    pub fn contains_list(&self, list: &ListHandle) -> bool {
        match self {
            RuntimeObject::List(elements) => {
                Rc::ptr_eq(elements, list)
                    || ensure_sufficient_stack(|| {
                        elements.borrow().iter().any(|element| element.contains_list(list))
                    })
            }
            _ => false,
        }
    }

    /// Text used when a value is joined into a string: like `Display`, but
    /// top-level strings are left unquoted.
    pub fn to_plain_string(&self) -> String {
        match self {
            RuntimeObject::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Raw JSON view of the value, handed to external functions and
    /// serializers. Integral numbers become JSON integers.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            RuntimeObject::Number(n) => number_to_json(*n),
            RuntimeObject::String(s) => serde_json::Value::String(s.clone()),
            RuntimeObject::Boolean(b) => serde_json::Value::Bool(*b),
            RuntimeObject::List(elements) => ensure_sufficient_stack(|| {
                serde_json::Value::Array(elements.borrow().iter().map(Self::to_json).collect())
            }),
            RuntimeObject::None => serde_json::Value::Null,
            RuntimeObject::Callable(callable) => {
                serde_json::Value::String(format!("<function {}>", callable.name()))
            }
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RuntimeObject::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Rc<Callable>> {
        match self {
            RuntimeObject::Callable(callable) => Some(callable),
            _ => None,
        }
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

/// Canonical number text: integers without a fraction, `NaN`, `Infinity`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n < 0.0 { "-" } else { "" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        // Covers -0.
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Display for RuntimeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeObject::Number(n) => f.write_str(&format_number(*n)),
            RuntimeObject::String(s) => write!(f, "\"{s}\""),
            RuntimeObject::Boolean(b) => write!(f, "{b}"),
            RuntimeObject::List(elements) => ensure_sufficient_stack(|| {
                f.write_str("[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }),
            RuntimeObject::None => f.write_str("null"),
            RuntimeObject::Callable(callable) => write!(f, "<function {}>", callable.name()),
        }
    }
}

impl fmt::Debug for RuntimeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// Structural equality for lists, identity for callables.
impl PartialEq for RuntimeObject {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RuntimeObject::Number(a), RuntimeObject::Number(b)) => a == b,
            (RuntimeObject::String(a), RuntimeObject::String(b)) => a == b,
            (RuntimeObject::Boolean(a), RuntimeObject::Boolean(b)) => a == b,
            (RuntimeObject::List(a), RuntimeObject::List(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (RuntimeObject::None, RuntimeObject::None) => true,
            (RuntimeObject::Callable(a), RuntimeObject::Callable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Serialize for RuntimeObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<f64> for RuntimeObject {
    fn from(n: f64) -> Self {
        RuntimeObject::Number(n)
    }
}

impl From<bool> for RuntimeObject {
    fn from(b: bool) -> Self {
        RuntimeObject::Boolean(b)
    }
}

impl From<&str> for RuntimeObject {
    fn from(s: &str) -> Self {
        RuntimeObject::String(s.to_string())
    }
}
