//! Non-local exits used inside the executor.
//!
//! A [`RuntimeError`] is a real failure and ends up on an ERROR frame.
//! [`ControlSignal`]s are ordinary `return`/`break`/`continue` control flow
//! and never reach a consumer.

use std::fmt;

use jiki_types::{Location, RuntimeError, RuntimeErrorKind};

use crate::object::RuntimeObject;

/// `return`, `break` and `continue` in flight.
#[derive(Debug, Clone)]
pub enum ControlSignal {
    Return(RuntimeObject),
    Break,
    Continue,
}

/// Why evaluation stopped early.
#[derive(Debug, Clone)]
pub enum Unwind {
    /// Raised but not yet recorded; the nearest frame boundary records it.
    Error(RuntimeError),
    /// An ERROR frame has been recorded. Nothing else may run.
    Halt,
    Flow(ControlSignal),
}

impl fmt::Display for Unwind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unwind::Error(error) => write!(f, "runtime error: {error}"),
            Unwind::Halt => write!(f, "halted"),
            Unwind::Flow(ControlSignal::Return(_)) => write!(f, "return"),
            Unwind::Flow(ControlSignal::Break) => write!(f, "break"),
            Unwind::Flow(ControlSignal::Continue) => write!(f, "continue"),
        }
    }
}

impl Unwind {
    pub fn error(kind: RuntimeErrorKind, location: Location) -> Self {
        Unwind::Error(RuntimeError::new(kind, location))
    }
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

/// Result alias for executor operations.
pub type Exec<T> = Result<T, Unwind>;
