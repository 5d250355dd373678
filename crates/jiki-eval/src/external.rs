//! Host-supplied functions and the context they run in.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::object::RuntimeObject;

/// Virtual time consumed by each recorded frame, in microseconds.
pub const FRAME_DURATION_MICROS: u64 = 10;

/// Upper bound for `fast_forward`. Below 2^53 every microsecond is still
/// exact as an `f64` millisecond count, so timestamps keep increasing.
pub const MAX_CLOCK_MICROS: u64 = 1 << 52;

/// Failure reported by an external function. Surfaces as a
/// `LogicError` runtime error on the calling frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LogicError {
    pub message: String,
}

impl LogicError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Number of arguments a callable accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// At least `min`, and at most `max` when given.
    Range { min: usize, max: Option<usize> },
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::Range { min, max } => count >= min && max.is_none_or(|max| count <= max),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::Range { min, max: Some(max) } => write!(f, "{min} to {max}"),
            Arity::Range { min, max: None } => write!(f, "at least {min}"),
        }
    }
}

pub type ExternalFn =
    dyn Fn(&mut ExecutionContext, &[RuntimeObject]) -> Result<RuntimeObject, LogicError>;

/// A function the host makes callable from programs by name.
#[derive(Clone)]
pub struct ExternalFunction {
    pub name: String,
    pub arity: Arity,
    pub func: Rc<ExternalFn>,
    /// Phrase completing "Used the `name` function, which ...".
    pub description: String,
}

impl ExternalFunction {
    pub fn new(
        name: impl Into<String>,
        arity: Arity,
        description: impl Into<String>,
        func: impl Fn(&mut ExecutionContext, &[RuntimeObject]) -> Result<RuntimeObject, LogicError>
            + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            func: Rc::new(func),
            description: description.into(),
        }
    }
}

impl fmt::Debug for ExternalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Execution state visible to external functions: the virtual clock.
///
/// Time is kept in whole microseconds so frame timestamps never drift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    time_micros: u64,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `ms` virtual milliseconds. Negative or
    /// non-finite amounts are ignored, and the clock stops at
    /// [`MAX_CLOCK_MICROS`].
    pub fn fast_forward(&mut self, ms: f64) {
        if ms.is_finite() && ms > 0.0 {
            let step = (ms * 1000.0).round() as u64;
            let ceiling = MAX_CLOCK_MICROS.max(self.time_micros);
            self.time_micros = self.time_micros.saturating_add(step).min(ceiling);
        }
    }

    pub fn current_time_in_ms(&self) -> f64 {
        self.time_micros as f64 / 1000.0
    }

    pub fn current_time_in_micros(&self) -> u64 {
        self.time_micros
    }

    pub(crate) fn advance_frame(&mut self) {
        self.time_micros = self.time_micros.saturating_add(FRAME_DURATION_MICROS);
    }
}
