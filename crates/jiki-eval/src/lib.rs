//! Jiki tree-walking executor.
//!
//! Runs a parsed program statement by statement and records a [`Frame`] for
//! every observable step: the value produced, the variables before and after,
//! and a virtual timestamp. Frames are the only output; a runtime error ends
//! the trace with an ERROR frame.

mod describe;
mod env;
mod error;
mod executor;
mod expr;
mod external;
mod frame;
mod object;
mod operators;
mod result;
mod stack;

pub use describe::{describe_frame, Description, DescriptionContext};
pub use env::Environment;
pub use error::{ControlSignal, Exec, Unwind};
pub use executor::Executor;
pub use external::{
    Arity, ExecutionContext, ExternalFn, ExternalFunction, LogicError, FRAME_DURATION_MICROS,
    MAX_CLOCK_MICROS,
};
pub use frame::{ExecutionMode, Frame, FrameOutcome, FrameRecorder, FrameStatus, Variables};
pub use object::{format_number, Callable, ListHandle, RuntimeObject};
pub use operators::{is_truthy, ROUNDING_SCALE};
pub use result::{ConditionConstruct, Evaluated, EvaluationResult};
pub use stack::ensure_sufficient_stack;
