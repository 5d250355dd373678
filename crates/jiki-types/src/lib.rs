//! Shared types for the Jiki runtime.
//!
//! This crate defines source locations, AST node types, the syntax and
//! runtime error taxonomy, and the language feature configuration used across
//! the scanner, parser and executor.

mod error;
mod features;
mod location;
pub mod ast;

pub use error::{RuntimeError, RuntimeErrorKind, SyntaxError, SyntaxErrorKind};
pub use features::{
    LanguageFeatures, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_TOTAL_EXECUTION_TIME_MS,
    DEFAULT_MAX_TOTAL_LOOP_ITERATIONS,
};
pub use location::{Location, OffsetRange};
