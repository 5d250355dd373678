//! Jiki interpreter: the public entry points.
//!
//! ```text
//! source → jiki-lexer → jiki-parser → jiki-eval → frames
//! ```
//!
//! A syntax error anywhere stops the pipeline before execution, so the
//! result carries the error and no frames. Runtime errors end execution
//! with an ERROR frame instead.

mod outcome;

pub use outcome::{CompileResult, FunctionResult, InterpretResult};

pub use jiki_eval::{
    Arity, Description, EvaluationResult, ExecutionContext, ExecutionMode, ExternalFunction, Frame,
    FrameStatus, LogicError, RuntimeObject,
};
pub use jiki_types::{LanguageFeatures, RuntimeError, RuntimeErrorKind, SyntaxError, SyntaxErrorKind};

use jiki_eval::Executor;
use jiki_types::ast::Statement;

/// Everything a host can configure for one run.
#[derive(Debug, Clone, Default)]
pub struct InterpretOptions {
    pub language_features: LanguageFeatures,
    pub external_functions: Vec<ExternalFunction>,
    pub execution_mode: ExecutionMode,
}

impl InterpretOptions {
    pub fn with_language_features(mut self, features: LanguageFeatures) -> Self {
        self.language_features = features;
        self
    }

    pub fn with_external_function(mut self, function: ExternalFunction) -> Self {
        self.external_functions.push(function);
        self
    }

    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }
}

fn executor<'src>(source: &'src str, options: &InterpretOptions) -> Executor<'src> {
    Executor::new(
        source,
        options.language_features.clone(),
        &options.external_functions,
        options.execution_mode,
    )
}

fn parse(source: &str, options: &InterpretOptions) -> Result<Vec<Statement>, SyntaxError> {
    jiki_parser::parse(source, &options.language_features).inspect_err(|error| {
        tracing::debug!(%error, location = %error.location, "syntax error");
    })
}

/// Parse and run `source`, returning every recorded frame.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn interpret(source: &str, options: &InterpretOptions) -> InterpretResult {
    let statements = match parse(source, options) {
        Ok(statements) => statements,
        Err(error) => return InterpretResult::syntax_error(error),
    };
    let mut executor = executor(source, options);
    executor.execute(&statements);
    let result = InterpretResult::from_frames(executor.into_frames());
    tracing::debug!(frames = result.frames.len(), success = result.success, "interpreted");
    result
}

/// Check that `source` parses under the configured features. Never runs it.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn compile(source: &str, options: &InterpretOptions) -> CompileResult {
    match parse(source, options) {
        Ok(_) => CompileResult::Success,
        Err(error) => CompileResult::CompilationError { error },
    }
}

/// Run `source`, then call the function `name` with `arguments`.
///
/// The call gets a frame of its own after the program's frames. If the
/// program itself fails the function is never called.
#[tracing::instrument(level = "debug", skip(source, options, arguments), fields(bytes = source.len()))]
pub fn evaluate_function(
    source: &str,
    options: &InterpretOptions,
    name: &str,
    arguments: Vec<RuntimeObject>,
) -> FunctionResult {
    let statements = match parse(source, options) {
        Ok(statements) => statements,
        Err(error) => {
            return FunctionResult {
                value: None,
                frames: Vec::new(),
                error: Some(error),
                success: false,
            }
        }
    };
    let mut executor = executor(source, options);
    executor.execute(&statements);
    let value = executor.call_function(name, arguments);
    let success = !executor.has_error();
    FunctionResult {
        value,
        frames: executor.into_frames(),
        error: None,
        success,
    }
}
