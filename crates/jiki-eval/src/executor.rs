//! Statement execution and the frame boundary.
//!
//! Every statement that does observable work runs through
//! [`Executor::execute_frame`], which records exactly one frame for it. A
//! runtime error becomes an ERROR frame at the innermost boundary and turns
//! into [`Unwind::Halt`], so nothing else runs or records afterwards.

use std::collections::BTreeMap;
use std::mem;
use std::rc::Rc;

use jiki_types::ast::{AssignmentTarget, Expression, FunctionDeclaration, Ident, Statement, StatementKind};
use jiki_types::{LanguageFeatures, Location, RuntimeError, RuntimeErrorKind};

use crate::describe::DescriptionContext;
use crate::env::Environment;
use crate::error::{ControlSignal, Exec, Unwind};
use crate::external::{ExecutionContext, ExternalFunction};
use crate::frame::{ExecutionMode, Frame, FrameOutcome, FrameRecorder, Variables};
use crate::object::{Callable, RuntimeObject};
use crate::operators;
use crate::result::{ConditionConstruct, EvaluationResult};
use crate::stack::ensure_sufficient_stack;

/// Runs one program against one environment chain, recording frames.
pub struct Executor<'src> {
    pub(crate) source: &'src str,
    pub(crate) features: LanguageFeatures,
    pub(crate) env: Environment,
    /// Host functions, resolved when no binding shadows them.
    pub(crate) externals: BTreeMap<String, Rc<Callable>>,
    pub(crate) recorder: FrameRecorder,
    total_loop_iterations: u64,
    pub(crate) call_depth: usize,
}

impl<'src> Executor<'src> {
    pub fn new(
        source: &'src str,
        features: LanguageFeatures,
        external_functions: &[ExternalFunction],
        mode: ExecutionMode,
    ) -> Self {
        let externals = external_functions
            .iter()
            .map(|function| {
                (
                    function.name.clone(),
                    Rc::new(Callable::External(Rc::new(function.clone()))),
                )
            })
            .collect();
        Self {
            source,
            features,
            env: Environment::new(),
            externals,
            recorder: FrameRecorder::new(
                mode,
                DescriptionContext::from_external_functions(external_functions),
            ),
            total_loop_iterations: 0,
            call_depth: 0,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        self.recorder.frames()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.recorder.into_frames()
    }

    /// Whether an ERROR frame has been recorded.
    pub fn has_error(&self) -> bool {
        self.recorder.has_error()
    }

    pub fn context(&self) -> &ExecutionContext {
        self.recorder.clock()
    }

    /// Run top-level statements until the first ERROR frame.
    pub fn execute(&mut self, statements: &[Statement]) {
        if self.has_error() {
            return;
        }
        for statement in statements {
            match self.execute_statement(statement) {
                Ok(()) => {}
                Err(Unwind::Halt) => return,
                Err(Unwind::Error(error)) => {
                    self.fail(error);
                    return;
                }
                Err(Unwind::Flow(signal)) => {
                    tracing::warn!(?signal, line = statement.location.line, "control signal reached top level");
                }
            }
        }
    }

    /// Call a function the program defined (or a host function) by name,
    /// inside a frame of its own.
    ///
    /// Returns `None` when the call failed; the failure is on the last frame.
    pub fn call_function(&mut self, name: &str, arguments: Vec<RuntimeObject>) -> Option<RuntimeObject> {
        if self.has_error() {
            return None;
        }
        let location = match self.env.get(name) {
            Some(RuntimeObject::Callable(callable)) => match callable.as_ref() {
                Callable::User { declaration, .. } => declaration.name.location,
                Callable::External(_) => Location::point(1, 0, 1),
            },
            _ => Location::point(1, 0, 1),
        };
        let outcome = self.execute_frame(location, |this| {
            let callee = this.lookup(name, location)?;
            let Some(callable) = callee.as_callable().cloned() else {
                return Err(Unwind::error(
                    RuntimeErrorKind::NotCallable {
                        name: name.to_string(),
                        found: callee.type_name().to_string(),
                    },
                    location,
                ));
            };
            let results = arguments
                .iter()
                .map(|value| EvaluationResult::Literal { value: value.snapshot() })
                .collect();
            let value = this.call(&callable, arguments, location)?;
            Ok((
                EvaluationResult::Call {
                    function: callable.name().to_string(),
                    arguments: results,
                    value: value.snapshot(),
                },
                value,
            ))
        });
        match outcome {
            Ok(value) => Some(value),
            Err(Unwind::Error(error)) => {
                self.fail(error);
                None
            }
            Err(Unwind::Halt) | Err(Unwind::Flow(_)) => None,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Frames
    // ══════════════════════════════════════════════════════════════════════

    /// Snapshot of every visible binding.
    fn variables(&self) -> Variables {
        self.env
            .get_all_variables()
            .into_iter()
            .map(|(name, value)| (name, value.snapshot()))
            .collect()
    }

    fn record(&mut self, location: Location, outcome: FrameOutcome, prior_variables: Variables) {
        let variables = self.variables();
        let code = location.to_code(self.source);
        self.recorder
            .add_frame(location, code, outcome, variables, prior_variables);
    }

    /// Record an ERROR frame for an error no boundary caught.
    fn fail(&mut self, error: RuntimeError) -> Unwind {
        let prior = self.variables();
        self.record(error.location, FrameOutcome::Error(error), prior);
        Unwind::Halt
    }

    /// Run `handler` as one frame at `location`.
    ///
    /// Success records its result; a runtime error records an ERROR frame
    /// and becomes [`Unwind::Halt`]. Control signals pass through untouched.
    pub(crate) fn execute_frame<T>(
        &mut self,
        location: Location,
        handler: impl FnOnce(&mut Self) -> Exec<(EvaluationResult, T)>,
    ) -> Exec<T> {
        let prior = self.variables();
        match handler(self) {
            Ok((result, value)) => {
                self.record(location, FrameOutcome::Success(result), prior);
                Ok(value)
            }
            Err(Unwind::Error(error)) => {
                self.record(location, FrameOutcome::Error(error), prior);
                Err(Unwind::Halt)
            }
            Err(other) => Err(other),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    pub(crate) fn execute_statement(&mut self, statement: &Statement) -> Exec<()> {
        ensure_sufficient_stack(|| self.execute_statement_kind(statement))
    }

    fn execute_statement_kind(&mut self, statement: &Statement) -> Exec<()> {
        let location = statement.location;
        match &statement.kind {
            StatementKind::VariableDeclaration {
                name,
                constant,
                initializer,
            } => self.execute_frame(location, |this| {
                this.declare_variable(name, *constant, initializer.as_ref())
            }),
            StatementKind::Assignment { target, value } => match target {
                AssignmentTarget::Variable(name) => {
                    self.execute_frame(location, |this| this.assign_variable(name, value))
                }
                AssignmentTarget::Subscript { object, index } => {
                    self.execute_frame(location, |this| this.assign_subscript(object, index, value))
                }
            },
            StatementKind::Expression(expression) => self.execute_frame(location, |this| {
                let evaluated = this.evaluate(expression)?;
                Ok((
                    EvaluationResult::Expression {
                        expression: Box::new(evaluated.result),
                        value: evaluated.value.snapshot(),
                    },
                    (),
                ))
            }),
            StatementKind::Block(statements) => self.execute_block(statements, location),
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate_condition(ConditionConstruct::If, condition)? {
                    self.execute_statement(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_statement(else_branch)
                } else {
                    Ok(())
                }
            }
            StatementKind::While { condition, body } => self.execute_while(condition, body, location),
            StatementKind::For {
                initializer,
                condition,
                update,
                body,
            } => {
                let scope = Environment::with_parent(&self.env);
                let enclosing = mem::replace(&mut self.env, scope);
                let outcome = self.execute_for(
                    initializer.as_deref(),
                    condition.as_ref(),
                    update.as_deref(),
                    body,
                    location,
                );
                self.env = enclosing;
                outcome
            }
            StatementKind::FunctionDeclaration(declaration) => {
                self.execute_frame(location, |this| this.declare_function(declaration))
            }
            StatementKind::Return(value) => {
                let returned = self.execute_frame(location, |this| {
                    let (expression, value) = match value {
                        Some(expression) => {
                            let evaluated = this.evaluate(expression)?;
                            (Some(Box::new(evaluated.result)), evaluated.value)
                        }
                        None => (None, RuntimeObject::None),
                    };
                    Ok((
                        EvaluationResult::Return {
                            expression,
                            value: value.snapshot(),
                        },
                        value,
                    ))
                })?;
                Err(Unwind::Flow(ControlSignal::Return(returned)))
            }
            StatementKind::Break => {
                self.execute_frame(location, |_| Ok((EvaluationResult::Break, ())))?;
                Err(Unwind::Flow(ControlSignal::Break))
            }
            StatementKind::Continue => {
                self.execute_frame(location, |_| Ok((EvaluationResult::Continue, ())))?;
                Err(Unwind::Flow(ControlSignal::Continue))
            }
        }
    }

    /// Reject a declaration that would clash with an existing binding.
    fn check_declaration(&self, name: &Ident) -> Exec<()> {
        if self.env.is_defined(&name.name) {
            return Err(Unwind::error(
                RuntimeErrorKind::VariableAlreadyDeclared {
                    name: name.name.clone(),
                },
                name.location,
            ));
        }
        if !self.features.allow_shadowing && self.env.is_defined_in_enclosing_scope(&name.name) {
            return Err(Unwind::error(
                RuntimeErrorKind::ShadowingDisabled {
                    name: name.name.clone(),
                },
                name.location,
            ));
        }
        Ok(())
    }

    fn declare_variable(
        &mut self,
        name: &Ident,
        constant: bool,
        initializer: Option<&Expression>,
    ) -> Exec<(EvaluationResult, ())> {
        self.check_declaration(name)?;
        let (initializer, value) = match initializer {
            Some(expression) => {
                let evaluated = self.evaluate(expression)?;
                (Some(Box::new(evaluated.result)), evaluated.value)
            }
            None => (None, RuntimeObject::None),
        };
        let snapshot = value.snapshot();
        if constant {
            self.env.define_constant(&name.name, value);
        } else {
            self.env.define(&name.name, value);
        }
        Ok((
            EvaluationResult::VariableDeclaration {
                name: name.name.clone(),
                constant,
                initializer,
                value: snapshot,
            },
            (),
        ))
    }

    fn declare_function(&mut self, declaration: &Rc<FunctionDeclaration>) -> Exec<(EvaluationResult, ())> {
        self.check_declaration(&declaration.name)?;
        let callable = Callable::User {
            declaration: Rc::clone(declaration),
            closure: self.env.clone(),
        };
        self.env
            .define(&declaration.name.name, RuntimeObject::Callable(Rc::new(callable)));
        Ok((
            EvaluationResult::FunctionDeclaration {
                name: declaration.name.name.clone(),
                parameters: declaration
                    .parameters
                    .iter()
                    .map(|parameter| parameter.name.clone())
                    .collect(),
            },
            (),
        ))
    }

    fn assign_variable(&mut self, name: &Ident, value: &Expression) -> Exec<(EvaluationResult, ())> {
        if self.env.get(&name.name).is_none() {
            return Err(Unwind::error(
                RuntimeErrorKind::VariableNotDeclared {
                    name: name.name.clone(),
                },
                name.location,
            ));
        }
        if self.env.is_constant(&name.name) {
            return Err(Unwind::error(
                RuntimeErrorKind::ConstantReassignment {
                    name: name.name.clone(),
                },
                name.location,
            ));
        }
        let evaluated = self.evaluate(value)?;
        let previous = self
            .env
            .get(&name.name)
            .map(|previous| previous.snapshot())
            .unwrap_or(RuntimeObject::None);
        let snapshot = evaluated.value.snapshot();
        self.env.update(&name.name, evaluated.value);
        Ok((
            EvaluationResult::Assignment {
                name: name.name.clone(),
                previous,
                expression: Box::new(evaluated.result),
                value: snapshot,
            },
            (),
        ))
    }

    fn assign_subscript(
        &mut self,
        object: &Expression,
        index: &Expression,
        value: &Expression,
    ) -> Exec<(EvaluationResult, ())> {
        let target = self.evaluate(object)?;
        let position = self.evaluate(index)?;
        let RuntimeObject::List(list) = &target.value else {
            return Err(Unwind::error(
                RuntimeErrorKind::TypeError {
                    operator: "[]=".to_string(),
                    expected: "a list".to_string(),
                    found: target.value.type_name().to_string(),
                },
                object.location,
            ));
        };
        let length = list.borrow().len();
        let slot = list_index(&position.value, length, index.location)?;
        let evaluated = self.evaluate(value)?;
        if evaluated.value.contains_list(list) {
            return Err(Unwind::error(RuntimeErrorKind::CircularList, value.location));
        }
        let snapshot = evaluated.value.snapshot();
        let previous = {
            let mut elements = list.borrow_mut();
            let length = elements.len();
            let Some(element) = elements.get_mut(slot) else {
                return Err(Unwind::error(
                    RuntimeErrorKind::IndexOutOfRange {
                        index: slot as i64,
                        length,
                    },
                    index.location,
                ));
            };
            mem::replace(element, evaluated.value)
        };
        Ok((
            EvaluationResult::SubscriptAssignment {
                object: Box::new(target.result),
                index: Box::new(position.result),
                expression: Box::new(evaluated.result),
                previous: previous.snapshot(),
                value: snapshot,
                list: target.value.snapshot(),
            },
            (),
        ))
    }

    /// Run a block in a fresh scope. Leaving a scope that declared anything
    /// records a block-exit frame naming what went out of scope.
    fn execute_block(&mut self, statements: &[Statement], location: Location) -> Exec<()> {
        let scope = Environment::with_parent(&self.env);
        let enclosing = mem::replace(&mut self.env, scope);
        let outcome = statements
            .iter()
            .try_for_each(|statement| self.execute_statement(statement));
        let prior = self.variables();
        let scope = mem::replace(&mut self.env, enclosing);

        let dropped = scope.local_names();
        let completed = matches!(outcome, Ok(()) | Err(Unwind::Flow(_)));
        if completed && !dropped.is_empty() {
            self.record(
                location,
                FrameOutcome::Success(EvaluationResult::BlockExit { dropped }),
                prior,
            );
        }
        outcome
    }

    // ══════════════════════════════════════════════════════════════════════
    // Conditions & loops
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate a condition in a frame of its own.
    fn evaluate_condition(&mut self, construct: ConditionConstruct, condition: &Expression) -> Exec<bool> {
        self.execute_frame(condition.location, |this| {
            let evaluated = this.evaluate(condition)?;
            let truth = operators::truthiness(&evaluated.value, &this.features)
                .map_err(|kind| RuntimeError::new(kind, condition.location))?;
            Ok((
                EvaluationResult::Condition {
                    construct,
                    condition: Some(Box::new(evaluated.result)),
                    value: RuntimeObject::Boolean(truth),
                },
                truth,
            ))
        })
    }

    /// Count one loop iteration against the runaway limits.
    fn guard_loop(&mut self, location: Location) -> Exec<()> {
        self.total_loop_iterations += 1;
        let max = self.features.max_total_loop_iterations;
        if self.total_loop_iterations > max {
            return Err(self.fail(RuntimeError::new(
                RuntimeErrorKind::MaxIterationsReached { max },
                location,
            )));
        }
        let max = self.features.max_total_execution_time;
        if self.recorder.clock().current_time_in_ms() > max as f64 {
            return Err(self.fail(RuntimeError::new(
                RuntimeErrorKind::MaxTotalExecutionTimeReached { max },
                location,
            )));
        }
        Ok(())
    }

    /// Run a loop body. `Ok(false)` means the body broke out of the loop.
    fn execute_loop_body(&mut self, body: &Statement) -> Exec<bool> {
        match self.execute_statement(body) {
            Ok(()) | Err(Unwind::Flow(ControlSignal::Continue)) => Ok(true),
            Err(Unwind::Flow(ControlSignal::Break)) => Ok(false),
            Err(other) => Err(other),
        }
    }

    fn execute_while(&mut self, condition: &Expression, body: &Statement, location: Location) -> Exec<()> {
        while self.evaluate_condition(ConditionConstruct::While, condition)? {
            self.guard_loop(location)?;
            if !self.execute_loop_body(body)? {
                break;
            }
        }
        Ok(())
    }

    fn execute_for(
        &mut self,
        initializer: Option<&Statement>,
        condition: Option<&Expression>,
        update: Option<&Statement>,
        body: &Statement,
        location: Location,
    ) -> Exec<()> {
        if let Some(initializer) = initializer {
            self.execute_statement(initializer)?;
        }
        loop {
            let proceed = match condition {
                Some(condition) => self.evaluate_condition(ConditionConstruct::For, condition)?,
                None => self.execute_frame(location, |_| {
                    Ok((
                        EvaluationResult::Condition {
                            construct: ConditionConstruct::For,
                            condition: None,
                            value: RuntimeObject::Boolean(true),
                        },
                        true,
                    ))
                })?,
            };
            if !proceed {
                break;
            }
            self.guard_loop(location)?;
            if !self.execute_loop_body(body)? {
                break;
            }
            if let Some(update) = update {
                self.execute_statement(update)?;
            }
        }
        Ok(())
    }
}

/// Validate `index` as a position in a sequence of `length` elements.
pub(crate) fn list_index(index: &RuntimeObject, length: usize, location: Location) -> Exec<usize> {
    let RuntimeObject::Number(n) = index else {
        return Err(Unwind::error(
            RuntimeErrorKind::TypeError {
                operator: "[]".to_string(),
                expected: "a number".to_string(),
                found: index.type_name().to_string(),
            },
            location,
        ));
    };
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(Unwind::error(
            RuntimeErrorKind::InvalidIndex {
                index: crate::object::format_number(*n),
            },
            location,
        ));
    }
    if *n < 0.0 || *n >= length as f64 {
        return Err(Unwind::error(
            RuntimeErrorKind::IndexOutOfRange {
                index: *n as i64,
                length,
            },
            location,
        ));
    }
    Ok(*n as usize)
}
