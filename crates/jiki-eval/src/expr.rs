//! Expression evaluation and function calls.

use std::mem;
use std::rc::Rc;

use jiki_types::ast::{Expression, ExpressionKind, Ident, LiteralValue, LogicalOperator};
use jiki_types::{Location, RuntimeError, RuntimeErrorKind};

use crate::env::Environment;
use crate::error::{ControlSignal, Exec, Unwind};
use crate::executor::{list_index, Executor};
use crate::object::{Callable, RuntimeObject};
use crate::operators;
use crate::result::{Evaluated, EvaluationResult};
use crate::stack::ensure_sufficient_stack;

impl Executor<'_> {
    /// Evaluate an expression to its live value plus a frozen result tree.
    pub(crate) fn evaluate(&mut self, expression: &Expression) -> Exec<Evaluated> {
        ensure_sufficient_stack(|| self.evaluate_expression(expression))
    }

    fn evaluate_expression(&mut self, expression: &Expression) -> Exec<Evaluated> {
        let location = expression.location;
        match &expression.kind {
            ExpressionKind::Literal(literal) => {
                let value = match literal {
                    LiteralValue::Number(n) => RuntimeObject::Number(*n),
                    LiteralValue::String(s) => RuntimeObject::String(s.clone()),
                    LiteralValue::Boolean(b) => RuntimeObject::Boolean(*b),
                    LiteralValue::Null => RuntimeObject::None,
                };
                Ok(Evaluated::new(
                    value.clone(),
                    EvaluationResult::Literal { value },
                ))
            }

            ExpressionKind::Identifier(name) => {
                let value = self.lookup(name, location)?;
                Ok(Evaluated::new(
                    value.clone(),
                    EvaluationResult::Identifier {
                        name: name.clone(),
                        value: value.snapshot(),
                    },
                ))
            }

            ExpressionKind::Binary {
                left,
                operator,
                right,
            } => {
                let operand_locations = (left.location, right.location);
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                let value = operators::binary(*operator, &left.value, &right.value, &self.features)
                    .map_err(|kind| {
                        let at = blame(&kind, &left.value, operand_locations, location);
                        RuntimeError::new(kind, at)
                    })?;
                Ok(Evaluated::new(
                    value.clone(),
                    EvaluationResult::Binary {
                        operator: *operator,
                        left: Box::new(left.result),
                        right: Box::new(right.result),
                        value,
                    },
                ))
            }

            ExpressionKind::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(*operator, left, right),

            ExpressionKind::Unary { operator, operand } => {
                let operand_location = operand.location;
                let operand = self.evaluate(operand)?;
                let value = operators::unary(*operator, &operand.value, &self.features)
                    .map_err(|kind| RuntimeError::new(kind, operand_location))?;
                Ok(Evaluated::new(
                    value.clone(),
                    EvaluationResult::Unary {
                        operator: *operator,
                        operand: Box::new(operand.result),
                        value,
                    },
                ))
            }

            ExpressionKind::Grouping(inner) => {
                let inner = self.evaluate(inner)?;
                let snapshot = inner.value.snapshot();
                Ok(Evaluated::new(
                    inner.value,
                    EvaluationResult::Grouping {
                        inner: Box::new(inner.result),
                        value: snapshot,
                    },
                ))
            }

            ExpressionKind::Call { callee, arguments } => self.evaluate_call(callee, arguments, location),

            ExpressionKind::Member { object, property } => self.evaluate_member(object, property),

            ExpressionKind::Subscript { object, index } => {
                let target = self.evaluate(object)?;
                let position = self.evaluate(index)?;
                let value = match &target.value {
                    RuntimeObject::List(elements) => {
                        let elements = elements.borrow();
                        let slot = list_index(&position.value, elements.len(), index.location)?;
                        elements[slot].clone()
                    }
                    RuntimeObject::String(s) => {
                        let length = s.chars().count();
                        let slot = list_index(&position.value, length, index.location)?;
                        s.chars()
                            .nth(slot)
                            .map(|c| RuntimeObject::String(c.to_string()))
                            .unwrap_or(RuntimeObject::None)
                    }
                    other => {
                        return Err(Unwind::error(
                            RuntimeErrorKind::NotSubscriptable {
                                found: other.type_name().to_string(),
                            },
                            object.location,
                        ))
                    }
                };
                let snapshot = value.snapshot();
                Ok(Evaluated::new(
                    value,
                    EvaluationResult::Subscript {
                        object: Box::new(target.result),
                        index: Box::new(position.result),
                        value: snapshot,
                    },
                ))
            }

            ExpressionKind::List(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                let mut results = Vec::with_capacity(elements.len());
                for element in elements {
                    let evaluated = self.evaluate(element)?;
                    values.push(evaluated.value);
                    results.push(evaluated.result);
                }
                let value = RuntimeObject::list(values);
                let snapshot = value.snapshot();
                Ok(Evaluated::new(
                    value,
                    EvaluationResult::List {
                        elements: results,
                        value: snapshot,
                    },
                ))
            }
        }
    }

    /// Resolve a name: program bindings first, then host functions.
    pub(crate) fn lookup(&self, name: &str, location: Location) -> Exec<RuntimeObject> {
        if let Some(value) = self.env.get(name) {
            return Ok(value);
        }
        match self.externals.get(name) {
            Some(callable) => Ok(RuntimeObject::Callable(Rc::clone(callable))),
            None => Err(Unwind::error(
                RuntimeErrorKind::VariableNotDeclared {
                    name: name.to_string(),
                },
                location,
            )),
        }
    }

    fn evaluate_logical(
        &mut self,
        operator: LogicalOperator,
        left: &Expression,
        right: &Expression,
    ) -> Exec<Evaluated> {
        let left_evaluated = self.evaluate(left)?;
        let left_truth = operators::truthiness(&left_evaluated.value, &self.features)
            .map_err(|kind| RuntimeError::new(kind, left.location))?;
        let decided = match operator {
            LogicalOperator::And => !left_truth,
            LogicalOperator::Or => left_truth,
        };
        if decided {
            let snapshot = left_evaluated.value.snapshot();
            return Ok(Evaluated::new(
                left_evaluated.value,
                EvaluationResult::Logical {
                    operator,
                    left: Box::new(left_evaluated.result),
                    right: None,
                    value: snapshot,
                },
            ));
        }
        let right_evaluated = self.evaluate(right)?;
        operators::truthiness(&right_evaluated.value, &self.features)
            .map_err(|kind| RuntimeError::new(kind, right.location))?;
        let snapshot = right_evaluated.value.snapshot();
        Ok(Evaluated::new(
            right_evaluated.value,
            EvaluationResult::Logical {
                operator,
                left: Box::new(left_evaluated.result),
                right: Some(Box::new(right_evaluated.result)),
                value: snapshot,
            },
        ))
    }

    fn evaluate_member(&mut self, object: &Expression, property: &Ident) -> Exec<Evaluated> {
        let target = self.evaluate(object)?;
        let value = match (&target.value, property.name.as_str()) {
            (RuntimeObject::List(elements), "length") => {
                RuntimeObject::Number(elements.borrow().len() as f64)
            }
            (RuntimeObject::String(s), "length") => RuntimeObject::Number(s.chars().count() as f64),
            (other, _) => {
                return Err(Unwind::error(
                    RuntimeErrorKind::PropertyNotFound {
                        property: property.name.clone(),
                        found: other.type_name().to_string(),
                    },
                    property.location,
                ))
            }
        };
        Ok(Evaluated::new(
            value.clone(),
            EvaluationResult::Member {
                object: Box::new(target.result),
                property: property.name.clone(),
                value,
            },
        ))
    }

    fn evaluate_call(
        &mut self,
        callee: &Expression,
        arguments: &[Expression],
        location: Location,
    ) -> Exec<Evaluated> {
        let target = self.evaluate(callee)?;
        let mut values = Vec::with_capacity(arguments.len());
        let mut results = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let evaluated = self.evaluate(argument)?;
            values.push(evaluated.value);
            results.push(evaluated.result);
        }
        let Some(callable) = target.value.as_callable().cloned() else {
            return Err(Unwind::error(
                RuntimeErrorKind::NotCallable {
                    name: callee.location.to_code(self.source).to_string(),
                    found: target.value.type_name().to_string(),
                },
                callee.location,
            ));
        };
        let value = self.call(&callable, values, location)?;
        let snapshot = value.snapshot();
        Ok(Evaluated::new(
            value,
            EvaluationResult::Call {
                function: callable.name().to_string(),
                arguments: results,
                value: snapshot,
            },
        ))
    }

    /// Invoke a callable with already evaluated arguments.
    ///
    /// A user function's body records its own frames before the caller's
    /// statement records its frame.
    pub(crate) fn call(
        &mut self,
        callable: &Rc<Callable>,
        arguments: Vec<RuntimeObject>,
        location: Location,
    ) -> Exec<RuntimeObject> {
        match callable.as_ref() {
            Callable::User {
                declaration,
                closure,
            } => {
                let arity = declaration.parameters.len();
                if arguments.len() != arity {
                    return Err(Unwind::error(
                        RuntimeErrorKind::InvalidNumberOfArguments {
                            name: declaration.name.name.clone(),
                            expected: arity.to_string(),
                            received: arguments.len(),
                        },
                        location,
                    ));
                }
                let max = self.features.max_call_depth;
                if self.call_depth >= max {
                    return Err(Unwind::error(
                        RuntimeErrorKind::MaxCallDepthExceeded { max },
                        location,
                    ));
                }

                let scope = Environment::with_parent(closure);
                for (parameter, argument) in declaration.parameters.iter().zip(arguments) {
                    scope.define(&parameter.name, argument);
                }
                tracing::trace!(function = %declaration.name.name, depth = self.call_depth + 1, "call");

                let caller = mem::replace(&mut self.env, scope);
                self.call_depth += 1;
                let outcome = declaration
                    .body
                    .iter()
                    .try_for_each(|statement| self.execute_statement(statement));
                self.call_depth -= 1;
                self.env = caller;

                match outcome {
                    Ok(()) => Ok(RuntimeObject::None),
                    Err(Unwind::Flow(ControlSignal::Return(value))) => Ok(value),
                    Err(Unwind::Flow(signal)) => {
                        tracing::warn!(?signal, function = %declaration.name.name, "loop signal escaped function body");
                        Ok(RuntimeObject::None)
                    }
                    Err(other) => Err(other),
                }
            }
            Callable::External(function) => {
                if !function.arity.accepts(arguments.len()) {
                    return Err(Unwind::error(
                        RuntimeErrorKind::InvalidNumberOfArguments {
                            name: function.name.clone(),
                            expected: function.arity.to_string(),
                            received: arguments.len(),
                        },
                        location,
                    ));
                }
                tracing::trace!(function = %function.name, "external call");
                (function.func)(self.recorder.clock_mut(), &arguments).map_err(|error| {
                    Unwind::error(
                        RuntimeErrorKind::LogicError {
                            function: function.name.clone(),
                            message: error.message,
                        },
                        location,
                    )
                })
            }
        }
    }
}

/// Location of the operand responsible for a binary operator failure.
fn blame(
    kind: &RuntimeErrorKind,
    left: &RuntimeObject,
    (left_location, right_location): (Location, Location),
    whole: Location,
) -> Location {
    match kind {
        RuntimeErrorKind::DivisionByZero { .. } => right_location,
        RuntimeErrorKind::TypeError { operator, .. } => {
            let left_fits = match left {
                RuntimeObject::Number(_) => true,
                RuntimeObject::String(_) => operator == "+",
                _ => false,
            };
            if left_fits {
                right_location
            } else {
                left_location
            }
        }
        _ => whole,
    }
}
