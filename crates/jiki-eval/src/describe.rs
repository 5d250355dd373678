//! Plain-English narration of frames.
//!
//! [`describe_frame`] is a pure function of a frame's result, error and a
//! [`DescriptionContext`]. Steps run inside-out and left-to-right: a
//! composite node narrates its children before itself.

use std::collections::BTreeMap;

use jiki_types::ast::LogicalOperator;
use jiki_types::RuntimeError;
use serde::Serialize;

use crate::external::ExternalFunction;
use crate::object::RuntimeObject;
use crate::result::{ConditionConstruct, EvaluationResult};

/// Extra knowledge the narration needs beyond the frame itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionContext {
    /// External function name → phrase completing "which ...".
    pub function_descriptions: BTreeMap<String, String>,
}

impl DescriptionContext {
    pub fn from_external_functions(functions: &[ExternalFunction]) -> Self {
        Self {
            function_descriptions: functions
                .iter()
                .filter(|f| !f.description.is_empty())
                .map(|f| (f.name.clone(), f.description.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    /// One-sentence summary of what the frame did.
    pub result: String,
    /// The individual evaluation steps that led there.
    pub steps: Vec<String>,
}

pub fn describe_frame(
    result: Option<&EvaluationResult>,
    error: Option<&RuntimeError>,
    context: &DescriptionContext,
) -> Description {
    let mut steps = Vec::new();
    if let Some(result) = result {
        describe_steps(result, context, &mut steps);
    }
    let summary = match (error, result) {
        (Some(error), _) => format!("Something went wrong: {error}."),
        (None, Some(result)) => summarize(result),
        (None, None) => "Nothing happened.".to_string(),
    };
    Description {
        result: summary,
        steps,
    }
}

fn describe_steps(result: &EvaluationResult, context: &DescriptionContext, steps: &mut Vec<String>) {
    use EvaluationResult as R;

    match result {
        R::Literal { .. } | R::Break | R::Continue | R::BlockExit { .. } => {}
        R::FunctionDeclaration { .. } => {}

        R::Identifier { name, value } => {
            steps.push(format!("Looked up `{name}`, which is {value}."));
        }
        R::Binary {
            operator,
            left,
            right,
            value,
        } => {
            describe_steps(left, context, steps);
            describe_steps(right, context, steps);
            steps.push(format!(
                "Worked out {} {operator} {} to get {value}.",
                value_of(left),
                value_of(right)
            ));
        }
        R::Logical {
            operator,
            left,
            right,
            value,
        } => {
            describe_steps(left, context, steps);
            match right {
                Some(right) => {
                    describe_steps(right, context, steps);
                    steps.push(format!(
                        "Worked out {} {operator} {} to get {value}.",
                        value_of(left),
                        value_of(right)
                    ));
                }
                None => {
                    let decided = match operator {
                        LogicalOperator::And => "false",
                        LogicalOperator::Or => "true",
                    };
                    steps.push(format!(
                        "The left side of {operator} was {decided}, so the right side was skipped."
                    ));
                }
            }
        }
        R::Unary {
            operator,
            operand,
            value,
        } => {
            describe_steps(operand, context, steps);
            steps.push(format!(
                "Applied {operator} to {} to get {value}.",
                value_of(operand)
            ));
        }
        R::Grouping { inner, .. } => describe_steps(inner, context, steps),
        R::Call {
            function,
            arguments,
            value,
        } => {
            for argument in arguments {
                describe_steps(argument, context, steps);
            }
            let inputs = if arguments.is_empty() {
                "no inputs".to_string()
            } else {
                arguments
                    .iter()
                    .map(value_of)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            match context.function_descriptions.get(function) {
                Some(description) => steps.push(format!(
                    "Used the `{function}` function, which {description}, with {inputs}."
                )),
                None => steps.push(format!("Called `{function}` with {inputs}.")),
            }
            if !matches!(value, RuntimeObject::None) {
                steps.push(format!("`{function}` gave back {value}."));
            }
        }
        R::Member {
            object,
            property,
            value,
        } => {
            describe_steps(object, context, steps);
            steps.push(format!(
                "Read the {property} of {}, which is {value}.",
                value_of(object)
            ));
        }
        R::Subscript {
            object,
            index,
            value,
        } => {
            describe_steps(object, context, steps);
            describe_steps(index, context, steps);
            steps.push(format!(
                "Read the element at position {} of {}, which is {value}.",
                value_of(index),
                value_of(object)
            ));
        }
        R::List { elements, value } => {
            for element in elements {
                describe_steps(element, context, steps);
            }
            steps.push(format!("Created the list {value}."));
        }

        R::VariableDeclaration { initializer, .. } => {
            if let Some(initializer) = initializer {
                describe_steps(initializer, context, steps);
            }
        }
        R::Assignment { expression, .. } | R::Expression { expression, .. } => {
            describe_steps(expression, context, steps);
        }
        R::SubscriptAssignment {
            object,
            index,
            expression,
            ..
        } => {
            describe_steps(object, context, steps);
            describe_steps(index, context, steps);
            describe_steps(expression, context, steps);
        }
        R::Return { expression, .. } => {
            if let Some(expression) = expression {
                describe_steps(expression, context, steps);
            }
        }
        R::Condition { condition, .. } => {
            if let Some(condition) = condition {
                describe_steps(condition, context, steps);
            }
        }
    }
}

fn summarize(result: &EvaluationResult) -> String {
    use EvaluationResult as R;

    match result {
        R::VariableDeclaration {
            name,
            constant: true,
            value,
            ..
        } => format!("Created a constant called `{name}` holding {value}."),
        R::VariableDeclaration { name, value, .. } => {
            format!("Created a variable called `{name}` holding {value}.")
        }
        R::Assignment {
            name,
            previous,
            value,
            ..
        } => format!("Changed `{name}` from {previous} to {value}."),
        R::SubscriptAssignment {
            index,
            previous,
            value,
            list,
            ..
        } => format!(
            "Replaced {previous} at position {} with {value}, so the list is now {list}.",
            value_of(index)
        ),
        R::Expression { expression, value } => match expression.as_ref() {
            R::Call { function, .. } => format!("Called `{function}`."),
            _ => format!("Worked out the value {value}."),
        },
        R::FunctionDeclaration { name, parameters } if parameters.is_empty() => {
            format!("Defined a function called `{name}` with no inputs.")
        }
        R::FunctionDeclaration { name, parameters } => {
            let names: Vec<_> = parameters.iter().map(|p| format!("`{p}`")).collect();
            format!(
                "Defined a function called `{name}` with inputs {}.",
                names.join(", ")
            )
        }
        R::Return { value, .. } => format!("Returned {value} from the function."),
        R::Break => "Left the loop early.".to_string(),
        R::Continue => "Skipped to the next round of the loop.".to_string(),
        R::Condition {
            construct,
            condition: None,
            ..
        } => format!(
            "The `{}` loop has no condition, so it keeps going.",
            construct.keyword()
        ),
        R::Condition {
            construct, value, ..
        } => {
            let keyword = construct.keyword();
            match (construct, value) {
                (ConditionConstruct::If, _) => {
                    format!("The `{keyword}` condition was {value}.")
                }
                (_, RuntimeObject::Boolean(false)) => {
                    format!("The `{keyword}` condition was false, so the loop finished.")
                }
                _ => format!("The `{keyword}` condition was {value}, so the loop ran again."),
            }
        }
        R::BlockExit { dropped } => {
            let names: Vec<_> = dropped.iter().map(|d| format!("`{d}`")).collect();
            format!("Left the block, so {} no longer exist.", names.join(", "))
        }
        other => match other.value() {
            Some(value) => format!("Worked out the value {value}."),
            None => "Nothing happened.".to_string(),
        },
    }
}

fn value_of(result: &EvaluationResult) -> String {
    result
        .value()
        .map(ToString::to_string)
        .unwrap_or_else(|| "nothing".to_string())
}
