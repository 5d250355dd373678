//! Integration tests for the Jiki executor.
//!
//! Programs are parsed with `jiki-parser` and run to completion; assertions
//! are made on the recorded frames:
//! - frames per construct (statements, blocks, conditions, loops, calls)
//! - scoping, shadowing and constants
//! - operator guards and runtime error kinds
//! - runaway protection
//! - external functions and the virtual clock
//! - snapshot isolation and determinism

use jiki_eval::{
    Arity, ConditionConstruct, EvaluationResult, ExecutionMode, Executor, ExternalFunction, Frame,
    FrameStatus, LogicError, RuntimeObject,
};
use jiki_types::{LanguageFeatures, RuntimeErrorKind, DEFAULT_MAX_CALL_DEPTH};
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn run_with(source: &str, features: LanguageFeatures, externals: &[ExternalFunction]) -> Vec<Frame> {
    let statements = jiki_parser::parse(source, &features).expect("program should parse");
    let mut executor = Executor::new(source, features, externals, ExecutionMode::Standard);
    executor.execute(&statements);
    executor.into_frames()
}

fn run(source: &str) -> Vec<Frame> {
    run_with(source, LanguageFeatures::default(), &[])
}

fn value(frame: &Frame) -> RuntimeObject {
    frame
        .result
        .as_ref()
        .and_then(|result| result.value())
        .cloned()
        .expect("frame should carry a value")
}

fn error_kind(frame: &Frame) -> &RuntimeErrorKind {
    assert_eq!(frame.status, FrameStatus::Error, "expected an ERROR frame: {frame:?}");
    &frame.error.as_ref().expect("ERROR frame without error").kind
}

fn last(frames: &[Frame]) -> &Frame {
    frames.last().expect("no frames recorded")
}

fn num(n: f64) -> RuntimeObject {
    RuntimeObject::Number(n)
}

fn list(values: &[f64]) -> RuntimeObject {
    RuntimeObject::list(values.iter().copied().map(RuntimeObject::Number).collect())
}

fn all_success(frames: &[Frame]) -> bool {
    frames.iter().all(|f| f.status == FrameStatus::Success)
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements & blocks
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_outer_variable_visible_in_block() {
    let frames = run("let x = 10;\n{\n  x;\n}");
    assert_eq!(frames.len(), 2);
    assert!(all_success(&frames));
    assert_eq!(frames[1].variables["x"], num(10.0));
    assert_eq!(frames[1].line, 3);
    assert_eq!(frames[1].code, "x;");
}

#[test]
fn test_block_variable_dropped_after_block() {
    let frames = run("{\n  let y = 1;\n}\ny;");
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].status, FrameStatus::Success);
    assert_eq!(frames[0].variables["y"], num(1.0));

    assert_eq!(frames[1].status, FrameStatus::Success);
    assert_eq!(
        frames[1].result,
        Some(EvaluationResult::BlockExit {
            dropped: vec!["y".to_string()]
        })
    );
    assert!(frames[1].prior_variables.contains_key("y"));
    assert!(!frames[1].variables.contains_key("y"));

    assert_eq!(
        error_kind(&frames[2]),
        &RuntimeErrorKind::VariableNotDeclared { name: "y".into() }
    );
    assert_eq!(frames[2].line, 4);
}

#[test]
fn test_declaration_records_prior_and_current_variables() {
    let frames = run("let a = 1;\nlet b = a + 1;");
    assert_eq!(frames.len(), 2);
    assert!(!frames[1].prior_variables.contains_key("b"));
    assert_eq!(frames[1].variables["b"], num(2.0));
    assert_eq!(value(&frames[1]), num(2.0));
}

#[test]
fn test_uninitialized_variable_is_null() {
    let frames = run("let x;\nx;");
    assert_eq!(value(&frames[1]), RuntimeObject::None);
}

#[test]
fn test_assignment_records_previous_value() {
    let frames = run("let x = 1;\nx = x + 4;");
    match frames[1].result.as_ref() {
        Some(EvaluationResult::Assignment {
            name,
            previous,
            value,
            ..
        }) => {
            assert_eq!(name, "x");
            assert_eq!(previous, &num(1.0));
            assert_eq!(value, &num(5.0));
        }
        other => panic!("expected an assignment result, got {other:?}"),
    }
}

#[test]
fn test_assignment_to_undeclared_variable() {
    let frames = run("x = 1;");
    assert_eq!(frames.len(), 1);
    assert_eq!(
        error_kind(&frames[0]),
        &RuntimeErrorKind::VariableNotDeclared { name: "x".into() }
    );
}

#[test]
fn test_constant_reassignment() {
    let frames = run("const x = 1;\nx = 2;");
    assert_eq!(
        error_kind(&frames[1]),
        &RuntimeErrorKind::ConstantReassignment { name: "x".into() }
    );
    assert_eq!(frames[1].variables["x"], num(1.0));
}

#[test]
fn test_redeclaration_in_same_scope() {
    let frames = run("let x = 1;\nlet x = 2;");
    assert_eq!(
        error_kind(&frames[1]),
        &RuntimeErrorKind::VariableAlreadyDeclared { name: "x".into() }
    );
}

#[test]
fn test_shadowing_disabled_by_default() {
    let frames = run("let x = 1;\n{\n  let x = 2;\n}");
    assert_eq!(frames.len(), 2);
    assert_eq!(
        error_kind(&frames[1]),
        &RuntimeErrorKind::ShadowingDisabled { name: "x".into() }
    );
}

#[test]
fn test_shadowing_when_allowed() {
    let features = LanguageFeatures {
        allow_shadowing: true,
        ..LanguageFeatures::default()
    };
    let frames = run_with("let x = 1;\n{\n  let x = 2;\n  x;\n}\nx;", features, &[]);
    assert!(all_success(&frames));
    assert_eq!(frames.len(), 5);
    assert_eq!(value(&frames[2]), num(2.0));
    assert_eq!(value(&frames[4]), num(1.0));
}

#[test]
fn test_no_frames_after_error() {
    let frames = run("let x = 1;\nx = y;\nlet z = 2;");
    assert_eq!(frames.len(), 2);
    assert_eq!(last(&frames).status, FrameStatus::Error);
    assert!(!last(&frames).variables.contains_key("z"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Conditions & loops
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_if_records_condition_then_branch() {
    let frames = run("let x = 5;\nif (x > 3) {\n  x = 1;\n} else {\n  x = 2;\n}");
    assert_eq!(frames.len(), 3);
    match frames[1].result.as_ref() {
        Some(EvaluationResult::Condition {
            construct, value, ..
        }) => {
            assert_eq!(*construct, ConditionConstruct::If);
            assert_eq!(value, &RuntimeObject::Boolean(true));
        }
        other => panic!("expected a condition result, got {other:?}"),
    }
    assert_eq!(frames[1].code, "x > 3");
    assert_eq!(frames[2].variables["x"], num(1.0));
}

#[test]
fn test_else_branch() {
    let frames = run("let x = 1;\nif (x > 3) {\n  x = 1;\n} else {\n  x = 2;\n}");
    assert_eq!(last(&frames).variables["x"], num(2.0));
}

#[test]
fn test_while_frames_per_iteration() {
    let frames = run("let i = 0;\nwhile (i < 3) {\n  i = i + 1;\n}");
    // Declaration, three rounds of condition and body, and the final
    // false condition.
    assert_eq!(frames.len(), 8);
    assert_eq!(value(last(&frames)), RuntimeObject::Boolean(false));
    assert_eq!(last(&frames).variables["i"], num(3.0));
}

#[test]
fn test_for_loop_scope_and_frames() {
    let frames = run("let sum = 0;\nfor (let i = 0; i < 3; i = i + 1) {\n  sum = sum + i;\n}\nsum;");
    assert_eq!(frames.len(), 13);
    assert_eq!(value(last(&frames)), num(3.0));
    assert!(!last(&frames).variables.contains_key("i"));
    assert!(frames[1].variables.contains_key("i"));
}

#[test]
fn test_for_without_condition_records_implicit_true() {
    let frames = run("for (let i = 0; ; i = i + 1) {\n  if (i == 1) {\n    break;\n  }\n}");
    match frames[1].result.as_ref() {
        Some(EvaluationResult::Condition {
            construct,
            condition,
            value,
        }) => {
            assert_eq!(*construct, ConditionConstruct::For);
            assert!(condition.is_none());
            assert_eq!(value, &RuntimeObject::Boolean(true));
        }
        other => panic!("expected a condition result, got {other:?}"),
    }
    assert_eq!(last(&frames).result, Some(EvaluationResult::Break));
}

#[test]
fn test_break_stops_loop() {
    let frames = run("for (let i = 0; i < 5; i = i + 1) {\n  if (i == 2) {\n    break;\n  }\n}");
    assert_eq!(frames.len(), 10);
    assert_eq!(last(&frames).result, Some(EvaluationResult::Break));
}

#[test]
fn test_continue_skips_rest_of_body() {
    let frames = run(
        "let odd = 0;\nfor (let i = 0; i < 4; i = i + 1) {\n  if (i % 2 == 0) {\n    continue;\n  }\n  odd = odd + 1;\n}\nodd;",
    );
    assert!(all_success(&frames));
    assert_eq!(value(last(&frames)), num(2.0));
    assert!(frames
        .iter()
        .any(|f| f.result == Some(EvaluationResult::Continue)));
}

#[test]
fn test_block_exit_recorded_when_breaking_out() {
    let frames = run("while (true) {\n  let a = 1;\n  break;\n}");
    assert_eq!(frames.len(), 4);
    assert_eq!(frames[2].result, Some(EvaluationResult::Break));
    assert_eq!(
        frames[3].result,
        Some(EvaluationResult::BlockExit {
            dropped: vec!["a".to_string()]
        })
    );
}

#[test]
fn test_condition_must_be_boolean() {
    let frames = run("if (1) {\n}");
    assert_eq!(frames.len(), 1);
    assert_eq!(
        error_kind(&frames[0]),
        &RuntimeErrorKind::TruthinessDisabled {
            value: "1".into(),
            found: "number".into()
        }
    );
}

#[test]
fn test_truthiness_when_allowed() {
    let features = LanguageFeatures {
        allow_truthiness: true,
        ..LanguageFeatures::default()
    };
    let frames = run_with("let x = 0;\nif (\"text\") {\n  x = 1;\n}", features, &[]);
    assert!(all_success(&frames));
    assert_eq!(last(&frames).variables["x"], num(1.0));
}

#[test]
fn test_max_iterations_reached() {
    let features = LanguageFeatures {
        max_total_loop_iterations: 5,
        ..LanguageFeatures::default()
    };
    let frames = run_with("while (true) {\n}", features, &[]);
    assert_eq!(frames.len(), 7);
    assert_eq!(
        error_kind(last(&frames)),
        &RuntimeErrorKind::MaxIterationsReached { max: 5 }
    );
}

#[test]
fn test_iterations_counted_across_loops() {
    let features = LanguageFeatures {
        max_total_loop_iterations: 4,
        ..LanguageFeatures::default()
    };
    let source = "for (let i = 0; i < 3; i = i + 1) {\n}\nfor (let j = 0; j < 3; j = j + 1) {\n}";
    let frames = run_with(source, features, &[]);
    assert_eq!(
        error_kind(last(&frames)),
        &RuntimeErrorKind::MaxIterationsReached { max: 4 }
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators & values
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_float_addition_is_rounded() {
    let frames = run("let x = 0.1 + 0.2;");
    assert_eq!(value(&frames[0]), num(0.3));
}

#[test]
fn test_precedence_and_power() {
    let frames = run("2 + 3 * 2 ** 2;");
    assert_eq!(value(&frames[0]), num(14.0));
}

#[test]
fn test_type_error_on_mixed_addition() {
    let frames = run("1 + \"a\";");
    assert_eq!(
        error_kind(&frames[0]),
        &RuntimeErrorKind::TypeError {
            operator: "+".into(),
            expected: "two numbers or two strings".into(),
            found: "number and string".into(),
        }
    );
}

#[test]
fn test_type_coercion_when_allowed() {
    let features = LanguageFeatures {
        allow_type_coercion: true,
        ..LanguageFeatures::default()
    };
    let frames = run_with("\"score: \" + 10;", features, &[]);
    assert_eq!(value(&frames[0]), RuntimeObject::string("score: 10"));
}

#[test]
fn test_division_by_zero() {
    let frames = run("1 / 0;");
    assert_eq!(
        error_kind(&frames[0]),
        &RuntimeErrorKind::DivisionByZero {
            operator: "/".into()
        }
    );
}

#[test]
fn test_lists_cannot_be_compared() {
    let frames = run("[1] == [1];");
    assert_eq!(
        error_kind(&frames[0]),
        &RuntimeErrorKind::ListsCannotBeCompared {
            operator: "==".into()
        }
    );
}

#[test]
fn test_short_circuit_skips_right_side() {
    let frames = run("false && missing;");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].status, FrameStatus::Success);
    match frames[0].result.as_ref() {
        Some(EvaluationResult::Expression { expression, .. }) => match expression.as_ref() {
            EvaluationResult::Logical { right, value, .. } => {
                assert!(right.is_none());
                assert_eq!(value, &RuntimeObject::Boolean(false));
            }
            other => panic!("expected a logical result, got {other:?}"),
        },
        other => panic!("expected an expression result, got {other:?}"),
    }
}

#[test]
fn test_string_and_list_indexing() {
    let frames = run("let l = [1, 2, 3];\nl[1];\n\"abc\"[2];\nl.length;\n\"héllo\".length;");
    assert!(all_success(&frames));
    assert_eq!(value(&frames[1]), num(2.0));
    assert_eq!(value(&frames[2]), RuntimeObject::string("c"));
    assert_eq!(value(&frames[3]), num(3.0));
    assert_eq!(value(&frames[4]), num(5.0));
}

#[test]
fn test_index_errors() {
    let frames = run("let l = [1, 2];\nl[2];");
    assert_eq!(
        error_kind(&frames[1]),
        &RuntimeErrorKind::IndexOutOfRange {
            index: 2,
            length: 2
        }
    );

    let frames = run("let l = [1, 2];\nl[0.5];");
    assert_eq!(
        error_kind(&frames[1]),
        &RuntimeErrorKind::InvalidIndex {
            index: "0.5".into()
        }
    );

    let frames = run("5[0];");
    assert_eq!(
        error_kind(&frames[0]),
        &RuntimeErrorKind::NotSubscriptable {
            found: "number".into()
        }
    );
}

#[test]
fn test_property_not_found() {
    let frames = run("true.length;");
    assert_eq!(
        error_kind(&frames[0]),
        &RuntimeErrorKind::PropertyNotFound {
            property: "length".into(),
            found: "boolean".into()
        }
    );
}

#[test]
fn test_subscript_assignment_mutates_in_place() {
    let frames = run("let a = [1, 2];\nlet b = a;\nb[0] = 5;\na;");
    assert!(all_success(&frames));
    assert_eq!(value(last(&frames)), list(&[5.0, 2.0]));
    match frames[2].result.as_ref() {
        Some(EvaluationResult::SubscriptAssignment {
            previous,
            value,
            list: after,
            ..
        }) => {
            assert_eq!(previous, &num(1.0));
            assert_eq!(value, &num(5.0));
            assert_eq!(after, &list(&[5.0, 2.0]));
        }
        other => panic!("expected a subscript assignment, got {other:?}"),
    }
}

#[test]
fn test_snapshots_survive_later_mutation() {
    let frames = run("let a = [1, 2];\na[0] = 9;\na[1] = 8;");
    assert_eq!(frames[0].variables["a"], list(&[1.0, 2.0]));
    assert_eq!(frames[1].variables["a"], list(&[9.0, 2.0]));
    assert_eq!(value(&frames[0]), list(&[1.0, 2.0]));
    assert_eq!(frames[2].variables["a"], list(&[9.0, 8.0]));
}

#[test]
fn test_nested_snapshots_survive_mutation_through_alias() {
    let frames = run("let a = [[1]];\nlet b = a[0];\nb[0] = 9;");
    assert!(all_success(&frames));
    assert_eq!(frames[0].variables["a"].to_string(), "[[1]]");
    assert_eq!(frames[1].variables["a"].to_string(), "[[1]]");
    assert_eq!(frames[1].variables["b"].to_string(), "[1]");
    assert_eq!(frames[2].prior_variables["a"].to_string(), "[[1]]");
    assert_eq!(frames[2].variables["a"].to_string(), "[[9]]");
}

#[test]
fn test_list_cannot_be_stored_inside_itself() {
    let frames = run("let a = [1];\na[0] = a;");
    assert_eq!(frames.len(), 2);
    assert_eq!(error_kind(&frames[1]), &RuntimeErrorKind::CircularList);
    assert_eq!(frames[1].code, "a[0] = a;");
    assert_eq!(frames[1].variables["a"], list(&[1.0]));

    let frames = run("let a = [1];\na[0] = [a];");
    assert_eq!(error_kind(last(&frames)), &RuntimeErrorKind::CircularList);
}

#[test]
fn test_indirect_list_cycle_rejected() {
    let frames = run("let a = [1];\nlet b = [a];\na[0] = b;");
    assert_eq!(frames.len(), 3);
    assert_eq!(error_kind(&frames[2]), &RuntimeErrorKind::CircularList);

    // Nesting one list in another is fine.
    let frames = run("let a = [1, 2];\nlet b = [0];\na[0] = b;\nb[0] = a[1];");
    assert!(all_success(&frames));
    assert_eq!(last(&frames).variables["a"].to_string(), "[[2], 2]");
}

#[test]
fn test_subscript_assignment_requires_list() {
    let frames = run("let s = \"abc\";\ns[0] = \"x\";");
    assert_eq!(
        error_kind(&frames[1]),
        &RuntimeErrorKind::TypeError {
            operator: "[]=".into(),
            expected: "a list".into(),
            found: "string".into(),
        }
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_user_function_frames() {
    let frames = run("function add(a, b) {\n  return a + b;\n}\nlet r = add(2, 3);");
    assert_eq!(frames.len(), 3);
    assert_eq!(
        frames[0].result,
        Some(EvaluationResult::FunctionDeclaration {
            name: "add".into(),
            parameters: vec!["a".into(), "b".into()],
        })
    );
    // The return inside the body is recorded before the calling statement.
    assert_eq!(frames[1].line, 2);
    assert_eq!(value(&frames[1]), num(5.0));
    assert_eq!(frames[1].variables["a"], num(2.0));
    assert_eq!(frames[2].line, 4);
    assert_eq!(value(&frames[2]), num(5.0));
    assert!(!frames[2].variables.contains_key("a"));
}

#[test]
fn test_function_without_return_yields_null() {
    let frames = run("function f() {\n}\nlet r = f();");
    assert_eq!(value(last(&frames)), RuntimeObject::None);
}

#[test]
fn test_closure_keeps_state() {
    let source = "function counter() {\n  let count = 0;\n  function next() {\n    count = count + 1;\n    return count;\n  }\n  return next;\n}\nconst c = counter();\nc();\nlet v = c();";
    let frames = run(source);
    assert!(all_success(&frames));
    assert_eq!(value(last(&frames)), num(2.0));
}

#[test]
fn test_wrong_argument_count_for_user_function() {
    let frames = run("function f(a) {\n}\nf();");
    assert_eq!(
        error_kind(last(&frames)),
        &RuntimeErrorKind::InvalidNumberOfArguments {
            name: "f".into(),
            expected: "1".into(),
            received: 0,
        }
    );
}

#[test]
fn test_not_callable() {
    let frames = run("let x = 1;\nx();");
    assert_eq!(
        error_kind(&frames[1]),
        &RuntimeErrorKind::NotCallable {
            name: "x".into(),
            found: "number".into()
        }
    );
}

#[test]
fn test_max_call_depth() {
    let features = LanguageFeatures {
        max_call_depth: 10,
        ..LanguageFeatures::default()
    };
    let frames = run_with("function f() {\n  return f();\n}\nf();", features, &[]);
    assert_eq!(frames.len(), 2);
    assert_eq!(
        error_kind(last(&frames)),
        &RuntimeErrorKind::MaxCallDepthExceeded { max: 10 }
    );
}

fn countdown(n: usize) -> String {
    format!(
        "function f(n) {{\n  if (n == 0) {{\n    return 0;\n  }}\n  return 1 + f(n - 1);\n}}\nlet r = f({n});"
    )
}

#[test]
fn test_recursion_reaches_default_call_depth() {
    let depth = DEFAULT_MAX_CALL_DEPTH - 1;
    let frames = run(&countdown(depth));
    assert!(all_success(&frames));
    assert_eq!(last(&frames).variables["r"], num(depth as f64));

    let frames = run(&countdown(DEFAULT_MAX_CALL_DEPTH));
    assert_eq!(
        error_kind(last(&frames)),
        &RuntimeErrorKind::MaxCallDepthExceeded {
            max: DEFAULT_MAX_CALL_DEPTH
        }
    );
}

#[test]
fn test_call_function_by_name() {
    let source = "function double(n) {\n  return n * 2;\n}";
    let features = LanguageFeatures::default();
    let statements = jiki_parser::parse(source, &features).unwrap();
    let mut executor = Executor::new(source, features, &[], ExecutionMode::Standard);
    executor.execute(&statements);
    let result = executor.call_function("double", vec![num(4.0)]);
    assert_eq!(result, Some(num(8.0)));
    let frames = executor.frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[2].code, "double");
    assert_eq!(value(&frames[2]), num(8.0));

    assert_eq!(executor.call_function("missing", vec![]), None);
    assert_eq!(
        error_kind(last(executor.frames())),
        &RuntimeErrorKind::VariableNotDeclared {
            name: "missing".into()
        }
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// External functions & time
// ══════════════════════════════════════════════════════════════════════════════

fn move_function() -> ExternalFunction {
    ExternalFunction::new("move", Arity::Exact(0), "moves the character one step", |_, _| {
        Ok(RuntimeObject::None)
    })
}

fn wait_function() -> ExternalFunction {
    ExternalFunction::new("wait", Arity::Exact(0), "waits a while", |context, _| {
        context.fast_forward(100.0);
        Ok(RuntimeObject::None)
    })
}

#[test]
fn test_external_arity_mismatch_is_single_error_frame() {
    let frames = run_with("move(1);", LanguageFeatures::default(), &[move_function()]);
    assert_eq!(frames.len(), 1);
    assert_eq!(
        error_kind(&frames[0]),
        &RuntimeErrorKind::InvalidNumberOfArguments {
            name: "move".into(),
            expected: "0".into(),
            received: 1,
        }
    );
}

#[test]
fn test_external_call_and_description() {
    let frames = run_with("move();", LanguageFeatures::default(), &[move_function()]);
    assert!(all_success(&frames));
    assert!(frames[0].variables.is_empty());
    let description = frames[0].description().expect("standard mode describes");
    assert_eq!(description.result, "Called `move`.");
    assert_eq!(
        description.steps,
        vec!["Used the `move` function, which moves the character one step, with no inputs."
            .to_string()]
    );
}

#[test]
fn test_external_logic_error() {
    let fail = ExternalFunction::new("explode", Arity::Range { min: 0, max: None }, "", |_, _| {
        Err(LogicError::new("the wall is in the way"))
    });
    let frames = run_with("let a = 1;\nexplode(a, 2);", LanguageFeatures::default(), &[fail]);
    assert_eq!(
        error_kind(&frames[1]),
        &RuntimeErrorKind::LogicError {
            function: "explode".into(),
            message: "the wall is in the way".into(),
        }
    );
}

#[test]
fn test_external_receives_argument_values() {
    let total = ExternalFunction::new("total", Arity::Exact(1), "adds up a list", |_, args| {
        match &args[0] {
            RuntimeObject::List(items) => Ok(RuntimeObject::Number(
                items.borrow().iter().filter_map(RuntimeObject::as_number).sum(),
            )),
            _ => Err(LogicError::new("expected a list")),
        }
    });
    let frames = run_with("let t = total([1, 2, 3]);", LanguageFeatures::default(), &[total]);
    assert_eq!(value(&frames[0]), num(6.0));
}

#[test]
fn test_fast_forward_shifts_later_frames() {
    let frames = run_with("wait();\n1;", LanguageFeatures::default(), &[wait_function()]);
    // A frame is stamped once its statement has finished running.
    assert_eq!(frames[0].time, 100.0);
    assert_eq!(frames[1].time, 100.01);
    assert_eq!(frames[1].timeline_time, 10001);
}

#[test]
fn test_max_total_execution_time() {
    let features = LanguageFeatures {
        max_total_execution_time: 250,
        ..LanguageFeatures::default()
    };
    let frames = run_with("while (true) {\n  wait();\n}", features, &[wait_function()]);
    assert_eq!(
        error_kind(last(&frames)),
        &RuntimeErrorKind::MaxTotalExecutionTimeReached { max: 250 }
    );
}

#[test]
fn test_timeline_strictly_increasing() {
    let frames = run("let i = 0;\nwhile (i < 5) {\n  i = i + 1;\n}");
    for pair in frames.windows(2) {
        assert!(pair[0].timeline_time < pair[1].timeline_time);
        assert!(pair[0].time < pair[1].time);
    }
}

#[test]
fn test_huge_fast_forward_keeps_timeline_increasing() {
    let wait = ExternalFunction::new("wait", Arity::Exact(1), "waits a while", |context, args| {
        context.fast_forward(args[0].as_number().unwrap_or(0.0));
        Ok(RuntimeObject::None)
    });
    let sleep = ExternalFunction::new("sleep", Arity::Exact(0), "sleeps for ages", |context, _| {
        context.fast_forward(1e300);
        Ok(RuntimeObject::None)
    });
    let frames = run_with(
        "wait(1);\nsleep();\nwait(1);\n1;",
        LanguageFeatures::default(),
        &[wait, sleep],
    );
    assert_eq!(frames.len(), 4);
    assert!(all_success(&frames));
    for pair in frames.windows(2) {
        assert!(pair[0].timeline_time < pair[1].timeline_time);
        assert!(pair[0].time < pair[1].time);
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Modes & determinism
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_testing_mode_describes_eagerly() {
    let source = "let x = 2;";
    let features = LanguageFeatures::default();
    let statements = jiki_parser::parse(source, &features).unwrap();
    let mut executor = Executor::new(source, features, &[], ExecutionMode::Testing);
    executor.execute(&statements);
    let json = serde_json::to_value(&executor.frames()[0]).unwrap();
    assert_eq!(
        json["description"]["result"],
        "Created a variable called `x` holding 2."
    );
}

#[test]
fn test_execution_determinism_100_iterations() {
    let source = "let l = [1, 2];\nfunction f(n) {\n  return n * 3;\n}\nfor (let i = 0; i < 2; i = i + 1) {\n  l[i] = f(l[i]);\n}\nl;";
    let first = serde_json::to_string(&run(source)).unwrap();
    for i in 0..100 {
        let json = serde_json::to_string(&run(source)).unwrap();
        assert_eq!(first, json, "Determinism failure at iteration {i}");
    }
}
