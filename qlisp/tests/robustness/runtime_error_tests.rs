// qlisp Runtime Error Handling Tests
// Errors are ordinary values: they render, compare and propagate like data.

use pretty_assertions::assert_eq;
use qlisp::{Evaluator, Runtime, Value};

/// Test runner for runtime error tests
struct RuntimeErrorTestRunner {
    runtime: Runtime,
}

impl RuntimeErrorTestRunner {
    fn new() -> Self {
        Self {
            runtime: Runtime::with_evaluator(Evaluator::with_output(Box::new(std::io::sink()))),
        }
    }

    fn run_error_test(&mut self, source: &str, expected_message: &str) -> Result<(), String> {
        let value = self
            .runtime
            .evaluate_line(source)
            .map_err(|e| format!("Parse error: {}", e))?;
        match value {
            Value::Error(message) if message == expected_message => Ok(()),
            Value::Error(message) => Err(format!(
                "{:?}: expected error {:?}, got {:?}",
                source, expected_message, message
            )),
            other => Err(format!("{:?}: expected an error, got {}", source, other)),
        }
    }

    fn run_all(&mut self, cases: &[(&str, &str)]) {
        let failures: Vec<String> = cases
            .iter()
            .filter_map(|(source, expected)| self.run_error_test(source, expected).err())
            .collect();
        assert!(failures.is_empty(), "failed cases:\n{}", failures.join("\n"));
    }
}

#[test]
fn test_type_and_arity_errors() {
    RuntimeErrorTestRunner::new().run_all(&[
        (
            "head 1",
            "Function 'head' passed incorrect type for argument 0. Got Number, Expected Q-Expression.",
        ),
        (
            "eval \"x\"",
            "Function 'eval' passed incorrect type for argument 0. Got String, Expected Q-Expression.",
        ),
        (
            "if 1 {2}",
            "Function 'if' passed incorrect number of arguments. Got 2, Expected 3.",
        ),
        (
            "== 1",
            "Function '==' passed incorrect number of arguments. Got 1, Expected 2.",
        ),
        (
            "- 1 \"a\"",
            "Function '-' passed incorrect type for argument 1. Got String, Expected Number.",
        ),
        (
            "< + 1",
            "Function '<' passed incorrect type for argument 0. Got Function, Expected Number.",
        ),
        (
            "join {1} (list 2) 3",
            "Function 'join' passed incorrect type for argument 2. Got Number, Expected Q-Expression.",
        ),
    ]);
}

#[test]
fn test_evaluation_errors() {
    RuntimeErrorTestRunner::new().run_all(&[
        ("undefined-thing", "Unbound Symbol 'undefined-thing'"),
        (
            "1 2 3",
            "S-Expression starts with incorrect type. Got Number, Expected Function.",
        ),
        (
            "{+} 1",
            "S-Expression starts with incorrect type. Got Q-Expression, Expected Function.",
        ),
        ("/ 10 (- 2 2)", "Division by zero!!"),
        ("99999999999999999999", "Invalid number"),
        (
            "(\\ {x & y z} {x}) 1 2",
            "Function format invalid. Symbol '&' not followed by single symbol.",
        ),
    ]);
}

#[test]
fn test_first_error_in_an_expression_wins() {
    RuntimeErrorTestRunner::new().run_all(&[
        ("+ 1 (error \"boom\") (/ 1 0)", "boom"),
        ("+ 1 (/ 1 0) (error \"boom\")", "Division by zero!!"),
        ("list (head {}) nope", "Function 'head' passed {} for argument 0."),
    ]);
}

#[test]
fn test_error_values_are_data() {
    let mut runner = RuntimeErrorTestRunner::new();
    let rt = &mut runner.runtime;

    assert_eq!(rt.evaluate_line("def {e} (error \"x\")").unwrap(), Value::error("x"));
    // The failed def bound nothing.
    assert!(rt.evaluate_line("e").unwrap().is_error());

    assert_eq!(
        rt.evaluate_line("list {error \"not evaluated\"}").unwrap().to_string(),
        "{{error \"not evaluated\"}}"
    );
    assert_eq!(
        rt.evaluate_line("error \"boom\"").unwrap().to_string(),
        "Error : boom"
    );
}

#[test]
fn test_long_error_messages_are_bounded() {
    let mut runner = RuntimeErrorTestRunner::new();
    let long = "x".repeat(2000);
    let value = runner
        .runtime
        .evaluate_line(&format!("error \"{}\"", long))
        .unwrap();
    match value {
        Value::Error(message) => assert_eq!(message.len(), qlisp::runtime::values::MAX_ERROR_LEN),
        other => panic!("expected an error, got {}", other),
    }
}

#[test]
fn test_failed_calls_have_no_side_effects() {
    let mut runner = RuntimeErrorTestRunner::new();
    runner.run_all(&[(
        "def {a b} 1 (error \"late\")",
        "late",
    )]);
    runner.run_all(&[("a", "Unbound Symbol 'a'"), ("b", "Unbound Symbol 'b'")]);
}
