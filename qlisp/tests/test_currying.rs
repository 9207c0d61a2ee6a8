// Lambdas: currying, variadic formals and scope resolution

use pretty_assertions::assert_eq;
use qlisp::{Runtime, Value};

fn eval(runtime: &mut Runtime, line: &str) -> Value {
    runtime.evaluate_line(line).expect("Should parse successfully")
}

fn eval_str(runtime: &mut Runtime, line: &str) -> String {
    eval(runtime, line).to_string()
}

fn with_add() -> Runtime {
    let mut runtime = Runtime::new();
    assert_eq!(
        eval(&mut runtime, "def {add} (\\ {x y} {+ x y})"),
        Value::unit()
    );
    runtime
}

#[test]
fn test_full_application() {
    let mut rt = with_add();
    assert_eq!(eval(&mut rt, "add 1 2"), Value::Number(3));
    assert_eq!(eval(&mut rt, "(\\ {x y} {* x y}) 6 7"), Value::Number(42));
}

#[test]
fn test_partial_application_returns_curried_lambda() {
    let mut rt = with_add();
    assert_eq!(eval_str(&mut rt, "add 1"), "(\\ {y} {+ x y})");
    assert_eq!(eval(&mut rt, "(add 1) 2"), Value::Number(3));
    assert_eq!(eval(&mut rt, "((add 1) 2)"), Value::Number(3));
}

#[test]
fn test_stored_partial_is_reusable() {
    let mut rt = with_add();
    eval(&mut rt, "def {add-ten} (add 10)");
    assert_eq!(eval(&mut rt, "add-ten 1"), Value::Number(11));
    assert_eq!(eval(&mut rt, "add-ten 5"), Value::Number(15));
    // The stored original still needs both arguments.
    assert_eq!(eval_str(&mut rt, "add 7"), "(\\ {y} {+ x y})");
}

#[test]
fn test_lambda_equality_ignores_bound_arguments() {
    let mut rt = with_add();
    assert_eq!(eval(&mut rt, "== (add 1) (add 2)"), Value::Number(1));
    assert_eq!(eval(&mut rt, "== add (add 2)"), Value::Number(0));
}

#[test]
fn test_variadic_rest_argument() {
    let mut rt = Runtime::new();
    eval(&mut rt, "def {f} (\\ {x & xs} {xs})");
    assert_eq!(eval_str(&mut rt, "f 1 2 3"), "{2 3}");
    assert_eq!(eval_str(&mut rt, "f 1"), "{}");
    assert_eq!(eval_str(&mut rt, "(\\ {& xs} {xs}) 1 2"), "{1 2}");
}

#[test]
fn test_too_many_arguments() {
    let mut rt = with_add();
    assert_eq!(
        eval(&mut rt, "add 1 2 3"),
        Value::error("Function passed too many arguments. Got 3, Expected 2.")
    );
    assert_eq!(
        eval(&mut rt, "(add 1) 2 3"),
        Value::error("Function passed too many arguments. Got 2, Expected 1.")
    );
}

#[test]
fn test_free_variables_resolve_in_caller_scope() {
    let mut rt = Runtime::new();
    eval(&mut rt, "def {y} 10");
    eval(&mut rt, "def {g} (\\ {x} {+ x y})");
    assert_eq!(eval(&mut rt, "g 1"), Value::Number(11));
    eval(&mut rt, "def {y} 20");
    assert_eq!(eval(&mut rt, "g 1"), Value::Number(21));
}

#[test]
fn test_function_defining_helpers() {
    let mut rt = Runtime::new();
    eval(
        &mut rt,
        "def {fun} (\\ {args body} {def (head args) (\\ (tail args) body)})",
    );
    eval(&mut rt, "fun {add-together x y} {+ x y}");
    assert_eq!(eval(&mut rt, "add-together 1 2"), Value::Number(3));

    eval(&mut rt, "fun {unpack f xs} {eval (join (list f) xs)}");
    eval(&mut rt, "fun {pack f & xs} {f xs}");
    assert_eq!(eval(&mut rt, "unpack + {1 2 3}"), Value::Number(6));
    assert_eq!(eval_str(&mut rt, "pack head 5 6 7"), "{5}");
}

#[test]
fn test_higher_order_recursion() {
    let mut rt = Runtime::new();
    eval(
        &mut rt,
        "def {map} (\\ {f l} {if (== l {}) {{}} {join (list (f (eval (head l)))) (map f (tail l))}})",
    );
    assert_eq!(eval_str(&mut rt, "map (\\ {x} {* x x}) {1 2 3}"), "{1 4 9}");

    eval(
        &mut rt,
        "def {len} (\\ {l} {if (== l {}) {0} {+ 1 (len (tail l))}})",
    );
    assert_eq!(eval(&mut rt, "len {a b c d}"), Value::Number(4));
}
