// Parser fuzz-style robustness tests
// Parsing and evaluating malformed or nonsensical input must never panic.

use qlisp::{parse, Evaluator, Runtime};

fn xorshift64(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

fn gen_case(seed: u64, max_len: usize) -> String {
    let tokens: [&str; 32] = [
        "(", ")", "{", "}", "(", ")", "{", "}", " ", "\n", "\"", ";", "\\", "&", "def", "=",
        "head", "tail", "join", "eval", "list", "if", "error", "0", "1", "-42", "+", "-", "*",
        "/", "==", "x",
    ];

    let mut out = String::new();
    let mut state = seed ^ 0x9E37_79B9_7F4A_7C15u64;
    let target_len = (state as usize % max_len).max(1);

    while out.len() < target_len {
        state = xorshift64(state);
        let tok = tokens[(state as usize) % tokens.len()];
        out.push_str(tok);
        out.push(' ');
    }
    out
}

#[test]
fn test_parser_never_panics_on_generated_inputs() {
    const CASES: u64 = 300;
    const MAX_LEN: usize = 256;

    for seed in 0..CASES {
        let input = gen_case(seed, MAX_LEN);
        let result = std::panic::catch_unwind(|| parse(&input));
        assert!(
            result.is_ok(),
            "parse panicked for seed {} input {:?}",
            seed,
            input
        );

        if let Ok(Err(err)) = result {
            assert!(!err.to_string().is_empty(), "empty parse error for {:?}", input);
        }
    }
}

#[test]
fn test_evaluating_generated_inputs_yields_values() {
    const CASES: u64 = 300;
    const MAX_LEN: usize = 128;

    for seed in 0..CASES {
        let input = gen_case(seed, MAX_LEN);
        let mut runtime = Runtime::with_evaluator(Evaluator::with_output(Box::new(std::io::sink())));
        if let Ok(value) = runtime.evaluate_line(&input) {
            // Rendering any result is total.
            let _ = value.to_string();
        }
    }
}

#[test]
fn test_unbalanced_inputs_are_rejected() {
    for input in ["(", ")", "{", "}", "(+ 1 2", "{1 2", "(}", "\"open"] {
        assert!(parse(input).is_err(), "{:?} should not parse", input);
    }
}
