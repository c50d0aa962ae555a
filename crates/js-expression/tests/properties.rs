//! Property tests over number literals, operator precedence and repeat
//! compilation, plus sharing one evaluator across threads.

use js_expression::{compile_expression, Value};
use proptest::prelude::*;
use serde_json::json;
use std::thread;

fn eval(source: &str) -> Value {
    compile_expression(source)
        .unwrap_or_else(|e| panic!("compile({}) failed: {}", source, e))
        .evaluate(None)
        .unwrap()
}

const SOURCES: &[&str] = &[
    "a + b",
    "a * b - a / (b || 1)",
    "a < b ? 'lt' : a == b ? 'eq' : 'gt'",
    "[a, , b, {a: a, 'b c': b}]",
    "a && b || -a",
    "x.y[a] + !b",
];

proptest! {
    #[test]
    fn integer_literals_decode_exactly(n in 0u64..9_007_199_254_740_991) {
        prop_assert_eq!(eval(&n.to_string()), Value::Number(n as f64));
    }

    #[test]
    fn decimal_literals_match_float_parsing(
        int in 0u32..100_000,
        frac in 0u32..100_000,
        exp in -30i32..30,
    ) {
        let source = format!("{}.{}e{}", int, frac, exp);
        let expected: f64 = source.parse().unwrap();
        prop_assert_eq!(eval(&source), Value::Number(expected));
    }

    #[test]
    fn plain_strings_decode_verbatim(s in "[a-zA-Z0-9 _$.,:;]{0,24}") {
        prop_assert_eq!(eval(&format!("'{}'", s)), Value::from(s.as_str()));
        prop_assert_eq!(eval(&format!("\"{}\"", s)), Value::from(s.as_str()));
    }

    #[test]
    fn multiplicative_binds_tighter(
        a in 0i32..1000,
        b in 0i32..1000,
        c in 0i32..1000,
        ops in prop::sample::select(vec![("+", "*"), ("-", "*"), ("*", "+"), ("*", "-"), ("+", "-"), ("-", "+")]),
    ) {
        let (a, b, c) = (a as f64, b as f64, c as f64);
        let apply = |op: &str, x: f64, y: f64| match op {
            "+" => x + y,
            "-" => x - y,
            _ => x * y,
        };
        let (op1, op2) = ops;
        let expected = if op2 == "*" && op1 != "*" {
            apply(op1, a, apply(op2, b, c))
        } else {
            apply(op2, apply(op1, a, b), c)
        };
        let source = format!("{} {} {} {} {}", a, op1, b, op2, c);
        prop_assert_eq!(eval(&source), Value::Number(expected));
    }

    #[test]
    fn recompiling_is_deterministic(
        index in 0..SOURCES.len(),
        a in -50i32..50,
        b in -50i32..50,
    ) {
        let source = SOURCES[index];
        let first = compile_expression(source).unwrap();
        let second = compile_expression(source).unwrap();
        prop_assert_eq!(first.to_string(), second.to_string());

        let context = Value::from(json!({"a": a, "b": b, "x": {"y": {"0": 7}}}));
        let left = first.evaluate(Some(&context)).unwrap();
        let right = second.evaluate(Some(&context)).unwrap();
        prop_assert_eq!(left.to_json(), right.to_json());
    }
}

#[test]
fn evaluator_is_shared_across_threads() {
    let evaluator = compile_expression("items[i] * factor + i").unwrap();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let evaluator = evaluator.clone();
            thread::spawn(move || {
                let context = Value::from(json!({"items": [10, 20, 30, 40, 50, 60, 70, 80], "i": i, "factor": 2}));
                (0..100)
                    .map(|_| evaluator.evaluate(Some(&context)).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let expected = Value::from(((i + 1) * 10 * 2 + i) as f64);
        for result in handle.join().unwrap() {
            assert_eq!(result, expected);
        }
    }
}
