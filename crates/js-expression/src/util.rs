//! JavaScript coercion and operator semantics over [`Value`].

use crate::ast::{BinaryOperator, UnaryOperator};
use crate::types::Value;
use js_expression_util::{is_whitespace, number_to_string};
use std::cmp::Ordering;

// ----------------------------------------------------------------- Coercions

/// JavaScript truthiness: `undefined`, `null`, `false`, `0`, `NaN` and `""`
/// are falsy; everything else, including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
    }
}

/// JavaScript `String(value)`.
pub fn to_js_string(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(*n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                None | Some(Value::Undefined) | Some(Value::Null) => String::new(),
                Some(v) => to_js_string(v),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        Value::Function(f) => format!("function {}() {{ [native code] }}", f.name()),
    }
}

/// Reduces arrays, objects and functions to their string form; primitives
/// pass through.
pub fn to_primitive(value: &Value) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) | Value::Function(_) => {
            Value::String(to_js_string(value))
        }
        other => other.clone(),
    }
}

/// JavaScript `Number(value)`.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => *n,
        Value::String(s) => string_to_number(s),
        Value::Array(_) | Value::Object(_) | Value::Function(_) => {
            to_number(&to_primitive(value))
        }
    }
}

fn string_to_number(s: &str) -> f64 {
    let s = s.trim_matches(is_whitespace);
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }
    // Rust also accepts "inf" and "nan" spellings, JavaScript does not.
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut n = 0.0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => n = n * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    n
}

/// Converts a computed member key to the property name it addresses.
pub fn property_key(value: &Value) -> String {
    to_js_string(value)
}

// ----------------------------------------------------------------- Members

/// Reads `key` from `object` without consulting any prototype chain.
///
/// Objects expose their own keys; arrays and strings expose `length` and
/// canonical indices. Everything else, and every miss, yields `undefined`.
pub fn get_member(object: &Value, key: &str) -> Value {
    match object {
        Value::Object(map) => map.get(key).cloned().unwrap_or_default(),
        Value::Array(items) => {
            if key == "length" {
                return Value::Number(items.len() as f64);
            }
            array_index(key)
                .and_then(|i| items.get(i))
                .and_then(|slot| slot.clone())
                .unwrap_or_default()
        }
        Value::String(s) => {
            if key == "length" {
                return Value::Number(s.encode_utf16().count() as f64);
            }
            array_index(key)
                .and_then(|i| s.encode_utf16().nth(i))
                .map(|unit| Value::String(String::from_utf16_lossy(&[unit])))
                .unwrap_or_default()
        }
        _ => Value::Undefined,
    }
}

/// `"3"` addresses index 3; `"03"`, `"3.0"` and `"-1"` address nothing.
fn array_index(key: &str) -> Option<usize> {
    key.parse::<usize>().ok().filter(|i| i.to_string() == key)
}

// ----------------------------------------------------------------- Operators

pub fn unary(operator: UnaryOperator, value: &Value) -> Value {
    match operator {
        UnaryOperator::Plus => Value::Number(to_number(value)),
        UnaryOperator::Minus => Value::Number(-to_number(value)),
        UnaryOperator::Not => Value::Bool(!is_truthy(value)),
    }
}

pub fn binary(operator: BinaryOperator, left: &Value, right: &Value) -> Value {
    match operator {
        BinaryOperator::Add => add(left, right),
        BinaryOperator::Sub => Value::Number(to_number(left) - to_number(right)),
        BinaryOperator::Mul => Value::Number(to_number(left) * to_number(right)),
        BinaryOperator::Div => Value::Number(to_number(left) / to_number(right)),
        BinaryOperator::Rem => Value::Number(to_number(left) % to_number(right)),
        BinaryOperator::Less => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOperator::Greater => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOperator::LessEqual => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOperator::GreaterEqual => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOperator::Equal => Value::Bool(loose_equals(left, right)),
        BinaryOperator::NotEqual => Value::Bool(!loose_equals(left, right)),
        BinaryOperator::StrictEqual => Value::Bool(strict_equals(left, right)),
        BinaryOperator::StrictNotEqual => Value::Bool(!strict_equals(left, right)),
    }
}

/// `+`: string concatenation when either primitive side is a string,
/// numeric addition otherwise.
pub fn add(left: &Value, right: &Value) -> Value {
    let left = to_primitive(left);
    let right = to_primitive(right);
    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        let mut s = to_js_string(&left);
        s.push_str(&to_js_string(&right));
        return Value::String(s);
    }
    Value::Number(to_number(&left) + to_number(&right))
}

/// Relational comparison. Two strings compare by UTF-16 code units; any
/// other pair compares numerically, and `None` means a `NaN` was involved.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let left = to_primitive(left);
    let right = to_primitive(right);
    if let (Value::String(a), Value::String(b)) = (&left, &right) {
        return Some(a.encode_utf16().cmp(b.encode_utf16()));
    }
    to_number(&left).partial_cmp(&to_number(&right))
}

/// `===`: same type and same value; arrays, objects and functions by identity.
pub fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => std::sync::Arc::ptr_eq(a, b),
        (Value::Object(a), Value::Object(b)) => std::sync::Arc::ptr_eq(a, b),
        (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
        _ => false,
    }
}

/// `==`: `null` and `undefined` only equal each other; booleans become
/// numbers; a number meets a string numerically; arrays, objects and
/// functions meeting a primitive are reduced to their string form first.
pub fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
        (Value::Bool(_), _) => loose_equals(&Value::Number(to_number(left)), right),
        (_, Value::Bool(_)) => loose_equals(left, &Value::Number(to_number(right))),
        (Value::Number(a), Value::String(_)) => *a == to_number(right),
        (Value::String(_), Value::Number(b)) => to_number(left) == *b,
        (Value::Array(_) | Value::Object(_) | Value::Function(_), Value::Number(_) | Value::String(_)) => {
            loose_equals(&to_primitive(left), right)
        }
        (Value::Number(_) | Value::String(_), Value::Array(_) | Value::Object(_) | Value::Function(_)) => {
            loose_equals(left, &to_primitive(right))
        }
        _ => strict_equals(left, right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!("")] {
            assert!(!is_truthy(&v(falsy.clone())), "{}", falsy);
        }
        assert!(!is_truthy(&Value::Undefined));
        assert!(!is_truthy(&Value::Number(f64::NAN)));
        for truthy in [json!(true), json!(1), json!("0"), json!([]), json!({})] {
            assert!(is_truthy(&v(truthy.clone())), "{}", truthy);
        }
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&v(json!("1"))), 1.0);
        assert_eq!(to_number(&v(json!("  2.5\n"))), 2.5);
        assert_eq!(to_number(&v(json!(""))), 0.0);
        assert_eq!(to_number(&v(json!("0x1F"))), 31.0);
        assert_eq!(to_number(&v(json!("1e3"))), 1000.0);
        assert_eq!(to_number(&v(json!("-Infinity"))), f64::NEG_INFINITY);
        assert!(to_number(&v(json!("inf"))).is_nan());
        assert!(to_number(&v(json!("NaN"))).is_nan());
        assert!(to_number(&v(json!("12px"))).is_nan());
        assert_eq!(to_number(&v(json!(null))), 0.0);
        assert!(to_number(&Value::Undefined).is_nan());
        assert_eq!(to_number(&v(json!([]))), 0.0);
        assert_eq!(to_number(&v(json!([7]))), 7.0);
        assert!(to_number(&v(json!([1, 2]))).is_nan());
        assert!(to_number(&v(json!({}))).is_nan());
    }

    #[test]
    fn test_to_js_string() {
        assert_eq!(to_js_string(&v(json!(1.5))), "1.5");
        assert_eq!(to_js_string(&v(json!([1, [2, 3], null]))), "1,2,3,");
        assert_eq!(to_js_string(&v(json!({"a": 1}))), "[object Object]");
        assert_eq!(to_js_string(&Value::Undefined), "undefined");
    }

    #[test]
    fn test_add() {
        assert_eq!(add(&v(json!(1)), &v(json!(2))), Value::Number(3.0));
        assert_eq!(add(&v(json!("1")), &v(json!(2))), v(json!("12")));
        assert_eq!(add(&v(json!(1)), &v(json!([2]))), v(json!("12")));
        assert_eq!(add(&v(json!(true)), &v(json!(null))), Value::Number(1.0));
        let nan = add(&Value::Undefined, &v(json!(1)));
        assert!(nan.as_f64().is_some_and(f64::is_nan));
    }

    #[test]
    fn test_arithmetic() {
        let num = |op, a, b| binary(op, &v(a), &v(b)).as_f64().unwrap();
        assert_eq!(num(BinaryOperator::Sub, json!("5"), json!(2)), 3.0);
        assert_eq!(num(BinaryOperator::Mul, json!(2), json!("4")), 8.0);
        assert_eq!(num(BinaryOperator::Div, json!(1), json!(0)), f64::INFINITY);
        assert_eq!(num(BinaryOperator::Rem, json!(-7), json!(3)), -1.0);
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare(&v(json!(1)), &v(json!(2))), Some(Ordering::Less));
        assert_eq!(compare(&v(json!("10")), &v(json!("9"))), Some(Ordering::Less));
        assert_eq!(compare(&v(json!("10")), &v(json!(9))), Some(Ordering::Greater));
        assert_eq!(compare(&v(json!(true)), &v(json!(3))), Some(Ordering::Less));
        assert_eq!(compare(&Value::Undefined, &v(json!(0))), None);
        let le = binary(BinaryOperator::LessEqual, &Value::Undefined, &Value::Undefined);
        assert_eq!(le, Value::Bool(false));
        let le = binary(BinaryOperator::LessEqual, &v(json!(null)), &v(json!(0)));
        assert_eq!(le, Value::Bool(true));
    }

    #[test]
    fn test_strict_equals() {
        assert!(strict_equals(&v(json!(1)), &v(json!(1.0))));
        assert!(!strict_equals(&v(json!(1)), &v(json!("1"))));
        assert!(!strict_equals(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
        let arr = v(json!([1]));
        assert!(strict_equals(&arr, &arr.clone()));
        assert!(!strict_equals(&arr, &v(json!([1]))));
    }

    #[test]
    fn test_loose_equals() {
        assert!(loose_equals(&v(json!(1)), &v(json!("1"))));
        assert!(loose_equals(&v(json!(null)), &Value::Undefined));
        assert!(!loose_equals(&v(json!(null)), &v(json!(0))));
        assert!(loose_equals(&v(json!(true)), &v(json!("1"))));
        assert!(loose_equals(&v(json!(false)), &v(json!(""))));
        assert!(loose_equals(&v(json!([1, 2])), &v(json!("1,2"))));
        assert!(loose_equals(&v(json!([])), &v(json!(0))));
        assert!(!loose_equals(&v(json!({})), &v(json!({}))));
        assert!(!loose_equals(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
    }

    #[test]
    fn test_get_member() {
        let obj = v(json!({"a": 1}));
        assert_eq!(get_member(&obj, "a"), Value::Number(1.0));
        assert_eq!(get_member(&obj, "b"), Value::Undefined);

        let arr = v(json!([10, 20]));
        assert_eq!(get_member(&arr, "1"), Value::Number(20.0));
        assert_eq!(get_member(&arr, "01"), Value::Undefined);
        assert_eq!(get_member(&arr, "2"), Value::Undefined);
        assert_eq!(get_member(&arr, "length"), Value::Number(2.0));

        let s = v(json!("héllo"));
        assert_eq!(get_member(&s, "length"), Value::Number(5.0));
        assert_eq!(get_member(&s, "1"), v(json!("é")));

        assert_eq!(get_member(&v(json!(5)), "x"), Value::Undefined);
    }
}
