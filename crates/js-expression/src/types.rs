use crate::error::EvalError;
use crate::token::Primitive;
use crate::util;
use indexmap::IndexMap;
use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;

/// The signature of a host callable: receiver (`this`) and arguments.
pub type NativeFn = dyn Fn(&Value, &[Value]) -> Result<Value, EvalError> + Send + Sync;

/// Ordered property map backing object values.
pub type Object = IndexMap<String, Value>;

/// A runtime value as seen by compiled expressions.
///
/// Arrays, objects and functions are shared behind `Arc`: cloning is cheap
/// and `===` compares them by identity, as JavaScript does.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// JavaScript `undefined`, also the result of any missing read.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// `None` slots are holes (`[1,,3]`), distinct from stored `undefined`.
    Array(Arc<Vec<Option<Value>>>),
    Object(Arc<Object>),
    Function(Function),
}

impl Value {
    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Array(Arc::new(items.into_iter().map(Some).collect()))
    }

    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Value::Function(Function::new(f))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// `null` or `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Option<Value>]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// The JavaScript `typeof` of this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Array(_) | Value::Object(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
        }
    }

    /// Reads `key` the way a compiled `value[key]` does, without the
    /// forbidden-member check.
    pub fn get(&self, key: &str) -> Value {
        util::get_member(self, key)
    }

    /// Converts to JSON. Holes, `undefined` and functions become `null`, as do
    /// non-finite numbers; integral numbers become JSON integers.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Undefined | Value::Null | Value::Function(_) => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(
                items
                    .iter()
                    .map(|item| item.as_ref().map_or(Json::Null, Value::to_json))
                    .collect(),
            ),
            Value::Object(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn number_to_json(n: f64) -> Json {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        return Json::Number(serde_json::Number::from(n as i64));
    }
    serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number)
}

/// Structural comparison for host code and tests. Functions compare by
/// identity and `NaN` is unequal to itself; use the evaluator for
/// JavaScript equality.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        match p {
            Primitive::Undefined => Value::Undefined,
            Primitive::Null => Value::Null,
            Primitive::Bool(b) => Value::Bool(b),
            Primitive::Number(n) => Value::Number(n),
            Primitive::String(s) => Value::String(s),
        }
    }
}

impl From<Json> for Value {
    fn from(v: Json) -> Self {
        match v {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::array(items.into_iter().map(Value::from)),
            Json::Object(map) => Value::object(map.into_iter().map(|(k, v)| (k, Value::from(v)))),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

/// JavaScript `String(value)`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&util::to_js_string(self))
    }
}

struct FunctionInner {
    name: String,
    call: Box<NativeFn>,
    constructs_code: bool,
}

/// A host callable reachable from expressions.
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionInner>,
}

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Function::named("", f)
    }

    pub fn named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Function {
            inner: Arc::new(FunctionInner {
                name: name.into(),
                call: Box::new(f),
                constructs_code: false,
            }),
        }
    }

    /// The function-construction primitive: compiles its first argument as an
    /// expression and returns a function that evaluates it against its own
    /// first argument.
    ///
    /// Host code may call it directly. Compiled evaluators refuse to call it,
    /// whatever name it is reached under.
    pub fn constructor() -> Self {
        Function {
            inner: Arc::new(FunctionInner {
                name: "Function".to_string(),
                call: Box::new(|_this: &Value, args: &[Value]| -> Result<Value, EvalError> {
                    let source = args.first().map(util::to_js_string).unwrap_or_default();
                    let evaluator = crate::compile_expression(&source)
                        .map_err(|e| EvalError::Host(e.to_string()))?;
                    Ok(Value::Function(evaluator.into_function()))
                }),
                constructs_code: true,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// True when calling this function builds new executable code.
    pub fn constructs_code(&self) -> bool {
        self.inner.constructs_code
    }

    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, EvalError> {
        (self.inner.call)(this, args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.inner.name)
            .field("constructs_code", &self.inner.constructs_code)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trip() {
        let json = json!({"a": [1, 2.5, "x", null, true], "b": {"c": {}}});
        let value = Value::from(json.clone());
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_holes_and_undefined_become_null() {
        let value = Value::Array(Arc::new(vec![Some(Value::Undefined), None]));
        assert_eq!(value.to_json(), json!([null, null]));
    }

    #[test]
    fn test_non_finite_numbers_become_null() {
        assert_eq!(Value::Number(f64::NAN).to_json(), json!(null));
        assert_eq!(Value::Number(f64::INFINITY).to_json(), json!(null));
        assert_eq!(Value::Number(-0.5).to_json(), json!(-0.5));
    }

    #[test]
    fn test_structural_eq() {
        assert_eq!(Value::from(json!([1, {"a": 2}])), Value::from(json!([1, {"a": 2}])));
        assert_ne!(Value::Undefined, Value::Null);
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));

        let hole = Value::Array(Arc::new(vec![None]));
        let undef = Value::Array(Arc::new(vec![Some(Value::Undefined)]));
        assert_ne!(hole, undef);
    }

    #[test]
    fn test_function_identity() {
        let f = Function::new(|_, _| Ok(Value::Null));
        let g = Function::new(|_, _| Ok(Value::Null));
        assert_eq!(Value::Function(f.clone()), Value::Function(f.clone()));
        assert_ne!(Value::Function(f), Value::Function(g));
    }

    #[test]
    fn test_function_receives_receiver_and_args() {
        let f = Function::named("sum", |this, args| {
            let base = this.get("base").as_f64().unwrap_or(0.0);
            Ok(Value::Number(base + args.iter().filter_map(Value::as_f64).sum::<f64>()))
        });
        let this = Value::from(json!({"base": 10}));
        let result = f.call(&this, &[Value::from(1), Value::from(2)]).unwrap();
        assert_eq!(result, Value::Number(13.0));
        assert_eq!(f.name(), "sum");
        assert!(!f.constructs_code());
    }

    #[test]
    fn test_constructor_builds_callable_for_host() {
        let ctor = Function::constructor();
        assert!(ctor.constructs_code());
        let built = ctor
            .call(&Value::Undefined, &[Value::from("a + 1")])
            .unwrap();
        let Value::Function(built) = built else {
            panic!("expected a function");
        };
        let result = built
            .call(&Value::Undefined, &[Value::from(json!({"a": 41}))])
            .unwrap();
        assert_eq!(result, Value::Number(42.0));

        let err = ctor.call(&Value::Undefined, &[Value::from("1 +")]).unwrap_err();
        assert_eq!(err, EvalError::Host("Incomplete expression".to_string()));
    }

    #[test]
    fn test_accessors() {
        let value = Value::from(json!({"flag": true, "n": 2}));
        let map = value.as_object().unwrap();
        assert_eq!(map.get("flag").and_then(Value::as_bool), Some(true));
        assert_eq!(map.get("n").and_then(Value::as_bool), None);
        assert!(Value::from(json!([])).as_object().is_none());
    }

    #[test]
    fn test_type_of() {
        assert_eq!(Value::Undefined.type_of(), "undefined");
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::array([]).type_of(), "object");
        assert_eq!(Value::function(|_, _| Ok(Value::Undefined)).type_of(), "function");
    }
}
