use crate::error::EvalError;
use crate::ir::{Expr, Key, Routine, Stmt};
use crate::types::{Function, Value};
use crate::util::{binary, get_member, is_truthy, property_key, unary};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

struct EvaluatorInner {
    routine: Routine,
    denied_members: BTreeSet<String>,
}

/// A compiled expression, ready to run against any number of contexts.
///
/// Cloning shares the compiled routine. Evaluation keeps all scratch state in
/// a per-call frame, so one evaluator can run on many threads at once.
#[derive(Clone)]
pub struct Evaluator {
    inner: Arc<EvaluatorInner>,
}

impl Evaluator {
    pub(crate) fn new(routine: Routine, denied_members: BTreeSet<String>) -> Self {
        Evaluator {
            inner: Arc::new(EvaluatorInner {
                routine,
                denied_members,
            }),
        }
    }

    /// Runs the routine. A missing context behaves like `undefined`: every
    /// name then reads as `undefined`.
    pub fn evaluate(&self, context: Option<&Value>) -> Result<Value, EvalError> {
        let undefined = Value::Undefined;
        let routine = &self.inner.routine;
        let mut frame = Frame {
            denied_members: &self.inner.denied_members,
            context: context.unwrap_or(&undefined),
            temps: vec![Value::Undefined; routine.declared.len()],
        };
        frame.run(&routine.body)?;
        Ok(frame.eval(&routine.result))
    }

    pub fn routine(&self) -> &Routine {
        &self.inner.routine
    }

    pub fn temp_count(&self) -> usize {
        self.inner.routine.declared.len()
    }

    /// Wraps this evaluator as a callable whose first argument is the context.
    pub fn into_function(self) -> Function {
        Function::named("anonymous", move |_this, args| self.evaluate(args.first()))
    }
}

impl fmt::Display for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.routine)
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("source", &self.inner.routine.to_string())
            .field("denied_members", &self.inner.denied_members)
            .finish()
    }
}

struct Frame<'a> {
    denied_members: &'a BTreeSet<String>,
    context: &'a Value,
    temps: Vec<Value>,
}

impl Frame<'_> {
    fn run(&mut self, body: &[Stmt]) -> Result<(), EvalError> {
        for stmt in body {
            match stmt {
                Stmt::Assign { target, value } => {
                    self.temps[target.0] = self.eval(value);
                }
                Stmt::ReadContext { target, name } => {
                    if is_truthy(self.context) {
                        self.temps[target.0] = self.read(self.context, name)?;
                    }
                }
                Stmt::ReadMember {
                    target,
                    object,
                    key,
                } => {
                    let object = self.eval(object);
                    if !object.is_nullish() {
                        let key = match key {
                            Key::Named(name) => name.clone(),
                            Key::Computed(expr) => property_key(&self.eval(expr)),
                        };
                        self.temps[target.0] = self.read(&object, &key)?;
                    }
                }
                Stmt::Call {
                    target,
                    callee,
                    receiver,
                    arguments,
                } => {
                    if let Value::Function(function) = self.eval(callee) {
                        if function.constructs_code() {
                            tracing::warn!(name = function.name(), "rejected code-constructing call");
                            return Err(EvalError::Forbidden {
                                name: function.name().to_string(),
                            });
                        }
                        let receiver = self.eval(receiver);
                        let arguments: Vec<Value> =
                            arguments.iter().map(|a| self.eval(a)).collect();
                        self.temps[target.0] = function.call(&receiver, &arguments)?;
                    }
                }
                Stmt::If {
                    test,
                    consequent,
                    alternate,
                } => {
                    if is_truthy(&self.eval(test)) {
                        self.run(consequent)?;
                    } else {
                        self.run(alternate)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn read(&self, object: &Value, key: &str) -> Result<Value, EvalError> {
        if self.denied_members.contains(key) {
            tracing::warn!(member = key, "rejected forbidden member access");
            return Err(EvalError::Forbidden {
                name: key.to_string(),
            });
        }
        Ok(get_member(object, key))
    }

    fn eval(&self, expr: &Expr) -> Value {
        match expr {
            Expr::Literal(value) => Value::from(value.clone()),
            Expr::Temp(temp) => self.temps[temp.0].clone(),
            Expr::Context => self.context.clone(),
            Expr::Array(elements) => Value::Array(Arc::new(
                elements
                    .iter()
                    .map(|e| e.as_ref().map(|e| self.eval(e)))
                    .collect(),
            )),
            Expr::Object(properties) => {
                Value::object(properties.iter().map(|(k, v)| (k.as_str(), self.eval(v))))
            }
            Expr::Unary { operator, argument } => unary(*operator, &self.eval(argument)),
            Expr::Binary {
                operator,
                left,
                right,
            } => binary(*operator, &self.eval(left), &self.eval(right)),
        }
    }
}
