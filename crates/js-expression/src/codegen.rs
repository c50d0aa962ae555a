//! Lowers a [`Program`] into a [`Routine`] and wraps it in an [`Evaluator`].
//!
//! Every read of the context, a member or a call result lands in a fresh
//! temporary behind a guard, so missing intermediates yield `undefined`
//! instead of failing. `&&`, `||` and `?:` lower to conditional blocks, which
//! keeps the skipped side from running at all.

use crate::ast::{BinaryOperator, Expression, LogicalOperator, Program, UnaryOperator};
use crate::evaluator::Evaluator;
use crate::ir::{Expr, Key, Routine, Stmt, Temp};
use crate::options::CompilerOptions;
use crate::token::Primitive;
use std::mem;

/// Compiles with the default [`CompilerOptions`].
pub fn compile(program: &Program) -> Evaluator {
    Compiler::default().compile(program)
}

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Compiler { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn compile(&self, program: &Program) -> Evaluator {
        let routine = lower_program(program);
        tracing::debug!(
            expressions = program.body.len(),
            temps = routine.declared.len(),
            "compiled program"
        );
        tracing::trace!(source = %routine, "generated routine");
        Evaluator::new(routine, self.options.denied_members.clone())
    }
}

/// Lowers a program on its own, without wrapping it in an evaluator.
pub fn lower_program(program: &Program) -> Routine {
    let mut state = CompileState::default();
    let mut result = Expr::Literal(Primitive::Undefined);
    for expression in &program.body {
        result = state.lower(expression);
    }
    Routine {
        declared: state.declared,
        body: state.body,
        result,
    }
}

#[derive(Default)]
struct CompileState {
    next_temp: usize,
    declared: Vec<Temp>,
    body: Vec<Stmt>,
}

impl CompileState {
    fn temp(&mut self) -> Temp {
        let temp = Temp(self.next_temp);
        self.next_temp += 1;
        self.declared.push(temp);
        temp
    }

    fn emit(&mut self, stmt: Stmt) {
        self.body.push(stmt);
    }

    /// Collects whatever `f` emits into a separate statement list.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> (T, Vec<Stmt>) {
        let outer = mem::take(&mut self.body);
        let value = f(self);
        (value, mem::replace(&mut self.body, outer))
    }

    fn block(&mut self, f: impl FnOnce(&mut Self)) -> Vec<Stmt> {
        self.scoped(f).1
    }

    /// Lowers `expression` into `target`, emitting into the current block.
    fn assign(&mut self, target: Temp, expression: &Expression) {
        let value = self.lower(expression);
        self.emit(Stmt::Assign { target, value });
    }

    fn lower(&mut self, expression: &Expression) -> Expr {
        match expression {
            Expression::Literal(value) => Expr::Literal(value.clone()),
            Expression::Identifier(name) => {
                let target = self.temp();
                self.emit(Stmt::ReadContext {
                    target,
                    name: name.clone(),
                });
                Expr::Temp(target)
            }
            Expression::Array(elements) => {
                let mut lowered = Vec::with_capacity(elements.len());
                for element in elements {
                    lowered.push(element.as_ref().map(|e| self.lower(e)));
                }
                Expr::Array(lowered)
            }
            Expression::Object(properties) => {
                let mut lowered = Vec::with_capacity(properties.len());
                for property in properties {
                    let value = self.lower(&property.value);
                    lowered.push((property.key.name().to_string(), value));
                }
                Expr::Object(lowered)
            }
            Expression::Unary { operator, argument } => Expr::Unary {
                operator: *operator,
                argument: Box::new(self.lower(argument)),
            },
            Expression::Binary {
                operator,
                left,
                right,
            } => {
                let left = self.lower(left);
                let right = self.lower(right);
                Expr::Binary {
                    operator: *operator,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            Expression::Logical {
                operator,
                left,
                right,
            } => {
                let target = self.temp();
                self.assign(target, left);
                let test = match operator {
                    LogicalOperator::And => Expr::Temp(target),
                    LogicalOperator::Or => Expr::Unary {
                        operator: UnaryOperator::Not,
                        argument: Box::new(Expr::Temp(target)),
                    },
                };
                let consequent = self.block(|state| state.assign(target, right));
                self.emit(Stmt::If {
                    test,
                    consequent,
                    alternate: Vec::new(),
                });
                Expr::Temp(target)
            }
            Expression::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let test = self.lower(test);
                let target = self.temp();
                let consequent = self.block(|state| state.assign(target, consequent));
                let alternate = self.block(|state| state.assign(target, alternate));
                self.emit(Stmt::If {
                    test,
                    consequent,
                    alternate,
                });
                Expr::Temp(target)
            }
            Expression::Member {
                object,
                property,
                computed,
            } => {
                let object = self.lower(object);
                Expr::Temp(self.read_member(object, property, *computed))
            }
            Expression::Call { callee, arguments } => self.call(callee, arguments),
        }
    }

    /// Reads `property` from `object` into a new temporary. A computed key
    /// that needs statements of its own is lowered behind the same presence
    /// test as the read, so nothing in it runs for a missing object.
    fn read_member(&mut self, object: Expr, property: &Expression, computed: bool) -> Temp {
        let name = match property {
            Expression::Identifier(name) if !computed => Some(name.clone()),
            Expression::Literal(value) if !computed => Some(value.to_key()),
            _ => None,
        };
        if let Some(name) = name {
            let target = self.temp();
            self.emit(Stmt::ReadMember {
                target,
                object,
                key: Key::Named(name),
            });
            return target;
        }

        let (key, mut consequent) = self.scoped(|state| state.lower(property));
        if consequent.is_empty() {
            let target = self.temp();
            self.emit(Stmt::ReadMember {
                target,
                object,
                key: Key::Computed(key),
            });
            return target;
        }
        let object = self.materialize(object);
        let target = self.temp();
        consequent.push(Stmt::ReadMember {
            target,
            object: object.clone(),
            key: Key::Computed(key),
        });
        self.emit(Stmt::If {
            test: Expr::Binary {
                operator: BinaryOperator::NotEqual,
                left: Box::new(object),
                right: Box::new(Expr::Literal(Primitive::Null)),
            },
            consequent,
            alternate: Vec::new(),
        });
        target
    }

    fn call(&mut self, callee: &Expression, arguments: &[Expression]) -> Expr {
        let (callee, receiver) = match callee {
            Expression::Member {
                object,
                property,
                computed,
            } => {
                let object = self.lower(object);
                let object = self.materialize(object);
                let method = self.read_member(object.clone(), property, *computed);
                (Expr::Temp(method), object)
            }
            Expression::Identifier(_) => (self.lower(callee), Expr::Context),
            other => (self.lower(other), Expr::Literal(Primitive::Undefined)),
        };
        let mut lowered = Vec::with_capacity(arguments.len());
        for argument in arguments {
            lowered.push(self.lower(argument));
        }
        let target = self.temp();
        self.emit(Stmt::Call {
            target,
            callee,
            receiver,
            arguments: lowered,
        });
        Expr::Temp(target)
    }

    /// Receivers are referenced twice, so compound operands get a temporary.
    fn materialize(&mut self, expr: Expr) -> Expr {
        match expr {
            Expr::Literal(_) | Expr::Temp(_) | Expr::Context => expr,
            value => {
                let target = self.temp();
                self.emit(Stmt::Assign { target, value });
                Expr::Temp(target)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn render(source: &str) -> String {
        let tokens = tokenize(source).unwrap();
        let program = parse(&tokens).unwrap();
        lower_program(&program).to_string()
    }

    #[test]
    fn test_literals_inline() {
        assert_eq!(render("1 + 2 * 3"), "return (1 + (2 * 3));");
        assert_eq!(render("'a' + [1, , {b: null}]"), "return ('a' + [1, , { b: null }]);");
    }

    #[test]
    fn test_identifier_reads_guarded_context() {
        assert_eq!(render("a"), "var v0; if (s) { v0 = s.a; } return v0;");
    }

    #[test]
    fn test_member_chain() {
        assert_eq!(
            render("a.b[c]"),
            "var v0, v1, v2, v3; \
             if (s) { v0 = s.a; } \
             if (v0 != null) { v1 = v0.b; } \
             if (v1 != null) { if (s) { v2 = s.c; } if (v1 != null) { v3 = v1[v2]; } } \
             return v3;"
        );
    }

    #[test]
    fn test_method_call_receiver() {
        assert_eq!(
            render("a.b(1)"),
            "var v0, v1, v2; \
             if (s) { v0 = s.a; } \
             if (v0 != null) { v1 = v0.b; } \
             if (typeof v1 === 'function') { v2 = v1.call(v0, 1); } \
             return v2;"
        );
        assert_eq!(
            render("f()"),
            "var v0, v1; \
             if (s) { v0 = s.f; } \
             if (typeof v0 === 'function') { v1 = v0.call(s); } \
             return v1;"
        );
    }

    #[test]
    fn test_compound_receiver_is_materialized() {
        assert_eq!(
            render("(1 + 2).x()"),
            "var v0, v1, v2; \
             v0 = (1 + 2); \
             if (v0 != null) { v1 = v0.x; } \
             if (typeof v1 === 'function') { v2 = v1.call(v0); } \
             return v2;"
        );
    }

    #[test]
    fn test_logical_lowers_to_blocks() {
        assert_eq!(
            render("a && b"),
            "var v0, v1, v2; \
             if (s) { v1 = s.a; } \
             v0 = v1; \
             if (v0) { if (s) { v2 = s.b; } v0 = v2; } \
             return v0;"
        );
        assert_eq!(
            render("0 || 2"),
            "var v0; v0 = 0; if (!v0) { v0 = 2; } return v0;"
        );
    }

    #[test]
    fn test_conditional_lowers_to_if_else() {
        assert_eq!(
            render("1 ? 'x' : 'y'"),
            "var v0; if (1) { v0 = 'x'; } else { v0 = 'y'; } return v0;"
        );
    }

    #[test]
    fn test_computed_key_statements_run_behind_object_guard() {
        assert_eq!(
            render("a[0]"),
            "var v0, v1; if (s) { v0 = s.a; } if (v0 != null) { v1 = v0[0]; } return v1;"
        );
        assert_eq!(
            render("a[f()]"),
            "var v0, v1, v2, v3; \
             if (s) { v0 = s.a; } \
             if (v0 != null) { \
             if (s) { v1 = s.f; } \
             if (typeof v1 === 'function') { v2 = v1.call(s); } \
             if (v0 != null) { v3 = v0[v2]; } \
             } \
             return v3;"
        );
    }

    #[test]
    fn test_compiler_keeps_its_options() {
        let compiler = Compiler::new(CompilerOptions::default().deny("secret"));
        assert!(compiler.options().denied_members.contains("secret"));
        assert!(compiler.options().denied_members.contains("constructor"));
    }

    #[test]
    fn test_sequence_returns_last() {
        assert_eq!(
            render("a; 2"),
            "var v0; if (s) { v0 = s.a; } return 2;"
        );
    }
}
