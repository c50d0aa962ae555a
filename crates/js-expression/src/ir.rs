//! The compiled form of a program: guarded statements over hoisted
//! temporaries, ending in a single result expression.
//!
//! [`Routine`] renders as JavaScript-like source through `Display`, with the
//! context value named `s`.

use crate::ast::{BinaryOperator, UnaryOperator};
use crate::token::Primitive;
use js_expression_util::{is_ident_part, is_ident_start, quote};
use std::fmt;

/// Name the rendered source gives the context value.
pub const CONTEXT: &str = "s";

/// A hoisted temporary, rendered as `v{index}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Temp(pub usize);

/// A side-effect-free operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Primitive),
    Temp(Temp),
    Context,
    Array(Vec<Option<Expr>>),
    Object(Vec<(String, Expr)>),
    Unary {
        operator: UnaryOperator,
        argument: Box<Expr>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// The member addressed by a read.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Named(String),
    Computed(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `target = value`
    Assign { target: Temp, value: Expr },
    /// `if (s) { target = s.name }`
    ReadContext { target: Temp, name: String },
    /// `if (object != null) { target = object[key] }`
    ReadMember { target: Temp, object: Expr, key: Key },
    /// `if (typeof callee === 'function') { target = callee.call(receiver, ...arguments) }`
    Call {
        target: Temp,
        callee: Expr,
        receiver: Expr,
        arguments: Vec<Expr>,
    },
    If {
        test: Expr,
        consequent: Vec<Stmt>,
        alternate: Vec<Stmt>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    /// Every temporary, in allocation order.
    pub declared: Vec<Temp>,
    pub body: Vec<Stmt>,
    pub result: Expr,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_part)
}

fn write_member(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if is_identifier(name) {
        write!(f, ".{}", name)
    } else {
        write!(f, "[{}]", quote(name))
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, body: &[Stmt]) -> fmt::Result {
    f.write_str("{")?;
    for stmt in body {
        write!(f, " {}", stmt)?;
    }
    f.write_str(" }")
}

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Temp(temp) => write!(f, "{}", temp),
            Expr::Context => f.write_str(CONTEXT),
            Expr::Array(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if let Some(element) = element {
                        write!(f, "{}", element)?;
                    }
                }
                // `[1, ]` has one slot; a trailing hole needs its own comma.
                if matches!(elements.last(), Some(None)) {
                    f.write_str(",")?;
                }
                f.write_str("]")
            }
            Expr::Object(properties) => {
                f.write_str("{")?;
                for (i, (key, value)) in properties.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if is_identifier(key) {
                        write!(f, " {}: {}", key, value)?;
                    } else {
                        write!(f, " {}: {}", quote(key), value)?;
                    }
                }
                if properties.is_empty() {
                    f.write_str("}")
                } else {
                    f.write_str(" }")
                }
            }
            Expr::Unary { operator, argument } => match argument.as_ref() {
                Expr::Unary { .. } => write!(f, "{}({})", operator, argument),
                _ => write!(f, "{}{}", operator, argument),
            },
            Expr::Binary {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assign { target, value } => write!(f, "{} = {};", target, value),
            Stmt::ReadContext { target, name } => {
                write!(f, "if ({}) {{ {} = {}", CONTEXT, target, CONTEXT)?;
                write_member(f, name)?;
                f.write_str("; }")
            }
            Stmt::ReadMember {
                target,
                object,
                key,
            } => {
                write!(f, "if ({} != null) {{ {} = {}", object, target, object)?;
                match key {
                    Key::Named(name) => write_member(f, name)?,
                    Key::Computed(expr) => write!(f, "[{}]", expr)?,
                }
                f.write_str("; }")
            }
            Stmt::Call {
                target,
                callee,
                receiver,
                arguments,
            } => {
                write!(
                    f,
                    "if (typeof {} === 'function') {{ {} = {}.call({}",
                    callee, target, callee, receiver
                )?;
                for argument in arguments {
                    write!(f, ", {}", argument)?;
                }
                f.write_str("); }")
            }
            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                match test {
                    // Binary operands already print parenthesized.
                    Expr::Binary { .. } => write!(f, "if {} ", test)?,
                    _ => write!(f, "if ({}) ", test)?,
                }
                write_block(f, consequent)?;
                if !alternate.is_empty() {
                    f.write_str(" else ")?;
                    write_block(f, alternate)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.declared.is_empty() {
            f.write_str("var ")?;
            for (i, temp) in self.declared.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", temp)?;
            }
            f.write_str("; ")?;
        }
        for stmt in &self.body {
            write!(f, "{} ", stmt)?;
        }
        write!(f, "return {};", self.result)
    }
}
