//! Sandboxed compiler for a small JavaScript-like expression language.
//!
//! # Overview
//!
//! Source text goes through three stages: [`tokenize`] splits it into
//! [`Token`]s, [`parse`] builds a [`Program`], and [`compile`] lowers the
//! program into an [`Evaluator`]. The evaluator runs against a context
//! [`Value`]: bare names read the context's members, missing intermediates
//! yield `undefined`, and `&&`, `||` and `?:` short-circuit.
//!
//! Reads of `constructor`, `__proto__` and similar members fail with
//! [`EvalError::Forbidden`], as does calling the host's function
//! constructor ([`Function::constructor`]) under any name.
//!
//! # Example
//!
//! ```
//! use js_expression::{compile_expression, Value};
//! use serde_json::json;
//!
//! let evaluator = compile_expression("user.age >= 18 ? 'adult' : 'minor'").unwrap();
//! let context = Value::from(json!({"user": {"age": 21}}));
//! assert_eq!(evaluator.evaluate(Some(&context)).unwrap(), Value::from("adult"));
//! ```

pub mod ast;
pub mod codegen;
pub mod error;
pub mod evaluator;
pub mod ir;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod token;
pub mod types;
pub mod util;

pub use ast::{Expression, Program};
pub use codegen::{compile, Compiler};
pub use error::{Error, EvalError, LexError, ParseError};
pub use evaluator::Evaluator;
pub use lexer::tokenize;
pub use options::{CompilerOptions, Options, ParserOptions};
pub use parser::{parse, Parser};
pub use token::{Primitive, Token};
pub use types::{Function, Value};

/// Tokenizes, parses and compiles `source` with default options.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn compile_expression(source: &str) -> Result<Evaluator, Error> {
    compile_expression_with(source, &Options::default())
}

/// Tokenizes, parses and compiles `source` with the given [`Options`].
pub fn compile_expression_with(source: &str, options: &Options) -> Result<Evaluator, Error> {
    let tokens = tokenize(source)?;
    let program = Parser::with_options(&tokens, options.parser.clone()).parse()?;
    Ok(Compiler::new(options.compiler.clone()).compile(&program))
}
