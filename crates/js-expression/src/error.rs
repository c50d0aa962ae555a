use thiserror::Error;

/// Failure while splitting the source text into tokens.
///
/// Positions are byte offsets into the source string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("Unexpected next character: {ch} at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Invalid exponent at {pos}")]
    InvalidExponent { pos: usize },

    #[error("Invalid unicode escape sequence at {pos}")]
    InvalidUnicodeEscape { pos: usize },

    #[error("Unmatched quote at {pos}")]
    UnmatchedQuote { pos: usize },
}

/// Failure while building the syntax tree from tokens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected. Expecting '{expected}'{}", found_suffix(.found, .pos))]
    Expected {
        expected: &'static str,
        found: Option<String>,
        pos: Option<usize>,
    },

    #[error("Incomplete expression")]
    IncompleteExpression,

    #[error("Unexpected character '{text}' at {pos}")]
    UnexpectedToken { text: String, pos: usize },

    #[error("Expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

fn found_suffix(found: &Option<String>, pos: &Option<usize>) -> String {
    match (found, pos) {
        (Some(text), Some(pos)) => format!(", found '{}' at {}", text, pos),
        _ => ", found end of input".to_string(),
    }
}

/// Failure raised while running a compiled evaluator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Access to '{name}' is forbidden")]
    Forbidden { name: String },

    #[error("{0}")]
    Host(String),
}

/// Any failure of the composed source-to-evaluator pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
