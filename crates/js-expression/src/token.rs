//! Tokens produced by the lexer.

use js_expression_util::number_to_string;
use std::fmt;

/// A decoded literal constant: what a number, string or keyword token stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Primitive {
    /// The keyword constants that lex like names but are not identifiers.
    pub fn from_keyword(name: &str) -> Option<Primitive> {
        match name {
            "true" => Some(Primitive::Bool(true)),
            "false" => Some(Primitive::Bool(false)),
            "null" => Some(Primitive::Null),
            "undefined" => Some(Primitive::Undefined),
            _ => None,
        }
    }

    /// String form used when the constant becomes an object key.
    pub fn to_key(&self) -> String {
        match self {
            Primitive::Undefined => "undefined".to_string(),
            Primitive::Null => "null".to_string(),
            Primitive::Bool(b) => b.to_string(),
            Primitive::Number(n) => number_to_string(*n),
            Primitive::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::String(s) => f.write_str(&js_expression_util::quote(s)),
            other => f.write_str(&other.to_key()),
        }
    }
}

/// A single lexeme.
///
/// `text` is the exact source slice and is what punctuation and operators are
/// matched against. `value` holds the decoded constant for number, string and
/// keyword tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub value: Option<Primitive>,
    pub is_identifier: bool,
    /// Byte offset of the lexeme in the source.
    pub pos: usize,
}

impl Token {
    pub fn punctuation(text: impl Into<String>, pos: usize) -> Self {
        Token {
            text: text.into(),
            value: None,
            is_identifier: false,
            pos,
        }
    }

    pub fn literal(text: impl Into<String>, value: Primitive, pos: usize) -> Self {
        Token {
            text: text.into(),
            value: Some(value),
            is_identifier: false,
            pos,
        }
    }

    pub fn identifier(name: impl Into<String>, pos: usize) -> Self {
        Token {
            text: name.into(),
            value: None,
            is_identifier: true,
            pos,
        }
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}
