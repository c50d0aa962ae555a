//! Lexer: splits an expression string into a flat token sequence.

use crate::error::LexError;
use crate::token::{Primitive, Token};
use js_expression_util::{is_digit, is_hex_digit, is_ident_part, is_ident_start, is_whitespace};

const PUNCTUATION: &[char] = &['[', ']', '{', '}', ':', '.', '(', ')', ',', '?', ';'];

const OPERATORS: &[&str] = &[
    "+", "-", "!", "*", "/", "%", "<", ">", "<=", ">=", "==", "!=", "===", "!==", "&&", "||",
];

/// Tokenizes `source`, failing on the first character no rule accepts.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(source).run()?;
    tracing::trace!(count = tokens.len(), "tokenized expression");
    Ok(tokens)
}

/// Single-use scanner over one source string.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    pub fn run(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(ch) = self.peek() {
            if is_digit(ch) || (ch == '.' && self.peek_nth(1).is_some_and(is_digit)) {
                self.read_number()?;
            } else if ch == '\'' || ch == '"' {
                self.read_string(ch)?;
            } else if PUNCTUATION.contains(&ch) {
                self.tokens.push(Token::punctuation(ch.to_string(), self.pos));
                self.advance();
            } else if is_ident_start(ch) {
                self.read_identifier();
            } else if is_whitespace(ch) {
                self.advance();
            } else if let Some(op) = self.peek_operator() {
                self.tokens.push(Token::punctuation(op, self.pos));
                self.pos += op.len();
            } else {
                return Err(LexError::UnexpectedChar { ch, pos: self.pos });
            }
        }
        Ok(self.tokens)
    }

    fn read_number(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        self.eat_digits();
        if self.peek() == Some('.') {
            self.advance();
            self.eat_digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) && self.peek_nth(1).is_some_and(is_digit) {
                self.advance();
            }
            if !self.peek().is_some_and(is_digit) {
                return Err(LexError::InvalidExponent { pos: self.pos });
            }
            self.eat_digits();
            if matches!(self.peek(), Some('e' | 'E')) {
                return Err(LexError::InvalidExponent { pos: self.pos });
            }
        }

        let text = &self.input[start..self.pos];
        let value = text.parse::<f64>().unwrap_or(f64::NAN);
        self.tokens
            .push(Token::literal(text, Primitive::Number(value), start));
        Ok(())
    }

    fn read_string(&mut self, quote: char) -> Result<(), LexError> {
        let start = self.pos;
        self.advance();
        let mut value = String::new();

        loop {
            match self.peek() {
                None => return Err(LexError::UnmatchedQuote { pos: start }),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    let escape_pos = self.pos;
                    self.advance();
                    match self.peek() {
                        None => return Err(LexError::UnmatchedQuote { pos: start }),
                        Some('u') => {
                            self.advance();
                            let ch = self.read_unicode_escape(escape_pos)?;
                            value.push(ch);
                        }
                        Some(c) => {
                            value.push(unescape(c));
                            self.advance();
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        let raw = &self.input[start..self.pos];
        self.tokens
            .push(Token::literal(raw, Primitive::String(value), start));
        Ok(())
    }

    /// Reads the four hex digits after `\u`. A high surrogate directly
    /// followed by a `\u` low surrogate is combined into one code point.
    fn read_unicode_escape(&mut self, escape_pos: usize) -> Result<char, LexError> {
        let unit = self.read_hex4(escape_pos)?;
        if (0xD800..0xDC00).contains(&unit) && self.input[self.pos..].starts_with("\\u") {
            let saved = self.pos;
            self.pos += 2;
            match self.read_hex4(self.pos - 2) {
                Ok(low) if (0xDC00..0xE000).contains(&low) => {
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    return Ok(char::from_u32(code).unwrap_or('\u{FFFD}'));
                }
                _ => self.pos = saved,
            }
        }
        Ok(char::from_u32(unit).unwrap_or('\u{FFFD}'))
    }

    fn read_hex4(&mut self, escape_pos: usize) -> Result<u32, LexError> {
        let hex = self
            .input
            .get(self.pos..self.pos + 4)
            .filter(|h| h.chars().all(is_hex_digit))
            .ok_or(LexError::InvalidUnicodeEscape { pos: escape_pos })?;
        let unit = u32::from_str_radix(hex, 16)
            .map_err(|_| LexError::InvalidUnicodeEscape { pos: escape_pos })?;
        self.pos += 4;
        Ok(unit)
    }

    fn read_identifier(&mut self) {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_part) {
            self.advance();
        }
        let name = &self.input[start..self.pos];
        let token = match Primitive::from_keyword(name) {
            Some(constant) => Token::literal(name, constant, start),
            None => Token::identifier(name, start),
        };
        self.tokens.push(token);
    }

    fn peek_operator(&self) -> Option<&'static str> {
        let rest = &self.input[self.pos..];
        OPERATORS
            .iter()
            .copied()
            .filter(|op| rest.starts_with(op))
            .max_by_key(|op| op.len())
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(is_digit) {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }
}

/// Decodes the character after a backslash. Letter escapes other than the
/// recognised ones, and any punctuation, stand for themselves.
fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        'f' => '\u{000C}',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{000B}',
        other => other,
    }
}
