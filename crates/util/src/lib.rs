//! js-expression-util - helpers shared by the js-expression pipeline
//!
//! Character classes used by the lexer, string quoting used when rendering
//! generated programs, and JavaScript-compatible number formatting.

pub mod number;
pub mod strings;

// Re-exports for convenience
pub use number::number_to_string;
pub use strings::{
    escape, is_digit, is_hex_digit, is_ident_part, is_ident_start, is_whitespace, quote,
};
