//! String utilities.
//!
//! Provides character classification and single-quoted string escaping.

mod escape;
mod quote;
mod util;

pub use escape::escape;
pub use quote::quote;
pub use util::{is_digit, is_hex_digit, is_ident_part, is_ident_start, is_whitespace};
