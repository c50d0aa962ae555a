/// Check if a character is an ASCII decimal digit.
///
/// # Examples
///
/// ```
/// use js_expression_util::strings::is_digit;
///
/// assert!(is_digit('0'));
/// assert!(is_digit('9'));
/// assert!(!is_digit('a'));
/// assert!(!is_digit('٣'));
/// ```
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Check if a character is an ASCII hexadecimal digit (either case).
pub fn is_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

/// Check if a character may start an identifier: an ASCII letter, `_` or `$`.
///
/// # Examples
///
/// ```
/// use js_expression_util::strings::is_ident_start;
///
/// assert!(is_ident_start('a'));
/// assert!(is_ident_start('$'));
/// assert!(is_ident_start('_'));
/// assert!(!is_ident_start('1'));
/// assert!(!is_ident_start('é'));
/// ```
pub fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

/// Check if a character may continue an identifier.
pub fn is_ident_part(ch: char) -> bool {
    is_ident_start(ch) || is_digit(ch)
}

/// Check if a character is whitespace in the Unicode sense.
///
/// Covers vertical tab and no-break space as well as the usual ASCII blanks.
///
/// # Examples
///
/// ```
/// use js_expression_util::strings::is_whitespace;
///
/// assert!(is_whitespace(' '));
/// assert!(is_whitespace('\u{000B}'));
/// assert!(is_whitespace('\u{00A0}'));
/// assert!(!is_whitespace('a'));
/// ```
pub fn is_whitespace(ch: char) -> bool {
    // U+FEFF is not White_Space in Unicode but is skipped by JS engines.
    ch.is_whitespace() || ch == '\u{FEFF}'
}
