use super::escape;

/// Render text as a single-quoted JavaScript string literal.
///
/// # Examples
///
/// ```
/// use js_expression_util::strings::quote;
///
/// assert_eq!(quote("hello"), "'hello'");
/// assert_eq!(quote("it's"), "'it\\'s'");
/// ```
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    out.push_str(&escape(s));
    out.push('\'');
    out
}
