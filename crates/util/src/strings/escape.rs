/// Escape special characters so the text can sit inside a single-quoted
/// JavaScript string literal.
///
/// This function escapes:
/// - Control characters (0x00-0x1F)
/// - Single quote (0x27)
/// - Backslash (0x5C)
/// - Line and paragraph separators (U+2028, U+2029)
///
/// Double quotes are left alone.
///
/// # Examples
///
/// ```
/// use js_expression_util::strings::escape;
///
/// assert_eq!(escape("hello"), "hello");
/// assert_eq!(escape("it's"), "it\\'s");
/// assert_eq!(escape("line1\nline2"), "line1\\nline2");
/// ```
pub fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last = 0;

    for (i, ch) in s.char_indices() {
        let escaped: Option<std::borrow::Cow<'static, str>> = match ch {
            '\u{0008}' => Some("\\b".into()),
            '\t' => Some("\\t".into()),
            '\n' => Some("\\n".into()),
            '\u{000B}' => Some("\\v".into()),
            '\u{000C}' => Some("\\f".into()),
            '\r' => Some("\\r".into()),
            '\'' => Some("\\'".into()),
            '\\' => Some("\\\\".into()),
            '\u{2028}' => Some("\\u2028".into()),
            '\u{2029}' => Some("\\u2029".into()),
            c if (c as u32) < 0x20 => Some(format!("\\u{:04x}", c as u32).into()),
            _ => None,
        };

        if let Some(esc) = escaped {
            result.push_str(&s[last..i]);
            result.push_str(&esc);
            last = i + ch.len_utf8();
        }
    }

    result.push_str(&s[last..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_simple() {
        assert_eq!(escape("hello"), "hello");
    }

    #[test]
    fn test_escape_empty() {
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_escape_single_quote() {
        assert_eq!(escape("a'b"), "a\\'b");
    }

    #[test]
    fn test_escape_double_quote_untouched() {
        assert_eq!(escape("say \"hi\""), "say \"hi\"");
    }

    #[test]
    fn test_escape_backslash() {
        assert_eq!(escape("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_escape_whitespace_controls() {
        assert_eq!(escape("a\tb\nc\rd"), "a\\tb\\nc\\rd");
        assert_eq!(escape("v\u{000B}f\u{000C}"), "v\\vf\\f");
    }

    #[test]
    fn test_escape_other_controls() {
        assert_eq!(escape("null\0byte"), "null\\u0000byte");
        assert_eq!(escape("\u{001B}"), "\\u001b");
    }

    #[test]
    fn test_escape_separators() {
        assert_eq!(escape("a\u{2028}b\u{2029}"), "a\\u2028b\\u2029");
    }

    #[test]
    fn test_escape_unicode() {
        assert_eq!(escape("hello 日本語\u{00A0}"), "hello 日本語\u{00A0}");
    }
}
