//! JavaScript-compatible number formatting.

/// Formats a number the way JavaScript's `Number.prototype.toString()` does.
///
/// Integral values print without a fractional part, magnitudes outside
/// `[1e-7, 1e21)` switch to exponential notation, and the digits are the
/// shortest ones that round-trip.
///
/// # Examples
///
/// ```
/// use js_expression_util::number_to_string;
///
/// assert_eq!(number_to_string(12.0), "12");
/// assert_eq!(number_to_string(0.1), "0.1");
/// assert_eq!(number_to_string(1e21), "1e+21");
/// assert_eq!(number_to_string(f64::NAN), "NaN");
/// ```
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let sign = if n < 0.0 { "-" } else { "" };
    let sci = format!("{:e}", n.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // Position of the decimal point relative to the first digit.
    let point = exponent + 1;

    let body = if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let e = point - 1;
        let e_sign = if e >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, e_sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, e_sign, e.abs())
        }
    };

    format!("{}{}", sign, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_integers() {
        assert_eq!(number_to_string(0.0), "0");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(7.0), "7");
        assert_eq!(number_to_string(-42.0), "-42");
        assert_eq!(number_to_string(100.0), "100");
        assert_eq!(number_to_string(123456789012345680000.0), "123456789012345680000");
    }

    #[test]
    fn test_fractions() {
        assert_eq!(number_to_string(0.5), "0.5");
        assert_eq!(number_to_string(-1.25), "-1.25");
        assert_eq!(number_to_string(0.01), "0.01");
        assert_eq!(number_to_string(0.000001), "0.000001");
        assert_eq!(number_to_string(1.0 / 3.0), "0.3333333333333333");
    }

    #[test]
    fn test_exponential() {
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1.5e300), "1.5e+300");
        assert_eq!(number_to_string(1e-7), "1e-7");
        assert_eq!(number_to_string(-2.5e-10), "-2.5e-10");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::INFINITY), "Infinity");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    proptest! {
        #[test]
        fn prop_round_trips(n in proptest::num::f64::NORMAL | proptest::num::f64::SUBNORMAL) {
            let s = number_to_string(n);
            let back: f64 = s.parse().unwrap();
            prop_assert_eq!(back, n);
        }

        #[test]
        fn prop_safe_integers_have_no_point(n in -9_007_199_254_740_991i64..9_007_199_254_740_991i64) {
            prop_assert_eq!(number_to_string(n as f64), n.to_string());
        }
    }
}
