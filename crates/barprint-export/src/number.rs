//! Locale-independent number formatting for text formats.

/// Format `value` with at most six decimals, trailing zeros and a
/// trailing decimal point removed.
///
/// Never produces exponent notation or `-0`.  Non-finite values format
/// as `0`.
///
/// # Examples
///
/// ```
/// use barprint_export::number::format_number;
///
/// assert_eq!(format_number(2.5), "2.5");
/// assert_eq!(format_number(10.0), "10");
/// assert_eq!(format_number(1.0 / 3.0), "0.333333");
/// ```
#[must_use]
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let mut s = format!("{value:.6}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s.remove(0);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_have_no_decimal_point() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(144.0), "144");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn at_most_six_decimals() {
        assert_eq!(format_number(0.123_456_789), "0.123457");
        assert_eq!(format_number(2.834_645_669_3), "2.834646");
    }

    #[test]
    fn tiny_values_collapse_to_zero() {
        assert_eq!(format_number(1e-9), "0");
        assert_eq!(format_number(-1e-9), "0");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn large_values_avoid_exponent_notation() {
        assert_eq!(format_number(1e12), "1000000000000");
    }

    #[test]
    fn non_finite_is_zero() {
        assert_eq!(format_number(f64::NAN), "0");
        assert_eq!(format_number(f64::INFINITY), "0");
    }
}
