//! Number formatting for flag values.
//!
//! External tools parse these strings, so the text form is part of the
//! wire contract. Two styles are used:
//!
//! - [`float_repr`] - shortest round-trip text that always keeps a decimal
//!   point (`1.0`, `0.5`, `6.123233995736766e-17`). Used for matrices.
//! - [`number`] - integral values without a decimal point (`1`, `0.5`).
//!   Used for colors, sizes and other human-authored values.

/// Shortest round-trip text of `value`, always with a decimal point or
/// exponent. Negative zero prints as `0.0`.
pub fn float_repr(value: f64) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    format!("{value:?}")
}

/// Text of `value` without a trailing `.0` for integral values.
pub fn number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Joins values with commas using [`number`].
pub fn number_list(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| number(*v))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_repr() {
        assert_eq!(float_repr(1.0), "1.0");
        assert_eq!(float_repr(0.5), "0.5");
        assert_eq!(float_repr(-0.0), "0.0");
        assert_eq!(float_repr(-2.25), "-2.25");
        assert_eq!(float_repr(1.075), "1.075");
    }

    #[test]
    fn test_number() {
        assert_eq!(number(1.0), "1");
        assert_eq!(number(-0.0), "0");
        assert_eq!(number(0.5), "0.5");
        assert_eq!(number(1920.0), "1920");
        assert_eq!(number_list(&[1.0, 0.5, 0.25]), "1,0.5,0.25");
    }
}
