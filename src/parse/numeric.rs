/// Decode a `Number` token's literal text into its integer and/or
/// floating-point views, per spec.md §4.2's eager-numeric-literal rule.
///
/// Returns `Err(message)` for "bad number syntax" or "integer overflow" —
/// the two lexical/parse failures the spec calls out by name.
pub(crate) fn decode(text: &str) -> Result<(Option<i64>, Option<f64>), String> {
    let (sign, rest) = match text.as_bytes().first() {
        Some(b'+') => (1i64, &text[1..]),
        Some(b'-') => (-1i64, &text[1..]),
        _ => (1i64, text),
    };

    if rest.is_empty() {
        return Err("bad number syntax".to_string());
    }

    let lower = rest.to_ascii_lowercase();
    if lower.starts_with("0x") {
        let digits = &rest[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("bad number syntax".to_string());
        }
        let value = u64::from_str_radix(digits, 16).map_err(|_| "integer overflow".to_string())?;
        let signed = sign * value as i64;
        return int_only(signed);
    }

    let is_octal = rest.len() > 1 && rest.as_bytes()[0] == b'0' && !rest.contains('.') && !lower.contains('e');
    if is_octal {
        let digits = &rest[1..];
        if !digits.chars().all(|c| ('0'..='7').contains(&c)) {
            return Err("bad number syntax".to_string());
        }
        let value = i64::from_str_radix(digits, 8).map_err(|_| "integer overflow".to_string())?;
        return int_only(sign * value);
    }

    let has_fraction_or_exp = rest.contains('.') || lower.contains('e');
    if !has_fraction_or_exp {
        let value: i64 = rest.parse().map_err(|_| "bad number syntax".to_string())?;
        return int_only(sign * value);
    }

    let float_value: f64 = rest.parse().map_err(|_| "bad number syntax".to_string())?;
    let float_value = float_value * sign as f64;
    let int_value = if float_value.fract() == 0.0 && in_i32_range_f64(float_value) {
        Some(float_value as i64)
    } else {
        None
    };
    Ok((int_value, Some(float_value)))
}

fn int_only(value: i64) -> Result<(Option<i64>, Option<f64>), String> {
    if in_i32_range(value) {
        Ok((Some(value), None))
    } else {
        Err("integer overflow".to_string())
    }
}

fn in_i32_range(value: i64) -> bool {
    value >= i32::MIN as i64 && value <= i32::MAX as i64
}

fn in_i32_range_f64(value: f64) -> bool {
    value >= i32::MIN as f64 && value <= i32::MAX as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_int() {
        assert_eq!(decode("42").unwrap(), (Some(42), None));
    }

    #[test]
    fn negative_int() {
        assert_eq!(decode("-7").unwrap(), (Some(-7), None));
    }

    #[test]
    fn hex_literal() {
        assert_eq!(decode("0x1F").unwrap(), (Some(31), None));
    }

    #[test]
    fn octal_literal() {
        assert_eq!(decode("0755").unwrap(), (Some(0o755), None));
    }

    #[test]
    fn invalid_octal_digit() {
        assert!(decode("089").is_err());
    }

    #[test]
    fn float_literal() {
        let (i, f) = decode("3.5").unwrap();
        assert_eq!(i, None);
        assert_eq!(f, Some(3.5));
    }

    #[test]
    fn exact_float_populates_both_views() {
        assert_eq!(decode("2.0").unwrap(), (Some(2), Some(2.0)));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(decode("99999999999").unwrap_err(), "integer overflow");
    }
}
