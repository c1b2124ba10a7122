//! Conversion of raw command-line and environment text into scalars.

use crate::types::Scalar;

/// Converts raw text into a typed scalar.
///
/// Recognises the literals `true`, `false`, `null`, `Infinity`,
/// `+Infinity` and `-Infinity`, then tries a numeric parse. Blank text
/// becomes `0`. Text that is none of these is returned unchanged as a
/// string.
///
/// # Examples
///
/// ```
/// use optstack_core::{Scalar, coerce};
///
/// assert_eq!(coerce("true"), Scalar::Bool(true));
/// assert_eq!(coerce("42"), Scalar::Number(42.0));
/// assert_eq!(coerce("null"), Scalar::Null);
/// assert_eq!(coerce("-Infinity"), Scalar::Number(f64::NEG_INFINITY));
/// assert_eq!(coerce(""), Scalar::Number(0.0));
/// assert_eq!(coerce("hello"), Scalar::String("hello".into()));
/// ```
pub fn coerce(text: &str) -> Scalar {
    match text {
        "true" => Scalar::Bool(true),
        "false" => Scalar::Bool(false),
        "null" => Scalar::Null,
        "Infinity" | "+Infinity" => Scalar::Number(f64::INFINITY),
        "-Infinity" => Scalar::Number(f64::NEG_INFINITY),
        _ if text.trim().is_empty() => Scalar::Number(0.0),
        _ => parse_number(text)
            .map(Scalar::Number)
            .unwrap_or_else(|| Scalar::String(text.to_string())),
    }
}

/// Parses a numeric literal, ignoring surrounding whitespace.
///
/// Accepts signed decimals with optional fraction and exponent (`-1.5e3`,
/// `.5`, `5.`) and unsigned `0x`, `0o` and `0b` integers. Blank text is not
/// a number.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(n) = parse_radix_integer(text) {
        return Some(n);
    }
    if is_decimal_literal(text) {
        text.parse::<f64>().ok()
    } else {
        None
    }
}

fn parse_radix_integer(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u128::from_str_radix(digits, radix).ok().map(|n| n as f64)
}

/// Checks `[+-]? (digits [. digits*] | . digits) ([eE] [+-]? digits)?`.
///
/// `f64::from_str` alone also accepts `inf` and `NaN`, which must stay
/// strings.
fn is_decimal_literal(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (mantissa, None),
    };
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    let mantissa_ok = all_digits(int_part)
        && frac_part.is_none_or(all_digits)
        && (!int_part.is_empty() || frac_part.is_some_and(|f| !f.is_empty()));
    if !mantissa_ok {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && all_digits(digits)
        }
    }
}
