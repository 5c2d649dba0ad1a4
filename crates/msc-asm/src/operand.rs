//! Parsing individual operand tokens into registers, immediates, and
//! constant values.

use msc_value::{HeapView, Value};
use msc_vm::Runtime;

/// `rN`, N in 0..=255.
pub fn parse_register(token: &str) -> Option<u8> {
    let digits = token.strip_prefix('r')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|&n| n <= 255).map(|n| n as u8)
}

/// Integer literal with the same base auto-detection as C's
/// `strtol(str, &end, 0)`: `0x`/`0X` is hex, a bare leading `0` with
/// more digits is octal, anything else is decimal. Accepts a leading
/// `-`.
pub fn parse_immediate(token: &str) -> Option<i64> {
    let (negative, rest) = match token.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, token),
    };
    if rest.is_empty() {
        return None;
    }
    let magnitude = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if rest.len() > 1 && rest.starts_with('0') {
        i64::from_str_radix(&rest[1..], 8).ok()?
    } else {
        rest.parse::<i64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// True iff `token` looks like a double literal (contains `.`) and
/// parses as one.
pub fn parse_double(token: &str) -> Option<f64> {
    if !token.contains('.') {
        return None;
    }
    token.parse::<f64>().ok()
}

/// A quoted `"..."` token's decoded contents, without the quotes.
pub fn parse_string_literal(token: &str) -> Option<&str> {
    let inner = token.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner)
}

/// Parses any constant-pool operand: `null`, a string literal, a
/// double, or an integer, in that precedence order (matching the
/// source this is grounded on).
pub fn parse_constant(token: &str, runtime: &mut Runtime) -> Option<Value> {
    if token == "null" {
        return Some(Value::make_null());
    }
    if let Some(text) = parse_string_literal(token) {
        return Some(runtime.alloc_string(text.as_bytes()));
    }
    if let Some(d) = parse_double(token) {
        return Some(Value::make_double(d));
    }
    parse_immediate(token).and_then(|i| i32::try_from(i).ok()).map(Value::make_int)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_parse_within_range_and_reject_garbage() {
        assert_eq!(parse_register("r0"), Some(0));
        assert_eq!(parse_register("r255"), Some(255));
        assert_eq!(parse_register("r256"), None);
        assert_eq!(parse_register("rx"), None);
        assert_eq!(parse_register("x1"), None);
    }

    #[test]
    fn immediates_auto_detect_base() {
        assert_eq!(parse_immediate("42"), Some(42));
        assert_eq!(parse_immediate("-42"), Some(-42));
        assert_eq!(parse_immediate("0x2A"), Some(42));
        assert_eq!(parse_immediate("052"), Some(42));
        assert_eq!(parse_immediate("0"), Some(0));
    }

    #[test]
    fn doubles_require_a_decimal_point() {
        assert_eq!(parse_double("1.5"), Some(1.5));
        assert_eq!(parse_double("15"), None);
    }

    #[test]
    fn string_literal_strips_quotes() {
        assert_eq!(parse_string_literal("\"hi\""), Some("hi"));
        assert_eq!(parse_string_literal("hi"), None);
    }
}
