//! Numeric coercion for `sum`/`min`/`max`/`average`.
//!
//! Anything that cannot be read as a number becomes NaN; the aggregates treat
//! NaN as a poison value.

use serde_json::Value;

pub trait ToNumber {
    fn to_number(&self) -> f64;
}

macro_rules! impl_to_number_cast {
    ($($t:ty),* $(,)?) => {
        $(
            impl ToNumber for $t {
                #[inline]
                fn to_number(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

impl_to_number_cast!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl ToNumber for bool {
    fn to_number(&self) -> f64 {
        if *self {
            1.0
        } else {
            0.0
        }
    }
}

impl ToNumber for str {
    fn to_number(&self) -> f64 {
        parse_number(self)
    }
}

impl ToNumber for String {
    fn to_number(&self) -> f64 {
        parse_number(self)
    }
}

impl<T: ToNumber + ?Sized> ToNumber for &T {
    fn to_number(&self) -> f64 {
        (**self).to_number()
    }
}

impl<T: ToNumber + ?Sized> ToNumber for Box<T> {
    fn to_number(&self) -> f64 {
        (**self).to_number()
    }
}

impl<T: ToNumber> ToNumber for Option<T> {
    fn to_number(&self) -> f64 {
        self.as_ref().map_or(f64::NAN, ToNumber::to_number)
    }
}

impl ToNumber for Value {
    fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => b.to_number(),
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => parse_number(s),
            Value::Array(_) | Value::Object(_) => f64::NAN,
        }
    }
}

/// Read numeric text. Surrounding whitespace is ignored, blank text is 0,
/// `0x`/`0o`/`0b` prefixes are honored, anything else unparsable is NaN.
pub fn parse_number(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |v| v as f64);
        }
    }
    // Rust accepts spellings like "inf" and "nan" that are not numbers here.
    if s.bytes().any(|b| matches!(b, b'i' | b'I' | b'n' | b'N')) {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_parses_like_numbers() {
        assert_eq!(parse_number(" 42 "), 42.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number("0x1f"), 31.0);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_number("x").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("NaN").is_nan());
    }

    #[test]
    fn json_values_coerce() {
        assert_eq!(json!(null).to_number(), 0.0);
        assert_eq!(json!(true).to_number(), 1.0);
        assert_eq!(json!("7").to_number(), 7.0);
        assert_eq!(json!(2.5).to_number(), 2.5);
        assert!(json!([1]).to_number().is_nan());
        assert!(json!({"a": 1}).to_number().is_nan());
    }

    #[test]
    fn missing_is_nan() {
        assert!(None::<i32>.to_number().is_nan());
        assert_eq!(Some(3u8).to_number(), 3.0);
    }
}
