//! Text form of values and the default comparator built on it.
//!
//! Without an explicit comparer, sort keys are compared by their text form,
//! ordinally. A value with no text form ("undefined", e.g. `None`) orders after
//! every value that has one.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value;

pub trait ToText {
    /// `None` marks an undefined value.
    fn to_text(&self) -> Option<Cow<'_, str>>;
}

impl ToText for str {
    fn to_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl ToText for String {
    fn to_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_str()))
    }
}

impl ToText for Cow<'_, str> {
    fn to_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_ref()))
    }
}

impl ToText for char {
    fn to_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }
}

impl ToText for bool {
    fn to_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(if *self { "true" } else { "false" }))
    }
}

macro_rules! impl_to_text_display {
    ($($t:ty),* $(,)?) => {
        $(
            impl ToText for $t {
                fn to_text(&self) -> Option<Cow<'_, str>> {
                    Some(Cow::Owned(self.to_string()))
                }
            }
        )*
    };
}

impl_to_text_display!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl ToText for f64 {
    fn to_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(format_number(*self)))
    }
}

impl ToText for f32 {
    fn to_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(format_number(f64::from(*self))))
    }
}

impl<T: ToText + ?Sized> ToText for &T {
    fn to_text(&self) -> Option<Cow<'_, str>> {
        (**self).to_text()
    }
}

impl<T: ToText + ?Sized> ToText for Box<T> {
    fn to_text(&self) -> Option<Cow<'_, str>> {
        (**self).to_text()
    }
}

impl<T: ToText> ToText for Option<T> {
    fn to_text(&self) -> Option<Cow<'_, str>> {
        self.as_ref()?.to_text()
    }
}

impl ToText for Value {
    fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::Bool(b) => b.to_text(),
            Value::Number(n) => Some(match n.as_f64() {
                Some(f) if n.is_f64() => Cow::Owned(format_number(f)),
                _ => Cow::Owned(n.to_string()),
            }),
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Array(items) => Some(Cow::Owned(join_text(items, ","))),
            Value::Object(_) => Some(Cow::Borrowed("[object Object]")),
        }
    }
}

/// Numbers as text: integral values without a fraction, infinities spelled out,
/// negative zero as `0`. Magnitudes from `1e21` up and below `1e-6` switch to
/// exponent form with a signed exponent (`1e+21`, `1.5e-7`).
pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let text = if v > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if v == 0.0 {
        "0".to_string()
    } else if v.abs() >= 1e21 || v.abs() < 1e-6 {
        let text = format!("{v:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        // f64's Display already drops a trailing ".0".
        v.to_string()
    }
}

/// Join the text form of `items`; undefined items contribute an empty string.
pub fn join_text<I>(items: I, separator: &str) -> String
where
    I: IntoIterator,
    I::Item: ToText,
{
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        if let Some(text) = item.to_text() {
            out.push_str(&text);
        }
    }
    out
}

/// Ordinal comparison of text forms, undefined last.
pub fn default_compare<T: ToText + ?Sized>(a: &T, b: &T) -> Ordering {
    match (a.to_text(), b.to_text()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_compare_as_text() {
        // "10" < "9" ordinally.
        assert_eq!(default_compare(&10, &9), Ordering::Less);
        assert_eq!(default_compare(&"a", &"b"), Ordering::Less);
    }

    #[test]
    fn undefined_sorts_last() {
        assert_eq!(default_compare(&None, &Some("z")), Ordering::Greater);
        assert_eq!(default_compare(&Some("z"), &None), Ordering::Less);
        assert_eq!(default_compare::<Option<&str>>(&None, &None), Ordering::Equal);
    }

    #[test]
    fn float_text() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn extreme_magnitudes_use_exponents() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e30), "-2.5e+30");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(0.000001), "0.000001");
        // "1e+21" sorts before "2" as text.
        assert_eq!(default_compare(&1e21, &2.0), Ordering::Less);
    }

    #[test]
    fn json_text() {
        assert_eq!(json!("hi").to_text().as_deref(), Some("hi"));
        assert_eq!(json!(2).to_text().as_deref(), Some("2"));
        assert_eq!(json!([1, "a", null]).to_text().as_deref(), Some("1,a,"));
        assert_eq!(json!(null).to_text(), None);
    }

    #[test]
    fn join_skips_undefined() {
        assert_eq!(join_text([Some(1), None, Some(3)], "-"), "1--3");
        assert_eq!(join_text(Vec::<i32>::new(), ","), "");
    }
}
