use std::fmt;

/// Separator that string fields use internally in place of `/`.
pub const PATH_SEPARATOR: &str = "\\";

/// The declared type of a rule field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Int,
    Float,
    Bool,
}

impl FieldKind {
    /// Convert substituted field text into a typed [`Value`].
    ///
    /// String fields have every `/` rewritten to [`PATH_SEPARATOR`]. Numeric
    /// and boolean fields accept surrounding whitespace; booleans are
    /// case-insensitive. Returns `None` when the text is not valid for the kind.
    #[must_use]
    pub fn coerce(self, text: &str) -> Option<Value> {
        match self {
            FieldKind::String => Some(Value::String(text.replace('/', PATH_SEPARATOR))),
            FieldKind::Int => text.trim().parse().ok().map(Value::Int),
            FieldKind::Float => text.trim().parse().ok().map(Value::Float),
            FieldKind::Bool => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("true") {
                    Some(Value::Bool(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Some(Value::Bool(false))
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => write!(f, "string"),
            FieldKind::Int => write!(f, "integer"),
            FieldKind::Float => write!(f, "float"),
            FieldKind::Bool => write!(f, "boolean"),
        }
    }
}

/// A coerced field value, handed to a rule kind's setter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// A UTF-8 string.
    String(String),
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Int(_) => FieldKind::Int,
            Value::Float(_) => FieldKind::Float,
            Value::Bool(_) => FieldKind::Bool,
            Value::String(_) => FieldKind::String,
        }
    }
}

/// Rust types a rule field can be declared as.
///
/// The associated [`FieldKind`] decides how the field's text is coerced;
/// [`from_value`](FieldValue::from_value) unwraps the coerced [`Value`].
pub trait FieldValue: Sized + 'static {
    const KIND: FieldKind;

    fn from_value(value: Value) -> Option<Self>;
}

impl FieldValue for String {
    const KIND: FieldKind = FieldKind::String;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FieldValue for Option<String> {
    const KIND: FieldKind = FieldKind::String;

    fn from_value(value: Value) -> Option<Self> {
        String::from_value(value).map(Some)
    }
}

impl FieldValue for i64 {
    const KIND: FieldKind = FieldKind::Int;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl FieldValue for i32 {
    const KIND: FieldKind = FieldKind::Int;

    fn from_value(value: Value) -> Option<Self> {
        i64::from_value(value).and_then(|v| i32::try_from(v).ok())
    }
}

impl FieldValue for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl FieldValue for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_string_rewrites_slashes() {
        assert_eq!(
            FieldKind::String.coerce("src/lib/mod.rs"),
            Some(Value::String("src\\lib\\mod.rs".into()))
        );
        assert_eq!(
            FieldKind::String.coerce("plain"),
            Some(Value::String("plain".into()))
        );
    }

    #[test]
    fn coerce_int() {
        assert_eq!(FieldKind::Int.coerce("42"), Some(Value::Int(42)));
        assert_eq!(FieldKind::Int.coerce(" -7 "), Some(Value::Int(-7)));
        assert_eq!(FieldKind::Int.coerce("4.2"), None);
        assert_eq!(FieldKind::Int.coerce(""), None);
    }

    #[test]
    fn coerce_float() {
        assert_eq!(FieldKind::Float.coerce("3.5"), Some(Value::Float(3.5)));
        assert_eq!(FieldKind::Float.coerce("10"), Some(Value::Float(10.0)));
        assert_eq!(FieldKind::Float.coerce("ten"), None);
    }

    #[test]
    fn coerce_bool_is_case_insensitive() {
        assert_eq!(FieldKind::Bool.coerce("true"), Some(Value::Bool(true)));
        assert_eq!(FieldKind::Bool.coerce("False"), Some(Value::Bool(false)));
        assert_eq!(FieldKind::Bool.coerce("TRUE"), Some(Value::Bool(true)));
        assert_eq!(FieldKind::Bool.coerce("yes"), None);
        assert_eq!(FieldKind::Bool.coerce("1"), None);
    }

    #[test]
    fn field_value_unwraps_matching_kind() {
        assert_eq!(String::from_value(Value::from("a")), Some("a".to_owned()));
        assert_eq!(
            Option::<String>::from_value(Value::from("a")),
            Some(Some("a".to_owned()))
        );
        assert_eq!(i64::from_value(Value::Int(3)), Some(3));
        assert_eq!(i32::from_value(Value::Int(i64::MAX)), None);
        assert_eq!(f64::from_value(Value::Float(0.5)), Some(0.5));
        assert_eq!(bool::from_value(Value::Bool(true)), Some(true));
        assert_eq!(bool::from_value(Value::Int(1)), None);
    }

    #[test]
    fn value_kind() {
        assert_eq!(Value::Int(1).kind(), FieldKind::Int);
        assert_eq!(Value::Float(1.0).kind(), FieldKind::Float);
        assert_eq!(Value::Bool(false).kind(), FieldKind::Bool);
        assert_eq!(Value::from("x").kind(), FieldKind::String);
    }

    #[test]
    fn display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::String("hello".into()).to_string(), "\"hello\"");
        assert_eq!(FieldKind::Float.to_string(), "float");
    }
}
