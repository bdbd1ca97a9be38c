use ordered_float::OrderedFloat;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Scalar cell value of a schema-free [`crate::Record`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Value {
    /// `null` / missing value.
    #[default]
    Blank,
    Number(OrderedFloat<f64>),
    Text(Arc<str>),
}

impl Value {
    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Blank)
    }

    /// The trimmed string form used when comparing against filter clause values.
    ///
    /// Blank values have no key; they only match the literal clause values `""` and `"null"`.
    pub fn filter_key(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Blank => None,
            Value::Number(n) => Some(Cow::Owned(format_number(n.0))),
            Value::Text(s) => Some(Cow::Borrowed(s.trim())),
        }
    }

    /// Numeric view of the value. Numeric strings (`"12.5"`) are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Blank => None,
            Value::Number(n) => Some(n.0),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_ref()),
            _ => None,
        }
    }
}

/// Render a number the way a JavaScript `String(n)` would for the values dashboards carry:
/// integral values drop the fractional part and negative zero renders as `0`.
pub(crate) fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    n.to_string()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Blank => Ok(()),
            Value::Number(n) => f.write_str(&format_number(n.0)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(OrderedFloat(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(OrderedFloat(value as f64))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(OrderedFloat(value as f64))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Text(Arc::from(if value { "true" } else { "false" }))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(Arc::from(value))
    }
}

impl From<Arc<str>> for Value {
    fn from(value: Arc<str>) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Blank)
    }
}
