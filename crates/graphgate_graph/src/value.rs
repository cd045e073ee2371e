//! Typed scalar property values.

use core::fmt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A typed scalar stored as an element property.
///
/// Serializes as the bare JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A boolean.
    Boolean(bool),
    /// A signed 64-bit integer.
    Integer(i64),
    /// A finite 64-bit float.
    Float(f64),
    /// Any other text.
    String(String),
}

impl PropertyValue {
    /// Interprets request text as the narrowest native scalar it spells.
    ///
    /// Integers win over floats, floats over booleans, and anything else is
    /// kept as a string. Non-finite spellings such as `NaN` or `inf` stay
    /// strings. Boolean matching ignores ASCII case.
    ///
    /// ```
    /// use graphgate_graph::PropertyValue;
    ///
    /// assert_eq!(PropertyValue::coerce("1"), PropertyValue::Integer(1));
    /// assert_eq!(PropertyValue::coerce("2.5"), PropertyValue::Float(2.5));
    /// assert_eq!(PropertyValue::coerce("true"), PropertyValue::Boolean(true));
    /// assert_eq!(PropertyValue::coerce("x"), PropertyValue::String("x".into()));
    /// ```
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        if let Ok(integer) = raw.parse::<i64>() {
            return Self::Integer(integer);
        }
        if let Ok(float) = raw.parse::<f64>()
            && float.is_finite()
        {
            return Self::Float(float);
        }
        if raw.eq_ignore_ascii_case("true") {
            return Self::Boolean(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Self::Boolean(false);
        }
        Self::String(raw.to_owned())
    }

    /// Converts a JSON body value into a property value.
    ///
    /// JSON numbers and booleans keep their type, JSON strings go through
    /// [`coerce`](Self::coerce). Arrays, objects and `null` are not scalars
    /// and yield `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(Self::Boolean(*flag)),
            Value::Number(number) => number
                .as_i64()
                .map(Self::Integer)
                .or_else(|| number.as_f64().map(Self::Float)),
            Value::String(text) => Some(Self::coerce(text)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Renders the value as a bare JSON scalar.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Boolean(flag) => Value::Bool(*flag),
            Self::Integer(integer) => Value::from(*integer),
            Self::Float(float) => Value::from(*float),
            Self::String(text) => Value::String(text.clone()),
        }
    }

    /// Returns the lowercase type label used in typed renderings.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(flag) => write!(f, "{flag}"),
            Self::Integer(integer) => write!(f, "{integer}"),
            Self::Float(float) => write!(f, "{float}"),
            Self::String(text) => f.write_str(text),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_prefers_integer_then_float_then_boolean() {
        assert_eq!(PropertyValue::coerce("42"), PropertyValue::Integer(42));
        assert_eq!(PropertyValue::coerce("-7"), PropertyValue::Integer(-7));
        assert_eq!(PropertyValue::coerce("1.25"), PropertyValue::Float(1.25));
        assert_eq!(PropertyValue::coerce("1e3"), PropertyValue::Float(1000.0));
        assert_eq!(PropertyValue::coerce("TRUE"), PropertyValue::Boolean(true));
        assert_eq!(PropertyValue::coerce("false"), PropertyValue::Boolean(false));
    }

    #[test]
    fn coerce_keeps_everything_else_as_text() {
        for raw in ["", "marko", "NaN", "inf", " 1", "1.2.3", "yes"] {
            assert_eq!(PropertyValue::coerce(raw), PropertyValue::String(raw.into()));
        }
    }

    #[test]
    fn integer_overflow_falls_back_to_float() {
        assert_eq!(
            PropertyValue::coerce("9223372036854775808"),
            PropertyValue::Float(9_223_372_036_854_775_808.0)
        );
    }

    #[test]
    fn from_json_keeps_native_scalars() {
        assert_eq!(PropertyValue::from_json(&json!(3)), Some(PropertyValue::Integer(3)));
        assert_eq!(PropertyValue::from_json(&json!(0.5)), Some(PropertyValue::Float(0.5)));
        assert_eq!(PropertyValue::from_json(&json!(false)), Some(PropertyValue::Boolean(false)));
        assert_eq!(PropertyValue::from_json(&json!("10")), Some(PropertyValue::Integer(10)));
        assert_eq!(PropertyValue::from_json(&json!(null)), None);
        assert_eq!(PropertyValue::from_json(&json!([1])), None);
        assert_eq!(PropertyValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn serializes_as_bare_scalar() {
        let values = vec![
            PropertyValue::Integer(1),
            PropertyValue::Boolean(true),
            PropertyValue::String("x".into()),
        ];
        assert_eq!(serde_json::to_value(&values).unwrap(), json!([1, true, "x"]));
        assert_eq!(PropertyValue::Float(2.5).to_json(), json!(2.5));
    }

    #[test]
    fn type_names() {
        assert_eq!(PropertyValue::Integer(1).type_name(), "integer");
        assert_eq!(PropertyValue::Float(1.0).type_name(), "float");
        assert_eq!(PropertyValue::Boolean(true).type_name(), "boolean");
        assert_eq!(PropertyValue::from("a").type_name(), "string");
    }
}
