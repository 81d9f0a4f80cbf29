//! Dynamic attribute values.

use serde_json::Value as Json;

use crate::model::Instance;

/// A generated attribute value.
///
/// Plain data is carried as JSON. Relational generators may hand back the related
/// [`Instance`] itself when it exposes no primary key.
#[derive(Debug, Clone)]
pub enum Value {
    Json(Json),
    Instance(Instance),
}

impl Value {
    pub const NULL: Value = Value::Json(Json::Null);

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Json(Json::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Json(json) => json.as_str(),
            Value::Instance(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Json(json) => json.as_i64(),
            Value::Instance(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Json(json) => json.as_u64(),
            Value::Instance(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Json(json) => json.as_f64(),
            Value::Instance(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Json(json) => json.as_bool(),
            Value::Instance(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Json> {
        match self {
            Value::Json(json) => Some(json),
            Value::Instance(_) => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            Value::Json(_) => None,
        }
    }

    /// Consumes the value, returning the string if it holds one.
    pub fn into_string(self) -> Option<String> {
        match self {
            Value::Json(Json::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Renders the value as JSON, expanding instances through [`Instance::to_json`].
    pub fn to_json(&self) -> Json {
        match self {
            Value::Json(json) => json.clone(),
            Value::Instance(instance) => instance.to_json(),
        }
    }

    /// Key used to compare values for uniqueness.
    pub(crate) fn identity_key(&self) -> String {
        match self {
            Value::Json(json) => json.to_string(),
            Value::Instance(instance) => format!("instance:{}", instance.id()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::NULL
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Json(a), Value::Json(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Instance(instance)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::NULL)
    }
}

macro_rules! json_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Json(Json::from(value))
                }
            }
        )*
    };
}

json_value_from!(Json, &str, String, bool, i32, i64, u32, u64, usize, f64, Vec<Json>);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from("ada").as_str(), Some("ada"));
        assert_eq!(Value::from(42i64).as_i64(), Some(42));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some(3.5)).as_f64(), Some(3.5));
    }

    #[test]
    fn test_identity_key_distinguishes_types() {
        assert_ne!(Value::from("1").identity_key(), Value::from(1i64).identity_key());
        assert_eq!(Value::from(json!({"a": 1})).identity_key(), "{\"a\":1}");
    }
}
