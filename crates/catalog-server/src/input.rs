//! Raw request field access.
//!
//! DTO builders depend only on [`RequestInput`], never on axum extractors,
//! so the same normalizer runs over JSON bodies, query strings and multipart
//! text fields.

use serde_json::{Map, Value};

/// Untyped view of the fields a client sent.
pub trait RequestInput {
    /// The raw value for `name`, or `None` when the key was not sent.
    /// An explicit JSON `null` is `Some(Value::Null)`.
    fn input(&self, name: &str) -> Option<&Value>;

    fn has(&self, name: &str) -> bool {
        self.input(name).is_some()
    }

    /// Truthy coercion with a fallback for absent keys.
    fn boolean(&self, name: &str, default: bool) -> bool {
        match self.input(name) {
            Some(value) => truthy(value),
            None => default,
        }
    }

    /// The value as text. Numbers and booleans are stringified; null,
    /// arrays and objects yield `None`.
    fn string(&self, name: &str) -> Option<String> {
        self.input(name).and_then(value_as_string)
    }

    fn input_or(&self, name: &str, default: &str) -> String {
        self.string(name).unwrap_or_else(|| default.to_string())
    }
}

/// Interpret a raw value the way HTML forms and JSON clients encode flags.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        ),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// [`RequestInput`] over a JSON object.
#[derive(Debug, Clone, Default)]
pub struct JsonInput {
    fields: Map<String, Value>,
}

impl JsonInput {
    /// Wrap any JSON value. Non-object bodies carry no fields.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

impl RequestInput for JsonInput {
    fn input(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Query-string pairs in arrival order. A key sent more than once, or sent
/// with the `key[]` suffix, becomes an array of its values; any other key
/// holds its single value as a string.
impl From<Vec<(String, String)>> for JsonInput {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let mut fields = Map::new();
        for (key, value) in pairs {
            let (key, listed) = match key.strip_suffix("[]") {
                Some(base) => (base.to_string(), true),
                None => (key, false),
            };
            let value = Value::String(value);
            match fields.get_mut(&key) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None if listed => {
                    fields.insert(key, Value::Array(vec![value]));
                }
                None => {
                    fields.insert(key, value);
                }
            }
        }
        Self { fields }
    }
}
