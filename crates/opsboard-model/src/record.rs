use crate::value::Value;
use std::collections::BTreeMap;

/// A schema-free dashboard row: field name to scalar value.
///
/// Different datasets expose different field sets, and any individual record may lack a field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build a record from a JSON object.
    ///
    /// - `null` becomes [`Value::Blank`]
    /// - booleans become `"true"` / `"false"`
    /// - `{ "value": <scalar> }` wrappers are unwrapped
    /// - any other nested object/array is skipped
    ///
    /// Returns `None` when `json` is not an object.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        let object = json.as_object()?;
        let mut record = Record::new();
        for (field, raw) in object {
            match scalar_from_json(raw) {
                Some(value) => record.insert(field.as_str(), value),
                None => log::debug!("record field {field:?} is not a scalar; skipped"),
            }
        }
        Some(record)
    }
}

fn scalar_from_json(raw: &serde_json::Value) -> Option<Value> {
    match raw {
        serde_json::Value::Null => Some(Value::Blank),
        serde_json::Value::Bool(b) => Some(Value::from(*b)),
        serde_json::Value::Number(n) => n.as_f64().map(Value::from),
        serde_json::Value::String(s) => Some(Value::from(s.as_str())),
        serde_json::Value::Object(map) if map.len() == 1 => {
            map.get("value").and_then(|inner| match inner {
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => None,
                other => scalar_from_json(other),
            })
        }
        _ => None,
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
