//! Lenient field deserializers shared by the row types.
//!
//! Use the fully-qualified path in serde attributes, e.g.
//! `#[serde(default, deserialize_with = "crate::serde_helpers::id_opt")]`.

use crate::value::format_number;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Identifier/number cell as it shows up in API payloads.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_id(self) -> Option<String> {
        let id = match self {
            Scalar::Text(s) => {
                let trimmed = s.trim();
                if trimmed.len() == s.len() {
                    s
                } else {
                    trimmed.to_string()
                }
            }
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => format_number(f),
            Scalar::Bool(b) => b.to_string(),
        };
        (!id.is_empty()).then_some(id)
    }

    fn to_f64(&self) -> Option<f64> {
        match self {
            Scalar::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Bool(_) => None,
        }
    }
}

/// Optional identifier: strings are trimmed, numbers are rendered, empty becomes `None`.
pub(crate) fn id_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(raw.and_then(Scalar::into_id))
}

/// Required identifier.
pub(crate) fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    id_opt(deserializer)?.ok_or_else(|| D::Error::custom("empty identifier"))
}

/// Metric value: JSON numbers or numeric strings, anything else counts as `0`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Scalar::to_f64).unwrap_or(0.0))
}
