//! Tolerant field deserializers for treatment records.
//!
//! Records come from stored files and API clients. A wrong-typed or `null` field must not
//! fail the surrounding list, so these helpers never error on a well-formed JSON value;
//! validation happens later in [`crate::TreatmentPeriod::from_record`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Text field: strings pass through, `null` becomes empty, other scalars keep their JSON text.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Day count: whole numbers, or strings holding one. Anything else reads as absent.
pub fn days<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}
