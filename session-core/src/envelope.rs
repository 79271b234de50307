//! Unwrapping of `{ "<key>": [ ... ] }` list envelopes.
//!
//! List endpoints wrap their items in a single-key object. Absent bodies,
//! missing keys, and explicit nulls all decode to an empty sequence; a list
//! is never an absence.

use crate::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) fn unwrap_list<T: DeserializeOwned>(body: &[u8], key: &str) -> Result<Vec<T>> {
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let mut envelope: Value = serde_json::from_slice(body)?;
    match envelope.get_mut(key).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(items) => Ok(serde_json::from_value(items)?),
    }
}
