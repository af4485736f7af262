//! Inject `tsType` hints derived from `bsonType` markers.
//!
//! Purely additive: the output tree holds every input key/value verbatim, plus
//! `tsType` on object nodes whose marker maps to something. Enum nodes never
//! get a hint, the compiler infers their literal union itself.
use serde_json::{Map, Value};

use crate::mapping::{map_bson_types, BSON_TYPE_KEY, ENUM_KEY, TS_TYPE_KEY};

/// Build an annotated copy of `node`. Never fails.
pub fn annotate(node: &Value) -> Value {
    match node {
        Value::Array(xs) => Value::Array(xs.iter().map(annotate).collect()),
        Value::Object(map) => Value::Object(annotate_object(map)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => node.clone(),
    }
}

fn annotate_object(map: &Map<String, Value>) -> Map<String, Value> {
    let is_enum = map.contains_key(ENUM_KEY);
    let hint = map.get(BSON_TYPE_KEY).map(map_bson_types);

    let mut out = Map::with_capacity(map.len() + 1);
    for (k, v) in map {
        out.insert(k.clone(), annotate(v));
    }

    // an all-unknown union comes back as "" which is not a hint
    if let Some(hint) = hint.filter(|h| !is_enum && !h.is_empty()) {
        // overwrites in place when the key already exists
        out.insert(TS_TYPE_KEY.to_string(), Value::String(hint));
    }
    out
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
