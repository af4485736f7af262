//! Does generated output need the `Decimal128` import?
//!
//! Independent of annotation: an enum node that gets no hint still references
//! the storage type, so it still counts.
use serde_json::Value;

use crate::mapping::{marker_names, BSON_TYPE_KEY, DECIMAL_BSON_TYPE};

pub fn requires_decimal_import(node: &Value) -> bool {
    match node {
        Value::Object(map) => {
            map.get(BSON_TYPE_KEY)
                .is_some_and(|marker| marker_names(marker, DECIMAL_BSON_TYPE))
                || map.values().any(requires_decimal_import)
        }
        Value::Array(xs) => xs.iter().any(requires_decimal_import),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}
