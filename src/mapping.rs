//! BSON type name → TypeScript type name.
//!
//! The reserved keys below are shared by the annotator and the import
//! detector; both must read the exact same marker.
use serde_json::Value;

// ————————————————————————————————————————————————————————————————————————————
// RESERVED KEYS
// ————————————————————————————————————————————————————————————————————————————

/// MongoDB's storage-type keyword.
pub const BSON_TYPE_KEY: &str = "bsonType";

/// Presence alone marks a literal-union node.
pub const ENUM_KEY: &str = "enum";

/// The compiler's custom-type extension point.
pub const TS_TYPE_KEY: &str = "tsType";

/// The one BSON type whose representation needs an import in generated code.
pub const DECIMAL_BSON_TYPE: &str = "decimal";

/// Representation type for [`DECIMAL_BSON_TYPE`].
pub const DECIMAL_TS_TYPE: &str = "Decimal128";

/// Import line emitted when any node references [`DECIMAL_BSON_TYPE`].
pub const DECIMAL_IMPORT: &str = r#"import { Decimal128 } from "bson";"#;

const TYPE_TABLE: &[(&str, &str)] = &[
    ("number", "number"),
    ("string", "string"),
    ("bool", "boolean"),
    ("date", "Date"),
    ("null", "null"),
    (DECIMAL_BSON_TYPE, DECIMAL_TS_TYPE),
];

// ————————————————————————————————————————————————————————————————————————————
// MAPPING
// ————————————————————————————————————————————————————————————————————————————

/// Look up a single BSON type name. Anything outside the table is `None`.
pub fn map_bson_type(bson_type: &str) -> Option<&'static str> {
    TYPE_TABLE
        .iter()
        .find(|(name, _)| *name == bson_type)
        .map(|(_, ts)| *ts)
}

/// Map a raw `bsonType` marker to a hint string.
///
/// Arrays become a `|`-joined union of the mapped members, in order; members
/// without a mapping (or that aren't strings) are dropped. An empty string
/// means "no hint".
pub fn map_bson_types(marker: &Value) -> String {
    match marker {
        Value::String(name) => map_bson_type(name).unwrap_or_default().to_string(),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .filter_map(map_bson_type)
            .collect::<Vec<_>>()
            .join("|"),
        _ => String::new(),
    }
}

/// Does this marker (scalar or array) name `bson_type`?
pub fn marker_names(marker: &Value, bson_type: &str) -> bool {
    match marker {
        Value::String(name) => name == bson_type,
        Value::Array(names) => names.iter().any(|x| x.as_str() == Some(bson_type)),
        _ => false,
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_names() {
        assert_eq!(map_bson_type("number"), Some("number"));
        assert_eq!(map_bson_type("bool"), Some("boolean"));
        assert_eq!(map_bson_type("date"), Some("Date"));
        assert_eq!(map_bson_type("decimal"), Some("Decimal128"));
        assert_eq!(map_bson_type("bogus"), None);
        // explicitly unmapped BSON types
        assert_eq!(map_bson_type("objectId"), None);
        assert_eq!(map_bson_type("object"), None);
    }

    #[test]
    fn unions_keep_order() {
        assert_eq!(map_bson_types(&json!(["string", "bool"])), "string|boolean");
        assert_eq!(map_bson_types(&json!(["null", "decimal"])), "null|Decimal128");
    }

    #[test]
    fn unknown_members_drop_silently() {
        assert_eq!(map_bson_types(&json!(["number", "bogus"])), "number");
        assert_eq!(map_bson_types(&json!(["bogus", 7, "int"])), "");
        assert_eq!(map_bson_types(&json!("bogus")), "");
        assert_eq!(map_bson_types(&json!(42)), "");
    }

    #[test]
    fn marker_membership() {
        assert!(marker_names(&json!("decimal"), DECIMAL_BSON_TYPE));
        assert!(marker_names(&json!(["null", "decimal"]), DECIMAL_BSON_TYPE));
        assert!(!marker_names(&json!(["null", "number"]), DECIMAL_BSON_TYPE));
        assert!(!marker_names(&json!({"decimal": true}), DECIMAL_BSON_TYPE));
    }
}
