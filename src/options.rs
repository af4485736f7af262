//! Compiler tuning options and their one default table.
//!
//! Merging is explicit and field-by-field: a `Some` in the overriding partial
//! replaces the field, a `None` keeps what was there.
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Lines of the comment block placed above the generated declarations.
    pub banner_comment: Vec<String>,
    /// `tsEnumNames` enums become `const enum` instead of `enum`.
    pub enable_const_enums: bool,
    /// Don't turn `minItems`/`maxItems` into tuple types.
    pub ignore_min_and_max_items: bool,
    /// Index signatures read `T | undefined`.
    pub strict_index_signatures: bool,
    /// Untyped values are `unknown` rather than `any`.
    pub unknown_any: bool,
}

/// Same fields as [`Options`], each optional. Deserializes leniently: a field
/// with the wrong JSON type reads as absent instead of failing the whole
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialOptions {
    #[serde(default, deserialize_with = "lenient")]
    pub banner_comment: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub enable_const_enums: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub ignore_min_and_max_items: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub strict_index_signatures: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub unknown_any: Option<bool>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for Options {
    fn default() -> Self {
        Self {
            banner_comment: [
                "/* eslint-disable */",
                "/**",
                " * This file was automatically generated by bson-typegen.",
                " * DO NOT MODIFY IT BY HAND. Instead, modify the collection's $jsonSchema",
                " * validator and rerun bson-typegen to regenerate this file.",
                " */",
            ]
            .map(String::from)
            .to_vec(),
            enable_const_enums: true,
            ignore_min_and_max_items: false,
            strict_index_signatures: false,
            unknown_any: true,
        }
    }
}

impl Options {
    pub fn merge(self, over: &PartialOptions) -> Self {
        Self {
            banner_comment: over.banner_comment.clone().unwrap_or(self.banner_comment),
            enable_const_enums: over.enable_const_enums.unwrap_or(self.enable_const_enums),
            ignore_min_and_max_items: over
                .ignore_min_and_max_items
                .unwrap_or(self.ignore_min_and_max_items),
            strict_index_signatures: over
                .strict_index_signatures
                .unwrap_or(self.strict_index_signatures),
            unknown_any: over.unknown_any.unwrap_or(self.unknown_any),
        }
    }
}

impl From<Options> for PartialOptions {
    fn from(options: Options) -> Self {
        Self {
            banner_comment: Some(options.banner_comment),
            enable_const_enums: Some(options.enable_const_enums),
            ignore_min_and_max_items: Some(options.ignore_min_and_max_items),
            strict_index_signatures: Some(options.strict_index_signatures),
            unknown_any: Some(options.unknown_any),
        }
    }
}

/// Read any JSON value, keep it only if it fits `T`.
pub(crate) fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(de)?;
    Ok(serde_json::from_value(value).ok())
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
