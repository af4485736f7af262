//! Annotate → detect → merge options → delegate.
use serde_json::Value;

use crate::annotate::annotate;
use crate::detect::requires_decimal_import;
use crate::mapping::DECIMAL_IMPORT;
use crate::options::{Options, PartialOptions};
use crate::typegen::{CompileError, CompilerOptions, SchemaCompiler};

/// Generate type definitions for one `$jsonSchema` validator.
///
/// `overrides` is merged over [`Options::default`]. Errors from the compiler
/// come back untouched; the output text is not post-processed.
pub async fn compile<C>(
    compiler: &C,
    schema: &Value,
    overrides: &PartialOptions,
) -> Result<String, CompileError>
where
    C: SchemaCompiler + ?Sized,
{
    let annotated = annotate(schema);
    let options = Options::default().merge(overrides);

    // markers survive annotation untouched, so the original tree is enough
    let mut banner = options.banner_comment;
    if requires_decimal_import(schema) {
        banner.push(DECIMAL_IMPORT.to_string());
    }

    let resolved = CompilerOptions {
        banner_comment: banner.join("\n"),
        enable_const_enums: options.enable_const_enums,
        ignore_min_and_max_items: options.ignore_min_and_max_items,
        strict_index_signatures: options.strict_index_signatures,
        unknown_any: options.unknown_any,
    };
    compiler.compile(&annotated, "", &resolved).await
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typegen::TypeScriptCompiler;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records what it was handed and echoes the banner.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(Value, String, CompilerOptions)>>,
    }

    #[async_trait]
    impl SchemaCompiler for Recorder {
        async fn compile(
            &self,
            schema: &Value,
            root_name: &str,
            options: &CompilerOptions,
        ) -> Result<String, CompileError> {
            self.seen
                .lock()
                .unwrap()
                .push((schema.clone(), root_name.to_string(), options.clone()));
            Ok(options.banner_comment.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl SchemaCompiler for Failing {
        async fn compile(&self, _: &Value, _: &str, _: &CompilerOptions) -> Result<String, CompileError> {
            Err(CompileError::Malformed { pointer: "#".into(), reason: "nope".into() })
        }
    }

    #[tokio::test]
    async fn end_to_end_decimal_field() {
        let schema = json!({"type": "object", "properties": {"amt": {"bsonType": "decimal"}, "title": "X"}});
        let out = compile(&TypeScriptCompiler, &schema, &PartialOptions::default()).await.unwrap();
        assert!(out.contains(r#"import { Decimal128 } from "bson";"#), "{out}");
        assert!(out.contains("amt?: Decimal128;"), "{out}");
        assert!(out.starts_with("/* eslint-disable */\n"));
    }

    #[tokio::test]
    async fn union_hint_inside_all_of_stays_grouped() {
        let schema = json!({
            "title": "T",
            "properties": {
                "f": {"allOf": [
                    {"bsonType": ["string", "null"]},
                    {"title": "Tagged", "properties": {"tag": {"bsonType": "string"}}}
                ]}
            }
        });
        let out = compile(&TypeScriptCompiler, &schema, &PartialOptions::default()).await.unwrap();
        assert!(out.contains("f?: (string|null) & Tagged;"), "{out}");
    }

    #[tokio::test]
    async fn no_import_without_decimal() {
        let schema = json!({"title": "T", "properties": {"n": {"bsonType": "number"}}});
        let out = compile(&TypeScriptCompiler, &schema, &PartialOptions::default()).await.unwrap();
        assert!(!out.contains("import"));
        assert!(out.contains("n?: number;"));
    }

    #[tokio::test]
    async fn hands_annotated_schema_and_empty_root_name() {
        let rec = Recorder::default();
        let schema = json!({"properties": {"at": {"bsonType": "date"}}});
        compile(&rec, &schema, &PartialOptions::default()).await.unwrap();

        let seen = rec.seen.lock().unwrap();
        let (handed, root_name, options) = &seen[0];
        assert_eq!(handed["properties"]["at"]["tsType"], "Date");
        assert_eq!(root_name, "");
        assert_eq!(options.banner_comment, Options::default().banner_comment.join("\n"));
        assert!(options.unknown_any);
    }

    #[tokio::test]
    async fn overrides_and_import_line_land_in_banner() {
        let rec = Recorder::default();
        let overrides = PartialOptions {
            banner_comment: Some(vec!["// a".into(), "// b".into()]),
            strict_index_signatures: Some(true),
            ..PartialOptions::default()
        };
        // the import is required even though the enum node gets no hint
        let schema = json!({"properties": {"p": {"bsonType": "decimal", "enum": ["1.5"]}}});
        let banner = compile(&rec, &schema, &overrides).await.unwrap();
        assert_eq!(banner, "// a\n// b\nimport { Decimal128 } from \"bson\";");

        let seen = rec.seen.lock().unwrap();
        assert!(seen[0].2.strict_index_signatures);
        assert!(seen[0].0["properties"]["p"].get("tsType").is_none());
    }

    #[tokio::test]
    async fn compiler_errors_propagate() {
        let err = compile(&Failing, &json!({}), &PartialOptions::default()).await.unwrap_err();
        assert!(matches!(err, CompileError::Malformed { ref reason, .. } if reason == "nope"));
    }
}
