//! Source → compile → sink, one entry at a time in source order.
//!
//! The first fatal error stops the run; files written before it stay.
use std::path::PathBuf;

use tracing::{debug, info};

use crate::compile::compile;
use crate::error::Error;
use crate::options::{Options, PartialOptions};
use crate::output::{schema_title, OutputSink};
use crate::source::SchemaSource;
use crate::typegen::SchemaCompiler;

#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub compiled: usize,
    /// collections without a validator schema
    pub skipped: Vec<String>,
}

pub async fn run_batch(
    source: &dyn SchemaSource,
    compiler: &dyn SchemaCompiler,
    options: &Options,
    sink: &OutputSink,
) -> Result<BatchReport, Error> {
    let overrides = PartialOptions::from(options.clone());
    let mut report = BatchReport::default();

    for entry in source.fetch().await? {
        let Some(schema) = entry.schema else {
            debug!(collection = %entry.name, "no $jsonSchema, skipping");
            report.skipped.push(entry.name);
            continue;
        };
        let title = schema_title(&entry.name, &schema)?;
        let generated = compile(compiler, &schema, &overrides)
            .await
            .map_err(|source| Error::Compile { collection: entry.name.clone(), source })?;
        report.compiled += 1;
        if let Some(path) = sink.write(title, &generated).await? {
            info!(collection = %entry.name, path = %path.display(), "wrote type definitions");
            report.written.push(path);
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CollectionSchema;
    use crate::typegen::TypeScriptCompiler;
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed(Vec<CollectionSchema>);

    #[async_trait]
    impl SchemaSource for Fixed {
        async fn fetch(&self) -> Result<Vec<CollectionSchema>, Error> {
            Ok(self.0.clone())
        }
    }

    fn entry(name: &str, schema: Option<serde_json::Value>) -> CollectionSchema {
        CollectionSchema { name: name.into(), schema }
    }

    #[tokio::test]
    async fn writes_one_file_per_titled_schema() {
        let dir = tempfile::tempdir().unwrap();
        let source = Fixed(vec![
            entry("users", Some(json!({"title": "User", "bsonType": "object", "properties": {"name": {"bsonType": "string"}}}))),
            entry("logs", None),
            entry("invoices", Some(json!({"title": "Invoice", "properties": {"total": {"bsonType": "decimal"}}}))),
        ]);
        let sink = OutputSink::Directory(dir.path().to_path_buf());
        let report = run_batch(&source, &TypeScriptCompiler, &Options::default(), &sink).await.unwrap();

        assert_eq!(report.written, [dir.path().join("User.ts"), dir.path().join("Invoice.ts")]);
        assert_eq!(report.skipped, ["logs"]);

        let user = std::fs::read_to_string(dir.path().join("User.ts")).unwrap();
        assert!(user.contains("export interface User {"));
        assert!(user.contains("name?: string;"));
        assert!(!user.contains("Decimal128"));

        let invoice = std::fs::read_to_string(dir.path().join("Invoice.ts")).unwrap();
        assert!(invoice.contains("import { Decimal128 } from \"bson\";"));
        assert!(invoice.contains("total?: Decimal128;"));
    }

    #[tokio::test]
    async fn missing_title_aborts_but_keeps_earlier_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = Fixed(vec![
            entry("users", Some(json!({"title": "User"}))),
            entry("orders", Some(json!({"properties": {}}))),
            entry("items", Some(json!({"title": "Item"}))),
        ]);
        let sink = OutputSink::Directory(dir.path().to_path_buf());
        let err = run_batch(&source, &TypeScriptCompiler, &Options::default(), &sink).await.unwrap_err();

        assert!(matches!(err, Error::MissingTitle { ref collection } if collection == "orders"));
        assert!(dir.path().join("User.ts").exists());
        assert!(!dir.path().join("Item.ts").exists());
    }

    #[tokio::test]
    async fn compiler_failure_names_the_collection() {
        let dir = tempfile::tempdir().unwrap();
        let source = Fixed(vec![entry("bad", Some(json!({"title": "Bad", "properties": []})))]);
        let sink = OutputSink::Directory(dir.path().to_path_buf());
        let err = run_batch(&source, &TypeScriptCompiler, &Options::default(), &sink).await.unwrap_err();
        assert!(matches!(err, Error::Compile { ref collection, .. } if collection == "bad"));
    }

    #[tokio::test]
    async fn configured_options_reach_the_compiler() {
        let dir = tempfile::tempdir().unwrap();
        let source = Fixed(vec![entry("m", Some(json!({"title": "M", "type": "object"})))]);
        let options = Options {
            banner_comment: vec!["// custom".into()],
            unknown_any: false,
            ..Options::default()
        };
        let sink = OutputSink::Directory(dir.path().to_path_buf());
        run_batch(&source, &TypeScriptCompiler, &options, &sink).await.unwrap();
        let out = std::fs::read_to_string(dir.path().join("M.ts")).unwrap();
        assert_eq!(out, "// custom\n\nexport interface M {\n  [k: string]: any;\n}\n");
    }
}
