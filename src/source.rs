//! Where `$jsonSchema` validators come from.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document};
use mongodb::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::Connection;
use crate::error::Error;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// One collection (or file) and its validator schema, if it has one.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSchema {
    pub name: String,
    pub schema: Option<Value>,
}

#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Entries in source order.
    async fn fetch(&self) -> Result<Vec<CollectionSchema>, Error>;
}

/// Every collection of one database, with its `validator.$jsonSchema`.
#[derive(Debug, Clone)]
pub struct MongoSchemaSource {
    connection: Connection,
}

/// Schema documents on disk. Literal paths or quoted glob patterns.
#[derive(Debug, Clone)]
pub struct FileSchemaSource {
    pub patterns: Vec<String>,
    /// JSON Pointer selecting the schema inside each document
    /// (e.g. `/options/validator/$jsonSchema`).
    pub json_pointer: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

const JSON_SCHEMA_OPERATOR: &str = "$jsonSchema";

impl MongoSchemaSource {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl SchemaSource for MongoSchemaSource {
    async fn fetch(&self) -> Result<Vec<CollectionSchema>, Error> {
        let client = Client::with_uri_str(&self.connection.uri).await?;
        let db = client.database(&self.connection.database);
        debug!(database = %self.connection.database, "listing collections");

        let mut cursor = db.list_collections().await?;
        let mut out = Vec::new();
        while let Some(spec) = cursor.try_next().await? {
            let schema = spec.options.validator.as_ref().and_then(json_schema_of);
            out.push(CollectionSchema { name: spec.name, schema });
        }
        Ok(out)
    }
}

/// The `$jsonSchema` part of a validator, as relaxed extended JSON. Query
/// operator validators without one yield `None`.
fn json_schema_of(validator: &Document) -> Option<Value> {
    let schema = validator.get_document(JSON_SCHEMA_OPERATOR).ok()?;
    Some(Bson::Document(schema.clone()).into_relaxed_extjson())
}

#[async_trait]
impl SchemaSource for FileSchemaSource {
    async fn fetch(&self) -> Result<Vec<CollectionSchema>, Error> {
        let mut out = Vec::new();
        for source_path in resolve_file_path_patterns(&self.patterns)? {
            let source = tokio::fs::read_to_string(&source_path)
                .await
                .map_err(Error::io(&source_path))?;
            let document = crate::path_de::from_str_with_path::<Value>(&source)
                .map_err(|reason| Error::Parse { path: source_path.clone(), reason })?;
            let schema = match self.json_pointer.as_deref() {
                None => Some(document),
                Some(pointer) => document.pointer(pointer).cloned(),
            };
            out.push(CollectionSchema { name: file_stem(&source_path), schema });
        }
        Ok(out)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, Error>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern)? {
            match entry {
                Ok(p) => out.push(p),
                Err(e) => {
                    let path = e.path().to_path_buf();
                    return Err(Error::io(path)(e.into()));
                }
            }
        }
        if out.len() == before {
            // an explicit glob that matched nothing is a mistake, not an empty run
            return Err(Error::NoGlobMatch { pattern: pattern.to_string() });
        }
    }

    Ok(out)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
