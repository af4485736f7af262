//! Generic JSON Schema → TypeScript compiler.
//!
//! Knows standard JSON Schema plus the `tsType` extension; nothing about BSON.
//! The orchestrator talks to it only through [`SchemaCompiler`], so another
//! backend can stand in.
pub mod codegen;
pub mod ir;
pub mod lower;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Fully resolved options as the compiler sees them: the banner is already a
/// single comment string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub banner_comment: String,
    pub enable_const_enums: bool,
    pub ignore_min_and_max_items: bool,
    pub strict_index_signatures: bool,
    pub unknown_any: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("malformed schema at {pointer}: {reason}")]
    Malformed { pointer: String, reason: String },
}

#[async_trait]
pub trait SchemaCompiler: Send + Sync {
    async fn compile(
        &self,
        schema: &Value,
        root_name: &str,
        options: &CompilerOptions,
    ) -> Result<String, CompileError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptCompiler;

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            banner_comment: String::new(),
            enable_const_enums: true,
            ignore_min_and_max_items: false,
            strict_index_signatures: false,
            unknown_any: true,
        }
    }
}

impl TypeScriptCompiler {
    pub fn compile_sync(
        &self,
        schema: &Value,
        root_name: &str,
        options: &CompilerOptions,
    ) -> Result<String, CompileError> {
        let decls = lower::lower_root(schema, root_name, options)?;
        debug!(root = decls.first().map(ir::Decl::name), declarations = decls.len(), "lowered schema");
        let mut cg = codegen::Codegen::new(options);
        cg.emit_all(&decls);
        Ok(cg.into_string())
    }
}

#[async_trait]
impl SchemaCompiler for TypeScriptCompiler {
    async fn compile(
        &self,
        schema: &Value,
        root_name: &str,
        options: &CompilerOptions,
    ) -> Result<String, CompileError> {
        self.compile_sync(schema, root_name, options)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn compiles_a_validator_shaped_schema() {
        let schema = json!({
            "title": "product",
            "bsonType": "object",
            "required": ["sku", "price"],
            "properties": {
                "sku": {"bsonType": "string", "tsType": "string"},
                "price": {"bsonType": "decimal", "tsType": "Decimal128"},
                "tags": {"bsonType": "array", "items": {"bsonType": "string", "tsType": "string"}},
                "kind": {"bsonType": "string", "enum": ["digital", "physical"]}
            },
            "additionalProperties": false
        });
        let out = TypeScriptCompiler
            .compile(&schema, "", &CompilerOptions::default())
            .await
            .unwrap();
        let expected = "\
export interface Product {
  sku: string;
  price: Decimal128;
  tags?: string[];
  kind?: \"digital\" | \"physical\";
}
";
        assert_eq!(out, expected);
    }

    #[tokio::test]
    async fn malformed_schema_fails() {
        let err = TypeScriptCompiler
            .compile(&json!({"properties": 1}), "", &CompilerOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "malformed schema at #/properties: `properties` must be an object");
    }
}
