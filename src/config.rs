//! Layered configuration: defaults → `bson-typegen.json` → caller overrides.
//!
//! The file layer never fails. A missing or unparsable file is the same as an
//! empty one, and a field of the wrong type is dropped on its own.
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::Error;
use crate::options::{lenient, Options, PartialOptions};

/// Looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "bson-typegen.json";

pub const DEFAULT_OUTPUT_DIR: &str = "./types";
pub const DEFAULT_URI_VAR: &str = "MONGODB_URI";
pub const DEFAULT_DATABASE_VAR: &str = "MONGODB_DATABASE";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub options: Options,
    /// output directory for generated files
    pub path: PathBuf,
    pub env: EnvNames,
}

/// Names of the environment variables holding the connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvNames {
    pub uri: String,
    pub database: String,
}

/// One configuration layer; also the shape of the JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialConfig {
    #[serde(flatten)]
    pub options: PartialOptions,
    #[serde(default, deserialize_with = "lenient")]
    pub path: Option<PathBuf>,
    #[serde(default, deserialize_with = "lenient")]
    pub env: Option<PartialEnvNames>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PartialEnvNames {
    #[serde(rename = "MONGODB_URI", default, deserialize_with = "lenient")]
    pub uri: Option<String>,
    #[serde(rename = "MONGODB_DATABASE", default, deserialize_with = "lenient")]
    pub database: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub uri: String,
    pub database: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for Config {
    fn default() -> Self {
        Self {
            options: Options::default(),
            path: PathBuf::from(DEFAULT_OUTPUT_DIR),
            env: EnvNames {
                uri: DEFAULT_URI_VAR.to_string(),
                database: DEFAULT_DATABASE_VAR.to_string(),
            },
        }
    }
}

impl Config {
    /// Read the file layer (explicit path or the conventional one) and apply
    /// `overrides` on top.
    pub fn load(file: Option<&Path>, overrides: &PartialConfig) -> Self {
        let file = file.unwrap_or_else(|| Path::new(CONFIG_FILE_NAME));
        Self::default().merge(&read_file_layer(file)).merge(overrides)
    }

    pub fn merge(self, over: &PartialConfig) -> Self {
        let env = over.env.clone().unwrap_or_default();
        Self {
            options: self.options.merge(&over.options),
            path: over.path.clone().unwrap_or(self.path),
            env: EnvNames {
                uri: env.uri.unwrap_or(self.env.uri),
                database: env.database.unwrap_or(self.env.database),
            },
        }
    }
}

impl EnvNames {
    /// Resolve both variables through `lookup`. Missing or empty is fatal.
    pub fn resolve(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Connection, Error> {
        let read = |var: &str| {
            lookup(var)
                .filter(|x| !x.trim().is_empty())
                .ok_or_else(|| Error::MissingEnv { var: var.to_string() })
        };
        Ok(Connection {
            uri: read(&self.uri)?,
            database: read(&self.database)?,
        })
    }
}

/// Parse a config file into a layer, falling back to an empty layer on any
/// failure.
pub fn read_file_layer(path: &Path) -> PartialConfig {
    let source = match std::fs::read_to_string(path) {
        Ok(x) => x,
        Err(error) => {
            debug!(path = %path.display(), %error, "no config file, using defaults");
            return PartialConfig::default();
        }
    };
    match serde_json::from_str::<PartialConfig>(&source) {
        Ok(x) => x,
        Err(error) => {
            debug!(path = %path.display(), %error, "malformed config file, using defaults");
            PartialConfig::default()
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
