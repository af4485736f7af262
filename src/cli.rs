//! Minimal CLI: (mongodb | files) → annotate → TypeScript
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::config::{Config, PartialConfig};
use crate::options::PartialOptions;
use crate::output::OutputSink;
use crate::pipeline::{run_batch, BatchReport};
use crate::source::{FileSchemaSource, MongoSchemaSource};
use crate::typegen::TypeScriptCompiler;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate TypeScript type definitions from MongoDB `$jsonSchema` validators
#[derive(Parser, Debug)]
#[command(name = "bson-typegen", version)]
pub struct CommandLineInterface {
    /// log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// read validators from every collection of the configured database
    Generate(GenerateOut),
    /// read validators from local JSON files
    Compile(CompileOut),
}

#[derive(Args, Debug, Clone)]
struct ConfigSettings {
    /// config file (defaults to ./bson-typegen.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// don't turn minItems/maxItems into tuple types
    #[arg(long)]
    ignore_min_and_max_items: bool,

    /// add `| undefined` to index signatures
    #[arg(long)]
    strict_index_signatures: bool,

    /// type untyped values as `any` instead of `unknown`
    #[arg(long)]
    no_unknown_any: bool,

    /// emit `enum` instead of `const enum`
    #[arg(long)]
    no_const_enums: bool,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    config_settings: ConfigSettings,

    /// output directory (overrides `path` from the config file)
    #[arg(long)]
    path: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct CompileOut {
    #[command(flatten)]
    config_settings: ConfigSettings,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JSON Pointer to the schema in each document (e.g. /options/validator/$jsonSchema)
    #[arg(long)]
    json_pointer: Option<String>,

    /// output directory (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ConfigSettings {
    /// Flags only ever override when given.
    fn overrides(&self, path: Option<PathBuf>) -> PartialConfig {
        let set = |flag: bool, value: bool| flag.then_some(value);
        PartialConfig {
            options: PartialOptions {
                banner_comment: None,
                enable_const_enums: set(self.no_const_enums, false),
                ignore_min_and_max_items: set(self.ignore_min_and_max_items, true),
                strict_index_signatures: set(self.strict_index_signatures, true),
                unknown_any: set(self.no_unknown_any, false),
            },
            path,
            env: None,
        }
    }

    fn load(&self, path: Option<PathBuf>) -> Config {
        Config::load(self.config.as_deref(), &self.overrides(path))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub async fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                // env first: nothing is fetched without a connection
                let config = target.config_settings.load(target.path.clone());
                let connection = config.env.resolve(|var| std::env::var(var).ok())?;

                let source = MongoSchemaSource::new(connection);
                let sink = OutputSink::Directory(config.path.clone());
                let report = run_batch(&source, &TypeScriptCompiler, &config.options, &sink)
                    .await
                    .context("failed to generate type definitions")?;
                summarize(&report);
            }
            Command::Compile(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let config = target.config_settings.load(None);
                let source = FileSchemaSource {
                    patterns: target.input.clone(),
                    json_pointer: target.json_pointer.clone(),
                };
                let sink = match target.out.as_ref() {
                    Some(dir) => OutputSink::Directory(dir.clone()),
                    None => OutputSink::Stdout,
                };
                let report = run_batch(&source, &TypeScriptCompiler, &config.options, &sink)
                    .await
                    .context("failed to compile schema files")?;
                summarize(&report);
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn summarize(report: &BatchReport) {
    for path in &report.written {
        eprintln!("{} {}", "✅ wrote".green(), path.display());
    }
    if !report.skipped.is_empty() {
        eprintln!(
            "{} {} (no $jsonSchema validator)",
            "skipped".yellow(),
            report.skipped.join(", ")
        );
    }
    eprintln!("{} schema(s) compiled", report.compiled);
}
