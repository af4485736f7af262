pub mod annotate;
pub mod cli;
pub mod compile;
pub mod config;
pub mod detect;
pub mod error;
pub mod mapping;
pub mod options;
pub mod output;
pub mod path_de;
pub mod pipeline;
pub mod source;
pub mod typegen;

use std::process::ExitCode;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so `compile` without `--out` can pipe stdout.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let command_line_interface = cli::CommandLineInterface::load();
    init_tracing(&command_line_interface.log_level);
    match command_line_interface.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
