//! `machi`: scaffold a workspace, run golden cases or dev tasks, and
//! generate tool/doc listings for the `machi` agent runtime.
#![allow(clippy::print_stdout)]

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use error::CliError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = cli::Cli::parse();
    let config = config::AriumConfig::from_env();

    if let Err(err) = dispatch(&cli.command, &config).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn dispatch(command: &cli::Command, config: &config::AriumConfig) -> Result<(), CliError> {
    match command {
        cli::Command::Init { force } => commands::init(config, *force),
        cli::Command::Run { case, adapter } => commands::run_case_or_stdin(config, case.as_deref(), adapter).await,
        cli::Command::ToolsList => commands::tools_list(),
        cli::Command::ToolsDocs { out } => commands::tools_docs(out.as_deref()),
        cli::Command::DocsGenerate { out, include_examples } => commands::docs_generate(out.as_deref(), *include_examples),
    }
}
