//! Argument parsing for the `machi` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line tools for the machi agent runtime.
#[derive(Debug, Parser)]
#[command(name = "machi", version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scaffold a workspace: config file, golden-test directory, docs directory.
    Init {
        /// Overwrite an existing `arium.config.json` if present.
        #[arg(short, long)]
        force: bool,
    },

    /// Run a golden case, or a one-off task read from stdin.
    Run {
        /// Name of a golden case under `tests/golden/<name>.json`.
        #[arg(long)]
        case: Option<String>,

        /// Model adapter to use. Only `mock` is bundled; anything else
        /// requires an external `ModelAdapter` implementation.
        #[arg(long, default_value = "mock")]
        adapter: String,
    },

    /// List every tool registered on the default builtin tool engine.
    #[command(name = "tools:list")]
    ToolsList,

    /// Write one Markdown file per registered tool.
    #[command(name = "tools:docs")]
    ToolsDocs {
        /// Output directory. Defaults to `docs/tools`.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Generate the workspace's full documentation set.
    #[command(name = "docs:generate")]
    DocsGenerate {
        /// Output directory. Defaults to `docs`.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Include example tool invocations in the generated docs.
        #[arg(long)]
        include_examples: bool,
    },
}
