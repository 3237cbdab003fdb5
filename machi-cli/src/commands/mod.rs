//! One module per subcommand, each exposing a single `run`-style entry
//! point that the binary's `main` dispatches to.

mod docs;
mod init;
mod run;
mod tools;

pub use docs::docs_generate;
pub use init::init;
pub use run::run_case_or_stdin;
pub use tools::{tools_docs, tools_list};
