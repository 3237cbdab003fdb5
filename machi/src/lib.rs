#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(tail_expr_drop_order)]
//! A host runtime for LLM-driven agents: a bounded step loop, a pluggable
//! model-adapter boundary, a permission-gated tool engine with in-process,
//! JavaScript, and Python runners, a versioned virtual file system, and a
//! typed event bus that journals every decision a run makes.
extern crate self as machi;

pub mod agent;
pub mod bus;
pub mod error;
pub mod prelude;
pub mod prompts;
pub mod providers;
pub mod tool;
pub mod tools;
pub mod vfs;

pub use agent::{Agent, AgentBuilder, AgentConfig, RunOptions, RunOutcome, RunState};
pub use error::{AgentError, Result};
