//! The agent core: a bounded, iterative dialogue with a model that can call
//! registered tools, journals every decision on the event bus, and
//! terminates on a final answer, `max_steps`, cancellation, or a
//! non-transient model error.
//!
//! ```rust,ignore
//! let agent = Agent::builder()
//!     .model(Box::new(model))
//!     .tools(tool_engine)
//!     .bus(bus)
//!     .max_steps(10)
//!     .build();
//!
//! let outcome = agent.run("What is 2 + 2?").await?;
//! ```

mod builder;
mod config;
mod executor;
mod options;
mod result;
mod transcript;

pub use builder::AgentBuilder;
pub use config::AgentConfig;
pub use options::RunOptions;
pub use result::{RunOutcome, RunState};
pub use transcript::{Transcript, TranscriptEntry};

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    bus::EventBus,
    error::Result,
    prompts::PromptEngine,
    providers::{ModelAdapter, RetryConfig},
    tool::ToolEngine,
    vfs::Vfs,
};

/// A bounded, iterative dialogue with a model that can call registered
/// tools.
///
/// The loop's own state (step counter, transcript, interrupt flag) lives
/// behind `&self`/interior mutability so an `Agent` can be shared across
/// concurrent runs the way [`ToolEngine`] and [`EventBus`] already are; each
/// [`Self::run`] call owns its own transcript and step counter.
pub struct Agent {
    pub(crate) model: Box<dyn ModelAdapter>,
    pub(crate) tools: Arc<ToolEngine>,
    pub(crate) bus: Arc<EventBus>,
    pub(crate) vfs: Option<Arc<Vfs>>,
    pub(crate) config: AgentConfig,
    pub(crate) granted_permissions: Vec<String>,
    pub(crate) retry: RetryConfig,
    pub(crate) prompt_engine: PromptEngine,
    pub(crate) interrupt_flag: Arc<AtomicBool>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.config.id)
            .field("max_steps", &self.config.max_steps)
            .field("model_id", &self.model.model_id())
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Start building an agent.
    #[must_use]
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Drive the step loop to completion and return the outcome.
    ///
    /// Returns `Ok(RunOutcome)` for every terminal state observable without
    /// a raised error (`Final`, `Exhausted`, `Cancelled`), and
    /// `Err(AgentError)` only for a non-transient model failure
    /// (`model_permanent`) or an internal invariant violation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AgentError::ModelPermanent`] or
    /// [`crate::error::AgentError::Internal`] when the model adapter fails
    /// in a way the retry policy does not cover.
    pub async fn run(&self, options: impl Into<RunOptions>) -> Result<RunOutcome> {
        let options = options.into();
        self.interrupt_flag.store(false, Ordering::SeqCst);
        executor::run_loop(self, &options.task).await
    }

    /// Request the agent to stop after the current step. Best-effort: an
    /// in-flight model or tool call is allowed to complete.
    pub fn interrupt(&self) {
        self.interrupt_flag.store(true, Ordering::SeqCst);
    }

    /// Whether an interrupt has been requested for the next `run`.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.interrupt_flag.load(Ordering::SeqCst)
    }

    /// The agent's id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// The tool engine this agent dispatches tool calls through.
    #[must_use]
    pub fn tools(&self) -> &Arc<ToolEngine> {
        &self.tools
    }

    /// The event bus this agent journals on.
    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The versioned VFS bound to this agent, if any.
    #[must_use]
    pub fn vfs(&self) -> Option<&Arc<Vfs>> {
        self.vfs.as_ref()
    }

    fn render_system_prompt(&self) -> String {
        let tool_specs: Vec<_> = self.tools.list().iter().map(crate::providers::ToolSpec::from).collect();
        let mut context = crate::prompts::PromptContext::new().with_tools(&tool_specs).with_max_steps(self.config.max_steps);
        if let Some(name) = &self.config.name {
            context = context.with_name(name.clone());
        }
        if let Some(description) = &self.config.description {
            context = context.with_description(description.clone());
        }
        if let Some(instructions) = &self.config.custom_instructions {
            context = context.with_custom_instructions(instructions.clone());
        }
        self.prompt_engine.render_system_prompt(&context).unwrap_or_default()
    }
}
