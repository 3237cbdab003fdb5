//! Fluent construction for [`super::Agent`].

use std::sync::{Arc, atomic::AtomicBool};

use crate::{bus::EventBus, prompts::PromptEngine, providers::{ModelAdapter, RetryConfig}, tool::ToolEngine, vfs::Vfs};

use super::{Agent, AgentConfig};

/// Builds an [`Agent`] from a model adapter, a tool engine, and an event bus.
///
/// `model`, `tools`, and `bus` are required; [`Self::build`] panics if any
/// is missing, the same contract the teacher's other builders in this
/// workspace use for their required fields.
pub struct AgentBuilder {
    model: Option<Box<dyn ModelAdapter>>,
    tools: Option<Arc<ToolEngine>>,
    bus: Option<Arc<EventBus>>,
    vfs: Option<Arc<Vfs>>,
    config: AgentConfig,
    granted_permissions: Vec<String>,
    retry: RetryConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self {
            model: None,
            tools: None,
            bus: None,
            vfs: None,
            config: AgentConfig::new(default_agent_id()),
            granted_permissions: Vec::new(),
            retry: RetryConfig::default(),
        }
    }
}

impl AgentBuilder {
    /// Start an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model adapter the agent calls each step.
    #[must_use]
    pub fn model(mut self, model: Box<dyn ModelAdapter>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the tool engine tool calls dispatch through.
    #[must_use]
    pub fn tools(mut self, tools: Arc<ToolEngine>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set the event bus the agent journals on.
    #[must_use]
    pub fn bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Bind a versioned VFS to the agent.
    #[must_use]
    pub fn vfs(mut self, vfs: Arc<Vfs>) -> Self {
        self.vfs = Some(vfs);
        self
    }

    /// Set the agent id (defaults to a generated one).
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.config.id = id.into();
        self
    }

    /// Set the agent's display name, used in the rendered system prompt.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Set the agent's description, used in the rendered system prompt.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.config.description = Some(description.into());
        self
    }

    /// Override the sampling temperature passed to the model adapter.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Cap the tokens the model adapter may generate per call.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = Some(max_tokens);
        self
    }

    /// Override the hard step cap (defaults to [`AgentConfig::DEFAULT_MAX_STEPS`]).
    #[must_use]
    pub const fn max_steps(mut self, max_steps: usize) -> Self {
        self.config.max_steps = max_steps;
        self
    }

    /// Append free-form instructions to the rendered system prompt.
    #[must_use]
    pub fn custom_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.config.custom_instructions = Some(instructions.into());
        self
    }

    /// Grant a permission the tool engine checks tool descriptors against.
    #[must_use]
    pub fn grant_permission(mut self, permission: impl Into<String>) -> Self {
        self.granted_permissions.push(permission.into());
        self
    }

    /// Replace the granted-permissions set outright.
    #[must_use]
    pub fn granted_permissions(mut self, permissions: Vec<String>) -> Self {
        self.granted_permissions = permissions;
        self
    }

    /// Override the retry policy for transient model failures.
    #[must_use]
    pub const fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Build the agent.
    ///
    /// # Panics
    ///
    /// Panics if [`Self::model`], [`Self::tools`], or [`Self::bus`] was
    /// never called.
    #[must_use]
    pub fn build(self) -> Agent {
        Agent {
            model: self.model.expect("AgentBuilder::model is required"),
            tools: self.tools.expect("AgentBuilder::tools is required"),
            bus: self.bus.expect("AgentBuilder::bus is required"),
            vfs: self.vfs,
            config: self.config,
            granted_permissions: self.granted_permissions,
            retry: self.retry,
            prompt_engine: PromptEngine::new(),
            interrupt_flag: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// A unique agent id, used when a caller doesn't assign one explicitly.
fn default_agent_id() -> String {
    format!("agent-{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{bus::EventBus, providers::MockModel, tool::ToolEngine};

    use super::*;

    #[test]
    fn build_panics_without_required_fields() {
        let result = std::panic::catch_unwind(|| AgentBuilder::new().build());
        assert!(result.is_err());
    }

    #[test]
    fn build_applies_overrides() {
        let bus = Arc::new(EventBus::default());
        let tools = Arc::new(ToolEngine::new(Arc::clone(&bus)));
        let agent = AgentBuilder::new()
            .model(Box::new(MockModel::final_text("hi")))
            .tools(tools)
            .bus(bus)
            .id("custom-id")
            .name("Arium")
            .max_steps(7)
            .grant_permission("net")
            .build();

        assert_eq!(agent.id(), "custom-id");
        assert_eq!(agent.config.max_steps, 7);
        assert_eq!(agent.config.name.as_deref(), Some("Arium"));
        assert_eq!(agent.granted_permissions, vec!["net".to_string()]);
        assert_eq!(json!(agent.is_interrupted()), json!(false));
    }
}
