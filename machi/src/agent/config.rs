//! Agent configuration: the `AgentConfig` record from the data model.

/// Configuration bound to an [`super::Agent`] at build time.
///
/// `id`, `max_steps` are required; everything else is an optional override
/// layered on top of the bound model adapter's own defaults.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Identifier for this agent, surfaced in events and managed-agent
    /// reports.
    pub id: String,
    /// Human-readable name, used in the rendered system prompt.
    pub name: Option<String>,
    /// Human-readable description, used in the rendered system prompt.
    pub description: Option<String>,
    /// Sampling temperature passed to the model adapter, if set.
    pub temperature: Option<f32>,
    /// Maximum tokens the model adapter may generate per call, if set.
    pub max_tokens: Option<u32>,
    /// Hard upper bound on the number of step iterations a run performs.
    pub max_steps: usize,
    /// Extra instructions appended to the rendered system prompt.
    pub custom_instructions: Option<String>,
}

impl AgentConfig {
    /// Default `max_steps` when a builder doesn't override it.
    pub const DEFAULT_MAX_STEPS: usize = 20;

    /// Start from `id` with every other field defaulted.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            temperature: None,
            max_tokens: None,
            max_steps: Self::DEFAULT_MAX_STEPS,
            custom_instructions: None,
        }
    }
}
