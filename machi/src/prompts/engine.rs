//! The `minijinja` wrapper and the single system-prompt template.

use minijinja::{Environment, context};
use serde::Serialize;

use crate::providers::ToolSpec;

/// The bundled system-prompt template.
///
/// Kept short and singular on purpose: this crate's agent core has no
/// planning step or managed-agent hierarchy, so there is only one prompt to
/// render, not a family of them.
const SYSTEM_PROMPT_TEMPLATE: &str = "\
You are {% if name %}{{ name }}{% else %}an agent{% endif %}{% if description %}, {{ description }}{% endif %}.

You solve tasks by calling tools. At each step, either call exactly one tool \
or give a final answer. You have {{ max_steps }} step{% if max_steps != 1 %}s{% endif %} to complete the task.

{% if tools %}Available tools:
{% for tool in tools -%}
- {{ tool.name }}: {{ tool.description }}
{% endfor %}{% else %}No tools are registered.
{% endif %}\
{%- if custom_instructions %}
{{ custom_instructions }}
{%- endif %}";

/// Simplified tool metadata for template rendering, derived from a
/// [`ToolSpec`].
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Tool id, e.g. `vfs.read`.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

impl From<&ToolSpec> for ToolInfo {
    fn from(spec: &ToolSpec) -> Self {
        Self { name: spec.name.clone(), description: spec.description.clone() }
    }
}

/// Variables available to [`SYSTEM_PROMPT_TEMPLATE`].
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    /// Agent name.
    pub name: Option<String>,
    /// Agent description.
    pub description: Option<String>,
    /// Tools to list in the prompt.
    pub tools: Vec<ToolInfo>,
    /// Hard step budget, surfaced to the model.
    pub max_steps: usize,
    /// Free-form instructions appended verbatim.
    pub custom_instructions: Option<String>,
}

impl PromptContext {
    /// Start from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the agent name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the agent description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the tool list, derived from registered [`ToolSpec`]s.
    #[must_use]
    pub fn with_tools(mut self, tools: &[ToolSpec]) -> Self {
        self.tools = tools.iter().map(ToolInfo::from).collect();
        self
    }

    /// Set the step budget.
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set free-form custom instructions.
    #[must_use]
    pub fn with_custom_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.custom_instructions = Some(instructions.into());
        self
    }
}

/// Template-rendering failure, wrapping `minijinja`'s own error.
#[derive(Debug, Clone)]
pub enum RenderError {
    /// Template parsing/compilation error.
    Template(String),
    /// Runtime rendering error.
    Render(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template(message) => write!(f, "template error: {message}"),
            Self::Render(message) => write!(f, "render error: {message}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// A thin wrapper over a `minijinja::Environment` that renders the bundled
/// system-prompt template.
#[derive(Debug, Default)]
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    /// Build an engine with the default `minijinja` environment.
    #[must_use]
    pub fn new() -> Self {
        Self { env: Environment::new() }
    }

    /// Render the bundled system-prompt template with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the template fails to parse (unreachable
    /// for the bundled template, but checked rather than `expect`ed so a
    /// future template edit fails loudly) or to render.
    pub fn render_system_prompt(&self, context: &PromptContext) -> Result<String, RenderError> {
        self.render(SYSTEM_PROMPT_TEMPLATE, context)
    }

    /// Render an arbitrary template string with `context`. Exposed so an
    /// embedder can override the bundled system prompt without forking the
    /// crate.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if `template` fails to parse or render.
    pub fn render(&self, template: &str, context: &PromptContext) -> Result<String, RenderError> {
        let tmpl = self.env.template_from_str(template).map_err(|e| RenderError::Template(e.to_string()))?;
        let ctx = context!(
            name => context.name,
            description => context.description,
            tools => context.tools,
            max_steps => context.max_steps,
            custom_instructions => context.custom_instructions,
        );
        tmpl.render(ctx).map_err(|e| RenderError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_name_and_tools() {
        let engine = PromptEngine::new();
        let context = PromptContext::new()
            .with_name("demo")
            .with_tools(&[ToolSpec { name: "vfs.read".into(), description: "reads a file".into(), input_schema: serde_json::json!({}) }])
            .with_max_steps(5);

        let rendered = engine.render_system_prompt(&context).expect("render");
        assert!(rendered.contains("demo"));
        assert!(rendered.contains("vfs.read: reads a file"));
        assert!(rendered.contains('5'));
    }

    #[test]
    fn renders_without_tools() {
        let engine = PromptEngine::new();
        let context = PromptContext::new().with_max_steps(1);
        let rendered = engine.render_system_prompt(&context).expect("render");
        assert!(rendered.contains("No tools are registered"));
    }

    #[test]
    fn custom_instructions_are_appended() {
        let engine = PromptEngine::new();
        let context = PromptContext::new().with_max_steps(1).with_custom_instructions("Always answer in French.");
        let rendered = engine.render_system_prompt(&context).expect("render");
        assert!(rendered.contains("Always answer in French."));
    }
}
