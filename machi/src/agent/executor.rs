//! The step loop proper: §4.D of the design, as an explicit state machine
//! rather than recursion, so cancellation and `max_steps` enforcement are
//! just counter checks.

use std::sync::atomic::Ordering;

use tracing::{debug, info, warn};

use crate::{
    bus::EventType,
    error::{AgentError, Result},
    providers::{GenerateOptions, ModelResponse, TokenUsage},
};

use super::{
    Agent, RunOutcome,
    transcript::{Transcript, TranscriptEntry},
};

/// Drive `agent`'s step loop for `task` to one of its terminal states.
pub(super) async fn run_loop(agent: &Agent, task: &str) -> Result<RunOutcome> {
    let system_prompt = agent.render_system_prompt();
    let mut transcript = Transcript::new();
    transcript.push(TranscriptEntry::Task(task.to_string()));

    let mut step_number = 0usize;
    let mut usage_total = TokenUsage::default();

    agent.bus.emit(
        EventType::AgentStartEvent,
        serde_json::json!({ "agentId": agent.config.id, "task": task, "maxSteps": agent.config.max_steps }),
    );
    info!(agent = %agent.config.id, "agent run started");

    loop {
        if agent.interrupt_flag.load(Ordering::SeqCst) {
            agent.bus.emit(
                EventType::AgentEndEvent,
                serde_json::json!({ "agentId": agent.config.id, "ok": false, "reason": "cancelled" }),
            );
            return Ok(RunOutcome::cancelled(step_number, usage_total));
        }

        if step_number >= agent.config.max_steps {
            agent.bus.emit(
                EventType::AgentEndEvent,
                serde_json::json!({ "agentId": agent.config.id, "ok": false, "reason": "max steps exceeded" }),
            );
            return Ok(RunOutcome::exhausted(step_number, usage_total));
        }

        step_number += 1;
        agent.bus.emit(EventType::AgentStepEvent, serde_json::json!({ "agentId": agent.config.id, "step": step_number }));

        let prompt = assemble_prompt(&system_prompt, &transcript, agent.config.max_tokens);
        agent.bus.emit(EventType::PromptEvent, serde_json::json!({ "agentId": agent.config.id, "step": step_number }));

        let options = GenerateOptions::new().with_tools(tool_specs(agent));
        let options = match agent.config.temperature {
            Some(t) => options.with_temperature(t),
            None => options,
        };
        let options = match agent.config.max_tokens {
            Some(t) => options.with_max_tokens(t),
            None => options,
        };

        match generate_with_retry(agent, &prompt, &options).await {
            Ok(response) => {
                agent.bus.emit(
                    EventType::ModelResponseEvent,
                    serde_json::json!({ "agentId": agent.config.id, "step": step_number, "response": serde_json::to_value(&response).unwrap_or_default() }),
                );
                if let Some(usage) = response.usage() {
                    usage_total += usage;
                }

                match response {
                    ModelResponse::Final { content, .. } => {
                        transcript.push(TranscriptEntry::ModelResponse(content.clone()));
                        agent.bus.emit(
                            EventType::AgentEndEvent,
                            serde_json::json!({ "agentId": agent.config.id, "ok": true }),
                        );
                        info!(agent = %agent.config.id, steps = step_number, "agent run completed");
                        return Ok(RunOutcome::final_answer(serde_json::Value::String(content), step_number, usage_total));
                    }
                    ModelResponse::Tool { tool, arguments, .. } => {
                        transcript.push(TranscriptEntry::ModelResponse(format!("calling tool `{tool}`")));
                        let result = agent.tools.invoke(&tool, arguments, &agent.granted_permissions).await;
                        let rendered = serde_json::to_value(&result).unwrap_or_else(|_| serde_json::json!({ "ok": false }));
                        transcript.push(TranscriptEntry::ToolResult { tool, result: rendered });
                    }
                }
            }
            Err(AgentError::Parsing { output, message }) => {
                warn!(agent = %agent.config.id, step = step_number, error = %message, "unrecognized model response");
                transcript.push(TranscriptEntry::Error(format!("could not interpret model response ({message}): {output}")));
            }
            Err(err) => {
                let reason = err.to_string();
                agent.bus.emit(
                    EventType::AgentEndEvent,
                    serde_json::json!({ "agentId": agent.config.id, "ok": false, "reason": reason }),
                );
                warn!(agent = %agent.config.id, step = step_number, error = %err, "agent run errored");
                return Err(err);
            }
        }
    }
}

/// Render the transcript into a prompt, bounded by the token estimator.
fn assemble_prompt(system_prompt: &str, transcript: &Transcript, max_tokens: Option<u32>) -> String {
    let body = transcript.assemble(max_tokens);
    if system_prompt.is_empty() {
        body
    } else {
        format!("{system_prompt}\n\n{body}")
    }
}

fn tool_specs(agent: &Agent) -> Vec<crate::providers::ToolSpec> {
    agent.tools.list().iter().map(crate::providers::ToolSpec::from).collect()
}

/// Call the model adapter, retrying [`AgentError::ModelTransient`] failures
/// with exponential backoff and jitter per [`crate::providers::RetryConfig`].
/// Non-transient failures and exhausted retries propagate immediately.
async fn generate_with_retry(agent: &Agent, prompt: &str, options: &GenerateOptions) -> Result<ModelResponse> {
    let mut attempt = 0u32;
    loop {
        match agent.model.generate(prompt, options).await {
            Ok(response) => return Ok(response),
            Err(err) if err.is_transient() && attempt < agent.retry.max_attempts => {
                let delay = agent.retry.delay_for(attempt);
                debug!(agent = %agent.config.id, attempt, delay_ms = delay.as_millis() as u64, "retrying transient model error");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::{
        agent::Agent,
        bus::{EventBus, EventType},
        providers::MockModel,
        tool::ToolEngine,
    };

    fn build(model: MockModel, max_steps: usize) -> (Agent, Arc<EventBus>) {
        let bus = Arc::new(EventBus::default());
        let tools = Arc::new(ToolEngine::new(Arc::clone(&bus)));
        let agent = Agent::builder().model(Box::new(model)).tools(Arc::clone(&tools)).bus(Arc::clone(&bus)).max_steps(max_steps).build();
        (agent, bus)
    }

    #[tokio::test]
    async fn final_response_terminates_successfully() {
        let (agent, bus) = build(MockModel::final_text("done"), 5);
        let outcome = agent.run("do the thing").await.expect("run");
        assert!(outcome.ok);
        assert_eq!(outcome.data, Some(json!("done")));

        let history = bus.history();
        assert_eq!(history.iter().filter(|e| e.event_type == EventType::AgentStartEvent).count(), 1);
        assert_eq!(history.iter().filter(|e| e.event_type == EventType::AgentEndEvent).count(), 1);
    }

    #[tokio::test]
    async fn tool_loop_exhausts_max_steps() {
        let (agent, bus) = build(MockModel::always_tool("noop", json!({})), 3);
        agent.tools.register(
            crate::tool::ToolDescriptor::builtin("noop", "noop"),
            crate::tool::ToolRegistration::builtin(|_| async { crate::tool::ToolResult::ok(json!({})) }),
        );

        let outcome = agent.run("loop forever").await.expect("run");
        assert!(!outcome.ok);
        assert_eq!(outcome.message.as_deref(), Some("max steps exceeded"));
        assert_eq!(outcome.steps_taken, 3);

        let history = bus.history();
        assert_eq!(history.iter().filter(|e| e.event_type == EventType::AgentStepEvent).count(), 3);
        assert_eq!(history.iter().filter(|e| e.event_type == EventType::ToolInvocationEvent).count(), 3);
        assert_eq!(history.iter().filter(|e| e.event_type == EventType::ToolResultEvent).count(), 3);
        assert_eq!(history.iter().filter(|e| e.event_type == EventType::AgentStartEvent).count(), 1);
        assert_eq!(history.iter().filter(|e| e.event_type == EventType::AgentEndEvent).count(), 1);
    }

    #[tokio::test]
    async fn cancellation_stops_before_next_step() {
        let (agent, _bus) = build(MockModel::always_tool("noop", json!({})), 10);
        agent.tools.register(
            crate::tool::ToolDescriptor::builtin("noop", "noop"),
            crate::tool::ToolRegistration::builtin(|_| async { crate::tool::ToolResult::ok(json!({})) }),
        );
        agent.interrupt();
        let outcome = agent.run("x").await.expect("run");
        assert!(!outcome.ok);
        assert_eq!(outcome.message.as_deref(), Some("cancelled"));
        assert_eq!(outcome.steps_taken, 0);
    }

    #[tokio::test]
    async fn permanent_model_error_propagates() {
        use async_trait::async_trait;

        #[derive(Debug)]
        struct AlwaysFails;

        #[async_trait]
        impl crate::providers::ModelAdapter for AlwaysFails {
            fn model_id(&self) -> &str {
                "always-fails"
            }
            async fn generate(
                &self,
                _prompt: &str,
                _options: &crate::providers::GenerateOptions,
            ) -> Result<crate::providers::ModelResponse, crate::error::AgentError> {
                Err(crate::error::AgentError::model_permanent("invalid api key"))
            }
        }

        let (agent, _bus) = build(MockModel::final_text("unused"), 5);
        let agent = Agent::builder()
            .model(Box::new(AlwaysFails))
            .tools(Arc::clone(&agent.tools))
            .bus(Arc::clone(&agent.bus))
            .max_steps(5)
            .build();

        let err = agent.run("x").await.unwrap_err();
        assert!(matches!(err, crate::error::AgentError::ModelPermanent { .. }));
    }
}
