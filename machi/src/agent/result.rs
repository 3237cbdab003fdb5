//! The envelope [`super::Agent::run`] returns.

use serde_json::Value;

use crate::providers::TokenUsage;

/// How a run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// The model produced a final answer.
    Final,
    /// `max_steps` was reached without a final answer.
    Exhausted,
    /// The run was cancelled via its interrupt signal.
    Cancelled,
}

/// The outcome of one [`super::Agent::run`] call.
///
/// Mirrors the spec's `{ok, message?, data?}` shape: `ok:true` carries
/// `data`, every `ok:false` state carries a human-readable `message`.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Whether the run ended with a final answer.
    pub ok: bool,
    /// Which terminal state the run reached.
    pub state: RunState,
    /// The final answer, present only when `ok` is `true`.
    pub data: Option<Value>,
    /// A human-readable explanation, present whenever `ok` is `false`.
    pub message: Option<String>,
    /// Number of step iterations performed before termination.
    pub steps_taken: usize,
    /// Token usage summed across every model call in the run.
    pub token_usage: TokenUsage,
}

impl RunOutcome {
    pub(super) fn final_answer(data: Value, steps_taken: usize, token_usage: TokenUsage) -> Self {
        Self { ok: true, state: RunState::Final, data: Some(data), message: None, steps_taken, token_usage }
    }

    pub(super) fn exhausted(steps_taken: usize, token_usage: TokenUsage) -> Self {
        Self {
            ok: false,
            state: RunState::Exhausted,
            data: None,
            message: Some("max steps exceeded".to_string()),
            steps_taken,
            token_usage,
        }
    }

    pub(super) fn cancelled(steps_taken: usize, token_usage: TokenUsage) -> Self {
        Self { ok: false, state: RunState::Cancelled, data: None, message: Some("cancelled".to_string()), steps_taken, token_usage }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_carries_fixed_message() {
        let outcome = RunOutcome::exhausted(3, TokenUsage::default());
        assert!(!outcome.ok);
        assert_eq!(outcome.message.as_deref(), Some("max steps exceeded"));
        assert_eq!(outcome.state, RunState::Exhausted);
    }

    #[test]
    fn final_answer_carries_data_and_no_message() {
        let outcome = RunOutcome::final_answer(serde_json::json!("done"), 1, TokenUsage::default());
        assert!(outcome.ok);
        assert_eq!(outcome.data, Some(serde_json::json!("done")));
        assert!(outcome.message.is_none());
    }
}
