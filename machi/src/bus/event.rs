//! Event and event-type definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed vocabulary of event types the bus can carry.
///
/// `Any` is a subscription filter only — nothing is ever emitted with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventType {
    /// A prompt was assembled and about to be sent to the model.
    PromptEvent,
    /// The model returned a response.
    ModelResponseEvent,
    /// A tool is about to be invoked.
    ToolInvocationEvent,
    /// A tool invocation returned a result.
    ToolResultEvent,
    /// The VFS mutated a path.
    VFSChangeEvent,
    /// An agent run started.
    AgentStartEvent,
    /// An agent run advanced by one step.
    AgentStepEvent,
    /// An agent run terminated.
    AgentEndEvent,
    /// Subscription-only wildcard; never emitted.
    Any,
}

impl EventType {
    /// The wire string used for this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PromptEvent => "PromptEvent",
            Self::ModelResponseEvent => "ModelResponseEvent",
            Self::ToolInvocationEvent => "ToolInvocationEvent",
            Self::ToolResultEvent => "ToolResultEvent",
            Self::VFSChangeEvent => "VFSChangeEvent",
            Self::AgentStartEvent => "AgentStartEvent",
            Self::AgentStepEvent => "AgentStepEvent",
            Self::AgentEndEvent => "AgentEndEvent",
            Self::Any => "any",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of something that happened, journalled on the bus.
///
/// Once emitted, no field of an `Event` is ever mutated or reordered — the
/// bus's `history` is strictly append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Event {
    /// Monotonically assigned id, unique within a bus instance.
    pub id: String,
    /// The closed-vocabulary type tag (never `Any`).
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Wall-clock timestamp, milliseconds since epoch.
    pub timestamp_ms: u64,
    /// Schemaless payload; downstream consumers type-narrow by `event_type`.
    pub payload: Value,
}

impl Event {
    pub(super) fn new(id: String, event_type: EventType, timestamp_ms: u64, payload: Value) -> Self {
        Self {
            id,
            event_type,
            timestamp_ms,
            payload,
        }
    }
}
