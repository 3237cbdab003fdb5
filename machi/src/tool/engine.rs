//! The tool registry and invocation engine.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
    time::Duration,
};

use serde_json::Value;

use crate::{
    bus::{EventBus, EventType},
    error::{ToolError, ToolErrorCode},
};

use super::{
    ToolDescriptor, ToolResult,
    registration::ToolRegistration,
    runner::{self, DEFAULT_RUNNER_TIMEOUT},
};

struct ToolEntry {
    descriptor: ToolDescriptor,
    registration: ToolRegistration,
    timeout: Duration,
}

/// Registry and dispatcher for tools the agent loop can invoke.
///
/// Every call to [`Self::invoke`] emits exactly one `ToolInvocationEvent`
/// followed by exactly one `ToolResultEvent`, whether the tool was found,
/// permitted, and successful or not. Callers observing the bus see a
/// complete record of every attempted invocation, not just the successful
/// ones.
pub struct ToolEngine {
    entries: RwLock<BTreeMap<String, Arc<ToolEntry>>>,
    bus: Arc<EventBus>,
}

impl std::fmt::Debug for ToolEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.read().map(|e| e.len()).unwrap_or(0);
        f.debug_struct("ToolEngine").field("registered", &count).finish_non_exhaustive()
    }
}

impl ToolEngine {
    /// Create an empty engine that journals invocation/result events on `bus`.
    #[must_use]
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { entries: RwLock::new(BTreeMap::new()), bus }
    }

    /// Register a tool under `descriptor.id`, replacing any prior
    /// registration with the same id.
    pub fn register(&self, descriptor: ToolDescriptor, registration: ToolRegistration) {
        self.register_with_timeout(descriptor, registration, DEFAULT_RUNNER_TIMEOUT);
    }

    /// Register a tool with a non-default execution timeout.
    pub fn register_with_timeout(&self, descriptor: ToolDescriptor, registration: ToolRegistration, timeout: Duration) {
        let mut guard = self.entries.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(descriptor.id.clone(), Arc::new(ToolEntry { descriptor, registration, timeout }));
    }

    /// Remove a tool registration. No-op if `id` was not registered.
    pub fn unregister(&self, id: &str) {
        let mut guard = self.entries.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.remove(id);
    }

    /// All registered descriptors, ordered by id.
    #[must_use]
    pub fn list(&self) -> Vec<ToolDescriptor> {
        let guard = self.entries.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.values().map(|e| e.descriptor.clone()).collect()
    }

    /// A single descriptor by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<ToolDescriptor> {
        let guard = self.entries.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.get(id).map(|e| e.descriptor.clone())
    }

    /// Invoke `id` with `arguments`, gated by `granted_permissions`.
    ///
    /// Resolution order: the tool must exist, the caller's permissions must
    /// be a superset of the descriptor's required permissions, and only
    /// then does the registered implementation run. Each stage that fails
    /// short-circuits the next without invoking the tool body.
    pub async fn invoke(&self, id: &str, arguments: Value, granted_permissions: &[String]) -> ToolResult {
        let entry = {
            let guard = self.entries.read().unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.get(id).cloned()
        };

        let Some(entry) = entry else {
            let error = ToolError::not_found(id);
            self.emit_invocation(id, &arguments);
            let result = ToolResult::from(error);
            self.emit_result(id, &result);
            return result;
        };

        self.emit_invocation(id, &arguments);

        let missing: Vec<String> = entry
            .descriptor
            .permissions
            .iter()
            .filter(|needed| !granted_permissions.iter().any(|granted| granted == *needed))
            .cloned()
            .collect();

        if !missing.is_empty() {
            let result = ToolResult::from(ToolError::permission_denied(id, &missing));
            self.emit_result(id, &result);
            return result;
        }

        if let Err(error) = validate_args(id, &entry.descriptor.input_schema, &arguments) {
            let result = ToolResult::from(error);
            self.emit_result(id, &result);
            return result;
        }

        let result = self.dispatch(&entry, arguments).await;
        self.emit_result(id, &result);
        result
    }

    async fn dispatch(&self, entry: &ToolEntry, arguments: Value) -> ToolResult {
        match &entry.registration {
            ToolRegistration::Builtin(implementation) => runner::run_builtin(implementation.clone(), arguments, entry.timeout).await,
            ToolRegistration::Script { source } => match entry.descriptor.runner {
                super::RunnerKind::Js => runner::run_js(source, arguments, entry.timeout).await,
                super::RunnerKind::Py => runner::run_py(source, arguments, entry.timeout).await,
                super::RunnerKind::Builtin => {
                    ToolResult::from(ToolError::new(ToolErrorCode::RunnerFailure, "script registration declared a builtin runner"))
                }
            },
        }
    }

    fn emit_invocation(&self, id: &str, arguments: &Value) {
        self.bus.emit(EventType::ToolInvocationEvent, serde_json::json!({ "tool": id, "arguments": arguments }));
    }

    fn emit_result(&self, id: &str, result: &ToolResult) {
        let payload = serde_json::to_value(result).unwrap_or_else(|_| serde_json::json!({ "ok": false }));
        self.bus.emit(EventType::ToolResultEvent, serde_json::json!({ "tool": id, "result": payload }));
    }
}

/// Validate `arguments` against `schema`, best-effort.
///
/// A descriptor's schema is only as trustworthy as the crate that produced
/// it: `builtin` tools built with [`ToolDescriptor::with_schema`] get a
/// real `schemars`-generated schema, but `js`/`py` registrations may carry
/// a hand-written or absent one. A schema that fails to compile as JSON
/// Schema is treated as "no schema" rather than a validation failure, so a
/// loose or malformed descriptor never blocks an otherwise-working tool.
fn validate_args(id: &str, schema: &Value, arguments: &Value) -> Result<(), ToolError> {
    let Ok(validator) = jsonschema::Validator::new(schema) else {
        return Ok(());
    };
    match validator.validate(arguments) {
        Ok(()) => Ok(()),
        Err(error) => Err(ToolError::schema_violation(id, error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ToolEngine {
        ToolEngine::new(Arc::new(EventBus::default()))
    }

    #[tokio::test]
    async fn invoking_unknown_tool_returns_not_found_and_emits_both_events() {
        let engine = engine();
        let result = engine.invoke("nope", Value::Null, &[]).await;
        assert!(!result.is_ok());

        let history = engine.bus.history();
        assert!(history.iter().any(|e| e.event_type == EventType::ToolInvocationEvent));
        assert!(history.iter().any(|e| e.event_type == EventType::ToolResultEvent));
    }

    #[tokio::test]
    async fn schema_violation_denies_without_running_body() {
        let engine = engine();
        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let ran_clone = ran.clone();
        engine.register(
            ToolDescriptor::builtin("typed", "typed").with_input_schema(serde_json::json!({
                "type": "object",
                "properties": { "count": { "type": "integer" } },
                "required": ["count"],
            })),
            ToolRegistration::builtin(move |_args| {
                let ran_clone = ran_clone.clone();
                async move {
                    ran_clone.store(true, std::sync::atomic::Ordering::SeqCst);
                    ToolResult::ok(Value::Null)
                }
            }),
        );

        let result = engine.invoke("typed", serde_json::json!({ "count": "not a number" }), &[]).await;
        assert!(!result.is_ok());
        let payload = serde_json::to_value(&result).unwrap();
        assert_eq!(payload["error"]["code"], "schema_violation");
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn matching_schema_runs_body() {
        let engine = engine();
        engine.register(
            ToolDescriptor::builtin("typed", "typed").with_input_schema(serde_json::json!({
                "type": "object",
                "properties": { "count": { "type": "integer" } },
                "required": ["count"],
            })),
            ToolRegistration::builtin(|args| async move { ToolResult::ok(args) }),
        );

        let result = engine.invoke("typed", serde_json::json!({ "count": 3 }), &[]).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_permission_denies_without_running_body() {
        let engine = engine();
        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let ran_clone = ran.clone();
        engine.register(
            ToolDescriptor::builtin("gated", "gated").with_permission("net"),
            ToolRegistration::builtin(move |_args| {
                let ran_clone = ran_clone.clone();
                async move {
                    ran_clone.store(true, std::sync::atomic::Ordering::SeqCst);
                    ToolResult::ok(Value::Null)
                }
            }),
        );

        let result = engine.invoke("gated", Value::Null, &[]).await;
        assert!(!result.is_ok());
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn granted_permission_runs_body() {
        let engine = engine();
        engine.register(
            ToolDescriptor::builtin("echo", "echo").with_permission("net"),
            ToolRegistration::builtin(|args| async move { ToolResult::ok(args) }),
        );

        let result = engine.invoke("echo", serde_json::json!({ "x": 1 }), &["net".to_string()]).await;
        assert!(result.is_ok());
        assert_eq!(result.data(), Some(&serde_json::json!({ "x": 1 })));
    }

    #[tokio::test]
    async fn invoke_emits_one_invocation_and_one_result_event_per_call() {
        let engine = engine();
        engine.register(ToolDescriptor::builtin("noop", "noop"), ToolRegistration::builtin(|_| async { ToolResult::ok(Value::Null) }));

        engine.invoke("noop", Value::Null, &[]).await;
        engine.invoke("noop", Value::Null, &[]).await;

        let history = engine.bus.history();
        let invocations = history.iter().filter(|e| e.event_type == EventType::ToolInvocationEvent).count();
        let results = history.iter().filter(|e| e.event_type == EventType::ToolResultEvent).count();
        assert_eq!(invocations, 2);
        assert_eq!(results, 2);
    }
}
