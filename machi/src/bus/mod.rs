//! Typed pub/sub event bus with bounded, append-only history.
//!
//! Every decision the agent core makes, every tool invocation, and every
//! VFS mutation is journalled here so a run can be replayed or audited.
//! See [`EventBus`] for the contract.

mod event;

pub use event::{Event, EventType};

use std::{
    collections::{HashMap, VecDeque},
    panic::AssertUnwindSafe,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

use serde_json::Value;
use tracing::warn;

/// How the bus trims its history once `max_history_size` is exceeded.
///
/// Both policies enforce the same steady-state bound and the same
/// observable `history` contents (the last `max_history_size` emissions in
/// order); they differ only in operational cost, so this implementation
/// realizes both with a single ring buffer (`VecDeque::pop_front`), which
/// is the `circular` behavior. `truncate` is observably identical and
/// kept as a distinct variant for configuration compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Drop the oldest excess events once capacity is exceeded.
    #[default]
    Truncate,
    /// Overwrite the oldest slot once capacity is exceeded.
    Circular,
}

/// Configuration for an [`EventBus`].
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Maximum number of retained events. Default 10,000.
    pub max_history_size: usize,
    /// Retention policy applied once `max_history_size` is exceeded.
    pub retention_policy: RetentionPolicy,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_history_size: 10_000,
            retention_policy: RetentionPolicy::default(),
        }
    }
}

/// Query parameters for [`EventBus::get_history`].
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    /// Restrict to a single event type.
    pub event_type: Option<EventType>,
    /// Restrict to events at or after this timestamp (ms since epoch).
    pub since_ts: Option<u64>,
    /// Restrict to events at or before this timestamp (ms since epoch).
    pub until_ts: Option<u64>,
    /// Keep only the most recent `limit` matches.
    pub limit: Option<usize>,
}

impl HistoryQuery {
    /// Filter by event type.
    #[must_use]
    pub const fn of_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    /// Keep only the most recent `limit` matches.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Opaque handle returned by [`EventBus::on`], used to unregister a
/// listener via [`EventBus::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ListenerFn = Arc<dyn Fn(&Event) + Send + Sync>;

struct Registration {
    id: ListenerId,
    callback: ListenerFn,
}

struct Inner {
    history: VecDeque<Event>,
    listeners: HashMap<EventType, Vec<Registration>>,
    config: BusConfig,
}

/// In-process typed pub/sub bus with bounded append-only history.
///
/// Emission is synchronous: `emit` stamps an id and timestamp, appends to
/// history (subject to retention), dispatches to type-specific listeners in
/// registration order, then to `any` listeners, and returns the event id.
/// A panicking listener is caught and logged; it never prevents later
/// listeners from running and never propagates out of `emit`.
pub struct EventBus {
    inner: RwLock<Inner>,
    next_event_id: AtomicU64,
    next_listener_id: AtomicU64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.inner.read().map(|i| i.history.len()).unwrap_or(0);
        f.debug_struct("EventBus").field("history_len", &len).finish_non_exhaustive()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl EventBus {
    /// Create a new bus with the given configuration.
    #[must_use]
    pub fn new(config: BusConfig) -> Self {
        Self {
            inner: RwLock::new(Inner {
                history: VecDeque::with_capacity(config.max_history_size.min(1024)),
                listeners: HashMap::new(),
                config,
            }),
            next_event_id: AtomicU64::new(0),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// Stamp, journal, and dispatch an event. Returns the assigned event id.
    ///
    /// `event_type` must not be [`EventType::Any`]; that variant exists only
    /// as a subscription filter for [`Self::on`].
    pub fn emit(&self, event_type: EventType, payload: Value) -> String {
        debug_assert_ne!(event_type, EventType::Any, "Any is a subscription filter, not an emittable type");

        let seq = self.next_event_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("evt_{seq}");
        let timestamp_ms = now_ms();
        let event = Event::new(id.clone(), event_type, timestamp_ms, payload);

        // Append to history and snapshot the listeners to call, all under
        // one write guard so history order and dispatch order agree across
        // concurrent emitters.
        let to_call = {
            let mut guard = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.history.push_back(event.clone());
            let cap = guard.config.max_history_size;
            while guard.history.len() > cap {
                guard.history.pop_front();
            }

            let mut callbacks: Vec<ListenerFn> = Vec::new();
            if let Some(regs) = guard.listeners.get(&event_type) {
                callbacks.extend(regs.iter().map(|r| Arc::clone(&r.callback)));
            }
            if let Some(regs) = guard.listeners.get(&EventType::Any) {
                callbacks.extend(regs.iter().map(|r| Arc::clone(&r.callback)));
            }
            callbacks
        };

        for callback in to_call {
            let result = std::panic::catch_unwind(AssertUnwindSafe(|| callback(&event)));
            if let Err(panic) = result {
                let message = panic_message(&panic);
                warn!(event_id = %event.id, event_type = %event_type, error = %message, "event listener panicked");
            }
        }

        id
    }

    /// Register a listener for `event_type` (or [`EventType::Any`] for
    /// everything). Duplicate registrations of the same pair are allowed
    /// and fire N times, in registration order.
    pub fn on(&self, event_type: EventType, listener: impl Fn(&Event) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::SeqCst));
        let mut guard = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.listeners.entry(event_type).or_default().push(Registration {
            id,
            callback: Arc::new(listener),
        });
        id
    }

    /// Remove the first registration matching `(event_type, id)`. No-op if
    /// absent.
    pub fn off(&self, event_type: EventType, id: ListenerId) {
        let mut guard = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(regs) = guard.listeners.get_mut(&event_type)
            && let Some(pos) = regs.iter().position(|r| r.id == id)
        {
            regs.remove(pos);
        }
    }

    /// An ordered, read-only snapshot of retained events in emission order.
    #[must_use]
    pub fn history(&self) -> Vec<Event> {
        let guard = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.history.iter().cloned().collect()
    }

    /// A filtered view over retained events. `limit` keeps the most recent
    /// N matches after the other filters are applied.
    #[must_use]
    pub fn get_history(&self, query: &HistoryQuery) -> Vec<Event> {
        let guard = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut matches: Vec<Event> = guard
            .history
            .iter()
            .filter(|e| query.event_type.is_none_or(|t| e.event_type == t))
            .filter(|e| query.since_ts.is_none_or(|ts| e.timestamp_ms >= ts))
            .filter(|e| query.until_ts.is_none_or(|ts| e.timestamp_ms <= ts))
            .cloned()
            .collect();

        if let Some(limit) = query.limit
            && matches.len() > limit
        {
            matches = matches.split_off(matches.len() - limit);
        }
        matches
    }

    /// Number of currently retained events.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner).history.len()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "listener panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn bounded_history_keeps_last_n_in_order() {
        let bus = EventBus::new(BusConfig {
            max_history_size: 10,
            ..Default::default()
        });
        for i in 0..15 {
            bus.emit(EventType::PromptEvent, serde_json::json!({ "step": i }));
        }
        let history = bus.history();
        assert_eq!(history.len(), 10);
        assert_eq!(history[0].payload["step"], 5);
        assert_eq!(history[9].payload["step"], 14);
    }

    #[test]
    fn zero_capacity_retains_nothing_but_still_dispatches() {
        let bus = EventBus::new(BusConfig {
            max_history_size: 0,
            ..Default::default()
        });
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        bus.on(EventType::PromptEvent, move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        bus.emit(EventType::PromptEvent, Value::Null);
        assert_eq!(bus.history_len(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn get_history_limit_takes_most_recent() {
        let bus = EventBus::default();
        for i in 0..5 {
            bus.emit(EventType::PromptEvent, serde_json::json!({ "i": i }));
        }
        let recent = bus.get_history(&HistoryQuery::default().limit(2));
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].payload["i"], 3);
        assert_eq!(recent[1].payload["i"], 4);
    }

    #[test]
    fn listener_panic_is_isolated() {
        let bus = EventBus::default();
        let count = Arc::new(AtomicUsize::new(0));
        bus.on(EventType::PromptEvent, |_| panic!("boom"));
        let count_clone = Arc::clone(&count);
        bus.on(EventType::PromptEvent, move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        bus.emit(EventType::PromptEvent, Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn off_unregistered_listener_is_noop() {
        let bus = EventBus::default();
        bus.off(EventType::PromptEvent, ListenerId(9999));
    }

    #[test]
    fn any_listener_fires_after_type_specific() {
        let bus = EventBus::default();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let o1 = Arc::clone(&order);
        bus.on(EventType::Any, move |_| o1.lock().unwrap().push("any"));
        let o2 = Arc::clone(&order);
        bus.on(EventType::PromptEvent, move |_| o2.lock().unwrap().push("specific"));
        bus.emit(EventType::PromptEvent, Value::Null);
        assert_eq!(*order.lock().unwrap(), vec!["specific", "any"]);
    }
}
