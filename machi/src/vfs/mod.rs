//! Versioned virtual file system: the agent's scratchpad and workspace.
//!
//! Every write produces a new immutable [`FileVersion`] chained to the
//! path's prior version via `prev`; the "current view" is a path → latest
//! version id map. See [`Vfs`] for the contract.

use std::{
    collections::BTreeMap,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

use crate::bus::{EventBus, EventType};

/// A single immutable write to a path.
///
/// Versions form a per-path linked list via `prev`, newest first; the
/// chain terminates at the version whose `prev` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileVersion {
    /// Unique version id.
    pub id: String,
    /// The path this version was written to.
    pub path: String,
    /// The content written, as raw bytes.
    pub content: Vec<u8>,
    /// Free-form author tag.
    pub author: String,
    /// Wall-clock timestamp, milliseconds since epoch.
    pub timestamp_ms: u64,
    /// The version this one superseded for the same path, if any.
    pub prev: Option<String>,
}

impl FileVersion {
    /// Content interpreted as UTF-8, lossily if invalid.
    #[must_use]
    pub fn content_string(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Outcome of a [`Vfs::delete`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Always `true`: delete never fails against the in-memory store.
    pub ok: bool,
    /// Whether a mapping actually existed and was removed (`false` means
    /// the call was an idempotent no-op).
    pub existed: bool,
}

struct Inner {
    versions: BTreeMap<String, Arc<FileVersion>>,
    latest: BTreeMap<String, String>,
    snapshots: BTreeMap<String, BTreeMap<String, String>>,
}

/// In-memory, content-addressed, versioned file store.
///
/// Every write is totally ordered per path (guarded by a single write lock
/// spanning the read-modify-write of the latest-version map) and emits
/// exactly one [`EventType::VFSChangeEvent`] on the bus it was built with.
pub struct Vfs {
    inner: RwLock<Inner>,
    bus: Arc<EventBus>,
    next_version_seq: AtomicU64,
    next_snapshot_seq: AtomicU64,
}

impl std::fmt::Debug for Vfs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.inner.read().map(|i| i.latest.len()).unwrap_or(0);
        f.debug_struct("Vfs").field("file_count", &count).finish_non_exhaustive()
    }
}

impl Vfs {
    /// Create a new, empty VFS that journals changes to `bus`.
    #[must_use]
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                versions: BTreeMap::new(),
                latest: BTreeMap::new(),
                snapshots: BTreeMap::new(),
            }),
            bus,
            next_version_seq: AtomicU64::new(0),
            next_snapshot_seq: AtomicU64::new(0),
        }
    }

    fn next_version_id(&self) -> String {
        format!("ver_{}", self.next_version_seq.fetch_add(1, Ordering::SeqCst))
    }

    /// Write `content` to `path`, chaining onto the path's current version
    /// (if any). Emits one `VFSChangeEvent{path, versionId, op:"write"}`.
    pub fn write(&self, path: impl Into<String>, content: impl Into<Vec<u8>>, author: Option<&str>) -> FileVersion {
        let path = path.into();
        let version = {
            let mut guard = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            let prev = guard.latest.get(&path).cloned();
            let version = FileVersion {
                id: self.next_version_id(),
                path: path.clone(),
                content: content.into(),
                author: author.unwrap_or("agent").to_string(),
                timestamp_ms: now_ms(),
                prev,
            };
            let arc = Arc::new(version.clone());
            guard.latest.insert(path.clone(), arc.id.clone());
            guard.versions.insert(arc.id.clone(), arc);
            version
        };

        self.bus.emit(
            EventType::VFSChangeEvent,
            serde_json::json!({ "path": path, "versionId": version.id, "op": "write" }),
        );
        version
    }

    /// The content of the latest version for `path`, or `None` if `path`
    /// has no current mapping.
    #[must_use]
    pub fn read(&self, path: &str) -> Option<Vec<u8>> {
        let guard = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = guard.latest.get(path)?;
        guard.versions.get(id).map(|v| v.content.clone())
    }

    /// Remove the current mapping for `path`. Historical versions remain
    /// reachable by id. Idempotent: deleting an absent path succeeds with
    /// `existed: false`. Always emits one `VFSChangeEvent{path, op:"delete"}`.
    pub fn delete(&self, path: &str) -> DeleteOutcome {
        let existed = {
            let mut guard = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.latest.remove(path).is_some()
        };
        self.bus.emit(
            EventType::VFSChangeEvent,
            serde_json::json!({ "path": path, "op": "delete", "noop": !existed }),
        );
        DeleteOutcome { ok: true, existed }
    }

    /// Paths currently mapped (deleted paths excluded).
    #[must_use]
    pub fn list_files(&self) -> Vec<String> {
        let guard = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.latest.keys().cloned().collect()
    }

    /// Direct lookup of a version by id, independent of current mappings.
    #[must_use]
    pub fn get_version(&self, id: &str) -> Option<FileVersion> {
        let guard = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.versions.get(id).map(|v| (**v).clone())
    }

    /// The newest-to-oldest version chain for `path`.
    #[must_use]
    pub fn history(&self, path: &str) -> Vec<FileVersion> {
        let guard = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(mut cursor) = guard.latest.get(path).cloned() else {
            return Vec::new();
        };
        let mut chain = Vec::new();
        loop {
            let Some(version) = guard.versions.get(&cursor) else { break };
            chain.push((**version).clone());
            match &version.prev {
                Some(prev) => cursor = prev.clone(),
                None => break,
            }
        }
        chain
    }

    /// Capture a frozen path → latest-version-id mapping. Returns the
    /// snapshot id.
    pub fn snapshot(&self) -> String {
        let mut guard = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = format!("snap_{}", self.next_snapshot_seq.fetch_add(1, Ordering::SeqCst));
        let frozen = guard.latest.clone();
        guard.snapshots.insert(id.clone(), frozen);
        id
    }

    /// Replace the current path→latest mapping with a previously captured
    /// snapshot's mapping. Emits one `VFSChangeEvent` per path whose
    /// mapping changed (added, updated, or removed relative to the
    /// snapshot). Returns `false` if `snapshot_id` is unknown.
    pub fn restore(&self, snapshot_id: &str) -> bool {
        let changes = {
            let mut guard = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            let Some(target) = guard.snapshots.get(snapshot_id).cloned() else {
                return false;
            };

            let mut changes: Vec<(String, Option<String>)> = Vec::new();
            for (path, version_id) in &target {
                if guard.latest.get(path) != Some(version_id) {
                    changes.push((path.clone(), Some(version_id.clone())));
                }
            }
            for path in guard.latest.keys() {
                if !target.contains_key(path) {
                    changes.push((path.clone(), None));
                }
            }
            guard.latest = target;
            changes
        };

        for (path, version_id) in changes {
            match version_id {
                Some(id) => {
                    self.bus.emit(
                        EventType::VFSChangeEvent,
                        serde_json::json!({ "path": path, "versionId": id, "op": "write" }),
                    );
                }
                None => {
                    self.bus.emit(EventType::VFSChangeEvent, serde_json::json!({ "path": path, "op": "delete" }));
                }
            }
        }
        true
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vfs() -> Vfs {
        Vfs::new(Arc::new(EventBus::default()))
    }

    #[test]
    fn write_then_read_round_trips() {
        let vfs = vfs();
        vfs.write("a.txt", "hi", None);
        assert_eq!(vfs.read("a.txt").unwrap(), b"hi");
        let changes: Vec<_> = vfs
            .bus
            .get_history(&crate::bus::HistoryQuery::default().of_type(EventType::VFSChangeEvent))
            .into_iter()
            .filter(|e| e.payload["path"] == "a.txt")
            .collect();
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn version_chain_links_prev() {
        let vfs = vfs();
        let v1 = vfs.write("a.txt", "one", None);
        let v2 = vfs.write("a.txt", "two", None);
        assert_eq!(v2.prev.as_deref(), Some(v1.id.as_str()));
        assert_ne!(v1.id, v2.id);
        assert_eq!(vfs.get_version(&v1.id).unwrap().content_string(), "one");
    }

    #[test]
    fn read_of_never_written_path_is_none() {
        assert!(vfs().read("nope.txt").is_none());
    }

    #[test]
    fn delete_absent_path_is_idempotent_noop() {
        let vfs = vfs();
        let outcome = vfs.delete("nope.txt");
        assert!(outcome.ok);
        assert!(!outcome.existed);
    }

    #[test]
    fn delete_removes_current_mapping_but_keeps_history() {
        let vfs = vfs();
        let v1 = vfs.write("a.txt", "hi", None);
        let outcome = vfs.delete("a.txt");
        assert!(outcome.existed);
        assert!(vfs.read("a.txt").is_none());
        assert!(!vfs.list_files().contains(&"a.txt".to_string()));
        assert_eq!(vfs.get_version(&v1.id).unwrap().content_string(), "hi");
    }

    #[test]
    fn snapshot_and_restore_round_trip() {
        let vfs = vfs();
        vfs.write("a.txt", "one", None);
        let snap = vfs.snapshot();
        vfs.write("a.txt", "two", None);
        vfs.write("b.txt", "new", None);

        assert!(vfs.restore(&snap));
        assert_eq!(vfs.read("a.txt").unwrap(), b"one");
        assert!(vfs.read("b.txt").is_none());
    }

    #[test]
    fn history_walks_newest_to_oldest() {
        let vfs = vfs();
        vfs.write("a.txt", "one", None);
        vfs.write("a.txt", "two", None);
        vfs.write("a.txt", "three", None);
        let history = vfs.history("a.txt");
        assert_eq!(
            history.iter().map(FileVersion::content_string).collect::<Vec<_>>(),
            vec!["three", "two", "one"]
        );
    }
}
