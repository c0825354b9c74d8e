//! Hierarchical keyed state store with path-based subscriptions.
//!
//! The store holds a single deep JSON value tree. Paths are dot-separated
//! segment chains ("stats.fps"). Reads never fail: a partially-missing path
//! yields the caller-supplied default. Writes notify exact-path subscribers
//! with the real diff and strict-ancestor subscribers with a structural
//! notification, so coarse observers can watch a whole subtree without
//! per-leaf wiring.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use serde_json::{Map, Value};

/// Handle returned by [`StateStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WatcherId(u64);

type Watcher = Rc<dyn Fn(&Value, &Value, &str)>;

/// Single-threaded hierarchical key→value store.
#[derive(Default)]
pub struct StateStore {
    root: Value,
    next_id: u64,
    watchers: BTreeMap<String, Vec<(WatcherId, Watcher)>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
            next_id: 0,
            watchers: BTreeMap::new(),
        }
    }

    /// Reads the value at `path`, or `default` when any segment is missing.
    pub fn get(&self, path: &str, default: Value) -> Value {
        let mut node = &self.root;
        for segment in path.split('.') {
            match node.as_object().and_then(|map| map.get(segment)) {
                Some(child) => node = child,
                None => return default,
            }
        }
        node.clone()
    }

    /// Writes `value` at `path`, creating intermediate object nodes as
    /// needed. Returns `true` and notifies subscribers only when the stored
    /// value actually changed.
    pub fn set(&mut self, path: &str, value: Value) -> bool {
        if path.is_empty() {
            tracing::warn!("refusing to set empty store path");
            return false;
        }

        let segments: Vec<&str> = path.split('.').collect();
        let mut node = &mut self.root;
        for segment in &segments[..segments.len() - 1] {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Some(map) = node.as_object_mut() else {
                return false;
            };
            node = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let leaf = segments[segments.len() - 1];
        let Some(map) = node.as_object_mut() else {
            return false;
        };
        let old = map.get(leaf).cloned().unwrap_or(Value::Null);
        if old == value {
            return false;
        }
        map.insert(leaf.to_string(), value.clone());

        self.notify(path, &value, &old);

        // Ancestors observe a structural change: current value as both sides.
        for cut in (1..segments.len()).rev() {
            let ancestor = segments[..cut].join(".");
            if self.watchers.get(&ancestor).is_none_or(Vec::is_empty) {
                continue;
            }
            let current = self.get(&ancestor, Value::Null);
            self.notify(&ancestor, &current, &current);
        }

        true
    }

    /// Registers `callback` for changes at exactly `path` or anywhere below it.
    pub fn subscribe<F>(&mut self, path: &str, callback: F) -> WatcherId
    where
        F: Fn(&Value, &Value, &str) + 'static,
    {
        let id = WatcherId(self.next_id);
        self.next_id += 1;
        self.watchers
            .entry(path.to_string())
            .or_default()
            .push((id, Rc::new(callback)));
        id
    }

    /// Removes exactly one registration. Repeated calls are no-ops.
    pub fn unsubscribe(&mut self, id: WatcherId) -> bool {
        for list in self.watchers.values_mut() {
            if let Some(index) = list.iter().position(|(other, _)| *other == id) {
                list.remove(index);
                return true;
            }
        }
        false
    }

    fn notify(&self, path: &str, new: &Value, old: &Value) {
        let snapshot: Vec<(WatcherId, Watcher)> = self
            .watchers
            .get(path)
            .cloned()
            .unwrap_or_default();
        for (id, watcher) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| watcher(new, old, path))).is_err() {
                tracing::error!(path, watcher = id.0, "store subscriber panicked");
            }
        }
    }
}
