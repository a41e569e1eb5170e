//! Shared first/last-state registry and attachment tracking.
//!
//! One [`FlipRegistry`] is shared by every animated unit under a provider
//! scope. It maps stable animation keys to their "first" (pre-change) and
//! "last" (post-change) snapshots and tracks which keys are currently
//! mounted, which is how siblings and ancestors coordinate without holding
//! references to each other.
//!
//! All state is interior-mutable behind `RefCell`: the runtime model is
//! single-threaded and cooperative, so every mutation runs to completion
//! before any other scheduled callback observes the maps.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use glide_host::RenderHost;

use crate::snapshot::StyleSnapshot;

/// Process-wide (per provider scope) store of first/last snapshots and the
/// set of currently-attached animation keys.
#[derive(Debug, Default)]
pub struct FlipRegistry {
    first: RefCell<HashMap<String, StyleSnapshot>>,
    last: RefCell<HashMap<String, StyleSnapshot>>,
    attached: RefCell<HashSet<String>>,
}

impl FlipRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The "first" (baseline) snapshot for a key, if one is recorded.
    pub fn first(&self, key: &str) -> Option<StyleSnapshot> {
        self.first.borrow().get(key).cloned()
    }

    /// The "last" snapshot for a key, if one is recorded.
    pub fn last(&self, key: &str) -> Option<StyleSnapshot> {
        self.last.borrow().get(key).cloned()
    }

    /// Replace the "first" snapshot for a key. `None` clears it.
    pub fn set_first(&self, key: &str, snapshot: Option<StyleSnapshot>) {
        match snapshot {
            Some(snapshot) => self.first.borrow_mut().insert(key.to_string(), snapshot),
            None => self.first.borrow_mut().remove(key),
        };
    }

    /// Replace the "last" snapshot for a key. `None` clears it.
    pub fn set_last(&self, key: &str, snapshot: Option<StyleSnapshot>) {
        match snapshot {
            Some(snapshot) => self.last.borrow_mut().insert(key.to_string(), snapshot),
            None => self.last.borrow_mut().remove(key),
        };
    }

    /// Capture the node and store it as the key's "first" snapshot.
    ///
    /// A capture with zero width and zero height — typical of a node that is
    /// not laid out yet — is silently dropped so a future real capture can
    /// populate the entry. Returns whether a snapshot was stored.
    pub fn record_first<H: RenderHost>(
        &self,
        host: &H,
        key: &str,
        node: &H::Node,
        properties: &[String],
    ) -> bool {
        let snapshot = StyleSnapshot::capture(host, node, properties);
        if snapshot.rect.is_degenerate() {
            return false;
        }
        self.set_first(key, Some(snapshot));
        true
    }

    /// Capture the node and store it as the key's "last" snapshot, with the
    /// same degenerate-geometry guard as [`record_first`](Self::record_first).
    pub fn record_last<H: RenderHost>(
        &self,
        host: &H,
        key: &str,
        node: &H::Node,
        properties: &[String],
    ) -> bool {
        let snapshot = StyleSnapshot::capture(host, node, properties);
        if snapshot.rect.is_degenerate() {
            return false;
        }
        self.set_last(key, Some(snapshot));
        true
    }

    /// Clear both snapshots for a key.
    pub fn clear_entry(&self, key: &str) {
        self.set_first(key, None);
        self.set_last(key, None);
    }

    /// Mark a key as mounted.
    pub fn attach(&self, key: &str) {
        self.attached.borrow_mut().insert(key.to_string());
    }

    /// Mark a key as no longer mounted.
    pub fn detach(&self, key: &str) {
        self.attached.borrow_mut().remove(key);
    }

    /// Whether a key is currently mounted. A detached key that re-attaches
    /// within one tick reads as attached here, which is what the removal
    /// race guard checks.
    pub fn is_attached(&self, key: &str) -> bool {
        self.attached.borrow().contains(key)
    }

    /// The number of keys holding a baseline snapshot.
    pub fn baseline_count(&self) -> usize {
        self.first.borrow().len()
    }

    /// The number of currently-attached keys.
    pub fn attached_count(&self) -> usize {
        self.attached.borrow().len()
    }
}
