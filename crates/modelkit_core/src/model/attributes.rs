//! Committed attributes plus pending-change overlay.
//!
//! # Responsibility
//! - Hold last-committed attributes and the pending overlay separately.
//! - Serve reads from the merged view; route writes into the overlay only.
//!
//! # Invariants
//! - `changes` never holds a key whose value equals the committed value.
//! - Reads never alias internal state; every mapping returned is a copy.
//! - `committed` is only modified by `commit()` and `commit_only()`.

use serde_json::{Map, Value};

/// Ordered attribute mapping (insertion order is preserved).
pub type Attributes = Map<String, Value>;

/// Two-layer attribute storage owned by one model instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    committed: Attributes,
    changes: Attributes,
}

impl AttributeStore {
    /// Creates a store whose committed layer is seeded from `attributes`.
    pub fn new(attributes: Attributes) -> Self {
        Self {
            committed: attributes,
            changes: Attributes::new(),
        }
    }

    /// Returns the merged view: committed attributes overlaid with changes.
    pub fn get_all(&self) -> Attributes {
        let mut merged = self.committed.clone();
        for (name, value) in &self.changes {
            merged.insert(name.clone(), value.clone());
        }
        merged
    }

    /// Returns the merged value for `name`.
    ///
    /// `None` means absent in both layers; `Some(Value::Null)` is an explicit
    /// null.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.changes
            .get(name)
            .or_else(|| self.committed.get(name))
            .cloned()
    }

    /// Records `value` for `name` in the overlay.
    ///
    /// Setting the committed value drops `name` from the overlay instead.
    /// Returns whether the merged value for `name` changed.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        let before = self.get(name);
        if self.committed.get(name) == Some(&value) {
            self.changes.remove(name);
        } else {
            self.changes.insert(name.to_string(), value);
        }
        before != self.get(name)
    }

    /// Applies [`set`](Self::set) key by key in iteration order.
    ///
    /// Returns the names whose merged value changed, in that order.
    pub fn set_all(&mut self, attributes: Attributes) -> Vec<String> {
        let mut changed = Vec::new();
        for (name, value) in attributes {
            if self.set(name.as_str(), value) {
                changed.push(name);
            }
        }
        changed
    }

    /// Merges the overlay into the committed layer and clears the overlay.
    pub fn commit(&mut self) {
        for (name, value) in std::mem::take(&mut self.changes) {
            self.committed.insert(name, value);
        }
    }

    /// Commits only `snapshot`, an earlier copy of the overlay.
    ///
    /// Writes made after the snapshot was taken stay pending, so the merged
    /// view is the same before and after.
    pub fn commit_only(&mut self, snapshot: &Attributes) {
        let merged = self.get_all();
        for (name, value) in snapshot {
            self.committed.insert(name.clone(), value.clone());
        }
        let pending: Attributes = merged
            .into_iter()
            .filter(|(name, value)| self.committed.get(name) != Some(value))
            .collect();
        self.changes = pending;
    }

    /// Discards pending changes. Committed attributes are untouched.
    pub fn reset(&mut self) {
        self.changes.clear();
    }

    /// Returns a copy of the committed layer.
    pub fn committed(&self) -> Attributes {
        self.committed.clone()
    }

    /// Returns a copy of the pending overlay.
    pub fn changes(&self) -> Attributes {
        self.changes.clone()
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Returns whether `name` has a pending change.
    pub fn is_changed(&self, name: &str) -> bool {
        self.changes.contains_key(name)
    }
}
