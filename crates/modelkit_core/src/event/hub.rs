//! Synchronous publish/subscribe registry.
//!
//! # Responsibility
//! - Keep registered listeners per [`EventName`] in registration order.
//! - Dispatch triggers synchronously to every listener of one name.
//!
//! # Invariants
//! - Listeners run in registration order.
//! - No internal borrow is held while a listener runs, so listeners may call
//!   back into the hub or the model.
//! - A listener registered during a dispatch first runs on the next trigger.

use crate::event::name::EventName;
use crate::model::instance::Model;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Listener callback. Receives the affected instance and trigger arguments.
pub type Listener = Rc<dyn Fn(&Model, &[Value])>;

/// Handle returned by [`EventHub::on`], used to unregister a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Event hub used for both per-instance and any-instance scopes.
#[derive(Default)]
pub struct EventHub {
    listeners: RefCell<BTreeMap<EventName, Vec<(ListenerId, Listener)>>>,
    next_id: Cell<u64>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for every future trigger of `name`.
    pub fn on(
        &self,
        name: impl Into<EventName>,
        listener: impl Fn(&Model, &[Value]) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .entry(name.into())
            .or_default()
            .push((id, Rc::new(listener)));
        id
    }

    /// Removes one listener. Returns `false` when the id is unknown.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let mut removed = false;
        for entries in listeners.values_mut() {
            let before = entries.len();
            entries.retain(|(entry_id, _)| *entry_id != id);
            removed |= entries.len() != before;
        }
        listeners.retain(|_, entries| !entries.is_empty());
        removed
    }

    /// Invokes every listener of `name` with `model` and `args`.
    ///
    /// Returns the number of listeners invoked.
    pub fn trigger(&self, name: &EventName, model: &Model, args: &[Value]) -> usize {
        // Snapshot so listeners can register/unregister while we dispatch.
        let snapshot: Vec<Listener> = match self.listeners.borrow().get(name) {
            Some(entries) => entries
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect(),
            None => return 0,
        };

        for listener in &snapshot {
            listener(model, args);
        }
        snapshot.len()
    }

    /// Returns the number of listeners registered for `name`.
    pub fn listener_count(&self, name: &EventName) -> usize {
        self.listeners
            .borrow()
            .get(name)
            .map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }
}

impl Debug for EventHub {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let counts: BTreeMap<String, usize> = self
            .listeners
            .borrow()
            .iter()
            .map(|(name, entries)| (name.to_string(), entries.len()))
            .collect();
        f.debug_struct("EventHub")
            .field("listeners", &counts)
            .finish()
    }
}
