//! In-memory backend keeping attribute snapshots per instance.

use crate::model::attributes::Attributes;
use crate::model::instance::Model;
use crate::repo::{Completion, PersistenceBackend};
use log::warn;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Snapshot store keyed by instance `uid`.
///
/// Uses `RefCell`/`Cell` since models are single-threaded; the backend
/// contract only hands out `&self`.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RefCell<BTreeMap<Uuid, Attributes>>,
    simulate_failure: Cell<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following save/destroy report failure.
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.set(simulate);
    }

    /// Stored merged attributes for one instance.
    pub fn snapshot(&self, uid: Uuid) -> Option<Attributes> {
        self.records.borrow().get(&uid).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl PersistenceBackend for MemoryBackend {
    fn save(&self, model: &Model, done: Completion) {
        if self.simulate_failure.get() {
            warn!(
                "event=backend_save module=repo status=error backend=memory uid={} error_code=simulated_failure",
                model.uid()
            );
            done(false);
            return;
        }
        self.records
            .borrow_mut()
            .insert(model.uid(), model.get_all());
        done(true);
    }

    fn destroy(&self, model: &Model, done: Completion) {
        if self.simulate_failure.get() {
            warn!(
                "event=backend_destroy module=repo status=error backend=memory uid={} error_code=simulated_failure",
                model.uid()
            );
            done(false);
            return;
        }
        self.records.borrow_mut().remove(&model.uid());
        done(true);
    }
}
