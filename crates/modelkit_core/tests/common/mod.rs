#![allow(dead_code)]

use modelkit_core::{Attributes, Completion, Model, PersistenceBackend};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Converts a `json!` object literal into an attribute mapping.
pub fn attrs(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        other => panic!("expected JSON object, got {other}"),
    }
}

/// Shared, ordered log of strings for asserting event sequences.
#[derive(Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Captures one callback outcome.
#[derive(Clone, Default)]
pub struct Outcome(Rc<RefCell<Vec<bool>>>);

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl FnOnce(bool) + 'static {
        let results = Rc::clone(&self.0);
        move |success| results.borrow_mut().push(success)
    }

    pub fn results(&self) -> Vec<bool> {
        self.0.borrow().clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    Destroy,
}

/// Backend that records calls and completes them only when told to.
#[derive(Default)]
pub struct DeferredBackend {
    pending: RefCell<VecDeque<(Operation, Model, Completion)>>,
}

impl DeferredBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn next_operation(&self) -> Option<Operation> {
        self.pending.borrow().front().map(|(operation, _, _)| *operation)
    }

    /// Completes the oldest pending call with `success`.
    pub fn resolve_next(&self, success: bool) -> Option<Model> {
        let (_, model, done) = self.pending.borrow_mut().pop_front()?;
        done(success);
        Some(model)
    }
}

impl PersistenceBackend for DeferredBackend {
    fn save(&self, model: &Model, done: Completion) {
        self.pending
            .borrow_mut()
            .push_back((Operation::Save, model.clone(), done));
    }

    fn destroy(&self, model: &Model, done: Completion) {
        self.pending
            .borrow_mut()
            .push_back((Operation::Destroy, model.clone(), done));
    }
}

/// Backend whose answer is fixed, counting how often it was asked.
pub struct FixedBackend {
    pub success: bool,
    pub calls: RefCell<Vec<Operation>>,
}

impl FixedBackend {
    pub fn new(success: bool) -> Self {
        Self {
            success,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.calls.borrow().clone()
    }
}

impl PersistenceBackend for FixedBackend {
    fn save(&self, _model: &Model, done: Completion) {
        self.calls.borrow_mut().push(Operation::Save);
        done(self.success);
    }

    fn destroy(&self, _model: &Model, done: Completion) {
        self.calls.borrow_mut().push(Operation::Destroy);
        done(self.success);
    }
}
