//! Model instance handle.
//!
//! # Responsibility
//! - Expose attribute reads/writes with change events.
//! - Run the validation gate and hand save/destroy to the persistence
//!   coordinator.
//!
//! # Invariants
//! - `Model` clones share one instance; equality is identity.
//! - No internal borrow is held while hooks, listeners or backends run.
//! - `set` never touches committed attributes.
//! - An instance does not keep its type alive. Once every `ModelType` handle
//!   is dropped the instance is detached: saves fail, validation and custom
//!   methods have no type to consult.

use crate::event::{EventHub, EventName, ListenerId};
use crate::model::attributes::{AttributeStore, Attributes};
use crate::model::error_bag::ErrorBag;
use crate::model::model_type::{ModelType, WeakModelType};
use crate::model::ModelError;
use crate::service::persistence_service;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use uuid::Uuid;

/// Attribute name treated as the record identity.
pub const ID_ATTRIBUTE: &str = "id";

/// Shared handle to one model instance.
#[derive(Clone)]
pub struct Model {
    inner: Rc<ModelInner>,
}

struct ModelInner {
    uid: Uuid,
    type_name: String,
    model_type: WeakModelType,
    store: RefCell<AttributeStore>,
    errors: RefCell<ErrorBag>,
    events: EventHub,
    persisted: Cell<bool>,
}

impl Model {
    /// Creates the instance state only. Hooks and the `initialize` event are
    /// run by `ModelType::instantiate`.
    pub(crate) fn new(model_type: &ModelType, attributes: Attributes) -> Self {
        Self {
            inner: Rc::new(ModelInner {
                uid: Uuid::new_v4(),
                type_name: model_type.name().to_string(),
                model_type: model_type.downgrade(),
                store: RefCell::new(AttributeStore::new(attributes)),
                errors: RefCell::new(ErrorBag::new()),
                events: EventHub::new(),
                persisted: Cell::new(false),
            }),
        }
    }

    /// Process-unique identity of this instance.
    pub fn uid(&self) -> Uuid {
        self.inner.uid
    }

    /// Model type this instance was created from; `None` once detached.
    pub fn model_type(&self) -> Option<ModelType> {
        self.inner.model_type.upgrade()
    }

    /// Name of the type this instance was created from.
    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    /// Merged view (committed + pending). Mutating it never affects the model.
    pub fn get_all(&self) -> Attributes {
        self.inner.store.borrow().get_all()
    }

    /// Merged value for `name`; `None` when absent, `Some(Null)` for null.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.store.borrow().get(name)
    }

    /// Merged `id` attribute, if present.
    pub fn id(&self) -> Option<Value> {
        self.get(ID_ATTRIBUTE)
    }

    /// New until a committed `id` exists or a backend accepted a save.
    pub fn is_new(&self) -> bool {
        if self.inner.persisted.get() {
            return false;
        }
        !self
            .inner
            .store
            .borrow()
            .committed()
            .contains_key(ID_ATTRIBUTE)
    }

    /// Copy of the last committed attributes.
    pub fn attributes(&self) -> Attributes {
        self.inner.store.borrow().committed()
    }

    /// Copy of the pending overlay.
    pub fn changes(&self) -> Attributes {
        self.inner.store.borrow().changes()
    }

    pub fn has_changes(&self) -> bool {
        self.inner.store.borrow().has_changes()
    }

    /// Writes one attribute into the pending overlay.
    ///
    /// Fires `change:<name>` and `change` when the merged value changed.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> &Self {
        let changed = self.inner.store.borrow_mut().set(name, value.into());
        if changed {
            self.emit_changes(&[name.to_string()]);
        }
        self
    }

    /// Writes every entry of `attributes` in iteration order.
    ///
    /// Fires one `change:<attr>` per changed attribute, then one `change`.
    pub fn set_all(&self, attributes: Attributes) -> &Self {
        let changed = self.inner.store.borrow_mut().set_all(attributes);
        if !changed.is_empty() {
            self.emit_changes(&changed);
        }
        self
    }

    /// Drops pending changes and clears errors.
    pub fn reset(&self) -> &Self {
        self.inner.store.borrow_mut().reset();
        self.inner.errors.borrow_mut().clear();
        self
    }

    /// Runs the type's `validate` hook against a fresh error bag.
    ///
    /// Returns `true` iff no errors were recorded.
    pub fn valid(&self) -> bool {
        self.inner.errors.borrow_mut().clear();
        let mut errors = ErrorBag::new();
        let hook = self
            .model_type()
            .and_then(|model_type| model_type.validate_hook());
        if let Some(hook) = hook {
            hook(self, &mut errors);
        }
        let valid = errors.is_empty();
        *self.inner.errors.borrow_mut() = errors;
        valid
    }

    /// Snapshot of errors from the most recent validation run.
    pub fn errors(&self) -> ErrorBag {
        self.inner.errors.borrow().clone()
    }

    /// Validates, then persists through the type's backend.
    pub fn save(&self) -> &Self {
        persistence_service::save(self, None);
        self
    }

    /// Like [`save`](Self::save); `callback` receives the outcome.
    pub fn save_with(&self, callback: impl FnOnce(bool) + 'static) -> &Self {
        persistence_service::save(self, Some(Box::new(callback)));
        self
    }

    /// Removes the instance through the type's backend.
    pub fn destroy(&self) -> &Self {
        persistence_service::destroy(self, None);
        self
    }

    /// Like [`destroy`](Self::destroy); `callback` receives the outcome.
    pub fn destroy_with(&self, callback: impl FnOnce(bool) + 'static) -> &Self {
        persistence_service::destroy(self, Some(Box::new(callback)));
        self
    }

    /// Registers a listener on this instance's hub.
    pub fn on(
        &self,
        name: impl Into<EventName>,
        listener: impl Fn(&Model, &[Value]) + 'static,
    ) -> ListenerId {
        self.inner.events.on(name, listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.events.off(id)
    }

    /// Triggers `name` on this instance's hub.
    pub fn trigger(&self, name: impl Into<EventName>, args: &[Value]) -> &Self {
        self.inner.events.trigger(&name.into(), self, args);
        self
    }

    /// Invokes a custom instance method registered on the model type.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value, ModelError> {
        let Some(model_type) = self.model_type() else {
            return Err(ModelError::DetachedInstance {
                model: self.inner.type_name.clone(),
            });
        };
        let Some(handler) = model_type.instance_method(method) else {
            return Err(ModelError::UnknownMethod {
                model: self.inner.type_name.clone(),
                method: method.to_string(),
            });
        };
        Ok(handler(self, args))
    }

    pub(crate) fn events(&self) -> &EventHub {
        &self.inner.events
    }

    /// Commits `snapshot` when given, otherwise the whole overlay.
    pub(crate) fn commit(&self, snapshot: Option<&Attributes>) {
        {
            let mut store = self.inner.store.borrow_mut();
            match snapshot {
                Some(snapshot) => store.commit_only(snapshot),
                None => store.commit(),
            }
        }
        self.inner.persisted.set(true);
    }

    fn emit_changes(&self, names: &[String]) {
        for name in names {
            let args: Vec<Value> = self.get(name).into_iter().collect();
            self.inner
                .events
                .trigger(&EventName::attribute_change(name.as_str()), self, &args);
        }
        self.inner.events.trigger(&EventName::Change, self, &[]);
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Model {}

impl Debug for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("type", &self.inner.type_name)
            .field("uid", &self.inner.uid)
            .field("attributes", &self.inner.store.borrow().get_all())
            .finish()
    }
}
