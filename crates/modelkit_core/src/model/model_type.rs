//! Model type descriptors and their builder.
//!
//! # Responsibility
//! - Own class-wide state: collection, any-instance hub, hooks, backend.
//! - Construct instances and announce them on the any-instance hub.
//!
//! # Invariants
//! - Every `build()` yields independent state; there is no registry keyed by
//!   name.
//! - Construction order is: seed attributes, `initialize` hook, then the
//!   any-instance `initialize` event.
//! - Instances refer back to their type weakly; caller-held `ModelType`
//!   handles own the type, its collection and its backend.

use crate::event::{EventHub, EventName};
use crate::model::attributes::Attributes;
use crate::model::collection::Collection;
use crate::model::error_bag::ErrorBag;
use crate::model::instance::Model;
use crate::model::ModelError;
use crate::repo::{NoopBackend, PersistenceBackend};
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};

/// Runs once per instance, after attributes are seeded.
pub type InitializeHook = Rc<dyn Fn(&Model)>;
/// Records failures for the merged view of one instance.
pub type ValidateHook = Rc<dyn Fn(&Model, &mut ErrorBag)>;
/// Custom method shared by all instances of a type.
pub type InstanceMethod = Rc<dyn Fn(&Model, &[Value]) -> Value>;
/// Custom method attached to the type itself.
pub type ClassMethod = Rc<dyn Fn(&ModelType, &[Value]) -> Value>;

/// Shared handle to one model type. Clones refer to the same type.
#[derive(Clone)]
pub struct ModelType {
    inner: Rc<ModelTypeInner>,
}

struct ModelTypeInner {
    name: String,
    initialize: Option<InitializeHook>,
    validate: Option<ValidateHook>,
    instance_methods: BTreeMap<String, InstanceMethod>,
    class_methods: BTreeMap<String, ClassMethod>,
    backend: Rc<dyn PersistenceBackend>,
    collection: Collection,
    any_instance: EventHub,
}

impl ModelType {
    /// Starts configuring a new model type called `name`.
    pub fn builder(name: impl Into<String>) -> ModelTypeBuilder {
        ModelTypeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Persisted instances of this type, in creation order.
    pub fn collection(&self) -> &Collection {
        &self.inner.collection
    }

    /// Class-wide hub receiving lifecycle events of every instance.
    pub fn any_instance(&self) -> &EventHub {
        &self.inner.any_instance
    }

    pub fn backend(&self) -> Rc<dyn PersistenceBackend> {
        Rc::clone(&self.inner.backend)
    }

    /// Creates an instance seeded with `attributes`.
    pub fn instantiate(&self, attributes: Attributes) -> Model {
        let model = Model::new(self, attributes);
        if let Some(hook) = &self.inner.initialize {
            hook(&model);
        }
        debug!(
            "event=model_init module=model status=ok model={} uid={}",
            self.inner.name,
            model.uid()
        );
        self.inner
            .any_instance
            .trigger(&EventName::Initialize, &model, &[]);
        model
    }

    /// Creates an instance with no attributes.
    pub fn instantiate_empty(&self) -> Model {
        self.instantiate(Attributes::new())
    }

    /// Invokes a custom class method.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value, ModelError> {
        let Some(handler) = self.inner.class_methods.get(method).cloned() else {
            return Err(ModelError::UnknownMethod {
                model: self.inner.name.clone(),
                method: method.to_string(),
            });
        };
        Ok(handler(self, args))
    }

    pub fn has_class_method(&self, method: &str) -> bool {
        self.inner.class_methods.contains_key(method)
    }

    pub fn has_instance_method(&self, method: &str) -> bool {
        self.inner.instance_methods.contains_key(method)
    }

    pub(crate) fn downgrade(&self) -> WeakModelType {
        WeakModelType(Rc::downgrade(&self.inner))
    }

    pub(crate) fn validate_hook(&self) -> Option<ValidateHook> {
        self.inner.validate.clone()
    }

    pub(crate) fn instance_method(&self, method: &str) -> Option<InstanceMethod> {
        self.inner.instance_methods.get(method).cloned()
    }
}

/// Non-owning reference from an instance to its type.
#[derive(Clone)]
pub(crate) struct WeakModelType(Weak<ModelTypeInner>);

impl WeakModelType {
    pub(crate) fn upgrade(&self) -> Option<ModelType> {
        self.0.upgrade().map(|inner| ModelType { inner })
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ModelType {}

impl Debug for ModelType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.inner.name)
            .field("members", &self.inner.collection.len())
            .field(
                "instance_methods",
                &self.inner.instance_methods.keys().collect::<Vec<_>>(),
            )
            .field(
                "class_methods",
                &self.inner.class_methods.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Explicit configuration steps for one model type.
pub struct ModelTypeBuilder {
    name: String,
    initialize: Option<InitializeHook>,
    validate: Option<ValidateHook>,
    instance_methods: BTreeMap<String, InstanceMethod>,
    class_methods: BTreeMap<String, ClassMethod>,
    backend: Option<Rc<dyn PersistenceBackend>>,
}

impl ModelTypeBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initialize: None,
            validate: None,
            instance_methods: BTreeMap::new(),
            class_methods: BTreeMap::new(),
            backend: None,
        }
    }

    pub fn initialize(mut self, hook: impl Fn(&Model) + 'static) -> Self {
        self.initialize = Some(Rc::new(hook));
        self
    }

    pub fn validate(mut self, hook: impl Fn(&Model, &mut ErrorBag) + 'static) -> Self {
        self.validate = Some(Rc::new(hook));
        self
    }

    /// Replaces the default [`NoopBackend`].
    pub fn backend(mut self, backend: Rc<dyn PersistenceBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Registers a method callable through `Model::call`. Re-registering a
    /// name replaces the previous method.
    pub fn instance_method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&Model, &[Value]) -> Value + 'static,
    ) -> Self {
        self.instance_methods.insert(name.into(), Rc::new(method));
        self
    }

    /// Registers a method callable through `ModelType::call`.
    pub fn class_method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&ModelType, &[Value]) -> Value + 'static,
    ) -> Self {
        self.class_methods.insert(name.into(), Rc::new(method));
        self
    }

    /// Applies a group of configuration steps in one closure.
    pub fn customize(self, customization: impl FnOnce(Self) -> Self) -> Self {
        customization(self)
    }

    pub fn build(self) -> ModelType {
        let backend = self
            .backend
            .unwrap_or_else(|| Rc::new(NoopBackend) as Rc<dyn PersistenceBackend>);
        debug!(
            "event=model_type_build module=model status=ok model={} instance_methods={} class_methods={}",
            self.name,
            self.instance_methods.len(),
            self.class_methods.len()
        );
        ModelType {
            inner: Rc::new(ModelTypeInner {
                name: self.name,
                initialize: self.initialize,
                validate: self.validate,
                instance_methods: self.instance_methods,
                class_methods: self.class_methods,
                backend,
                collection: Collection::new(),
                any_instance: EventHub::new(),
            }),
        }
    }
}
