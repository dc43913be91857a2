//! Save/destroy orchestration between models and backends.
//!
//! # Responsibility
//! - Gate saves on validation.
//! - Delegate to the model type's backend and finalize on its outcome.
//!
//! # Invariants
//! - On failure nothing changes: attributes, pending changes and collection
//!   membership stay as they were, and no events fire.
//! - On success the order is: state update, per-instance event,
//!   any-instance event, caller callback.
//! - The caller callback runs at most once, after the backend completes.
//! - A completion arriving after `backend.save` returned commits only the
//!   overlay as it stood when the call returned. Later writes stay pending.
//! - A detached instance (type dropped) cannot be saved or destroyed.

use crate::event::EventName;
use crate::model::attributes::Attributes;
use crate::model::instance::Model;
use crate::model::model_type::ModelType;
use log::{debug, info, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Optional caller callback receiving the final outcome.
pub type OutcomeCallback = Option<Box<dyn FnOnce(bool)>>;

/// Validates `model`, then saves it through its type's backend.
pub fn save(model: &Model, callback: OutcomeCallback) {
    let Some(model_type) = attached_type(model, "model_save") else {
        notify(callback, false);
        return;
    };

    if !model.valid() {
        info!(
            "event=model_save module=service status=rejected model={} uid={} error_count={}",
            model_type.name(),
            model.uid(),
            model.errors().size()
        );
        notify(callback, false);
        return;
    }

    debug!(
        "event=model_save module=service status=start model={} uid={}",
        model_type.name(),
        model.uid()
    );
    let backend = model_type.backend();
    let target = model.clone();
    // Filled in only if the backend returns before completing.
    let seen: Rc<RefCell<Option<Attributes>>> = Rc::new(RefCell::new(None));
    let completion_seen = Rc::clone(&seen);
    let completed = Rc::new(Cell::new(false));
    let completion_flag = Rc::clone(&completed);
    backend.save(
        model,
        Box::new(move |success| {
            completion_flag.set(true);
            let snapshot = completion_seen.borrow_mut().take();
            finish_save(&model_type, &target, snapshot, success, callback);
        }),
    );
    if !completed.get() {
        *seen.borrow_mut() = Some(model.changes());
    }
}

/// Destroys `model` through its type's backend. No validation runs.
pub fn destroy(model: &Model, callback: OutcomeCallback) {
    let Some(model_type) = attached_type(model, "model_destroy") else {
        notify(callback, false);
        return;
    };

    debug!(
        "event=model_destroy module=service status=start model={} uid={}",
        model_type.name(),
        model.uid()
    );
    let backend = model_type.backend();
    let target = model.clone();
    backend.destroy(
        model,
        Box::new(move |success| finish_destroy(&model_type, &target, success, callback)),
    );
}

fn attached_type(model: &Model, event: &str) -> Option<ModelType> {
    let model_type = model.model_type();
    if model_type.is_none() {
        warn!(
            "event={} module=service status=error model={} uid={} error_code=type_dropped",
            event,
            model.type_name(),
            model.uid()
        );
    }
    model_type
}

fn finish_save(
    model_type: &ModelType,
    model: &Model,
    snapshot: Option<Attributes>,
    success: bool,
    callback: OutcomeCallback,
) {
    if !success {
        warn!(
            "event=model_save module=service status=error model={} uid={} error_code=backend_rejected",
            model_type.name(),
            model.uid()
        );
        notify(callback, false);
        return;
    }

    model.commit(snapshot.as_ref());
    let created = model_type.collection().insert(model);
    info!(
        "event=model_save module=service status=ok model={} uid={} operation={}",
        model_type.name(),
        model.uid(),
        if created { "create" } else { "update" }
    );

    model.events().trigger(&EventName::Save, model, &[]);
    model_type
        .any_instance()
        .trigger(&EventName::Save, model, &[]);
    notify(callback, true);
}

fn finish_destroy(
    model_type: &ModelType,
    model: &Model,
    success: bool,
    callback: OutcomeCallback,
) {
    if !success {
        warn!(
            "event=model_destroy module=service status=error model={} uid={} error_code=backend_rejected",
            model_type.name(),
            model.uid()
        );
        notify(callback, false);
        return;
    }

    let was_member = model_type.collection().remove(model);
    info!(
        "event=model_destroy module=service status=ok model={} uid={} was_member={}",
        model_type.name(),
        model.uid(),
        was_member
    );

    model.events().trigger(&EventName::Destroy, model, &[]);
    model_type
        .any_instance()
        .trigger(&EventName::Destroy, model, &[]);
    notify(callback, true);
}

fn notify(callback: OutcomeCallback, success: bool) {
    if let Some(callback) = callback {
        callback(success);
    }
}
