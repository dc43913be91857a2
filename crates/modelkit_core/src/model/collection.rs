//! Ordered registry of persisted instances of one model type.
//!
//! # Invariants
//! - An instance is a member iff its last finished save succeeded after
//!   construction and no destroy has succeeded since.
//! - Membership is by identity; one instance appears at most once.
//! - Only the persistence coordinator mutates membership.

use crate::model::instance::Model;
use serde_json::Value;
use std::cell::RefCell;
use uuid::Uuid;

/// Insertion-ordered set of model handles.
#[derive(Debug, Default)]
pub struct Collection {
    members: RefCell<Vec<Model>>,
}

impl Collection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends `model` unless already present. Returns `true` when inserted.
    pub(crate) fn insert(&self, model: &Model) -> bool {
        let mut members = self.members.borrow_mut();
        if members.iter().any(|member| member == model) {
            return false;
        }
        members.push(model.clone());
        true
    }

    /// Removes `model` if present. Returns `true` when removed.
    pub(crate) fn remove(&self, model: &Model) -> bool {
        let mut members = self.members.borrow_mut();
        let before = members.len();
        members.retain(|member| member != model);
        members.len() != before
    }

    /// Earliest inserted member still present.
    pub fn first(&self) -> Option<Model> {
        self.members.borrow().first().cloned()
    }

    /// Most recently inserted member still present.
    pub fn last(&self) -> Option<Model> {
        self.members.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    pub fn contains(&self, model: &Model) -> bool {
        self.members.borrow().iter().any(|member| member == model)
    }

    /// Ordered snapshot of all members.
    pub fn all(&self) -> Vec<Model> {
        self.members.borrow().clone()
    }

    /// First member whose merged `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &Value) -> Option<Model> {
        self.all()
            .into_iter()
            .find(|member| member.id().as_ref() == Some(id))
    }

    pub fn find_by_uid(&self, uid: Uuid) -> Option<Model> {
        self.members
            .borrow()
            .iter()
            .find(|member| member.uid() == uid)
            .cloned()
    }
}
