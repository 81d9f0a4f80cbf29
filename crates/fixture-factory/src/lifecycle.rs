//! Pending/saved membership tracking for created instances.

use indexmap::IndexMap;

use crate::model::{Instance, InstanceId};

/// Identity-keyed set of instances that remembers insertion order.
#[derive(Debug, Default)]
pub struct LifecycleSet {
    members: IndexMap<InstanceId, Instance>,
}

impl LifecycleSet {
    /// Adds `instance`. An instance already present keeps its original position.
    pub fn add(&mut self, instance: &Instance) {
        self.members
            .entry(instance.id())
            .or_insert_with(|| instance.clone());
    }

    /// Removes `instance`, returning whether it was present. Remaining order is kept.
    pub fn remove(&mut self, instance: &Instance) -> bool {
        self.members.shift_remove(&instance.id()).is_some()
    }

    pub fn contains(&self, instance: &Instance) -> bool {
        self.members.contains_key(&instance.id())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in insertion order.
    pub fn snapshot(&self) -> Vec<Instance> {
        self.members.values().cloned().collect()
    }
}

/// The two lifecycle sets a factory maintains.
///
/// An instance is never a member of both sets.
#[derive(Debug, Default)]
pub struct Tracker {
    pending: LifecycleSet,
    saved: LifecycleSet,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an instance as awaiting its first successful save.
    pub fn mark_pending(&mut self, instance: &Instance) {
        if !self.saved.contains(instance) {
            self.pending.add(instance);
        }
    }

    /// Moves an instance from pending to saved.
    pub fn mark_saved(&mut self, instance: &Instance) {
        self.pending.remove(instance);
        self.saved.add(instance);
    }

    /// Forgets an instance entirely.
    pub fn evict(&mut self, instance: &Instance) {
        self.pending.remove(instance);
        self.saved.remove(instance);
    }

    pub fn is_pending(&self, instance: &Instance) -> bool {
        self.pending.contains(instance)
    }

    pub fn is_saved(&self, instance: &Instance) -> bool {
        self.saved.contains(instance)
    }

    pub fn is_pending_or_saved(&self, instance: &Instance) -> bool {
        self.is_pending(instance) || self.is_saved(instance)
    }

    pub fn pending(&self) -> &LifecycleSet {
        &self.pending
    }

    pub fn saved(&self) -> &LifecycleSet {
        &self.saved
    }
}
