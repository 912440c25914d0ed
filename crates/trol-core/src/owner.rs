//! The owner side of a property: identity, store handle, policy, cache.

use std::sync::Arc;

use trol_store::RemoteStore;

use crate::policy::Policy;
use crate::slot::SlotTable;

/// An object that properties are attached to.
///
/// The owner supplies the key prefix its properties are stored under, the
/// store they talk to, policy fallbacks, and the table holding their cached
/// values.
pub trait Owner {
    /// Key prefix for this owner's properties. `None` stores them at the
    /// bare property name.
    fn key(&self) -> Option<&str>;

    /// Store handle, if this owner is bound to one.
    fn store(&self) -> Option<&dyn RemoteStore>;

    /// Owner-level policy consulted when a property leaves a flag unset.
    fn policy(&self) -> Policy {
        Policy::UNSET
    }

    /// Cached property values for this owner.
    fn slots(&self) -> &SlotTable;
}

/// A plain owner: a key prefix, a store, and a policy.
///
/// Useful on its own for ad-hoc objects, and as the building block of
/// richer owners.
#[derive(Default)]
pub struct Holder {
    key: Option<String>,
    store: Option<Arc<dyn RemoteStore>>,
    policy: Policy,
    slots: SlotTable,
}

impl Holder {
    /// A holder bound to `store` with no key prefix.
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::default()
        }
    }

    /// A holder with no store. Every remote operation fails with `Unbound`.
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Change the key prefix. Cached values are kept as they are.
    pub fn set_key(&mut self, key: Option<String>) {
        self.key = key;
    }

    pub fn set_store(&mut self, store: Option<Arc<dyn RemoteStore>>) {
        self.store = store;
    }
}

impl std::fmt::Debug for Holder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Holder")
            .field("key", &self.key)
            .field("bound", &self.store.is_some())
            .field("policy", &self.policy)
            .field("slots", &self.slots)
            .finish()
    }
}

impl Owner for Holder {
    fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn store(&self) -> Option<&dyn RemoteStore> {
        self.store.as_deref()
    }

    fn policy(&self) -> Policy {
        self.policy
    }

    fn slots(&self) -> &SlotTable {
        &self.slots
    }
}
