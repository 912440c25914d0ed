//! Per-owner cache slots.
//!
//! Every owner carries a [`SlotTable`]: a side table from [`PropertyId`] to
//! the cached [`Slot`] of that property. The property itself holds no
//! per-instance state.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Cached state of one property on one owner.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot<T> {
    /// Nothing cached yet, or invalidated. The next read must fetch.
    Uninitialized,
    /// Known to be absent remotely after a successful delete.
    Empty,
    /// A value fetched from or assigned to the owner.
    Loaded(T),
}

/// The state of a [`Slot`] without its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    Uninitialized,
    Empty,
    Loaded,
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Empty => write!(f, "empty"),
            Self::Loaded => write!(f, "loaded"),
        }
    }
}

impl<T> Slot<T> {
    pub fn state(&self) -> SlotState {
        match self {
            Self::Uninitialized => SlotState::Uninitialized,
            Self::Empty => SlotState::Empty,
            Self::Loaded(_) => SlotState::Loaded,
        }
    }

    pub fn is_uninitialized(&self) -> bool {
        matches!(self, Self::Uninitialized)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_loaded(self) -> Option<T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

static NEXT_PROPERTY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a property, allocated at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(u64);

impl PropertyId {
    pub(crate) fn next() -> Self {
        Self(NEXT_PROPERTY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prop#{}", self.0)
    }
}

type ErasedSlot = Box<dyn Any + Send + Sync>;

/// Side table of cached slots, embedded in each owner.
#[derive(Default)]
pub struct SlotTable {
    slots: RwLock<HashMap<PropertyId, ErasedSlot>>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot for `id`, if one was ever materialized.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, id: PropertyId) -> Option<Slot<T>> {
        let slots = self.slots.read().expect("slot table lock poisoned");
        slots
            .get(&id)
            .and_then(|slot| slot.downcast_ref::<Slot<T>>())
            .cloned()
    }

    /// The slot for `id`, materializing [`Slot::Uninitialized`] on first use.
    pub fn get_or_init<T: Clone + Send + Sync + 'static>(&self, id: PropertyId) -> Slot<T> {
        let mut slots = self.slots.write().expect("slot table lock poisoned");
        slots
            .entry(id)
            .or_insert_with(|| Box::new(Slot::<T>::Uninitialized) as ErasedSlot)
            .downcast_ref::<Slot<T>>()
            .cloned()
            .unwrap_or(Slot::Uninitialized)
    }

    pub fn put<T: Send + Sync + 'static>(&self, id: PropertyId, slot: Slot<T>) {
        let mut slots = self.slots.write().expect("slot table lock poisoned");
        slots.insert(id, Box::new(slot));
    }

    /// Whether a slot was ever materialized for `id`.
    pub fn contains(&self, id: PropertyId) -> bool {
        self.slots
            .read()
            .expect("slot table lock poisoned")
            .contains_key(&id)
    }

    /// Number of materialized slots.
    pub fn len(&self) -> usize {
        self.slots.read().expect("slot table lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every slot. Each property goes back to its first-touch state.
    pub fn clear(&self) {
        self.slots.write().expect("slot table lock poisoned").clear();
    }
}

impl fmt::Debug for SlotTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotTable")
            .field("slot_count", &self.len())
            .finish()
    }
}
