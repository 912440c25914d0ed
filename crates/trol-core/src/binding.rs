//! Type-erased view of a property, for code that manages many properties
//! of different value types at once (model schemas, bulk operations).

use crate::error::Result;
use crate::owner::Owner;
use crate::policy::Policy;
use crate::property::Property;
use crate::slot::{PropertyId, SlotState};

/// The value-type independent operations of a [`Property`].
pub trait Binding: Send + Sync {
    fn id(&self) -> PropertyId;

    fn name(&self) -> Option<&str>;

    /// Give the binding `name` unless it already has one.
    fn assign_name(&self, name: &str) -> &str;

    fn policy(&self) -> Policy;

    fn key(&self, owner: &dyn Owner) -> Result<String>;

    /// State of the cached slot on `owner`, without materializing it.
    fn state(&self, owner: &dyn Owner) -> SlotState;

    /// Sync from the store and report the resulting slot state.
    fn fetch(&self, owner: &dyn Owner) -> Result<SlotState>;

    fn commit(&self, owner: &dyn Owner) -> Result<bool>;

    fn delete(&self, owner: &dyn Owner) -> Result<bool>;

    fn exists(&self, owner: &dyn Owner) -> Result<bool>;

    fn invalidate(&self, owner: &dyn Owner);

    /// The cached value encoded for the store, if a value is cached.
    fn encoded(&self, owner: &dyn Owner) -> Result<Option<Vec<u8>>>;
}

impl<T: Clone + Send + Sync + 'static> Binding for Property<T> {
    fn id(&self) -> PropertyId {
        Property::id(self)
    }

    fn name(&self) -> Option<&str> {
        Property::name(self)
    }

    fn assign_name(&self, name: &str) -> &str {
        Property::assign_name(self, name)
    }

    fn policy(&self) -> Policy {
        Property::policy(self)
    }

    fn key(&self, owner: &dyn Owner) -> Result<String> {
        Property::key(self, owner)
    }

    fn state(&self, owner: &dyn Owner) -> SlotState {
        owner
            .slots()
            .get::<T>(Property::id(self))
            .map(|slot| slot.state())
            .unwrap_or(SlotState::Uninitialized)
    }

    fn fetch(&self, owner: &dyn Owner) -> Result<SlotState> {
        Ok(Property::fetch(self, owner)?.state())
    }

    fn commit(&self, owner: &dyn Owner) -> Result<bool> {
        Property::commit(self, owner)
    }

    fn delete(&self, owner: &dyn Owner) -> Result<bool> {
        Property::delete(self, owner)
    }

    fn exists(&self, owner: &dyn Owner) -> Result<bool> {
        Property::exists(self, owner)
    }

    fn invalidate(&self, owner: &dyn Owner) {
        Property::invalidate(self, owner)
    }

    fn encoded(&self, owner: &dyn Owner) -> Result<Option<Vec<u8>>> {
        Property::encoded(self, owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owner::Holder;
    use std::sync::Arc;
    use trol_store::{InMemoryStore, RemoteStore};

    #[test]
    fn mixed_value_types_behind_one_trait() {
        let store = Arc::new(InMemoryStore::new());
        let holder = Holder::new(store.clone()).with_key("X:xyz");

        let one = Property::<Vec<u8>>::native().named("one");
        let two = Property::<String>::native().named("2");
        let three = Property::<i64>::native().named("three");
        one.stage(&holder, vec![0xde, 0xad]);
        three.stage(&holder, 42);

        let bindings: Vec<&dyn Binding> = vec![&one, &two, &three];
        let keys: Vec<String> = bindings.iter().map(|b| b.key(&holder).unwrap()).collect();
        assert_eq!(keys, vec!["X:xyz:one", "X:xyz:2", "X:xyz:three"]);

        for binding in &bindings {
            assert!(binding.commit(&holder).unwrap());
        }
        assert_eq!(store.get("X:xyz:three").unwrap(), Some(b"42".to_vec()));
        assert!(!store.exists("X:xyz:2").unwrap());
    }

    #[test]
    fn state_does_not_materialize_slot() {
        let holder = Holder::unbound();
        let prop = Property::<String>::native().named("p");
        let binding: &dyn Binding = &prop;
        assert_eq!(binding.state(&holder), SlotState::Uninitialized);
        assert!(holder.slots().is_empty());
    }

    #[test]
    fn erased_lifecycle() {
        let store = Arc::new(InMemoryStore::new());
        let holder = Holder::new(store.clone());
        let prop = Property::<f64>::native().named("four");
        let binding: &dyn Binding = &prop;

        store.set("four", b"3.14").unwrap();
        assert_eq!(binding.fetch(&holder).unwrap(), SlotState::Loaded);
        assert_eq!(binding.encoded(&holder).unwrap(), Some(b"3.14".to_vec()));

        binding.invalidate(&holder);
        assert_eq!(binding.state(&holder), SlotState::Uninitialized);

        assert!(binding.exists(&holder).unwrap());
        assert!(binding.delete(&holder).unwrap());
        assert_eq!(binding.state(&holder), SlotState::Empty);
    }
}
