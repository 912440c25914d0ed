//! [`Property`]: a typed attribute mirrored to one remote key.
//!
//! A property is shared configuration. It is declared once per owner type
//! and used with many owners, each keeping its own cached [`Slot`] in its
//! [`SlotTable`](crate::slot::SlotTable).
//!
//! Reads are served from the cache unless the slot is uninitialized or the
//! resolved `alwaysfetch` policy asks for a fresh value. Writes always land
//! in the cache and are committed when the resolved `autocommit` policy is
//! on.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use trol_codec::{BincodeCodec, Codec, Native};
use trol_store::RemoteStore;

use crate::error::{PropertyError, Result};
use crate::owner::Owner;
use crate::policy::Policy;
use crate::slot::{PropertyId, Slot};

/// A typed attribute whose value lives under `"{owner key}:{name}"`.
pub struct Property<T> {
    id: PropertyId,
    name: OnceLock<String>,
    policy: Policy,
    codec: Arc<dyn Codec<T>>,
}

impl<T> Property<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// An unnamed property using the generic default codec.
    pub fn new() -> Self {
        Self::with_codec(BincodeCodec::new())
    }
}

impl<T> Default for Property<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Native + Clone> Property<T> {
    /// An unnamed property using the built-in codec of a native type.
    pub fn native() -> Self {
        Self::with_codec(T::Codec::default())
    }
}

impl<T: Clone + Send + Sync + 'static> Property<T> {
    /// An unnamed property using `codec`.
    pub fn with_codec(codec: impl Codec<T> + 'static) -> Self {
        Self::with_shared_codec(Arc::new(codec))
    }

    /// An unnamed property sharing a codec with other properties.
    pub fn with_shared_codec(codec: Arc<dyn Codec<T>>) -> Self {
        Self {
            id: PropertyId::next(),
            name: OnceLock::new(),
            policy: Policy::UNSET,
            codec,
        }
    }

    /// Set the name used as the last key segment.
    pub fn named(self, name: impl Into<String>) -> Self {
        Self {
            name: OnceLock::from(name.into()),
            ..self
        }
    }

    /// Pin `autocommit` for this property regardless of the owner.
    pub fn autocommit(mut self, autocommit: bool) -> Self {
        self.policy.autocommit = Some(autocommit);
        self
    }

    /// Pin `alwaysfetch` for this property regardless of the owner.
    pub fn alwaysfetch(mut self, alwaysfetch: bool) -> Self {
        self.policy.alwaysfetch = Some(alwaysfetch);
        self
    }

    pub fn id(&self) -> PropertyId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// Give the property `name` unless it already has one. Returns the name
    /// in effect afterwards.
    pub fn assign_name(&self, name: &str) -> &str {
        self.name.get_or_init(|| name.to_string())
    }

    /// The property-level policy; unset flags defer to the owner.
    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn codec(&self) -> &dyn Codec<T> {
        self.codec.as_ref()
    }

    /// Whether a write through `owner` commits immediately.
    pub fn resolve_autocommit<O: Owner + ?Sized>(&self, owner: &O) -> bool {
        self.policy.resolve_autocommit(&owner.policy())
    }

    /// Whether a read through `owner` always goes to the store.
    pub fn resolve_alwaysfetch<O: Owner + ?Sized>(&self, owner: &O) -> bool {
        self.policy.resolve_alwaysfetch(&owner.policy())
    }

    /// The remote key of this property on `owner`.
    ///
    /// `"{owner key}:{name}"` when the owner has a key, the bare name
    /// otherwise.
    pub fn key<O: Owner + ?Sized>(&self, owner: &O) -> Result<String> {
        let name = self
            .name()
            .filter(|name| !name.is_empty())
            .ok_or(PropertyError::Unnamed)?;
        Ok(match owner.key() {
            Some(prefix) => format!("{prefix}:{name}"),
            None => name.to_string(),
        })
    }

    /// The cached slot on `owner`, materialized as uninitialized on first
    /// touch. Never talks to the store.
    pub fn value<O: Owner + ?Sized>(&self, owner: &O) -> Slot<T> {
        owner.slots().get_or_init(self.id)
    }

    /// Replace the cached value without committing it.
    pub fn stage<O: Owner + ?Sized>(&self, owner: &O, value: T) {
        owner.slots().put(self.id, Slot::Loaded(value));
    }

    /// Read the value, fetching first when the cache is uninitialized or
    /// `alwaysfetch` resolves true.
    ///
    /// Fails with [`PropertyError::KeyNotFound`] when there is no value
    /// either locally or remotely.
    pub fn read<O: Owner + ?Sized>(&self, owner: &O) -> Result<T> {
        let mut slot = self.value(owner);
        if slot.is_uninitialized() || self.resolve_alwaysfetch(owner) {
            slot = self.fetch(owner)?;
        }
        match slot {
            Slot::Loaded(value) => Ok(value),
            Slot::Uninitialized | Slot::Empty => Err(PropertyError::KeyNotFound {
                key: self.key(owner)?,
            }),
        }
    }

    /// Cache `value`, then commit it when `autocommit` resolves true.
    pub fn write<O: Owner + ?Sized>(&self, owner: &O, value: T) -> Result<()> {
        self.stage(owner, value);
        if self.resolve_autocommit(owner) {
            self.commit(owner)?;
        }
        Ok(())
    }

    /// Replace the cached value with whatever the store holds.
    ///
    /// An absent key leaves the slot uninitialized. Returns the new slot.
    pub fn fetch<O: Owner + ?Sized>(&self, owner: &O) -> Result<Slot<T>> {
        let key = self.key(owner)?;
        let store = bound_store(owner, &key)?;
        let slot = match store.get(&key)? {
            Some(bytes) => Slot::Loaded(self.codec.decode(&bytes)?),
            None => Slot::Uninitialized,
        };
        debug!(key = %key, state = %slot.state(), "fetch");
        owner.slots().put(self.id, slot.clone());
        Ok(slot)
    }

    /// Write the cached value to the store.
    ///
    /// Nothing is sent when no value is cached; that counts as success.
    /// Otherwise returns the store's success indication.
    pub fn commit<O: Owner + ?Sized>(&self, owner: &O) -> Result<bool> {
        let slot = self.value(owner);
        let Some(value) = slot.loaded() else {
            return Ok(true);
        };
        let key = self.key(owner)?;
        let store = bound_store(owner, &key)?;
        let bytes = self.codec.encode(value)?;
        let ok = store.set(&key, &bytes)?;
        if ok {
            debug!(key = %key, len = bytes.len(), "commit");
        } else {
            warn!(key = %key, "store refused commit");
        }
        Ok(ok)
    }

    /// Delete the remote key.
    ///
    /// On success the slot becomes [`Slot::Empty`]. When the store reports
    /// nothing was deleted the cache is left untouched.
    pub fn delete<O: Owner + ?Sized>(&self, owner: &O) -> Result<bool> {
        let key = self.key(owner)?;
        let store = bound_store(owner, &key)?;
        let ok = store.delete(&key)?;
        if ok {
            owner.slots().put(self.id, Slot::<T>::Empty);
        }
        debug!(key = %key, deleted = ok, "delete");
        Ok(ok)
    }

    /// Whether the store holds a value for this property. The cache is not
    /// consulted or changed.
    pub fn exists<O: Owner + ?Sized>(&self, owner: &O) -> Result<bool> {
        let key = self.key(owner)?;
        Ok(bound_store(owner, &key)?.exists(&key)?)
    }

    /// Force the next read to fetch. The store is not touched.
    pub fn invalidate<O: Owner + ?Sized>(&self, owner: &O) {
        owner.slots().put(self.id, Slot::<T>::Uninitialized);
    }

    /// The cached value encoded for the store, if a value is cached.
    pub fn encoded<O: Owner + ?Sized>(&self, owner: &O) -> Result<Option<Vec<u8>>> {
        match self.value(owner) {
            Slot::Loaded(value) => Ok(Some(self.codec.encode(&value)?)),
            Slot::Uninitialized | Slot::Empty => Ok(None),
        }
    }
}

fn bound_store<'o, O: Owner + ?Sized>(owner: &'o O, key: &str) -> Result<&'o dyn RemoteStore> {
    owner.store().ok_or_else(|| PropertyError::Unbound {
        key: key.to_string(),
    })
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("name", &self.name.get())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owner::Holder;
    use crate::slot::SlotState;
    use trol_codec::{CodecError, StrCodec};
    use trol_store::{InMemoryStore, StoreError, StoreResult};

    fn setup() -> (Arc<InMemoryStore>, Holder) {
        let store = Arc::new(InMemoryStore::new());
        let holder = Holder::new(store.clone()).with_key("xkey");
        (store, holder)
    }

    fn text(name: &str) -> Property<String> {
        Property::native().named(name)
    }

    /// A store whose every call fails, standing in for a lost connection.
    struct DownStore;

    impl RemoteStore for DownStore {
        fn get(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn set(&self, _key: &str, _value: &[u8]) -> StoreResult<bool> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn delete(&self, _key: &str) -> StoreResult<bool> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn exists(&self, _key: &str) -> StoreResult<bool> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    // -----------------------------------------------------------------------
    // Keys and names
    // -----------------------------------------------------------------------

    #[test]
    fn key_composes_owner_key_and_name() {
        let store = Arc::new(InMemoryStore::new());
        let score = Property::<i64>::native().named("score");

        let owner = Holder::new(store.clone()).with_key("user:42");
        assert_eq!(score.key(&owner).unwrap(), "user:42:score");

        let bare = Holder::new(store);
        assert_eq!(score.key(&bare).unwrap(), "score");
    }

    #[test]
    fn key_follows_owner_key_changes() {
        let (_store, mut holder) = setup();
        let prop = text("prop");
        holder.set_key(None);
        assert_eq!(prop.key(&holder).unwrap(), "prop");
        assert_eq!(prop.key(&holder).unwrap(), "prop");
        holder.set_key(Some("xkey".into()));
        assert_eq!(prop.key(&holder).unwrap(), "xkey:prop");
    }

    #[test]
    fn unnamed_property_has_no_key() {
        let (_store, holder) = setup();
        let prop = Property::<String>::native();
        assert!(matches!(prop.key(&holder), Err(PropertyError::Unnamed)));
        assert!(matches!(prop.fetch(&holder), Err(PropertyError::Unnamed)));
    }

    #[test]
    fn empty_name_counts_as_unnamed() {
        let (_store, holder) = setup();
        let prop = text("");
        assert!(matches!(prop.key(&holder), Err(PropertyError::Unnamed)));
    }

    #[test]
    fn assign_name_only_fills_missing_name() {
        let unnamed = Property::<String>::native();
        assert_eq!(unnamed.assign_name("alpha"), "alpha");
        assert_eq!(unnamed.assign_name("beta"), "alpha");

        let named = text("abc");
        assert_eq!(named.assign_name("alpha"), "abc");
    }

    // -----------------------------------------------------------------------
    // Local cache
    // -----------------------------------------------------------------------

    #[test]
    fn value_starts_uninitialized_without_io() {
        let (store, holder) = setup();
        let prop = text("prop");
        assert_eq!(prop.value(&holder), Slot::Uninitialized);
        assert_eq!(store.stats().gets, 0);
    }

    #[test]
    fn stage_sets_cache_only() {
        let (store, holder) = setup();
        let prop = text("prop");
        prop.stage(&holder, "canary".into());
        assert_eq!(prop.value(&holder), Slot::Loaded("canary".to_string()));
        assert!(store.is_empty());
    }

    #[test]
    fn owners_keep_separate_caches() {
        let store = Arc::new(InMemoryStore::new());
        let a = Holder::new(store.clone()).with_key("a");
        let b = Holder::new(store).with_key("b");
        let prop = text("prop");
        prop.stage(&a, "fred".into());
        assert_eq!(prop.value(&b), Slot::Uninitialized);
    }

    // -----------------------------------------------------------------------
    // Fetch
    // -----------------------------------------------------------------------

    #[test]
    fn fetch_loads_remote_value() {
        let (store, holder) = setup();
        store.set("xkey:p", b"canary").unwrap();
        let prop = text("p");
        assert_eq!(prop.fetch(&holder).unwrap(), Slot::Loaded("canary".to_string()));
        assert_eq!(prop.value(&holder), Slot::Loaded("canary".to_string()));
    }

    #[test]
    fn fetch_of_absent_key_overwrites_cache() {
        let (_store, holder) = setup();
        let prop = text("p");
        prop.stage(&holder, "local".into());
        assert_eq!(prop.fetch(&holder).unwrap(), Slot::Uninitialized);
        assert_eq!(prop.value(&holder), Slot::Uninitialized);
    }

    #[test]
    fn fetch_decode_error_passes_through() {
        let (store, holder) = setup();
        store.set("xkey:n", b"not a number").unwrap();
        let prop = Property::<i64>::native().named("n");
        let err = prop.fetch(&holder).unwrap_err();
        assert!(matches!(err, PropertyError::Codec(CodecError::ParseInt(_))));
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    #[test]
    fn read_missing_key_is_key_not_found() {
        let (_store, holder) = setup();
        let prop = text("p");
        match prop.read(&holder) {
            Err(PropertyError::KeyNotFound { key }) => assert_eq!(key, "xkey:p"),
            other => panic!("expected KeyNotFound, got {other:?}"),
        }
    }

    #[test]
    fn read_without_alwaysfetch_serves_cache() {
        let (store, holder) = setup();
        let prop = text("p").alwaysfetch(false);
        store.set("xkey:p", b"canary").unwrap();
        assert_eq!(prop.read(&holder).unwrap(), "canary");

        store.set("xkey:p", b"swallow").unwrap();
        assert_eq!(prop.read(&holder).unwrap(), "canary");
        assert_eq!(store.stats().gets, 1);

        prop.invalidate(&holder);
        assert_eq!(prop.read(&holder).unwrap(), "swallow");
        assert_eq!(store.stats().gets, 2);
    }

    #[test]
    fn alwaysfetch_reads_every_time() {
        let (store, holder) = setup();
        let prop = text("p").alwaysfetch(true);
        store.set("xkey:p", b"canary").unwrap();

        assert_eq!(prop.read(&holder).unwrap(), "canary");
        assert_eq!(prop.read(&holder).unwrap(), "canary");
        assert_eq!(store.stats().gets, 2);

        store.set("xkey:p", b"swallow").unwrap();
        assert_eq!(prop.read(&holder).unwrap(), "swallow");
    }

    #[test]
    fn alwaysfetch_follows_owner_policy() {
        let store = Arc::new(InMemoryStore::new());
        let holder = Holder::new(store.clone())
            .with_policy(Policy::UNSET.with_alwaysfetch(true));
        let prop = text("p");
        store.set("p", b"one").unwrap();
        prop.read(&holder).unwrap();
        prop.read(&holder).unwrap();
        assert_eq!(store.stats().gets, 2);
    }

    #[test]
    fn alwaysfetch_sees_remote_delete() {
        let (store, holder) = setup();
        let prop = text("p").alwaysfetch(true);
        store.set("xkey:p", b"canary").unwrap();
        prop.read(&holder).unwrap();
        store.delete("xkey:p").unwrap();
        assert!(prop.read(&holder).unwrap_err().is_not_found());
    }

    // -----------------------------------------------------------------------
    // Write access and commit
    // -----------------------------------------------------------------------

    #[test]
    fn write_with_autocommit_reaches_store() {
        let (store, holder) = setup();
        let prop = text("p").autocommit(true);
        store.set("xkey:p", b"canary").unwrap();
        prop.write(&holder, "something".into()).unwrap();
        assert_eq!(store.get("xkey:p").unwrap(), Some(b"something".to_vec()));

        // A fresh property and owner over the same key observe the value.
        let other = text("p");
        let other_holder = Holder::new(store.clone()).with_key("xkey");
        assert_eq!(other.read(&other_holder).unwrap(), "something");
    }

    #[test]
    fn write_without_autocommit_stays_local() {
        let (store, holder) = setup();
        let prop = text("p").autocommit(false);
        store.set("xkey:p", b"canary").unwrap();

        prop.write(&holder, "something".into()).unwrap();
        assert_eq!(store.get("xkey:p").unwrap(), Some(b"canary".to_vec()));
        assert_eq!(prop.read(&holder).unwrap(), "something");

        let observer = text("p");
        let observer_holder = Holder::new(store.clone()).with_key("xkey");
        assert_eq!(observer.read(&observer_holder).unwrap(), "canary");

        assert!(prop.commit(&holder).unwrap());
        assert_eq!(store.get("xkey:p").unwrap(), Some(b"something".to_vec()));
        assert_eq!(
            observer.fetch(&observer_holder).unwrap(),
            Slot::Loaded("something".to_string())
        );
    }

    #[test]
    fn property_autocommit_overrides_owner() {
        let store = Arc::new(InMemoryStore::new());
        let holder = Holder::new(store.clone()).with_policy(Policy::UNSET.with_autocommit(true));
        let prop = text("p").autocommit(false);
        prop.write(&holder, "v".into()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn owner_autocommit_applies_when_property_unset() {
        let store = Arc::new(InMemoryStore::new());
        let holder = Holder::new(store.clone()).with_policy(Policy::UNSET.with_autocommit(false));
        text("p").write(&holder, "v".into()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn autocommit_defaults_to_true() {
        let (store, holder) = setup();
        text("p").write(&holder, "v".into()).unwrap();
        assert_eq!(store.get("xkey:p").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn commit_nothing_is_noop_success() {
        let (store, holder) = setup();
        let prop = text("p");
        store.set("xkey:p", b"canary").unwrap();
        let sets_before = store.stats().sets;

        assert!(prop.commit(&holder).unwrap());
        assert_eq!(store.stats().sets, sets_before);
        assert_eq!(store.get("xkey:p").unwrap(), Some(b"canary".to_vec()));
    }

    #[test]
    fn commit_something_overwrites() {
        let (store, holder) = setup();
        let prop = text("p");
        prop.stage(&holder, "something".into());
        store.set("xkey:p", b"canary").unwrap();
        assert!(prop.commit(&holder).unwrap());
        assert_eq!(store.get("xkey:p").unwrap(), Some(b"something".to_vec()));
    }

    #[test]
    fn default_codec_roundtrips_structured_values() {
        let (_store, holder) = setup();
        let scores = Property::<Vec<(String, u32)>>::new().named("scores");
        let value = vec![("alex".to_string(), 3), ("sam".to_string(), 7)];
        scores.write(&holder, value.clone()).unwrap();

        let reader = Property::<Vec<(String, u32)>>::new().named("scores");
        assert_eq!(reader.read(&holder).unwrap(), value);
    }

    #[test]
    fn injected_codec_controls_bytes() {
        let (store, holder) = setup();
        let prop = Property::with_codec(StrCodec).named("s");
        prop.write(&holder, "plain".to_string()).unwrap();
        assert_eq!(store.get("xkey:s").unwrap(), Some(b"plain".to_vec()));
    }

    // -----------------------------------------------------------------------
    // Delete / exists / invalidate
    // -----------------------------------------------------------------------

    #[test]
    fn delete_existing_key_empties_cache() {
        let (store, holder) = setup();
        let prop = text("p");
        prop.write(&holder, "v".into()).unwrap();

        assert!(prop.delete(&holder).unwrap());
        assert!(!store.exists("xkey:p").unwrap());
        assert_eq!(prop.value(&holder).state(), SlotState::Empty);
        assert!(prop.read(&holder).unwrap_err().is_not_found());
    }

    #[test]
    fn read_after_delete_does_not_fetch() {
        let (store, holder) = setup();
        let prop = text("p");
        prop.write(&holder, "v".into()).unwrap();
        prop.delete(&holder).unwrap();
        let gets = store.stats().gets;
        let _ = prop.read(&holder);
        assert_eq!(store.stats().gets, gets);
    }

    #[test]
    fn failed_delete_keeps_cache() {
        let (_store, holder) = setup();
        let prop = text("p").autocommit(false);
        prop.write(&holder, "local".into()).unwrap();

        assert!(!prop.delete(&holder).unwrap());
        assert_eq!(prop.value(&holder), Slot::Loaded("local".to_string()));
    }

    #[test]
    fn exists_does_not_touch_cache() {
        let (store, holder) = setup();
        let prop = text("p");
        assert!(!prop.exists(&holder).unwrap());
        store.set("xkey:p", b"v").unwrap();
        assert!(prop.exists(&holder).unwrap());
        assert!(!holder.slots().contains(prop.id()));
    }

    #[test]
    fn invalidate_forces_refetch() {
        let (store, holder) = setup();
        let prop = text("p");
        prop.stage(&holder, "stale".into());
        store.set("xkey:p", b"fresh").unwrap();
        prop.invalidate(&holder);
        assert_eq!(prop.value(&holder), Slot::Uninitialized);
        assert_eq!(prop.read(&holder).unwrap(), "fresh");
    }

    #[test]
    fn encoded_reflects_cache() {
        let (_store, holder) = setup();
        let prop = Property::<i64>::native().named("n");
        assert_eq!(prop.encoded(&holder).unwrap(), None);
        prop.stage(&holder, 42);
        assert_eq!(prop.encoded(&holder).unwrap(), Some(b"42".to_vec()));
    }

    // -----------------------------------------------------------------------
    // Error propagation
    // -----------------------------------------------------------------------

    #[test]
    fn unbound_owner_reports_key() {
        let holder = Holder::unbound().with_key("lonely");
        let prop = text("p");
        match prop.fetch(&holder) {
            Err(PropertyError::Unbound { key }) => assert_eq!(key, "lonely:p"),
            other => panic!("expected Unbound, got {other:?}"),
        }
    }

    #[test]
    fn store_errors_pass_through() {
        let holder = Holder::new(Arc::new(DownStore));
        let prop = text("p");
        assert!(matches!(
            prop.read(&holder),
            Err(PropertyError::Store(StoreError::Unavailable(_)))
        ));
        assert!(matches!(
            prop.write(&holder, "v".into()),
            Err(PropertyError::Store(StoreError::Unavailable(_)))
        ));
        assert!(matches!(prop.delete(&holder), Err(PropertyError::Store(_))));
        assert!(matches!(prop.exists(&holder), Err(PropertyError::Store(_))));
        // The write still landed locally before the commit failed.
        assert_eq!(prop.value(&holder), Slot::Loaded("v".to_string()));
    }
}
