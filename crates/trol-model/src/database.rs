//! [`Database`]: the top-level owner and model registry.
//!
//! A database holds the store handle, the registered model schemas, and
//! top-level properties. Top-level properties have no key prefix: they live
//! at their bare name.
//!
//! Records handed out by [`Database::obtain`] are cached weakly, so while
//! any handle to a record is alive every `obtain` of the same model and id
//! returns that same record, with its cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;
use trol_codec::ModelRef;
use trol_core::{Binding, Owner, Policy, SlotTable};
use trol_store::RemoteStore;

use crate::error::{ModelError, ModelResult};
use crate::fields::{self, FieldSet};
use crate::record::Record;
use crate::schema::ModelSchema;

type InstanceKey = (String, String);

/// Top-level owner: store handle, schema registry, and instance cache.
pub struct Database {
    store: Arc<dyn RemoteStore>,
    policy: Policy,
    slots: SlotTable,
    fields: FieldSet,
    schemas: HashMap<String, Arc<ModelSchema>>,
    instances: Mutex<HashMap<InstanceKey, Weak<Record>>>,
}

impl Database {
    pub fn builder(store: Arc<dyn RemoteStore>) -> DatabaseBuilder {
        DatabaseBuilder {
            store,
            policy: Policy::UNSET,
            fields: FieldSet::new("database"),
            schemas: HashMap::new(),
            error: None,
        }
    }

    pub fn store_handle(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    pub fn schema(&self, model: &str) -> ModelResult<&Arc<ModelSchema>> {
        self.schemas
            .get(model)
            .ok_or_else(|| ModelError::UnknownModel(model.to_string()))
    }

    /// Registered model names, sorted.
    pub fn models(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The top-level binding registered under `field`.
    pub fn binding(&self, field: &str) -> Option<&Arc<dyn Binding>> {
        self.fields.get(field)
    }

    /// The live record of `model` with `id`, or a new one bound to this
    /// database's store.
    pub fn obtain(&self, model: &str, id: &str) -> ModelResult<Arc<Record>> {
        let schema = self.schema(model)?.clone();
        let mut instances = self.instances.lock().expect("instance cache lock poisoned");
        let cache_key = (model.to_string(), id.to_string());
        if let Some(live) = instances.get(&cache_key).and_then(Weak::upgrade) {
            return Ok(live);
        }

        instances.retain(|_, weak| weak.strong_count() > 0);
        let record = Arc::new(
            Record::new(schema, id)
                .with_store(self.store.clone())
                .with_inherited_policy(self.policy),
        );
        instances.insert(cache_key, Arc::downgrade(&record));
        debug!(model, id, "record created");
        Ok(record)
    }

    /// Rebuild a record from a reference.
    ///
    /// References to root records go through [`obtain`](Self::obtain).
    /// References to nested records produce a fresh record at the stored
    /// key.
    pub fn resolve(&self, reference: &ModelRef) -> ModelResult<Arc<Record>> {
        let id = reference.id.as_deref().ok_or_else(|| {
            ModelError::UnresolvableRef(format!("{} reference has no id", reference.model))
        })?;
        let root_key = format!("{}:{id}", reference.model);
        match reference.key.as_deref() {
            None => self.obtain(&reference.model, id),
            Some(key) if key == root_key => self.obtain(&reference.model, id),
            Some(key) => {
                let schema = self.schema(&reference.model)?.clone();
                Ok(Arc::new(
                    Record::at_key(schema, id, key)
                        .with_store(self.store.clone())
                        .with_inherited_policy(self.policy),
                ))
            }
        }
    }

    /// Number of records currently alive in the instance cache.
    pub fn live_records(&self) -> usize {
        self.instances
            .lock()
            .expect("instance cache lock poisoned")
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Invalidate the named top-level fields, or all of them.
    pub fn invalidate(&self, names: &[&str]) -> ModelResult<()> {
        let selected = self.fields.select(names)?;
        fields::invalidate(self, &selected);
        Ok(())
    }

    /// Commit the named top-level fields, or all of them, in one batch.
    pub fn commit(&self, names: &[&str]) -> ModelResult<bool> {
        let selected = self.fields.select(names)?;
        fields::commit(self, &selected)
    }

    /// Delete the named top-level fields, or all of them.
    pub fn delete(&self, names: &[&str]) -> ModelResult<usize> {
        let selected = self.fields.select(names)?;
        fields::delete(self, &selected)
    }
}

impl Owner for Database {
    fn key(&self) -> Option<&str> {
        None
    }

    fn store(&self) -> Option<&dyn RemoteStore> {
        Some(self.store.as_ref())
    }

    fn policy(&self) -> Policy {
        self.policy
    }

    fn slots(&self) -> &SlotTable {
        &self.slots
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("models", &self.models())
            .field("fields", &self.fields.len())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Builder for [`Database`].
pub struct DatabaseBuilder {
    store: Arc<dyn RemoteStore>,
    policy: Policy,
    fields: FieldSet,
    schemas: HashMap<String, Arc<ModelSchema>>,
    error: Option<ModelError>,
}

impl DatabaseBuilder {
    /// Register a model schema.
    pub fn model(mut self, schema: Arc<ModelSchema>) -> Self {
        if self.error.is_none() && self.schemas.contains_key(schema.name()) {
            self.error = Some(ModelError::DuplicateModel(schema.name().to_string()));
        }
        self.schemas.insert(schema.name().to_string(), schema);
        self
    }

    /// Register a top-level property under `field`.
    pub fn property<B: Binding + 'static>(mut self, field: &str, binding: Arc<B>) -> Self {
        if let Err(e) = self.fields.register(field, binding) {
            if self.error.is_none() {
                self.error = Some(e);
            }
        }
        self
    }

    /// Policy for top-level properties. Records this database creates fall
    /// back to it after their own and their schema's policy.
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> ModelResult<Database> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(Database {
            store: self.store,
            policy: self.policy,
            slots: SlotTable::new(),
            fields: self.fields,
            schemas: self.schemas,
            instances: Mutex::new(HashMap::new()),
        })
    }
}
