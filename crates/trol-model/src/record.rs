//! [`Record`]: one instance of a model, and the owner of its properties.
//!
//! A root record lives under `"{model}:{id}"`. A nested record created with
//! [`Record::child`] lives under `"{parent key}:{model}:{id}"` and borrows
//! its parent's store unless given its own.

use std::fmt;
use std::sync::Arc;

use trol_codec::ModelRef;
use trol_core::{Binding, Owner, Policy, Property, SlotState, SlotTable};
use trol_store::RemoteStore;

use crate::error::ModelResult;
use crate::fields;
use crate::schema::ModelSchema;

/// An instance of a model.
pub struct Record {
    schema: Arc<ModelSchema>,
    id: String,
    key: String,
    store: Option<Arc<dyn RemoteStore>>,
    policy: Policy,
    inherited: Policy,
    slots: SlotTable,
}

impl Record {
    /// A root record of `schema` identified by `id`, not yet bound to a
    /// store.
    pub fn new(schema: Arc<ModelSchema>, id: impl Into<String>) -> Self {
        let id = id.into();
        let key = format!("{}:{id}", schema.name());
        Self::at_key(schema, id, key)
    }

    /// A record whose key prefix is already known, e.g. rebuilt from a
    /// [`ModelRef`].
    pub fn at_key(schema: Arc<ModelSchema>, id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            schema,
            id: id.into(),
            key: key.into(),
            store: None,
            policy: Policy::UNSET,
            inherited: Policy::UNSET,
            slots: SlotTable::new(),
        }
    }

    /// A record of `schema` nested under this one. It shares this record's
    /// store.
    pub fn child(&self, schema: Arc<ModelSchema>, id: impl Into<String>) -> Record {
        let id = id.into();
        let key = format!("{}:{}:{id}", self.key, schema.name());
        let mut child = Self::at_key(schema, id, key);
        child.store = self.store.clone();
        child.inherited = self.inherited;
        child
    }

    pub fn with_store(mut self, store: Arc<dyn RemoteStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Instance-level policy. Unset flags fall back to the schema's policy.
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Policy of the enclosing database, consulted after the schema's.
    pub fn with_inherited_policy(mut self, policy: Policy) -> Self {
        self.inherited = policy;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    pub fn model_name(&self) -> &str {
        self.schema.name()
    }

    /// A storable reference to this record.
    pub fn reference(&self) -> ModelRef {
        ModelRef::new(
            self.schema.name(),
            Some(self.id.clone()),
            Some(self.key.clone()),
        )
    }

    /// Slot state of every registered field, in declaration order.
    pub fn states(&self) -> Vec<(&str, SlotState)> {
        self.schema
            .fields()
            .iter()
            .map(|f| (f.name.as_str(), f.binding.state(self)))
            .collect()
    }

    /// Invalidate the named fields, or every field when `names` is empty.
    pub fn invalidate(&self, names: &[&str]) -> ModelResult<()> {
        let selected = self.schema.fields().select(names)?;
        fields::invalidate(self, &selected);
        Ok(())
    }

    /// Commit the cached values of the named fields (every field when
    /// `names` is empty) in one batch. Fields with nothing cached are
    /// skipped.
    pub fn commit(&self, names: &[&str]) -> ModelResult<bool> {
        let selected = self.schema.fields().select(names)?;
        fields::commit(self, &selected)
    }

    /// Delete the named fields (every field when `names` is empty) from the
    /// store and invalidate them locally. Returns how many keys existed.
    pub fn delete(&self, names: &[&str]) -> ModelResult<usize> {
        let selected = self.schema.fields().select(names)?;
        fields::delete(self, &selected)
    }

    /// Start a batch of writes committed together.
    pub fn update(&self) -> Update<'_> {
        Update {
            record: self,
            to_commit: Vec::new(),
        }
    }
}

impl Owner for Record {
    fn key(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn store(&self) -> Option<&dyn RemoteStore> {
        self.store.as_deref()
    }

    fn policy(&self) -> Policy {
        self.policy.or(self.schema.policy()).or(self.inherited)
    }

    fn slots(&self) -> &SlotTable {
        &self.slots
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("model", &self.schema.name())
            .field("id", &self.id)
            .field("key", &self.key)
            .field("bound", &self.store.is_some())
            .finish()
    }
}

/// A batch of staged writes on one record.
///
/// Every value is cached immediately. On [`apply`](Update::apply) the
/// values whose resolved `autocommit` is on are committed in one batch;
/// the others stay local until committed explicitly.
pub struct Update<'r> {
    record: &'r Record,
    to_commit: Vec<&'r dyn Binding>,
}

impl<'r> Update<'r> {
    pub fn set<T: Clone + Send + Sync + 'static>(mut self, property: &'r Property<T>, value: T) -> Self {
        property.stage(self.record, value);
        if property.resolve_autocommit(self.record) {
            self.to_commit.push(property);
        }
        self
    }

    /// Commit the autocommit values. Returns `true` when there was nothing
    /// to commit.
    pub fn apply(self) -> ModelResult<bool> {
        fields::commit(self.record, &self.to_commit)
    }
}
