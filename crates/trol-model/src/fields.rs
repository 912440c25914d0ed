//! Ordered, named bindings and the bulk operations run over them.
//!
//! Bulk operations accept a list of field names; an empty list means every
//! registered field.

use std::sync::Arc;

use tracing::debug;
use trol_core::{Binding, Owner, PropertyError};

use crate::error::{ModelError, ModelResult};

/// One registered property: the field name it is declared under, and the
/// binding itself. The field name and the key segment may differ.
#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub binding: Arc<dyn Binding>,
}

/// The registered properties of a model or database, in declaration order.
#[derive(Clone, Default)]
pub struct FieldSet {
    owner_name: String,
    fields: Vec<Field>,
}

impl FieldSet {
    pub fn new(owner_name: impl Into<String>) -> Self {
        Self {
            owner_name: owner_name.into(),
            fields: Vec::new(),
        }
    }

    /// Register `binding` under `field`, naming the binding after the field
    /// if it has no name yet.
    pub fn register(&mut self, field: &str, binding: Arc<dyn Binding>) -> ModelResult<()> {
        if self.get(field).is_some() {
            return Err(ModelError::DuplicateProperty {
                model: self.owner_name.clone(),
                field: field.to_string(),
            });
        }
        binding.assign_name(field);
        self.fields.push(Field {
            name: field.to_string(),
            binding,
        });
        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<&Arc<dyn Binding>> {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| &f.binding)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolve field names to bindings. Empty `names` selects every field.
    pub fn select(&self, names: &[&str]) -> ModelResult<Vec<&dyn Binding>> {
        if names.is_empty() {
            return Ok(self.fields.iter().map(|f| &*f.binding).collect());
        }
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .map(|b| &**b)
                    .ok_or_else(|| ModelError::UnknownProperty {
                        model: self.owner_name.clone(),
                        field: name.to_string(),
                    })
            })
            .collect()
    }
}

fn store_of<'o>(owner: &'o dyn Owner) -> ModelResult<&'o dyn trol_store::RemoteStore> {
    owner.store().ok_or_else(|| {
        ModelError::Property(PropertyError::Unbound {
            key: owner.key().unwrap_or_default().to_string(),
        })
    })
}

/// Reset the selected slots so the next read fetches.
pub fn invalidate(owner: &dyn Owner, bindings: &[&dyn Binding]) {
    for binding in bindings {
        binding.invalidate(owner);
    }
}

/// Commit every selected binding that has a cached value, in one
/// `set_many` call. Returns `true` when there was nothing to write.
pub fn commit(owner: &dyn Owner, bindings: &[&dyn Binding]) -> ModelResult<bool> {
    let mut entries = Vec::new();
    for binding in bindings {
        if let Some(bytes) = binding.encoded(owner)? {
            entries.push((binding.key(owner)?, bytes));
        }
    }
    if entries.is_empty() {
        return Ok(true);
    }
    let ok = store_of(owner)?.set_many(&entries)?;
    debug!(
        owner = owner.key().unwrap_or_default(),
        count = entries.len(),
        ok,
        "bulk commit"
    );
    Ok(ok)
}

/// Delete the selected keys in one `delete_many` call, then reset their
/// slots so the next read fetches. Returns how many keys existed.
pub fn delete(owner: &dyn Owner, bindings: &[&dyn Binding]) -> ModelResult<usize> {
    let keys = bindings
        .iter()
        .map(|b| b.key(owner))
        .collect::<Result<Vec<_>, _>>()?;
    let removed = store_of(owner)?.delete_many(&keys)?;
    invalidate(owner, bindings);
    debug!(
        owner = owner.key().unwrap_or_default(),
        requested = keys.len(),
        removed,
        "bulk delete"
    );
    Ok(removed)
}
