//! Model schemas: a model name plus its registered properties.
//!
//! A schema is built once per model type and shared by every record of
//! that model.

use std::fmt;
use std::sync::Arc;

use trol_core::{Binding, Policy};

use crate::error::ModelResult;
use crate::fields::FieldSet;

/// The registered shape of a model.
pub struct ModelSchema {
    name: String,
    policy: Policy,
    fields: FieldSet,
}

impl ModelSchema {
    /// Start building a schema for the model `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        let name = name.into();
        SchemaBuilder {
            fields: FieldSet::new(name.clone()),
            name,
            policy: Policy::UNSET,
            pending: Vec::new(),
        }
    }

    /// The model name, used as a key segment of every record.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model-level policy, consulted after the record's own policy.
    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// The binding registered under `field`.
    pub fn binding(&self, field: &str) -> Option<&Arc<dyn Binding>> {
        self.fields.get(field)
    }
}

impl fmt::Debug for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
        f.debug_struct("ModelSchema")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("fields", &names)
            .finish()
    }
}

/// Builder for [`ModelSchema`].
pub struct SchemaBuilder {
    name: String,
    policy: Policy,
    fields: FieldSet,
    pending: Vec<(String, Arc<dyn Binding>)>,
}

impl SchemaBuilder {
    /// Register a property under `field`. An unnamed property takes the
    /// field name as its key segment.
    pub fn property<B: Binding + 'static>(mut self, field: &str, binding: Arc<B>) -> Self {
        let binding: Arc<dyn Binding> = binding;
        self.pending.push((field.to_string(), binding));
        self
    }

    /// Model-level policy for every record of this model.
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Finish the schema. Fails if a field name was registered twice.
    pub fn build(mut self) -> ModelResult<Arc<ModelSchema>> {
        for (field, binding) in self.pending {
            self.fields.register(&field, binding)?;
        }
        Ok(Arc::new(ModelSchema {
            name: self.name,
            policy: self.policy,
            fields: self.fields,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use trol_core::Property;

    #[test]
    fn build_names_properties_after_fields() {
        let first = Arc::new(Property::<String>::native());
        let last = Arc::new(Property::<String>::native());
        let schema = ModelSchema::builder("Employee")
            .property("first_name", first.clone())
            .property("last_name", last.clone())
            .build()
            .unwrap();

        assert_eq!(schema.name(), "Employee");
        assert_eq!(first.name(), Some("first_name"));
        assert_eq!(last.name(), Some("last_name"));
        assert_eq!(schema.fields().len(), 2);
        assert!(schema.binding("first_name").is_some());
        assert!(schema.binding("middle_name").is_none());
    }

    #[test]
    fn duplicate_field_fails_build() {
        let err = ModelSchema::builder("X")
            .property("a", Arc::new(Property::<i64>::native()))
            .property("a", Arc::new(Property::<f64>::native()))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateProperty { .. }));
    }

    #[test]
    fn schema_policy_is_kept() {
        let schema = ModelSchema::builder("X")
            .policy(Policy::UNSET.with_autocommit(false))
            .build()
            .unwrap();
        assert_eq!(schema.policy().autocommit, Some(false));
        assert!(schema.fields().is_empty());
    }

    #[test]
    fn debug_lists_fields() {
        let schema = ModelSchema::builder("Beer")
            .property("price", Arc::new(Property::<f64>::native()))
            .build()
            .unwrap();
        let debug = format!("{schema:?}");
        assert!(debug.contains("Beer"));
        assert!(debug.contains("price"));
    }
}
