//! Model layer for trol.
//!
//! Groups properties into models. A [`ModelSchema`] registers the
//! properties of one model type once; each [`Record`] is an instance of it
//! and the owner of those properties. Records nest, deriving their key from
//! their parent's, and a [`Database`] ties schemas, top-level properties,
//! and a store handle together.
//!
//! ```
//! use std::sync::Arc;
//! use trol_core::Property;
//! use trol_model::{Database, ModelSchema};
//! use trol_store::InMemoryStore;
//!
//! let location = Arc::new(Property::<String>::native());
//! let brewery = ModelSchema::builder("Brewery")
//!     .property("location", location.clone())
//!     .build()
//!     .unwrap();
//! let db = Database::builder(Arc::new(InMemoryStore::new()))
//!     .model(brewery)
//!     .build()
//!     .unwrap();
//!
//! let fremont = db.obtain("Brewery", "fremont").unwrap();
//! location.write(&*fremont, "Seattle".to_string()).unwrap();
//! assert_eq!(location.key(&*fremont).unwrap(), "Brewery:fremont:location");
//! ```

pub mod database;
pub mod error;
pub mod fields;
pub mod record;
pub mod schema;

pub use database::{Database, DatabaseBuilder};
pub use error::{ModelError, ModelResult};
pub use fields::{Field, FieldSet};
pub use record::{Record, Update};
pub use schema::{ModelSchema, SchemaBuilder};
