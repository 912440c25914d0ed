//! Attribute binding core for trol.
//!
//! A [`Property`] projects one attribute of an in-process object (its
//! [`Owner`]) onto one key of a remote key-value store, and keeps a cached
//! copy on the owner in sync through fetch and commit.
//!
//! # Keys
//!
//! The remote key is `"{owner key}:{property name}"`, or just the property
//! name when the owner has no key.
//!
//! # Policy
//!
//! Two flags decide when the store is consulted:
//!
//! - `autocommit` -- commit on every write (default `true`)
//! - `alwaysfetch` -- fetch on every read (default `false`)
//!
//! Each resolves property first, then owner, then default. See [`Policy`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trol_core::{Holder, Property, PropertyError};
//! use trol_store::InMemoryStore;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let user = Holder::new(store).with_key("user:42");
//! let score = Property::<i64>::native().named("score");
//!
//! assert!(matches!(score.read(&user), Err(PropertyError::KeyNotFound { .. })));
//! score.write(&user, 17).unwrap();
//! assert_eq!(score.read(&user).unwrap(), 17);
//! assert_eq!(score.key(&user).unwrap(), "user:42:score");
//! ```
//!
//! # Modules
//!
//! - [`error`] -- [`PropertyError`]
//! - [`slot`] -- cached [`Slot`] states and the per-owner [`SlotTable`]
//! - [`policy`] -- [`Policy`] flags and their resolution
//! - [`owner`] -- the [`Owner`] trait and the plain [`Holder`] owner
//! - [`property`] -- the typed [`Property`]
//! - [`binding`] -- the type-erased [`Binding`] trait

pub mod binding;
pub mod error;
pub mod owner;
pub mod policy;
pub mod property;
pub mod slot;

pub use binding::Binding;
pub use error::{PropertyError, Result};
pub use owner::{Holder, Owner};
pub use policy::{Policy, DEFAULT_ALWAYSFETCH, DEFAULT_AUTOCOMMIT};
pub use property::Property;
pub use slot::{PropertyId, Slot, SlotState, SlotTable};
