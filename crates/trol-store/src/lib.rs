//! Key-value store backends for trol.
//!
//! Properties in trol project the attributes of in-process objects onto keys
//! in a remote key-value store. This crate defines the narrow interface the
//! binding layer talks to, and the backends shipped with trol.
//!
//! # Storage Backends
//!
//! All backends implement the [`RemoteStore`] trait:
//!
//! - [`InMemoryStore`] -- `HashMap`-based store for tests and embedding
//! - [`DirStore`] -- one file per key under a root directory
//!
//! # Design Rules
//!
//! 1. The store never interprets values -- it is a pure bytes-in, bytes-out map.
//! 2. An absent key is `Ok(None)`, never an error.
//! 3. Per-key operations only. Batch helpers make no atomicity promise.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod dir;
pub mod error;
pub mod memory;
pub mod traits;

pub use dir::DirStore;
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryStore, StoreStats};
pub use traits::RemoteStore;
