//! # Storage Module
//!
//! Handles all data persistence for the care tracker.
//!
//! The domain layer only sees the [`DocumentStore`] trait: per-user
//! collections of flat documents with add, query (optionally ordered) and
//! delete. Two implementations ship with the backend:
//!
//! - **memory**: process-local store for development and tests
//! - **file**: YAML file per collection under the data directory
//!
//! A hosted document database plugs in by implementing the same trait.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::{FileConnection, FileDocumentStore};
pub use memory::MemoryDocumentStore;
pub use traits::{
    CollectionPath, Document, DocumentStore, OrderBy, SortDirection, StoreError, StoredDocument,
};
