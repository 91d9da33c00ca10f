//! File-backed storage: one YAML file per collection under a data directory.

pub mod connection;
pub mod document_repository;

pub use connection::FileConnection;
pub use document_repository::FileDocumentStore;
