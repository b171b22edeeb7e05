//! Storage backends for the service layer.

pub mod redb_store;

pub use redb_store::RedbTodoStore;
