use async_trait::async_trait;
use models::Todo;

use crate::errors::ServiceError;

/// Result of a full scan.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TodoListing {
    /// Decoded records in ascending key order.
    pub todos: Vec<Todo>,
    /// Values that failed to decode and were left out.
    pub skipped: usize,
}

/// Persistence seam between the service and the key-value store.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn list_all(&self) -> Result<TodoListing, ServiceError>;
    /// Write under `todo.id`, replacing any existing value.
    async fn save(&self, todo: &Todo) -> Result<(), ServiceError>;
    /// Write under `todo.id` only if the key is free; `Conflict` otherwise.
    async fn insert_new(&self, todo: &Todo) -> Result<(), ServiceError>;
    async fn get_by_id(&self, id: &str) -> Result<Todo, ServiceError>;
    /// Returns whether a record existed. A missing key is not an error.
    async fn delete_by_id(&self, id: &str) -> Result<bool, ServiceError>;
}
