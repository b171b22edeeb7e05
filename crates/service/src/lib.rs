//! Service layer for the todo API.
//! - `storage` holds the embedded key-value store adapter.
//! - `todo` holds the repository seam and the business rules around it
//!   (id assignment, identity pinning on update).

pub mod errors;
pub mod storage;
pub mod todo;
#[cfg(test)]
pub mod test_support;

pub use storage::RedbTodoStore;
pub use todo::{repository::{TodoListing, TodoRepository}, service::TodoService};
