pub mod errors;
pub mod todo;

pub use todo::{Todo, TodoInput};
