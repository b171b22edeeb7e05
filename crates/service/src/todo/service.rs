use std::sync::Arc;

use chrono::{DateTime, Utc};
use configs::IdPolicy;
use models::{todo::generate_id, Todo, TodoInput};
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::todo::repository::{TodoListing, TodoRepository};

/// Business rules over a [`TodoRepository`]: id assignment on create and
/// identity pinning on update.
///
/// Update and delete are not atomic with the lookup that precedes them;
/// concurrent writers to the same id race and the last write wins.
#[derive(Clone)]
pub struct TodoService {
    repo: Arc<dyn TodoRepository>,
    id_policy: IdPolicy,
}

impl TodoService {
    pub fn new(repo: Arc<dyn TodoRepository>, id_policy: IdPolicy) -> Self {
        Self { repo, id_policy }
    }

    pub async fn list(&self) -> Result<TodoListing, ServiceError> {
        let listing = self.repo.list_all().await?;
        if listing.skipped > 0 {
            warn!(skipped = listing.skipped, "list omitted undecodable records");
        }
        Ok(listing)
    }

    pub async fn create(&self, input: TodoInput) -> Result<Todo, ServiceError> {
        self.create_at(input, Utc::now()).await
    }

    /// Create with an explicit clock reading. The id is `now` at second
    /// resolution, so under [`IdPolicy::Overwrite`] two creates in the same
    /// second share an id and the second replaces the first.
    #[instrument(skip(self, input))]
    pub async fn create_at(&self, input: TodoInput, now: DateTime<Utc>) -> Result<Todo, ServiceError> {
        let todo = Todo::from_input(input, generate_id(now), now);
        match self.id_policy {
            IdPolicy::Overwrite => self.repo.save(&todo).await?,
            IdPolicy::RejectDuplicate => self.repo.insert_new(&todo).await?,
        }
        info!(id = %todo.id, "todo created");
        Ok(todo)
    }

    pub async fn get(&self, id: &str) -> Result<Todo, ServiceError> {
        self.repo.get_by_id(id).await
    }

    /// Replace the title of an existing record; id and `created_at` always
    /// come from the stored record.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: TodoInput) -> Result<Todo, ServiceError> {
        let existing = self.repo.get_by_id(id).await?;
        let todo = Todo::apply_update(&existing, input);
        self.repo.save(&todo).await?;
        info!(id = %todo.id, "todo updated");
        Ok(todo)
    }

    /// Remove `id`. Deleting an absent id succeeds; the returned flag says
    /// whether anything was there.
    pub async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let existed = self.repo.delete_by_id(id).await?;
        info!(id, existed, "todo deleted");
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RedbTodoStore;
    use crate::test_support::TempStore;
    use chrono::TimeZone;

    fn service(policy: IdPolicy) -> (TempStore, TodoService) {
        let tmp = TempStore::new();
        let store = RedbTodoStore::open(tmp.path()).expect("open store");
        (tmp, TodoService::new(Arc::new(store), policy))
    }

    fn at(s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, s).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_identity_regardless_of_input() -> anyhow::Result<()> {
        let (_tmp, svc) = service(IdPolicy::Overwrite);
        let input = TodoInput { id: Some("client".into()), title: "buy milk".into(), created_at: Some(at(59)) };
        let todo = svc.create_at(input, at(1)).await?;
        assert_eq!(todo.id, "20240506070801");
        assert_eq!(todo.created_at, at(1));
        assert_eq!(svc.get("20240506070801").await?, todo);
        assert!(svc.get("client").await.unwrap_err().is_missing_record());
        Ok(())
    }

    #[tokio::test]
    async fn create_with_wall_clock_gives_timestamp_id() -> anyhow::Result<()> {
        let (_tmp, svc) = service(IdPolicy::Overwrite);
        let todo = svc.create(TodoInput::new("now")).await?;
        assert!(models::todo::is_timestamp_id(&todo.id));
        Ok(())
    }

    #[tokio::test]
    async fn same_second_creates_overwrite_by_default() -> anyhow::Result<()> {
        let (_tmp, svc) = service(IdPolicy::Overwrite);
        let first = svc.create_at(TodoInput::new("first"), at(3)).await?;
        let second = svc.create_at(TodoInput::new("second"), at(3)).await?;
        assert_eq!(first.id, second.id);
        let listing = svc.list().await?;
        assert_eq!(listing.todos.len(), 1);
        assert_eq!(listing.todos[0].title, "second");
        Ok(())
    }

    #[tokio::test]
    async fn same_second_creates_conflict_when_rejecting() -> anyhow::Result<()> {
        let (_tmp, svc) = service(IdPolicy::RejectDuplicate);
        svc.create_at(TodoInput::new("first"), at(3)).await?;
        let err = svc.create_at(TodoInput::new("second"), at(3)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(svc.get("20240506070803").await?.title, "first");
        Ok(())
    }

    #[tokio::test]
    async fn update_pins_id_and_created_at() -> anyhow::Result<()> {
        let (_tmp, svc) = service(IdPolicy::Overwrite);
        let created = svc.create_at(TodoInput::new("old"), at(4)).await?;
        let input = TodoInput { id: Some("hijack".into()), title: "new".into(), created_at: Some(at(50)) };
        let updated = svc.update(&created.id, input).await?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.title, "new");
        assert_eq!(svc.get(&created.id).await?, updated);
        assert!(svc.get("hijack").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn update_of_missing_is_not_found_and_writes_nothing() -> anyhow::Result<()> {
        let (_tmp, svc) = service(IdPolicy::Overwrite);
        let err = svc.update("doesnotexist", TodoInput::new("x")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(svc.list().await?.todos.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn list_returns_n_records_in_id_order() -> anyhow::Result<()> {
        let (_tmp, svc) = service(IdPolicy::Overwrite);
        for s in [9, 2, 5] {
            svc.create_at(TodoInput::new(format!("t{s}")), at(s)).await?;
        }
        let ids: Vec<_> = svc.list().await?.todos.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, ["20240506070802", "20240506070805", "20240506070809"]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_twice_succeeds_both_times() -> anyhow::Result<()> {
        let (_tmp, svc) = service(IdPolicy::Overwrite);
        let created = svc.create_at(TodoInput::new("gone"), at(6)).await?;
        assert!(svc.delete(&created.id).await?);
        assert!(!svc.delete(&created.id).await?);
        Ok(())
    }
}
