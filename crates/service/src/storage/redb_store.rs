use std::{path::{Path, PathBuf}, sync::Arc};

use async_trait::async_trait;
use models::Todo;
use redb::{Database, ReadableTable, TableDefinition};
use tracing::{debug, info, warn};

use crate::errors::{storage_err, ServiceError};
use crate::todo::repository::{TodoListing, TodoRepository};

/// Single namespace: raw id bytes -> JSON-encoded [`Todo`].
const TODOS: TableDefinition<&str, &[u8]> = TableDefinition::new("todos");

/// Todo store on top of an embedded `redb` database file.
///
/// Keys are kept in byte order, so a full scan returns timestamp ids
/// oldest first. The handle is shared by cloning; the file is closed when
/// the last clone is dropped.
#[derive(Clone)]
pub struct RedbTodoStore {
    db: Arc<Database>,
    path: PathBuf,
}

impl RedbTodoStore {
    /// Open (or create) the database at `path` and make sure the table exists.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(storage_err)?;
        }
        let db = Database::create(&path).map_err(storage_err)?;

        // Create the table up front so readers never see TableDoesNotExist.
        let txn = db.begin_write().map_err(storage_err)?;
        txn.open_table(TODOS).map_err(storage_err)?;
        txn.commit().map_err(storage_err)?;

        info!(path = %path.display(), "todo store opened");
        Ok(Self { db: Arc::new(db), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a blocking store operation off the async workers.
    async fn blocking<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&Database) -> Result<T, ServiceError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| ServiceError::Storage(format!("store task failed: {e}")))?
    }

    fn scan(db: &Database) -> Result<TodoListing, ServiceError> {
        let txn = db.begin_read().map_err(storage_err)?;
        let table = txn.open_table(TODOS).map_err(storage_err)?;
        let mut listing = TodoListing::default();
        for entry in table.iter().map_err(storage_err)? {
            let (key, value) = entry.map_err(storage_err)?;
            match Todo::from_json_bytes(value.value()) {
                Ok(todo) => listing.todos.push(todo),
                Err(e) => {
                    listing.skipped += 1;
                    warn!(key = key.value(), error = %e, "skipping undecodable todo record");
                }
            }
        }
        Ok(listing)
    }

    fn put(db: &Database, id: &str, bytes: &[u8], overwrite: bool) -> Result<(), ServiceError> {
        let txn = db.begin_write().map_err(storage_err)?;
        {
            let mut table = txn.open_table(TODOS).map_err(storage_err)?;
            if !overwrite && table.get(id).map_err(storage_err)?.is_some() {
                return Err(ServiceError::Conflict(format!("todo {id} already exists")));
            }
            table.insert(id, bytes).map_err(storage_err)?;
        }
        txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn get(db: &Database, id: &str) -> Result<Todo, ServiceError> {
        let txn = db.begin_read().map_err(storage_err)?;
        let table = txn.open_table(TODOS).map_err(storage_err)?;
        let value = table.get(id).map_err(storage_err)?.ok_or_else(|| ServiceError::not_found(id))?;
        let todo = Todo::from_json_bytes(value.value())?;
        Ok(todo)
    }

    fn remove(db: &Database, id: &str) -> Result<bool, ServiceError> {
        let txn = db.begin_write().map_err(storage_err)?;
        let existed = {
            let mut table = txn.open_table(TODOS).map_err(storage_err)?;
            let removed = table.remove(id).map_err(storage_err)?;
            removed.is_some()
        };
        txn.commit().map_err(storage_err)?;
        Ok(existed)
    }
}

#[async_trait]
impl TodoRepository for RedbTodoStore {
    async fn list_all(&self) -> Result<TodoListing, ServiceError> {
        let listing = self.blocking(Self::scan).await?;
        debug!(count = listing.todos.len(), skipped = listing.skipped, "listed todos");
        Ok(listing)
    }

    async fn save(&self, todo: &Todo) -> Result<(), ServiceError> {
        let bytes = todo.to_json_bytes()?;
        let id = todo.id.clone();
        self.blocking(move |db| Self::put(db, &id, &bytes, true)).await
    }

    async fn insert_new(&self, todo: &Todo) -> Result<(), ServiceError> {
        let bytes = todo.to_json_bytes()?;
        let id = todo.id.clone();
        self.blocking(move |db| Self::put(db, &id, &bytes, false)).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Todo, ServiceError> {
        let id = id.to_owned();
        self.blocking(move |db| Self::get(db, &id)).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, ServiceError> {
        let key = id.to_owned();
        let existed = self.blocking(move |db| Self::remove(db, &key)).await?;
        if !existed {
            debug!(id, "delete of absent todo");
        }
        Ok(existed)
    }
}
