#![cfg(test)]
use std::path::{Path, PathBuf};

use redb::{Database, TableDefinition};
use uuid::Uuid;

/// Fresh store file under the system temp dir, removed on drop.
/// Bind it before the store so the store closes first.
pub struct TempStore {
    path: PathBuf,
}

impl TempStore {
    pub fn new() -> Self {
        let path = std::env::temp_dir()
            .join("todo-service-tests")
            .join(format!("{}.redb", Uuid::new_v4()));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempStore {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Seed raw values, bypassing the codec, before the store is opened.
pub fn write_raw(path: &Path, entries: &[(&str, &[u8])]) -> anyhow::Result<()> {
    let table: TableDefinition<&str, &[u8]> = TableDefinition::new("todos");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::create(path)?;
    let txn = db.begin_write()?;
    {
        let mut t = txn.open_table(table)?;
        for (k, v) in entries {
            t.insert(*k, *v)?;
        }
    }
    txn.commit()?;
    Ok(())
}
