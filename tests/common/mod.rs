#![allow(dead_code)]

use nanolink::storage::{LinkStore, SqliteStorage};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Pool size for file-backed databases. Several connections so concurrent
/// writes really race inside SQLite.
pub const POOL_SIZE: u32 = 4;

static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

/// A SQLite database file in the temp dir, removed on drop together with
/// its WAL side files.
pub struct TempSqlite {
    path: PathBuf,
}

impl TempSqlite {
    pub fn new(label: &str) -> Self {
        let name = format!(
            "nanolink-{label}-{}-{}.db",
            std::process::id(),
            NEXT_DB.fetch_add(1, Ordering::Relaxed)
        );
        let db = Self {
            path: std::env::temp_dir().join(name),
        };
        db.remove_files();
        db
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }

    pub async fn open(&self, max_connections: u32) -> SqliteStorage {
        let storage = SqliteStorage::new(&self.url(), max_connections)
            .await
            .unwrap();
        storage.init().await.unwrap();
        storage
    }

    pub async fn open_shared(&self) -> Arc<dyn LinkStore> {
        Arc::new(self.open(POOL_SIZE).await)
    }

    fn remove_files(&self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

impl Drop for TempSqlite {
    fn drop(&mut self) {
        self.remove_files();
    }
}
