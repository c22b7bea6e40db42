use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use quizotidien::db::{Db, LocalStore, Store};

static COUNTER: AtomicU32 = AtomicU32::new(0);

fn unique_path(kind: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "quizotidien_test_{}_{}_{}",
        std::process::id(),
        kind,
        id
    ))
}

#[allow(dead_code)]
pub async fn create_sql_store() -> Store {
    let path = unique_path("db").with_extension("db");
    // Clean up leftover file from previous runs
    let _ = std::fs::remove_file(&path);
    let url = format!("file:{}", path.display());
    let db = Db::new(&url, "")
        .await
        .expect("failed to create test database");
    Store::Sql(db)
}

#[allow(dead_code)]
pub fn create_local_store() -> Store {
    let dir = unique_path("local");
    let _ = std::fs::remove_dir_all(&dir);
    let store = LocalStore::new(&dir).expect("failed to create local test store");
    Store::Local(store)
}
