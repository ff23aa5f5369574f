//! SQLite-based task store.

use super::{StoreError, TaskStore};
use crate::task::{NewTask, Task, TaskId};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS scheduler (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date CHAR(8) NOT NULL DEFAULT '',
    title VARCHAR NOT NULL DEFAULT '',
    comment TEXT NOT NULL DEFAULT '',
    repeat VARCHAR(128) NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_date ON scheduler (date);
"#;

const SELECT_COLUMNS: &str = "SELECT id, date, title, comment, repeat FROM scheduler";

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    /// Open (or create) the database file and make sure the schema exists.
    pub async fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Backend(format!("Failed to create database dir: {}", e)))?;
        }

        let conn = tokio::task::spawn_blocking(move || {
            let existed = db_path.exists();
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SCHEMA)?;
            if existed {
                tracing::debug!("Opened task database at {}", db_path.display());
            } else {
                tracing::info!("Created task database at {}", db_path.display());
            }
            Ok::<_, StoreError>(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await?
    }
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        date: row.get(1)?,
        title: row.get(2)?,
        comment: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        repeat: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}

/// Escape `LIKE` wildcards so the search term matches literally.
fn like_pattern(search: &str) -> String {
    let mut out = String::with_capacity(search.len() + 2);
    out.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn list_tasks(&self, search: Option<&str>, limit: usize) -> Result<Vec<Task>, StoreError> {
        let pattern = search.map(like_pattern);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.with_conn(move |conn| {
            let tasks = match pattern {
                Some(pattern) => {
                    let mut stmt = conn.prepare(&format!(
                        "{} WHERE title LIKE ?1 ESCAPE '\\' OR comment LIKE ?1 ESCAPE '\\'
                         ORDER BY date, id LIMIT ?2",
                        SELECT_COLUMNS
                    ))?;
                    let rows = stmt.query_map(params![pattern, limit], row_to_task)?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "{} ORDER BY date, id LIMIT ?1",
                        SELECT_COLUMNS
                    ))?;
                    let rows = stmt.query_map(params![limit], row_to_task)?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
            };
            Ok(tasks)
        })
        .await
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, StoreError> {
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                row_to_task,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))
        })
        .await
    }

    async fn insert_task(&self, task: &NewTask) -> Result<TaskId, StoreError> {
        let task = task.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO scheduler (date, title, comment, repeat) VALUES (?1, ?2, ?3, ?4)",
                params![task.date, task.title, task.comment, task.repeat],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        let task = task.clone();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE scheduler SET date = ?1, title = ?2, comment = ?3, repeat = ?4 WHERE id = ?5",
                params![task.date, task.title, task.comment, task.repeat, task.id],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(task.id));
            }
            Ok(())
        })
        .await
    }

    async fn update_date(&self, id: TaskId, date: &str) -> Result<(), StoreError> {
        let date = date.to_string();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE scheduler SET date = ?1 WHERE id = ?2",
                params![date, id],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            let changed = conn.execute("DELETE FROM scheduler WHERE id = ?1", params![id])?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}
