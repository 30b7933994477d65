//! SQLite-backed bookmark store.
//!
//! One `rusqlite::Connection` sits behind a blocking mutex, and every
//! statement runs on tokio's blocking pool so disk I/O never stalls a runtime
//! worker. Attributes are kept as a JSON object in one column; a private
//! `seq` column fixes insertion order.

use async_trait::async_trait;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::{BookmarkStore, StoreError, validate_batch};
use crate::schema::{Bookmark, NewBookmark};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS bookmarks (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id INTEGER NOT NULL UNIQUE,
        attributes TEXT NOT NULL
    );
";

/// Where a database URL points
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

impl DatabaseTarget {
    /// Accepts `:memory:`, `sqlite::memory:`, `sqlite://<path>`, `sqlite:<path>`
    /// or a bare file path.
    pub fn parse(url: &str) -> Result<Self, StoreError> {
        let url = url.trim();
        let rest = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);

        match rest {
            "" => Err(StoreError::ConnectionFailed(
                "database url must not be empty".to_string(),
            )),
            ":memory:" => Ok(DatabaseTarget::Memory),
            path => Ok(DatabaseTarget::File(PathBuf::from(path))),
        }
    }
}

pub struct SqliteBookmarkStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBookmarkStore {
    /// Open the database named by `url` and create the bookmarks table if needed
    pub fn open(url: &str) -> Result<Self, StoreError> {
        let conn = match DatabaseTarget::parse(url)? {
            DatabaseTarget::Memory => Connection::open_in_memory(),
            DatabaseTarget::File(path) => Connection::open(path),
        }
        .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        conn.execute_batch(SCHEMA).map_err(query_error)?;
        info!("Bookmark store opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }

    /// Run `op` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| StoreError::ConnectionFailed("connection lock poisoned".to_string()))?;
            op(&mut *conn)
        })
        .await
        .map_err(|e| StoreError::QueryFailed(format!("store task failed: {}", e)))?
    }
}

#[async_trait]
impl BookmarkStore for SqliteBookmarkStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map(|_| ())
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()))
        })
        .await
    }

    async fn insert_many(&self, bookmarks: Vec<NewBookmark>) -> Result<Vec<Bookmark>, StoreError> {
        validate_batch(&bookmarks)?;

        let inserted = self
            .with_conn(move |conn| {
                let tx = conn.transaction().map_err(query_error)?;

                let mut inserted = Vec::with_capacity(bookmarks.len());
                for bookmark in bookmarks {
                    let id: i64 = match bookmark.id {
                        Some(id) => id,
                        None => tx
                            .query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM bookmarks", [], |row| {
                                row.get(0)
                            })
                            .map_err(query_error)?,
                    };
                    let attributes = serde_json::to_string(&bookmark.attributes)?;

                    tx.execute(
                        "INSERT INTO bookmarks (id, attributes) VALUES (?1, ?2)",
                        params![id, attributes],
                    )
                    .map_err(|e| insert_error(e, id))?;

                    inserted.push(bookmark.into_bookmark(id));
                }

                tx.commit().map_err(query_error)?;
                Ok(inserted)
            })
            .await?;

        debug!(count = inserted.len(), "Inserted bookmarks");
        Ok(inserted)
    }

    async fn list(&self) -> Result<Vec<Bookmark>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, attributes FROM bookmarks ORDER BY seq")
                .map_err(query_error)?;

            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
                .map_err(query_error)?;

            let mut bookmarks = Vec::new();
            for row in rows {
                let (id, attributes) = row.map_err(query_error)?;
                bookmarks.push(decode(id, &attributes)?);
            }
            Ok(bookmarks)
        })
        .await
    }

    async fn get(&self, id: i64) -> Result<Option<Bookmark>, StoreError> {
        self.with_conn(move |conn| {
            let attributes: Option<String> = conn
                .query_row(
                    "SELECT attributes FROM bookmarks WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(query_error)?;

            attributes.map(|attributes| decode(id, &attributes)).transpose()
        })
        .await
    }

    async fn truncate(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "DELETE FROM bookmarks;
                 DELETE FROM sqlite_sequence WHERE name = 'bookmarks';",
            )
            .map_err(query_error)
        })
        .await?;
        debug!("Truncated bookmarks table");
        Ok(())
    }
}

fn decode(id: i64, attributes: &str) -> Result<Bookmark, StoreError> {
    Ok(Bookmark::new(id, serde_json::from_str(attributes)?))
}

fn query_error(err: rusqlite::Error) -> StoreError {
    StoreError::QueryFailed(err.to_string())
}

fn insert_error(err: rusqlite::Error, id: i64) -> StoreError {
    match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => StoreError::Conflict(format!("id {}", id)),
        _ => query_error(err),
    }
}
