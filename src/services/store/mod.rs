use async_trait::async_trait;
use thiserror::Error;

use crate::schema::{Bookmark, NewBookmark};

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryBookmarkStore;
pub use sqlite::SqliteBookmarkStore;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Bookmark already exists: {0}")]
    Conflict(String),

    #[error("Data validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Persistence collaborator behind the bookmark endpoints.
///
/// Implementations must keep identifiers unique and return `list` results in
/// insertion order, independent of identifier values.
///
/// # Example
/// ```no_run
/// # use bookmarks_api::services::store::{BookmarkStore, SqliteBookmarkStore};
/// # use bookmarks_api::schema::NewBookmark;
/// # use serde_json::json;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteBookmarkStore::open_in_memory()?;
///
/// let attributes = json!({"title": "Rust", "url": "https://www.rust-lang.org"});
/// let created = store
///     .insert(NewBookmark::new(attributes.as_object().cloned().unwrap_or_default()))
///     .await?;
///
/// assert_eq!(store.get(created.id).await?, Some(created));
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Cheap round trip used by readiness checks
    async fn ping(&self) -> Result<(), StoreError>;

    /// Insert a batch atomically, preserving the given order
    async fn insert_many(&self, bookmarks: Vec<NewBookmark>) -> Result<Vec<Bookmark>, StoreError>;

    /// Every stored bookmark, in insertion order
    async fn list(&self) -> Result<Vec<Bookmark>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Bookmark>, StoreError>;

    /// Remove every bookmark and restart identifier assignment
    async fn truncate(&self) -> Result<(), StoreError>;

    async fn insert(&self, bookmark: NewBookmark) -> Result<Bookmark, StoreError> {
        self.insert_many(vec![bookmark])
            .await?
            .pop()
            .ok_or_else(|| StoreError::QueryFailed("insert returned no rows".to_string()))
    }
}

/// Check a batch before it reaches storage
pub(crate) fn validate_batch(bookmarks: &[NewBookmark]) -> Result<(), StoreError> {
    use garde::Validate;

    for bookmark in bookmarks {
        bookmark
            .validate()
            .map_err(|report| StoreError::ValidationFailed(report.to_string()))?;
    }
    Ok(())
}
