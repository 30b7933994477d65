use std::sync::Arc;
use tracing::{debug, info};

use crate::error::AppError;
use crate::schema::Bookmark;
use crate::services::BookmarkStore;

/// Message carried by every not-found response
pub const BOOKMARK_NOT_FOUND: &str = "Bookmark doesn't exist";

/// Read-only view over the bookmark store
#[derive(Clone)]
pub struct BookmarkService {
    store: Arc<dyn BookmarkStore>,
}

impl BookmarkService {
    pub fn new(store: Arc<dyn BookmarkStore>) -> Self {
        Self { store }
    }

    /// Every stored bookmark, in insertion order
    pub async fn list(&self) -> Result<Vec<Bookmark>, AppError> {
        let bookmarks = self.store.list().await?;
        debug!(count = bookmarks.len(), "Listed bookmarks");
        Ok(bookmarks)
    }

    /// Look a bookmark up by its raw path identifier.
    ///
    /// Anything that is not a stored positive integer id, including values
    /// that don't parse at all, is reported as not found.
    pub async fn get(&self, raw_id: &str) -> Result<Bookmark, AppError> {
        let id = match raw_id.parse::<i64>() {
            Ok(id) if id > 0 => id,
            _ => {
                info!(bookmark_id = %raw_id, "Bookmark id is not a positive integer");
                return Err(not_found());
            }
        };

        match self.store.get(id).await? {
            Some(bookmark) => Ok(bookmark),
            None => {
                info!(bookmark_id = id, "Bookmark not found");
                Err(not_found())
            }
        }
    }
}

fn not_found() -> AppError {
    AppError::NotFound(BOOKMARK_NOT_FOUND.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{BookmarkStore, InMemoryBookmarkStore};
    use crate::tests::{UnreachableStore, make_bookmarks_array};

    async fn seeded() -> BookmarkService {
        let store = InMemoryBookmarkStore::new();
        store.insert_many(make_bookmarks_array()).await.unwrap();
        BookmarkService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let service = BookmarkService::new(Arc::new(InMemoryBookmarkStore::new()));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_returns_fixture_in_order() {
        let service = seeded().await;
        let ids: Vec<i64> = service.list().await.unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_get_existing_bookmark() {
        let service = seeded().await;
        let expected = make_bookmarks_array()[1].clone().into_bookmark(2);

        assert_eq!(service.get("2").await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_get_missing_or_malformed_ids_are_not_found() {
        let service = seeded().await;

        for raw in ["123456", "0", "-1", "abc", "", "2.5", "99999999999999999999"] {
            match service.get(raw).await {
                Err(AppError::NotFound(message)) => assert_eq!(message, BOOKMARK_NOT_FOUND),
                other => panic!("expected not found for {raw:?}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_not_reported_as_not_found() {
        let service = BookmarkService::new(Arc::new(UnreachableStore));

        assert!(matches!(
            service.get("1").await,
            Err(AppError::ServiceUnavailable(_))
        ));
        assert!(matches!(
            service.list().await,
            Err(AppError::ServiceUnavailable(_))
        ));
    }
}
