use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{BookmarkStore, StoreError, validate_batch};
use crate::schema::{Bookmark, NewBookmark};

/// In-process store used by unit tests and local experiments
#[derive(Clone, Default)]
pub struct InMemoryBookmarkStore {
    bookmarks: Arc<RwLock<Vec<Bookmark>>>,
}

impl InMemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookmarkStore for InMemoryBookmarkStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_many(&self, bookmarks: Vec<NewBookmark>) -> Result<Vec<Bookmark>, StoreError> {
        validate_batch(&bookmarks)?;

        let mut stored = self.bookmarks.write().await;
        // Stage on a copy so a conflict leaves the store untouched
        let mut staged = stored.clone();
        let mut inserted = Vec::with_capacity(bookmarks.len());

        for bookmark in bookmarks {
            let id = match bookmark.id {
                Some(id) => id,
                None => staged.iter().map(|b| b.id).max().unwrap_or(0) + 1,
            };
            if staged.iter().any(|b| b.id == id) {
                return Err(StoreError::Conflict(format!("id {}", id)));
            }
            let bookmark = bookmark.into_bookmark(id);
            staged.push(bookmark.clone());
            inserted.push(bookmark);
        }

        *stored = staged;
        Ok(inserted)
    }

    async fn list(&self) -> Result<Vec<Bookmark>, StoreError> {
        Ok(self.bookmarks.read().await.clone())
    }

    async fn get(&self, id: i64) -> Result<Option<Bookmark>, StoreError> {
        Ok(self
            .bookmarks
            .read()
            .await
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn truncate(&self) -> Result<(), StoreError> {
        self.bookmarks.write().await.clear();
        Ok(())
    }
}
